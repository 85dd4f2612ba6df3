/*!
# Step-size scan driver

Sweeps the Metropolis sampler over a range of proposal half-widths
("deltas") and reduces repeated runs per delta into three error curves:

- `rms_average`: mean of the squared per-run standard errors,
- `rms_difference`: root mean squared deviation of the per-run estimates
  from the known exact integral value,
- `last_run_stde`: the standard error of the final run only. This is a
  replicate rather than a reduction, preserved from the reference study;
  the field name states exactly what it carries.

Runs are independent, so deltas are swept in parallel with rayon. Every
run builds its own chain from a seed derived from the scan seed and the
run's position, which keeps the draws of parallel runs statistically
independent and the whole scan reproducible regardless of thread
scheduling.

A run that fails does not abort the sweep: its delta is dropped from the
curves and recorded in [`ErrorCurves::failures`], preserving the partial
results of the remaining step sizes.
*/

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array1;
use rand::prelude::*;
use rayon::prelude::*;

use crate::distributions::{ExpDecay, RandomWalkProposal};
use crate::error::{Error, Result};
use crate::metropolis::MetropolisChain;
use crate::stats::standard_error;

/// Configuration of a step-size scan.
///
/// Defaults mirror the reference study: 50 deltas evenly spaced in
/// `[0.01, 10]`, 100 runs per delta, 3000 steps per run, no burn-in, and
/// exact value 1.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// The analytically known integral value the estimates are compared to.
    pub exact_value: f64,
    /// The ordered step sizes to sweep.
    pub deltas: Vec<f64>,
    /// How many sampler runs to aggregate per step size.
    pub runs_per_delta: usize,
    /// Total chain steps per run.
    pub steps: usize,
    /// Burn-in count per run (steps walked but not retained).
    pub burn_in: usize,
    /// The scan seed; per-run seeds are derived from it.
    pub seed: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exact_value: ExpDecay::EXACT_INTEGRAL,
            deltas: Array1::linspace(0.01, 10.0, 50).to_vec(),
            runs_per_delta: 100,
            steps: 3000,
            burn_in: 0,
            seed: thread_rng().gen::<u64>(),
        }
    }
}

impl ScanConfig {
    /// Replaces the scan seed, making the whole sweep reproducible.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the step-size range.
    pub fn with_deltas(mut self, deltas: Vec<f64>) -> Self {
        self.deltas = deltas;
        self
    }

    /// Replaces the per-delta repeat count.
    pub fn with_runs_per_delta(mut self, runs_per_delta: usize) -> Self {
        self.runs_per_delta = runs_per_delta;
        self
    }

    /// Replaces the per-run step and burn-in counts.
    pub fn with_steps(mut self, steps: usize, burn_in: usize) -> Self {
        self.steps = steps;
        self.burn_in = burn_in;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.deltas.is_empty() {
            return Err(Error::InvalidParameter(
                "scan range must contain at least one delta".to_string(),
            ));
        }
        if self.runs_per_delta == 0 {
            return Err(Error::InvalidParameter(
                "runs per delta must be positive".to_string(),
            ));
        }
        // steps and burn_in are checked per run, but failing the whole
        // scan eagerly beats 50 identical per-delta failure markers.
        if self.steps == 0 {
            return Err(Error::InvalidParameter(
                "step count must be positive".to_string(),
            ));
        }
        if self.burn_in >= self.steps {
            return Err(Error::InvalidParameter(format!(
                "burn-in ({}) must be smaller than the step count ({})",
                self.burn_in, self.steps
            )));
        }
        Ok(())
    }
}

/// Statistics of a single sampler run, the unit the scan aggregates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStats {
    /// The run's integral estimate.
    pub estimate: f64,
    /// Standard error of the run's trace mean.
    pub stde: f64,
}

/// The three error measures recorded for one step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Mean of the squared standard errors over all runs.
    pub rms_average: f64,
    /// Root mean squared deviation of the estimates from the exact value.
    pub rms_difference: f64,
    /// Standard error of the final run only.
    pub last_run_stde: f64,
}

/// The error curves of a completed scan, indexed in parallel by `deltas`.
///
/// Step sizes whose runs failed are excluded from the curve vectors and
/// listed in `failures` together with the error that occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorCurves {
    /// The step sizes that completed successfully, in scan order.
    pub deltas: Vec<f64>,
    /// Mean squared standard error per step size.
    pub rms_average: Vec<f64>,
    /// RMS deviation from the exact value per step size.
    pub rms_difference: Vec<f64>,
    /// Final run's standard error per step size.
    pub last_run_stde: Vec<f64>,
    /// Step sizes that failed, with the error of the failing run.
    pub failures: Vec<(f64, Error)>,
}

impl ErrorCurves {
    /// Number of step sizes with curve points.
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    /// True when no step size produced a curve point.
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

/// Reduces the per-run statistics of one step size into a curve point.
///
/// This is a pure function of its inputs; feeding it the same slice twice
/// yields the same point, which is what makes the driver's aggregation
/// testable without the sampler.
///
/// `runs` must not be empty; an empty slice has no curve point, and
/// inventing a zero one would misreport the estimator as error-free. The
/// driver guarantees this via its `runs_per_delta` validation.
pub fn aggregate(runs: &[RunStats], exact_value: f64) -> CurvePoint {
    debug_assert!(!runs.is_empty(), "a curve point needs at least one run");
    let n = runs.len() as f64;
    let rms_average = runs.iter().map(|r| r.stde * r.stde).sum::<f64>() / n;
    let rms_difference = (runs
        .iter()
        .map(|r| (r.estimate - exact_value).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();
    let last_run_stde = runs[runs.len() - 1].stde;
    CurvePoint {
        rms_average,
        rms_difference,
        last_run_stde,
    }
}

/// Runs the experiment described by a [`ScanConfig`].
#[derive(Debug, Clone)]
pub struct DeltaScan {
    /// The scan configuration.
    pub config: ScanConfig,
}

impl DeltaScan {
    /// Creates a driver for `config`.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Sweeps all step sizes in parallel and collects the error curves.
    pub fn run(&self) -> Result<ErrorCurves> {
        self.config.validate()?;
        let points: Vec<(f64, Result<CurvePoint>)> = self
            .config
            .deltas
            .par_iter()
            .enumerate()
            .map(|(delta_index, &delta)| (delta, self.scan_delta(delta_index, delta)))
            .collect();
        Ok(collect_curves(points))
    }

    /// Like [`DeltaScan::run`], with a progress bar advancing per delta.
    pub fn run_progress(&self) -> Result<ErrorCurves> {
        self.config.validate()?;
        let pb = ProgressBar::new(self.config.deltas.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );
        let points: Vec<(f64, Result<CurvePoint>)> = self
            .config
            .deltas
            .par_iter()
            .enumerate()
            .map(|(delta_index, &delta)| {
                let point = self.scan_delta(delta_index, delta);
                pb.inc(1);
                (delta, point)
            })
            .collect();
        pb.finish_with_message("scan complete");
        Ok(collect_curves(points))
    }

    /// All runs for one step size, each with its own derived RNG stream.
    fn scan_delta(&self, delta_index: usize, delta: f64) -> Result<CurvePoint> {
        let cfg = &self.config;
        // The scan seed is a full random u64, so derived seeds wrap.
        let base = cfg.seed.wrapping_add((delta_index * cfg.runs_per_delta) as u64);

        let mut runs = Vec::with_capacity(cfg.runs_per_delta);
        for run_index in 0..cfg.runs_per_delta {
            let mut chain = MetropolisChain::new(ExpDecay, RandomWalkProposal::new(delta))
                .set_seed(base.wrapping_add(run_index as u64));
            let result = chain.run(cfg.steps, cfg.burn_in)?;
            runs.push(RunStats {
                estimate: result.estimate,
                stde: standard_error(result.trace.view()),
            });
        }
        Ok(aggregate(&runs, cfg.exact_value))
    }
}

fn collect_curves(points: Vec<(f64, Result<CurvePoint>)>) -> ErrorCurves {
    let mut curves = ErrorCurves::default();
    for (delta, point) in points {
        match point {
            Ok(point) => {
                curves.deltas.push(delta);
                curves.rms_average.push(point.rms_average);
                curves.rms_difference.push(point.rms_difference);
                curves.last_run_stde.push(point.last_run_stde);
            }
            Err(err) => curves.failures.push((delta, err)),
        }
    }
    curves
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mock_runs() -> Vec<RunStats> {
        vec![
            RunStats {
                estimate: 0.9,
                stde: 0.02,
            },
            RunStats {
                estimate: 1.1,
                stde: 0.04,
            },
            RunStats {
                estimate: 1.0,
                stde: 0.03,
            },
        ]
    }

    #[test]
    fn aggregate_matches_hand_computed_values() {
        let point = aggregate(&mock_runs(), 1.0);
        let expected_rms_average = (0.02f64.powi(2) + 0.04f64.powi(2) + 0.03f64.powi(2)) / 3.0;
        let expected_rms_difference = ((0.01 + 0.01 + 0.0) / 3.0f64).sqrt();
        assert_abs_diff_eq!(point.rms_average, expected_rms_average, epsilon = 1e-15);
        assert_abs_diff_eq!(
            point.rms_difference,
            expected_rms_difference,
            epsilon = 1e-15
        );
        assert_eq!(point.last_run_stde, 0.03);
    }

    #[test]
    fn aggregate_keeps_only_the_final_runs_standard_error() {
        let mut runs = mock_runs();
        runs.last_mut().unwrap().stde = 0.5;
        assert_eq!(aggregate(&runs, 1.0).last_run_stde, 0.5);
    }

    #[test]
    fn aggregate_is_a_pure_reduction() {
        let runs = mock_runs();
        assert_eq!(aggregate(&runs, 1.0), aggregate(&runs, 1.0));
        // Same inputs under a different exact value change only the
        // difference curve.
        let shifted = aggregate(&runs, 2.0);
        let baseline = aggregate(&runs, 1.0);
        assert_eq!(shifted.rms_average, baseline.rms_average);
        assert_eq!(shifted.last_run_stde, baseline.last_run_stde);
        assert!(shifted.rms_difference > baseline.rms_difference);
    }

    #[test]
    #[should_panic]
    fn aggregate_rejects_an_empty_run_slice() {
        aggregate(&[], 1.0);
    }

    #[test]
    fn derived_seeds_wrap_at_the_u64_boundary() {
        let config = ScanConfig::default()
            .with_deltas(vec![0.5, 1.0])
            .with_runs_per_delta(3)
            .with_steps(50, 0)
            .set_seed(u64::MAX);
        let curves = DeltaScan::new(config).run().unwrap();
        assert_eq!(curves.len(), 2);
        assert!(curves.failures.is_empty());
    }

    #[test]
    fn invalid_scan_configs_fail_eagerly() {
        let no_deltas = ScanConfig::default().with_deltas(vec![]);
        assert!(DeltaScan::new(no_deltas).run().is_err());

        let no_runs = ScanConfig::default().with_runs_per_delta(0);
        assert!(DeltaScan::new(no_runs).run().is_err());

        let bad_burn_in = ScanConfig::default().with_steps(100, 100);
        assert!(DeltaScan::new(bad_burn_in).run().is_err());
    }

    #[test]
    fn bad_delta_becomes_a_failure_marker_not_an_abort() {
        let config = ScanConfig::default()
            .with_deltas(vec![1.0, -2.0])
            .with_runs_per_delta(2)
            .with_steps(200, 0)
            .set_seed(3);
        let curves = DeltaScan::new(config).run().unwrap();

        assert_eq!(curves.deltas, vec![1.0]);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves.failures.len(), 1);
        assert_eq!(curves.failures[0].0, -2.0);
        assert!(matches!(curves.failures[0].1, Error::InvalidParameter(_)));
    }

    #[test]
    fn scans_are_reproducible_for_equal_seeds() {
        let config = ScanConfig::default()
            .with_deltas(vec![0.5, 1.0, 2.0])
            .with_runs_per_delta(3)
            .with_steps(500, 50)
            .set_seed(11);
        let a = DeltaScan::new(config.clone()).run().unwrap();
        let b = DeltaScan::new(config).run().unwrap();

        assert_eq!(a.deltas, b.deltas);
        assert_eq!(a.rms_average, b.rms_average);
        assert_eq!(a.rms_difference, b.rms_difference);
        assert_eq!(a.last_run_stde, b.last_run_stde);
    }

    #[test]
    fn curves_are_aligned_with_the_scan_range() {
        let config = ScanConfig::default()
            .with_deltas(vec![0.1, 1.0])
            .with_runs_per_delta(2)
            .with_steps(300, 0)
            .set_seed(5);
        let curves = DeltaScan::new(config).run().unwrap();

        assert_eq!(curves.deltas, vec![0.1, 1.0]);
        assert_eq!(curves.rms_average.len(), 2);
        assert_eq!(curves.rms_difference.len(), 2);
        assert_eq!(curves.last_run_stde.len(), 2);
        assert!(curves.failures.is_empty());
        assert!(!curves.is_empty());
    }
}
