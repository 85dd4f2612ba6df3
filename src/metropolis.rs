/*!
# Metropolis sampler for the exponential-decay integral

This module implements the single-chain Metropolis sampler at the heart of
the crate. The chain walks a scalar state `x`, starting at `0`, using the
uniform random-walk proposal from [`crate::distributions`] and the
accept/reject rule with weight `w = target(x_trial) / target(x)`. Because
the target is zero on the negative half-line, negative trials are rejected
outright, which makes non-negativity of the chain state a hard invariant.

Burn-in follows the retention rule: the chain walks all `n` steps, and the
post-update state is retained for every step index `i >= n0`, so a run's
trace has exactly `n - n0` entries. The integral estimate is the arithmetic
mean of the retained states that are `>= 0`; if that subset is empty the
run fails with [`Error::EmptyEstimate`] instead of producing NaN.

## Example

```rust
use metroscan::metropolis::metropolis_integral;

let result = metropolis_integral(1.0, 3000, 0, 42).unwrap();
assert_eq!(result.trace.len(), 3000);
assert!((result.estimate - 1.0).abs() < 0.2);
```
*/

use ndarray::Array1;
use rand::prelude::*;

use crate::distributions::{ExpDecay, RandomWalkProposal};
use crate::error::{Error, Result};

// Offsets the proposal stream from the accept/reject stream when both are
// derived from one user-facing seed.
const PROPOSAL_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// The outcome of one chain run: the retained trace and the integral
/// estimate derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Retained states, one per step index `i >= n0`, in step order.
    pub trace: Array1<f64>,
    /// Arithmetic mean of the non-negative trace entries.
    pub estimate: f64,
}

/// A single Metropolis Markov chain over the exponential-decay target.
///
/// The chain owns its accept/reject generator; the proposal owns a second,
/// independent generator. Both are re-seeded together by
/// [`MetropolisChain::set_seed`], so one seed reproduces a whole run.
#[derive(Debug, Clone)]
pub struct MetropolisChain {
    /// The target distribution to sample from.
    pub target: ExpDecay,
    /// The proposal distribution used to generate trial points.
    pub proposal: RandomWalkProposal,
    /// The current state of the chain.
    pub current_state: f64,
    /// The seed for the accept/reject draws.
    pub seed: u64,
    rng: SmallRng,
}

impl MetropolisChain {
    /// Creates a chain at `x = 0` with an entropy-derived seed.
    pub fn new(target: ExpDecay, proposal: RandomWalkProposal) -> Self {
        let seed = thread_rng().gen::<u64>();
        Self {
            target,
            proposal,
            current_state: 0.0,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Re-seeds the accept/reject draws with `seed` and gives the proposal
    /// its own stream derived from it.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self.proposal = self.proposal.set_seed(seed ^ PROPOSAL_STREAM);
        self
    }

    /// Performs one Metropolis update and returns the post-update state.
    ///
    /// A trial point below the support has density zero and is rejected
    /// before any uniform draw, so the `w == 0`, `r == 0` tie can never
    /// accept a negative state. Trials inside the support are accepted
    /// when `w >= r` with `r ~ Uniform[0, 1)`.
    pub fn step(&mut self) -> f64 {
        let trial = self.proposal.sample(self.current_state);
        if trial >= 0.0 {
            let w = self.target.ratio(self.current_state, trial);
            let r: f64 = self.rng.gen();
            if w >= r {
                self.current_state = trial;
            }
        }
        self.current_state
    }

    /// Runs the chain for `n` steps from `x = 0`, retaining the state for
    /// every step index `i >= n0`.
    ///
    /// Parameters are validated eagerly: `delta` must be positive and
    /// finite, `n` positive, and `n0 < n`. The returned trace has exactly
    /// `n - n0` entries.
    pub fn run(&mut self, n: usize, n0: usize) -> Result<RunResult> {
        validate(self.proposal.delta, n, n0)?;

        self.current_state = 0.0;
        let mut trace = Array1::<f64>::zeros(n - n0);
        for i in 0..n {
            let state = self.step();
            if i >= n0 {
                trace[i - n0] = state;
            }
        }

        let estimate = non_negative_mean(&trace)?;
        Ok(RunResult { trace, estimate })
    }
}

/// Runs one seeded Metropolis chain and returns its trace and integral
/// estimate.
///
/// This is the crate's single-run entry point: `delta` is the proposal
/// half-width, `n` the total step count, `n0` the burn-in count, and
/// `seed` makes the run reproducible.
pub fn metropolis_integral(delta: f64, n: usize, n0: usize, seed: u64) -> Result<RunResult> {
    let mut chain =
        MetropolisChain::new(ExpDecay, RandomWalkProposal::new(delta)).set_seed(seed);
    chain.run(n, n0)
}

fn validate(delta: f64, n: usize, n0: usize) -> Result<()> {
    if !delta.is_finite() || delta <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "proposal half-width must be positive and finite, got {delta}"
        )));
    }
    if n == 0 {
        return Err(Error::InvalidParameter(
            "step count must be positive".to_string(),
        ));
    }
    if n0 >= n {
        return Err(Error::InvalidParameter(format!(
            "burn-in ({n0}) must be smaller than the step count ({n})"
        )));
    }
    Ok(())
}

/// Mean of the trace entries `>= 0`. The rejection rule keeps every
/// retained state non-negative, but the estimate is defined over the
/// filtered subset, so a negative entry can never bias it silently.
fn non_negative_mean(trace: &Array1<f64>) -> Result<f64> {
    let (sum, count) = trace
        .iter()
        .filter(|x| **x >= 0.0)
        .fold((0.0, 0usize), |(sum, count), x| (sum + x, count + 1));
    if count == 0 {
        return Err(Error::EmptyEstimate);
    }
    Ok(sum / count as f64)
}
