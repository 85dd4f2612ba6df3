//! Summary statistics computed per sampler run.

use ndarray::ArrayView1;

/// Unbiased sample variance of a trace, with the `n - 1` denominator.
///
/// Returns 0 for traces with fewer than two samples, where the variance is
/// undefined.
pub fn sample_variance(trace: ArrayView1<f64>) -> f64 {
    if trace.len() < 2 {
        return 0.0;
    }
    trace.var(1.0)
}

/// Standard error of the trace mean: `sqrt(variance / n)`.
///
/// Autocorrelation of the chain is ignored, matching the quantity the scan
/// aggregates into its curves.
pub fn standard_error(trace: ArrayView1<f64>) -> f64 {
    if trace.is_empty() {
        return 0.0;
    }
    (sample_variance(trace) / trace.len() as f64).sqrt()
}
