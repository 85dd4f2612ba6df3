//! Metropolis estimation of the exponential-decay integral, plus a driver
//! that studies how estimator error depends on the proposal step size.
//!
//! The sampler lives in [`metropolis`]; the step-size sweep and its three
//! error curves live in [`scan`]. Plotting the curves is left to external
//! consumers (see `src/bin/demo.rs` for one).
//!
//! ```rust
//! use metroscan::metropolis::metropolis_integral;
//!
//! let result = metropolis_integral(1.0, 3000, 0, 42).unwrap();
//! assert_eq!(result.trace.len(), 3000);
//! ```

pub mod distributions;
pub mod error;
pub mod metropolis;
pub mod scan;
pub mod stats;
