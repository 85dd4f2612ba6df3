/*!
Defines the fixed exponential-decay target density and the uniform
random-walk proposal used by the Metropolis chain.

The target is deliberately not generic: this crate studies exactly one
distribution, `exp(-x)` on the non-negative half-line, whose integral of
interest has the known exact value 1. The proposal perturbs the current
state by a uniform draw from `[-delta, delta]` and owns its random number
generator so that runs can be reproduced by seeding.

# Examples

```rust
use metroscan::distributions::{ExpDecay, RandomWalkProposal};

let target = ExpDecay;
assert_eq!(target.density(0.0), 1.0);
assert_eq!(target.density(-1.0), 0.0);

let mut proposal = RandomWalkProposal::new(0.5).set_seed(42);
let trial = proposal.sample(1.0);
assert!((trial - 1.0).abs() <= 0.5);
```
*/

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

/// The target density `exp(-x)` for `x >= 0` and `0` otherwise.
///
/// The density is total: zero outside its support, never negative, never
/// undefined, which is what keeps the chain state well-defined at every
/// step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpDecay;

impl ExpDecay {
    /// The analytically known value of the studied integral,
    /// `∫₀^∞ x e⁻ˣ dx = 1`.
    pub const EXACT_INTEGRAL: f64 = 1.0;

    /// Evaluates the density at `x`.
    pub fn density(&self, x: f64) -> f64 {
        if x >= 0.0 {
            (-x).exp()
        } else {
            0.0
        }
    }

    /// Acceptance weight `density(to) / density(from)` in closed form, so
    /// the normalization constant never enters. `from` must lie in the
    /// support; a `to` outside it yields weight 0.
    pub fn ratio(&self, from: f64, to: f64) -> f64 {
        debug_assert!(from >= 0.0, "chain state left the support: {from}");
        if to >= 0.0 {
            (from - to).exp()
        } else {
            0.0
        }
    }
}

/// A symmetric random-walk proposal: `x_trial = x + U` with
/// `U ~ Uniform[-delta, delta]`.
///
/// Owns a [`SmallRng`]; use [`RandomWalkProposal::set_seed`] for
/// reproducible draws.
#[derive(Debug, Clone)]
pub struct RandomWalkProposal {
    /// The proposal half-width, `delta`.
    pub delta: f64,
    rng: SmallRng,
}

impl RandomWalkProposal {
    /// Creates a proposal with half-width `delta`, seeded from entropy.
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Returns this proposal re-seeded with `seed`.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Draws a trial point around `current`.
    pub fn sample(&mut self, current: f64) -> f64 {
        let step = Uniform::new_inclusive(-self.delta, self.delta);
        current + step.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn density_on_support() {
        let target = ExpDecay;
        assert_abs_diff_eq!(target.density(0.0), 1.0);
        assert_abs_diff_eq!(target.density(1.0), (-1.0f64).exp());
        assert_abs_diff_eq!(target.density(10.0), (-10.0f64).exp());
    }

    #[test]
    fn density_outside_support_is_zero() {
        let target = ExpDecay;
        assert_eq!(target.density(-1e-12), 0.0);
        assert_eq!(target.density(-5.0), 0.0);
    }

    #[test]
    fn ratio_matches_density_quotient() {
        let target = ExpDecay;
        let (from, to) = (0.7, 2.3);
        assert_abs_diff_eq!(
            target.ratio(from, to),
            target.density(to) / target.density(from),
            epsilon = 1e-15
        );
    }

    #[test]
    fn ratio_rejects_negative_trials() {
        let target = ExpDecay;
        assert_eq!(target.ratio(0.0, -0.1), 0.0);
        assert_eq!(target.ratio(3.0, -100.0), 0.0);
    }

    #[test]
    fn proposal_stays_within_half_width() {
        let mut proposal = RandomWalkProposal::new(0.25).set_seed(7);
        for _ in 0..1000 {
            let trial = proposal.sample(2.0);
            assert!((trial - 2.0).abs() <= 0.25, "trial {trial} out of range");
        }
    }

    #[test]
    fn proposal_draws_are_reproducible() {
        let mut a = RandomWalkProposal::new(1.0).set_seed(42);
        let mut b = RandomWalkProposal::new(1.0).set_seed(42);
        for _ in 0..100 {
            assert_eq!(a.sample(0.0), b.sample(0.0));
        }
    }
}
