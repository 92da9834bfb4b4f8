//! The allocation solver seam.
//!
//! The heterogeneous scaler defers "how many of each accelerator type do we
//! want" to an injected solver rather than computing it itself — the solver's
//! internals (an ILP formulation in production) are out of scope here; the
//! core only depends on this trait.

use crate::error::SolverError;
use crate::replica::AcceleratorType;

/// A target allocation: desired replica count per accelerator type.
/// Accelerator types absent from the returned vector are treated as zero.
pub type Allocation = Vec<(AcceleratorType, u32)>;

/// Maps a per-request-class rate histogram to a target allocation.
///
/// `request_rate_dist[i]` is the current requests-per-second for class `i`.
pub trait Solver: Send + Sync {
    fn solve(&self, request_rate_dist: &[f64]) -> Result<Allocation, SolverError>;
}

/// Looks up `t`'s count in `allocation`, treating an absent key as zero.
pub fn allocation_count(allocation: &Allocation, t: AcceleratorType) -> u32 {
    allocation
        .iter()
        .find(|(accel, _)| *accel == t)
        .map(|(_, count)| *count)
        .unwrap_or(0)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Always returns a fixed allocation, regardless of input. Used by
    /// tests that only care about the reconciliation logic downstream of
    /// the solver call, not the solver itself.
    pub struct FixedSolver {
        pub allocation: Allocation,
    }

    impl Solver for FixedSolver {
        fn solve(&self, _request_rate_dist: &[f64]) -> Result<Allocation, SolverError> {
            Ok(self.allocation.clone())
        }
    }
}
