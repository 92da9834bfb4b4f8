//! Configuration constants exposed by the autoscaling decision core.
//!
//! Fixed, named constants rather than a runtime-tunable struct — none of
//! these are reconfigurable at runtime.

/// Default cadence (seconds) at which the outer control loop ticks.
pub const AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS: f64 = 20.0;

/// Trailing window (seconds) over which the rate-based scaler retains
/// request timestamps.
pub const AUTOSCALER_QPS_WINDOW_SIZE_SECONDS: f64 = 60.0;

/// Minimum wall-clock gap (seconds) between successive non-empty
/// reconciliations of the heterogeneous scaler. Also used as that
/// scaler's timestamp window size.
pub const SCALE_UP_COOL_DOWN_INTERVAL_SECONDS: f64 = 300.0;

/// Number of request classes the heterogeneous scaler's histogram carries.
pub const REQUEST_CLASS_COUNT: usize = 7;

/// Number of `A10` fallback replicas launched alongside each new `A100`
/// primary. Hard-coded in the reference implementation; treated here as a
/// named constant of the design rather than a runtime parameter (see
/// DESIGN.md, "fallback count policy").
pub const A100_FALLBACK_COUNT: usize = 4;
