//! Error types for the autoscaling decision core.

/// Errors raised while constructing an autoscaler from a [`crate::spec::ServiceSpec`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown autoscaler name: {0}")]
    UnknownAutoscaler(String),
    #[error("invalid service spec: max_replicas ({max}) < min_replicas ({min})")]
    InvalidReplicaBounds { min: u32, max: u32 },
}

/// Errors raised by an [`crate::solver::Solver`] call.
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("solver call failed: {0}")]
    CallFailed(String),
    #[error("solver returned a malformed allocation: {0}")]
    MalformedAllocation(String),
}

/// Errors raised while synchronizing fallback teardown against the replica manager.
#[derive(Debug, thiserror::Error)]
pub enum FallbackSyncError {
    #[error("replica manager failed to scale down replica {replica_id}: {reason}")]
    ScaleDownFailed { replica_id: u64, reason: String },
}
