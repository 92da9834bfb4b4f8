//! The `Autoscaler` trait and the request-batch input it consumes.

pub mod hetero;
pub mod rate;

use crate::decision::DecisionEntry;
use crate::replica::ReplicaInfo;

/// One tick's worth of request arrivals, merged by `collect_request_information`
/// before the matching `evaluate_scaling` call.
///
/// `Uniform` is what the rate-based scaler expects: a flat list of arrival
/// timestamps. `ByClass` is what the heterogeneous scaler expects: one
/// timestamp list per request class, since its solver call is class-aware.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBatch {
    Uniform { timestamps: Vec<f64> },
    ByClass { timestamps: Vec<Vec<f64>> },
}

impl RequestBatch {
    pub fn total(&self) -> usize {
        match self {
            RequestBatch::Uniform { timestamps } => timestamps.len(),
            RequestBatch::ByClass { timestamps } => timestamps.iter().map(Vec::len).sum(),
        }
    }
}

/// Common interface implemented by every scaling policy.
///
/// Within a tick, `collect_request_information` must be called before
/// `evaluate_scaling`; the outer control loop owns that ordering. Neither
/// call touches a replica manager, load balancer, or persistence layer
/// directly — those live entirely on the other side of `replicas`.
pub trait Autoscaler: Send + Sync {
    fn collect_request_information(&mut self, now: f64, batch: &RequestBatch);

    fn evaluate_scaling(&mut self, now: f64, replicas: &[ReplicaInfo]) -> Vec<DecisionEntry>;
}
