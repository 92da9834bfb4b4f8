//! Autoscaling decision core for a model-serving fleet manager.
//!
//! This crate owns the decision-making that drives an outer control loop:
//! given a rolling window of request arrival timestamps and the current
//! replica inventory, it produces the scale-up/scale-down decisions for an
//! external replica manager to enact. It performs no I/O of its own — the
//! replica manager, load balancer, persistence layer, and ILP solver are all
//! collaborators consumed through narrow traits ([`solver::Solver`],
//! [`replica_sync::ReplicaSource`], [`replica_sync::ReplicaSink`],
//! [`replica_sync::ReplicaManager`]).
//!
//! Two policies are provided, selected by name through [`registry`]:
//! [`autoscaler::rate::RequestRateAutoscaler`] (single-class, QPS-based) and
//! [`autoscaler::hetero::HeteroAccelAutoscaler`] (multi-class, ILP-backed).

pub mod autoscaler;
pub mod config;
pub mod decision;
pub mod error;
pub mod registry;
pub mod replica;
pub mod replica_sync;
pub mod solver;
pub mod spec;
pub mod window;

pub use autoscaler::{Autoscaler, RequestBatch};
pub use decision::{AutoscalerDecision, DecisionEntry, ScaleUpOverride};
pub use error::{ConfigError, FallbackSyncError, SolverError};
pub use replica::{AcceleratorType, ReplicaId, ReplicaInfo, ReplicaStatus};
pub use spec::ServiceSpec;
