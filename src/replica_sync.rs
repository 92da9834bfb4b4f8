//! Collaborator traits consumed by `FallbackScaleDownSync`.
//!
//! The heterogeneous scaler launches cheap fallback replicas alongside a
//! primary so traffic has somewhere to go while the primary is still
//! starting. Once the primary reports ready, its fallbacks are no longer
//! needed. That teardown isn't part of the per-tick `evaluate_scaling` path
//! (the primary's readiness isn't observed there) — it's a separate
//! operation the outer control loop invokes after a primary transitions to
//! `Ready`, against the replica manager and persistence layer it already
//! owns. The core only depends on the narrow interfaces below.

use crate::error::FallbackSyncError;
use crate::replica::{ReplicaId, ReplicaInfo};

/// Reads the current replica inventory for a service, as the persistence
/// layer would serve it.
pub trait ReplicaSource: Send + Sync {
    fn replica_infos(&self, service_name: &str) -> Vec<ReplicaInfo>;
}

/// Upserts a replica record, as the persistence layer would.
pub trait ReplicaSink: Send + Sync {
    fn persist(&self, service_name: &str, replica: &ReplicaInfo);
}

/// Terminates a replica by id. Idempotent; synchronous completion is not
/// required.
pub trait ReplicaManager: Send + Sync {
    fn scale_down(&self, replica_id: ReplicaId) -> Result<(), FallbackSyncError>;
}

/// For every ready primary in `service_name` with outstanding fallbacks,
/// tears down each fallback and persists the shrunken
/// `fallback_replica_id_list`.
///
/// A no-op when no ready primary has any fallbacks left — safe to call on
/// every tick, or to retry after a transient [`FallbackSyncError`].
pub fn fallback_scale_down_sync(
    service_name: &str,
    source: &dyn ReplicaSource,
    sink: &dyn ReplicaSink,
    manager: &dyn ReplicaManager,
) -> Result<(), FallbackSyncError> {
    let replica_infos = source.replica_infos(service_name);

    for info in replica_infos {
        if !(info.is_primary && info.is_ready) || info.fallback_replica_id_list.is_empty() {
            continue;
        }

        let mut remaining = info.fallback_replica_id_list.clone();
        for fallback_id in info.fallback_replica_id_list.iter().copied() {
            manager.scale_down(fallback_id)?;
            remaining.retain(|&id| id != fallback_id);
            let updated = ReplicaInfo {
                fallback_replica_id_list: remaining.clone(),
                ..info.clone()
            };
            sink.persist(service_name, &updated);
        }
    }

    Ok(())
}
