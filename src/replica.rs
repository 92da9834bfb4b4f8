//! Replica inventory types and the replica-selection ordering policy.

use serde::{Deserialize, Serialize};

pub type ReplicaId = u64;

/// Lifecycle status of a replica, as reported by the (externally owned)
/// replica manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplicaStatus {
    Pending,
    Provisioning,
    Starting,
    Ready,
    NotReady,
    ShuttingDown,
    Failed,
}

impl ReplicaStatus {
    /// Fixed ordering in which replicas should be considered as scale-down
    /// victims: least-valuable first. Statuses absent from this list sort
    /// after all listed ones, in the caller's traversal order — see
    /// [`scale_down_decision_order`].
    pub fn scale_down_decision_order() -> &'static [ReplicaStatus] {
        &[
            ReplicaStatus::Failed,
            ReplicaStatus::Starting,
            ReplicaStatus::Pending,
            ReplicaStatus::Ready,
        ]
    }

    fn scale_down_rank(self) -> usize {
        let order = Self::scale_down_decision_order();
        order
            .iter()
            .position(|&s| s == self)
            .unwrap_or(order.len())
    }
}

/// GPU class of a replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceleratorType {
    A10,
    A100,
}

impl AcceleratorType {
    /// Fixed iteration order used by the heterogeneous scaler's
    /// per-accelerator reconciliation loop.
    pub const ITERATION_ORDER: [AcceleratorType; 2] = [AcceleratorType::A10, AcceleratorType::A100];

    /// The `accelerators` override string for a scale-up of this type.
    /// `A10` keeps the historical `"A10G:1"` spelling.
    pub fn override_string(self) -> String {
        match self {
            AcceleratorType::A10 => "A10G:1".to_string(),
            AcceleratorType::A100 => format!("{}:1", self.label()),
        }
    }

    /// Fallback replicas launched alongside each new primary of this type,
    /// and the accelerator type those fallbacks run on. `(0, None)` means
    /// the primary is launched alone.
    pub fn fallback_allocation(self) -> (usize, Option<AcceleratorType>) {
        match self {
            AcceleratorType::A10 => (0, None),
            AcceleratorType::A100 => {
                (crate::config::A100_FALLBACK_COUNT, Some(AcceleratorType::A10))
            }
        }
    }

    fn label(self) -> &'static str {
        match self {
            AcceleratorType::A10 => "A10",
            AcceleratorType::A100 => "A100",
        }
    }
}

/// Read-only snapshot of a replica, as owned by the external replica
/// manager / persistence layer. The core never mutates this except
/// through the replica-manager interface consumed by
/// `FallbackScaleDownSync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaInfo {
    pub replica_id: ReplicaId,
    pub status: ReplicaStatus,
    pub is_ready: bool,
    pub is_primary: bool,
    pub accelerator: AcceleratorType,
    pub fallback_replica_id_list: Vec<ReplicaId>,
}

impl ReplicaInfo {
    /// True when `status` is non-terminal pre-`Ready`, or `Ready`/`NotReady`.
    ///
    /// Derived from `status` rather than stored as an independent field —
    /// the two can never drift apart, unlike the Python original where
    /// `is_launched` is a separate attribute.
    pub fn is_launched(&self) -> bool {
        !matches!(self.status, ReplicaStatus::ShuttingDown | ReplicaStatus::Failed)
    }
}

/// Selects `num_limit` replica ids to terminate from `launched`, applying
/// [`ReplicaStatus::scale_down_decision_order`] and breaking ties by
/// traversal order (stable sort).
pub fn select_scale_down_targets<'a>(
    launched: impl Iterator<Item = &'a ReplicaInfo>,
    num_limit: usize,
) -> Vec<ReplicaId> {
    let mut sorted: Vec<&ReplicaInfo> = launched.collect();
    sorted.sort_by_key(|info| info.status.scale_down_rank());
    sorted
        .into_iter()
        .take(num_limit)
        .map(|info| info.replica_id)
        .collect()
}

/// Same ordering as [`select_scale_down_targets`], but returns full
/// snapshots rather than bare ids — used by the heterogeneous scaler's
/// scale-down candidates, which must carry `fallback_replica_id_list`
/// forward to the tick that actually drains them.
pub fn select_scale_down_infos<'a>(
    candidates: impl Iterator<Item = &'a ReplicaInfo>,
    num_limit: usize,
) -> Vec<ReplicaInfo> {
    let mut sorted: Vec<&ReplicaInfo> = candidates.collect();
    sorted.sort_by_key(|info| info.status.scale_down_rank());
    sorted.into_iter().take(num_limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replica(id: ReplicaId, status: ReplicaStatus) -> ReplicaInfo {
        ReplicaInfo {
            replica_id: id,
            status,
            is_ready: status == ReplicaStatus::Ready,
            is_primary: true,
            accelerator: AcceleratorType::A10,
            fallback_replica_id_list: vec![],
        }
    }

    #[test]
    fn is_launched_excludes_only_terminal_statuses() {
        assert!(replica(1, ReplicaStatus::Pending).is_launched());
        assert!(replica(1, ReplicaStatus::Ready).is_launched());
        assert!(replica(1, ReplicaStatus::NotReady).is_launched());
        assert!(!replica(1, ReplicaStatus::ShuttingDown).is_launched());
        assert!(!replica(1, ReplicaStatus::Failed).is_launched());
    }

    #[test]
    fn scale_down_order_prefers_failed_then_starting_then_pending_then_ready() {
        let replicas = vec![
            replica(1, ReplicaStatus::Ready),
            replica(2, ReplicaStatus::Failed),
            replica(3, ReplicaStatus::Pending),
            replica(4, ReplicaStatus::Starting),
        ];
        let targets = select_scale_down_targets(replicas.iter(), 4);
        assert_eq!(targets, vec![2, 4, 3, 1]);
    }

    #[test]
    fn unlisted_statuses_sort_after_listed_ones_preserving_traversal_order() {
        let replicas = vec![
            replica(1, ReplicaStatus::NotReady),
            replica(2, ReplicaStatus::Provisioning),
            replica(3, ReplicaStatus::Failed),
        ];
        let targets = select_scale_down_targets(replicas.iter(), 3);
        assert_eq!(targets, vec![3, 1, 2]);
    }

    #[test]
    fn accelerator_override_strings_match_historical_naming() {
        assert_eq!(AcceleratorType::A10.override_string(), "A10G:1");
        assert_eq!(AcceleratorType::A100.override_string(), "A100:1");
    }
}
