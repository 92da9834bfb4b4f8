//! Decision types emitted by an [`crate::autoscaler::Autoscaler`].

use serde::{Deserialize, Serialize};

use crate::replica::ReplicaId;

/// Resource override attached to a `ScaleUp` decision.
///
/// A closed record rather than a free-form map: the heterogeneous scaler
/// only ever populates these three fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleUpOverride {
    /// Accelerator request string, e.g. `"A100:1"` or the historical
    /// `"A10G:1"` spelling for `A10`.
    pub accelerators: Option<String>,
    pub is_primary: Option<bool>,
    pub is_fallback: Option<bool>,
}

/// A single scaling decision.
///
/// Modeled as a closed enum rather than an `{operator, target}` pair with
/// a runtime-checked invariant: a `ScaleDown` cannot be constructed with
/// anything but a replica id, so that contract violation is unrepresentable
/// rather than trapped at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AutoscalerDecision {
    ScaleUp(Option<ScaleUpOverride>),
    ScaleDown(ReplicaId),
}

impl AutoscalerDecision {
    pub fn scale_up(override_: Option<ScaleUpOverride>) -> Self {
        Self::ScaleUp(override_)
    }

    pub fn scale_down(replica_id: ReplicaId) -> Self {
        Self::ScaleDown(replica_id)
    }

    /// The replica id targeted by a `ScaleDown`, if this is one.
    pub fn scale_down_target(&self) -> Option<ReplicaId> {
        match self {
            Self::ScaleDown(id) => Some(*id),
            Self::ScaleUp(_) => None,
        }
    }
}

/// An entry in the decision stream returned by `evaluate_scaling`.
///
/// A group denotes decisions that must be enacted atomically — used to
/// launch a primary together with its fallback replicas in one shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecisionEntry {
    Single(AutoscalerDecision),
    Group(Vec<AutoscalerDecision>),
}

impl DecisionEntry {
    /// Flattens a slice of entries into the individual decisions it
    /// contains, for callers (and tests) that don't care about grouping.
    pub fn flatten(entries: &[DecisionEntry]) -> Vec<&AutoscalerDecision> {
        entries
            .iter()
            .flat_map(|entry| match entry {
                DecisionEntry::Single(decision) => std::slice::from_ref(decision),
                DecisionEntry::Group(group) => group.as_slice(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_down_target_only_on_scale_down() {
        let up = AutoscalerDecision::scale_up(None);
        let down = AutoscalerDecision::scale_down(7);
        assert_eq!(up.scale_down_target(), None);
        assert_eq!(down.scale_down_target(), Some(7));
    }

    #[test]
    fn flatten_preserves_order_across_groups() {
        let entries = vec![
            DecisionEntry::Single(AutoscalerDecision::scale_down(1)),
            DecisionEntry::Group(vec![
                AutoscalerDecision::scale_up(None),
                AutoscalerDecision::scale_up(None),
            ]),
            DecisionEntry::Single(AutoscalerDecision::scale_down(2)),
        ];
        let flat = DecisionEntry::flatten(&entries);
        assert_eq!(flat.len(), 4);
        assert_eq!(flat[0].scale_down_target(), Some(1));
        assert_eq!(flat[3].scale_down_target(), Some(2));
    }
}
