//! Multi-class, ILP-backed heterogeneous-accelerator scaler.
//!
//! Distributes a per-class request-rate histogram across accelerator types
//! by delegating to an injected [`Solver`], then reconciles the resulting
//! allocation against the live replica inventory: launching new
//! primary/fallback pairs, and deferring scale-downs by one tick through
//! `scale_down_candidates` so allocator jitter doesn't thrash the fleet.

use crate::autoscaler::{Autoscaler, RequestBatch};
use crate::config::{REQUEST_CLASS_COUNT, SCALE_UP_COOL_DOWN_INTERVAL_SECONDS};
use crate::decision::{AutoscalerDecision, DecisionEntry, ScaleUpOverride};
use crate::replica::{select_scale_down_infos, AcceleratorType, ReplicaId, ReplicaInfo};
use crate::solver::{allocation_count, Solver};
use crate::spec::ServiceSpec;
use crate::window::TimestampWindow;

/// Reconciles an ILP-solved accelerator allocation against the live
/// replica set, maintaining primary/fallback pairs and a one-tick-deferred
/// scale-down queue.
pub struct HeteroAccelAutoscaler {
    solver: Box<dyn Solver>,
    windows: [TimestampWindow; REQUEST_CLASS_COUNT],
    request_rate_dist: [f64; REQUEST_CLASS_COUNT],
    last_scale_operation: f64,
    scale_down_candidates: Vec<ReplicaInfo>,
}

impl HeteroAccelAutoscaler {
    pub fn new(_spec: &ServiceSpec, _decision_interval_seconds: f64, solver: Box<dyn Solver>) -> Self {
        Self {
            solver,
            windows: std::array::from_fn(|_| {
                TimestampWindow::new(SCALE_UP_COOL_DOWN_INTERVAL_SECONDS)
            }),
            request_rate_dist: [0.0; REQUEST_CLASS_COUNT],
            // Never hit by an initial cooldown check, however small `now` is
            // on the first tick — see `evaluate_scaling`'s cooldown gate.
            last_scale_operation: f64::NEG_INFINITY,
            scale_down_candidates: Vec::new(),
        }
    }

    pub fn scale_down_candidate_ids(&self) -> Vec<ReplicaId> {
        self.scale_down_candidates.iter().map(|c| c.replica_id).collect()
    }

    fn scale_up_entry(accelerator: AcceleratorType) -> DecisionEntry {
        let (fallback_count, fallback_type) = accelerator.fallback_allocation();
        let primary = AutoscalerDecision::scale_up(Some(ScaleUpOverride {
            accelerators: Some(accelerator.override_string()),
            is_primary: Some(true),
            is_fallback: Some(false),
        }));
        match fallback_type {
            None => DecisionEntry::Single(primary),
            Some(fallback_accelerator) => {
                let mut group: Vec<AutoscalerDecision> = (0..fallback_count)
                    .map(|_| {
                        AutoscalerDecision::scale_up(Some(ScaleUpOverride {
                            accelerators: Some(fallback_accelerator.override_string()),
                            is_primary: Some(false),
                            is_fallback: Some(true),
                        }))
                    })
                    .collect();
                group.push(primary);
                DecisionEntry::Group(group)
            }
        }
    }

    /// Drops all of `t`'s candidates from `scale_down_candidates` (`None`),
    /// or just the first `drop_count` of them in list order, leaving any
    /// remaining `t` candidates beyond that count in place (`Some`).
    fn purge_candidates(&mut self, t: AcceleratorType, drop_count: Option<usize>) {
        match drop_count {
            None => self.scale_down_candidates.retain(|c| c.accelerator != t),
            Some(drop_count) => {
                let mut dropped = 0usize;
                self.scale_down_candidates.retain(|c| {
                    if c.accelerator == t && dropped < drop_count {
                        dropped += 1;
                        false
                    } else {
                        true
                    }
                });
            }
        }
    }
}

impl Autoscaler for HeteroAccelAutoscaler {
    fn collect_request_information(&mut self, now: f64, batch: &RequestBatch) {
        let RequestBatch::ByClass { timestamps } = batch else {
            return;
        };
        for (class, window) in self.windows.iter_mut().enumerate() {
            if let Some(class_timestamps) = timestamps.get(class) {
                for &ts in class_timestamps {
                    window.record(ts, 1);
                }
            }
            window.trim(now);
            self.request_rate_dist[class] = window.rate();
        }
    }

    fn evaluate_scaling(&mut self, now: f64, replicas: &[ReplicaInfo]) -> Vec<DecisionEntry> {
        if now - self.last_scale_operation < SCALE_UP_COOL_DOWN_INTERVAL_SECONDS {
            return Vec::new();
        }
        // Advanced unconditionally, even if the solver call below fails —
        // this preserves the cooldown floor on decision frequency. See
        // DESIGN.md, "cooldown on solver failure".
        self.last_scale_operation = now;

        let allocation = match self.solver.solve(&self.request_rate_dist) {
            Ok(allocation) => allocation,
            Err(err) => {
                tracing::warn!(error = %err, "solver call failed, skipping reconciliation this tick");
                return Vec::new();
            }
        };

        let launched: Vec<&ReplicaInfo> = replicas.iter().filter(|r| r.is_launched()).collect();
        let mut decisions: Vec<DecisionEntry> = Vec::new();
        let mut additional_scale_down: Vec<ReplicaInfo> = Vec::new();

        for &t in AcceleratorType::ITERATION_ORDER.iter() {
            let alive = launched
                .iter()
                .filter(|r| r.accelerator == t && r.is_primary)
                .count() as i64;
            let want = allocation_count(&allocation, t) as i64;
            let candidate_count = self
                .scale_down_candidates
                .iter()
                .filter(|c| c.accelerator == t)
                .count() as i64;
            let diff = alive - want;

            if diff == 0 {
                self.purge_candidates(t, None);
            } else if diff < 0 {
                let deficit = (-diff) as usize;
                for _ in 0..deficit {
                    decisions.push(Self::scale_up_entry(t));
                }
                self.purge_candidates(t, None);
            } else {
                let extra = diff - candidate_count;
                if extra > 0 {
                    let already_candidate: Vec<ReplicaId> = self
                        .scale_down_candidates
                        .iter()
                        .map(|c| c.replica_id)
                        .collect();
                    let eligible = launched.iter().copied().filter(|r| {
                        r.accelerator == t
                            && r.is_primary
                            && !already_candidate.contains(&r.replica_id)
                    });
                    additional_scale_down
                        .extend(select_scale_down_infos(eligible, extra as usize));
                } else if extra < 0 {
                    self.purge_candidates(t, Some((-extra) as usize));
                }
            }
        }

        // Drain candidates carried over from a prior tick: these were
        // chosen at least one tick ago and the allocator still wants them
        // gone, so they're terminated now, along with their fallbacks.
        for candidate in &self.scale_down_candidates {
            decisions.push(DecisionEntry::Single(AutoscalerDecision::scale_down(
                candidate.replica_id,
            )));
            for &fallback_id in &candidate.fallback_replica_id_list {
                decisions.push(DecisionEntry::Single(AutoscalerDecision::scale_down(
                    fallback_id,
                )));
            }
        }

        let down_set: std::collections::HashSet<ReplicaId> = decisions
            .iter()
            .filter_map(|entry| match entry {
                DecisionEntry::Single(decision) => decision.scale_down_target(),
                DecisionEntry::Group(_) => None,
            })
            .collect();
        self.scale_down_candidates = additional_scale_down
            .into_iter()
            .filter(|c| !down_set.contains(&c.replica_id))
            .collect();

        if decisions.is_empty() {
            tracing::debug!("no scaling needed this tick");
        }
        decisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replica::ReplicaStatus;
    use crate::solver::fixtures::FixedSolver;

    fn spec() -> ServiceSpec {
        ServiceSpec {
            autoscaler_name: "hetero_accel".to_string(),
            min_replicas: 0,
            max_replicas: 10,
            target_qps_per_replica: None,
            initial_replicas: None,
            upscale_delay_seconds: None,
            downscale_delay_seconds: None,
        }
    }

    fn primary(id: ReplicaId, accelerator: AcceleratorType) -> ReplicaInfo {
        ReplicaInfo {
            replica_id: id,
            status: ReplicaStatus::Ready,
            is_ready: true,
            is_primary: true,
            accelerator,
            fallback_replica_id_list: vec![],
        }
    }

    fn scaler_with(allocation: Vec<(AcceleratorType, u32)>) -> HeteroAccelAutoscaler {
        HeteroAccelAutoscaler::new(
            &spec(),
            20.0,
            Box::new(FixedSolver { allocation }),
        )
    }

    #[test]
    fn steady_state_with_matching_inventory_emits_nothing() {
        let mut scaler = scaler_with(vec![(AcceleratorType::A10, 2), (AcceleratorType::A100, 0)]);
        let replicas = vec![primary(1, AcceleratorType::A10), primary(2, AcceleratorType::A10)];
        let decisions = scaler.evaluate_scaling(1_000.0, &replicas);
        assert!(decisions.is_empty());
    }

    #[test]
    fn upscale_to_a100_emits_grouped_fallbacks_then_primary() {
        let mut scaler = scaler_with(vec![(AcceleratorType::A10, 0), (AcceleratorType::A100, 1)]);
        let decisions = scaler.evaluate_scaling(1_000.0, &[]);
        assert_eq!(decisions.len(), 1);
        let DecisionEntry::Group(group) = &decisions[0] else {
            panic!("expected a grouped decision");
        };
        assert_eq!(group.len(), 5);
        for fallback in &group[..4] {
            assert_eq!(
                fallback,
                &AutoscalerDecision::scale_up(Some(ScaleUpOverride {
                    accelerators: Some("A10G:1".to_string()),
                    is_primary: Some(false),
                    is_fallback: Some(true),
                }))
            );
        }
        assert_eq!(
            group[4],
            AutoscalerDecision::scale_up(Some(ScaleUpOverride {
                accelerators: Some("A100:1".to_string()),
                is_primary: Some(true),
                is_fallback: Some(false),
            }))
        );
    }

    #[test]
    fn cooldown_suppresses_a_second_reconciliation() {
        let mut scaler = scaler_with(vec![(AcceleratorType::A10, 1)]);
        let first = scaler.evaluate_scaling(0.0, &[]);
        assert!(!first.is_empty());
        let second = scaler.evaluate_scaling(10.0, &[]);
        assert!(second.is_empty());
    }

    #[test]
    fn scale_down_is_deferred_to_the_tick_after_it_is_chosen() {
        let mut scaler = scaler_with(vec![(AcceleratorType::A10, 1)]);
        let replicas = vec![
            primary(1, AcceleratorType::A10),
            primary(2, AcceleratorType::A10),
            primary(3, AcceleratorType::A10),
        ];

        // Tick A: allocator wants 1, inventory has 3 -> 2 become candidates,
        // no ScaleDown decisions are emitted yet.
        let tick_a = scaler.evaluate_scaling(0.0, &replicas);
        assert!(tick_a.is_empty());
        assert_eq!(scaler.scale_down_candidate_ids().len(), 2);

        // Tick B (after cooldown): same allocation and inventory -> the two
        // deferred candidates are drained as ScaleDown decisions.
        let tick_b = scaler.evaluate_scaling(
            SCALE_UP_COOL_DOWN_INTERVAL_SECONDS + 1.0,
            &replicas,
        );
        assert_eq!(tick_b.len(), 2);
        for entry in &tick_b {
            let DecisionEntry::Single(decision) = entry else {
                panic!("expected single scale-down decisions");
            };
            assert!(decision.scale_down_target().is_some());
        }
        assert!(scaler.scale_down_candidate_ids().is_empty());
    }

    #[test]
    fn allocator_backing_off_releases_excess_candidates() {
        let mut scaler = scaler_with(vec![(AcceleratorType::A10, 1)]);
        let replicas = vec![
            primary(1, AcceleratorType::A10),
            primary(2, AcceleratorType::A10),
            primary(3, AcceleratorType::A10),
        ];
        scaler.evaluate_scaling(0.0, &replicas);
        assert_eq!(scaler.scale_down_candidate_ids().len(), 2);

        // Next tick: allocator now wants 2 (diff=1, cand=2, extra=-1) ->
        // release exactly one candidate, but the other one stays in
        // scale_down_candidates and is drained (the deferred scale-down
        // it carries over from the previous tick still lands).
        scaler.solver = Box::new(FixedSolver {
            allocation: vec![(AcceleratorType::A10, 2)],
        });
        let tick_b = scaler.evaluate_scaling(
            SCALE_UP_COOL_DOWN_INTERVAL_SECONDS + 1.0,
            &replicas,
        );
        assert_eq!(tick_b.len(), 1);
        assert!(scaler.scale_down_candidate_ids().is_empty());
    }

    #[test]
    fn fallbacks_of_a_draining_primary_scale_down_in_the_same_tick() {
        let mut scaler = scaler_with(vec![(AcceleratorType::A100, 0)]);
        let primary_with_fallbacks = ReplicaInfo {
            fallback_replica_id_list: vec![10, 11, 12, 13],
            ..primary(5, AcceleratorType::A100)
        };
        scaler.evaluate_scaling(0.0, &[primary_with_fallbacks.clone()]);
        assert_eq!(scaler.scale_down_candidate_ids(), vec![5]);

        let tick_b = scaler.evaluate_scaling(
            SCALE_UP_COOL_DOWN_INTERVAL_SECONDS + 1.0,
            &[primary_with_fallbacks],
        );
        let targets: Vec<ReplicaId> = tick_b
            .iter()
            .filter_map(|entry| match entry {
                DecisionEntry::Single(decision) => decision.scale_down_target(),
                DecisionEntry::Group(_) => None,
            })
            .collect();
        assert_eq!(targets, vec![5, 10, 11, 12, 13]);
    }
}
