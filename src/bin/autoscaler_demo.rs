//! Demonstration control loop driving both scaling policies.
//!
//! This binary is not part of the library's contract — it exists to show
//! the outer loop described by the crate's docs: tick on a fixed interval,
//! hand the scaler a request batch, then a replica inventory, and enact
//! whatever decisions come back. Everything here (the mock replica
//! inventory, the greedy "solver") is demo scaffolding; the library itself
//! performs no I/O and spawns no tasks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::time::{interval, Duration};

use fleet_autoscaler::autoscaler::hetero::HeteroAccelAutoscaler;
use fleet_autoscaler::autoscaler::rate::RequestRateAutoscaler;
use fleet_autoscaler::config::{
    AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS, REQUEST_CLASS_COUNT,
};
use fleet_autoscaler::solver::{Allocation, Solver};
use fleet_autoscaler::{
    AcceleratorType, Autoscaler, AutoscalerDecision, DecisionEntry, ReplicaInfo, ReplicaStatus,
    RequestBatch, ServiceSpec,
};

/// A stand-in for the reference ILP allocator: splits the busiest classes
/// across accelerator types by a fixed per-replica QPS budget. Not part of
/// the library — the real solver's internals are out of this crate's
/// scope.
struct GreedySolver {
    qps_per_a10: f64,
    qps_per_a100: f64,
}

impl Solver for GreedySolver {
    fn solve(
        &self,
        request_rate_dist: &[f64],
    ) -> Result<Allocation, fleet_autoscaler::error::SolverError> {
        let total: f64 = request_rate_dist.iter().sum();
        let a100_count = (total / self.qps_per_a100 / 2.0).ceil() as u32;
        let remaining = (total - a100_count as f64 * self.qps_per_a100).max(0.0);
        let a10_count = (remaining / self.qps_per_a10).ceil() as u32;
        Ok(vec![
            (AcceleratorType::A10, a10_count),
            (AcceleratorType::A100, a100_count),
        ])
    }
}

/// A toy in-memory replica inventory standing in for the replica manager
/// and persistence layer the real core would be wired against.
struct MockFleet {
    next_id: AtomicU64,
    replicas: Mutex<Vec<ReplicaInfo>>,
}

impl MockFleet {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            replicas: Mutex::new(Vec::new()),
        }
    }

    fn enact(&self, entries: &[DecisionEntry]) {
        let mut replicas = self.replicas.lock().expect("mock fleet mutex poisoned");
        for decision in DecisionEntry::flatten(entries) {
            match decision {
                AutoscalerDecision::ScaleUp(override_) => {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                    let accelerator = override_
                        .as_ref()
                        .and_then(|o| o.accelerators.as_deref())
                        .map(|s| if s.starts_with("A100") { AcceleratorType::A100 } else { AcceleratorType::A10 })
                        .unwrap_or(AcceleratorType::A10);
                    let is_primary = override_.as_ref().and_then(|o| o.is_primary).unwrap_or(true);
                    replicas.push(ReplicaInfo {
                        replica_id: id,
                        status: ReplicaStatus::Ready,
                        is_ready: true,
                        is_primary,
                        accelerator,
                        fallback_replica_id_list: vec![],
                    });
                    tracing::info!(replica_id = id, ?accelerator, is_primary, "launched replica");
                }
                AutoscalerDecision::ScaleDown(id) => {
                    replicas.retain(|r| r.replica_id != *id);
                    tracing::info!(replica_id = id, "terminated replica");
                }
            }
        }
    }

    fn snapshot(&self) -> Vec<ReplicaInfo> {
        self.replicas.lock().expect("mock fleet mutex poisoned").clone()
    }
}

fn synthetic_batch(tick: u64) -> Vec<f64> {
    let count = 5 + (tick % 7) * 3;
    (0..count).map(|i| tick as f64 * 10.0 + i as f64 * 0.1).collect()
}

fn synthetic_histogram(tick: u64) -> Vec<Vec<f64>> {
    (0..REQUEST_CLASS_COUNT)
        .map(|class| {
            let count = 2 + ((tick + class as u64) % 5);
            (0..count).map(|i| tick as f64 * 10.0 + i as f64 * 0.1).collect()
        })
        .collect()
}

async fn run_rate_based() {
    let spec = ServiceSpec {
        autoscaler_name: "request_rate".to_string(),
        min_replicas: 1,
        max_replicas: 5,
        target_qps_per_replica: Some(5.0),
        initial_replicas: None,
        upscale_delay_seconds: Some(30.0),
        downscale_delay_seconds: Some(60.0),
    };
    let mut scaler = RequestRateAutoscaler::new(&spec, AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS);
    let fleet = MockFleet::new();
    let mut ticker = interval(Duration::from_secs_f64(AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS));

    for tick in 0..6u64 {
        ticker.tick().await;
        let now = tick as f64 * AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS;
        let batch = RequestBatch::Uniform { timestamps: synthetic_batch(tick) };
        scaler.collect_request_information(now, &batch);

        let decisions = scaler.evaluate_scaling(now, &fleet.snapshot());
        fleet.enact(&decisions);
        tracing::info!(tick, target = scaler.target_num_replicas(), "rate-based tick complete");
    }
}

async fn run_hetero_accel() {
    let spec = ServiceSpec {
        autoscaler_name: "hetero_accel".to_string(),
        min_replicas: 0,
        max_replicas: 20,
        target_qps_per_replica: None,
        initial_replicas: None,
        upscale_delay_seconds: None,
        downscale_delay_seconds: None,
    };
    let solver = GreedySolver { qps_per_a10: 2.0, qps_per_a100: 8.0 };
    let mut scaler = HeteroAccelAutoscaler::new(
        &spec,
        AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS,
        Box::new(solver),
    );
    let fleet = MockFleet::new();
    let mut ticker = interval(Duration::from_secs_f64(AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS));

    for tick in 0..6u64 {
        ticker.tick().await;
        let now = tick as f64 * AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS;
        let batch = RequestBatch::ByClass { timestamps: synthetic_histogram(tick) };
        scaler.collect_request_information(now, &batch);

        let decisions = scaler.evaluate_scaling(now, &fleet.snapshot());
        fleet.enact(&decisions);
        tracing::info!(tick, fleet_size = fleet.snapshot().len(), "hetero tick complete");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("starting rate-based autoscaler demo");
    run_rate_based().await;

    tracing::info!("starting heterogeneous-accelerator autoscaler demo");
    run_hetero_accel().await;

    Ok(())
}
