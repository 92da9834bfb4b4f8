//! Single-class, homogeneous rate-based scaler.

use crate::autoscaler::{Autoscaler, RequestBatch};
use crate::config::AUTOSCALER_QPS_WINDOW_SIZE_SECONDS;
use crate::decision::{AutoscalerDecision, DecisionEntry};
use crate::replica::{select_scale_down_targets, ReplicaInfo};
use crate::spec::ServiceSpec;
use crate::window::TimestampWindow;

/// Tracks requests-per-second against a target QPS per replica and applies
/// consecutive-period hysteresis in both directions.
pub struct RequestRateAutoscaler {
    min_replicas: u32,
    max_replicas: u32,
    target_qps_per_replica: Option<f64>,
    upscale_periods: u32,
    downscale_periods: u32,

    target_num_replicas: u32,
    timestamps: TimestampWindow,
    upscale_counter: u32,
    downscale_counter: u32,
    bootstrap_done: bool,
}

impl RequestRateAutoscaler {
    pub fn new(spec: &ServiceSpec, decision_interval_seconds: f64) -> Self {
        let upscale_periods =
            (spec.upscale_delay_seconds.unwrap_or(0.0) / decision_interval_seconds).floor() as u32;
        let downscale_periods = (spec.downscale_delay_seconds.unwrap_or(0.0)
            / decision_interval_seconds)
            .floor() as u32;
        Self {
            min_replicas: spec.min_replicas,
            max_replicas: spec.max_replicas,
            target_qps_per_replica: spec.target_qps_per_replica,
            upscale_periods,
            downscale_periods,
            target_num_replicas: spec.initial_replicas(),
            timestamps: TimestampWindow::new(AUTOSCALER_QPS_WINDOW_SIZE_SECONDS),
            upscale_counter: 0,
            downscale_counter: 0,
            bootstrap_done: false,
        }
    }

    fn clamp(&self, n: i64) -> u32 {
        n.clamp(self.min_replicas as i64, self.max_replicas as i64) as u32
    }

    fn desired_clamped(&self) -> u32 {
        match self.target_qps_per_replica {
            None => self.target_num_replicas,
            Some(target_qps) => {
                let rate = self.timestamps.rate();
                let raw = (rate / target_qps).ceil() as i64;
                self.clamp(raw)
            }
        }
    }

    /// Advances the hysteresis state machine and returns the (possibly
    /// unchanged) committed target.
    fn step_hysteresis(&mut self, desired_clamped: u32) -> u32 {
        if !self.bootstrap_done {
            self.bootstrap_done = true;
            self.target_num_replicas = desired_clamped;
            return self.target_num_replicas;
        }

        use std::cmp::Ordering;
        match desired_clamped.cmp(&self.target_num_replicas) {
            Ordering::Greater => {
                self.upscale_counter += 1;
                self.downscale_counter = 0;
                if self.upscale_counter >= self.upscale_periods {
                    self.target_num_replicas = desired_clamped;
                    self.upscale_counter = 0;
                }
            }
            Ordering::Less => {
                self.downscale_counter += 1;
                self.upscale_counter = 0;
                if self.downscale_counter >= self.downscale_periods {
                    self.target_num_replicas = desired_clamped;
                    self.downscale_counter = 0;
                }
            }
            Ordering::Equal => {
                self.upscale_counter = 0;
                self.downscale_counter = 0;
            }
        }
        self.target_num_replicas
    }

    pub fn target_num_replicas(&self) -> u32 {
        self.target_num_replicas
    }
}

impl Autoscaler for RequestRateAutoscaler {
    fn collect_request_information(&mut self, now: f64, batch: &RequestBatch) {
        let RequestBatch::Uniform { timestamps } = batch else {
            return;
        };
        for &ts in timestamps {
            self.timestamps.record(ts, 1);
        }
        self.timestamps.trim(now);
    }

    fn evaluate_scaling(&mut self, now: f64, replicas: &[ReplicaInfo]) -> Vec<DecisionEntry> {
        self.timestamps.trim(now);

        let desired = self.desired_clamped();
        let target = self.step_hysteresis(desired);

        let launched: Vec<&ReplicaInfo> = replicas.iter().filter(|r| r.is_launched()).collect();
        let launched_count = launched.len() as u32;

        if launched_count < target {
            let deficit = (target - launched_count) as usize;
            (0..deficit)
                .map(|_| DecisionEntry::Single(AutoscalerDecision::scale_up(None)))
                .collect()
        } else if launched_count > target {
            let surplus = (launched_count - target) as usize;
            let victims = select_scale_down_targets(launched.into_iter(), surplus);
            victims
                .into_iter()
                .map(|id| DecisionEntry::Single(AutoscalerDecision::scale_down(id)))
                .collect()
        } else {
            Vec::new()
        }
    }
}
