//! The service-level scaling spec supplied by the caller.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Static scaling parameters for one service, as handed to
/// [`crate::registry::build_autoscaler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub autoscaler_name: String,
    pub min_replicas: u32,
    pub max_replicas: u32,
    /// Target queries-per-replica used by the rate-based scaler.
    pub target_qps_per_replica: Option<f64>,
    /// Initial replica count used before the bootstrap window fills.
    pub initial_replicas: Option<u32>,
    /// Consecutive over-threshold decision periods required before a
    /// scale-up is emitted.
    pub upscale_delay_seconds: Option<f64>,
    /// Consecutive under-threshold decision periods required before a
    /// scale-down is emitted.
    pub downscale_delay_seconds: Option<f64>,
}

impl ServiceSpec {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_replicas < self.min_replicas {
            return Err(ConfigError::InvalidReplicaBounds {
                min: self.min_replicas,
                max: self.max_replicas,
            });
        }
        Ok(())
    }

    pub fn initial_replicas(&self) -> u32 {
        self.initial_replicas.unwrap_or(self.min_replicas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(min: u32, max: u32) -> ServiceSpec {
        ServiceSpec {
            autoscaler_name: "request_rate".to_string(),
            min_replicas: min,
            max_replicas: max,
            target_qps_per_replica: Some(2.0),
            initial_replicas: None,
            upscale_delay_seconds: None,
            downscale_delay_seconds: None,
        }
    }

    #[test]
    fn rejects_max_below_min() {
        assert!(spec(4, 2).validate().is_err());
    }

    #[test]
    fn accepts_equal_bounds() {
        assert!(spec(2, 2).validate().is_ok());
    }

    #[test]
    fn initial_replicas_defaults_to_min() {
        assert_eq!(spec(2, 8).initial_replicas(), 2);
    }
}
