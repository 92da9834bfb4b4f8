//! Name → constructor registry selecting a scaling policy from a spec.

use std::collections::HashMap;
use std::sync::Mutex;

use lazy_static::lazy_static;

use crate::autoscaler::hetero::HeteroAccelAutoscaler;
use crate::autoscaler::rate::RequestRateAutoscaler;
use crate::autoscaler::Autoscaler;
use crate::config::AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS;
use crate::error::ConfigError;
use crate::solver::Solver;
use crate::spec::ServiceSpec;

pub const REQUEST_RATE_AUTOSCALER_NAME: &str = "request_rate";
pub const HETERO_ACCEL_AUTOSCALER_NAME: &str = "hetero_accel";

type Constructor = Box<dyn Fn(&ServiceSpec, f64) -> Box<dyn Autoscaler> + Send + Sync>;

lazy_static! {
    static ref REGISTRY: Mutex<HashMap<&'static str, Constructor>> = {
        let mut m: HashMap<&'static str, Constructor> = HashMap::new();
        m.insert(
            REQUEST_RATE_AUTOSCALER_NAME,
            Box::new(|spec, interval| {
                Box::new(RequestRateAutoscaler::new(spec, interval)) as Box<dyn Autoscaler>
            }) as Constructor,
        );
        Mutex::new(m)
    };
}

/// Registers a constructor for heterogeneous-accelerator scalers under
/// `HETERO_ACCEL_AUTOSCALER_NAME`, wiring in the caller's `Solver`.
///
/// Unlike [`RequestRateAutoscaler`], this policy needs a runtime-supplied
/// collaborator (the allocator) captured into its constructor closure, so
/// it isn't registered at module init the way the rate-based policy is.
/// Callers that want `build_autoscaler` to resolve `hetero_accel` by name
/// must call this once at startup with their solver implementation.
pub fn register_hetero_accel(solver_factory: fn() -> Box<dyn Solver>) {
    let mut registry = REGISTRY.lock().expect("registry mutex poisoned");
    registry.insert(
        HETERO_ACCEL_AUTOSCALER_NAME,
        Box::new(move |spec, interval| {
            Box::new(HeteroAccelAutoscaler::new(spec, interval, solver_factory())) as Box<dyn Autoscaler>
        }) as Constructor,
    );
}

/// Builds an autoscaler for `spec` using [`AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS`].
pub fn build_autoscaler(spec: &ServiceSpec) -> Result<Box<dyn Autoscaler>, ConfigError> {
    build_autoscaler_with_interval(spec, AUTOSCALER_DEFAULT_DECISION_INTERVAL_SECONDS)
}

pub fn build_autoscaler_with_interval(
    spec: &ServiceSpec,
    decision_interval_seconds: f64,
) -> Result<Box<dyn Autoscaler>, ConfigError> {
    spec.validate()?;
    let registry = REGISTRY.lock().expect("registry mutex poisoned");
    let constructor = registry
        .get(spec.autoscaler_name.as_str())
        .ok_or_else(|| ConfigError::UnknownAutoscaler(spec.autoscaler_name.clone()))?;
    Ok(constructor(spec, decision_interval_seconds))
}
