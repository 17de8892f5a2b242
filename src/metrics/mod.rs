use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use prometheus::IntGaugeVec;
use prometheus::Opts;
use prometheus::Registry;

use crate::Result;

lazy_static! {
    pub static ref ACTIVE_WATCHES: IntGaugeVec = IntGaugeVec::new(
        Opts::new("xds_active_watches", "Number of open watches"),
        &["type_url"]
    )
    .expect("metric can not be created");

    pub static ref DELIVERED_RESPONSES: IntCounterVec = IntCounterVec::new(
        Opts::new("xds_delivered_responses", "Snapshots handed to watch consumers"),
        &["type_url"]
    )
    .expect("metric can not be created");

    pub static ref GENERATION_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("xds_generation_failures", "Snapshot generations that failed"),
        &["type_url"]
    )
    .expect("metric can not be created");

    pub static ref FETCH_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("xds_fetch_requests", "One-shot fetch requests served"),
        &["type_url"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = {
        let registry = Registry::new();
        register_custom_metrics(&registry).expect("collector can be registered");
        registry
    };
}

pub fn register_custom_metrics(registry: &Registry) -> Result<()> {
    registry.register(Box::new(ACTIVE_WATCHES.clone()))?;
    registry.register(Box::new(DELIVERED_RESPONSES.clone()))?;
    registry.register(Box::new(GENERATION_FAILURES.clone()))?;
    registry.register(Box::new(FETCH_REQUESTS.clone()))?;
    Ok(())
}

/// Render every collector in the Prometheus text exposition format.
pub fn encode_metrics() -> Result<String> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
