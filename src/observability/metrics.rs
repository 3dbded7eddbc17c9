use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub deliveries_created_total: IntCounter,
    pub deliveries_completed_total: IntCounter,
    pub deliveries_pending: IntGauge,
    pub geocoding_requests_total: IntCounterVec,
    pub geocoding_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let deliveries_created_total =
            IntCounter::new("deliveries_created_total", "Total deliveries created")
                .expect("valid deliveries_created_total metric");

        let deliveries_completed_total =
            IntCounter::new("deliveries_completed_total", "Total deliveries confirmed")
                .expect("valid deliveries_completed_total metric");

        let deliveries_pending =
            IntGauge::new("deliveries_pending", "Current number of pending deliveries")
                .expect("valid deliveries_pending metric");

        let geocoding_requests_total = IntCounterVec::new(
            Opts::new("geocoding_requests_total", "Geocoding lookups by outcome"),
            &["outcome"],
        )
        .expect("valid geocoding_requests_total metric");

        let geocoding_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "geocoding_latency_seconds",
                "Latency of geocoding lookups in seconds",
            ),
            &["outcome"],
        )
        .expect("valid geocoding_latency_seconds metric");

        registry
            .register(Box::new(deliveries_created_total.clone()))
            .expect("register deliveries_created_total");
        registry
            .register(Box::new(deliveries_completed_total.clone()))
            .expect("register deliveries_completed_total");
        registry
            .register(Box::new(deliveries_pending.clone()))
            .expect("register deliveries_pending");
        registry
            .register(Box::new(geocoding_requests_total.clone()))
            .expect("register geocoding_requests_total");
        registry
            .register(Box::new(geocoding_latency_seconds.clone()))
            .expect("register geocoding_latency_seconds");

        Self {
            registry,
            deliveries_created_total,
            deliveries_completed_total,
            deliveries_pending,
            geocoding_requests_total,
            geocoding_latency_seconds,
        }
    }

    pub fn observe_geocoding(&self, outcome: &str, elapsed_secs: f64) {
        self.geocoding_requests_total
            .with_label_values(&[outcome])
            .inc();
        self.geocoding_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_secs);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
