use std::net::SocketAddr;

// ── Report metrics ──────────────────────────────────────────────

/// Counter: usage reports computed.
pub const REPORTS_TOTAL: &str = "auslast_reports_total";

/// Histogram: report computation latency in seconds.
pub const REPORT_DURATION_SECONDS: &str = "auslast_report_duration_seconds";

/// Histogram: bookings aggregated per report.
pub const REPORT_BOOKINGS: &str = "auslast_report_bookings";

/// Counter: bookings skipped because their venue was absent from the
/// report's venue set.
pub const BOOKINGS_SKIPPED_TOTAL: &str = "auslast_bookings_skipped_total";

/// Install the Prometheus metrics exporter on the given port, for embedding
/// applications that want the engine's metrics scraped. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
