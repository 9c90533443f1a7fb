//! Prometheus metrics for the API server.
//!
//! Job-level metrics (durations, failures by kind) are recorded by the
//! worker crate; this module covers HTTP traffic and job intake.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "mediajob_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "mediajob_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "mediajob_http_requests_in_flight";

    // Intake
    pub const JOBS_ACCEPTED_TOTAL: &str = "mediajob_jobs_accepted_total";
    pub const WEBHOOK_DELIVERIES_TOTAL: &str = "mediajob_webhook_deliveries_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, route: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a job passing validation.
pub fn record_job_accepted(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::JOBS_ACCEPTED_TOTAL, &labels).increment(1);
}

/// Record a webhook delivery attempt.
pub fn record_webhook_delivery(delivered: bool) {
    let outcome = if delivered { "delivered" } else { "failed" };
    let labels = [("outcome", outcome.to_string())];
    counter!(names::WEBHOOK_DELIVERIES_TOTAL, &labels).increment(1);
}

/// Route template used as the path label, so unknown paths share one series.
fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let route = route_label(&request);
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &route, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label() {
        let request = Request::builder()
            .uri("/nothing/here")
            .body(Body::empty())
            .unwrap();
        assert_eq!(route_label(&request), "unmatched");
    }
}
