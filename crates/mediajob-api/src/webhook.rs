//! Webhook delivery for background jobs.

use tracing::{info, warn};

use crate::envelope::JobEnvelope;
use crate::metrics;

/// POST the finished envelope to the caller's webhook.
///
/// Delivery is attempted once. Returns whether the receiver accepted it.
pub async fn deliver(http: &reqwest::Client, url: &str, envelope: &JobEnvelope) -> bool {
    let delivered = match http.post(url).json(envelope).send().await {
        Ok(response) if response.status().is_success() => {
            info!(url, code = envelope.code, "Webhook delivered");
            true
        }
        Ok(response) => {
            warn!(url, status = %response.status(), "Webhook receiver rejected result");
            false
        }
        Err(e) => {
            warn!(url, error = %e, "Webhook delivery failed");
            false
        }
    };

    metrics::record_webhook_delivery(delivered);
    delivered
}
