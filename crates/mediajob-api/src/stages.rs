//! Request handling stages.
//!
//! Every job endpoint runs the same chain:
//! `parse_payload -> validate_payload -> accept_job -> dispatch`.
//! Parse and validation failures are answered before a job id exists.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::{info, warn, Instrument};
use validator::Validate;

use mediajob_models::{JobId, JobRequest};

use crate::envelope::JobEnvelope;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use crate::webhook;

/// A validated request with its freshly assigned id.
#[derive(Debug, Clone)]
pub struct AcceptedJob {
    pub job_id: JobId,
    pub client_id: Option<String>,
    pub endpoint: &'static str,
    pub request: JobRequest,
}

/// Decode a JSON body, rejecting unknown fields.
pub fn parse_payload<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Field-level validation followed by URI checks. Nothing is downloaded here.
pub fn validate_payload<T: Validate>(
    state: &AppState,
    payload: T,
    into_request: impl FnOnce(T) -> JobRequest,
) -> ApiResult<JobRequest> {
    payload.validate()?;
    let request = into_request(payload);
    state.pipeline.validate(&request)?;
    Ok(request)
}

/// Assign a job id to a validated request.
pub fn accept_job(request: JobRequest, endpoint: &'static str) -> AcceptedJob {
    let job = AcceptedJob {
        job_id: JobId::new(),
        client_id: request.client_id().map(str::to_string),
        endpoint,
        request,
    };
    metrics::record_job_accepted(endpoint);
    info!(
        job_id = %job.job_id,
        endpoint,
        task = %job.request.task(),
        "Accepted job"
    );
    job
}

/// Run the job inline, or in the background when a webhook is given.
pub async fn dispatch(state: &AppState, job: AcceptedJob) -> Response {
    let Some(webhook_url) = job.request.webhook_url().map(str::to_string) else {
        let envelope = execute(state, &job).await;
        return (envelope.status(), Json(envelope)).into_response();
    };

    let accepted = JobEnvelope::accepted(&job);
    let state = state.clone();
    let span = tracing::info_span!("background_job", job_id = %job.job_id);
    tokio::spawn(
        async move {
            let envelope = execute(&state, &job).await;
            if !webhook::deliver(&state.http, &webhook_url, &envelope).await {
                warn!("Job finished but its result was not delivered");
            }
        }
        .instrument(span),
    );

    (StatusCode::ACCEPTED, Json(accepted)).into_response()
}

async fn execute(state: &AppState, job: &AcceptedJob) -> JobEnvelope {
    match state.pipeline.run(&job.job_id, &job.request).await {
        Ok(outcome) => JobEnvelope::success(job, outcome),
        Err(e) => JobEnvelope::failure(job, &e),
    }
}
