//! Uniform job response body.

use axum::http::StatusCode;
use serde::Serialize;

use mediajob_models::{JobOutcome, JobRequest};
use mediajob_worker::JobError;

use crate::stages::AcceptedJob;

/// Body returned to the caller and POSTed to webhooks.
#[derive(Debug, Clone, Serialize)]
pub struct JobEnvelope {
    pub code: u16,
    /// Caller-supplied correlation id
    pub id: Option<String>,
    pub job_id: String,
    pub endpoint: String,
    pub response: Option<JobOutcome>,
    pub message: String,
}

impl JobEnvelope {
    fn base(job: &AcceptedJob, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            id: job.client_id.clone(),
            job_id: job.job_id.to_string(),
            endpoint: job.endpoint.to_string(),
            response: None,
            message: message.into(),
        }
    }

    /// The job will run in the background.
    pub fn accepted(job: &AcceptedJob) -> Self {
        Self::base(job, StatusCode::ACCEPTED, "processing")
    }

    pub fn success(job: &AcceptedJob, outcome: JobOutcome) -> Self {
        let mut envelope = Self::base(job, StatusCode::OK, "success");
        envelope.response = Some(outcome);
        envelope
    }

    /// Merge failures carry the engine's diagnostic verbatim; transcription
    /// failures carry the error message.
    pub fn failure(job: &AcceptedJob, error: &JobError) -> Self {
        let status = if error.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = match job.request {
            JobRequest::Merge(_) => error.report_body(),
            JobRequest::Transcribe(_) => error.to_string(),
        };
        Self::base(job, status, message)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
