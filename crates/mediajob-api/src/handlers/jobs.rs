//! Job endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;

use mediajob_models::{JobRequest, MergeRequest, TranscribeRequest};

use crate::error::ApiResult;
use crate::stages::{accept_job, dispatch, parse_payload, validate_payload};
use crate::state::AppState;

pub const MERGE_AUDIO_ENDPOINT: &str = "/v1/video/merge-audio";
pub const TRANSCRIBE_ENDPOINT: &str = "/v1/media/transcribe";

/// Replace a video's audio track with another file.
pub async fn merge_audio(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let payload: MergeRequest = parse_payload(&body)?;
    let request = validate_payload(&state, payload, JobRequest::Merge)?;
    let job = accept_job(request, MERGE_AUDIO_ENDPOINT);
    Ok(dispatch(&state, job).await)
}

/// Transcribe or translate speech into text, SRT and segments.
pub async fn transcribe(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let payload: TranscribeRequest = parse_payload(&body)?;
    let request = validate_payload(&state, payload, JobRequest::Transcribe)?;
    let job = accept_job(request, TRANSCRIBE_ENDPOINT);
    Ok(dispatch(&state, job).await)
}
