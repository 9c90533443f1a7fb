//! Axum HTTP API server for media jobs.
//!
//! This crate provides:
//! - `POST /v1/video/merge-audio` and `POST /v1/media/transcribe`
//! - Synchronous responses or webhook delivery for background jobs
//! - Liveness/readiness probes
//! - Prometheus metrics

pub mod config;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod stages;
pub mod state;
pub mod webhook;

pub use config::ApiConfig;
pub use envelope::JobEnvelope;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use stages::AcceptedJob;
pub use state::AppState;
