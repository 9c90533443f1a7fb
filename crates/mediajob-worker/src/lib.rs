//! Media job pipeline.
//!
//! This crate provides:
//! - [`JobPipeline`], which fetches inputs, runs FFmpeg or a speech engine,
//!   synthesizes subtitles and materializes the result
//! - Per-job scratch space that is removed on every exit path
//! - The [`JobError`] taxonomy reported to callers
//! - Structured job logging and job metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod materialize;
pub mod metrics;
pub mod pipeline;
pub mod scratch;

pub use config::WorkerConfig;
pub use error::{JobError, JobResult};
pub use logging::JobLogger;
pub use materialize::ResultMaterializer;
pub use pipeline::JobPipeline;
pub use scratch::ScratchSpace;
