//! Job metrics.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_COMPLETED_TOTAL: &str = "mediajob_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "mediajob_jobs_failed_total";
    pub const JOB_DURATION_SECONDS: &str = "mediajob_job_duration_seconds";
    pub const ENGINE_DURATION_SECONDS: &str = "mediajob_engine_duration_seconds";
    pub const DOWNLOAD_DURATION_SECONDS: &str = "mediajob_download_duration_seconds";
}

pub fn record_job_completed(task: &str, duration_secs: f64) {
    let labels = [("task", task.to_string())];
    counter!(names::JOBS_COMPLETED_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_job_failed(task: &str, kind: &str) {
    let labels = [("task", task.to_string()), ("kind", kind.to_string())];
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
}

pub fn record_engine_duration(engine: &str, duration_secs: f64) {
    let labels = [("engine", engine.to_string())];
    histogram!(names::ENGINE_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_download_duration(duration_secs: f64) {
    histogram!(names::DOWNLOAD_DURATION_SECONDS).record(duration_secs);
}
