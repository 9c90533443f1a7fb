//! Turning computed results into what the caller receives.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use mediajob_models::{
    JobId, JobOutcome, MergedArtifact, PersistedFiles, PersistedRef, ResponseType,
    TranscriptionPayload, TranscriptionResult,
};
use mediajob_storage::{upload_merged_video, ObjectPublisher};

use crate::error::JobResult;

/// Returns results in-memory, writes them to the output root, or publishes them.
pub struct ResultMaterializer {
    output_dir: PathBuf,
    publisher: Arc<dyn ObjectPublisher>,
}

impl ResultMaterializer {
    pub fn new(output_dir: impl Into<PathBuf>, publisher: Arc<dyn ObjectPublisher>) -> Self {
        Self {
            output_dir: output_dir.into(),
            publisher,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Materialize a transcription according to `response_type`.
    pub async fn materialize(
        &self,
        result: TranscriptionResult,
        response_type: ResponseType,
        job_id: &JobId,
    ) -> JobResult<JobOutcome> {
        match response_type {
            ResponseType::Direct => Ok(JobOutcome::Direct(TranscriptionPayload {
                text: result.full_text,
                srt: result.track.map(|track| track.to_srt()),
                segments: result.segments,
            })),
            ResponseType::Cloud => {
                let files = self.persist(result, job_id).await?;
                Ok(JobOutcome::Persisted(PersistedRef::Files(files)))
            }
        }
    }

    /// Upload a merged video and return its public URL.
    pub async fn publish_merged(&self, artifact: &MergedArtifact) -> JobResult<JobOutcome> {
        let published = upload_merged_video(self.publisher.as_ref(), &artifact.local_path).await?;
        Ok(JobOutcome::Persisted(PersistedRef::PublicUri(published.public_url)))
    }

    /// Write `<job_id>.txt|.srt|.json` for each requested output.
    ///
    /// All or nothing: if one write fails, files already written are removed.
    async fn persist(&self, result: TranscriptionResult, job_id: &JobId) -> JobResult<PersistedFiles> {
        let mut files = PersistedFiles::default();
        let mut pending: Vec<(PathBuf, String)> = Vec::new();

        if let Some(text) = result.full_text {
            let path = self.output_dir.join(format!("{}.txt", job_id));
            files.text_file = Some(path.clone());
            pending.push((path, text));
        }
        if let Some(track) = result.track {
            let path = self.output_dir.join(format!("{}.srt", job_id));
            files.srt_file = Some(path.clone());
            pending.push((path, track.to_srt()));
        }
        if let Some(segments) = result.segments {
            let path = self.output_dir.join(format!("{}.json", job_id));
            files.segments_file = Some(path.clone());
            pending.push((path, serde_json::to_string(&segments).map_err(std::io::Error::from)?));
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;

        let mut written: Vec<PathBuf> = Vec::with_capacity(pending.len());
        for (path, contents) in pending {
            if let Err(e) = tokio::fs::write(&path, contents).await {
                // The failed file may exist partially
                written.push(path);
                for path in &written {
                    if let Err(rm) = tokio::fs::remove_file(path).await {
                        if rm.kind() != std::io::ErrorKind::NotFound {
                            warn!(job_id = %job_id, "Failed to roll back {}: {}", path.display(), rm);
                        }
                    }
                }
                return Err(e.into());
            }
            written.push(path);
        }

        info!(job_id = %job_id, files = written.len(), "Persisted transcription results");
        Ok(files)
    }
}
