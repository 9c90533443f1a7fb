//! Job orchestration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::Instrument;

use mediajob_media::AudioVideoMerger;
use mediajob_models::{
    synthesize, AssetRole, JobId, JobOutcome, JobRequest, MergeRequest, MergedArtifact, ObjectUri,
    TranscribeRequest, TranscriptionResult,
};
use mediajob_speech::{RecognitionOptions, SpeechRecognizer};
use mediajob_storage::{AssetFetcher, ObjectPublisher};

use crate::config::WorkerConfig;
use crate::error::{JobError, JobResult};
use crate::logging::JobLogger;
use crate::materialize::ResultMaterializer;
use crate::metrics;
use crate::scratch::ScratchSpace;

/// Runs one job at a time from validated request to outcome.
///
/// Holds no per-job state, so a single pipeline is shared across requests.
pub struct JobPipeline {
    config: WorkerConfig,
    fetcher: AssetFetcher,
    merger: AudioVideoMerger,
    recognizer: Arc<dyn SpeechRecognizer>,
    materializer: ResultMaterializer,
}

impl JobPipeline {
    pub fn new(
        config: WorkerConfig,
        fetcher: AssetFetcher,
        recognizer: Arc<dyn SpeechRecognizer>,
        publisher: Arc<dyn ObjectPublisher>,
    ) -> Self {
        let merger = AudioVideoMerger::new()
            .with_timeout(config.engine_timeout_secs())
            .with_audio_codec(config.merge_audio_codec.clone());
        let materializer = ResultMaterializer::new(config.output_dir.clone(), publisher);
        // Downloads share the engine deadline so a stalled transfer cannot pin a job
        let fetcher = fetcher.with_timeout(Duration::from_secs(config.engine_timeout_secs()));

        Self {
            config,
            fetcher,
            merger,
            recognizer,
            materializer,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Check every input URI without touching the network.
    pub fn validate(&self, request: &JobRequest) -> JobResult<Vec<ObjectUri>> {
        request
            .inputs()
            .into_iter()
            .map(|uri| self.fetcher.validate(uri).map_err(JobError::from))
            .collect()
    }

    /// Run a job to completion.
    pub async fn run(&self, job_id: &JobId, request: &JobRequest) -> JobResult<JobOutcome> {
        let task = request.task();
        let logger = JobLogger::new(job_id, task);
        let started = Instant::now();

        let result = async {
            logger.log_start(&format!("{} input(s)", request.inputs().len()));
            match request {
                JobRequest::Merge(merge) => self.run_merge(job_id, merge, &logger).await,
                JobRequest::Transcribe(transcribe) => {
                    self.run_transcription(job_id, transcribe, &logger).await
                }
            }
        }
        .instrument(logger.create_span())
        .await;

        match &result {
            Ok(_) => {
                let elapsed = started.elapsed().as_secs_f64();
                metrics::record_job_completed(task.as_str(), elapsed);
                logger.log_completion(&format!("finished in {:.2}s", elapsed));
            }
            Err(e) => {
                metrics::record_job_failed(task.as_str(), e.kind());
                logger.log_error(&e.to_string());
            }
        }

        result
    }

    async fn run_merge(
        &self,
        job_id: &JobId,
        request: &MergeRequest,
        logger: &JobLogger,
    ) -> JobResult<JobOutcome> {
        // Both URIs are checked before anything is downloaded
        let video = self.fetcher.validate(&request.video_url)?;
        let audio = self.fetcher.validate(&request.audio_url)?;

        let scratch = ScratchSpace::create(&self.config.work_dir, job_id)?;

        let download_started = Instant::now();
        let video_path = self
            .fetcher
            .fetch_object(&video, scratch.path(), job_id.as_str(), AssetRole::Video)
            .await?;
        let audio_path = self
            .fetcher
            .fetch_object(&audio, scratch.path(), job_id.as_str(), AssetRole::Audio)
            .await?;
        metrics::record_download_duration(download_started.elapsed().as_secs_f64());
        logger.log_progress("inputs downloaded");

        let output = scratch.file(&format!("{}_merged.mp4", job_id));
        let engine_started = Instant::now();
        let local_path = self.merger.merge(&video_path, &audio_path, &output).await?;
        metrics::record_engine_duration("ffmpeg", engine_started.elapsed().as_secs_f64());
        logger.log_progress("audio merged");

        let outcome = self
            .materializer
            .publish_merged(&MergedArtifact { local_path })
            .await?;

        scratch.close();
        Ok(outcome)
    }

    async fn run_transcription(
        &self,
        job_id: &JobId,
        request: &TranscribeRequest,
        logger: &JobLogger,
    ) -> JobResult<JobOutcome> {
        let media = self.fetcher.validate(&request.media_url)?;

        let scratch = ScratchSpace::create(&self.config.work_dir, job_id)?;

        let download_started = Instant::now();
        let input = self
            .fetcher
            .fetch_object(&media, scratch.path(), job_id.as_str(), AssetRole::Input)
            .await?;
        metrics::record_download_duration(download_started.elapsed().as_secs_f64());
        logger.log_progress("input downloaded");

        let options = RecognitionOptions::from(request);
        let engine = self.recognizer.name();
        let engine_started = Instant::now();
        let raw = self
            .recognizer
            .recognize(&input, &options)
            .await
            .map_err(|e| JobError::speech(engine, e))?;
        metrics::record_engine_duration(engine, engine_started.elapsed().as_secs_f64());
        logger.log_progress(&format!("{} segments recognized", raw.segments.len()));

        scratch.discard(&input).await;

        let result = TranscriptionResult {
            full_text: request.include_text.then(|| raw.text.clone()),
            track: request
                .include_srt
                .then(|| synthesize(&raw.segments, request.words_per_line())),
            segments: request.include_segments.then_some(raw.segments),
        };

        let outcome = self
            .materializer
            .materialize(result, request.response_type, job_id)
            .await?;

        scratch.close();
        Ok(outcome)
    }
}
