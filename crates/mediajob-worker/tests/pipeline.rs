//! End-to-end pipeline tests with a fake recognizer and publisher.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mediajob_models::{
    JobId, JobOutcome, JobRequest, MergeRequest, PersistedRef, RawTranscription,
    RecognitionSegment, ResponseType, SpeechTask, TranscribeRequest,
};
use mediajob_speech::{RecognitionOptions, SpeechError, SpeechRecognizer, SpeechResult};
use mediajob_storage::{AssetFetcher, ObjectPublisher, StorageResult};
use mediajob_worker::{JobError, JobPipeline, WorkerConfig};

/// Records what it was asked to do and replays a canned answer.
struct FakeRecognizer {
    fail: bool,
    calls: Mutex<Vec<(PathBuf, RecognitionOptions)>>,
}

impl FakeRecognizer {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl SpeechRecognizer for FakeRecognizer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn recognize(
        &self,
        input: &Path,
        options: &RecognitionOptions,
    ) -> SpeechResult<RawTranscription> {
        assert!(input.exists(), "input must be downloaded before recognition");
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), options.clone()));

        if self.fail {
            return Err(SpeechError::EngineFailed {
                stderr: "unsupported audio format".to_string(),
                exit_code: Some(1),
            });
        }

        Ok(RawTranscription {
            text: " hello world a b c d".to_string(),
            segments: vec![
                RecognitionSegment::new(0.0, 2.0, " hello world"),
                RecognitionSegment::new(2.0, 5.0, " a b c"),
                RecognitionSegment::new(5.0, 6.0, " d"),
            ],
            language: Some("en".to_string()),
        })
    }
}

#[derive(Default)]
struct FakePublisher {
    keys: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectPublisher for FakePublisher {
    async fn publish(&self, path: &Path, key: &str, _content_type: &str) -> StorageResult<String> {
        assert!(path.exists());
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("https://storage.googleapis.com/results/{}", key))
    }
}

struct Harness {
    server: MockServer,
    work: tempfile::TempDir,
    output: tempfile::TempDir,
    recognizer: Arc<FakeRecognizer>,
    publisher: Arc<FakePublisher>,
    pipeline: JobPipeline,
}

impl Harness {
    async fn new(recognizer_fails: bool) -> Self {
        Self::with_engine_timeout(recognizer_fails, Duration::from_secs(30)).await
    }

    async fn with_engine_timeout(recognizer_fails: bool, engine_timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let work = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let recognizer = FakeRecognizer::new(recognizer_fails);
        let publisher = Arc::new(FakePublisher::default());

        let prefix = format!("{}/", server.uri());
        let config = WorkerConfig {
            work_dir: work.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            engine_timeout,
            asset_prefix: prefix.clone(),
            ..Default::default()
        };
        let pipeline = JobPipeline::new(
            config,
            AssetFetcher::new(prefix).unwrap(),
            recognizer.clone(),
            publisher.clone(),
        );

        Self {
            server,
            work,
            output,
            recognizer,
            publisher,
            pipeline,
        }
    }

    fn url(&self, object: &str) -> String {
        format!("{}/bucket/{}", self.server.uri(), object)
    }

    async fn serve(&self, object: &str, body: &[u8]) {
        Mock::given(method("GET"))
            .and(path(format!("/bucket/{}", object)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .mount(&self.server)
            .await;
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.work.path()).unwrap().next().is_none()
    }

    fn output_entries(&self) -> usize {
        std::fs::read_dir(self.output.path()).unwrap().count()
    }
}

#[tokio::test]
async fn transcription_direct_returns_text_and_srt() {
    let h = Harness::new(false).await;
    h.serve("talk.mp3", b"ID3 audio").await;

    let mut request = TranscribeRequest::new(h.url("talk.mp3"), SpeechTask::Transcribe);
    request.words_per_line = Some(2);
    request.language = Some("en".to_string());

    let outcome = h
        .pipeline
        .run(&JobId::from_string("job-direct"), &JobRequest::Transcribe(request))
        .await
        .unwrap();

    let JobOutcome::Direct(payload) = outcome else {
        panic!("expected a direct payload");
    };
    assert_eq!(payload.text.as_deref(), Some(" hello world a b c d"));
    assert!(payload.segments.is_none());
    assert_eq!(
        payload.srt.as_deref(),
        Some(
            "1\n00:00:00,000 --> 00:00:02,000\nhello world\n\n\
             2\n00:00:02,000 --> 00:00:04,000\na b\n\n\
             3\n00:00:04,000 --> 00:00:06,000\nc d\n\n"
        )
    );

    let calls = h.recognizer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0.file_name().unwrap().to_string_lossy(),
        "job-direct_input.mp3"
    );
    assert_eq!(calls[0].1.language.as_deref(), Some("en"));
    assert!(h.scratch_is_empty());
    assert_eq!(h.output_entries(), 0);
}

#[tokio::test]
async fn transcription_cloud_writes_files() {
    let h = Harness::new(false).await;
    h.serve("talk.wav", b"RIFF").await;

    let mut request = TranscribeRequest::new(h.url("talk.wav"), SpeechTask::Translate);
    request.include_segments = true;
    request.response_type = ResponseType::Cloud;

    let outcome = h
        .pipeline
        .run(&JobId::from_string("job-cloud"), &JobRequest::Transcribe(request))
        .await
        .unwrap();

    let JobOutcome::Persisted(PersistedRef::Files(files)) = outcome else {
        panic!("expected persisted files");
    };
    assert_eq!(files.paths().len(), 3);
    assert_eq!(
        std::fs::read_to_string(h.output.path().join("job-cloud.txt")).unwrap(),
        " hello world a b c d"
    );
    let srt = std::fs::read_to_string(h.output.path().join("job-cloud.srt")).unwrap();
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,000\nhello world\n\n2\n"));
    assert!(h.output.path().join("job-cloud.json").exists());

    let calls = h.recognizer.calls.lock().unwrap();
    assert_eq!(calls[0].1.task, SpeechTask::Translate);
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn recognizer_failure_cleans_up() {
    let h = Harness::new(true).await;
    h.serve("talk.mp3", b"ID3").await;

    let mut request = TranscribeRequest::new(h.url("talk.mp3"), SpeechTask::Transcribe);
    request.response_type = ResponseType::Cloud;

    let err = h
        .pipeline
        .run(&JobId::from_string("job-fail"), &JobRequest::Transcribe(request))
        .await
        .unwrap_err();

    match &err {
        JobError::Tool { engine, diagnostic } => {
            assert_eq!(engine, "fake");
            assert_eq!(diagnostic, "unsupported audio format");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(h.scratch_is_empty());
    assert_eq!(h.output_entries(), 0);
}

#[tokio::test]
async fn missing_input_is_a_fetch_error() {
    let h = Harness::new(false).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.server)
        .await;

    let request = TranscribeRequest::new(h.url("missing.mp3"), SpeechTask::Transcribe);
    let err = h
        .pipeline
        .run(&JobId::new(), &JobRequest::Transcribe(request))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "fetch");
    assert!(h.recognizer.calls.lock().unwrap().is_empty());
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn stalled_download_is_bounded_by_engine_timeout() {
    let h = Harness::with_engine_timeout(false, Duration::from_secs(1)).await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"late".to_vec())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&h.server)
        .await;

    let request = TranscribeRequest::new(h.url("slow.mp3"), SpeechTask::Transcribe);
    let err = h
        .pipeline
        .run(&JobId::new(), &JobRequest::Transcribe(request))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "fetch");
    assert!(err.to_string().contains("timed out"), "got {}", err);
    assert!(h.recognizer.calls.lock().unwrap().is_empty());
    assert!(h.scratch_is_empty());
}

#[tokio::test]
async fn merge_with_bad_audio_url_fails_before_download() {
    let h = Harness::new(false).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video".to_vec()))
        .expect(0)
        .mount(&h.server)
        .await;

    let request = JobRequest::Merge(MergeRequest {
        video_url: h.url("clip.mp4"),
        audio_url: "https://example.com/not-allowed.mp3".to_string(),
        webhook_url: None,
        id: None,
    });

    assert!(h.pipeline.validate(&request).unwrap_err().is_validation());

    let err = h.pipeline.run(&JobId::new(), &request).await.unwrap_err();
    assert!(err.is_validation(), "got {:?}", err);
    assert!(h.scratch_is_empty());
    assert!(h.publisher.keys.lock().unwrap().is_empty());
}

#[tokio::test]
async fn merge_engine_failure_is_a_tool_error() {
    let h = Harness::new(false).await;
    h.serve("clip.mp4", b"not really a video").await;
    h.serve("voice.wav", b"not really audio").await;

    let request = JobRequest::Merge(MergeRequest {
        video_url: h.url("clip.mp4"),
        audio_url: h.url("voice.wav"),
        webhook_url: None,
        id: None,
    });

    let err = h.pipeline.run(&JobId::new(), &request).await.unwrap_err();

    match &err {
        JobError::Tool { engine, diagnostic } => {
            assert_eq!(engine, "ffmpeg");
            assert!(!diagnostic.is_empty());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(h.scratch_is_empty());
    assert!(h.publisher.keys.lock().unwrap().is_empty());
}

fn generate(args: &[&str], out: &Path) {
    let status = std::process::Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-f", "lavfi"])
        .args(args)
        .arg(out)
        .status()
        .unwrap();
    assert!(status.success());
}

#[tokio::test]
#[ignore = "requires ffmpeg on PATH"]
async fn merge_publishes_public_uri() {
    let h = Harness::new(false).await;
    let media = tempfile::tempdir().unwrap();
    let video = media.path().join("v.mp4");
    let audio = media.path().join("a.wav");
    generate(&["-i", "testsrc=duration=3:size=160x120:rate=10", "-c:v", "libx264"], &video);
    generate(&["-i", "sine=frequency=440:duration=1"], &audio);
    h.serve("v.mp4", &std::fs::read(&video).unwrap()).await;
    h.serve("a.wav", &std::fs::read(&audio).unwrap()).await;

    let request = JobRequest::Merge(MergeRequest {
        video_url: h.url("v.mp4"),
        audio_url: h.url("a.wav"),
        webhook_url: None,
        id: None,
    });
    let outcome = h.pipeline.run(&JobId::new(), &request).await.unwrap();

    let uri = outcome.public_uri().unwrap();
    assert!(uri.starts_with("https://storage.googleapis.com/results/merged/"));
    assert_eq!(h.publisher.keys.lock().unwrap().len(), 1);
    assert!(h.scratch_is_empty());
}
