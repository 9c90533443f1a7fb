//! Remote asset download into job scratch space.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use mediajob_models::{AssetRole, ObjectUri, DEFAULT_ASSET_PREFIX};

use crate::error::{FetchError, FetchResult};

/// Downloads public object-storage media for a job.
#[derive(Debug, Clone)]
pub struct AssetFetcher {
    http: Client,
    accepted_prefix: String,
    /// Deadline for one whole download, body included
    timeout: Option<Duration>,
}

impl Default for AssetFetcher {
    fn default() -> Self {
        Self::with_client(Client::new(), DEFAULT_ASSET_PREFIX)
    }
}

impl AssetFetcher {
    pub fn new(accepted_prefix: impl Into<String>) -> FetchResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| FetchError::interrupted("client", e))?;
        Ok(Self::with_client(http, accepted_prefix))
    }

    pub fn with_client(http: Client, accepted_prefix: impl Into<String>) -> Self {
        Self {
            http,
            accepted_prefix: accepted_prefix.into(),
            timeout: None,
        }
    }

    /// Give up on a download that takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn accepted_prefix(&self) -> &str {
        &self.accepted_prefix
    }

    /// Check a URI without downloading anything.
    pub fn validate(&self, uri: &str) -> FetchResult<ObjectUri> {
        Ok(ObjectUri::parse(uri, &self.accepted_prefix)?)
    }

    /// Validate `uri` and download it to `<dest_dir>/<job_id>_<role>[.ext]`.
    pub async fn fetch(
        &self,
        uri: &str,
        dest_dir: &Path,
        job_id: &str,
        role: AssetRole,
    ) -> FetchResult<PathBuf> {
        let object = self.validate(uri)?;
        self.fetch_object(&object, dest_dir, job_id, role).await
    }

    /// Download an already validated object.
    ///
    /// On failure no file is left behind.
    pub async fn fetch_object(
        &self,
        object: &ObjectUri,
        dest_dir: &Path,
        job_id: &str,
        role: AssetRole,
    ) -> FetchResult<PathBuf> {
        let dest = dest_dir.join(role.file_name(job_id, object.extension()));
        debug!(job_id, role = %role, "Downloading {} to {}", object, dest.display());

        match self.download(object.as_str(), &dest).await {
            Ok(bytes) => {
                info!(job_id, role = %role, bytes, "Downloaded {}", object);
                Ok(dest)
            }
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&dest).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!(job_id, "Failed to remove partial download {}: {}", dest.display(), rm);
                    }
                }
                Err(e)
            }
        }
    }

    async fn download(&self, uri: &str, dest: &Path) -> FetchResult<u64> {
        let mut request = self.http.get(uri);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(uri, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        let expected = response.content_length();
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut received = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.transport_error(uri, e))?;
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
        }
        file.flush().await?;

        if let Some(expected) = expected {
            if received < expected {
                return Err(FetchError::Incomplete {
                    uri: uri.to_string(),
                    expected,
                    received,
                });
            }
        }

        Ok(received)
    }

    fn transport_error(&self, uri: &str, err: reqwest::Error) -> FetchError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => FetchError::TimedOut {
                uri: uri.to_string(),
                secs: timeout.as_secs(),
            },
            _ => FetchError::interrupted(uri, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn fetcher_for(server: &MockServer) -> AssetFetcher {
        AssetFetcher::new(format!("{}/", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_writes_role_named_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/in/clip.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 4096]))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_for(&server).await;
        let local = fetcher
            .fetch(
                &format!("{}/media/in/clip.mp4", server.uri()),
                dir.path(),
                "job-1",
                AssetRole::Video,
            )
            .await
            .unwrap();

        assert_eq!(local, dir.path().join("job-1_video.mp4"));
        assert_eq!(std::fs::read(&local).unwrap().len(), 4096);
    }

    #[tokio::test]
    async fn test_object_without_extension() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/track"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let local = fetcher_for(&server)
            .await
            .fetch(&format!("{}/media/track", server.uri()), dir.path(), "j", AssetRole::Audio)
            .await
            .unwrap();
        assert_eq!(local.file_name().unwrap(), "j_audio");
    }

    #[tokio::test]
    async fn test_http_error_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = fetcher_for(&server)
            .await
            .fetch(&format!("{}/media/gone.mp3", server.uri()), dir.path(), "j", AssetRole::Input)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_uri_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_for(&server).await;

        let err = fetcher
            .fetch("https://example.com/media/a.mp4", dir.path(), "j", AssetRole::Input)
            .await
            .unwrap_err();
        assert!(err.is_invalid_uri());

        let err = fetcher
            .fetch(&format!("{}/bucket-only", server.uri()), dir.path(), "j", AssetRole::Input)
            .await
            .unwrap_err();
        assert!(err.is_invalid_uri());
    }

    #[tokio::test]
    async fn test_stalled_download_times_out_and_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![1u8; 64])
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = fetcher_for(&server)
            .await
            .with_timeout(Duration::from_millis(300));
        assert_eq!(fetcher.timeout(), Some(Duration::from_millis(300)));

        let err = fetcher
            .fetch(&format!("{}/media/slow.mp4", server.uri()), dir.path(), "j", AssetRole::Video)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::TimedOut { .. }), "got {:?}", err);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_default_prefix() {
        let fetcher = AssetFetcher::default();
        assert_eq!(fetcher.accepted_prefix(), "https://storage.googleapis.com/");
        assert!(fetcher
            .validate("https://storage.googleapis.com/b/o.wav")
            .is_ok());
    }
}
