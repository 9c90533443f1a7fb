//! High-level storage operations.

use std::path::Path;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::client::StorageClient;
use crate::error::StorageResult;

/// Key prefix for merged videos.
pub const MERGED_PREFIX: &str = "merged";

/// Content type of merged output.
pub const MERGED_CONTENT_TYPE: &str = "video/mp4";

/// Uploads a local file so anyone can read it.
#[async_trait]
pub trait ObjectPublisher: Send + Sync {
    /// Upload `path` under `key` and return the object's public URL.
    async fn publish(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<String>;
}

#[async_trait]
impl ObjectPublisher for StorageClient {
    async fn publish(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<String> {
        self.upload_public_file(path, key, content_type).await
    }
}

/// A file that has been made public.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedObject {
    pub key: String,
    pub public_url: String,
}

/// Fresh `merged/<uuid>.mp4` key.
pub fn merged_video_key() -> String {
    format!("{}/{}.mp4", MERGED_PREFIX, Uuid::new_v4())
}

/// Publish a merged video under a fresh unique key.
pub async fn upload_merged_video(
    publisher: &dyn ObjectPublisher,
    path: &Path,
) -> StorageResult<PublishedObject> {
    let key = merged_video_key();
    let public_url = publisher.publish(path, &key, MERGED_CONTENT_TYPE).await?;

    info!(key = %key, url = %public_url, "Published merged video");
    Ok(PublishedObject { key, public_url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher {
        keys: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ObjectPublisher for RecordingPublisher {
        async fn publish(&self, _path: &Path, key: &str, content_type: &str) -> StorageResult<String> {
            self.keys
                .lock()
                .unwrap()
                .push((key.to_string(), content_type.to_string()));
            Ok(format!("https://storage.googleapis.com/out/{}", key))
        }
    }

    #[test]
    fn test_merged_keys_are_unique() {
        let a = merged_video_key();
        let b = merged_video_key();
        assert_ne!(a, b);
        assert!(a.starts_with("merged/") && a.ends_with(".mp4"));
        let id = a.trim_start_matches("merged/").trim_end_matches(".mp4");
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_upload_merged_video() {
        let publisher = RecordingPublisher::default();
        let published = upload_merged_video(&publisher, Path::new("/scratch/job_merged.mp4"))
            .await
            .unwrap();

        assert_eq!(
            published.public_url,
            format!("https://storage.googleapis.com/out/{}", published.key)
        );
        let keys = publisher.keys.lock().unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0], (published.key.clone(), "video/mp4".to_string()));
    }
}
