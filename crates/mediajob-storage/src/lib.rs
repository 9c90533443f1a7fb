//! Object storage and remote asset access.
//!
//! This crate provides:
//! - An S3-compatible client for publishing job output
//! - Unique, publicly readable keys for merged videos
//! - [`AssetFetcher`], which validates and downloads job inputs

pub mod client;
pub mod error;
pub mod fetch;
pub mod operations;

pub use client::{public_object_url, StorageClient, StorageConfig, DEFAULT_PUBLIC_BASE_URL};
pub use error::{FetchError, FetchResult, StorageError, StorageResult};
pub use fetch::AssetFetcher;
pub use operations::{merged_video_key, upload_merged_video, ObjectPublisher, PublishedObject};
