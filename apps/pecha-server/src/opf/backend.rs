//! OPF storage backends
//!
//! Object-level access to pecha trees. Keys are `/`-separated paths relative
//! to the backend root, e.g. `P000792/P000792.opf/meta.yml`.

use std::path::PathBuf;

use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};

use crate::config::S3Config;
use crate::error::StorageError;

/// Trait for OPF storage backends
#[async_trait::async_trait]
pub trait OpfBackend: Send + Sync {
    /// Read an object
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or overwrite an object
    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> bool;

    /// Names of the direct children (objects and sub-directories) of `dir`, sorted
    async fn list(&self, dir: &str) -> Result<Vec<String>, StorageError>;
}

// ============================================================================
// Local Storage
// ============================================================================

/// Filesystem-based storage rooted at a directory
pub struct LocalOpfBackend {
    base_path: PathBuf,
}

impl LocalOpfBackend {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn path(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.base_path.clone(), |path, part| path.join(part))
    }
}

fn io_error(key: &str, e: std::io::Error) -> StorageError {
    if e.kind() == std::io::ErrorKind::NotFound {
        StorageError::ObjectNotFound(key.to_string())
    } else {
        StorageError::Io {
            key: key.to_string(),
            source: e,
        }
    }
}

#[async_trait::async_trait]
impl OpfBackend for LocalOpfBackend {
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        tokio::fs::read(self.path(key))
            .await
            .map_err(|e| io_error(key, e))
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(key, e))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| io_error(key, e))
    }

    async fn exists(&self, key: &str) -> bool {
        tokio::fs::try_exists(self.path(key)).await.unwrap_or(false)
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let path = self.path(dir);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&path)
            .await
            .map_err(|e| io_error(dir, e))?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }

        names.sort();
        Ok(names)
    }
}

// ============================================================================
// S3 Storage
// ============================================================================

/// S3-compatible storage (MinIO, R2, AWS)
pub struct S3OpfBackend {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3OpfBackend {
    /// Create a new S3 backend from configuration
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "pecha-server",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(s3_config);

        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Ok(Self {
            client,
            bucket,
            prefix: config.prefix.trim_matches('/').to_string(),
        })
    }

    fn object_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", self.prefix, key)
        }
    }
}

fn sdk_error(key: &str, action: &str, e: impl std::fmt::Display) -> StorageError {
    let message = e.to_string();
    if message.contains("404") || message.contains("NoSuchKey") || message.contains("NotFound") {
        StorageError::ObjectNotFound(key.to_string())
    } else if message.contains("403") || message.contains("AccessDenied") {
        StorageError::AccessDenied(key.to_string())
    } else {
        StorageError::SdkError(format!("Failed to {} {}: {}", action, key, message))
    }
}

#[async_trait::async_trait]
impl OpfBackend for S3OpfBackend {
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .map_err(|e| sdk_error(key, "get object", DisplayErrorContext(&e)))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let content_type = if key.ends_with(".yml") {
            "application/yaml"
        } else {
            "text/plain; charset=utf-8"
        };

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .content_type(content_type)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| sdk_error(key, "put object", DisplayErrorContext(&e)))?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(self.object_key(key))
            .send()
            .await
            .is_ok()
    }

    async fn list(&self, dir: &str) -> Result<Vec<String>, StorageError> {
        let prefix = format!("{}/", self.object_key(dir.trim_end_matches('/')));
        let mut names = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                .delimiter("/");

            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| sdk_error(dir, "list", DisplayErrorContext(&e)))?;

            names.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|obj| obj.key())
                    .filter_map(|key| key.strip_prefix(&prefix))
                    .map(|name| name.to_string()),
            );
            names.extend(
                response
                    .common_prefixes()
                    .iter()
                    .filter_map(|p| p.prefix())
                    .filter_map(|p| p.strip_prefix(&prefix))
                    .map(|name| name.trim_end_matches('/').to_string()),
            );

            if !response.is_truncated().unwrap_or(false) {
                break;
            }
            continuation_token = response.next_continuation_token().map(|s| s.to_string());
        }

        names.retain(|name| !name.is_empty());
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_write_read_list() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalOpfBackend::new(temp_dir.path().to_path_buf());

        backend
            .write("P1/P1.opf/layers/v001/Pagination.yml", b"annotations: {}\n")
            .await
            .unwrap();
        backend
            .write("P1/P1.opf/layers/v001/Durchen.yml", b"annotations: {}\n")
            .await
            .unwrap();

        let data = backend.read("P1/P1.opf/layers/v001/Pagination.yml").await.unwrap();
        assert_eq!(data, b"annotations: {}\n");

        assert!(backend.exists("P1/P1.opf/layers/v001/Durchen.yml").await);
        assert!(!backend.exists("P1/P1.opf/layers/v002/Durchen.yml").await);

        let names = backend.list("P1/P1.opf/layers/v001").await.unwrap();
        assert_eq!(names, vec!["Durchen.yml", "Pagination.yml"]);

        let names = backend.list("P1/P1.opf/layers").await.unwrap();
        assert_eq!(names, vec!["v001"]);

        assert!(backend.list("P2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_local_missing_object() {
        let temp_dir = TempDir::new().unwrap();
        let backend = LocalOpfBackend::new(temp_dir.path().to_path_buf());

        let result = backend.read("P1/P1.opf/meta.yml").await;
        assert!(matches!(result, Err(StorageError::ObjectNotFound(_))));
    }
}
