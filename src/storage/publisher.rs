use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bucket every artifact is published to
pub const DEFAULT_BUCKET: &str = "Speedtest";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("object storage is not configured: {0} is not set")]
    NotConfigured(&'static str),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("upload of {key} to bucket {bucket} failed: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("failed to create a URL for {key}: {message}")]
    Locator { key: String, message: String },
}

/// Uploads local files to object storage
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Uploads `local_path` as `remote_key` in `bucket` and returns a URL the
    /// object can be fetched from
    async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        remote_key: &str,
    ) -> Result<String, PublishError>;
}

/// MIME type for the artifact extensions this job produces
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => "application/json",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_artifacts() {
        assert_eq!(content_type_for(Path::new("a_results_1.json")), "application/json");
        assert_eq!(content_type_for(Path::new("dir/a_speed_1.png")), "image/png");
        assert_eq!(content_type_for(Path::new("notes")), "application/octet-stream");
    }

    #[test]
    fn test_not_configured_names_the_variable() {
        let err = PublishError::NotConfigured("BUCKET_ENDPOINT_URL");
        assert_eq!(
            err.to_string(),
            "object storage is not configured: BUCKET_ENDPOINT_URL is not set"
        );
    }
}
