use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::domain::storage::{PlaceholderStorage, StorageError, Upload};
use crate::domain::suggestion::SuggestionId;

const PLACEHOLDER_DIR: &str = "placeholders";

/// Placeholder images on the local file system, below `media_root`
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PlaceholderStorage for LocalMediaStorage {
    async fn store(
        &self,
        id: SuggestionId,
        upload: &Upload,
        now: DateTime<Utc>,
    ) -> Result<String, StorageError> {
        let reference = format!(
            "{}/{}-{}-{}",
            PLACEHOLDER_DIR,
            id,
            now.format("%Y%m%d%H%M%S"),
            file_name(&upload.file_name)
        );
        let path = self.root.join(&reference);
        let io_error = |cause: std::io::Error| StorageError::Io {
            path: path.display().to_string(),
            cause: cause.to_string(),
        };

        tokio::fs::create_dir_all(self.root.join(PLACEHOLDER_DIR))
            .await
            .map_err(io_error)?;
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(io_error)?;

        tracing::debug!(%reference, bytes = upload.bytes.len(), "placeholder stored");
        Ok(reference)
    }
}

/// Last path component of a client supplied name, restricted to safe characters
fn file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.trim_start_matches('.') {
        "" => "upload".to_string(),
        rest => rest.to_string(),
    }
}
