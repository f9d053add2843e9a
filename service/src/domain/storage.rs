use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::suggestion::SuggestionId;

/// A file received with the placeholder form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

impl Upload {
    pub fn is_image(&self) -> bool {
        if let Some(content_type) = &self.content_type {
            if content_type.starts_with("image/") {
                return true;
            }
        }
        self.extension()
            .is_some_and(|extension| IMAGE_EXTENSIONS.contains(&extension.as_str()))
    }

    fn extension(&self) -> Option<String> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase())
    }
}

pub trait PlaceholderStorage: Send + Sync + 'static {
    /// Stores the upload for suggestion `id` and returns the reference to keep on the event
    fn store(
        &self,
        id: SuggestionId,
        upload: &Upload,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to store {path}: {cause}")]
    Io { path: String, cause: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: &str, content_type: Option<&str>) -> Upload {
        Upload {
            file_name: file_name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_image_detection() {
        assert!(upload("poster.PNG", None).is_image());
        assert!(upload("poster", Some("image/webp")).is_image());
        assert!(!upload("notes.txt", Some("text/plain")).is_image());
        assert!(!upload("archive", None).is_image());
    }
}
