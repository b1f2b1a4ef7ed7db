use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identifier::MediaIdentifier;

/// An uploaded subtitle file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleRecord {
    pub id: Uuid,
    pub identifier: MediaIdentifier,
    /// File name inside the subtitle directory
    pub file_name: String,
    pub label: String,
    pub language: String,
    pub uploaded_at: DateTime<Utc>,
}

impl SubtitleRecord {
    pub fn new(
        identifier: MediaIdentifier,
        file_name: String,
        label: String,
        language: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier,
            file_name,
            label,
            language,
            uploaded_at: Utc::now(),
        }
    }

    pub fn download_url(&self, base_url: &str) -> String {
        format!(
            "{}/download/{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(&self.file_name)
        )
    }

    pub fn descriptor(&self, base_url: &str) -> SubtitleDescriptor {
        SubtitleDescriptor {
            id: self.id.to_string(),
            url: self.download_url(base_url),
            lang: self.language.clone(),
            label: self.label.clone(),
        }
    }
}

/// Subtitle entry in the shape addon clients expect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleDescriptor {
    pub id: String,
    pub url: String,
    pub lang: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builds_download_url() {
        let record = SubtitleRecord::new(
            MediaIdentifier::parse("tt1:1:1"),
            "sub-1-2.srt".to_string(),
            "Community".to_string(),
            "ara".to_string(),
        );
        let descriptor = record.descriptor("https://subs.example/");
        assert_eq!(descriptor.url, "https://subs.example/download/sub-1-2.srt");
        assert_eq!(descriptor.lang, "ara");
        assert_eq!(descriptor.id, record.id.to_string());
    }
}
