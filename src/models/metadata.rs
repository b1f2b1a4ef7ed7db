use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identifier::{MediaIdentifier, MediaKind};

/// How final the name and image of an entry are
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Inserted on first lookup, waiting for the background resolution
    Provisional,
    /// Name and image confirmed by a provider
    Resolved,
    /// Every provider failed; the entry shows the raw id and placeholder
    Unresolved,
}

/// Display metadata for one identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMeta {
    pub identifier: MediaIdentifier,
    pub display_name: String,
    pub image_url: String,
    pub media_kind: MediaKind,
    pub resolved_at: DateTime<Utc>,
    pub resolution: Resolution,
}

impl ResolvedMeta {
    pub fn resolved(
        identifier: MediaIdentifier,
        media_kind: MediaKind,
        display_name: String,
        image_url: String,
    ) -> Self {
        Self {
            identifier,
            display_name,
            image_url,
            media_kind,
            resolved_at: Utc::now(),
            resolution: Resolution::Resolved,
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.resolution == Resolution::Provisional
    }
}

/// One row of the recency log as handed to readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencyLogEntry {
    /// 0 is the most recent lookup
    pub position: usize,
    #[serde(flatten)]
    pub meta: ResolvedMeta,
}

/// Placeholder name and image used before (or instead of) provider data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pending_label: String,
    poster_template: String,
}

impl Placeholder {
    /// `poster_template` may contain `{id}`, replaced by the encoded main id
    pub fn new(pending_label: impl Into<String>, poster_template: impl Into<String>) -> Self {
        Self {
            pending_label: pending_label.into(),
            poster_template: poster_template.into(),
        }
    }

    /// Deterministic fallback image for an identifier
    pub fn poster_for(&self, identifier: &MediaIdentifier) -> String {
        self.poster_template
            .replace("{id}", &urlencoding::encode(identifier.main_id()))
    }

    pub fn provisional(&self, identifier: MediaIdentifier, media_kind: MediaKind) -> ResolvedMeta {
        let image_url = self.poster_for(&identifier);
        ResolvedMeta {
            identifier,
            display_name: self.pending_label.clone(),
            image_url,
            media_kind,
            resolved_at: Utc::now(),
            resolution: Resolution::Provisional,
        }
    }

    /// Terminal fallback: raw identifier as name, placeholder as image
    pub fn unresolved(&self, identifier: MediaIdentifier, media_kind: MediaKind) -> ResolvedMeta {
        let image_url = self.poster_for(&identifier);
        ResolvedMeta {
            display_name: identifier.as_str().to_string(),
            identifier,
            image_url,
            media_kind,
            resolved_at: Utc::now(),
            resolution: Resolution::Unresolved,
        }
    }
}
