//! Subtitle lookup entry point
//!
//! Records the lookup in the history, hands resolution to the background
//! worker and answers from the subtitle store. Nothing here waits on a
//! metadata provider.

use tracing::debug;

use super::recency_log::RecencyLog;
use super::resolution_worker::{ResolutionJob, ResolutionQueue};
use super::subtitle_store::SubtitleStore;
use crate::models::{MediaIdentifier, MediaKind, RecencyLogEntry, SubtitleDescriptor};
use crate::utils::trim_base_url;

#[derive(Clone)]
pub struct LookupCoordinator {
    history: RecencyLog,
    subtitles: SubtitleStore,
    queue: ResolutionQueue,
    base_url: String,
}

impl LookupCoordinator {
    pub fn new(
        history: RecencyLog,
        subtitles: SubtitleStore,
        queue: ResolutionQueue,
        base_url: &str,
    ) -> Self {
        Self {
            history,
            subtitles,
            queue,
            base_url: trim_base_url(base_url),
        }
    }

    pub async fn handle_lookup(
        &self,
        media_kind: MediaKind,
        identifier: &MediaIdentifier,
    ) -> Vec<SubtitleDescriptor> {
        let created = self.history.upsert_provisional(identifier, media_kind).await;

        // A provisional entry without a tracked job lost its job to a full queue
        let retry = !created
            && self.history.needs_resolution(identifier).await
            && !self.queue.is_tracked(identifier).await;

        if created || retry {
            self.queue
                .enqueue(ResolutionJob {
                    identifier: identifier.clone(),
                    media_kind,
                })
                .await;
        }

        let descriptors: Vec<SubtitleDescriptor> = self
            .subtitles
            .find_by_identifier(identifier)
            .await
            .iter()
            .map(|record| record.descriptor(&self.base_url))
            .collect();

        debug!(
            "Lookup {} {}: {} subtitles",
            media_kind,
            identifier,
            descriptors.len()
        );
        descriptors
    }

    pub async fn history(&self) -> Vec<RecencyLogEntry> {
        self.history.list().await
    }

    pub fn history_log(&self) -> &RecencyLog {
        &self.history
    }

    pub fn subtitles(&self) -> &SubtitleStore {
        &self.subtitles
    }

    pub fn queue(&self) -> &ResolutionQueue {
        &self.queue
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
