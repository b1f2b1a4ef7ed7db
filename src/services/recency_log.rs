//! Bounded, most-recent-first log of looked-up identifiers
//!
//! Each identifier appears at most once. A repeat lookup does not move an
//! entry; only a brand new identifier lands at the front. All mutations
//! happen under a single write lock, so the check-then-insert in
//! [`RecencyLog::upsert_provisional`] is atomic.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{MediaIdentifier, MediaKind, Placeholder, RecencyLogEntry, ResolvedMeta};

#[derive(Clone)]
pub struct RecencyLog {
    entries: Arc<RwLock<VecDeque<ResolvedMeta>>>,
    capacity: usize,
    placeholder: Placeholder,
    /// Bumped on every visible change, read by the snapshot task
    revision: Arc<AtomicU64>,
}

impl RecencyLog {
    pub fn new(capacity: usize, placeholder: Placeholder) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
            placeholder,
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    /// Insert a provisional entry at the front unless the identifier is
    /// already present. Returns whether an entry was created.
    pub async fn upsert_provisional(&self, identifier: &MediaIdentifier, media_kind: MediaKind) -> bool {
        let mut entries = self.entries.write().await;

        if entries.iter().any(|entry| entry.identifier == *identifier) {
            return false;
        }

        entries.push_front(self.placeholder.provisional(identifier.clone(), media_kind));
        self.truncate_locked(&mut entries);
        drop(entries);

        self.bump();
        true
    }

    /// Overwrite an entry's metadata in place. Entries evicted while the
    /// resolution was running are not re-added.
    pub async fn apply_resolved(&self, identifier: &MediaIdentifier, meta: ResolvedMeta) -> bool {
        let mut entries = self.entries.write().await;

        match entries.iter_mut().find(|entry| entry.identifier == *identifier) {
            Some(entry) => {
                entry.display_name = meta.display_name;
                entry.image_url = meta.image_url;
                entry.media_kind = meta.media_kind;
                entry.resolved_at = meta.resolved_at;
                entry.resolution = meta.resolution;
                drop(entries);
                self.bump();
                true
            }
            None => {
                debug!("Dropping resolution for {}: no longer in history", identifier);
                false
            }
        }
    }

    pub async fn truncate_to_capacity(&self) {
        let mut entries = self.entries.write().await;
        if self.truncate_locked(&mut entries) > 0 {
            drop(entries);
            self.bump();
        }
    }

    fn truncate_locked(&self, entries: &mut VecDeque<ResolvedMeta>) -> usize {
        let mut evicted = 0;
        while entries.len() > self.capacity {
            if let Some(entry) = entries.pop_back() {
                debug!("Evicted {} from history", entry.identifier);
                evicted += 1;
            }
        }
        evicted
    }

    /// Most-recent-first copy with positions
    pub async fn list(&self) -> Vec<RecencyLogEntry> {
        self.entries
            .read()
            .await
            .iter()
            .enumerate()
            .map(|(position, meta)| RecencyLogEntry {
                position,
                meta: meta.clone(),
            })
            .collect()
    }

    pub async fn get(&self, identifier: &MediaIdentifier) -> Option<ResolvedMeta> {
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.identifier == *identifier)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Present and still waiting for a provider answer
    pub async fn needs_resolution(&self, identifier: &MediaIdentifier) -> bool {
        self.entries
            .read()
            .await
            .iter()
            .any(|entry| entry.identifier == *identifier && entry.is_provisional())
    }

    /// Replace the contents with previously saved entries (most recent
    /// first). Later duplicates and entries past capacity are discarded.
    pub async fn restore(&self, saved: Vec<ResolvedMeta>) -> usize {
        let mut restored: VecDeque<ResolvedMeta> = VecDeque::with_capacity(self.capacity);
        for meta in saved {
            if restored.len() == self.capacity {
                break;
            }
            if restored.iter().any(|entry| entry.identifier == meta.identifier) {
                continue;
            }
            restored.push_back(meta);
        }

        let count = restored.len();
        *self.entries.write().await = restored;
        self.bump();
        count
    }

    /// Plain copy for persistence, together with the revision it reflects
    pub async fn snapshot(&self) -> (u64, Vec<ResolvedMeta>) {
        let entries = self.entries.read().await;
        (self.revision(), entries.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resolution;

    fn log(capacity: usize) -> RecencyLog {
        RecencyLog::new(
            capacity,
            Placeholder::new("Fetching title...", "https://img.example/{id}"),
        )
    }

    fn id(raw: &str) -> MediaIdentifier {
        MediaIdentifier::parse(raw)
    }

    fn order(entries: &[RecencyLogEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|entry| entry.meta.identifier.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_new_identifier_is_provisional_at_front() {
        let log = log(5);
        assert!(log.upsert_provisional(&id("tt1"), MediaKind::Movie).await);
        assert!(log.upsert_provisional(&id("tt2"), MediaKind::Movie).await);

        let entries = log.list().await;
        assert_eq!(order(&entries), vec!["tt2", "tt1"]);
        assert_eq!(entries[0].position, 0);
        assert_eq!(entries[0].meta.display_name, "Fetching title...");
        assert_eq!(entries[0].meta.image_url, "https://img.example/tt2");
        assert!(entries[0].meta.is_provisional());
    }

    #[tokio::test]
    async fn test_repeat_lookup_does_not_duplicate_or_reorder() {
        let log = log(5);
        log.upsert_provisional(&id("tt1"), MediaKind::Movie).await;
        log.upsert_provisional(&id("tt2"), MediaKind::Movie).await;

        assert!(!log.upsert_provisional(&id("tt1"), MediaKind::Movie).await);
        assert_eq!(order(&log.list().await), vec!["tt2", "tt1"]);
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let log = log(3);
        for raw in ["tt1", "tt2", "tt3", "tt4"] {
            log.upsert_provisional(&id(raw), MediaKind::Movie).await;
        }
        assert_eq!(order(&log.list().await), vec!["tt4", "tt3", "tt2"]);
        assert!(log.get(&id("tt1")).await.is_none());
    }

    #[tokio::test]
    async fn test_apply_resolved_keeps_position() {
        let log = log(5);
        log.upsert_provisional(&id("tt1"), MediaKind::Movie).await;
        log.upsert_provisional(&id("tt2"), MediaKind::Movie).await;

        let meta = ResolvedMeta::resolved(id("tt1"), MediaKind::Movie, "Film".into(), "P".into());
        assert!(log.apply_resolved(&id("tt1"), meta).await);

        let entries = log.list().await;
        assert_eq!(order(&entries), vec!["tt2", "tt1"]);
        assert_eq!(entries[1].meta.display_name, "Film");
        assert_eq!(entries[1].meta.resolution, Resolution::Resolved);
        assert!(!log.needs_resolution(&id("tt1")).await);
        assert!(log.needs_resolution(&id("tt2")).await);
    }

    #[tokio::test]
    async fn test_apply_resolved_after_eviction_is_noop() {
        let log = log(1);
        log.upsert_provisional(&id("tt1"), MediaKind::Movie).await;
        log.upsert_provisional(&id("tt2"), MediaKind::Movie).await;

        let meta = ResolvedMeta::resolved(id("tt1"), MediaKind::Movie, "Film".into(), "P".into());
        assert!(!log.apply_resolved(&id("tt1"), meta).await);
        assert_eq!(order(&log.list().await), vec!["tt2"]);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_create_one_entry() {
        let log = log(10);
        let mut handles = Vec::new();
        for _ in 0..16 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                log.upsert_provisional(&MediaIdentifier::parse("tt7:1:1"), MediaKind::Series)
                    .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn test_restore_applies_uniqueness_and_capacity() {
        let log = log(2);
        let placeholder = Placeholder::new("x", "y");
        let saved = vec![
            placeholder.unresolved(id("tt1"), MediaKind::Movie),
            placeholder.unresolved(id("tt1"), MediaKind::Movie),
            placeholder.unresolved(id("tt2"), MediaKind::Movie),
            placeholder.unresolved(id("tt3"), MediaKind::Movie),
        ];

        assert_eq!(log.restore(saved).await, 2);
        assert_eq!(order(&log.list().await), vec!["tt1", "tt2"]);
    }

    #[tokio::test]
    async fn test_revision_tracks_changes() {
        let log = log(2);
        let start = log.revision();
        log.upsert_provisional(&id("tt1"), MediaKind::Movie).await;
        assert!(log.revision() > start);

        let after_insert = log.revision();
        log.upsert_provisional(&id("tt1"), MediaKind::Movie).await;
        log.truncate_to_capacity().await;
        assert_eq!(log.revision(), after_insert);
    }
}
