//! Background resolution of provisional history entries
//!
//! Lookups push jobs onto a bounded queue without waiting. One dispatcher
//! task drains the queue and runs at most `max_concurrent` resolutions at a
//! time. Identifiers that are queued or running are tracked so the same
//! identifier is never resolved twice concurrently.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::recency_log::RecencyLog;
use super::resolver::Resolver;
use crate::models::{MediaIdentifier, MediaKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionJob {
    pub identifier: MediaIdentifier,
    pub media_kind: MediaKind,
}

/// Producer side of the resolution queue
#[derive(Clone)]
pub struct ResolutionQueue {
    sender: mpsc::Sender<ResolutionJob>,
    in_flight: Arc<RwLock<HashSet<String>>>,
}

impl ResolutionQueue {
    pub fn new(queue_size: usize) -> (Self, mpsc::Receiver<ResolutionJob>) {
        let (sender, receiver) = mpsc::channel(queue_size.max(1));
        let queue = Self {
            sender,
            in_flight: Arc::new(RwLock::new(HashSet::new())),
        };
        (queue, receiver)
    }

    /// Queue a job without blocking. Returns false when the identifier is
    /// already tracked or the queue is full or closed.
    pub async fn enqueue(&self, job: ResolutionJob) -> bool {
        let key = job.identifier.as_str().to_string();

        let mut in_flight = self.in_flight.write().await;
        if in_flight.contains(&key) {
            debug!("Resolution for {} already in flight", key);
            return false;
        }

        match self.sender.try_send(job) {
            Ok(()) => {
                in_flight.insert(key);
                true
            }
            Err(TrySendError::Full(job)) => {
                warn!(
                    "Resolution queue full, dropping job for {}",
                    job.identifier
                );
                false
            }
            Err(TrySendError::Closed(job)) => {
                warn!(
                    "Resolution worker stopped, dropping job for {}",
                    job.identifier
                );
                false
            }
        }
    }

    pub async fn is_tracked(&self, identifier: &MediaIdentifier) -> bool {
        self.in_flight.read().await.contains(identifier.as_str())
    }

    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.read().await.len()
    }

    pub(crate) async fn release(&self, identifier: &MediaIdentifier) {
        self.in_flight.write().await.remove(identifier.as_str());
    }
}

/// Consumer side: resolves jobs and writes results into the history
pub struct ResolutionWorker {
    receiver: mpsc::Receiver<ResolutionJob>,
    queue: ResolutionQueue,
    resolver: Arc<Resolver>,
    history: RecencyLog,
    max_concurrent: usize,
}

impl ResolutionWorker {
    pub fn new(
        receiver: mpsc::Receiver<ResolutionJob>,
        queue: ResolutionQueue,
        resolver: Arc<Resolver>,
        history: RecencyLog,
        max_concurrent: usize,
    ) -> Self {
        Self {
            receiver,
            queue,
            resolver,
            history,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Dispatch jobs until cancelled or every producer is gone, then wait
    /// for running resolutions to finish.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            "Starting resolution worker (max concurrent: {})",
            self.max_concurrent
        );
        let permits = Arc::new(Semaphore::new(self.max_concurrent));

        loop {
            let job = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Resolution worker received cancellation signal");
                    break;
                }
                job = self.receiver.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            };

            let permit = tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Resolution worker received cancellation signal");
                    self.queue.release(&job.identifier).await;
                    break;
                }
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let queue = self.queue.clone();
            let resolver = self.resolver.clone();
            let history = self.history.clone();

            tokio::spawn(async move {
                let _permit = permit;
                debug!("Resolving {}", job.identifier);

                let meta = resolver.resolve(job.media_kind, &job.identifier).await;
                history.apply_resolved(&job.identifier, meta).await;
                queue.release(&job.identifier).await;
            });
        }

        self.receiver.close();
        let max = u32::try_from(self.max_concurrent).unwrap_or(u32::MAX);
        if let Err(e) = permits.acquire_many(max).await {
            error!("Failed waiting for running resolutions: {}", e);
        }
        info!("Resolution worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProviderResult;
    use crate::models::{Placeholder, ProviderKind, Resolution};
    use crate::providers::{FetchRequest, MetadataProvider, ProviderMeta};
    use async_trait::async_trait;
    use std::time::Duration;

    struct NamedProvider;

    #[async_trait]
    impl MetadataProvider for NamedProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Catalog
        }

        fn supports(&self, _identifier: &MediaIdentifier) -> bool {
            true
        }

        async fn fetch(&self, request: &FetchRequest) -> ProviderResult<ProviderMeta> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(ProviderMeta {
                name: format!("Title {}", request.main_id),
                poster: Some("P".to_string()),
                episodes: vec![],
            })
        }
    }

    fn placeholder() -> Placeholder {
        Placeholder::new("Fetching title...", "https://img.example/{id}")
    }

    fn job(raw: &str) -> ResolutionJob {
        ResolutionJob {
            identifier: MediaIdentifier::parse(raw),
            media_kind: MediaKind::Movie,
        }
    }

    #[tokio::test]
    async fn test_enqueue_deduplicates_in_flight_identifiers() {
        let (queue, _receiver) = ResolutionQueue::new(4);
        assert!(queue.enqueue(job("tt1")).await);
        assert!(!queue.enqueue(job("tt1")).await);
        assert!(queue.is_tracked(&MediaIdentifier::parse("tt1")).await);
        assert_eq!(queue.in_flight_count().await, 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_tracking() {
        let (queue, _receiver) = ResolutionQueue::new(1);
        assert!(queue.enqueue(job("tt1")).await);
        assert!(!queue.enqueue(job("tt2")).await);
        assert!(!queue.is_tracked(&MediaIdentifier::parse("tt2")).await);
    }

    #[tokio::test]
    async fn test_worker_resolves_and_releases() {
        let history = RecencyLog::new(5, placeholder());
        let provider: Arc<dyn MetadataProvider> = Arc::new(NamedProvider);
        let resolver = Arc::new(Resolver::new(vec![provider], placeholder()));
        let (queue, receiver) = ResolutionQueue::new(8);
        let shutdown = CancellationToken::new();
        let handle = ResolutionWorker::new(receiver, queue.clone(), resolver, history.clone(), 2)
            .spawn(shutdown.clone());

        for raw in ["tt1", "tt2", "tt3"] {
            history
                .upsert_provisional(&MediaIdentifier::parse(raw), MediaKind::Movie)
                .await;
            assert!(queue.enqueue(job(raw)).await);
        }

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while queue.in_flight_count().await > 0 {
            assert!(tokio::time::Instant::now() < deadline, "jobs never completed");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        for entry in history.list().await {
            assert_eq!(entry.meta.resolution, Resolution::Resolved);
            assert_eq!(entry.meta.display_name, format!("Title {}", entry.meta.identifier));
        }

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_stops_when_cancelled() {
        let history = RecencyLog::new(5, placeholder());
        let resolver = Arc::new(Resolver::new(vec![], placeholder()));
        let (queue, receiver) = ResolutionQueue::new(8);
        let shutdown = CancellationToken::new();
        let handle = ResolutionWorker::new(receiver, queue.clone(), resolver, history, 1)
            .spawn(shutdown.clone());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!queue.enqueue(job("tt1")).await);
    }
}
