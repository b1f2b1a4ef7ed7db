pub mod lookup;
pub mod recency_log;
pub mod resolution_worker;
pub mod resolver;
pub mod snapshot;
pub mod subtitle_store;

pub use lookup::LookupCoordinator;
pub use recency_log::RecencyLog;
pub use resolution_worker::{ResolutionJob, ResolutionQueue, ResolutionWorker};
pub use resolver::Resolver;
pub use snapshot::HistorySnapshotter;
pub use subtitle_store::{SubtitleStore, SubtitleUpload};
