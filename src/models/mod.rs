//! Domain models shared by the resolver, the stores and the web layer

pub mod identifier;
pub mod metadata;
pub mod subtitle;

pub use identifier::{MediaIdentifier, MediaKind, ProviderKind, ANIME_NAMESPACE};
pub use metadata::{Placeholder, RecencyLogEntry, Resolution, ResolvedMeta};
pub use subtitle::{SubtitleDescriptor, SubtitleRecord};
