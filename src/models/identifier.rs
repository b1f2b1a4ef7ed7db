//! Composite media identifiers
//!
//! An identifier names one unit of media: `<mainId>[:<season>:<episode>]`.
//! Catalog ids look like `tt0944947`, anime ids carry their namespace in the
//! main id itself (`kitsu:1376`), so `kitsu:1376:5` is episode 5 of anime 1376.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Namespace prefix used by anime catalog ids
pub const ANIME_NAMESPACE: &str = "kitsu";

/// Which external metadata source owns an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Catalog,
    Anime,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Catalog => "catalog",
            ProviderKind::Anime => "anime",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of media a lookup was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    Anime,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
            MediaKind::Anime => "anime",
        }
    }

    /// Whether season/episode ordinals mean anything for this kind
    pub fn is_episodic(&self) -> bool {
        !matches!(self, MediaKind::Movie)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "movie" => Ok(MediaKind::Movie),
            "series" => Ok(MediaKind::Series),
            "anime" => Ok(MediaKind::Anime),
            other => Err(format!("unknown media kind '{other}'")),
        }
    }
}

/// A parsed composite identifier
///
/// Equality and hashing use the raw string only: two identifiers are the
/// same iff their string forms are the same.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MediaIdentifier {
    raw: String,
    main_id: String,
    provider: ProviderKind,
    season: Option<u32>,
    episode: Option<u32>,
}

impl MediaIdentifier {
    /// Parse an identifier. Never fails: parts that do not parse are treated
    /// as absent, so a malformed suffix degrades to a movie-like identifier.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let mut segments = raw.split(':');
        let first = segments.next().unwrap_or_default();

        let (main_id, provider) = if first == ANIME_NAMESPACE {
            match segments.next() {
                Some(id) if !id.is_empty() => (format!("{first}:{id}"), ProviderKind::Anime),
                _ => (first.to_string(), ProviderKind::Catalog),
            }
        } else {
            (first.to_string(), ProviderKind::Catalog)
        };

        let rest: Vec<&str> = segments.collect();
        let (season, episode) = match rest.as_slice() {
            [] => (None, None),
            [episode] => (None, parse_episode(episode)),
            [season, episode, ..] => {
                let episode = parse_episode(episode);
                let season = episode.and_then(|_| parse_ordinal(season));
                (season, episode)
            }
        };

        Self {
            raw,
            main_id,
            provider,
            season,
            episode,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn main_id(&self) -> &str {
        &self.main_id
    }

    pub fn provider_kind(&self) -> ProviderKind {
        self.provider
    }

    pub fn season(&self) -> Option<u32> {
        self.season
    }

    pub fn episode(&self) -> Option<u32> {
        self.episode
    }

    /// The id the owning provider knows this media by (`1376` for `kitsu:1376`)
    pub fn provider_id(&self) -> &str {
        match self.provider {
            ProviderKind::Anime => self
                .main_id
                .split_once(':')
                .map(|(_, id)| id)
                .unwrap_or(&self.main_id),
            ProviderKind::Catalog => &self.main_id,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.main_id.trim().is_empty()
    }
}

fn parse_ordinal(segment: &str) -> Option<u32> {
    segment.trim().parse::<u32>().ok()
}

fn parse_episode(segment: &str) -> Option<u32> {
    parse_ordinal(segment).filter(|episode| *episode > 0)
}

impl PartialEq for MediaIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for MediaIdentifier {}

impl Hash for MediaIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for MediaIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<String> for MediaIdentifier {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<&str> for MediaIdentifier {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<MediaIdentifier> for String {
    fn from(identifier: MediaIdentifier) -> Self {
        identifier.raw
    }
}
