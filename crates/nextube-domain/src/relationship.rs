//! Relationship ledger types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of entity a like points at.
///
/// Storage format: lowercase string. Route format: single letter (`v`, `c`, `t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeTargetKind {
    Video,
    Comment,
    Tweet,
}

impl LikeTargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Comment => "comment",
            Self::Tweet => "tweet",
        }
    }

    /// Parse the short route segment used by `/likes/toggle/{segment}/{id}`.
    pub fn from_route_segment(segment: &str) -> Option<Self> {
        match segment {
            "v" => Some(Self::Video),
            "c" => Some(Self::Comment),
            "t" => Some(Self::Tweet),
            _ => None,
        }
    }
}

impl fmt::Display for LikeTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown like target kind: {0}")]
pub struct UnknownLikeTargetKind(pub String);

impl FromStr for LikeTargetKind {
    type Err = UnknownLikeTargetKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "comment" => Ok(Self::Comment),
            "tweet" => Ok(Self::Tweet),
            other => Err(UnknownLikeTargetKind(other.to_owned())),
        }
    }
}

/// Result of flipping a toggle edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle<T> {
    /// The edge did not exist and now does.
    Added(T),
    /// The edge existed and was deleted.
    Removed,
}

impl<T> Toggle<T> {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }
}
