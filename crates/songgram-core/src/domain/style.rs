//! Music style catalog and occasion suggestions.
//!
//! The style list is closed: a request naming a style outside of it fails
//! validation. Occasions are free text; the suggestions only feed pickers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A supported music style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MusicStyle {
    Pop,
    Rock,
    Country,
    Jazz,
    Classical,
    #[serde(rename = "R&B")]
    RhythmAndBlues,
    Folk,
    Electronic,
    #[serde(rename = "Hip Hop")]
    HipHop,
    Blues,
    #[serde(rename = "Trap Rap")]
    TrapRap,
    #[serde(rename = "Old Skool Hip Hop")]
    OldSkoolHipHop,
    Ballads,
    Reggae,
    Soul,
}

impl MusicStyle {
    /// Every supported style, in display order.
    pub const ALL: [Self; 15] = [
        Self::Pop,
        Self::Rock,
        Self::Country,
        Self::Jazz,
        Self::Classical,
        Self::RhythmAndBlues,
        Self::Folk,
        Self::Electronic,
        Self::HipHop,
        Self::Blues,
        Self::TrapRap,
        Self::OldSkoolHipHop,
        Self::Ballads,
        Self::Reggae,
        Self::Soul,
    ];

    /// Human-readable label, as accepted on the wire.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pop => "Pop",
            Self::Rock => "Rock",
            Self::Country => "Country",
            Self::Jazz => "Jazz",
            Self::Classical => "Classical",
            Self::RhythmAndBlues => "R&B",
            Self::Folk => "Folk",
            Self::Electronic => "Electronic",
            Self::HipHop => "Hip Hop",
            Self::Blues => "Blues",
            Self::TrapRap => "Trap Rap",
            Self::OldSkoolHipHop => "Old Skool Hip Hop",
            Self::Ballads => "Ballads",
            Self::Reggae => "Reggae",
            Self::Soul => "Soul",
        }
    }

    /// Labels of every supported style.
    pub fn labels() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(|s| s.label())
    }
}

impl fmt::Display for MusicStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a style label is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported music style: {0}")]
pub struct UnknownStyle(pub String);

impl FromStr for MusicStyle {
    type Err = UnknownStyle;

    /// Case-insensitive match against the catalog labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownStyle(s.to_string()))
    }
}

/// Occasions offered to clients as suggestions. Any non-empty text is accepted.
pub const OCCASION_SUGGESTIONS: [&str; 9] = [
    "Birthday",
    "Anniversary",
    "Graduation",
    "Wedding",
    "Baby Shower",
    "Retirement",
    "Holiday",
    "Just Because",
    "Other",
];
