//! Reaction type - the closed set of reaction kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Kind of a reaction.
///
/// Ordinals start at 1 and are contiguous; 0 is reserved as invalid. The
/// external representation is the lowercase identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ReactionType {
    Like = 1,
    Love = 2,
    Haha = 3,
    Wow = 4,
    Sad = 5,
    Angry = 6,
}

impl ReactionType {
    /// Every reaction type in ordinal order
    pub const ALL: [ReactionType; 6] = [
        Self::Like,
        Self::Love,
        Self::Haha,
        Self::Wow,
        Self::Sad,
        Self::Angry,
    ];

    /// Stable lowercase identifier
    pub const fn identifier(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Haha => "haha",
            Self::Wow => "wow",
            Self::Sad => "sad",
            Self::Angry => "angry",
        }
    }

    /// Numeric ordinal (1..=6)
    #[inline]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ReactionType {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.ordinal() == value)
            .ok_or_else(|| DomainError::invalid_entity("reaction", format!("unsupported type '{value}'")))
    }
}

impl FromStr for ReactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.identifier() == s)
            .ok_or_else(|| DomainError::invalid_entity("reaction", format!("unsupported type '{s}'")))
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}
