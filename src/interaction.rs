//! Interaction records: "user U has track T in their listening history".

use crate::catalog::CatalogTrack;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of generated user identifiers (`sim_user_1`, `sim_user_2`, ...)
pub const SIMULATED_USER_PREFIX: &str = "sim_user_";

/// The two logical interaction tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Collected from real accounts
    Real,
    /// Produced by the synthesizer
    Simulated,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Real, Partition::Simulated];

    /// Backing table name in the store
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Partition::Real => "interactions_real",
            Partition::Simulated => "interactions_simulated",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Real => write!(f, "real"),
            Partition::Simulated => write!(f, "simulated"),
        }
    }
}

/// One listening-history row with display fields denormalized at write time.
///
/// Writers always fill `user_id` and `track_id`, but rows read back from the
/// store may lack either one; readers decide how to treat the gaps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: Option<String>,
    pub track_id: Option<String>,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub album_name: Option<String>,
    pub popularity: i64,
}

impl InteractionRecord {
    /// Record for `user_id` listening to a catalog track.
    #[must_use]
    pub fn from_catalog(user_id: impl Into<String>, track: &CatalogTrack) -> Self {
        Self {
            user_id: Some(user_id.into()),
            track_id: Some(track.track_id.clone()),
            track_name: Some(track.name.clone()),
            artist_name: Some(track.artist_name.clone()),
            album_name: Some(track.album_name.clone()),
            popularity: track.popularity,
        }
    }

    /// Track identifier, or `None` when missing or empty.
    #[must_use]
    pub fn track_key(&self) -> Option<&str> {
        self.track_id.as_deref().filter(|id| !id.is_empty())
    }

    /// User identifier, or `None` when missing or empty.
    #[must_use]
    pub fn user_key(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Generated user id for zero-based synthetic user index `index`.
#[must_use]
pub fn simulated_user_id(index: usize) -> String {
    format!("{SIMULATED_USER_PREFIX}{}", index + 1)
}

/// Display metadata for a track. Both fields are `None` when nothing is known.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackDisplay {
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
}

impl TrackDisplay {
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.track_name.is_none() && self.artist_name.is_none()
    }
}

impl From<&InteractionRecord> for TrackDisplay {
    fn from(record: &InteractionRecord) -> Self {
        Self {
            track_name: record.track_name.clone(),
            artist_name: record.artist_name.clone(),
        }
    }
}

/// Both partitions as read inside one store transaction.
#[derive(Debug, Clone, Default)]
pub struct InteractionSnapshot {
    pub real: Vec<InteractionRecord>,
    pub simulated: Vec<InteractionRecord>,
}

impl InteractionSnapshot {
    /// Records of one partition
    #[must_use]
    pub fn partition(&self, partition: Partition) -> &[InteractionRecord] {
        match partition {
            Partition::Real => &self.real,
            Partition::Simulated => &self.simulated,
        }
    }

    /// Every record tagged with its partition, real rows first.
    pub fn iter(&self) -> impl Iterator<Item = (Partition, &InteractionRecord)> + '_ {
        Partition::ALL
            .into_iter()
            .flat_map(move |p| self.partition(p).iter().map(move |r| (p, r)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.real.len() + self.simulated.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.real.is_empty() && self.simulated.is_empty()
    }
}
