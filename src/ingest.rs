//! Real-user ingestion.
//!
//! Takes the bundle fetched from the music service after a user authorizes
//! access (profile plus top tracks) and replaces that user's rows in the real
//! partition. The payload is loosely shaped, so every field is optional and
//! defaults are applied here, once.

use crate::error::Result;
use crate::interaction::InteractionRecord;
use crate::store::InteractionStore;
use log::{info, warn};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListeningHistory {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub top_tracks: TopTracks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    pub id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopTracks {
    #[serde(default)]
    pub items: Vec<TrackItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackItem {
    pub id: Option<String>,
    pub name: Option<String>,
    pub popularity: Option<i64>,
    #[serde(default)]
    pub artists: Vec<NamedEntity>,
    pub album: Option<NamedEntity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedEntity {
    pub name: Option<String>,
}

impl ListeningHistory {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// The profile id, treating an empty string as missing
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.profile.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Interaction rows for this user. The first listed artist is the main one.
    #[must_use]
    pub fn to_records(&self) -> Vec<InteractionRecord> {
        let user_id = self.user_id().map(str::to_string);
        self.top_tracks
            .items
            .iter()
            .map(|item| InteractionRecord {
                user_id: user_id.clone(),
                track_id: item.id.clone(),
                track_name: item.name.clone(),
                artist_name: item.artists.first().and_then(|a| a.name.clone()),
                album_name: item.album.as_ref().and_then(|a| a.name.clone()),
                popularity: item.popularity.unwrap_or(0),
            })
            .collect()
    }
}

/// Replace the user's real-partition history with `history`. Returns rows written.
pub fn ingest<S: InteractionStore + ?Sized>(store: &S, history: &ListeningHistory) -> Result<usize> {
    let user_id = history.user_id();
    if user_id.is_none() {
        warn!("Listening history has no profile id, storing rows as anonymous");
    }

    let records = history.to_records();
    let written = store.replace_user_history(user_id, &records)?;
    info!(
        "Ingested {written} tracks for {} ({})",
        user_id.unwrap_or("<unknown user>"),
        history.profile.display_name.as_deref().unwrap_or("no display name")
    );
    Ok(written)
}
