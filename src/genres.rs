//! # Genre Aggregator
//!
//! Counts interactions per genre across both partitions, using the catalog's
//! `track_id → genre` map. Tracks the catalog does not know count as `unknown`.

use crate::catalog::GenreMap;
use crate::error::Result;
use crate::interaction::InteractionSnapshot;
use crate::store::InteractionStore;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

/// Aggregate over an already-read snapshot.
///
/// Sorted by count descending; equal counts are ordered by genre name.
#[must_use]
pub fn aggregate_snapshot(snapshot: &InteractionSnapshot, genres: &GenreMap) -> Vec<GenreCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_, record) in snapshot.iter() {
        let genre = genres.genre_of(record.track_key().unwrap_or_default());
        *counts.entry(genre).or_insert(0) += 1;
    }

    let mut aggregated: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    aggregated.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));

    debug!("Aggregated {} interactions into {} genres", snapshot.len(), aggregated.len());
    aggregated
}

/// Read a snapshot from `store` and aggregate it.
///
/// Partitions that have not been populated yet contribute nothing.
pub fn aggregate_genres<S: InteractionStore + ?Sized>(store: &S, genres: &GenreMap) -> Result<Vec<GenreCount>> {
    let snapshot = store.snapshot()?;
    Ok(aggregate_snapshot(&snapshot, genres))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogTrack, UNKNOWN_GENRE};
    use crate::interaction::InteractionRecord;

    fn genre_map() -> GenreMap {
        let track = |id: &str, genre: Option<&str>| CatalogTrack {
            track_id: id.to_string(),
            name: String::new(),
            artist_name: String::new(),
            album_name: String::new(),
            popularity: 0,
            genre: genre.map(str::to_string),
        };
        Catalog::from_tracks(
            vec![track("a", Some("pop")), track("b", Some("rock")), track("c", Some("pop")), track("d", None)],
            None,
        )
        .into_genre_map()
    }

    fn rec(track: Option<&str>) -> InteractionRecord {
        InteractionRecord {
            user_id: Some("u".to_string()),
            track_id: track.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_counts_across_partitions() {
        let snapshot = InteractionSnapshot {
            real: vec![rec(Some("a")), rec(Some("b"))],
            simulated: vec![rec(Some("c")), rec(Some("a")), rec(Some("zzz")), rec(Some("d")), rec(None)],
        };
        let aggregated = aggregate_snapshot(&snapshot, &genre_map());

        assert_eq!(
            aggregated,
            vec![
                GenreCount { genre: "pop".into(), count: 3 },
                GenreCount { genre: UNKNOWN_GENRE.into(), count: 3 },
                GenreCount { genre: "rock".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_genre_map_reports_unknown() {
        let snapshot = InteractionSnapshot {
            real: vec![rec(Some("a"))],
            simulated: Vec::new(),
        };
        let aggregated = aggregate_snapshot(&snapshot, &GenreMap::empty());
        assert_eq!(aggregated, vec![GenreCount { genre: UNKNOWN_GENRE.into(), count: 1 }]);
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(aggregate_snapshot(&InteractionSnapshot::default(), &genre_map()).is_empty());
    }
}
