//! # Co-occurrence Ranker
//!
//! On-demand global ranking of tracks by collective listening affinity. Every
//! call reads a fresh snapshot of both partitions, scores it with
//! [`crate::algorithm`], and attaches display metadata. Nothing is cached
//! between calls.

use crate::algorithm;
use crate::error::{require_positive, Result};
use crate::metadata::SnapshotMetadata;
use crate::store::InteractionStore;
use log::info;
use serde::{Deserialize, Serialize};

/// Default number of ranked tracks returned
pub const DEFAULT_LIMIT: usize = 5;

/// Default candidate pool bound
pub const DEFAULT_POOL_SIZE: usize = 500;

/// Ranking query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingParams {
    pub limit: usize,
    pub pool_size: usize,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

/// One entry of a ranking result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTrack {
    pub track_id: String,
    pub track_name: Option<String>,
    pub artist_name: Option<String>,
    pub probability: f64,
}

/// Ranker bound to an interaction store.
pub struct Ranker<'s, S: InteractionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: InteractionStore + ?Sized> Ranker<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Rank tracks, descending by probability, at most `params.limit` entries.
    ///
    /// Reads one snapshot of both partitions, restricts scoring to the
    /// `params.pool_size` tracks with the most listeners, accumulates pairwise
    /// cosine similarity over that pool and keeps the best `params.limit`.
    /// Display fields come from the same snapshot, simulated rows first.
    ///
    /// # Returns
    ///
    /// Entries ordered by similarity, then listener count, then track id. The
    /// probabilities sum to 1, or are all `0.0` when no two candidates share a
    /// listener. An empty store yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`crate::EngineError::InvalidParameter`] for a zero `limit` or `pool_size`
    /// - [`crate::EngineError::Storage`] when the snapshot cannot be read
    ///
    /// A store read failure aborts the call; partial rankings are never returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use colisten::ranker::{Ranker, RankingParams};
    /// use colisten::store::SqliteInteractionStore;
    ///
    /// let store = SqliteInteractionStore::new("colisten.db");
    /// let top = Ranker::new(&store).rank(RankingParams { limit: 10, pool_size: 500 })?;
    /// for entry in &top {
    ///     println!("{:.4} {}", entry.probability, entry.track_id);
    /// }
    /// # Ok::<(), colisten::EngineError>(())
    /// ```
    ///
    /// # Design Notes
    ///
    /// The pool bound keeps the pair scan at `pool_size²` regardless of catalog
    /// size, at the cost of never ranking tracks outside the pool.
    pub fn rank(&self, params: RankingParams) -> Result<Vec<RankedTrack>> {
        let limit = require_positive("limit", params.limit)?;
        let pool_size = require_positive("pool_size", params.pool_size)?;

        let snapshot = self.store.snapshot()?;
        let top = algorithm::top_candidates(&snapshot, limit, pool_size);
        let metadata = SnapshotMetadata::new(&snapshot);

        let ranked: Vec<RankedTrack> = top
            .into_iter()
            .map(|candidate| {
                let display = metadata.lookup(&candidate.track_id);
                RankedTrack {
                    track_id: candidate.track_id,
                    track_name: display.track_name,
                    artist_name: display.artist_name,
                    probability: candidate.probability,
                }
            })
            .collect();

        info!(
            "Ranked {} tracks from {} interactions (limit {limit}, pool {pool_size})",
            ranked.len(),
            snapshot.len()
        );
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::interaction::{InteractionRecord, InteractionSnapshot, Partition, TrackDisplay};
    use std::cell::Cell;

    /// In-memory store for exercising the ranker without SQLite.
    #[derive(Default)]
    struct FixedStore {
        snapshot: InteractionSnapshot,
        fail: bool,
        reads: Cell<usize>,
    }

    impl InteractionStore for FixedStore {
        fn snapshot(&self) -> Result<InteractionSnapshot> {
            self.reads.set(self.reads.get() + 1);
            if self.fail {
                return Err(EngineError::Storage(rusqlite::Error::InvalidQuery));
            }
            Ok(self.snapshot.clone())
        }

        fn first_display(&self, _: Partition, _: &str) -> Result<Option<TrackDisplay>> {
            Ok(None)
        }

        fn replace_user_history(&self, _: Option<&str>, _: &[InteractionRecord]) -> Result<usize> {
            Ok(0)
        }

        fn replace_simulated(&self, _: &[InteractionRecord]) -> Result<usize> {
            Ok(0)
        }
    }

    fn rec(user: &str, track: &str) -> InteractionRecord {
        InteractionRecord {
            user_id: Some(user.to_string()),
            track_id: Some(track.to_string()),
            track_name: Some(format!("Name {track}")),
            artist_name: Some(format!("Artist {track}")),
            album_name: None,
            popularity: 0,
        }
    }

    fn store() -> FixedStore {
        FixedStore {
            snapshot: InteractionSnapshot {
                real: vec![rec("alice", "A"), rec("alice", "B")],
                simulated: vec![rec("sim_user_1", "A"), rec("sim_user_1", "C"), rec("sim_user_2", "C")],
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_attaches_metadata_and_normalizes() {
        let store = store();
        let ranked = Ranker::new(&store).rank(RankingParams::default()).unwrap();

        assert_eq!(ranked.len(), 3);
        let sum: f64 = ranked.iter().map(|r| r.probability).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        for entry in &ranked {
            assert_eq!(entry.track_name.as_deref(), Some(format!("Name {}", entry.track_id).as_str()));
        }
        for pair in ranked.windows(2) {
            assert!(pair[0].probability >= pair[1].probability);
        }
        // A co-occurs with both B and C
        assert_eq!(ranked[0].track_id, "A");
    }

    #[test]
    fn test_limit_caps_result() {
        let store = store();
        let ranked = Ranker::new(&store)
            .rank(RankingParams { limit: 1, pool_size: 500 })
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].probability - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_store_is_not_an_error() {
        let store = FixedStore::default();
        assert!(Ranker::new(&store).rank(RankingParams::default()).unwrap().is_empty());
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let store = FixedStore {
            fail: true,
            ..Default::default()
        };
        let err = Ranker::new(&store).rank(RankingParams::default()).unwrap_err();
        assert!(matches!(err, EngineError::Storage(_)));
    }

    #[test]
    fn test_zero_params_rejected_before_reading() {
        let store = store();
        let ranker = Ranker::new(&store);
        assert!(ranker.rank(RankingParams { limit: 0, pool_size: 5 }).is_err());
        assert!(ranker.rank(RankingParams { limit: 5, pool_size: 0 }).is_err());
        assert_eq!(store.reads.get(), 0);
    }

    #[test]
    fn test_each_call_rereads_store() {
        let store = store();
        let ranker = Ranker::new(&store);
        ranker.rank(RankingParams::default()).unwrap();
        ranker.rank(RankingParams::default()).unwrap();
        assert_eq!(store.reads.get(), 2);
    }
}
