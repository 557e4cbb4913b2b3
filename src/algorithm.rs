//! Co-occurrence scoring.
//!
//! Pure functions over an [`InteractionSnapshot`]: build the track → listeners
//! index, cut a support-ranked candidate pool, accumulate pairwise cosine
//! similarity and turn the top slice into a probability distribution.
//!
//! ```text
//! sim(i, j) = |users_i ∩ users_j| / sqrt(support_i * support_j)
//! score(i)  = Σ_{j ≠ i} sim(i, j)
//! ```
//!
//! The pool bound keeps the quadratic pair scan tractable and biases the result
//! toward tracks that are already widely listened.

use crate::interaction::{InteractionRecord, InteractionSnapshot, Partition};
use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Listener identity used for co-occurrence.
///
/// Rows without a user id collapse into one anonymous listener per partition, so
/// anonymous real rows never co-occur with anonymous simulated rows. Within a
/// partition every anonymous row counts as the same listener, which can inflate
/// overlap between tracks that only anonymous rows share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserKey<'a> {
    Known(&'a str),
    Unknown(Partition),
}

impl<'a> UserKey<'a> {
    /// Listener identity of a row read from `partition`.
    #[must_use]
    pub fn of(partition: Partition, record: &'a InteractionRecord) -> Self {
        record.user_key().map_or(UserKey::Unknown(partition), UserKey::Known)
    }
}

/// Listeners per track
pub type TrackUsers<'a> = HashMap<&'a str, HashSet<UserKey<'a>>>;

/// Transient per-call score for one candidate track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub track_id: String,
    /// Number of distinct listeners
    pub support: usize,
    pub similarity_score: f64,
    pub probability: f64,
}

impl CandidateScore {
    /// Rank order: similarity descending, then support descending. Track id
    /// ascending settles whatever is still tied so output is reproducible.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .similarity_score
            .total_cmp(&self.similarity_score)
            .then_with(|| other.support.cmp(&self.support))
            .then_with(|| self.track_id.cmp(&other.track_id))
    }
}

/// Index every record of both partitions by track. Rows without a track id are skipped.
#[must_use]
pub fn build_track_users(snapshot: &InteractionSnapshot) -> TrackUsers<'_> {
    let mut index: TrackUsers<'_> = HashMap::new();
    for (partition, record) in snapshot.iter() {
        let Some(track) = record.track_key() else {
            continue;
        };
        index.entry(track).or_default().insert(UserKey::of(partition, record));
    }
    index
}

/// Cosine similarity of two 0/1 listener vectors. Zero when either side is empty.
#[must_use]
pub fn cosine_similarity<'a>(a: &HashSet<UserKey<'a>>, b: &HashSet<UserKey<'a>>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let overlap = small.iter().filter(|user| large.contains(*user)).count();
    if overlap == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let norm = ((a.len() * b.len()) as f64).sqrt();
    overlap as f64 / norm
}

/// The `pool_size` tracks with the most listeners, ties broken by track id.
#[must_use]
pub fn candidate_pool<'i, 'a>(
    index: &'i TrackUsers<'a>,
    pool_size: usize,
) -> Vec<(&'a str, &'i HashSet<UserKey<'a>>)> {
    let mut pool: Vec<_> = index.iter().map(|(track, users)| (*track, users)).collect();
    pool.sort_by(|(ta, ua), (tb, ub)| ub.len().cmp(&ua.len()).then_with(|| ta.cmp(tb)));
    pool.truncate(pool_size);
    pool
}

/// Accumulated similarity of every pool member against all others.
///
/// Each row is summed in pool order, so the result does not depend on how rayon
/// schedules the rows.
#[must_use]
pub fn accumulate_similarity(pool: &[(&str, &HashSet<UserKey<'_>>)]) -> Vec<f64> {
    pool.par_iter()
        .enumerate()
        .map(|(i, (_, users_i))| {
            pool.iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (_, users_j))| cosine_similarity(users_i, users_j))
                .sum::<f64>()
        })
        .collect()
}

/// Score and rank the candidate pool. Probabilities are left at zero.
#[must_use]
pub fn score_candidates(snapshot: &InteractionSnapshot, pool_size: usize) -> Vec<CandidateScore> {
    let index = build_track_users(snapshot);
    if index.is_empty() {
        return Vec::new();
    }

    let pool = candidate_pool(&index, pool_size);
    let scores = accumulate_similarity(&pool);
    debug!(
        "Scored {} candidates out of {} tracks ({} pairs)",
        pool.len(),
        index.len(),
        pool.len() * pool.len().saturating_sub(1) / 2
    );

    let mut ranked: Vec<CandidateScore> = pool
        .iter()
        .zip(scores)
        .map(|((track, users), similarity_score)| CandidateScore {
            track_id: (*track).to_string(),
            support: users.len(),
            similarity_score,
            probability: 0.0,
        })
        .collect();
    ranked.sort_by(CandidateScore::rank_cmp);
    ranked
}

/// Fill in `probability = score / Σ score` over `candidates`.
///
/// When the scores sum to zero every probability is zero; no uniform fallback.
pub fn normalize(candidates: &mut [CandidateScore]) {
    let total: f64 = candidates.iter().map(|c| c.similarity_score).sum();
    if total > 0.0 {
        for candidate in candidates.iter_mut() {
            candidate.probability = candidate.similarity_score / total;
        }
    } else {
        debug!("All {} top candidates scored zero, probabilities stay at 0.0", candidates.len());
        for candidate in candidates.iter_mut() {
            candidate.probability = 0.0;
        }
    }
}

/// The top `limit` ranked candidates with normalized probabilities.
#[must_use]
pub fn top_candidates(snapshot: &InteractionSnapshot, limit: usize, pool_size: usize) -> Vec<CandidateScore> {
    let mut ranked = score_candidates(snapshot, pool_size);
    ranked.truncate(limit);
    normalize(&mut ranked);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::InteractionRecord;

    fn rec(user: Option<&str>, track: Option<&str>) -> InteractionRecord {
        InteractionRecord {
            user_id: user.map(str::to_string),
            track_id: track.map(str::to_string),
            ..Default::default()
        }
    }

    /// The four-track synthesis walkthrough: A:{1,2} B:{1} C:{3} D:{2,3}
    fn walkthrough() -> InteractionSnapshot {
        let pairs = [("u1", "A"), ("u1", "B"), ("u2", "D"), ("u2", "A"), ("u3", "C"), ("u3", "D")];
        InteractionSnapshot {
            real: Vec::new(),
            simulated: pairs.iter().map(|&(u, t)| rec(Some(u), Some(t))).collect(),
        }
    }

    fn set<'a>(users: &[&'a str]) -> HashSet<UserKey<'a>> {
        users.iter().map(|u| UserKey::Known(*u)).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        let a = set(&["1", "2"]);
        let b = set(&["1"]);
        let c = set(&["3"]);
        assert!((cosine_similarity(&a, &b) - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(cosine_similarity(&b, &c), 0.0);
        assert_eq!(cosine_similarity(&a, &HashSet::new()), 0.0);
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_track_users_index() {
        let snapshot = walkthrough();
        let index = build_track_users(&snapshot);
        assert_eq!(index.len(), 4);
        assert_eq!(index["A"], set(&["u1", "u2"]));
        assert_eq!(index["C"], set(&["u3"]));
    }

    #[test]
    fn test_walkthrough_scores_and_tiers() {
        let ranked = score_candidates(&walkthrough(), 500);
        assert_eq!(ranked.len(), 4);

        let half = 0.5;
        let root_half = 1.0 / 2f64.sqrt();
        let score = |id: &str| ranked.iter().find(|c| c.track_id == id).unwrap().similarity_score;
        assert!((score("A") - (half + root_half)).abs() < 1e-9);
        assert!((score("D") - (half + root_half)).abs() < 1e-9);
        assert!((score("B") - root_half).abs() < 1e-9);
        assert!((score("C") - root_half).abs() < 1e-9);

        let top: HashSet<&str> = ranked[..2].iter().map(|c| c.track_id.as_str()).collect();
        let bottom: HashSet<&str> = ranked[2..].iter().map(|c| c.track_id.as_str()).collect();
        assert_eq!(top, HashSet::from(["A", "D"]));
        assert_eq!(bottom, HashSet::from(["B", "C"]));
    }

    #[test]
    fn test_rank_order_is_lexicographic() {
        let ranked = score_candidates(&walkthrough(), 500);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.similarity_score > b.similarity_score
                    || (a.similarity_score == b.similarity_score && a.support >= b.support)
            );
        }
    }

    #[test]
    fn test_support_breaks_similarity_ties() {
        // X:{1,2} Y:{1} share one listener; both score 1/sqrt(2)
        let snapshot = InteractionSnapshot {
            real: vec![rec(Some("1"), Some("Y")), rec(Some("1"), Some("X")), rec(Some("2"), Some("X"))],
            simulated: Vec::new(),
        };
        let ranked = score_candidates(&snapshot, 10);
        assert_eq!(ranked[0].track_id, "X");
        assert_eq!(ranked[0].support, 2);
        assert_eq!(ranked[1].track_id, "Y");
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let top = top_candidates(&walkthrough(), 3, 500);
        assert_eq!(top.len(), 3);
        let sum: f64 = top.iter().map(|c| c.probability).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_scores_give_zero_probabilities() {
        // No two tracks share a listener
        let snapshot = InteractionSnapshot {
            real: vec![rec(Some("1"), Some("A")), rec(Some("2"), Some("B"))],
            simulated: Vec::new(),
        };
        let top = top_candidates(&snapshot, 5, 500);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|c| c.probability == 0.0));
    }

    #[test]
    fn test_empty_snapshot_ranks_nothing() {
        assert!(top_candidates(&InteractionSnapshot::default(), 5, 500).is_empty());
    }

    #[test]
    fn test_rows_without_track_are_skipped() {
        let snapshot = InteractionSnapshot {
            real: vec![rec(Some("1"), None), rec(Some("1"), Some(""))],
            simulated: Vec::new(),
        };
        assert!(build_track_users(&snapshot).is_empty());
        assert!(score_candidates(&snapshot, 5).is_empty());
    }

    #[test]
    fn test_pool_size_bounds_candidates() {
        let ranked = score_candidates(&walkthrough(), 2);
        let ids: HashSet<&str> = ranked.iter().map(|c| c.track_id.as_str()).collect();
        // Only the two tracks with support 2 make the pool
        assert_eq!(ids, HashSet::from(["A", "D"]));
        assert!((ranked[0].similarity_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_anonymous_listeners_are_per_partition() {
        // Known edge case: anonymous rows in one partition share a single listener
        let snapshot = InteractionSnapshot {
            real: vec![rec(None, Some("A")), rec(None, Some("B"))],
            simulated: vec![rec(None, Some("C"))],
        };
        let index = build_track_users(&snapshot);
        assert_eq!(index["A"], HashSet::from([UserKey::Unknown(Partition::Real)]));
        assert_eq!(index["C"], HashSet::from([UserKey::Unknown(Partition::Simulated)]));

        let ranked = score_candidates(&snapshot, 10);
        let score = |id: &str| ranked.iter().find(|c| c.track_id == id).unwrap().similarity_score;
        assert!((score("A") - 1.0).abs() < 1e-9);
        assert!((score("B") - 1.0).abs() < 1e-9);
        assert_eq!(score("C"), 0.0);
    }

    #[test]
    fn test_same_user_id_across_partitions_is_one_listener() {
        let snapshot = InteractionSnapshot {
            real: vec![rec(Some("u1"), Some("A"))],
            simulated: vec![rec(Some("u1"), Some("B"))],
        };
        let ranked = score_candidates(&snapshot, 10);
        assert!(ranked.iter().all(|c| (c.similarity_score - 1.0).abs() < 1e-9));
    }
}
