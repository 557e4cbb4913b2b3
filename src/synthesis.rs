//! # Interaction Synthesizer
//!
//! Deterministically assigns a fixed-size subset of the catalog to each of N
//! synthetic users, producing records shaped exactly like real ones.
//!
//! User `i` (zero based) starts at `base = (i * STEP) mod total` and walks the
//! popularity-ordered catalog from there, wrapping around, until it has collected
//! `songs_per_user` distinct tracks. The same catalog ordering always yields the
//! same output.

use crate::catalog::CatalogTrack;
use crate::error::{require_positive, EngineError, Result};
use crate::interaction::{simulated_user_id, InteractionRecord};
use log::{debug, info};
use std::collections::HashSet;

/// Stride between successive users' starting offsets
pub const STEP: usize = 7919;

/// Default number of synthetic users
pub const DEFAULT_NUM_USERS: usize = 5000;

/// Default number of tracks assigned to each synthetic user
pub const DEFAULT_SONGS_PER_USER: usize = 50;

/// Parameters for one synthesis batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisParams {
    pub num_users: usize,
    pub songs_per_user: usize,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            num_users: DEFAULT_NUM_USERS,
            songs_per_user: DEFAULT_SONGS_PER_USER,
        }
    }
}

/// Starting catalog index for zero-based user `index`.
///
/// Reduces both factors first so the product cannot overflow. `total` must be
/// non-zero; [`generate`] rejects an empty catalog before calling this.
#[must_use]
pub(crate) const fn base_offset(index: usize, total: usize) -> usize {
    ((index % total) * (STEP % total)) % total
}

/// Catalog indices picked for one user, in walk order.
fn pick_indices(base: usize, total: usize, songs_per_user: usize) -> Vec<usize> {
    let mut visited = HashSet::with_capacity(songs_per_user);
    let mut picks = Vec::with_capacity(songs_per_user);
    let mut j = 0;
    while picks.len() < songs_per_user {
        let idx = (base + j) % total;
        if visited.insert(idx) {
            picks.push(idx);
        }
        j += 1;
    }
    picks
}

/// Generate the synthetic interaction set.
///
/// `catalog` must already be in popularity order (see
/// [`Catalog::load`](crate::catalog::Catalog::load)). Each of the `num_users`
/// users gets exactly `songs_per_user` distinct tracks, recorded under
/// `sim_user_1`, `sim_user_2`, and so on.
///
/// # Returns
///
/// `num_users * songs_per_user` records, grouped by user in user order, each
/// user's tracks in walk order. Display fields and popularity are copied from
/// the catalog.
///
/// # Errors
///
/// - [`EngineError::InvalidParameter`] if either count is zero
/// - [`EngineError::InsufficientCatalog`] if the catalog has fewer than
///   `songs_per_user` tracks; nothing is generated in that case
///
/// # Examples
///
/// ```
/// use colisten::catalog::CatalogTrack;
/// use colisten::synthesis;
///
/// let catalog: Vec<CatalogTrack> = ["a", "b", "c"]
///     .iter()
///     .map(|id| CatalogTrack {
///         track_id: id.to_string(),
///         name: id.to_uppercase(),
///         artist_name: String::new(),
///         album_name: String::new(),
///         popularity: 0,
///         genre: None,
///     })
///     .collect();
///
/// let records = synthesis::generate(&catalog, 2, 2)?;
/// assert_eq!(records.len(), 4);
/// assert_eq!(records[0].user_id.as_deref(), Some("sim_user_1"));
/// # Ok::<(), colisten::EngineError>(())
/// ```
pub fn generate(
    catalog: &[CatalogTrack],
    num_users: usize,
    songs_per_user: usize,
) -> Result<Vec<InteractionRecord>> {
    require_positive("num_users", num_users)?;
    require_positive("songs_per_user", songs_per_user)?;

    let total = catalog.len();
    if total < songs_per_user {
        return Err(EngineError::InsufficientCatalog {
            required: songs_per_user,
            available: total,
        });
    }

    let mut records = Vec::with_capacity(num_users * songs_per_user);
    for i in 0..num_users {
        let user_id = simulated_user_id(i);
        let base = base_offset(i, total);
        records.extend(
            pick_indices(base, total, songs_per_user)
                .into_iter()
                .map(|idx| InteractionRecord::from_catalog(user_id.clone(), &catalog[idx])),
        );
        if i % 1000 == 0 {
            debug!("Synthesized {user_id} starting at catalog index {base}");
        }
    }

    info!(
        "Synthesized {} interactions for {num_users} users from {total} catalog tracks",
        records.len()
    );
    Ok(records)
}

/// [`generate`] with a parameter bundle.
pub fn generate_with(catalog: &[CatalogTrack], params: SynthesisParams) -> Result<Vec<InteractionRecord>> {
    generate(catalog, params.num_users, params.songs_per_user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn catalog(size: usize) -> Vec<CatalogTrack> {
        (0..size)
            .map(|i| CatalogTrack {
                track_id: format!("t{i}"),
                name: format!("Song {i}"),
                artist_name: format!("Artist {}", i % 7),
                album_name: format!("Album {}", i % 11),
                popularity: 100 - i as i64,
                genre: None,
            })
            .collect()
    }

    fn tracks_by_user(records: &[InteractionRecord]) -> HashMap<String, Vec<String>> {
        let mut by_user: HashMap<String, Vec<String>> = HashMap::new();
        for r in records {
            by_user
                .entry(r.user_id.clone().unwrap())
                .or_default()
                .push(r.track_id.clone().unwrap());
        }
        by_user
    }

    #[test]
    fn test_generation_is_deterministic() {
        let catalog = catalog(97);
        let first = generate(&catalog, 40, 12).unwrap();
        let second = generate(&catalog, 40, 12).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_each_user_gets_exactly_k_distinct_tracks() {
        let catalog = catalog(60);
        let records = generate(&catalog, 25, 17).unwrap();
        let by_user = tracks_by_user(&records);

        assert_eq!(by_user.len(), 25);
        for (user, tracks) in by_user {
            let distinct: HashSet<&String> = tracks.iter().collect();
            assert_eq!(tracks.len(), 17, "{user} has wrong pick count");
            assert_eq!(distinct.len(), 17, "{user} has duplicate tracks");
        }
    }

    #[test]
    fn test_songs_per_user_equal_to_catalog_size() {
        let catalog = catalog(5);
        let records = generate(&catalog, 3, 5).unwrap();
        assert_eq!(records.len(), 15);
    }

    #[test]
    fn test_insufficient_catalog_fails() {
        let catalog = catalog(3);
        let err = generate(&catalog, 2, 4).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientCatalog { required: 4, available: 3 }
        ));
    }

    #[test]
    fn test_zero_parameters_rejected() {
        let catalog = catalog(3);
        assert!(matches!(
            generate(&catalog, 0, 1),
            Err(EngineError::InvalidParameter { name: "num_users", .. })
        ));
        assert!(matches!(
            generate(&catalog, 1, 0),
            Err(EngineError::InvalidParameter { name: "songs_per_user", .. })
        ));
    }

    #[test]
    fn test_empty_catalog_rejected_before_offsets() {
        let err = generate(&[], 3, 1).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientCatalog {
                required: 1,
                available: 0
            }
        ));
    }

    #[test]
    fn test_base_offsets_spread() {
        // 7919 mod 10 = 9, so users 1 and 2 must start at different offsets
        assert_eq!(base_offset(0, 10), 0);
        assert_eq!(base_offset(1, 10), 9);
        assert_ne!(base_offset(0, 10), base_offset(1, 10));
    }

    #[test]
    fn test_base_offset_matches_naive_formula() {
        for total in [1usize, 4, 97, 10_000] {
            for i in [0usize, 1, 2, 3, 999, 4999] {
                assert_eq!(base_offset(i, total), (i * STEP) % total);
            }
        }
    }

    #[test]
    fn test_four_track_walkthrough() {
        let catalog = catalog(4);
        let records = generate(&catalog, 3, 2).unwrap();
        let by_user = tracks_by_user(&records);

        // Bases: 0, 7919 % 4 = 3, 15838 % 4 = 2
        assert_eq!(by_user["sim_user_1"], vec!["t0", "t1"]);
        assert_eq!(by_user["sim_user_2"], vec!["t3", "t0"]);
        assert_eq!(by_user["sim_user_3"], vec!["t2", "t3"]);
    }

    #[test]
    fn test_denormalized_fields_copied() {
        let catalog = catalog(3);
        let records = generate(&catalog, 1, 1).unwrap();
        assert_eq!(records[0].track_name.as_deref(), Some("Song 0"));
        assert_eq!(records[0].artist_name.as_deref(), Some("Artist 0"));
        assert_eq!(records[0].album_name.as_deref(), Some("Album 0"));
        assert_eq!(records[0].popularity, 100);
    }
}
