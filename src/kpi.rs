//! Headline counts across both partitions.

use crate::algorithm::UserKey;
use crate::error::Result;
use crate::interaction::InteractionSnapshot;
use crate::store::InteractionStore;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    /// Distinct listeners across both partitions. Rows without a user id count
    /// as one anonymous listener per partition, the same way ranking counts them.
    pub distinct_users: usize,
    /// Interaction rows across both partitions
    pub total_interactions: usize,
    /// `None` when there are no users
    pub avg_interactions_per_user: Option<f64>,
}

#[must_use]
pub fn compute(snapshot: &InteractionSnapshot) -> Kpis {
    let users: HashSet<UserKey<'_>> = snapshot
        .iter()
        .map(|(partition, record)| UserKey::of(partition, record))
        .collect();
    let distinct_users = users.len();
    let total_interactions = snapshot.len();

    #[allow(clippy::cast_precision_loss)]
    let avg_interactions_per_user =
        (distinct_users > 0).then(|| total_interactions as f64 / distinct_users as f64);

    Kpis {
        distinct_users,
        total_interactions,
        avg_interactions_per_user,
    }
}

pub fn collect<S: InteractionStore + ?Sized>(store: &S) -> Result<Kpis> {
    Ok(compute(&store.snapshot()?))
}
