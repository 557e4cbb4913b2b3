//! # Metadata Resolver
//!
//! Display text for a track id. The simulated partition is checked first since
//! it is denser; the real partition is the fallback. Either one is an acceptable
//! source, so "first matching row" is all that is promised. A track found in
//! neither partition resolves to empty metadata rather than an error.

use crate::error::Result;
use crate::interaction::{InteractionRecord, InteractionSnapshot, Partition, TrackDisplay};
use crate::store::InteractionStore;
use log::trace;
use std::collections::HashMap;

/// Lookup order: simulated first, then real
pub const LOOKUP_ORDER: [Partition; 2] = [Partition::Simulated, Partition::Real];

/// Anything that can turn a track id into display metadata.
pub trait ResolveMetadata {
    fn resolve(&self, track_id: &str) -> Result<TrackDisplay>;
}

/// Resolver that queries the store for each lookup.
#[derive(Debug)]
pub struct MetadataResolver<'s, S: InteractionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: InteractionStore + ?Sized> MetadataResolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }
}

impl<S: InteractionStore + ?Sized> ResolveMetadata for MetadataResolver<'_, S> {
    fn resolve(&self, track_id: &str) -> Result<TrackDisplay> {
        for partition in LOOKUP_ORDER {
            if let Some(display) = self.store.first_display(partition, track_id)? {
                trace!("Resolved {track_id} from `{partition}`");
                return Ok(display);
            }
        }
        trace!("No metadata for {track_id}");
        Ok(TrackDisplay::default())
    }
}

/// Resolver over an already-read snapshot, indexed by track id.
///
/// Used by the ranker so metadata comes from the same snapshot the scores did.
#[derive(Debug, Default)]
pub struct SnapshotMetadata<'a> {
    simulated: HashMap<&'a str, &'a InteractionRecord>,
    real: HashMap<&'a str, &'a InteractionRecord>,
}

impl<'a> SnapshotMetadata<'a> {
    #[must_use]
    pub fn new(snapshot: &'a InteractionSnapshot) -> Self {
        Self {
            simulated: first_rows(&snapshot.simulated),
            real: first_rows(&snapshot.real),
        }
    }

    /// Infallible lookup; see [`ResolveMetadata`] for the trait form.
    #[must_use]
    pub fn lookup(&self, track_id: &str) -> TrackDisplay {
        self.simulated
            .get(track_id)
            .or_else(|| self.real.get(track_id))
            .map(|record| TrackDisplay::from(*record))
            .unwrap_or_default()
    }
}

impl ResolveMetadata for SnapshotMetadata<'_> {
    fn resolve(&self, track_id: &str) -> Result<TrackDisplay> {
        Ok(self.lookup(track_id))
    }
}

fn first_rows(records: &[InteractionRecord]) -> HashMap<&str, &InteractionRecord> {
    let mut index = HashMap::new();
    for record in records {
        if let Some(track) = record.track_key() {
            index.entry(track).or_insert(record);
        }
    }
    index
}
