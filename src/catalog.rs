//! # Catalog Loader
//!
//! Parses the external track catalog (a CSV export with at least the columns
//! `track_id, track_name, artists, album_name, popularity, track_genre`) into an
//! in-memory snapshot ordered by descending popularity.
//!
//! Rows are deduplicated by `track_id` (first occurrence wins) and rows without a
//! `track_id` are dropped. An unparseable popularity is read as `0` instead of
//! rejecting the row.
//!
//! The loader also produces the [`GenreMap`] used by the genre aggregator. It is
//! built once, owned by the caller and handed out by reference afterwards.

use crate::error::{EngineError, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of top tracks kept for synthesis when no limit is configured
pub const DEFAULT_CATALOG_LIMIT: usize = 10_000;

/// Genre label for tracks the catalog knows nothing about
pub const UNKNOWN_GENRE: &str = "unknown";

/// One catalog entry. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub track_id: String,
    pub name: String,
    pub artist_name: String,
    pub album_name: String,
    pub popularity: i64,
    pub genre: Option<String>,
}

/// Raw CSV row; every column is optional so that sparse exports still load.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(default)]
    track_id: Option<String>,
    #[serde(default)]
    track_name: Option<String>,
    #[serde(default)]
    artists: Option<String>,
    #[serde(default)]
    album_name: Option<String>,
    #[serde(default)]
    popularity: Option<String>,
    #[serde(default)]
    track_genre: Option<String>,
}

impl CatalogRow {
    fn into_track(self) -> Option<CatalogTrack> {
        let track_id = non_empty(self.track_id)?;
        Some(CatalogTrack {
            track_id,
            name: self.track_name.unwrap_or_default(),
            artist_name: self.artists.unwrap_or_default(),
            album_name: self.album_name.unwrap_or_default(),
            popularity: parse_popularity(self.popularity.as_deref()),
            genre: non_empty(self.track_genre),
        })
    }
}

/// Lenient popularity parsing: anything that is not an integer becomes 0.
#[must_use]
pub fn parse_popularity(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// `track_id → genre` lookup built from the catalog file.
#[derive(Debug, Clone, Default)]
pub struct GenreMap {
    genres: HashMap<String, String>,
}

impl GenreMap {
    /// A map with no entries; every lookup yields [`UNKNOWN_GENRE`].
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Genre of `track_id`, or [`UNKNOWN_GENRE`] when the catalog has none.
    #[must_use]
    pub fn genre_of(&self, track_id: &str) -> &str {
        self.genres
            .get(track_id)
            .map_or(UNKNOWN_GENRE, String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genres.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    /// Load the genre map for consumers that only need genres.
    ///
    /// A missing catalog is not fatal here: the map comes back empty and every
    /// track aggregates under [`UNKNOWN_GENRE`]. Other read failures still surface.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        match Catalog::load(path, None) {
            Ok(catalog) => Ok(catalog.into_genre_map()),
            Err(EngineError::CatalogUnavailable { path }) => {
                warn!(
                    "Catalog {} not found, all genres will be reported as `{UNKNOWN_GENRE}`",
                    path.display()
                );
                Ok(Self::empty())
            }
            Err(err) => Err(err),
        }
    }
}

/// In-memory catalog snapshot, sorted by descending popularity.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tracks: Vec<CatalogTrack>,
    genres: GenreMap,
}

impl Catalog {
    /// Load and sort the catalog at `path`, keeping the top `limit` tracks.
    ///
    /// The file is a CSV with a header row. The columns read are `track_id`,
    /// `track_name`, `artists`, `album_name`, `popularity` and `track_genre`;
    /// any others are ignored. Rows that do not parse are logged and skipped.
    /// An unparseable popularity counts as 0.
    ///
    /// # Returns
    ///
    /// Tracks in popularity order (descending, file order among equals), one per
    /// track id with the first row winning, truncated to `limit`. The genre map
    /// covers every track in the file, not just the kept ones.
    ///
    /// # Errors
    ///
    /// - [`EngineError::CatalogUnavailable`] if the file does not exist
    /// - [`EngineError::CatalogRead`] if the file cannot be read as CSV
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use colisten::catalog::Catalog;
    /// use std::path::Path;
    ///
    /// let catalog = Catalog::load(Path::new("dataset.csv"), Some(10_000))?;
    /// println!("{} tracks, most popular first", catalog.len());
    /// # Ok::<(), colisten::EngineError>(())
    /// ```
    pub fn load(path: &Path, limit: Option<usize>) -> Result<Self> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => EngineError::CatalogUnavailable {
                path: path.to_path_buf(),
            },
            _ => EngineError::Io(err),
        })?;

        let catalog = Self::from_reader(file, limit).map_err(|source| EngineError::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Loaded {} catalog tracks ({} genre entries) from {}",
            catalog.len(),
            catalog.genres.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse a catalog from any CSV source.
    ///
    /// Rows that fail to deserialize are skipped with a warning; I/O failures abort.
    pub fn from_reader<R: Read>(reader: R, limit: Option<usize>) -> std::result::Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (line, result) in rdr.deserialize::<CatalogRow>().enumerate() {
            match result {
                Ok(row) => rows.push(row),
                Err(err) if err.is_io_error() => return Err(err),
                Err(err) => {
                    skipped += 1;
                    debug!("Skipping malformed catalog row {}: {err}", line + 1);
                }
            }
        }
        if skipped > 0 {
            warn!("Skipped {skipped} malformed catalog rows");
        }

        Ok(Self::from_tracks(rows.into_iter().filter_map(CatalogRow::into_track), limit))
    }

    /// Build a catalog from already-parsed tracks.
    ///
    /// Duplicates are dropped (first seen wins), the genre map is built from every
    /// unique track, then tracks are stably sorted by popularity and truncated.
    pub fn from_tracks<I>(tracks: I, limit: Option<usize>) -> Self
    where
        I: IntoIterator<Item = CatalogTrack>,
    {
        let mut seen = HashSet::new();
        let mut unique: Vec<CatalogTrack> = tracks
            .into_iter()
            .filter(|track| !track.track_id.is_empty() && seen.insert(track.track_id.clone()))
            .collect();

        let genres = GenreMap {
            genres: unique
                .iter()
                .filter_map(|t| t.genre.clone().map(|g| (t.track_id.clone(), g)))
                .collect(),
        };

        unique.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        if let Some(limit) = limit {
            unique.truncate(limit);
        }

        Self {
            tracks: unique,
            genres,
        }
    }

    #[must_use]
    pub fn tracks(&self) -> &[CatalogTrack] {
        &self.tracks
    }

    #[must_use]
    pub fn genre_map(&self) -> &GenreMap {
        &self.genres
    }

    #[must_use]
    pub fn into_genre_map(self) -> GenreMap {
        self.genres
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
