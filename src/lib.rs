//! Synthetic listening data and co-occurrence track ranking.
//!
//! Core modules:
//! - [`catalog`] - Catalog loading and the genre map
//! - [`synthesis`] - Deterministic synthetic interaction generation
//! - [`store`] - Interaction store (real and simulated partitions)
//! - [`algorithm`] - Co-occurrence similarity scoring
//! - [`ranker`] - Global probability-weighted ranking
//! - [`metadata`] - Track display metadata lookup
//! - [`genres`] - Genre aggregation
//!
//! ### Supporting Modules
//!
//! - [`config`] - Data directory and runtime settings
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`ingest`] - Real-user listening history ingestion
//! - [`kpi`] - User and interaction totals
//! - [`report`] - Terminal rendering
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use colisten::catalog::Catalog;
//! use colisten::ranker::{Ranker, RankingParams};
//! use colisten::store::{InteractionStore, SqliteInteractionStore};
//! use colisten::synthesis;
//! use std::path::Path;
//!
//! let catalog = Catalog::load(Path::new("dataset.csv"), Some(10_000))?;
//! let records = synthesis::generate(catalog.tracks(), 5000, 50)?;
//!
//! let store = SqliteInteractionStore::open("colisten.db")?;
//! store.replace_simulated(&records)?;
//!
//! for entry in Ranker::new(&store).rank(RankingParams::default())? {
//!     println!("{} {:.3}", entry.track_id, entry.probability);
//! }
//! # Ok::<(), colisten::EngineError>(())
//! ```
//!
//! ## Ranking
//!
//! Tracks are indexed by the set of users that listened to them. The most
//! listened `pool_size` tracks are compared pairwise with cosine similarity over
//! those sets, each track accumulating its similarity to every other candidate.
//! The top `limit` tracks by (similarity, listeners) are returned with their
//! share of the total similarity as a probability.
//!
//! ## Error Handling
//!
//! Library operations return [`Result`] with an [`EngineError`]; the binary wraps
//! them in `anyhow` for context.

pub mod algorithm;
pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod genres;
pub mod ingest;
pub mod interaction;
pub mod kpi;
pub mod metadata;
pub mod ranker;
pub mod report;
pub mod store;
pub mod synthesis;

pub use error::{EngineError, Result};
