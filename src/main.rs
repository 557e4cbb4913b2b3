//! # Colisten
//!
//! Seeds synthetic listening data from a track catalog and ranks tracks by how
//! often they are listened to together.
//!
//! ## Usage
//!
//! ```bash
//! # Generate simulated listeners from the catalog
//! colisten seed --catalog dataset.csv
//!
//! # Store a real user's top tracks
//! colisten ingest alice.json
//!
//! # Global ranking
//! colisten rank --limit 5 --pool-size 500
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colisten::catalog::{Catalog, GenreMap};
use colisten::cli::{self, Command, ConfigAction};
use colisten::config::{self, RuntimeConfig};
use colisten::ingest::{self, ListeningHistory};
use colisten::metadata::{MetadataResolver, ResolveMetadata};
use colisten::ranker::{Ranker, RankingParams};
use colisten::store::{InteractionStore, SqliteInteractionStore};
use colisten::{completion, genres, kpi, report, synthesis};
use log::{debug, info};
use std::path::PathBuf;

/// Effective configuration: config file, then command-line overrides.
fn resolve_config(args: &cli::Args) -> Result<(RuntimeConfig, PathBuf)> {
    let config_path = match &args.config_file {
        Some(path) => path.clone(),
        None => config::get_config_path()?,
    };
    let mut config = RuntimeConfig::load_from(&config_path)?;

    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(catalog) = &args.catalog {
        config.catalog_path = catalog.clone();
    }
    debug!("Effective configuration: {config:?}");
    Ok((config, config_path))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize output")?);
    Ok(())
}

/// Main entry point for the Colisten application.
///
/// Logging is controlled via `RUST_LOG`:
/// - `RUST_LOG=debug colisten rank` - Enable debug logging
/// - `RUST_LOG=colisten::store=trace colisten seed` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let (config, config_path) = resolve_config(&args)?;

    match args.command {
        Command::Seed { users, songs_per_user, top } => {
            let mut params: synthesis::SynthesisParams = config.simulation.into();
            params.num_users = users.unwrap_or(params.num_users);
            params.songs_per_user = songs_per_user.unwrap_or(params.songs_per_user);
            let limit = top.unwrap_or(config.catalog_limit);

            info!("Loading top {limit} tracks from {}", config.catalog_path.display());
            let catalog = Catalog::load(&config.catalog_path, Some(limit))
                .context("Synthesis needs the catalog file")?;
            let records = synthesis::generate_with(catalog.tracks(), params)?;

            let store = SqliteInteractionStore::open(&config.db_path)?;
            let written = store.replace_simulated(&records)?;
            println!(
                "Seeded {written} simulated interactions for {} users from {} catalog tracks",
                params.num_users,
                catalog.len()
            );
        }
        Command::Ingest { payload } => {
            let history = ListeningHistory::from_file(&payload)
                .with_context(|| format!("Failed to read listening history {}", payload.display()))?;
            let store = SqliteInteractionStore::open(&config.db_path)?;
            let written = ingest::ingest(&store, &history)?;
            println!(
                "Saved {written} tracks for {}",
                history.user_id().unwrap_or("an unidentified user")
            );
        }
        Command::Rank { limit, pool_size, json } => {
            let params = RankingParams {
                limit: limit.unwrap_or(config.ranking.limit),
                pool_size: pool_size.unwrap_or(config.ranking.pool_size),
            };
            let store = SqliteInteractionStore::new(&config.db_path);
            let ranked = Ranker::new(&store).rank(params)?;
            if json {
                print_json(&ranked)?;
            } else {
                print!("{}", report::render_ranking(&ranked));
            }
        }
        Command::Resolve { track_id, json } => {
            let store = SqliteInteractionStore::new(&config.db_path);
            let display = MetadataResolver::new(&store).resolve(&track_id)?;
            if json {
                print_json(&display)?;
            } else {
                print!("{}", report::render_display(&track_id, &display));
            }
        }
        Command::Genres { json } => {
            let genre_map = GenreMap::load_or_empty(&config.catalog_path)?;
            let store = SqliteInteractionStore::new(&config.db_path);
            let counts = genres::aggregate_genres(&store, &genre_map)?;
            if json {
                print_json(&counts)?;
            } else {
                print!("{}", report::render_genres(&counts));
            }
        }
        Command::Kpi { json } => {
            let store = SqliteInteractionStore::new(&config.db_path);
            let kpis = kpi::collect(&store)?;
            if json {
                print_json(&kpis)?;
            } else {
                print!("{}", report::render_kpis(&kpis));
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Show => print_json(&config)?,
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    return Err(anyhow::anyhow!(
                        "Config file {} already exists. Use --force to overwrite it.",
                        config_path.display()
                    ));
                }
                config.save_to(&config_path)?;
                println!("Wrote {}", config_path.display());
            }
        },
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
    }

    Ok(())
}
