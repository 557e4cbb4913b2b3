//! # Command-Line Interface Module
//!
//! Defines the command-line interface for Colisten using Clap derive macros.
//!
//! ## Commands
//!
//! - `seed`: Load the catalog and regenerate the simulated interactions
//! - `ingest`: Store one real user's listening history
//! - `rank`: Print the global co-listening ranking
//! - `resolve`: Show display metadata for a track id
//! - `genres`: Count interactions per genre
//! - `kpi`: Show user and interaction totals
//!
//! ## Examples
//!
//! ```bash
//! colisten seed --catalog dataset.csv --users 5000 --songs-per-user 50
//! colisten rank --limit 10 --json
//! colisten genres
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug)]
#[command(name = "colisten")]
#[command(about = "Colisten: synthetic listening data & co-occurrence track ranking")]
#[command(version)]
pub struct Args {
    /// Interaction store database (defaults to the data directory)
    #[arg(long, global = true, env = "COLISTEN_DB", value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// Catalog CSV file (defaults to the data directory)
    #[arg(long, global = true, env = "COLISTEN_CATALOG", value_hint = clap::ValueHint::FilePath)]
    pub catalog: Option<PathBuf>,

    /// Configuration file (defaults to config.json in the data directory)
    #[arg(long = "config", global = true, env = "COLISTEN_CONFIG", value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Regenerate the simulated interactions from the catalog
    ///
    /// Loads the most popular catalog tracks and deterministically assigns a
    /// fixed number of them to each synthetic user. The previous simulated
    /// data is replaced in a single transaction.
    Seed {
        /// Number of synthetic users
        #[arg(long)]
        users: Option<usize>,

        /// Tracks assigned to each synthetic user
        #[arg(long)]
        songs_per_user: Option<usize>,

        /// Only draw from the N most popular catalog tracks
        #[arg(long)]
        top: Option<usize>,
    },

    /// Store a real user's listening history
    ///
    /// Reads a JSON bundle (profile + top tracks) and replaces every stored
    /// row for that user.
    Ingest {
        /// JSON payload file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        payload: PathBuf,
    },

    /// Rank tracks by co-listening affinity
    Rank {
        /// Number of tracks to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Candidate pool bound for pairwise scoring
        #[arg(short, long)]
        pool_size: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show display metadata for a track id
    Resolve {
        track_id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Count interactions per genre
    Genres {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show distinct users, total interactions and the per-user average
    Kpi {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show or write the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    ///
    /// Usage: colisten completion bash > ~/.local/share/bash-completion/completions/colisten
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,

    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_rank() {
        let args = Args::try_parse_from(["colisten", "rank", "--limit", "7", "--json"]).unwrap();
        match args.command {
            Command::Rank { limit, pool_size, json } => {
                assert_eq!(limit, Some(7));
                assert_eq!(pool_size, None);
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let args = Args::try_parse_from(["colisten", "kpi", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(args.db, Some(PathBuf::from("/tmp/x.db")));
    }
}
