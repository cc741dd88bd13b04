use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use educenterapp::model::EntityId;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "educenter",
    bin_name = "educenter",
    version,
    disable_help_subcommand = true
)]
#[command(about = "Command-line client for the education-center admin backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend root URL (overrides config)
    #[arg(long, global = true, help_heading = "Options")]
    pub base_url: Option<String>,

    /// Config file to load on top of the environment
    #[arg(long, global = true, help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List students
    #[command(alias = "ls")]
    Students {
        /// Use the archive grid (backend filtering, learning-type options)
        #[arg(long)]
        archive: bool,

        /// Column filter, as column=term. Repeatable.
        #[arg(
            short,
            long = "filter",
            value_name = "COLUMN=TERM",
            value_parser = parse_filter,
            requires = "archive"
        )]
        filters: Vec<(String, String)>,

        /// Show the list as it was at this instant (RFC 3339)
        #[arg(long, value_name = "INSTANT", conflicts_with = "archive")]
        as_of: Option<DateTime<Utc>>,

        /// Include hidden columns
        #[arg(short, long)]
        wide: bool,
    },

    /// Show one student
    #[command(alias = "view")]
    Student { id: EntityId },

    /// Download the spreadsheet of active students
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Upload a spreadsheet of students and show the per-row results
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List learning types
    LearningTypes,

    /// List reasons for leaving
    Reasons,

    /// Show the effective configuration
    Config,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Students {
            archive: false,
            filters: Vec::new(),
            as_of: None,
            wide: false,
        }
    }
}

pub fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, term)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), term.to_string()))
        }
        _ => Err(format!("expected COLUMN=TERM, got {raw:?}")),
    }
}
