//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs,
    config::ConfigCommands,
    init::InitArgs,
    interactive::InteractiveArgs,
    list::ListArgs,
    lookup::LookupArgs,
    map::MapArgs,
    refresh::RefreshArgs,
    register::RegisterArgs,
    remove::RemoveArgs,
    search::SearchArgs,
    show::ShowArgs,
    status::StatusArgs,
};
use crate::core::{Config, Floor};

#[derive(Parser)]
#[command(name = "camara")]
#[command(author, version, about = "Rack occupancy tracking for the câmara")]
#[command(long_about = "Track which rack positions of a two-floor cold storage room hold pallets, register lots against the product spreadsheet and keep product data up to date.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Database file (default: camara.db)
    #[arg(long, global = true, env = "CAMARA_DB")]
    pub db: Option<PathBuf>,

    /// Product catalog, .xlsx workbook or delimited text (default: produtos.xlsx)
    #[arg(long, global = true, env = "CAMARA_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Field delimiter for delimited-text catalogs (default: ',')
    #[arg(long, global = true, env = "CAMARA_DELIMITER")]
    pub delimiter: Option<String>,

    /// Floor to work on: 1 (lower) or 2 (upper, default)
    #[arg(long, short = 'F', global = true, env = "CAMARA_FLOOR")]
    pub floor: Option<Floor>,
}

impl GlobalOpts {
    /// Layered configuration with environment and command-line overrides
    /// (read by clap, flags winning over `CAMARA_*` variables) applied last
    pub fn config(&self) -> Config {
        let mut config = Config::load();
        config.merge(Config {
            database: self.db.clone(),
            catalog: self.catalog.clone(),
            delimiter: self.delimiter.clone(),
            floor: self.floor.map(Floor::number),
        });
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database file and schema
    Init(InitArgs),

    /// Draw the occupancy map of a floor
    Map(MapArgs),

    /// Register a pallet at an empty position
    Register(RegisterArgs),

    /// Show what is stored at a position
    Show(ShowArgs),

    /// Remove the pallet at a position
    Remove(RemoveArgs),

    /// Search occupied positions by lot or product
    Search(SearchArgs),

    /// List every occupied position
    List(ListArgs),

    /// Reload the catalog and update stored product data
    Refresh(RefreshArgs),

    /// Look up a lot in the catalog
    Lookup(LookupArgs),

    /// Show occupancy statistics
    Status(StatusArgs),

    /// Interactive map and menu
    Interactive(InteractiveArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
}
