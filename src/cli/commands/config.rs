//! `camara config` command - Configuration management
//!
//! Shows the effective configuration and where it comes from.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::LOCAL_CONFIG_FILE;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("database", "SQLite database file (CAMARA_DB)"),
    ("catalog", "Product catalog, .xlsx or delimited text (CAMARA_CATALOG)"),
    ("delimiter", "Catalog field delimiter (CAMARA_DELIMITER)"),
    ("floor", "Floor shown by default, 1 or 2 (CAMARA_FLOOR)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let delimiter = config.delimiter()?;
    let floor = config.floor()?;

    let delimiter_text = match delimiter {
        b'\t' => "tab".to_string(),
        b => (b as char).to_string(),
    };
    let values = [
        ("database", config.database_path().display().to_string()),
        ("catalog", config.catalog_path().display().to_string()),
        ("delimiter", delimiter_text),
        ("floor", floor.number().to_string()),
    ];

    if let Some(key) = &args.key {
        let value = values
            .iter()
            .find(|(k, _)| k == key)
            .ok_or_else(|| miette::miette!("Unknown configuration key '{}'", key))?;
        println!("{}", value.1);
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = values
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&map).into_diagnostic()?
            );
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if global.format == OutputFormat::Csv { "," } else { "\t" };
            for (key, value) in &values {
                println!("{key}{sep}{value}");
            }
        }
        OutputFormat::Auto => {
            println!("{}", style("Effective Configuration").bold().underlined());
            println!();
            for (key, value) in &values {
                println!("  {}: {}", style(key).cyan(), style(value).yellow());
            }

            println!();
            println!("{}", style("Config Sources (in priority order):").dim());
            println!("  1. Command-line flags (--db, --catalog, --delimiter, --floor)");
            println!("  2. Environment variables (CAMARA_DB, CAMARA_CATALOG, ...)");
            println!("  3. Local config (./{})", LOCAL_CONFIG_FILE);
            println!("  4. Global config (~/.config/camara/config.yaml)");
        }
    }

    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match crate::core::Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!(
            "  {} {}",
            style("Global:").cyan(),
            style("(no home directory)").dim()
        ),
    }
    print_path("Local:", Path::new(LOCAL_CONFIG_FILE));

    Ok(())
}

fn print_path(label: &str, path: &Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    if path.exists() {
        println!("         {}", style("(exists)").green());
    } else {
        println!("         {}", style("(not created)").dim());
    }
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<12} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style(format!("Set them in ./{} or the global config file.", LOCAL_CONFIG_FILE)).dim()
    );

    Ok(())
}
