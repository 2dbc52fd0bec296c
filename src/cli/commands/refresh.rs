//! `camara refresh` command - Reload the catalog and update stored records

use console::style;
use miette::Result;

use crate::cli::helpers::open_session;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct RefreshArgs {}

pub fn run(_args: RefreshArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let stats = session.refresh()?;

    match global.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&stats).map_err(|e| miette::miette!("{}", e))?
        ),
        OutputFormat::Tsv | OutputFormat::Csv => println!("{}", stats.updated),
        OutputFormat::Auto => {
            println!(
                "{} Updated {} record(s) from {}",
                style("✓").green(),
                style(stats.updated).cyan(),
                style(session.catalog_path().display()).dim()
            );
            if stats.unmatched > 0 && !global.quiet {
                println!(
                    "{} {} record(s) have lots not in the catalog",
                    style("!").yellow(),
                    stats.unmatched
                );
            }
        }
    }

    Ok(())
}
