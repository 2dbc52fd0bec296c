//! `camara search` command - Search occupied positions
//!
//! Case-insensitive substring match on lot number or product name.

use console::style;
use miette::Result;

use crate::cli::helpers::open_session;
use crate::cli::render::{delimited_slots, render_slots};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search term (matched against lot and product)
    pub query: String,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let mut results = session.search(&args.query)?;
    if let Some(limit) = args.limit {
        results.truncate(limit);
    }

    if args.count {
        println!("{}", results.len());
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&results).map_err(|e| miette::miette!("{}", e))?
        ),
        OutputFormat::Tsv => print!("{}", delimited_slots(&results, false)),
        OutputFormat::Csv => print!("{}", delimited_slots(&results, true)),
        OutputFormat::Auto => {
            if results.is_empty() {
                println!("No results found for '{}'", args.query);
                return Ok(());
            }
            println!("{}", render_slots(&results));
            if !global.quiet {
                println!();
                println!(
                    "{} result(s) for '{}'",
                    style(results.len()).cyan(),
                    style(&args.query).yellow()
                );
            }
        }
    }

    Ok(())
}
