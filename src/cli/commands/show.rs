//! `camara show` command - Show what is stored at a position

use console::style;
use miette::Result;

use crate::cli::commands::remove::confirm_removal;
use crate::cli::helpers::open_session;
use crate::cli::render::{delimited_records, render_record};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::position::Position;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Position id (R524_1) or floor:column:row (2:5:1)
    pub position: Position,

    /// Offer to remove the pallet after showing it
    #[arg(long)]
    pub remove: bool,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;

    let Some(record) = session.details(&args.position)? else {
        match global.format {
            OutputFormat::Json => println!("null"),
            _ => println!(
                "{} Position {} ({}) is empty",
                style("·").dim(),
                style(args.position).cyan(),
                args.position.label()
            ),
        }
        return Ok(());
    };

    match global.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&record).map_err(|e| miette::miette!("{}", e))?
        ),
        OutputFormat::Tsv | OutputFormat::Csv => print!(
            "{}",
            delimited_records(
                std::slice::from_ref(&record),
                global.format == OutputFormat::Csv
            )
        ),
        OutputFormat::Auto => print!("{}", render_record(&record)),
    }

    if args.remove && confirm_removal(&record.lot, &record.position)? {
        session.remove(&args.position)?;
        println!(
            "{} Removed lot {} from {}",
            style("✓").green(),
            style(&record.lot).yellow(),
            style(&record.position).cyan()
        );
    }

    Ok(())
}
