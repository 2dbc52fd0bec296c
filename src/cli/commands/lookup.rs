//! `camara lookup` command - Look up a lot in the catalog

use console::style;
use miette::Result;

use crate::cli::helpers::{open_session, or_dash};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct LookupArgs {
    /// Lot number
    pub lot: String,
}

pub fn run(args: LookupArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let entry = session.catalog()?.get(&args.lot);
    let stored = session.store().find_by_lot(args.lot.trim())?;

    if global.format == OutputFormat::Json {
        let value = serde_json::json!({
            "catalog": entry,
            "position": stored.as_ref().map(|r| r.position.as_str()),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).map_err(|e| miette::miette!("{}", e))?
        );
        return Ok(());
    }

    match entry {
        Some(entry) => {
            println!("{}  {}", style("Lot").bold(), style(&entry.lot).yellow());
            println!("  Product:  {}", or_dash(&entry.product));
            println!("  Stock:    {}", or_dash(&entry.stock));
            println!("  Notes:    {}", or_dash(&entry.notes));
        }
        None => println!(
            "{} Lot {} is not in the catalog",
            style("!").yellow(),
            style(args.lot.trim()).yellow()
        ),
    }

    if let Some(record) = stored {
        println!("  Stored at {}", style(&record.position).cyan());
    }

    Ok(())
}
