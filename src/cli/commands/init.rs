//! `camara init` command - Create the database

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::catalog::Catalog;
use crate::core::store::OccupancyStore;

#[derive(clap::Args, Debug)]
pub struct InitArgs {}

pub fn run(_args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let config = global.config();
    let db_path = config.database_path();
    let existed = db_path.exists();

    let store = OccupancyStore::open(&db_path)?;

    if global.quiet {
        return Ok(());
    }

    if existed {
        println!(
            "{} Database already exists at {} ({} pallet(s))",
            style("!").yellow(),
            style(db_path.display()).cyan(),
            store.count()?
        );
    } else {
        println!(
            "{} Initialized database at {}",
            style("✓").green(),
            style(db_path.display()).cyan()
        );
    }

    let catalog_path = config.catalog_path();
    match Catalog::load_with_delimiter(&catalog_path, config.delimiter()?) {
        Ok(catalog) if catalog.is_empty() => println!(
            "{} No catalog at {}; lots will be registered for manual entry",
            style("!").yellow(),
            style(catalog_path.display()).cyan()
        ),
        Ok(catalog) => println!(
            "{} Catalog {} has {} lot(s)",
            style("✓").green(),
            style(catalog_path.display()).cyan(),
            catalog.len()
        ),
        Err(e) => println!(
            "{} Catalog {} could not be read: {}",
            style("!").yellow(),
            style(catalog_path.display()).cyan(),
            e
        ),
    }

    println!();
    println!("Next steps:");
    println!("  {} Draw the occupancy map", style("camara map").yellow());
    println!(
        "  {} Register a pallet",
        style("camara register R524_1 <LOT>").yellow()
    );
    println!("  {} Browse interactively", style("camara interactive").yellow());
    Ok(())
}
