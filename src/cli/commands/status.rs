//! `camara status` command - Occupancy statistics

use console::style;
use miette::Result;

use crate::cli::helpers::open_session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::position::Floor;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {}

pub fn run(_args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let stats = session.store().statistics()?;
    // An unreadable catalog is reported, not raised
    let catalog = session.catalog().ok();
    let catalog_lots = catalog.map(|c| c.len());

    match global.format {
        OutputFormat::Json => {
            let status = serde_json::json!({
                "database": session.store().path(),
                "store": stats,
                "capacity": {
                    "upper_floor": Floor::Upper.capacity(),
                    "lower_floor": Floor::Lower.capacity(),
                },
                "catalog": {
                    "path": session.catalog_path(),
                    "readable": catalog.is_some(),
                    "lots": catalog_lots,
                    "duplicates": catalog.map(|c| c.duplicates()),
                },
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&status).map_err(|e| miette::miette!("{}", e))?
            );
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if global.format == OutputFormat::Csv { "," } else { "\t" };
            println!("total{sep}{}", stats.total_records);
            println!("upper_floor{sep}{}", stats.upper_floor);
            println!("lower_floor{sep}{}", stats.lower_floor);
            let lots = catalog_lots.map(|n| n.to_string()).unwrap_or_default();
            println!("catalog_lots{sep}{}", lots);
        }
        OutputFormat::Auto => {
            println!("{}", style("Câmara Status").bold().underlined());
            println!();
            print_floor(Floor::Upper, stats.upper_floor);
            print_floor(Floor::Lower, stats.lower_floor);
            println!(
                "  {:<14} {}",
                "Total",
                style(stats.total_records).cyan().bold()
            );
            if stats.unrecognized > 0 {
                println!(
                    "  {} {} record(s) with unrecognized positions",
                    style("!").yellow(),
                    stats.unrecognized
                );
            }
            println!();
            println!(
                "  {:<14} {} ({:.1} KB)",
                "Database",
                session.store().path().display(),
                stats.db_size_bytes as f64 / 1024.0
            );
            match catalog_lots {
                None => println!(
                    "  {:<14} {} {}",
                    "Catalog",
                    session.catalog_path().display(),
                    style("(unreadable)").red()
                ),
                Some(0) => println!(
                    "  {:<14} {} {}",
                    "Catalog",
                    session.catalog_path().display(),
                    style("(empty or missing)").dim()
                ),
                Some(lots) => println!(
                    "  {:<14} {} ({} lots)",
                    "Catalog",
                    session.catalog_path().display(),
                    lots
                ),
            }
        }
    }

    Ok(())
}

fn print_floor(floor: Floor, occupied: usize) {
    let capacity = floor.capacity();
    let pct = if capacity == 0 {
        0.0
    } else {
        occupied as f64 * 100.0 / capacity as f64
    };
    println!(
        "  {:<14} {:>3}/{:<3} {}",
        floor.display_name(),
        occupied,
        capacity,
        style(format!("{:.0}%", pct)).dim()
    );
}
