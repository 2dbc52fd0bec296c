//! `camara list` command - List every occupied position

use console::style;
use miette::Result;

use crate::cli::helpers::open_session;
use crate::cli::render::{delimited_records, render_records};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::position::Position;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only list positions on the floor selected with --floor
    #[arg(long)]
    pub this_floor: bool,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let mut records = session.store().records()?;
    if args.this_floor {
        let floor = session.active_floor();
        records.retain(|r| {
            r.position
                .parse::<Position>()
                .is_ok_and(|p| p.floor() == floor)
        });
    }

    match global.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&records).map_err(|e| miette::miette!("{}", e))?
        ),
        OutputFormat::Tsv => print!("{}", delimited_records(&records, false)),
        OutputFormat::Csv => print!("{}", delimited_records(&records, true)),
        OutputFormat::Auto => {
            if records.is_empty() {
                println!("No pallets registered.");
                return Ok(());
            }
            println!("{}", render_records(&records));
            if !global.quiet {
                println!();
                println!("{} pallet(s)", style(records.len()).cyan());
            }
        }
    }

    Ok(())
}
