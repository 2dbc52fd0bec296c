//! `camara map` command - Draw the occupancy map

use miette::Result;

use crate::cli::helpers::open_session;
use crate::cli::render::{delimited_map, render_map};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(clap::Args, Debug)]
pub struct MapArgs {}

pub fn run(_args: MapArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;
    let map = session.occupancy_map(session.active_floor())?;

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&map).map_err(|e| miette::miette!("{}", e))?
            );
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            print!("{}", delimited_map(&map, global.format == OutputFormat::Csv))
        }
        OutputFormat::Auto => print!("{}", render_map(&map)),
    }

    Ok(())
}
