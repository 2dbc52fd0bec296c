//! `camara remove` command - Remove the pallet at a position

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_session;
use crate::cli::GlobalOpts;
use crate::core::position::Position;

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Position id (R524_1) or floor:column:row (2:5:1)
    pub position: Position,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;

    let Some(record) = session.details(&args.position)? else {
        if !global.quiet {
            println!(
                "{} Position {} is already empty",
                style("·").dim(),
                style(args.position).cyan()
            );
        }
        return Ok(());
    };

    if !args.yes && !confirm_removal(&record.lot, &record.position)? {
        println!("Aborted.");
        return Ok(());
    }

    session.remove(&args.position)?;
    if !global.quiet {
        println!(
            "{} Removed lot {} from {}",
            style("✓").green(),
            style(&record.lot).yellow(),
            style(&record.position).cyan()
        );
    }
    Ok(())
}

/// Ask the operator to confirm removing `lot` from `position`
pub(crate) fn confirm_removal(lot: &str, position: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Remove lot {} from {}?", lot, position))
        .default(false)
        .interact()
        .into_diagnostic()
}
