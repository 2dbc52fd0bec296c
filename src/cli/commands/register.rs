//! `camara register` command - Register a pallet at an empty position

use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, or_dash};
use crate::cli::GlobalOpts;
use crate::core::position::Position;
use crate::core::session::{Registration, Session};
use crate::core::store::StoreError;

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    /// Position id (R524_1) or floor:column:row (2:5:1)
    pub position: Position,

    /// Lot number (prompted for when omitted)
    pub lot: Option<String>,
}

pub fn run(args: RegisterArgs, global: &GlobalOpts) -> Result<()> {
    let session = open_session(global)?;

    let lot = match args.lot {
        Some(lot) => lot,
        None => {
            ensure_empty(&session, &args.position)?;
            match prompt_lot(&args.position)? {
                Some(lot) => lot,
                None => {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
        }
    };

    let registration = session.register_entry(&args.position, &lot)?;
    if !global.quiet {
        print_registration(&registration);
    }
    Ok(())
}

/// Fail before prompting when the position is already taken
pub(crate) fn ensure_empty(session: &Session, position: &Position) -> Result<()> {
    if let Some(existing) = session.details(position)? {
        return Err(StoreError::PositionOccupied {
            position: existing.position,
            lot: existing.lot,
        }
        .into());
    }
    Ok(())
}

/// Ask for a lot number; `None` when the operator leaves it blank
pub(crate) fn prompt_lot(position: &Position) -> Result<Option<String>> {
    let lot: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Lot number for {}", position))
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;
    let lot = lot.trim().to_string();
    Ok(if lot.is_empty() { None } else { Some(lot) })
}

pub(crate) fn print_registration(registration: &Registration) {
    let record = &registration.record;
    println!(
        "{} Registered lot {} at {}",
        style("✓").green(),
        style(&record.lot).yellow(),
        style(&record.position).cyan()
    );
    if registration.catalog_match {
        println!("   {}", or_dash(&record.product));
    } else {
        println!(
            "{} Lot not found in catalog; product, stock and notes left empty",
            style("!").yellow()
        );
    }
}
