//! `camara interactive` command - Menu-driven map session
//!
//! Redraws the map of the active floor and offers the operator actions
//! until they quit. Errors from a single action are reported and the
//! loop continues.

use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::register::{print_registration, prompt_lot};
use crate::cli::commands::remove::confirm_removal;
use crate::cli::helpers::open_session;
use crate::cli::render::{render_map, render_record, render_slots};
use crate::cli::GlobalOpts;
use crate::core::position::{Floor, Position, PositionError};
use crate::core::session::{Session, SessionError};
use crate::core::store::StoreError;

#[derive(clap::Args, Debug)]
pub struct InteractiveArgs {
    /// Do not clear the screen between actions
    #[arg(long)]
    pub no_clear: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ToggleFloor,
    Register,
    Details,
    Remove,
    Search,
    Refresh,
    Quit,
}

impl Action {
    const ALL: [Action; 7] = [
        Action::Register,
        Action::Details,
        Action::Remove,
        Action::Search,
        Action::ToggleFloor,
        Action::Refresh,
        Action::Quit,
    ];

    fn label(self, session: &Session) -> String {
        match self {
            Action::ToggleFloor => format!(
                "Switch to {}",
                session.active_floor().toggle().display_name().to_lowercase()
            ),
            Action::Register => "Register pallet".to_string(),
            Action::Details => "Show position".to_string(),
            Action::Remove => "Remove pallet".to_string(),
            Action::Search => "Search lot or product".to_string(),
            Action::Refresh => "Refresh from catalog".to_string(),
            Action::Quit => "Quit".to_string(),
        }
    }
}

pub fn run(args: InteractiveArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = open_session(global)?;
    let theme = ColorfulTheme::default();
    let term = Term::stdout();

    loop {
        if !args.no_clear {
            term.clear_screen().into_diagnostic()?;
        }
        let map = session.occupancy_map(session.active_floor())?;
        print!("{}", render_map(&map));
        println!();

        let labels: Vec<String> = Action::ALL.iter().map(|a| a.label(&session)).collect();
        let Some(choice) = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(&labels)
            .default(0)
            .interact_opt()
            .into_diagnostic()?
        else {
            break;
        };

        let outcome = match Action::ALL[choice] {
            Action::ToggleFloor => {
                session.toggle_floor();
                continue;
            }
            Action::Register => register(&session, &theme),
            Action::Details => details(&session, &theme),
            Action::Remove => remove(&session, &theme),
            Action::Search => search(&session, &theme),
            Action::Refresh => refresh(&mut session),
            Action::Quit => break,
        };

        if let Err(err) = outcome {
            println!("{} {}", style("✗").red(), err);
        }
        pause(&term)?;
    }

    Ok(())
}

fn register(session: &Session, theme: &ColorfulTheme) -> Result<()> {
    let Some(position) = prompt_position(session, theme)? else {
        return Ok(());
    };
    if let Some(existing) = session.details(&position)? {
        println!(
            "{} Position {} is occupied by lot {}",
            style("!").yellow(),
            style(&existing.position).cyan(),
            style(&existing.lot).yellow()
        );
        return Ok(());
    }
    let Some(lot) = prompt_lot(&position)? else {
        return Ok(());
    };

    match session.register_entry(&position, &lot) {
        Ok(registration) => print_registration(&registration),
        Err(SessionError::Store(StoreError::LotAllocated { lot, position })) => println!(
            "{} Lot {} is already at {}",
            style("!").yellow(),
            style(lot).yellow(),
            style(position).cyan()
        ),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn details(session: &Session, theme: &ColorfulTheme) -> Result<()> {
    let Some(position) = prompt_position(session, theme)? else {
        return Ok(());
    };
    match session.details(&position)? {
        Some(record) => print!("{}", render_record(&record)),
        None => println!("{} Position {} is empty", style("·").dim(), style(position).cyan()),
    }
    Ok(())
}

fn remove(session: &Session, theme: &ColorfulTheme) -> Result<()> {
    let Some(position) = prompt_position(session, theme)? else {
        return Ok(());
    };
    let Some(record) = session.details(&position)? else {
        println!("{} Position {} is empty", style("·").dim(), style(position).cyan());
        return Ok(());
    };
    print!("{}", render_record(&record));
    if confirm_removal(&record.lot, &record.position)? {
        session.remove(&position)?;
        println!("{} Removed lot {}", style("✓").green(), style(&record.lot).yellow());
    }
    Ok(())
}

fn search(session: &Session, theme: &ColorfulTheme) -> Result<()> {
    let term: String = Input::with_theme(theme)
        .with_prompt("Lot or product")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;
    let results = session.search(&term)?;
    if results.is_empty() {
        println!("No results found");
    } else {
        println!("{}", render_slots(&results));
    }
    Ok(())
}

fn refresh(session: &mut Session) -> Result<()> {
    let stats = session.refresh()?;
    println!(
        "{} Updated {} record(s)",
        style("✓").green(),
        style(stats.updated).cyan()
    );
    Ok(())
}

/// Ask for a position; a bare `col:row` is taken on the active floor
fn prompt_position(session: &Session, theme: &ColorfulTheme) -> Result<Option<Position>> {
    let floor = session.active_floor();
    let raw: String = Input::with_theme(theme)
        .with_prompt(format!("Position (R524_1 or column:row on {})", floor.display_name()))
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            if input.trim().is_empty() {
                return Ok(());
            }
            parse_position(input, floor)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .into_diagnostic()?;

    if raw.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_position(&raw, floor)?))
}

fn parse_position(input: &str, floor: Floor) -> std::result::Result<Position, PositionError> {
    let input = input.trim();
    if input.matches(':').count() == 1 {
        format!("{}:{}", floor.number(), input).parse()
    } else {
        input.parse()
    }
}

fn pause(term: &Term) -> Result<()> {
    println!();
    println!("{}", style("Press any key to continue").dim());
    term.read_key().into_diagnostic()?;
    Ok(())
}
