mod config;
mod display;
mod error;
mod roster;
mod status;
mod store;
mod web;
mod workbook;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::{Cli, Command};
use display::{format_roster, print_available, print_lists};
use roster::{
    add_roster_slot, clear_selections, draft_to_my_team, release_player, remove_roster_slot,
    reset_all, roster_view, set_my_team_state, set_taken_state, Position,
};
use status::{my_team_names, taken_players};
use store::{DraftRegistry, FileStore};
use workbook::{available_rows, find_position, load_workbook, seed_drafted_column, visible_sheets};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Web mode: state lives in each browser's session cookie
    if let Command::Serve { port, drafts_dir, session_key } = &cli.command {
        let workbook = load_workbook(&cli.workbook).map_err(|e| {
            tracing::error!(error = %e, "workbook unavailable, serving without it");
            e.to_string()
        });
        let key = web::session_key(session_key.as_deref());

        println!("Starting web server on port {}...", port);
        println!("Access the board at http://localhost:{}", port);

        let drafts = DraftRegistry::persistent(drafts_dir.clone());
        web::start_server(*port, workbook, drafts, key).await?;
        return Ok(());
    }

    // CLI mode: state lives in a JSON file
    let mut store = FileStore::open(&cli.state);
    tracing::debug!(path = %store.path().display(), "using state file");

    match cli.command {
        Command::Serve { .. } => {}
        Command::Board { sheet, limit } => {
            let workbook = load_workbook(&cli.workbook)?;
            seed_drafted_column(&mut store, &workbook);
            let sheets = visible_sheets(&workbook);
            let chosen = match &sheet {
                Some(name) => sheets.iter().find(|s| s.name.eq_ignore_ascii_case(name)).copied(),
                None => sheets.first().copied(),
            };
            let Some(chosen) = chosen else {
                return Err(format!("no sheet named {:?} in {}", sheet.unwrap_or_default(), workbook.file_name).into());
            };
            print_available(&chosen.name, &available_rows(&store, chosen), limit);
        }
        Command::Roster => {}
        Command::Pick { player, position } => {
            let position = match position {
                Some(pos) => Position::parse(&pos),
                None => {
                    let workbook = load_workbook(&cli.workbook)?;
                    find_position(&workbook, &player).unwrap_or(Position::Other)
                }
            };
            let slot = draft_to_my_team(&mut store, &player, position)?;
            println!("{} drafted into {}", player, slot);
        }
        Command::Drop { player } => set_my_team_state(&mut store, &player, false),
        Command::Take { player } => set_taken_state(&mut store, &player, true),
        Command::Untake { player } => set_taken_state(&mut store, &player, false),
        Command::Release { player } => release_player(&mut store, &player),
        Command::AddSlot { slot_type } => {
            add_roster_slot(&mut store, &slot_type);
        }
        Command::RemoveSlot { slot_type } => {
            for player in remove_roster_slot(&mut store, &slot_type) {
                println!("{} no longer fits the roster and was released", player);
            }
        }
        Command::Reset => reset_all(&mut store),
        Command::Clear => clear_selections(&mut store),
    }

    print!("{}", format_roster(&roster_view(&mut store)));
    print_lists(&my_team_names(&store), &taken_players(&store));

    Ok(())
}
