use serde::Serialize;

use crate::roster::Position;
use crate::status::{is_off_board, set_my_team};
use crate::store::StateStore;
use super::{Sheet, Workbook};

/// Sheets kept in the spreadsheet for history only
const ARCHIVED_SHEETS: [&str; 1] = ["8.5 (archived)"];

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Where the interesting columns live in a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetLayout {
    pub header_row: usize,
    pub player_col: Option<usize>,
    pub position_col: Option<usize>,
    /// Old boards kept a hand-maintained "drafted" column
    pub drafted_col: Option<usize>,
}

impl SheetLayout {
    /// Finds the header row (first row with a "player ... name" cell, else row 0)
    /// and the player, position and drafted columns within it.
    pub fn detect(sheet: &Sheet) -> Self {
        let is_player_header = |cell: &String| {
            let cell = normalize(cell);
            cell.contains("player") && cell.contains("name")
        };

        let header_row = sheet
            .rows
            .iter()
            .position(|row| row.iter().any(is_player_header))
            .unwrap_or(0);

        let headers: &[String] = sheet.rows.get(header_row).map(Vec::as_slice).unwrap_or(&[]);
        let player_col = headers.iter().position(is_player_header);
        let position_col = headers.iter().position(|h| {
            let h = normalize(h);
            h == "pos" || h == "position"
        });
        let drafted_col = headers.iter().position(|h| {
            let h = normalize(h);
            h == "drafted" || h == "my team"
        });

        SheetLayout {
            header_row,
            player_col,
            position_col,
            drafted_col,
        }
    }
}

/// A data row with its player identified
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardRow {
    pub player: String,
    pub position: String,
    pub cells: Vec<String>,
}

fn cell(row: &[String], col: Option<usize>) -> String {
    col.and_then(|c| row.get(c)).cloned().unwrap_or_default()
}

/// Data rows after the header, skipping rows without a player name
pub fn board_rows(sheet: &Sheet) -> Vec<BoardRow> {
    let layout = SheetLayout::detect(sheet);
    sheet
        .rows
        .iter()
        .skip(layout.header_row + 1)
        .filter_map(|row| {
            let player = cell(row, layout.player_col).trim().to_string();
            if player.is_empty() {
                return None;
            }
            Some(BoardRow {
                player,
                position: cell(row, layout.position_col).trim().to_string(),
                cells: row.clone(),
            })
        })
        .collect()
}

/// Sheets shown on the board, archived ones excluded
pub fn visible_sheets(workbook: &Workbook) -> Vec<&Sheet> {
    workbook
        .sheets
        .iter()
        .filter(|s| !ARCHIVED_SHEETS.contains(&normalize(&s.name).as_str()))
        .collect()
}

/// Position of `player` from the first visible sheet that lists one
pub fn find_position(workbook: &Workbook, player: &str) -> Option<Position> {
    visible_sheets(workbook)
        .into_iter()
        .flat_map(board_rows)
        .find(|row| row.player == player && !row.position.is_empty())
        .map(|row| Position::parse(&row.position))
}

/// Rows whose player is neither on my team nor taken
pub fn available_rows<S: StateStore + ?Sized>(store: &S, sheet: &Sheet) -> Vec<BoardRow> {
    board_rows(sheet)
        .into_iter()
        .filter(|row| !is_off_board(store, &row.player))
        .collect()
}

/// Parses a hand-entered "drafted" cell
fn is_truthy(value: &str) -> bool {
    matches!(
        normalize(value).as_str(),
        "true" | "yes" | "y" | "1" | "x" | "✓" | "drafted"
    )
}

/// Carries marks from a legacy drafted column into the my-team flag.
/// Players already on the team or taken are left alone. Returns the players newly flagged.
pub fn seed_drafted_column<S: StateStore + ?Sized>(store: &mut S, workbook: &Workbook) -> Vec<String> {
    let mut seeded = Vec::new();
    for sheet in visible_sheets(workbook) {
        let layout = SheetLayout::detect(sheet);
        let Some(drafted_col) = layout.drafted_col else {
            continue;
        };
        for row in board_rows(sheet) {
            if is_truthy(&cell(&row.cells, Some(drafted_col))) && !is_off_board(store, &row.player) {
                set_my_team(store, &row.player, true);
                seeded.push(row.player);
            }
        }
    }
    if !seeded.is_empty() {
        tracing::info!(count = seeded.len(), "seeded my team from drafted column");
    }
    seeded
}
