pub mod loader;
pub mod board;
mod xlsx;

use serde::{Serialize, Deserialize};

pub use loader::load_workbook;
pub use board::{available_rows, find_position, seed_drafted_column, visible_sheets, BoardRow};

/// Rankings spreadsheet as handed to the board: every sheet as raw string rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub file_name: String,
    pub sheets: Vec<Sheet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: &str, rows: Vec<Vec<String>>) -> Self {
        Sheet {
            name: name.to_string(),
            rows,
        }
    }
}
