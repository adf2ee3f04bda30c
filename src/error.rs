use std::path::PathBuf;
use thiserror::Error;

use crate::roster::Position;

/// Failures of a draft action that the caller has to react to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("player name must not be empty")]
    EmptyPlayerName,

    /// Every slot the position may fill is already occupied
    #[error("roster full: no open slot for {player} ({position})")]
    RosterFull { player: String, position: Position },
}

/// The rankings workbook could not be produced
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("workbook not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("no sheets found in {}", .0.display())]
    NoSheets(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open workbook archive {}: {source}", .path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("malformed workbook XML in {}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: quick_xml::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
