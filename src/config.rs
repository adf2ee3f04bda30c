use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "draft-board")]
#[command(about = "Fantasy football draft board: track your picks, taken players and roster slots", long_about = None)]
pub struct Cli {
    /// Rankings workbook: an .xlsx file, a CSV file or a directory of CSV sheets
    #[arg(long, global = true, env = "WORKBOOK_PATH", default_value = "rankings.csv")]
    pub workbook: PathBuf,

    /// JSON file holding draft state for command-line use
    #[arg(long, global = true, env = "STATE_PATH", default_value = "draft-state.json")]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the board over HTTP; each browser's cookie names its draft on the server
    Serve {
        #[arg(long, env = "PORT", default_value_t = 3000)]
        port: u16,

        /// Directory holding one JSON file per browser draft
        #[arg(long, env = "DRAFTS_DIR", default_value = "drafts")]
        drafts_dir: PathBuf,

        /// Cookie signing key, at least 64 bytes. A random key is used when unset,
        /// which detaches every browser from its draft on restart.
        #[arg(long, env = "SESSION_KEY", hide_env_values = true)]
        session_key: Option<String>,
    },

    /// List players still on the board
    Board {
        /// Sheet to list; defaults to the first visible sheet
        #[arg(long)]
        sheet: Option<String>,

        #[arg(long, default_value_t = 25)]
        limit: usize,
    },

    /// Show the roster grid and the my-team / taken lists
    Roster,

    /// Draft a player onto my team
    Pick {
        player: String,

        /// Position (QB, RB, WR, TE, K, DST); looked up in the workbook when omitted
        #[arg(long)]
        position: Option<String>,
    },

    /// Take a player off my team
    Drop { player: String },

    /// Mark a player as drafted by another team
    Take { player: String },

    /// Clear the taken mark on a player
    Untake { player: String },

    /// Clear every mark on a player
    Release { player: String },

    /// Add one roster slot of the given type
    AddSlot { slot_type: String },

    /// Remove one roster slot of the given type
    RemoveSlot { slot_type: String },

    /// Clear picks and assignments and restore the default roster
    Reset,

    /// Clear picks and assignments, keeping the roster
    Clear,
}
