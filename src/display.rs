use std::fmt::Write;

use crate::roster::RosterRow;
use crate::status::TakenPlayer;
use crate::workbook::BoardRow;
use chrono::{Local, TimeZone};

/// Formats a player name with position tag
pub fn format_player_name(position: &str, name: &str) -> String {
    if position.is_empty() {
        name.to_string()
    } else {
        format!("[{}] {}", position.to_uppercase(), name)
    }
}

/// Renders the roster grid, one line per slot type: `QB (1): Josh Allen`
pub fn format_roster(rows: &[RosterRow]) -> String {
    let filled: usize = rows.iter().map(RosterRow::filled).sum();
    let total: usize = rows.iter().map(|r| r.count as usize).sum();

    let mut out = String::new();
    let _ = writeln!(out, "** Roster ({}/{}) **", filled, total);
    for row in rows {
        let chips: Vec<String> = row
            .occupants
            .iter()
            .map(|o| match o {
                Some(name) => name.clone(),
                None => format!("[{}]", row.slot_type),
            })
            .collect();
        let _ = writeln!(out, "{} ({}): {}", row.slot_type, row.count, chips.join(", "));
    }
    out
}

fn format_taken_time(taken_at: i64) -> String {
    match Local.timestamp_millis_opt(taken_at).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

/// Prints the sidebar lists: my team and taken players
pub fn print_lists(my_team: &[String], taken: &[TakenPlayer]) {
    println!("\n=== My Team ({}) ===", my_team.len());
    for name in my_team {
        println!("  - {}", name);
    }

    println!("\n=== Taken ({}) ===", taken.len());
    for player in taken {
        println!("  - {} (at {})", player.name, format_taken_time(player.taken_at));
    }
}

/// Prints available players from one sheet
pub fn print_available(sheet_name: &str, rows: &[BoardRow], limit: usize) {
    println!("\n=== {}: {} available ===", sheet_name, rows.len());
    for row in rows.iter().take(limit) {
        println!("  {}", format_player_name(&row.position, &row.player));
    }
    if rows.len() > limit {
        println!("  ... {} more", rows.len() - limit);
    }
}
