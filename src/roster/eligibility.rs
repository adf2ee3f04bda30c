use std::fmt;

/// Field position read from the rankings sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DST,
    Other,
}

/// Slot types a position may fill, most specific first
const ELIGIBILITY: [(Position, &[&str]); 7] = [
    (Position::QB, &["QB", "SFLX", "BENCH"]),
    (Position::RB, &["RB", "FLEX", "SFLX", "BENCH"]),
    (Position::WR, &["WR", "FLEX", "SFLX", "BENCH"]),
    (Position::TE, &["TE", "FLEX", "SFLX", "BENCH"]),
    (Position::K, &["K", "BENCH"]),
    (Position::DST, &["DST", "BENCH"]),
    (Position::Other, &["BENCH"]),
];

impl Position {
    /// Parses a sheet cell; anything unrecognised is `Other`
    pub fn parse(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "QB" => Position::QB,
            "RB" => Position::RB,
            "WR" => Position::WR,
            "TE" => Position::TE,
            "K" => Position::K,
            "DST" | "DEF" => Position::DST,
            _ => Position::Other,
        }
    }

    /// Priority-ordered slot types this position can occupy
    pub fn eligible_slots(self) -> &'static [&'static str] {
        ELIGIBILITY
            .iter()
            .find(|(pos, _)| *pos == self)
            .map(|(_, slots)| *slots)
            .unwrap_or(&["BENCH"])
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DST => "DST",
            Position::Other => "other",
        };
        f.write_str(label)
    }
}
