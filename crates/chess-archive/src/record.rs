//! Typed game metadata and the stored form of a move.

use chess_core::{Color, Piece, Square};
use chess_engine::{Move, MoveKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The tag names a [`GameRecord`] keeps, in archive column order.
pub const TAG_NAMES: [&str; 29] = [
    "Event",
    "Site",
    "Date",
    "Round",
    "White",
    "Black",
    "Result",
    "WhiteElo",
    "BlackElo",
    "WhiteTitle",
    "BlackTitle",
    "WhiteTeam",
    "BlackTeam",
    "WhiteFideId",
    "BlackFideId",
    "ECO",
    "Opening",
    "Variation",
    "SubVariation",
    "TimeControl",
    "Termination",
    "Annotator",
    "PlyCount",
    "EventDate",
    "EventType",
    "EventRounds",
    "EventCountry",
    "UTCDate",
    "UTCTime",
];

/// Game metadata with a fixed schema.
///
/// Built from the free-form tag map of an extracted game. Unknown values
/// (`?`, `????.??.??`, empty) and numbers that do not parse become `None`;
/// tags outside [`TAG_NAMES`] are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub round: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub white_elo: Option<u32>,
    pub black_elo: Option<u32>,
    pub white_title: Option<String>,
    pub black_title: Option<String>,
    pub white_team: Option<String>,
    pub black_team: Option<String>,
    pub white_fide_id: Option<u32>,
    pub black_fide_id: Option<u32>,
    pub eco: Option<String>,
    pub opening: Option<String>,
    pub variation: Option<String>,
    pub sub_variation: Option<String>,
    pub time_control: Option<String>,
    pub termination: Option<String>,
    pub annotator: Option<String>,
    pub ply_count: Option<u32>,
    pub event_date: Option<String>,
    pub event_type: Option<String>,
    pub event_rounds: Option<u32>,
    pub event_country: Option<String>,
    pub utc_date: Option<String>,
    pub utc_time: Option<String>,
}

impl GameRecord {
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Self {
        let text = |name: &str| metadata.get(name).map(String::as_str).and_then(known);
        let number = |name: &str| text(name).and_then(|value| value.parse::<u32>().ok());

        GameRecord {
            event: text("Event"),
            site: text("Site"),
            date: text("Date"),
            round: text("Round"),
            white: text("White"),
            black: text("Black"),
            result: text("Result"),
            white_elo: number("WhiteElo"),
            black_elo: number("BlackElo"),
            white_title: text("WhiteTitle"),
            black_title: text("BlackTitle"),
            white_team: text("WhiteTeam"),
            black_team: text("BlackTeam"),
            white_fide_id: number("WhiteFideId"),
            black_fide_id: number("BlackFideId"),
            eco: text("ECO"),
            opening: text("Opening"),
            variation: text("Variation"),
            sub_variation: text("SubVariation"),
            time_control: text("TimeControl"),
            termination: text("Termination"),
            annotator: text("Annotator"),
            ply_count: number("PlyCount"),
            event_date: text("EventDate"),
            event_type: text("EventType"),
            event_rounds: number("EventRounds"),
            event_country: text("EventCountry"),
            utc_date: text("UTCDate"),
            utc_time: text("UTCTime"),
        }
    }

    /// The known fields as `(tag name, value)` pairs, in [`TAG_NAMES`] order.
    pub fn tags(&self) -> Vec<(&'static str, String)> {
        let numbers = |value: Option<u32>| value.map(|n| n.to_string());
        let values = [
            self.event.clone(),
            self.site.clone(),
            self.date.clone(),
            self.round.clone(),
            self.white.clone(),
            self.black.clone(),
            self.result.clone(),
            numbers(self.white_elo),
            numbers(self.black_elo),
            self.white_title.clone(),
            self.black_title.clone(),
            self.white_team.clone(),
            self.black_team.clone(),
            numbers(self.white_fide_id),
            numbers(self.black_fide_id),
            self.eco.clone(),
            self.opening.clone(),
            self.variation.clone(),
            self.sub_variation.clone(),
            self.time_control.clone(),
            self.termination.clone(),
            self.annotator.clone(),
            numbers(self.ply_count),
            self.event_date.clone(),
            self.event_type.clone(),
            numbers(self.event_rounds),
            self.event_country.clone(),
            self.utc_date.clone(),
            self.utc_time.clone(),
        ];

        TAG_NAMES
            .iter()
            .zip(values)
            .filter_map(|(&name, value)| value.map(|v| (name, v)))
            .collect()
    }
}

/// Trims a tag value and drops PGN's placeholders for "unknown".
fn known(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.chars().all(|c| c == '?' || c == '.') {
        return None;
    }
    Some(value.to_string())
}

/// A move as persisted in the archive.
///
/// Stored moves are never turned back into [`Move`]s directly; a replay
/// finds the legal move each one [`matches`](Self::matches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMove {
    pub piece: Piece,
    pub color: Color,
    pub from: Square,
    pub to: Square,
    pub kind: MoveKind,
    pub promotion: Option<Piece>,
}

impl StoredMove {
    pub fn matches(&self, m: Move) -> bool {
        *self == StoredMove::from(m)
    }
}

impl From<Move> for StoredMove {
    fn from(m: Move) -> Self {
        StoredMove {
            piece: m.piece(),
            color: m.color(),
            from: m.from(),
            to: m.to(),
            kind: m.kind(),
            promotion: m.promotion(),
        }
    }
}
