//! Splitting PGN documents into games and move tokens, and writing
//! movetext back out.
//!
//! Extraction is pure text segmentation: nothing here knows the rules of
//! chess. A token that is not a move survives extraction and is rejected
//! later, when the game's tokens are resolved against a position.

use crate::board::Board;
use chess_core::Color;
use std::collections::HashMap;

/// Result markers that close a game's movetext.
pub const RESULT_MARKERS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// One game as found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedGame {
    /// Tag pairs, e.g. `"White" => "Carlsen, Magnus"`.
    pub metadata: HashMap<String, String>,
    /// Move tokens in order, stripped of numbers and annotations.
    pub tokens: Vec<String>,
    /// The result marker that closed the movetext, if one did.
    pub result: Option<String>,
}

impl ExtractedGame {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.metadata.get(name).map(String::as_str)
    }

    fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.tokens.is_empty() && self.result.is_none()
    }

    fn has_movetext(&self) -> bool {
        !self.tokens.is_empty() || self.result.is_some()
    }
}

enum Event {
    Tag(String, String),
    Word(String),
}

/// Splits a document of concatenated games into per-game metadata and move
/// tokens.
///
/// A game ends at its result marker, or where a new tag section begins
/// after movetext. Movetext after a result marker with no tags of its own
/// becomes a game with empty metadata.
pub fn extract_games(document: &str) -> Vec<ExtractedGame> {
    let mut games = Vec::new();
    let mut current = ExtractedGame::default();

    for event in lex(document) {
        match event {
            Event::Tag(name, value) => {
                if current.has_movetext() {
                    games.push(std::mem::take(&mut current));
                }
                current.metadata.insert(name, value);
            }
            Event::Word(word) => {
                if current.result.is_some() {
                    games.push(std::mem::take(&mut current));
                }
                if RESULT_MARKERS.contains(&word.as_str()) {
                    current.result = Some(word);
                } else if let Some(token) = normalize_word(&word) {
                    current.tokens.push(token.to_string());
                }
            }
        }
    }

    if !current.is_empty() {
        games.push(current);
    }
    games
}

/// Splits bare movetext (no tag pairs) into move tokens.
pub fn tokenize_movetext(movetext: &str) -> Vec<String> {
    lex(movetext)
        .into_iter()
        .filter_map(|event| match event {
            Event::Word(word) if !RESULT_MARKERS.contains(&word.as_str()) => {
                normalize_word(&word).map(str::to_string)
            }
            _ => None,
        })
        .collect()
}

/// Numbers SAN moves starting from `start`'s fullmove number and side to
/// move, then appends `result` if given.
///
/// A game that starts with Black to move opens with `N...`.
pub fn format_movetext<S: AsRef<str>>(start: &Board, san: &[S], result: Option<&str>) -> String {
    let mut parts = Vec::with_capacity(san.len() * 3 / 2 + 1);
    let mut number = start.fullmove_number();
    let mut white_to_move = start.side_to_move() == Color::White;

    for (i, mv) in san.iter().enumerate() {
        if white_to_move {
            parts.push(format!("{number}."));
        } else if i == 0 {
            parts.push(format!("{number}..."));
        }
        parts.push(mv.as_ref().to_string());
        if !white_to_move {
            number += 1;
        }
        white_to_move = !white_to_move;
    }

    parts.extend(result.map(str::to_string));
    parts.join(" ")
}

/// Produces tag pairs and top-level movetext words, with comments,
/// variations and escape lines already removed.
fn lex(document: &str) -> Vec<Event> {
    let mut events = Vec::new();
    let mut in_comment = false;
    let mut depth = 0usize;

    for line in document.lines() {
        if !in_comment && line.starts_with('%') {
            continue;
        }
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            if let Some(tags) = parse_tag_line(trimmed) {
                // A tag section always begins at top level, even if a
                // corrupt game left a comment or variation open.
                in_comment = false;
                depth = 0;
                events.extend(tags.into_iter().map(|(name, value)| Event::Tag(name, value)));
                continue;
            }
        }

        let mut word = String::new();
        for c in line.chars() {
            if in_comment {
                if c == '}' {
                    in_comment = false;
                }
                continue;
            }
            match c {
                '{' => {
                    flush(&mut word, depth, &mut events);
                    in_comment = true;
                }
                ';' => break,
                '(' => {
                    flush(&mut word, depth, &mut events);
                    depth += 1;
                }
                ')' => {
                    flush(&mut word, depth, &mut events);
                    depth = depth.saturating_sub(1);
                }
                c if c.is_whitespace() => flush(&mut word, depth, &mut events),
                c => word.push(c),
            }
        }
        flush(&mut word, depth, &mut events);
    }

    events
}

/// Emits the pending word if it sits outside any variation.
fn flush(word: &mut String, depth: usize, events: &mut Vec<Event>) {
    if word.is_empty() {
        return;
    }
    if depth == 0 {
        events.push(Event::Word(std::mem::take(word)));
    } else {
        word.clear();
    }
}

/// Parses a line holding one or more `[Name "Value"]` pairs and nothing
/// else.
fn parse_tag_line(line: &str) -> Option<Vec<(String, String)>> {
    let mut tags = Vec::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        let (tag, after) = parse_tag(rest)?;
        tags.push(tag);
        rest = after.trim_start();
    }
    (!tags.is_empty()).then_some(tags)
}

/// Parses the `[Name "Value"]` pair at the start of `text`, honouring `\"`
/// and `\\` inside the value. Returns the pair and the text after `]`.
fn parse_tag(text: &str) -> Option<((String, String), &str)> {
    let inner = text.strip_prefix('[')?.trim_start();
    let name_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(inner.len());
    let (name, rest) = inner.split_at(name_len);
    if name.is_empty() {
        return None;
    }

    let mut chars = rest.trim_start().strip_prefix('"')?.chars();
    let mut value = String::new();
    loop {
        match chars.next()? {
            '\\' => value.push(chars.next()?),
            '"' => break,
            c => value.push(c),
        }
    }
    let after = chars.as_str().trim_start().strip_prefix(']')?;
    Some(((name.to_string(), value), after))
}

/// Strips move numbers and annotation glyphs from a movetext word.
///
/// Returns `None` for words that carry no move at all: bare move numbers,
/// ellipses and numeric annotation glyphs.
fn normalize_word(word: &str) -> Option<&str> {
    if word.starts_with('$') {
        return None;
    }

    let digits = word.len() - word.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let rest = &word[digits..];
    if digits > 0 && rest.is_empty() {
        return None;
    }
    // "12." and "12...e5" carry a number; "0-0" starts with one but does not.
    let rest = if digits == 0 || rest.starts_with('.') {
        rest.trim_start_matches('.')
    } else {
        word
    };

    let token = rest.trim_end_matches(&['!', '?'][..]);
    (!token.is_empty()).then_some(token)
}
