//! Interactive game sessions.
//!
//! A [`Game`] wraps a [`Position`] with what a player-facing session needs on
//! top of the rules: the SAN record of the moves played, a result that is
//! fixed once reached, and the endings players choose themselves (draw
//! claims, agreed draws, resignation).

use crate::fen::FenError;
use crate::mov::Move;
use crate::movegen::MoveList;
use crate::pgn::format_movetext;
use crate::position::Position;
use crate::rules::{DrawReason, GameResult, Outcome, RuleSet, StandardChess};
use crate::san::{move_to_san, resolve_token, ResolveError};
use chess_core::Piece;
use thiserror::Error;

/// A played move with the SAN it was recorded as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMove {
    pub mov: Move,
    pub san: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("invalid SAN: {0}")]
    InvalidSan(#[from] ResolveError),
    #[error("game has already ended")]
    GameAlreadyOver,
    #[error("no draw can be claimed in this position")]
    CannotClaimDraw,
}

/// A game in progress or finished.
///
/// Once a result is set, every mutating call fails with
/// [`GameError::GameAlreadyOver`].
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    start: Position,
    moves: Vec<GameMove>,
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_position(StandardChess.initial_position())
    }

    /// Starts a game from `position`, which may already be decided
    /// (a stalemate setup, bare kings).
    pub fn from_position(position: Position) -> Self {
        let mut game = Game {
            start: position.clone(),
            position,
            moves: Vec::new(),
            result: None,
        };
        game.update_result();
        game
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Position::from_fen(fen).map(Self::from_position)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The position the game started from.
    pub fn start_position(&self) -> &Position {
        &self.start
    }

    pub fn legal_moves(&self) -> MoveList {
        StandardChess.legal_moves(&self.position)
    }

    /// Rules classification of the current position. Unlike
    /// [`result`](Self::result), this ignores resignations and agreements.
    pub fn outcome(&self) -> Outcome {
        let legal = self.legal_moves();
        StandardChess.evaluate(&self.position, legal.as_slice())
    }

    pub fn is_check(&self) -> bool {
        StandardChess.is_check(&self.position)
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn move_history(&self) -> &[GameMove] {
        &self.moves
    }

    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    /// Occurrences of the current position, itself included.
    pub fn position_count(&self) -> usize {
        self.position.repetition_count()
    }

    pub fn make_move(&mut self, m: Move) -> Result<(), GameError> {
        self.ensure_ongoing()?;
        if !StandardChess.is_legal(&self.position, m) {
            return Err(GameError::IllegalMove(m.to_uci()));
        }
        self.play(m);
        Ok(())
    }

    pub fn make_move_san(&mut self, san: &str) -> Result<(), GameError> {
        self.ensure_ongoing()?;
        let legal = self.legal_moves();
        let m = resolve_token(san.trim(), self.position.board(), legal.as_slice())?;
        self.play(m);
        Ok(())
    }

    /// Plays a move in coordinate form: `e2e4`, or `e7e8q` for a promotion.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<(), GameError> {
        self.ensure_ongoing()?;
        let uci = uci.trim();
        let malformed = || GameError::IllegalMove(format!("invalid UCI: {uci}"));

        let (squares, suffix) = match (uci.get(..4), uci.get(4..)) {
            (Some(squares), Some(suffix)) => (squares, suffix),
            _ => return Err(malformed()),
        };
        let promotion = match suffix.len() {
            0 => None,
            1 => {
                let piece = suffix
                    .chars()
                    .next()
                    .and_then(|c| Piece::from_san_char(c.to_ascii_uppercase()))
                    .filter(|p| p.is_promotion_target())
                    .ok_or_else(malformed)?;
                Some(piece)
            }
            _ => return Err(malformed()),
        };

        let legal = self.legal_moves();
        let m = legal
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.to_uci().get(..4) == Some(squares) && m.promotion() == promotion)
            .ok_or_else(|| GameError::IllegalMove(uci.to_string()))?;
        self.play(m);
        Ok(())
    }

    fn ensure_ongoing(&self) -> Result<(), GameError> {
        match self.result {
            Some(_) => Err(GameError::GameAlreadyOver),
            None => Ok(()),
        }
    }

    fn play(&mut self, m: Move) {
        let san = move_to_san(self.position.board(), m);
        StandardChess.apply(&mut self.position, m);
        self.moves.push(GameMove { mov: m, san });
        self.update_result();
    }

    fn update_result(&mut self) {
        self.result = self.outcome().result(self.position.side_to_move());
    }

    pub fn can_claim_draw(&self) -> bool {
        self.result.is_none() && self.outcome().is_draw_claimable()
    }

    /// Ends the game by claim. Repetition is reported in preference to the
    /// fifty-move rule when both apply.
    pub fn claim_draw(&mut self) -> Result<(), GameError> {
        self.ensure_ongoing()?;
        let reason = match self.outcome() {
            Outcome::Ongoing {
                claimable_threefold: true,
                ..
            } => DrawReason::ThreefoldRepetition,
            Outcome::Ongoing {
                claimable_fifty: true,
                ..
            } => DrawReason::FiftyMoveRule,
            _ => return Err(GameError::CannotClaimDraw),
        };
        self.result = Some(GameResult::Draw(reason));
        Ok(())
    }

    pub fn agree_draw(&mut self) -> Result<(), GameError> {
        self.ensure_ongoing()?;
        self.result = Some(GameResult::Draw(DrawReason::Agreement));
        Ok(())
    }

    /// The side to move gives up.
    pub fn resign(&mut self) -> Result<(), GameError> {
        self.ensure_ongoing()?;
        let winner = self.position.side_to_move().opposite();
        self.result = Some(GameResult::win_for(winner));
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// PGN movetext of the game so far, closed by its result marker
    /// (`*` while undecided).
    pub fn to_movetext(&self) -> String {
        let san: Vec<&str> = self.moves.iter().map(|m| m.san.as_str()).collect();
        let marker = self.result.map_or("*", GameResult::pgn_marker);
        format_movetext(self.start.board(), san.as_slice(), Some(marker))
    }
}
