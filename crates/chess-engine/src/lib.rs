//! Chess rules engine.
//!
//! This crate provides:
//! - [`Board`] - piece placement, side to move, castling rights, en passant
//!   target and move clocks, with FEN import/export
//! - [`Position`] - a board plus the fingerprint history used for repetition
//! - Legal move generation ([`movegen`]) and move application
//! - Game-end evaluation ([`evaluate`], [`Outcome`]) and the [`RuleSet`] trait
//! - SAN resolution and generation ([`san`])
//! - PGN segmentation into games and move tokens ([`pgn`])
//! - [`Game`] - an interactive session with SAN history and draw claims
//!
//! # Architecture
//!
//! The board is a 64-square mailbox. Moves are generated pseudo-legally by
//! scanning squares in index order, then filtered by playing each one on a
//! scratch copy and checking the mover's king. Playing a move mutates the
//! board in place and returns a private undo record, so speculative moves
//! never allocate.
//!
//! # Example
//!
//! ```
//! use chess_engine::{evaluate, resolve_sequence, Outcome, Position};
//!
//! let tokens = ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"];
//! let resolution = resolve_sequence(&tokens, Position::new_game());
//! assert!(resolution.is_complete());
//!
//! let position = resolution.position;
//! let legal = position.legal_moves();
//! assert_eq!(evaluate(&position, legal.as_slice()), Outcome::Checkmate);
//! ```

mod apply;
mod board;
mod fen;
mod game;
mod mov;
pub mod movegen;
pub mod pgn;
mod position;
pub mod rules;
pub mod san;

pub use board::{Board, CastlingRights, Fingerprint};
pub use fen::{FenError, STARTPOS};
pub use game::{Game, GameError, GameMove};
pub use mov::{Move, MoveKind};
pub use movegen::{generate_legal_moves, is_in_check, is_square_attacked, perft, MoveList};
pub use pgn::{extract_games, format_movetext, ExtractedGame};
pub use position::Position;
pub use rules::{
    evaluate, is_insufficient_material, DrawReason, GameResult, Outcome, RuleSet, StandardChess,
};
pub use san::{
    move_to_san, resolve_sequence, resolve_token, ResolveError, SequenceFailure,
    SequenceResolution,
};
