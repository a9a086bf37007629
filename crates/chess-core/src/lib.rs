//! Core value types for chess.
//!
//! This crate provides the vocabulary shared by the rules engine and the
//! archive tooling:
//! - [`Piece`] and [`Color`] for piece identity
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//!
//! None of these types carry any rules knowledge; move generation and
//! legality live in `chess-engine`.

mod color;
mod piece;
mod square;

pub use color::Color;
pub use piece::Piece;
pub use square::{File, Rank, Square};
