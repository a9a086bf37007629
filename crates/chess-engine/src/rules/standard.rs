//! Standard FIDE chess rules.

use super::{evaluate, is_insufficient_material, Outcome, RuleSet};
use crate::board::Board;
use crate::mov::Move;
use crate::movegen::MoveList;
use crate::position::Position;

/// Standard chess as played under FIDE Laws: classic start position,
/// castling, en passant, promotion, and automatic draws at fivefold
/// repetition and the 75-move rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl RuleSet for StandardChess {
    fn initial_position(&self) -> Position {
        Position::new_game()
    }

    fn legal_moves(&self, position: &Position) -> MoveList {
        position.legal_moves()
    }

    fn apply(&self, position: &mut Position, m: Move) {
        position.apply(m);
    }

    fn evaluate(&self, position: &Position, legal: &[Move]) -> Outcome {
        evaluate(position, legal)
    }

    fn is_check(&self, position: &Position) -> bool {
        position.is_check()
    }

    fn is_insufficient_material(&self, board: &Board) -> bool {
        is_insufficient_material(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fools_mate_through_the_trait() {
        let rules = StandardChess;
        let mut position = rules.initial_position();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let m = rules
                .legal_moves(&position)
                .as_slice()
                .iter()
                .copied()
                .find(|m| m.to_uci() == uci)
                .unwrap();
            assert!(rules.is_legal(&position, m));
            rules.apply(&mut position, m);
        }
        let legal = rules.legal_moves(&position);
        assert!(rules.is_check(&position));
        assert_eq!(rules.evaluate(&position, legal.as_slice()), Outcome::Checkmate);
        assert!(!rules.is_insufficient_material(position.board()));
    }
}
