//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.
//! Every node is visited with make/unmake on one scratch board, so a
//! mismatch can also point at a board that was not restored correctly.

use super::generate_legal_moves;
use crate::board::Board;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(board: &Board, depth: u32) -> u64 {
    let mut scratch = *board;
    count(&mut scratch, depth)
}

fn count(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        let undo = board.make_move(m);
        nodes += count(board, depth - 1);
        board.unmake_move(m, undo);
    }
    nodes
}

/// Perft with divide - shows node count for each move at depth-1.
/// Useful for debugging to identify which moves have incorrect counts.
pub fn perft_divide(board: &Board, depth: u32) -> Vec<(String, u64)> {
    let mut scratch = *board;
    let moves = generate_legal_moves(&scratch);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        let undo = scratch.make_move(m);
        let nodes = if depth > 1 {
            count(&mut scratch, depth - 1)
        } else {
            1
        };
        scratch.unmake_move(m, undo);
        results.push((m.to_uci(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}
