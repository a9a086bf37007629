//! Precomputed leaper targets and slider directions.

use chess_core::Square;

/// Squares a leaper can reach from one origin.
#[derive(Clone, Copy)]
pub struct Targets {
    squares: [Square; 8],
    len: usize,
}

impl Targets {
    const EMPTY: Targets = Targets {
        squares: [Square::A1; 8],
        len: 0,
    };

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Square> + '_ {
        self.squares[..self.len].iter().copied()
    }
}

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

/// Knight targets indexed by origin square.
pub static KNIGHT_TARGETS: [Targets; 64] = leaper_table(&KNIGHT_DELTAS);

/// King targets indexed by origin square.
pub static KING_TARGETS: [Targets; 64] = leaper_table(&KING_DELTAS);

const fn leaper_table(deltas: &[(i8, i8); 8]) -> [Targets; 64] {
    let mut table = [Targets::EMPTY; 64];
    let mut index = 0u8;
    while index < 64 {
        let origin = match Square::from_index(index) {
            Some(square) => square,
            None => unreachable!(),
        };
        let mut targets = Targets::EMPTY;
        let mut d = 0;
        while d < deltas.len() {
            let (file_delta, rank_delta) = deltas[d];
            if let Some(target) = origin.offset(file_delta, rank_delta) {
                targets.squares[targets.len] = target;
                targets.len += 1;
            }
            d += 1;
        }
        table[index as usize] = targets;
        index += 1;
    }
    table
}

#[inline]
pub fn knight_targets(square: Square) -> &'static Targets {
    &KNIGHT_TARGETS[square.index() as usize]
}

#[inline]
pub fn king_targets(square: Square) -> &'static Targets {
    &KING_TARGETS[square.index() as usize]
}
