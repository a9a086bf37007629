//! End-to-end rules scenarios driven through the public API.

use chess_core::{Color, Piece, Square};
use chess_engine::{
    evaluate, extract_games, resolve_sequence, resolve_token, Board, DrawReason, Game,
    GameResult, MoveKind, Outcome, Position, ResolveError,
};

fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

fn outcome_of(position: &Position) -> Outcome {
    let legal = position.legal_moves();
    evaluate(position, legal.as_slice())
}

fn play(tokens: &[&str]) -> Position {
    let resolution = resolve_sequence(tokens, Position::new_game());
    assert!(
        resolution.is_complete(),
        "sequence stopped early: {:?}",
        resolution.failure
    );
    resolution.position
}

#[test]
fn test_start_position_has_twenty_moves() {
    let position = Position::new_game();
    assert_eq!(position.legal_moves().len(), 20);
    assert_eq!(position.history().len(), 1);
    assert_eq!(
        outcome_of(&position),
        Outcome::Ongoing {
            claimable_fifty: false,
            claimable_threefold: false
        }
    );
}

#[test]
fn test_scholars_mate() {
    let position = play(&["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]);
    assert!(position.is_check());
    assert_eq!(outcome_of(&position), Outcome::Checkmate);
    assert_eq!(
        outcome_of(&position).result(position.side_to_move()),
        Some(GameResult::WhiteWins)
    );
}

#[test]
fn test_en_passant_through_sequence() {
    let position = play(&["e4", "a6", "e5", "d5", "exd6"]);
    assert_eq!(position.piece_at(sq("d5")), None);
    assert_eq!(
        position.piece_at(sq("d6")),
        Some((Piece::Pawn, Color::White))
    );
    assert_eq!(position.en_passant(), None);
}

#[test]
fn test_en_passant_expires_after_one_ply() {
    let resolution = resolve_sequence(
        &["e4", "a6", "e5", "d5", "h3", "h6", "exd6"],
        Position::new_game(),
    );
    assert_eq!(resolution.failed_at(), Some(6));
    assert!(matches!(
        resolution.failure.unwrap().error,
        ResolveError::NoMatchingMove(_)
    ));
}

#[test]
fn test_promotion_requires_piece() {
    let board = Board::from_fen("8/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
    let position = Position::from_board(board);
    let legal = position.legal_moves();

    let err = resolve_token("a8", position.board(), legal.as_slice()).unwrap_err();
    assert!(matches!(err, ResolveError::PromotionRequired(_)));

    let m = resolve_token("a8=N", position.board(), legal.as_slice()).unwrap();
    assert_eq!(m.kind(), MoveKind::Promotion);
    assert_eq!(m.promotion(), Some(Piece::Knight));
}

#[test]
fn test_ambiguous_knight_needs_file() {
    let board = Board::from_fen("7k/8/8/8/8/8/8/1N1K1N2 w - - 0 1").unwrap();
    let legal = chess_engine::generate_legal_moves(&board);

    let err = resolve_token("Nd2", &board, legal.as_slice()).unwrap_err();
    assert!(matches!(err, ResolveError::AmbiguousMove { .. }));

    let m = resolve_token("Nbd2", &board, legal.as_slice()).unwrap();
    assert_eq!(m.from(), sq("b1"));
    let m = resolve_token("Nfd2", &board, legal.as_slice()).unwrap();
    assert_eq!(m.from(), sq("f1"));
}

#[test]
fn test_castling_rights_lost_after_king_moves() {
    let resolution = resolve_sequence(
        &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "Ke2", "Nf6", "Ke1", "d6", "O-O"],
        Position::new_game(),
    );
    assert_eq!(resolution.failed_at(), Some(10));
    assert!(!resolution.position.castling().can_castle_kingside(Color::White));
    assert!(resolution.position.castling().can_castle_kingside(Color::Black));
}

#[test]
fn test_kingside_castling_moves_rook() {
    let position = play(&["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5", "O-O"]);
    assert_eq!(position.piece_at(sq("g1")), Some((Piece::King, Color::White)));
    assert_eq!(position.piece_at(sq("f1")), Some((Piece::Rook, Color::White)));
    assert_eq!(position.piece_at(sq("h1")), None);
}

#[test]
fn test_repetition_claimable_then_forced() {
    let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8"];

    let twice: Vec<&str> = shuffle.iter().chain(shuffle.iter()).copied().collect();
    let position = play(&twice);
    assert_eq!(position.repetition_count(), 3);
    assert_eq!(
        outcome_of(&position),
        Outcome::Ongoing {
            claimable_fifty: false,
            claimable_threefold: true
        }
    );

    let four_times: Vec<&str> = shuffle.iter().cycle().take(16).copied().collect();
    let position = play(&four_times);
    assert_eq!(position.repetition_count(), 5);
    assert_eq!(outcome_of(&position), Outcome::FivefoldRepetition);
    assert_eq!(position.history().len(), 17);
}

#[test]
fn test_stalemate() {
    let position = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert!(position.legal_moves().is_empty());
    assert!(!position.is_check());
    assert_eq!(outcome_of(&position), Outcome::Stalemate);
}

#[test]
fn test_insufficient_material_cases() {
    let drawn = [
        "8/8/8/4k3/8/8/8/4K3 w - - 0 1",
        "8/8/8/4k3/8/8/8/4KN2 w - - 0 1",
        "8/8/8/4k3/8/8/8/4KB2 w - - 0 1",
        "8/8/8/3bk3/8/8/8/4KB2 w - - 0 1",
    ];
    for fen in drawn {
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(outcome_of(&position), Outcome::InsufficientMaterial, "{fen}");
    }

    let playable = [
        "8/8/8/4k3/8/8/4P3/4K3 w - - 0 1",
        "8/8/8/2b1k3/8/8/8/4KB2 w - - 0 1",
        "8/8/8/4k3/8/8/8/3NKN2 w - - 0 1",
        "8/8/8/4k3/8/8/8/4K2R w - - 0 1",
    ];
    for fen in playable {
        let position = Position::from_fen(fen).unwrap();
        assert!(
            matches!(outcome_of(&position), Outcome::Ongoing { .. }),
            "{fen}"
        );
    }
}

#[test]
fn test_move_clock_thresholds() {
    let claimable = Position::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 100 80").unwrap();
    assert_eq!(
        outcome_of(&claimable),
        Outcome::Ongoing {
            claimable_fifty: true,
            claimable_threefold: false
        }
    );

    let forced = Position::from_fen("8/8/8/4k3/8/8/8/R3K3 w - - 150 110").unwrap();
    assert_eq!(outcome_of(&forced), Outcome::SeventyFiveMove);
}

#[test]
fn test_move_clock_rises_through_quiet_play() {
    // Locked centre pawns keep mating material on the board while the kings
    // walk rings of 16 and 14 squares, so no position recurs within 150 plies.
    let white_ring = [
        "b1", "c1", "d1", "e1", "f1", "g1", "h1", "h2", "g2", "f2", "e2", "d2", "c2", "b2", "a2",
        "a1",
    ];
    let black_ring = [
        "c8", "d8", "e8", "f8", "g8", "h8", "h7", "g7", "f7", "e7", "d7", "c7", "b7", "b8",
    ];
    let mut position = Position::from_fen("1k6/8/8/4p3/4P3/8/8/K7 w - - 0 1").unwrap();

    for ply in 0..150 {
        assert_eq!(position.halfmove_clock(), ply as u32);
        assert_eq!(
            outcome_of(&position),
            Outcome::Ongoing {
                claimable_fifty: ply >= 100,
                claimable_threefold: false
            },
            "ply {ply}"
        );

        let target = if ply % 2 == 0 {
            sq(white_ring[(ply / 2) % white_ring.len()])
        } else {
            sq(black_ring[(ply / 2) % black_ring.len()])
        };
        let legal = position.legal_moves();
        let step = legal
            .as_slice()
            .iter()
            .copied()
            .find(|m| m.piece() == Piece::King && m.to() == target)
            .unwrap_or_else(|| panic!("no king move to {target:?} at ply {ply}"));
        position.apply(step);
    }

    assert_eq!(position.halfmove_clock(), 150);
    assert_eq!(position.repetition_count(), 1);
    assert_eq!(outcome_of(&position), Outcome::SeventyFiveMove);
}

#[test]
fn test_checkmate_outranks_move_clock() {
    // Back-rank mate delivered on the 150th quiet ply.
    let mut game = Game::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 149 100").unwrap();
    game.make_move_san("Ra8#").unwrap();
    assert_eq!(game.outcome(), Outcome::Checkmate);
    assert_eq!(game.result(), Some(GameResult::WhiteWins));
}

#[test]
fn test_game_claims_threefold() {
    let mut game = Game::new();
    for san in ["Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8"] {
        game.make_move_san(san).unwrap();
    }
    assert!(game.can_claim_draw());
    game.claim_draw().unwrap();
    assert_eq!(
        game.result(),
        Some(GameResult::Draw(DrawReason::ThreefoldRepetition))
    );
}

#[test]
fn test_extracted_game_replays() {
    let document = r#"[Event "Casual"]
[White "Anderssen"]
[Black "Kieseritzky"]
[Result "1-0"]

1. e4 e5 2. f4 exf4 3. Bc4 Qh4+ 4. Kf1 b5 5. Bxb5 Nf6 6. Nf3 Qh6 7. d3 Nh5
8. Nh4 Qg5 9. Nf5 c6 10. g4 Nf6 11. Rg1 cxb5 12. h4 Qg6 13. h5 Qg5 14. Qf3
Ng8 15. Bxf4 Qf6 16. Nc3 Bc5 17. Nd5 Qxb2 18. Bd6 Bxg1 19. e5 Qxa1+ 20. Ke2
Na6 21. Nxg7+ Kd8 22. Qf6+ Nxf6 23. Be7# 1-0
"#;
    let games = extract_games(document);
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].tag("White"), Some("Anderssen"));

    let resolution = resolve_sequence(games[0].tokens.as_slice(), Position::new_game());
    assert!(resolution.is_complete(), "{:?}", resolution.failure);
    assert_eq!(resolution.moves.len(), 45);
    assert_eq!(outcome_of(&resolution.position), Outcome::Checkmate);
}

#[test]
fn test_failure_keeps_earlier_moves() {
    let games = extract_games("1. e4 e5 2. Nf3 Qz9 3. Bb5 *");
    let resolution = resolve_sequence(games[0].tokens.as_slice(), Position::new_game());
    assert_eq!(resolution.failed_at(), Some(3));
    assert_eq!(resolution.moves.len(), 3);
    assert_eq!(resolution.position.ply_count(), 3);
    assert_eq!(resolution.position.side_to_move(), Color::Black);
}
