//! Parallel resolution of extracted games.
//!
//! Each game is an independent unit of work with its own [`Position`], so
//! games are spread across a rayon pool while the moves within one game are
//! resolved strictly in order.

use crate::record::GameRecord;
use chess_engine::{
    evaluate, extract_games, resolve_sequence, ExtractedGame, FenError, Move, Outcome, Position,
    SequenceFailure,
};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a game's moves could not all be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportFailure {
    /// The `FEN` tag did not describe a usable start position.
    Setup(FenError),
    /// A move token did not resolve; earlier moves were kept.
    Move(SequenceFailure),
}

impl fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportFailure::Setup(err) => write!(f, "bad setup: {err}"),
            ImportFailure::Move(failure) => write!(
                f,
                "token {} ({:?}): {}",
                failure.index, failure.token, failure.error
            ),
        }
    }
}

/// One game after resolution.
#[derive(Debug, Clone)]
pub struct ImportedGame {
    /// Position of the game within its document.
    pub index: usize,
    pub record: GameRecord,
    /// FEN of the position the moves start from.
    pub start_fen: String,
    pub moves: Vec<Move>,
    pub failure: Option<ImportFailure>,
    /// Classification of the final position; `None` when setup failed.
    pub outcome: Option<Outcome>,
}

impl ImportedGame {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Index of the first token that failed to resolve.
    pub fn failed_at(&self) -> Option<usize> {
        match &self.failure {
            Some(ImportFailure::Move(failure)) => Some(failure.index),
            _ => None,
        }
    }
}

/// Games resolved from one document.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Resolved games, in document order.
    pub games: Vec<ImportedGame>,
    /// Games never started because the import was cancelled.
    pub skipped: usize,
}

impl ImportReport {
    pub fn complete(&self) -> usize {
        self.games.iter().filter(|g| g.is_complete()).count()
    }

    pub fn failed(&self) -> usize {
        self.games.len() - self.complete()
    }
}

/// Resolves games on a dedicated thread pool.
///
/// Cancellation is cooperative: the flag is checked before each game starts,
/// and a game that has started always runs to its end.
pub struct Importer {
    pool: ThreadPool,
    cancel: Arc<AtomicBool>,
}

impl Importer {
    /// Creates an importer with `threads` workers, or one per core.
    pub fn new(threads: Option<usize>) -> Result<Self, ImportError> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("import-{i}"));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        Ok(Self {
            pool: builder.build()?,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Flag that stops the import when set. Games already running finish.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn import_file(&self, path: &Path) -> Result<ImportReport, ImportError> {
        let document = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.import_document(&document))
    }

    pub fn import_document(&self, document: &str) -> ImportReport {
        let games = extract_games(document);
        info!(games = games.len(), "Extracted games from document");
        self.import_games(games)
    }

    pub fn import_games(&self, games: Vec<ExtractedGame>) -> ImportReport {
        let cancel = &self.cancel;
        let results: Vec<Option<ImportedGame>> = self.pool.install(|| {
            games
                .into_par_iter()
                .enumerate()
                .map(|(index, game)| {
                    if cancel.load(Ordering::Relaxed) {
                        return None;
                    }
                    Some(import_game(index, game))
                })
                .collect()
        });

        let skipped = results.iter().filter(|r| r.is_none()).count();
        let report = ImportReport {
            games: results.into_iter().flatten().collect(),
            skipped,
        };
        info!(
            complete = report.complete(),
            failed = report.failed(),
            skipped,
            "Import finished"
        );
        report
    }
}

/// Resolves one extracted game from its own start position.
pub fn import_game(index: usize, game: ExtractedGame) -> ImportedGame {
    let record = GameRecord::from_metadata(&game.metadata);

    let start = match game.tag("FEN") {
        Some(fen) => match Position::from_fen(fen) {
            Ok(position) => position,
            Err(err) => {
                warn!(index, %err, "Skipping moves of game with bad FEN tag");
                return ImportedGame {
                    index,
                    record,
                    start_fen: fen.to_string(),
                    moves: Vec::new(),
                    failure: Some(ImportFailure::Setup(err)),
                    outcome: None,
                };
            }
        },
        None => Position::new_game(),
    };
    let start_fen = start.to_fen();

    let resolution = resolve_sequence(game.tokens.as_slice(), start);
    let legal = resolution.position.legal_moves();
    let outcome = evaluate(&resolution.position, legal.as_slice());
    if let Some(failure) = &resolution.failure {
        debug!(
            index,
            at = failure.index,
            token = %failure.token,
            "Game truncated at unresolvable token"
        );
    }

    ImportedGame {
        index,
        record,
        start_fen,
        moves: resolution.moves,
        failure: resolution.failure.map(ImportFailure::Move),
        outcome: Some(outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_engine::ResolveError;

    const TWO_GAMES: &str = r#"[Event "Good"]
[White "A"]
[Black "B"]
[Result "1-0"]

1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7# 1-0

[Event "Corrupt"]
[White "C"]
[Black "D"]
[WhiteElo "2100"]

1. d4 d5 2. Nf3 Qz9 3. Bf4 *
"#;

    #[test]
    fn test_import_keeps_prefix_of_corrupt_game() {
        let importer = Importer::new(Some(2)).unwrap();
        let report = importer.import_document(TWO_GAMES);

        assert_eq!(report.games.len(), 2);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.complete(), 1);
        assert_eq!(report.failed(), 1);

        let good = &report.games[0];
        assert_eq!(good.index, 0);
        assert_eq!(good.record.event.as_deref(), Some("Good"));
        assert_eq!(good.moves.len(), 7);
        assert_eq!(good.outcome, Some(Outcome::Checkmate));

        let corrupt = &report.games[1];
        assert_eq!(corrupt.index, 1);
        assert_eq!(corrupt.record.white_elo, Some(2100));
        assert_eq!(corrupt.moves.len(), 3);
        assert_eq!(corrupt.failed_at(), Some(3));
        match &corrupt.failure {
            Some(ImportFailure::Move(failure)) => {
                assert_eq!(failure.token, "Qz9");
                assert!(matches!(failure.error, ResolveError::MalformedToken { .. }));
            }
            other => panic!("expected move failure, got {other:?}"),
        }
    }

    #[test]
    fn test_fen_tag_sets_start_position() {
        let document = "[SetUp \"1\"]\n[FEN \"8/P7/8/8/8/8/8/4K2k w - - 0 1\"]\n\n1. a8=Q *\n";
        let report = Importer::new(Some(1)).unwrap().import_document(document);
        let game = &report.games[0];
        assert!(game.is_complete());
        assert_eq!(game.start_fen, "8/P7/8/8/8/8/8/4K2k w - - 0 1");
        assert_eq!(game.moves.len(), 1);
    }

    #[test]
    fn test_bad_fen_tag_is_setup_failure() {
        let document = "[FEN \"8/8/8/8/8/8/8/8 w - - 0 1\"]\n\n1. e4 *\n";
        let report = Importer::new(Some(1)).unwrap().import_document(document);
        let game = &report.games[0];
        assert!(matches!(game.failure, Some(ImportFailure::Setup(_))));
        assert!(game.moves.is_empty());
        assert_eq!(game.outcome, None);
        assert_eq!(game.failed_at(), None);
    }

    #[test]
    fn test_cancelled_import_skips_games() {
        let importer = Importer::new(Some(2)).unwrap();
        importer.cancel_handle().store(true, Ordering::Relaxed);
        let report = importer.import_document(TWO_GAMES);
        assert!(report.games.is_empty());
        assert_eq!(report.skipped, 2);
    }

    #[test]
    fn test_results_keep_document_order() {
        let document: String = (0..40)
            .map(|i| format!("[Event \"{i}\"]\n\n1. e4 e5 *\n\n"))
            .collect();
        let report = Importer::new(Some(4)).unwrap().import_document(&document);
        assert_eq!(report.games.len(), 40);
        for (i, game) in report.games.iter().enumerate() {
            assert_eq!(game.index, i);
            assert_eq!(game.record.event, Some(i.to_string()));
        }
    }
}
