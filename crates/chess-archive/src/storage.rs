//! SQLite storage for imported games.
//!
//! Each game is one row: a UUID, the typed metadata columns, the FEN the
//! moves start from, the moves as a JSON array of [`StoredMove`]s, and the
//! index of the token that stopped resolution for partial games.

use crate::import::ImportedGame;
use crate::record::{GameRecord, StoredMove};
use chess_engine::{move_to_san, Board, FenError, Move, Position};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Failed to encode or decode move list: {0}")]
    MoveList(#[from] serde_json::Error),
    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("Stored start position is invalid: {0}")]
    StartPosition(#[from] FenError),
    #[error("Stored move {index} is not legal in the replayed position")]
    IllegalStoredMove { index: usize },
}

/// A game as read back from the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGame {
    pub id: String,
    pub record: GameRecord,
    pub start_fen: String,
    pub moves: Vec<StoredMove>,
    /// Token index where resolution stopped, for partial games.
    pub failed_at: Option<usize>,
    pub created_at: DateTime<Utc>,
}

/// A stored game played out again on a fresh position.
#[derive(Debug, Clone)]
pub struct Replay {
    /// Board the moves were played from.
    pub start: Board,
    pub position: Position,
    pub moves: Vec<Move>,
    pub san: Vec<String>,
}

impl StoredGame {
    /// Replays the stored moves from the start position.
    ///
    /// Every stored move must match exactly one legal move of the position
    /// it is played in; nothing is applied without that check.
    pub fn replay(&self) -> Result<Replay, StorageError> {
        let mut position = Position::from_fen(&self.start_fen)?;
        let start = *position.board();
        let mut moves = Vec::with_capacity(self.moves.len());
        let mut san = Vec::with_capacity(self.moves.len());

        for (index, stored) in self.moves.iter().enumerate() {
            let legal = position.legal_moves();
            let m = legal
                .as_slice()
                .iter()
                .copied()
                .find(|&m| stored.matches(m))
                .ok_or(StorageError::IllegalStoredMove { index })?;
            san.push(move_to_san(position.board(), m));
            position.apply(m);
            moves.push(m);
        }

        Ok(Replay {
            start,
            position,
            moves,
            san,
        })
    }
}

/// One line of a game listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub id: String,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    pub date: Option<String>,
    pub move_count: usize,
    pub partial: bool,
}

/// Aggregate counts over the whole archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub games: usize,
    pub partial: usize,
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
}

/// Counts from storing an import report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub saved: usize,
    pub partial: usize,
    pub rejected: usize,
}

/// SQLite-backed game archive.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens or creates a database at `path`. Use `":memory:"` for a
    /// throwaway archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.init_schema()?;
        Ok(storage)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS games (
                id TEXT PRIMARY KEY,
                event TEXT,
                site TEXT,
                date TEXT,
                round TEXT,
                white TEXT,
                black TEXT,
                result TEXT,
                white_elo INTEGER,
                black_elo INTEGER,
                white_title TEXT,
                black_title TEXT,
                white_team TEXT,
                black_team TEXT,
                white_fide_id INTEGER,
                black_fide_id INTEGER,
                eco TEXT,
                opening TEXT,
                variation TEXT,
                sub_variation TEXT,
                time_control TEXT,
                termination TEXT,
                annotator TEXT,
                ply_count INTEGER,
                event_date TEXT,
                event_type TEXT,
                event_rounds INTEGER,
                event_country TEXT,
                utc_date TEXT,
                utc_time TEXT,
                start_fen TEXT NOT NULL,
                moves TEXT NOT NULL,
                move_count INTEGER NOT NULL,
                failed_at INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_games_players ON games (white, black);
            ",
        )?;
        Ok(())
    }

    /// Saves one game and returns its new id.
    pub fn save_game(&self, game: &ImportedGame) -> Result<String, StorageError> {
        insert_game(&self.conn, game)
    }

    /// Saves every storable game of an import in one transaction.
    ///
    /// Games whose setup failed are always rejected; partial games are
    /// stored only when `store_partial` is set.
    pub fn save_games(
        &mut self,
        games: &[ImportedGame],
        store_partial: bool,
    ) -> Result<SaveSummary, StorageError> {
        let tx = self.conn.transaction()?;
        let mut summary = SaveSummary::default();

        for game in games {
            let storable = match (&game.outcome, game.failed_at()) {
                (None, _) => false,
                (Some(_), Some(_)) => store_partial,
                (Some(_), None) => true,
            };
            if !storable {
                summary.rejected += 1;
                continue;
            }
            let id = insert_game(&tx, game)?;
            debug!(index = game.index, %id, "Stored game");
            summary.saved += 1;
            if game.failed_at().is_some() {
                summary.partial += 1;
            }
        }

        tx.commit()?;
        if summary.rejected > 0 {
            warn!(rejected = summary.rejected, "Some games were not stored");
        }
        Ok(summary)
    }

    pub fn load_game(&self, id: &str) -> Result<Option<StoredGame>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT * FROM games WHERE id = ?1",
                [id],
                |row| Ok((read_record(row)?, read_storage_fields(row)?)),
            )
            .optional()?;

        let Some((record, (id, start_fen, moves, failed_at, created_at))) = row else {
            return Ok(None);
        };

        Ok(Some(StoredGame {
            id,
            record,
            start_fen,
            moves: serde_json::from_str(&moves)?,
            failed_at: failed_at.map(|i| i as usize),
            created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
        }))
    }

    pub fn count_games(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Lists up to `limit` games in insertion order.
    pub fn list_games(&self, limit: usize) -> Result<Vec<GameSummary>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, white, black, result, date, move_count, failed_at
             FROM games ORDER BY rowid LIMIT ?1",
        )?;
        let rows = stmt.query_map([limit as i64], |row| {
            Ok(GameSummary {
                id: row.get(0)?,
                white: row.get(1)?,
                black: row.get(2)?,
                result: row.get(3)?,
                date: row.get(4)?,
                move_count: row.get::<_, i64>(5)? as usize,
                partial: row.get::<_, Option<i64>>(6)?.is_some(),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn stats(&self) -> Result<ArchiveStats, StorageError> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*),
                    SUM(failed_at IS NOT NULL),
                    SUM(result = '1-0'),
                    SUM(result = '0-1'),
                    SUM(result = '1/2-1/2')
             FROM games",
            [],
            |row| {
                let count = |i: usize| -> rusqlite::Result<usize> {
                    Ok(row.get::<_, Option<i64>>(i)?.unwrap_or(0) as usize)
                };
                Ok(ArchiveStats {
                    games: count(0)?,
                    partial: count(1)?,
                    white_wins: count(2)?,
                    black_wins: count(3)?,
                    draws: count(4)?,
                })
            },
        )?;
        Ok(stats)
    }
}

fn insert_game(conn: &Connection, game: &ImportedGame) -> Result<String, StorageError> {
    let id = Uuid::new_v4().to_string();
    let stored: Vec<StoredMove> = game.moves.iter().copied().map(StoredMove::from).collect();
    let moves = serde_json::to_string(&stored)?;
    let r = &game.record;

    conn.execute(
        "INSERT INTO games (
            id, event, site, date, round, white, black, result,
            white_elo, black_elo, white_title, black_title, white_team, black_team,
            white_fide_id, black_fide_id, eco, opening, variation, sub_variation,
            time_control, termination, annotator, ply_count, event_date, event_type,
            event_rounds, event_country, utc_date, utc_time,
            start_fen, moves, move_count, failed_at, created_at
         ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18,
            ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32, ?33, ?34, ?35
         )",
        params![
            id,
            r.event,
            r.site,
            r.date,
            r.round,
            r.white,
            r.black,
            r.result,
            r.white_elo,
            r.black_elo,
            r.white_title,
            r.black_title,
            r.white_team,
            r.black_team,
            r.white_fide_id,
            r.black_fide_id,
            r.eco,
            r.opening,
            r.variation,
            r.sub_variation,
            r.time_control,
            r.termination,
            r.annotator,
            r.ply_count,
            r.event_date,
            r.event_type,
            r.event_rounds,
            r.event_country,
            r.utc_date,
            r.utc_time,
            game.start_fen,
            moves,
            stored.len() as i64,
            game.failed_at().map(|i| i as i64),
            Utc::now().to_rfc3339(),
        ],
    )?;

    Ok(id)
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<GameRecord> {
    Ok(GameRecord {
        event: row.get("event")?,
        site: row.get("site")?,
        date: row.get("date")?,
        round: row.get("round")?,
        white: row.get("white")?,
        black: row.get("black")?,
        result: row.get("result")?,
        white_elo: row.get("white_elo")?,
        black_elo: row.get("black_elo")?,
        white_title: row.get("white_title")?,
        black_title: row.get("black_title")?,
        white_team: row.get("white_team")?,
        black_team: row.get("black_team")?,
        white_fide_id: row.get("white_fide_id")?,
        black_fide_id: row.get("black_fide_id")?,
        eco: row.get("eco")?,
        opening: row.get("opening")?,
        variation: row.get("variation")?,
        sub_variation: row.get("sub_variation")?,
        time_control: row.get("time_control")?,
        termination: row.get("termination")?,
        annotator: row.get("annotator")?,
        ply_count: row.get("ply_count")?,
        event_date: row.get("event_date")?,
        event_type: row.get("event_type")?,
        event_rounds: row.get("event_rounds")?,
        event_country: row.get("event_country")?,
        utc_date: row.get("utc_date")?,
        utc_time: row.get("utc_time")?,
    })
}

type StorageFields = (String, String, String, Option<i64>, String);

fn read_storage_fields(row: &Row<'_>) -> rusqlite::Result<StorageFields> {
    Ok((
        row.get("id")?,
        row.get("start_fen")?,
        row.get("moves")?,
        row.get("failed_at")?,
        row.get("created_at")?,
    ))
}
