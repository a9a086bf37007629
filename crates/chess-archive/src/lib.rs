//! Game archive built on the rules engine.
//!
//! PGN documents are split into games, each game's moves are resolved in
//! parallel across games, and the results are stored in SQLite together
//! with their typed metadata:
//!
//! - [`record`] - the fixed metadata schema and the stored move form
//! - [`import`] - parallel, cancellable resolution of extracted games
//! - [`storage`] - the SQLite archive and replay of stored games
//! - [`config`] - `archive.toml` settings

pub mod config;
pub mod import;
pub mod record;
pub mod storage;

pub use config::{ArchiveConfig, ConfigError};
pub use import::{import_game, ImportError, ImportFailure, ImportReport, ImportedGame, Importer};
pub use record::{GameRecord, StoredMove, TAG_NAMES};
pub use storage::{
    ArchiveStats, GameSummary, Replay, SaveSummary, Storage, StorageError, StoredGame,
};
