use anyhow::{Context, Result};
use chess_archive::{ArchiveConfig, Importer, Storage};
use chess_engine::{format_movetext, GameResult};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chess-archive")]
#[command(about = "Import PGN collections into a SQLite game archive")]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "archive.toml")]
    config: PathBuf,
    /// Database file, overriding the configuration
    #[arg(long)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Import every game of a PGN file
    Import {
        /// PGN file to read
        file: PathBuf,
        /// Worker threads, overriding the configuration
        #[arg(short, long)]
        threads: Option<usize>,
        /// Store only games whose moves all resolved
        #[arg(long)]
        complete_only: bool,
    },
    /// Show one stored game
    Show {
        /// Game id printed by `import` or `list`
        id: String,
    },
    /// List stored games
    List {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Print archive totals
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = ArchiveConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    let database = cli.database.clone().unwrap_or_else(|| config.database.clone());
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let mut storage = Storage::open(&database)
        .with_context(|| format!("Failed to open database {}", database.display()))?;

    match cli.command {
        Commands::Import {
            file,
            threads,
            complete_only,
        } => {
            let importer = Importer::new(threads.or(config.threads))?;
            let report = importer.import_file(&file)?;
            for game in report.games.iter().filter(|g| !g.is_complete()) {
                if let Some(failure) = &game.failure {
                    eprintln!("Game {}: {}", game.index + 1, failure);
                }
            }

            let store_partial = config.store_partial_games && !complete_only;
            let summary = storage.save_games(&report.games, store_partial)?;
            println!(
                "Imported {} games: {} complete, {} partial, {} not stored",
                report.games.len(),
                report.complete(),
                summary.partial,
                summary.rejected
            );
        }
        Commands::Show { id } => {
            let Some(game) = storage.load_game(&id)? else {
                anyhow::bail!("No game with id {id}");
            };
            for (name, value) in game.record.tags() {
                println!("[{name} \"{value}\"]");
            }
            let replay = game.replay()?;
            println!();
            println!("{}", format_movetext(&replay.start, replay.san.as_slice(), None));
            if let Some(index) = game.failed_at {
                println!("(stopped at token {})", index + 1);
            }
            let legal = replay.position.legal_moves();
            let outcome = chess_engine::evaluate(&replay.position, legal.as_slice());
            match outcome.result(replay.position.side_to_move()) {
                Some(result) => println!("Final position: {}", describe(result)),
                None => println!("Final position: {}", replay.position.to_fen()),
            }
        }
        Commands::List { limit } => {
            for game in storage.list_games(limit)? {
                println!(
                    "{}  {} - {}  {}  {} plies{}",
                    game.id,
                    game.white.as_deref().unwrap_or("?"),
                    game.black.as_deref().unwrap_or("?"),
                    game.result.as_deref().unwrap_or("*"),
                    game.move_count,
                    if game.partial { " (partial)" } else { "" }
                );
            }
        }
        Commands::Stats => {
            let stats = storage.stats()?;
            println!("Games:      {}", stats.games);
            println!("Partial:    {}", stats.partial);
            println!("White wins: {}", stats.white_wins);
            println!("Black wins: {}", stats.black_wins);
            println!("Draws:      {}", stats.draws);
        }
    }

    Ok(())
}

fn describe(result: GameResult) -> String {
    match result {
        GameResult::WhiteWins => "1-0 (checkmate)".to_string(),
        GameResult::BlackWins => "0-1 (checkmate)".to_string(),
        GameResult::Draw(reason) => format!("1/2-1/2 ({reason:?})"),
    }
}
