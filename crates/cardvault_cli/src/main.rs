//! CLI entry point.
//!
//! # Responsibility
//! - Verify `cardvault_core` linkage (`ping`).
//! - Inspect, import and export a card database from the shell.

use cardvault_core::{Card, CardService, SqliteCardStorage};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cardvault", version, about = "CardVault card store tools")]
struct Cli {
    /// Write core logs to this directory at the build's default level.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage probe and version.
    Ping,
    /// List all cards, most recent first.
    List {
        #[arg(long)]
        db: PathBuf,
    },
    /// Case-insensitive search over name, company, email, phone and title.
    Search {
        #[arg(long)]
        db: PathBuf,
        query: String,
    },
    /// Import a JSON array of card fields, skipping duplicates.
    Import {
        #[arg(long)]
        db: PathBuf,
        file: PathBuf,
    },
    /// Print the whole collection as JSON.
    Export {
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = match &cli.log_dir {
        Some(log_dir) => init_logging(log_dir),
        None => Ok(()),
    };
    match outcome.and_then(|()| run(cli.command.unwrap_or(Command::Ping))) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Ping => {
            println!("cardvault_core ping={}", cardvault_core::ping());
            println!("cardvault_core version={}", cardvault_core::core_version());
        }
        Command::List { db } => {
            let service = open_service(&db)?;
            service.list().iter().for_each(print_card);
        }
        Command::Search { db, query } => {
            let service = open_service(&db)?;
            service.search(&query).iter().for_each(print_card);
        }
        Command::Import { db, file } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            let mut service = open_service(&db)?;
            let summary = service.import_json(&raw).map_err(|err| err.to_string())?;
            println!(
                "imported={} skipped={}",
                summary.inserted.len(),
                summary.rejected.len()
            );
            for rejection in &summary.rejected {
                println!("skipped index={} reason={:?}", rejection.index, rejection.reason);
            }
        }
        Command::Export { db } => {
            let service = open_service(&db)?;
            println!("{}", service.export_json().map_err(|err| err.to_string())?);
        }
    }
    Ok(())
}

fn init_logging(log_dir: &Path) -> Result<(), String> {
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| format!("cannot resolve log dir: {err}"))?
            .join(log_dir)
    };
    cardvault_core::init_logging(
        cardvault_core::default_log_level(),
        &log_dir.to_string_lossy(),
    )
}

fn open_service(db: &Path) -> Result<CardService<SqliteCardStorage>, String> {
    let storage = SqliteCardStorage::open(db)
        .map_err(|err| format!("cannot open `{}`: {err}", db.display()))?;
    CardService::open(storage).map_err(|err| err.to_string())
}

fn print_card(card: &Card) {
    println!(
        "{}\t{}\t{}\t{}",
        card.id,
        card.name,
        card.company.as_deref().unwrap_or("-"),
        card.email.as_deref().unwrap_or("-")
    );
}
