//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `todo_core` linkage against a real database file.
//! - Open the store (which normalizes it), print counters and one projection.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `todo_cli [DB_PATH] [all|pending|completed]`

use std::process::ExitCode;
use todo_core::db::open_db;
use todo_core::{
    init_logging_for, SqliteKvStore, StoreConfig, SystemClock, TaskFilter, TaskStore,
};

fn main() -> ExitCode {
    println!("todo_core ping={}", todo_core::ping());
    println!("todo_core version={}", todo_core::core_version());

    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut args = args.into_iter();
    let mut config = StoreConfig::default();
    if let Some(db_path) = args.next() {
        config = config.with_db_path(db_path);
    }
    let filter = match args.next() {
        Some(name) => name.parse::<TaskFilter>()?,
        None => TaskFilter::default(),
    };
    config.validate()?;
    init_logging_for(&config)?;

    let conn = open_db(&config.db_path)?;
    let kv = SqliteKvStore::try_new(&conn)?;
    let store = TaskStore::open_with_key(kv, SystemClock, &config.storage_key)?;
    log::info!("event=cli_probe module=cli status=ok filter={filter}");

    let stats = store.stats();
    println!(
        "tasks total={} completed={} pending={}",
        stats.total, stats.completed, stats.pending
    );

    let projection = store.project(filter);
    if let Some(empty) = projection.empty_state() {
        println!("[{filter}] {} - {}", empty.title, empty.hint);
        return Ok(());
    }
    for task in &projection.items {
        let mark = if task.completed { 'x' } else { ' ' };
        println!("[{mark}] {} {}", task.id, task.text);
    }
    Ok(())
}
