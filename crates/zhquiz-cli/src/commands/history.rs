//! The `zhquiz history` command.

use std::path::PathBuf;

use anyhow::Result;

use zhquiz_core::config::load_config_from;
use zhquiz_core::logger::read_log;
use zhquiz_core::statistics::{compute_history, HistoryStats};

pub fn execute(log: Option<PathBuf>, weakest: usize, config_path: Option<PathBuf>) -> Result<()> {
    let log_path = match log {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.log_path(),
    };

    let records = read_log(&log_path)?;
    if records.is_empty() {
        println!("No study history in {}", log_path.display());
        return Ok(());
    }

    let stats = compute_history(&records);
    print_history(&stats, weakest);
    Ok(())
}

fn print_history(stats: &HistoryStats, weakest: usize) {
    use comfy_table::{Cell, Table};

    let total = stats.total();
    println!(
        "{} answers over {} session(s), {:.1}% correct",
        total.total(),
        stats.sessions,
        total.accuracy() * 100.0
    );
    if let (Some(first), Some(last)) = (stats.first_seen, stats.last_seen) {
        println!(
            "Studied from {} to {}",
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }

    let mut table = Table::new();
    table.set_header(vec!["Dictionary", "Correct", "Incorrect", "Accuracy"]);
    for (kind, tally) in &stats.per_kind {
        table.add_row(vec![
            Cell::new(kind),
            Cell::new(tally.correct),
            Cell::new(tally.incorrect),
            Cell::new(format!("{:.1}%", tally.accuracy() * 100.0)),
        ]);
    }
    println!("\n{table}");

    let missed = stats.weakest(weakest);
    if missed.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Item", "Dictionary", "Prompt", "Missed", "Accuracy"]);
    for item in missed {
        table.add_row(vec![
            Cell::new(&item.item_id),
            Cell::new(item.kind),
            Cell::new(&item.prompt),
            Cell::new(format!("{}/{}", item.tally.incorrect, item.tally.total())),
            Cell::new(format!("{:.1}%", item.tally.accuracy() * 100.0)),
        ]);
    }
    println!("\nMost missed:\n{table}");
}
