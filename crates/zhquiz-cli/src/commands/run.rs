//! The `zhquiz run` command.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use zhquiz_core::config::load_config_from;
use zhquiz_core::logger::ResultLogger;
use zhquiz_core::model::{parse_kinds, Direction, Limit, Mode, Order};
use zhquiz_core::parser;
use zhquiz_core::session::{SessionEnd, SessionObserver, SessionReport, SessionRunner};
use zhquiz_core::QuizError;

/// Console progress reporter.
struct ConsoleReporter;

impl SessionObserver for ConsoleReporter {
    fn on_question(&self, number: usize, total: usize) {
        eprintln!("({number}/{total})");
    }

    fn on_log_error(&self, error: &QuizError) {
        eprintln!("Warning: {error}");
    }
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    dictionaries: String,
    direction: Option<String>,
    limit: Option<String>,
    seed: Option<u64>,
    sorted: bool,
    log: Option<PathBuf>,
    no_feedback: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    // Resolve the mode: flags win over config defaults
    let kinds = parse_kinds(&dictionaries).map_err(|e| anyhow::anyhow!("{e}"))?;
    let direction: Direction = match direction {
        Some(d) => d.parse().map_err(|e: String| anyhow::anyhow!("{e}"))?,
        None => config.direction()?,
    };
    let limit: Limit = match limit {
        Some(l) => l.parse().map_err(|e: String| anyhow::anyhow!("{e}"))?,
        None => config.limit()?,
    };
    let order = if sorted { Order::Sorted } else { Order::Shuffled };
    let mode = Mode::new(kinds, direction, limit).with_order(order);
    tracing::debug!(?mode, "resolved session mode");

    // Everything the session reads is loaded up front
    let store = parser::load_store(&config, &mode.kinds)?;
    let matcher = parser::load_matcher(&config)?;
    let log_path = log.unwrap_or_else(|| config.log_path());
    let logger = ResultLogger::new(&log_path);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let runner = SessionRunner::new(&store, &matcher, &logger)
        .with_feedback(config.feedback && !no_feedback);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let report = runner.run(
        &mode,
        &mut rng,
        &mut stdin.lock(),
        &mut stdout.lock(),
        &ConsoleReporter,
    );

    if let Some(e) = report.fatal_error() {
        anyhow::bail!("{e}");
    }

    if report.end == SessionEnd::InputExhausted {
        println!();
        println!("Input ended, session stopped early.");
    }
    print_summary(&report);

    let warnings = report.warnings().count();
    if warnings > 0 {
        eprintln!(
            "Warning: {warnings} result(s) could not be written to {}",
            log_path.display()
        );
    }

    Ok(())
}

fn print_summary(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Dictionary", "Correct", "Incorrect", "Accuracy"]);

    for (kind, tally) in &report.summary.per_kind {
        table.add_row(vec![
            Cell::new(kind),
            Cell::new(tally.correct),
            Cell::new(tally.incorrect),
            Cell::new(format!("{:.1}%", tally.accuracy() * 100.0)),
        ]);
    }

    let total = report.summary.total();
    let elapsed = report.finished_at - report.started_at;
    println!(
        "\nSession complete: {}/{} correct in {}s",
        total.correct,
        total.total(),
        elapsed.num_seconds()
    );
    if !report.summary.is_empty() {
        println!("{table}");
    }
}
