//! Output formatting and logging utilities

use lattice::LatticeSnapshot;
use std::fmt;
use std::fmt::Write as _;
use std::fs::File;
use std::time::SystemTime as StdSystemTime;
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Writer, fmt::layer, fmt::time::FormatTime,
    layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let elapsed = StdSystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        write!(
            w,
            "{:02}:{:02}:{:02}",
            (elapsed / 3600) % 24,
            (elapsed / 60) % 60,
            elapsed % 60
        )
    }
}

/// Setup output logging to file or stdout
///
/// Trace events (one per trial move) are only let through when `trace` is set.
pub fn setup_output(output_path: Option<&String>, trace: bool) {
    let level = if trace {
        LevelFilter::TRACE
    } else {
        LevelFilter::DEBUG
    };
    match output_path {
        Some(path) => match File::create(path) {
            Ok(log) => {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false)
                    .with_filter(level);
                Registry::default().with(file_layer).init();
                info!("Log written to: {}", path);
            }
            Err(err) => eprintln!("Could not create log file {}: {}", path, err),
        },
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true)
                .with_filter(level);
            Registry::default().with(stdout_layer).init();
        }
    }
}

/// Render a snapshot as rows of `+`/`-`, top row first.
pub fn format_snapshot(snapshot: &LatticeSnapshot) -> String {
    let mut out = String::with_capacity(snapshot.states.len() * 2 + snapshot.height);
    for row in snapshot.states.chunks(snapshot.width.max(1)) {
        let line: Vec<&str> = row
            .iter()
            .map(|&s| if s > 0 { "+" } else { "-" })
            .collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}
