//! Progress reporting for export and import runs
//!
//! Both pipelines report a non-decreasing document count and an optional
//! known total through the narrow [`ProgressReporter`] capability. Rendering
//! never fails the caller: when a progress bar cannot be drawn the reporter
//! degrades to a periodic plain-text line, and a silent reporter is available
//! for quiet runs.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Minimum time between two plain-text progress lines.
const PLAIN_INTERVAL: Duration = Duration::from_secs(2);

/// Receives progress updates from a running pipeline.
pub trait ProgressReporter: Send + Sync {
    /// Record that `current` documents have been processed so far.
    fn report(&self, current: u64, total: Option<u64>);

    /// Called once when the run ends, on success or failure.
    fn finish(&self) {}
}

/// Build the reporter for a run.
///
/// # Arguments
/// * `total` - Total number of documents if known (None for unknown)
/// * `enabled` - Whether any progress should be shown
/// * `verb` - Word used in plain-text lines, e.g. "Exported"
pub fn reporter(total: Option<u64>, enabled: bool, verb: &'static str) -> Box<dyn ProgressReporter> {
    if !enabled {
        return Box::new(SilentReporter);
    }

    match BarReporter::new(total) {
        Some(bar) => Box::new(bar),
        None => Box::new(PlainReporter::new(verb)),
    }
}

/// Reporter that renders nothing.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _current: u64, _total: Option<u64>) {}
}

/// Progress bar reporter backed by indicatif
///
/// Shows a bar when the total is known and a spinner otherwise, with the
/// current throughput as the message.
pub struct BarReporter {
    bar: ProgressBar,
    start_time: Instant,
}

impl BarReporter {
    /// Create a bar reporter, or `None` when the bar cannot be rendered
    /// (unusable template or no terminal on stderr).
    pub fn new(total: Option<u64>) -> Option<Self> {
        let bar = match total {
            Some(n) => {
                let style = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .ok()?
                    .progress_chars("#>-");
                let bar = ProgressBar::new(n);
                bar.set_style(style);
                bar
            }
            None => {
                let style = ProgressStyle::default_spinner()
                    .template("{spinner:.green} {pos} documents {msg}")
                    .ok()?;
                let bar = ProgressBar::new_spinner();
                bar.set_style(style);
                bar
            }
        };

        if bar.is_hidden() {
            debug!("stderr is not a terminal, using plain progress output");
            return None;
        }

        Some(Self {
            bar,
            start_time: Instant::now(),
        })
    }
}

impl ProgressReporter for BarReporter {
    fn report(&self, current: u64, total: Option<u64>) {
        if let Some(total) = total {
            if self.bar.length() != Some(total) {
                self.bar.set_length(total);
            }
        }
        self.bar.set_position(current);

        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let speed = current as f64 / elapsed;
            self.bar.set_message(format!("({:.0} docs/sec)", speed));
        }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Plain-text reporter used when no progress bar is available
///
/// Prints `"<verb> <current>/<total> documents..."` to stderr at most once
/// per interval, plus a final line when the known total is reached.
pub struct PlainReporter {
    verb: &'static str,
    interval: Duration,
    last_line: Mutex<Option<Instant>>,
}

impl PlainReporter {
    pub fn new(verb: &'static str) -> Self {
        Self::with_interval(verb, PLAIN_INTERVAL)
    }

    pub fn with_interval(verb: &'static str, interval: Duration) -> Self {
        Self {
            verb,
            interval,
            last_line: Mutex::new(None),
        }
    }

    /// Format one progress line.
    pub fn line(&self, current: u64, total: Option<u64>) -> String {
        match total {
            Some(total) => format!("{} {}/{} documents...", self.verb, current, total),
            None => format!("{} {} documents...", self.verb, current),
        }
    }

    /// Whether a line is due now. Updates the throttle state when it is.
    fn due(&self, current: u64, total: Option<u64>) -> bool {
        let Ok(mut last) = self.last_line.lock() else {
            return false;
        };
        let reached_total = total.is_some_and(|t| current >= t);
        let now = Instant::now();
        let due = match *last {
            None => true,
            Some(at) => reached_total || now.duration_since(at) >= self.interval,
        };
        if due {
            *last = Some(now);
        }
        due
    }
}

impl ProgressReporter for PlainReporter {
    fn report(&self, current: u64, total: Option<u64>) {
        if self.due(current, total) {
            eprintln!("{}", self.line(current, total));
        }
    }
}

/// Reporter that records every update, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    updates: Mutex<Vec<(u64, Option<u64>)>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub(crate) fn updates(&self) -> Vec<(u64, Option<u64>)> {
        self.updates.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ProgressReporter for RecordingReporter {
    fn report(&self, current: u64, total: Option<u64>) {
        self.updates.lock().unwrap().push((current, total));
    }
}
