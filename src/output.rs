//! Output formatting and reporting.
//!
//! [`OutputFormatter`] styles console text; [`Reporter`] routes operation
//! outcomes to the session log, the console, or both.

use crate::file_category::Classification;
use crate::file_organizer::OperationRecord;
use crate::session_log::{Level, SessionLog};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Styled console output over any writer.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Summary tables with statistics
pub struct OutputFormatter<W: Write> {
    out: W,
}

impl<W: Write> OutputFormatter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.write_all(b"\n")) {
            log::debug!("console write failed: {}", e);
        }
    }

    /// Writes text without a trailing newline and flushes, for prompts.
    pub fn prompt(&mut self, text: &str) {
        if let Err(e) = write!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            log::debug!("console write failed: {}", e);
        }
    }

    pub fn success(&mut self, message: &str) {
        self.line(format_args!("{} {}", "✓".green(), message));
    }

    pub fn error(&mut self, message: &str) {
        self.line(format_args!("{} {}", "✗".red(), message));
    }

    pub fn warning(&mut self, message: &str) {
        self.line(format_args!("{} {}", "⚠".yellow(), message));
    }

    pub fn info(&mut self, message: &str) {
        self.line(format_args!("{}", message.cyan()));
    }

    pub fn plain(&mut self, message: &str) {
        self.line(format_args!("{}", message));
    }

    pub fn header(&mut self, header: &str) {
        self.line(format_args!("\n{}", header.bold()));
    }

    pub fn dry_run_notice(&mut self, message: &str) {
        self.line(format_args!("{}", format!("[DRY RUN] {}", message).yellow()));
    }

    /// Prints a summary table with file counts by category.
    pub fn summary_table(&mut self, category_counts: &HashMap<String, usize>, total_files: usize) {
        self.header("SUMMARY");

        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let width = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        self.line(format_args!(
            "{:<width$} | {}",
            "Category".bold(),
            "Files".bold(),
            width = width
        ));
        self.line(format_args!("{}", "-".repeat(width + 10)));

        for (category, count) in &categories {
            self.line(format_args!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(**count),
                width = width
            ));
        }

        self.line(format_args!("{}", "-".repeat(width + 10)));
        self.line(format_args!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        ));
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Creates a progress bar for a batch of file moves.
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    match ProgressStyle::default_bar()
        .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("█▓░")),
        Err(e) => log::debug!("invalid progress bar template: {}", e),
    }
    pb
}

/// Where a reported line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Log,
    Console,
    Both,
}

impl Destination {
    fn to_log(self) -> bool {
        matches!(self, Destination::Log | Destination::Both)
    }

    fn to_console(self) -> bool {
        matches!(self, Destination::Console | Destination::Both)
    }
}

/// Counts of outcomes in one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchTotals {
    pub fn from_records(records: &[OperationRecord]) -> Self {
        records.iter().fold(Self::default(), |mut totals, record| {
            if record.is_moved() {
                totals.moved += 1;
            } else if record.is_skipped() {
                totals.skipped += 1;
            } else {
                totals.failed += 1;
            }
            totals
        })
    }
}

/// Sends outcomes to the session log and/or the console.
pub struct Reporter<'a, W: Write> {
    log: &'a mut SessionLog,
    console: &'a mut OutputFormatter<W>,
}

impl<'a, W: Write> Reporter<'a, W> {
    pub fn new(log: &'a mut SessionLog, console: &'a mut OutputFormatter<W>) -> Self {
        Self { log, console }
    }

    pub fn console(&mut self) -> &mut OutputFormatter<W> {
        &mut *self.console
    }

    /// Emits a free-form message.
    pub fn emit(&mut self, level: Level, message: &str, destination: Destination) {
        if destination.to_log() {
            self.log.write(level, message);
        }
        if destination.to_console() {
            match level {
                Level::Info => self.console.plain(message),
                Level::Warning => self.console.warning(message),
                Level::Error => self.console.error(message),
            }
        }
    }

    /// Emits a single operation record.
    pub fn record(&mut self, record: &OperationRecord, destination: Destination) {
        let message = record.message();
        if destination.to_log() {
            self.log.write(record.level(), &message);
        }
        if destination.to_console() {
            match record.level() {
                Level::Info if record.dry_run => self.console.plain(&format!("  - {}", message)),
                Level::Info => self.console.success(&message),
                Level::Warning => self.console.warning(&message),
                Level::Error => self.console.error(&message),
            }
        }
    }

    /// Emits every record in order.
    pub fn report(&mut self, records: &[OperationRecord], destination: Destination) {
        for record in records {
            self.record(record, destination);
        }
    }

    /// Prints the per-category table and logs the batch totals.
    pub fn summary(&mut self, records: &[OperationRecord], dry_run: bool) -> BatchTotals {
        let totals = BatchTotals::from_records(records);

        let mut counts: HashMap<String, usize> = HashMap::new();
        for record in records.iter().filter(|r| r.is_moved()) {
            *counts.entry(record.category.clone()).or_insert(0) += 1;
        }
        if !counts.is_empty() {
            self.console.summary_table(&counts, totals.moved);
        }

        let verb = if dry_run { "would move" } else { "moved" };
        let line = format!(
            "{} {}, {} skipped, {} failed",
            totals.moved, verb, totals.skipped, totals.failed
        );
        self.log.info(&line);
        if totals.failed > 0 {
            self.console.error(&line);
        } else {
            self.console.info(&line);
        }
        totals
    }

    /// Lists classified files: each file to the console, a count to both.
    pub fn listing(&mut self, target_dir: &Path, classified: &[Classification]) {
        if classified.is_empty() {
            self.emit(
                Level::Info,
                &format!("No files to list in {}", target_dir.display()),
                Destination::Both,
            );
            return;
        }
        for item in classified {
            self.emit(
                Level::Info,
                &format!("  - {}  [{}]", item.entry.name, item.category),
                Destination::Console,
            );
        }
        self.emit(
            Level::Info,
            &format!(
                "Listed {} {} in {}",
                classified.len(),
                plural(classified.len()),
                target_dir.display()
            ),
            Destination::Both,
        );
    }
}
