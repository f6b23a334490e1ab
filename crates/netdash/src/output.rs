//! Output formatting: table, JSON, plain, plus toast rendering.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use netdash_core::{NotificationEntry, NotificationKind};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Plain => data.iter().map(id_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single item. Table mode uses the pre-formatted `detail_fn`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Plain => id_fn(data),
    })
}

pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Toasts ───────────────────────────────────────────────────────────

fn toast_marker(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Success => "✔",
        NotificationKind::Error => "✖",
        NotificationKind::Warning => "!",
        NotificationKind::Info => "i",
        NotificationKind::Loading => "…",
    }
}

/// One line per toast, `marker title: message`.
pub fn render_toasts(entries: &[NotificationEntry], color: bool) -> String {
    entries
        .iter()
        .map(|entry| {
            let marker = toast_marker(entry.kind);
            let marker = if color {
                match entry.kind {
                    NotificationKind::Success => marker.green().to_string(),
                    NotificationKind::Error => marker.red().to_string(),
                    NotificationKind::Warning => marker.yellow().to_string(),
                    NotificationKind::Info | NotificationKind::Loading => marker.cyan().to_string(),
                }
            } else {
                marker.to_owned()
            };
            let title = if color {
                entry.title.bold().to_string()
            } else {
                entry.title.clone()
            };
            match entry.message {
                Some(ref message) => format!("{marker} {title}: {message}"),
                None => format!("{marker} {title}"),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Toasts go to stderr so they never mix with machine-readable stdout.
pub fn print_toasts(entries: &[NotificationEntry], color: bool, quiet: bool) {
    if quiet || entries.is_empty() {
        return;
    }
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", render_toasts(entries, color));
}
