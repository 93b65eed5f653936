//! Output formatting: table, JSON, YAML, plain, plus JSON export files.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `line_fn` on each item to emit one line per item
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            if data.is_empty() {
                return Ok(String::new());
            }
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => data.iter().map(&line_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table and plain rendering use `detail_fn`, since reports are not rows.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    Ok(match format {
        OutputFormat::Table | OutputFormat::Plain => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Export ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Export<'a, T> {
    generated_at: String,
    result: &'a T,
}

/// Wrap `result` with a timestamp and render it as pretty JSON.
pub fn export_document<T: Serialize>(result: &T) -> Result<String, CliError> {
    let doc = Export {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        result,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Write the export document to `path` when one was requested.
pub fn write_export<T: Serialize>(path: Option<&Path>, result: &T) -> Result<(), CliError> {
    let Some(path) = path else {
        return Ok(());
    };
    std::fs::write(path, export_document(result)?)?;
    tracing::info!(path = %path.display(), "result exported");
    Ok(())
}

// ── Progress ─────────────────────────────────────────────────────────

/// Spinner on stderr while a remote operation runs; hidden when quiet or
/// not on a terminal.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Item {
        name: &'static str,
        id: u32,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { name: "web01", id: 1 }, Item { name: "db01", id: 2 }]
    }

    fn row(i: &Item) -> ItemRow {
        ItemRow {
            name: i.name.into(),
        }
    }

    #[test]
    fn plain_emits_one_line_per_item() {
        let out = render_list(OutputFormat::Plain, &items(), row, |i| i.name.into()).unwrap();
        assert_eq!(out, "web01\ndb01");
    }

    #[test]
    fn table_has_header_and_rows() {
        let out = render_list(OutputFormat::Table, &items(), row, |i| i.name.into()).unwrap();
        assert!(out.contains("Name"));
        assert!(out.contains("db01"));
        let empty: Vec<Item> = Vec::new();
        assert!(render_list(OutputFormat::Table, &empty, row, |i| i.name.into()).unwrap().is_empty());
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_list(OutputFormat::JsonCompact, &items(), row, |i| i.name.into()).unwrap();
        assert_eq!(out, r#"[{"name":"web01","id":1},{"name":"db01","id":2}]"#);
    }

    #[test]
    fn export_wraps_result_with_timestamp() {
        let doc: serde_json::Value =
            serde_json::from_str(&export_document(&items()).unwrap()).unwrap();
        assert_eq!(doc["result"][1]["name"], "db01");
        let stamp = doc["generated_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
    }

    #[test]
    fn export_is_skipped_without_path() {
        assert!(write_export(None, &items()).is_ok());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_export(Some(&path), &items()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"generated_at\""));
    }
}
