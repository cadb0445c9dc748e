//! Renderer module
//!
//! Renders the sorted frequency table to different output formats: plain, jsonl, json, md

use serde::Serialize;
use std::io::Write;

use crate::core::model::{Entry, RunStats};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    Jsonl,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(OutputFormat::Plain),
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    /// Create a new render config with pretty option
    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Full JSON document: entries plus run statistics
#[derive(Serialize)]
struct JsonReport<'a> {
    entries: &'a [Entry],
    stats: &'a RunStats,
}

/// Renderer for frequency reports
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    /// Create a new renderer with render config
    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render entries to a string. Non-empty output always ends with a newline.
    pub fn render(&self, entries: &[Entry], stats: &RunStats) -> String {
        match self.config.format {
            OutputFormat::Plain => self.render_plain(entries),
            OutputFormat::Jsonl => self.render_jsonl(entries),
            OutputFormat::Json => self.render_json(entries, stats),
            OutputFormat::Markdown => self.render_markdown(entries),
        }
    }

    /// Render to a writer
    pub fn render_to<W: Write>(
        &self,
        entries: &[Entry],
        stats: &RunStats,
        mut writer: W,
    ) -> std::io::Result<()> {
        let output = self.render(entries, stats);
        writer.write_all(output.as_bytes())?;
        writer.flush()
    }

    /// One `key<TAB>count` line per entry
    fn render_plain(&self, entries: &[Entry]) -> String {
        let mut output = String::new();
        for entry in entries {
            output.push_str(&format!("{}\t{}\n", entry.key, entry.count));
        }
        output
    }

    /// Render as JSON Lines (one JSON object per entry); `pretty` does not apply
    fn render_jsonl(&self, entries: &[Entry]) -> String {
        let mut output = String::new();
        for line in entries
            .iter()
            .filter_map(|entry| serde_json::to_string(entry).ok())
        {
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    /// Render as a single JSON document
    fn render_json(&self, entries: &[Entry], stats: &RunStats) -> String {
        let report = JsonReport { entries, stats };
        let mut output = if self.config.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
        .unwrap_or_else(|_| "{}".to_string());
        output.push('\n');
        output
    }

    /// Render as a Markdown table
    fn render_markdown(&self, entries: &[Entry]) -> String {
        let mut output = String::from("| Key | Count |\n|-----|-------|\n");
        for entry in entries {
            output.push_str(&format!(
                "| `{}` | {} |\n",
                escape_md_cell(&entry.key),
                entry.count
            ));
        }
        output
    }
}

/// Keep a key from breaking out of its table cell
fn escape_md_cell(key: &str) -> String {
    key.replace('|', "\\|").replace('`', "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<Entry> {
        vec![
            Entry {
                key: "[left]".to_string(),
                count: 1,
            },
            Entry {
                key: "e".to_string(),
                count: 4,
            },
        ]
    }

    fn render(format: OutputFormat) -> String {
        Renderer::with_config(RenderConfig::with_pretty(format, false))
            .render(&entries(), &RunStats::default())
    }

    #[test]
    fn test_render_plain() {
        assert_eq!(render(OutputFormat::Plain), "[left]\t1\ne\t4\n");
    }

    #[test]
    fn test_render_plain_empty() {
        let renderer = Renderer::with_config(RenderConfig::default());
        assert_eq!(renderer.render(&[], &RunStats::default()), "");
    }

    #[test]
    fn test_render_jsonl() {
        let output = render(OutputFormat::Jsonl);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["key"], "[left]");
        assert_eq!(first["count"], 1);
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_render_jsonl_ignores_pretty() {
        let output = Renderer::with_config(RenderConfig::with_pretty(OutputFormat::Jsonl, true))
            .render(&entries(), &RunStats::default());
        assert_eq!(output, render(OutputFormat::Jsonl));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_render_json_includes_stats() {
        let output = render(OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["entries"].as_array().unwrap().len(), 2);
        assert_eq!(value["entries"][1]["key"], "e");
        assert!(value["stats"]["tokens_counted"].is_number());
        assert!(value["stats"]["sessions"].is_object());
    }

    #[test]
    fn test_render_markdown() {
        let output = render(OutputFormat::Markdown);
        assert!(output.starts_with("| Key | Count |"));
        assert!(output.contains("| `[left]` | 1 |"));
    }

    #[test]
    fn test_escape_md_cell() {
        assert_eq!(escape_md_cell("|"), "\\|");
        assert_eq!(escape_md_cell("`"), "'");
        assert_eq!(escape_md_cell("a"), "a");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert_eq!("JSONL".parse::<OutputFormat>().unwrap(), OutputFormat::Jsonl);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_to_writer() {
        let renderer = Renderer::with_config(RenderConfig::default());
        let mut buf = Vec::new();
        renderer
            .render_to(&entries(), &RunStats::default(), &mut buf)
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "[left]\t1\ne\t4\n");
    }
}
