//! keystat - key frequency statistics for keystroke logs
//!
//! keystat provides:
//! - A tag-aware tokenizer for the capture agent's log format
//! - Filtering of the agent's housekeeping markers
//! - Per-key frequency counting, sorted by ascending count
//! - Output as plain text, jsonl, json or Markdown

use anyhow::Result;
use clap::Parser;

mod cli;
mod core;
mod flows;
mod logging;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
