//! CLI module - Command-line interface definition and handler

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::core::render::{OutputFormat, RenderConfig};
use crate::core::tokenizer::{TokenizerConfig, DEFAULT_MAX_TAG_LEN};
use crate::flows::keystat::{InputSource, KeystatOptions};
use crate::logging::{self, Verbosity};

/// Where the capture agent writes its log by default
pub const DEFAULT_LOG_PATH: &str = "/var/log/keystroke.log";

/// keystat - key frequency statistics for keystroke logs.
#[derive(Parser, Debug)]
#[command(name = "keystat")]
#[command(
    author,
    version,
    about,
    long_about = r#"keystat reads a keystroke log, counts how often each key occurs and
prints the keys sorted by ascending frequency.

Every printable character is a key. A bracketed tag such as [left] or [shift]
counts as a single key when it starts a line. The agent's housekeeping markers
([keycount ...], [Keylogging begin], [Keylogging end]) are not counted.

Output formats:
- plain: one "key<TAB>count" line per key (default)
- jsonl: one JSON object per key
- json: a single JSON document with entries and run statistics
- md: a Markdown table

Examples:
    keystat
    keystat ~/keystroke.log --top 20
    cat keystroke.log | keystat - --format json --pretty
"#
)]
pub struct Cli {
    /// Log file to read (`-` for stdin).
    #[arg(
        value_name = "FILE",
        env = "KEYSTAT_LOG_FILE",
        default_value = DEFAULT_LOG_PATH,
        long_help = "Keystroke log to read. Use `-` to read from standard input.\n\n\
If omitted, KEYSTAT_LOG_FILE is used, then /var/log/keystroke.log."
    )]
    pub file: PathBuf,

    /// Output format (plain/jsonl/json/md).
    #[arg(
        long,
        default_value = "plain",
        value_parser = ["plain", "jsonl", "json", "md"],
        value_name = "FORMAT"
    )]
    pub format: String,

    /// Pretty-print the JSON document with indentation (JSONL stays one object per line).
    #[arg(long)]
    pub pretty: bool,

    /// Maximum bytes kept from one bracketed tag.
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_TAG_LEN,
        value_name = "N",
        long_help = "Maximum bytes kept from one bracketed tag, including the opening bracket.\n\n\
Longer tags are still consumed up to their closing bracket, counted under their\n\
truncated text and reported as chopped."
    )]
    pub max_tag_len: usize,

    /// Only report the N most frequent keys.
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Print run statistics to stderr.
    #[arg(
        long,
        long_help = "Print run statistics (keys counted, meta tags, sessions) to stderr after the report."
    )]
    pub summary: bool,

    /// Quiet mode (warnings only).
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (trace every counted token).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    logging::init(Verbosity::from_flags(cli.quiet, cli.verbose));

    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let opts = KeystatOptions {
        input: InputSource::from_path(&cli.file),
        tokenizer: TokenizerConfig::with_max_tag_len(cli.max_tag_len)?,
        top: cli.top,
        show_summary: cli.summary,
    };

    crate::flows::keystat::run_keystat(opts, render_config)
}
