//! Keystat flow - Count key frequencies in a keystroke log
//!
//! Pipeline: input -> Tokenizer -> meta-tag filter -> FrequencyDictionary
//! -> sort -> Renderer. Diagnostics go to the tracing subscriber (stderr),
//! the report goes to stdout.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::error::KeystatError;
use crate::core::meta::MetaTag;
use crate::core::model::{FrequencyDictionary, RunStats, SortedFrequencies};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::tokenizer::{Diagnostic, Tokenizer, TokenizerConfig};

/// Where the log is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` selects standard input, anything else is a path
    pub fn from_path(path: &Path) -> Self {
        if path == Path::new("-") {
            InputSource::Stdin
        } else {
            InputSource::File(path.to_path_buf())
        }
    }

    /// Name used in diagnostics
    pub fn display_name(&self) -> String {
        match self {
            InputSource::Stdin => "-".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }

    /// Open the source; the handle is closed when dropped
    pub fn open(&self) -> Result<Box<dyn Read>, KeystatError> {
        match self {
            InputSource::Stdin => Ok(Box::new(io::stdin().lock())),
            InputSource::File(path) => {
                let file = File::open(path).map_err(|source| KeystatError::Open {
                    path: path.clone(),
                    source,
                })?;
                Ok(Box::new(file))
            }
        }
    }
}

/// Result of one counting pass
#[derive(Debug)]
pub struct KeystatOutcome {
    pub frequencies: SortedFrequencies,
    pub stats: RunStats,
}

/// Tokenize `reader`, count non-meta tokens and sort them by frequency.
///
/// Every diagnostic is handed to `on_diagnostic` as soon as it is found.
pub fn compute_keystat<R: Read>(
    reader: R,
    source: &str,
    config: TokenizerConfig,
    mut on_diagnostic: impl FnMut(&Diagnostic),
) -> Result<KeystatOutcome, KeystatError> {
    let started = Instant::now();
    let mut tokenizer = Tokenizer::new(reader, config);
    let mut dict = FrequencyDictionary::new();
    let mut stats = RunStats {
        source: source.to_string(),
        ..Default::default()
    };

    loop {
        let next = tokenizer.next_token()?;
        for diagnostic in tokenizer.drain_diagnostics() {
            if matches!(diagnostic, Diagnostic::Unprintable { .. }) {
                stats.unprintable_bytes += 1;
            }
            on_diagnostic(&diagnostic);
        }
        let Some(token) = next else {
            break;
        };

        if let Some(tag) = MetaTag::classify(&token.text) {
            stats.meta_tags_filtered += 1;
            stats.sessions.record(&tag);
            continue;
        }

        if token.chopped {
            stats.chopped_tokens += 1;
            on_diagnostic(&Diagnostic::Chopped {
                position: token.start,
                text: token.text.clone(),
            });
        }

        debug!(
            line = token.start.line,
            col = token.start.col,
            offset = token.start.offset,
            len = token.len(),
            "token '{}'",
            token.text
        );
        dict.lookup_or_init(&token.text);
        stats.tokens_counted += 1;
    }

    stats.bytes_read = tokenizer.cursor().position().offset;
    stats.distinct_keys = dict.len();
    stats.elapsed_secs = started.elapsed().as_secs_f64();
    debug_assert_eq!(stats.meta_tags_filtered, stats.sessions.total());
    info!("counting frequencies took {:.6} secs", stats.elapsed_secs);

    let frequencies = dict.sort_by_count_ascending();
    debug_assert_eq!(frequencies.total(), stats.tokens_counted);

    Ok(KeystatOutcome { frequencies, stats })
}

/// Options for the keystat command
#[derive(Debug, Clone)]
pub struct KeystatOptions {
    pub input: InputSource,
    pub tokenizer: TokenizerConfig,
    /// Report only the N most frequent keys
    pub top: Option<usize>,
    /// Print run statistics to stderr
    pub show_summary: bool,
}

/// Run the keystat command
pub fn run_keystat(opts: KeystatOptions, config: RenderConfig) -> Result<()> {
    let source = opts.input.display_name();
    if opts.input == InputSource::Stdin {
        info!("using stdin");
    }

    debug!(
        max_tag_len = opts.tokenizer.max_tag_len(),
        "reading {}", source
    );
    let reader = opts.input.open()?;
    let outcome = compute_keystat(reader, &source, opts.tokenizer, |diagnostic| {
        warn!("{}:{}", source, diagnostic);
    })?;

    let entries = match opts.top {
        Some(n) => outcome.frequencies.top(n),
        None => outcome.frequencies.entries(),
    };

    let renderer = Renderer::with_config(config);
    renderer
        .render_to(entries, &outcome.stats, io::stdout().lock())
        .map_err(KeystatError::Write)
        .context("writing frequency report")?;

    if opts.show_summary {
        print_summary(&outcome.stats);
    }

    Ok(())
}

fn print_summary(stats: &RunStats) {
    eprintln!("Keystat Summary ({})", stats.source);
    eprintln!("   Bytes read:     {}", stats.bytes_read);
    eprintln!("   Keys counted:   {}", stats.tokens_counted);
    eprintln!("   Distinct keys:  {}", stats.distinct_keys);
    eprintln!("   Meta tags:      {}", stats.meta_tags_filtered);
    if stats.chopped_tokens > 0 {
        eprintln!("   Chopped tags:   {}", stats.chopped_tokens);
    }
    if stats.unprintable_bytes > 0 {
        eprintln!("   Unprintable:    {}", stats.unprintable_bytes);
    }

    let sessions = &stats.sessions;
    eprintln!(
        "   Sessions:       {} begun, {} ended",
        sessions.sessions_begun, sessions.sessions_ended
    );
    if let Some(last) = sessions.last_keycount {
        eprintln!("   Agent keycount: {}", last);
    }
    if let (Some(first), Some(last)) = (sessions.first_timestamp, sessions.last_timestamp) {
        eprintln!("   Span:           {} .. {}", first, last);
    }
    eprintln!();
}
