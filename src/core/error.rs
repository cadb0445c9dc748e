//! Error types for keystat

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeystatError {
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read keystroke log")]
    Read(#[source] io::Error),

    #[error("failed to write report")]
    Write(#[source] io::Error),

    #[error("tag capacity must be at least 1 byte, got {0}")]
    InvalidCapacity(usize),
}
