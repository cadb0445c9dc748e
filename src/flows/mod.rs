//! Flows module - Complete operations built from the core pieces
//!
//! Provides:
//! - keystat: Count key frequencies in a keystroke log and report them

pub mod keystat;
