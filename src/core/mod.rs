//! Core module - Tokenizing and counting keystroke logs
//!
//! This module provides:
//! - Cursor position tracking
//! - The tag-aware log tokenizer
//! - Housekeeping marker recognition
//! - The frequency dictionary and run statistics
//! - Rendering functions for different output formats

pub mod cursor;
pub mod error;
pub mod meta;
pub mod model;
pub mod render;
pub mod tokenizer;
