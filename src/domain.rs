//! Domain logic for building compliance matrices.
//!
//! This module contains the pure core: splitting paragraphs into sentences,
//! recognising requirement statements, and configuration.

/// Requirement recognition and numbered requirement records.
pub mod requirement;
pub use requirement::{KEYWORD, RequirementRecord, is_requirement};

pub mod tokenizer;
pub use tokenizer::{Tokenizer, tokenize};

/// Properties-file configuration.
pub mod config;
pub use config::{Config, ConfigError, ConfigStore};
