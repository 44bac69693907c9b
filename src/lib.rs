//! Compliance matrices from specification documents
//!
//! Every sentence of a specification containing "shall" is treated as a
//! requirement. Requirements are numbered in the order they appear and written
//! to a matrix with blank columns for a reviewer to fill in.

pub mod domain;
pub use domain::{
    Config, ConfigError, ConfigStore, RequirementRecord, Tokenizer, config, is_requirement,
    tokenize,
};

pub mod error;
pub use error::{Error, ProcessingError, ResourceError};

/// Source documents and compliance matrix output.
pub mod storage;
pub use storage::{DocumentSource, MatrixFormat, MatrixSink, MatrixWriter, TextDocument};

pub mod conversion;
pub use conversion::{Conversion, RunReport, RunState, resolve_destination};
