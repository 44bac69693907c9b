pub mod document;
pub mod matrix;
pub mod render;

pub use document::{DocumentSource, TextDocument};
pub use matrix::{HEADER, MatrixSink, MatrixWriter};
pub use render::{CsvMatrix, MarkdownMatrix, MatrixFormat, MemoryMatrix};
