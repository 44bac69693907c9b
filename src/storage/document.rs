//! Source documents.
//!
//! A [`DocumentSource`] yields the paragraphs of a specification in order.
//! [`TextDocument`] reads plain-text and Markdown files.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::error::ResourceError;

/// A document that can be read paragraph by paragraph.
pub trait DocumentSource {
    /// The file backing this document.
    fn path(&self) -> &Path;

    /// Opens the document for reading.
    ///
    /// Opening an already open document does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the document does not exist and
    /// another [`ResourceError`] if it cannot be read.
    fn open(&mut self) -> Result<(), ResourceError>;

    /// Whether the document is open.
    fn is_open(&self) -> bool;

    /// Returns the next paragraph, or `None` once all have been read.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not open or cannot be read.
    fn next_paragraph(&mut self) -> Result<Option<String>, ResourceError>;

    /// Returns every paragraph, starting again from the first.
    ///
    /// The cursor used by [`next_paragraph`](Self::next_paragraph) is moved
    /// past the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not open or cannot be read.
    fn paragraphs(&mut self) -> Result<Vec<String>, ResourceError>;

    /// Moves the cursor back to the first paragraph.
    fn rewind(&mut self);

    /// Closes the document.
    ///
    /// Closing a document that is not open does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if resources could not be released.
    fn close(&mut self) -> Result<(), ResourceError>;
}

/// A plain-text or Markdown document.
///
/// Paragraphs are blocks of non-blank lines separated by one or more blank
/// lines. Lines within a block are trimmed and joined with a single space, so
/// hard-wrapped text reads as one paragraph.
#[derive(Debug)]
pub struct TextDocument {
    path: PathBuf,
    paragraphs: Option<Vec<String>>,
    cursor: usize,
}

impl TextDocument {
    /// Creates a document backed by `path`. Nothing is read until
    /// [`open`](DocumentSource::open) is called.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            paragraphs: None,
            cursor: 0,
        }
    }

    fn loaded(&self) -> Result<&[String], ResourceError> {
        self.paragraphs.as_deref().ok_or_else(|| ResourceError::Io {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::NotConnected, "document is not open"),
        })
    }
}

impl DocumentSource for TextDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn open(&mut self) -> Result<(), ResourceError> {
        if self.is_open() {
            tracing::debug!("Document '{}' already open", self.path.display());
            return Ok(());
        }

        tracing::debug!("Opening document '{}'", self.path.display());
        let file = File::open(&self.path).map_err(|e| ResourceError::from_io(&self.path, e))?;
        let paragraphs = read_paragraphs(BufReader::new(file))
            .map_err(|e| ResourceError::from_io(&self.path, e))?;

        tracing::debug!(
            "Read {} paragraphs from '{}'",
            paragraphs.len(),
            self.path.display()
        );
        self.paragraphs = Some(paragraphs);
        self.cursor = 0;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.paragraphs.is_some()
    }

    fn next_paragraph(&mut self) -> Result<Option<String>, ResourceError> {
        let paragraph = self.loaded()?.get(self.cursor).cloned();
        if paragraph.is_some() {
            self.cursor += 1;
        }
        Ok(paragraph)
    }

    fn paragraphs(&mut self) -> Result<Vec<String>, ResourceError> {
        let paragraphs = self.loaded()?.to_vec();
        self.cursor = paragraphs.len();
        Ok(paragraphs)
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        if self.paragraphs.take().is_none() {
            tracing::debug!("Document '{}' already closed", self.path.display());
        }
        self.cursor = 0;
        Ok(())
    }
}

/// Splits text into blank-line separated paragraphs.
fn read_paragraphs<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line.to_string());
        }
    }

    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    Ok(paragraphs)
}
