//! The compliance matrix writer.
//!
//! [`MatrixWriter`] buffers requirement sentences, numbers them and hands them
//! to a [`MatrixSink`] as rows. The sink decides how the matrix is rendered
//! and where it is persisted.

use std::{num::NonZeroUsize, path::Path};

use crate::{
    domain::RequirementRecord,
    error::{Error, ProcessingError, ResourceError},
};

/// The column headings of every compliance matrix.
///
/// Only the first two columns are filled in; the others are left for the
/// reviewer.
pub const HEADER: [&str; 4] = [
    "Requirement ID",
    "Requirement",
    "Meets Requirement (Yes / No / Partial)",
    "Comment",
];

/// Renders rows of a compliance matrix.
pub trait MatrixSink {
    /// Where the rendered matrix is persisted.
    fn destination(&self) -> &Path;

    /// Starts a new matrix with the given header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be rendered.
    fn begin(&mut self, header: &[&str]) -> Result<(), ResourceError>;

    /// Appends a requirement row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be rendered.
    fn row(&mut self, record: &RequirementRecord) -> Result<(), ResourceError>;

    /// Persists the rendered matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix cannot be written to its destination.
    fn finish(&mut self) -> Result<(), ResourceError>;
}

impl<S: MatrixSink + ?Sized> MatrixSink for Box<S> {
    fn destination(&self) -> &Path {
        (**self).destination()
    }

    fn begin(&mut self, header: &[&str]) -> Result<(), ResourceError> {
        (**self).begin(header)
    }

    fn row(&mut self, record: &RequirementRecord) -> Result<(), ResourceError> {
        (**self).row(record)
    }

    fn finish(&mut self) -> Result<(), ResourceError> {
        (**self).finish()
    }
}

/// Buffers requirement sentences and writes them to a [`MatrixSink`].
///
/// Sentences are numbered from 1 when they are flushed. Numbering continues
/// across flushes, so IDs are contiguous for the lifetime of the writer.
#[derive(Debug)]
pub struct MatrixWriter<S> {
    sink: S,
    open: bool,
    buffer: Vec<String>,
    last_id: usize,
}

impl<S: MatrixSink> MatrixWriter<S> {
    /// Creates a closed writer around `sink`.
    #[must_use]
    pub const fn new(sink: S) -> Self {
        Self {
            sink,
            open: false,
            buffer: Vec::new(),
            last_id: 0,
        }
    }

    /// Opens the writer and writes the header row.
    ///
    /// Opening an already open writer does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn open(&mut self) -> Result<(), ResourceError> {
        let destination = self.sink.destination().display().to_string();
        if self.open {
            tracing::debug!("Matrix '{destination}' already open");
            return Ok(());
        }

        tracing::debug!("Opening matrix '{destination}'");
        self.sink.begin(&HEADER)?;
        self.open = true;
        Ok(())
    }

    /// Whether the writer is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Buffers a requirement sentence.
    ///
    /// Writing to a writer that is not open logs a warning and discards the
    /// sentence.
    pub fn write(&mut self, sentence: impl Into<String>) {
        if !self.open {
            tracing::warn!(
                "Writing requirement failed: matrix '{}' is not open",
                self.sink.destination().display()
            );
            return;
        }
        self.buffer.push(sentence.into());
    }

    /// The number of sentences waiting to be flushed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// The highest ID assigned so far, or zero if nothing has been flushed.
    #[must_use]
    pub const fn last_id(&self) -> usize {
        self.last_id
    }

    /// Numbers the buffered sentences and hands them to the sink.
    ///
    /// Returns the number of rows written. Flushing an empty buffer, or a
    /// writer that is not open, writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink rejects a row. Rows before the failing one
    /// keep their IDs; the failing row and those after it stay buffered.
    pub fn flush(&mut self) -> Result<usize, ProcessingError> {
        if !self.open {
            tracing::warn!(
                "Flushing failed: matrix '{}' is not open",
                self.sink.destination().display()
            );
            return Ok(0);
        }

        tracing::debug!(
            "Flushing {} requirements to '{}'",
            self.buffer.len(),
            self.sink.destination().display()
        );

        let mut written = 0;
        let result = self.buffer.iter().try_for_each(|sentence| {
            let id = NonZeroUsize::MIN.saturating_add(self.last_id + written);
            let record = RequirementRecord::new(id, sentence.clone());
            self.sink
                .row(&record)
                .map_err(|source| ProcessingError::Record {
                    id: id.get(),
                    source,
                })?;
            written += 1;
            Ok(())
        });

        self.buffer.drain(..written);
        self.last_id += written;
        result.map(|()| written)
    }

    /// Flushes outstanding sentences, persists the matrix and closes the
    /// writer.
    ///
    /// The sink is finished even if flushing fails. Closing a writer that is
    /// not open does nothing.
    ///
    /// # Errors
    ///
    /// Returns the flush error if there was one, otherwise any error raised
    /// while persisting.
    pub fn close(&mut self) -> Result<(), Error> {
        if !self.open {
            tracing::debug!(
                "Matrix '{}' already closed",
                self.sink.destination().display()
            );
            return Ok(());
        }

        let flushed = self.flush();
        let finished = self.sink.finish();
        self.open = false;
        self.buffer.clear();

        tracing::debug!("Closed matrix '{}'", self.sink.destination().display());
        flushed?;
        finished?;
        Ok(())
    }

    /// The sink rows are written to.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the writer, returning its sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use std::{io, path::PathBuf};

    use super::*;
    use crate::storage::render::MemoryMatrix;

    fn open_writer() -> MatrixWriter<MemoryMatrix> {
        let mut writer = MatrixWriter::new(MemoryMatrix::default());
        writer.open().unwrap();
        writer
    }

    fn rows(writer: &MatrixWriter<MemoryMatrix>) -> Vec<(usize, &str)> {
        writer
            .sink()
            .records()
            .iter()
            .map(|record| (record.id().get(), record.text()))
            .collect()
    }

    #[test]
    fn open_writes_header() {
        let writer = open_writer();
        assert_eq!(writer.sink().header().unwrap(), HEADER);
        assert!(writer.is_open());
    }

    #[test]
    fn flush_numbers_sentences_from_one() {
        let mut writer = open_writer();
        for sentence in ["A", "B", "C"] {
            writer.write(sentence);
        }
        assert_eq!(writer.pending(), 3);

        assert_eq!(writer.flush().unwrap(), 3);
        assert_eq!(rows(&writer), vec![(1, "A"), (2, "B"), (3, "C")]);
        assert_eq!(writer.pending(), 0);
    }

    #[test]
    fn flushing_an_empty_buffer_is_a_no_op() {
        let mut writer = open_writer();
        writer.write("A");
        writer.flush().unwrap();

        assert_eq!(writer.flush().unwrap(), 0);
        assert_eq!(rows(&writer), vec![(1, "A")]);
        assert_eq!(writer.last_id(), 1);
    }

    #[test]
    fn numbering_continues_across_flushes() {
        let mut writer = open_writer();
        writer.write("A");
        writer.write("B");
        writer.flush().unwrap();
        writer.write("C");
        writer.flush().unwrap();

        assert_eq!(rows(&writer), vec![(1, "A"), (2, "B"), (3, "C")]);
    }

    #[test]
    fn write_before_open_is_discarded() {
        let mut writer = MatrixWriter::new(MemoryMatrix::default());
        writer.write("A");
        assert_eq!(writer.pending(), 0);
        assert_eq!(writer.flush().unwrap(), 0);
    }

    #[test]
    fn close_flushes_and_finishes() {
        let mut writer = open_writer();
        writer.write("A");
        writer.close().unwrap();

        assert!(!writer.is_open());
        let sink = writer.into_sink();
        assert!(sink.is_finished());
        assert_eq!(sink.records().len(), 1);
    }

    #[test]
    fn close_without_writes_keeps_header_only() {
        let mut writer = open_writer();
        writer.close().unwrap();

        let sink = writer.into_sink();
        assert!(sink.is_finished());
        assert_eq!(sink.header().unwrap(), HEADER);
        assert!(sink.records().is_empty());
    }

    #[test]
    fn close_twice_is_harmless() {
        let mut writer = open_writer();
        writer.close().unwrap();
        writer.close().unwrap();
        writer.write("late");
        assert_eq!(writer.pending(), 0);
    }

    /// Accepts a fixed number of rows, then fails.
    struct FailingSink {
        accepted: Vec<RequirementRecord>,
        capacity: usize,
        finished: bool,
    }

    impl MatrixSink for FailingSink {
        fn destination(&self) -> &Path {
            Path::new("failing")
        }

        fn begin(&mut self, _header: &[&str]) -> Result<(), ResourceError> {
            Ok(())
        }

        fn row(&mut self, record: &RequirementRecord) -> Result<(), ResourceError> {
            if self.accepted.len() == self.capacity {
                return Err(ResourceError::Io {
                    path: PathBuf::from("failing"),
                    source: io::Error::other("full"),
                });
            }
            self.accepted.push(record.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), ResourceError> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn failed_rows_stay_buffered() {
        let mut writer = MatrixWriter::new(FailingSink {
            accepted: Vec::new(),
            capacity: 1,
            finished: false,
        });
        writer.open().unwrap();
        writer.write("A");
        writer.write("B");

        let error = writer.flush().unwrap_err();
        assert!(matches!(error, ProcessingError::Record { id: 2, .. }));
        assert_eq!(writer.last_id(), 1);
        assert_eq!(writer.pending(), 1);

        let error = writer.close().unwrap_err();
        assert!(matches!(error, Error::Processing(_)));
        assert!(writer.sink().finished);
    }
}
