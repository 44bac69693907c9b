//! Conversion of a specification document into a compliance matrix.
//!
//! A run opens the source document, then the destination matrix, streams every
//! paragraph through the tokenizer and requirement filter, and finally closes
//! both. Errors never escape a run: they are logged and collected in the
//! [`RunReport`], and whatever was written before the failure is kept.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Config, Tokenizer, is_requirement},
    error::{Error, ResourceError},
    storage::{DocumentSource, MatrixFormat, MatrixSink, MatrixWriter, TextDocument},
};

/// The stages of a conversion run.
///
/// Runs move forward through the stages in order. A run that hits an error
/// ends in [`Aborted`](Self::Aborted) instead of [`Done`](Self::Done).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has been opened yet.
    Init,
    /// The source document is open.
    SourceOpened,
    /// The destination matrix is open.
    DestinationOpened,
    /// Paragraphs are being read and filtered.
    Streaming,
    /// The source document has been closed.
    SourceClosed,
    /// The destination matrix has been closed.
    DestinationClosed,
    /// The run completed without errors.
    Done,
    /// The run stopped early or failed to clean up.
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::SourceOpened => "source opened",
            Self::DestinationOpened => "destination opened",
            Self::Streaming => "streaming",
            Self::SourceClosed => "source closed",
            Self::DestinationClosed => "destination closed",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What happened during a conversion run.
#[derive(Debug)]
pub struct RunReport {
    state: RunState,
    paragraphs: usize,
    requirements: usize,
    errors: Vec<Error>,
}

impl RunReport {
    const fn new() -> Self {
        Self {
            state: RunState::Init,
            paragraphs: 0,
            requirements: 0,
            errors: Vec::new(),
        }
    }

    fn transition(&mut self, state: RunState) {
        tracing::debug!("{} -> {}", self.state, state);
        self.state = state;
    }

    fn fail(&mut self, context: &str, error: impl Into<Error>) {
        let error = error.into();
        tracing::error!("{context}: {error}");
        self.errors.push(error);
    }

    fn finish(mut self) -> Self {
        let state = if self.errors.is_empty() {
            RunState::Done
        } else {
            RunState::Aborted
        };
        self.transition(state);
        self
    }

    /// The stage the run ended in.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// The number of paragraphs read from the source.
    #[must_use]
    pub const fn paragraphs(&self) -> usize {
        self.paragraphs
    }

    /// The number of requirement sentences found.
    #[must_use]
    pub const fn requirements(&self) -> usize {
        self.requirements
    }

    /// The errors caught during the run, in the order they occurred.
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Whether the run completed without errors.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == RunState::Done
    }
}

/// Extracts requirement sentences from documents.
#[derive(Debug, Clone, Default)]
pub struct Conversion {
    tokenizer: Tokenizer,
}

impl Conversion {
    /// Creates a conversion splitting sentences with `tokenizer`.
    #[must_use]
    pub const fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Creates a conversion using the configured protected abbreviations.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tokenizer())
    }

    /// Returns the requirement sentences of a single paragraph, in order.
    #[must_use]
    pub fn requirements<'a>(&'a self, paragraph: &'a str) -> impl Iterator<Item = String> + 'a {
        self.tokenizer
            .tokenize(paragraph)
            .into_iter()
            .filter(|sentence| is_requirement(sentence))
    }

    /// Converts `document` into rows of `writer`.
    ///
    /// The writer is only opened once the document has been opened
    /// successfully. Both are closed at the end of the run even if reading
    /// failed part way through. A run whose destination is the source
    /// document opens neither.
    #[tracing::instrument(skip_all, fields(source = %document.path().display()))]
    pub fn run<D, S>(&self, document: &mut D, writer: &mut MatrixWriter<S>) -> RunReport
    where
        D: DocumentSource,
        S: MatrixSink,
    {
        let mut report = RunReport::new();

        if same_file(document.path(), writer.sink().destination()) {
            let path = document.path().to_path_buf();
            report.fail(
                "Compliance matrix destination is the source document",
                ResourceError::Overwrite { path },
            );
            return report.finish();
        }

        if let Err(error) = document.open() {
            report.fail("Failed to open source document", error);
            return report.finish();
        }
        report.transition(RunState::SourceOpened);

        if let Err(error) = writer.open() {
            report.fail("Failed to open compliance matrix", error);
            if let Err(error) = document.close() {
                report.fail("Failed to close source document", error);
            }
            return report.finish();
        }
        report.transition(RunState::DestinationOpened);

        report.transition(RunState::Streaming);
        loop {
            match document.next_paragraph() {
                Ok(Some(paragraph)) => {
                    report.paragraphs += 1;
                    tracing::debug!("paragraph: {paragraph}");
                    for sentence in self.requirements(&paragraph) {
                        tracing::debug!("found a requirement: {sentence}");
                        writer.write(sentence);
                        report.requirements += 1;
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    report.fail("Failed to read source document", error);
                    break;
                }
            }
        }

        if let Err(error) = document.close() {
            report.fail("Failed to close source document", error);
        }
        report.transition(RunState::SourceClosed);

        if let Err(error) = writer.close() {
            report.fail("Failed to close compliance matrix", error);
        }
        report.transition(RunState::DestinationClosed);

        report.finish()
    }

    /// Converts the text document at `source` into a compliance matrix at
    /// `destination`.
    ///
    /// The matrix format is chosen from the destination's extension.
    #[must_use]
    pub fn convert(&self, source: &Path, destination: &Path) -> RunReport {
        let mut document = TextDocument::new(source);
        let mut writer = MatrixWriter::new(MatrixFormat::from_path(destination).sink(destination));
        self.run(&mut document, &mut writer)
    }
}

/// Chooses where the compliance matrix is written.
///
/// An explicit destination wins, then the configured output file. Otherwise
/// the source path is used with its extension replaced by the configured
/// matrix extension. If that names the source itself, `.matrix` is inserted
/// before the extension, so `reqs.csv` becomes `reqs.matrix.csv`.
#[must_use]
pub fn resolve_destination(source: &Path, explicit: Option<&Path>, config: &Config) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.output_file())
        .unwrap_or_else(|| {
            let extension = config.matrix_extension();
            let derived = source.with_extension(&extension);
            if same_file(source, &derived) {
                source.with_extension(format!("matrix.{extension}"))
            } else {
                derived
            }
        })
}

/// Whether two paths name the same file.
///
/// Paths that both exist are compared after canonicalisation, anything else
/// is compared as written.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
