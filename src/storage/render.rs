//! Matrix renderers.
//!
//! Each renderer keeps the matrix in memory. Starting a file-backed matrix
//! checks that its destination can be written, and the file itself is only
//! written when the matrix is finished.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{domain::RequirementRecord, error::ResourceError, storage::MatrixSink};

/// The on-disk format of a compliance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    /// Comma-separated values, readable by any spreadsheet application.
    Csv,
    /// A Markdown table.
    Markdown,
}

impl MatrixFormat {
    /// Chooses a format from the destination's extension.
    ///
    /// `.md` and `.markdown` produce Markdown; anything else produces CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("md" | "markdown") => Self::Markdown,
            _ => Self::Csv,
        }
    }

    /// Creates a renderer of this format persisting to `path`.
    #[must_use]
    pub fn sink(self, path: impl Into<PathBuf>) -> Box<dyn MatrixSink> {
        match self {
            Self::Csv => Box::new(CsvMatrix::new(path)),
            Self::Markdown => Box::new(MarkdownMatrix::new(path)),
        }
    }
}

/// Checks that `path` can be written to, without changing an existing file.
///
/// Missing parent directories are created.
fn prepare(path: &Path) -> Result<(), ResourceError> {
    let io_error = |e| ResourceError::from_io(path, e);

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    if path.is_dir() {
        return Err(io_error(io::Error::new(
            io::ErrorKind::IsADirectory,
            "destination is a directory",
        )));
    }

    if path.exists() {
        OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(io_error)?;
    }
    Ok(())
}

/// Writes `contents` to `path`, creating parent directories as needed.
fn persist(path: &Path, contents: &[u8]) -> Result<(), ResourceError> {
    let io_error = |e| ResourceError::from_io(path, e);

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(contents).map_err(io_error)?;
    writer.flush().map_err(io_error)
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: usize,
    requirement: &'a str,
    meets_requirement: &'a str,
    comment: &'a str,
}

/// A compliance matrix rendered as CSV.
pub struct CsvMatrix {
    path: PathBuf,
    writer: csv::Writer<Vec<u8>>,
}

impl CsvMatrix {
    /// Creates an empty CSV matrix persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new()),
        }
    }

    fn render_error(&self, source: csv::Error) -> ResourceError {
        ResourceError::Render {
            path: self.path.clone(),
            source,
        }
    }
}

impl MatrixSink for CsvMatrix {
    fn destination(&self) -> &Path {
        &self.path
    }

    fn begin(&mut self, header: &[&str]) -> Result<(), ResourceError> {
        prepare(&self.path)?;
        self.writer
            .write_record(header)
            .map_err(|e| self.render_error(e))
    }

    fn row(&mut self, record: &RequirementRecord) -> Result<(), ResourceError> {
        self.writer
            .serialize(CsvRow {
                id: record.id().get(),
                requirement: record.text(),
                meets_requirement: "",
                comment: "",
            })
            .map_err(|e| self.render_error(e))
    }

    fn finish(&mut self) -> Result<(), ResourceError> {
        self.writer
            .flush()
            .map_err(|e| ResourceError::from_io(&self.path, e))?;
        persist(&self.path, self.writer.get_ref())
    }
}

/// A compliance matrix rendered as a Markdown table.
#[derive(Debug)]
pub struct MarkdownMatrix {
    path: PathBuf,
    lines: Vec<String>,
}

impl MarkdownMatrix {
    /// Creates an empty Markdown matrix persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lines: Vec::new(),
        }
    }

    fn push_row<'a>(&mut self, cells: impl IntoIterator<Item = &'a str>) {
        let cells: Vec<String> = cells
            .into_iter()
            .map(|cell| cell.replace('|', "\\|"))
            .collect();
        self.lines.push(format!("| {} |", cells.join(" | ")));
    }
}

impl MatrixSink for MarkdownMatrix {
    fn destination(&self) -> &Path {
        &self.path
    }

    fn begin(&mut self, header: &[&str]) -> Result<(), ResourceError> {
        prepare(&self.path)?;
        self.lines.clear();
        self.push_row(header.iter().copied());
        self.lines.push(format!("|{}", " --- |".repeat(header.len())));
        Ok(())
    }

    fn row(&mut self, record: &RequirementRecord) -> Result<(), ResourceError> {
        let id = record.id().to_string();
        self.push_row([id.as_str(), record.text(), "", ""]);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ResourceError> {
        let mut contents = self.lines.join("\n");
        contents.push('\n');
        persist(&self.path, contents.as_bytes())
    }
}

/// A compliance matrix held in memory.
///
/// Useful for inspecting a conversion without producing a file.
#[derive(Debug)]
pub struct MemoryMatrix {
    path: PathBuf,
    header: Option<Vec<String>>,
    records: Vec<RequirementRecord>,
    finished: bool,
}

impl Default for MemoryMatrix {
    fn default() -> Self {
        Self::new("<memory>")
    }
}

impl MemoryMatrix {
    /// Creates an empty in-memory matrix labelled with `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: None,
            records: Vec::new(),
            finished: false,
        }
    }

    /// The header row, once the matrix has been started.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// The rows received so far.
    #[must_use]
    pub fn records(&self) -> &[RequirementRecord] {
        &self.records
    }

    /// Whether the matrix has been finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

impl MatrixSink for MemoryMatrix {
    fn destination(&self) -> &Path {
        &self.path
    }

    fn begin(&mut self, header: &[&str]) -> Result<(), ResourceError> {
        self.header = Some(header.iter().map(ToString::to_string).collect());
        self.records.clear();
        self.finished = false;
        Ok(())
    }

    fn row(&mut self, record: &RequirementRecord) -> Result<(), ResourceError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ResourceError> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use test_case::test_case;

    use super::*;
    use crate::storage::HEADER;

    fn record(id: usize, text: &str) -> RequirementRecord {
        RequirementRecord::new(NonZeroUsize::new(id).unwrap(), text.to_string())
    }

    #[test_case("matrix.csv", MatrixFormat::Csv; "csv")]
    #[test_case("matrix.md", MatrixFormat::Markdown; "md")]
    #[test_case("matrix.MARKDOWN", MatrixFormat::Markdown; "markdown uppercase")]
    #[test_case("matrix.xlsx", MatrixFormat::Csv; "other extension")]
    #[test_case("matrix", MatrixFormat::Csv; "no extension")]
    fn format_from_path(path: &str, expected: MatrixFormat) {
        assert_eq!(MatrixFormat::from_path(Path::new(path)), expected);
    }

    #[test]
    fn csv_matrix_quotes_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out/matrix.csv");

        let mut matrix = CsvMatrix::new(&path);
        matrix.begin(&HEADER).unwrap();
        matrix
            .row(&record(1, "The device shall, when asked, power on."))
            .unwrap();
        matrix.row(&record(2, "It shall say \"hi\".")).unwrap();
        matrix.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "Requirement ID,Requirement,Meets Requirement (Yes / No / Partial),Comment\n\
             1,\"The device shall, when asked, power on.\",,\n\
             2,\"It shall say \"\"hi\"\".\",,\n"
        );
    }

    #[test]
    fn csv_matrix_header_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("matrix.csv");

        let mut matrix = CsvMatrix::new(&path);
        matrix.begin(&HEADER).unwrap();
        matrix.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn markdown_matrix_escapes_pipes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("matrix.md");

        let mut matrix = MarkdownMatrix::new(&path);
        matrix.begin(&HEADER).unwrap();
        matrix.row(&record(1, "A shall | B.")).unwrap();
        matrix.finish().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "| Requirement ID | Requirement | Meets Requirement (Yes / No / Partial) | Comment |\n\
             | --- | --- | --- | --- |\n\
             | 1 | A shall \\| B. |  |  |\n"
        );
    }

    #[test]
    fn finishing_into_a_missing_directory_creates_it() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a/b/matrix.md");

        let mut matrix = MatrixFormat::from_path(&path).sink(&path);
        matrix.begin(&HEADER).unwrap();
        matrix.finish().unwrap();

        assert!(path.is_file());
    }

    #[test_case("matrix.csv"; "csv")]
    #[test_case("matrix.md"; "markdown")]
    fn begin_rejects_a_directory(name: &str) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(name);
        std::fs::create_dir(&path).unwrap();

        let mut matrix = MatrixFormat::from_path(&path).sink(&path);
        let error = matrix.begin(&HEADER).unwrap_err();

        assert!(matches!(
            error,
            ResourceError::Io { ref source, .. } if source.kind() == io::ErrorKind::IsADirectory
        ));
    }

    #[test]
    fn begin_leaves_an_existing_file_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/matrix.csv");

        let mut matrix = CsvMatrix::new(&path);
        matrix.begin(&HEADER).unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());

        std::fs::write(&path, "old").unwrap();
        let mut matrix = CsvMatrix::new(&path);
        matrix.begin(&HEADER).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn memory_matrix_records_rows() {
        let mut matrix = MemoryMatrix::default();
        assert!(matrix.header().is_none());

        matrix.begin(&HEADER).unwrap();
        matrix.row(&record(1, "A")).unwrap();
        matrix.finish().unwrap();

        assert_eq!(matrix.records(), [record(1, "A")]);
        assert!(matrix.is_finished());
        assert_eq!(matrix.destination(), Path::new("<memory>"));
    }
}
