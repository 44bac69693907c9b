//! Sentence tokenizer.
//!
//! Splits paragraph text into sentences on a delimiter. When the delimiter is
//! a period, occurrences of protected abbreviations (by default `etc.`, `i.e.`
//! and `e.g.`) are located up front and the periods inside them never split a
//! sentence.

use std::ops::Range;

/// The delimiter used when none is configured.
pub const DEFAULT_DELIMITER: &str = ".";

/// Abbreviations whose periods never end a sentence, unless configured
/// otherwise.
pub const DEFAULT_PROTECTED: [&str; 3] = ["etc.", "i.e.", "e.g."];

/// Splits text into sentence fragments.
///
/// Fragments keep their trailing delimiter and are trimmed of surrounding
/// whitespace. Text after the last delimiter becomes the final fragment if it
/// is not blank.
///
/// Tokenizing is a pure operation; a single `Tokenizer` can be shared freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenizer {
    delimiter: String,
    protected: Vec<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}

impl Tokenizer {
    /// Creates a tokenizer splitting on `delimiter`, protecting the default
    /// abbreviations.
    #[must_use]
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            protected: DEFAULT_PROTECTED.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replaces the protected abbreviations.
    ///
    /// Empty entries are ignored. Protection only applies when the delimiter
    /// is a period.
    #[must_use]
    pub fn with_protected<I, S>(mut self, abbreviations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected = abbreviations
            .into_iter()
            .map(Into::into)
            .filter(|abbreviation: &String| !abbreviation.is_empty())
            .collect();
        self
    }

    /// The delimiter sentences are split on.
    #[must_use]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// The abbreviations whose periods are not treated as delimiters.
    #[must_use]
    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    /// Splits `text` into trimmed sentence fragments, in order.
    ///
    /// An empty delimiter never matches, so the whole (trimmed) text is
    /// returned as a single fragment.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut fragments = Vec::new();

        if self.delimiter.is_empty() {
            push_remainder(&mut fragments, text);
        } else {
            let spans = self.protected_spans(text);
            let mut start = 0;
            let mut search_from = 0;

            while let Some(offset) = text[search_from..].find(self.delimiter.as_str()) {
                let position = search_from + offset;
                let end = position + self.delimiter.len();
                search_from = end;

                if spans
                    .iter()
                    .any(|span| span.start <= position && end <= span.end)
                {
                    continue;
                }

                fragments.push(text[start..end].trim().to_string());
                start = end;
            }

            push_remainder(&mut fragments, &text[start..]);
        }

        fragments
    }

    /// Byte ranges of protected abbreviations in `text`.
    ///
    /// Abbreviations are matched in configured order; a match overlapping an
    /// earlier one is discarded.
    fn protected_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans: Vec<Range<usize>> = Vec::new();
        if self.delimiter != DEFAULT_DELIMITER {
            return spans;
        }

        for abbreviation in &self.protected {
            for (start, matched) in text.match_indices(abbreviation.as_str()) {
                let span = start..start + matched.len();
                if spans
                    .iter()
                    .all(|existing| span.end <= existing.start || existing.end <= span.start)
                {
                    spans.push(span);
                }
            }
        }

        spans
    }
}

fn push_remainder(fragments: &mut Vec<String>, remainder: &str) {
    let remainder = remainder.trim();
    if !remainder.is_empty() {
        fragments.push(remainder.to_string());
    }
}

/// Splits `text` on `delimiter` using the default protected abbreviations.
#[must_use]
pub fn tokenize(text: &str, delimiter: &str) -> Vec<String> {
    Tokenizer::new(delimiter).tokenize(text)
}
