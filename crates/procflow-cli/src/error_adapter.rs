//! Error adapter for converting FlowError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Document parse
//! errors are rendered with a labeled span pointing into the input; every
//! other error is rendered as a plain message with a code.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};
use serde_json::error::Category;

use procflow::FlowError;

/// Adapter for a document that failed to parse.
pub struct ParseAdapter<'a> {
    /// The wrapped serde error
    err: &'a serde_json::Error,
    /// Input text for displaying snippets
    src: &'a str,
}

impl<'a> ParseAdapter<'a> {
    /// Create a new parse adapter.
    pub fn new(err: &'a serde_json::Error, src: &'a str) -> Self {
        Self { err, src }
    }

    /// Span of the reported line and column inside the input.
    fn span(&self) -> SourceSpan {
        let offset = line_column_to_offset(self.src, self.err.line(), self.err.column());
        let len = usize::from(offset < self.src.len());
        SourceSpan::new(offset.into(), len)
    }
}

impl fmt::Debug for ParseAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for ParseAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid process document")
    }
}

impl std::error::Error for ParseAdapter<'_> {}

impl MietteDiagnostic for ParseAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.err.classify() {
            Category::Syntax | Category::Eof => "procflow::json::syntax",
            Category::Data => "procflow::json::data",
            Category::Io => "procflow::io",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.err.classify() {
            Category::Syntax => "check the JSON syntax at the marked position",
            Category::Eof => "the input ends before the document is complete",
            Category::Data => "check field names and value types of the process document",
            Category::Io => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let message = strip_position(&self.err.to_string());
        Some(Box::new(std::iter::once(
            LabeledSpan::new_primary_with_span(Some(message), self.span()),
        )))
    }
}

/// Adapter for [`FlowError`] variants without a source location.
pub struct ErrorAdapter<'a>(pub &'a FlowError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            FlowError::Io(_) => "procflow::io",
            FlowError::Parse { .. } => return None,
            FlowError::Json(_) => "procflow::json",
            FlowError::Layout(_) => "procflow::layout",
            FlowError::UnknownDocument(_) => "procflow::unknown_document",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.0 {
            FlowError::UnknownDocument(_) => Some(Box::new(
                "use the `id` of one of the documents in the input collection",
            )),
            _ => None,
        }
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A parse failure with a location in the input.
    Parse(ParseAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Parse(p) => fmt::Display::fmt(p, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Parse(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Parse(p) => p.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Parse(p) => p.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Parse(p) => p.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`FlowError`] into a reportable error.
pub fn to_reportable(err: &FlowError) -> Reportable<'_> {
    match err {
        FlowError::Parse { err, src } => Reportable::Parse(ParseAdapter::new(err, src)),
        _ => Reportable::Error(ErrorAdapter(err)),
    }
}

/// Byte offset of a 1-based line and column, clamped to the input.
///
/// serde_json reports column 0 when the error sits before the first
/// character of a line.
fn line_column_to_offset(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let mut offset = (line_start + column.saturating_sub(1)).min(src.len());
    while !src.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Drops the " at line X column Y" suffix serde_json appends to messages.
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(index) => message[..index].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use procflow::identifier::Id;

    use super::*;

    fn parse_error(src: &str) -> FlowError {
        procflow::parse_collection(src).unwrap_err()
    }

    #[test]
    fn test_parse_error_is_labeled() {
        let src = "[\n  {\"id\": \"p1\",, }\n]";
        let err = parse_error(src);

        let reportable = to_reportable(&err);
        let Reportable::Parse(adapter) = &reportable else {
            panic!("Expected Parse");
        };

        let labels: Vec<_> = adapter.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert!(labels[0].primary());
        let second_line = src.find('{').unwrap()..src.rfind('\n').unwrap();
        assert!(second_line.contains(&labels[0].offset()));
        assert!(!labels[0].label().unwrap().contains("at line"));
        assert_eq!(
            reportable.code().unwrap().to_string(),
            "procflow::json::syntax"
        );
    }

    #[test]
    fn test_data_error_code() {
        let err = parse_error(r#"{"id": "p1", "nodes": 7}"#);
        let reportable = to_reportable(&err);

        assert_eq!(reportable.code().unwrap().to_string(), "procflow::json::data");
        assert!(reportable.help().is_some());
    }

    #[test]
    fn test_non_parse_error() {
        let err = FlowError::UnknownDocument(Id::new("missing"));

        let reportable = to_reportable(&err);

        match &reportable {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "unknown process `missing`");
            }
            Reportable::Parse(_) => panic!("Expected Error"),
        }
        assert_eq!(
            reportable.code().unwrap().to_string(),
            "procflow::unknown_document"
        );
    }

    #[test]
    fn test_offset_clamped_to_input() {
        assert_eq!(line_column_to_offset("ab\ncd", 2, 2), 4);
        assert_eq!(line_column_to_offset("ab\ncd", 2, 0), 3);
        assert_eq!(line_column_to_offset("ab", 5, 9), 2);
    }
}
