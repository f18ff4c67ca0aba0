//! Pointing errors back at the template source.
//!
//! [`Snippet`] prints the offending line with a caret underline and needs
//! nothing beyond the source text. With the `diagnostics` feature, errors
//! can also be turned into [`miette::Report`]s.

use std::fmt;

use crate::ast::Range;
use crate::error::{EvaluationError, ParseError};

/// 1-based line and column (in characters) of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let before = &source[..floor_char_boundary(source, offset)];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        Self {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// The source line containing the start of a range, with the range underlined.
///
/// ```text
/// 1 | <p>{ title }</p>
///   |      ^^^^^
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet<'a> {
    pub location: SourceLocation,
    line: &'a str,
    width: usize,
}

impl<'a> Snippet<'a> {
    pub fn new(source: &'a str, range: Range) -> Self {
        let start = floor_char_boundary(source, range.start);
        let end = floor_char_boundary(source, range.end.max(start));
        let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[start..]
            .find('\n')
            .map_or(source.len(), |i| start + i);

        // Multi-line ranges are underlined up to the end of the first line.
        let width = source[start..end.min(line_end)].chars().count().max(1);
        Self {
            location: SourceLocation::from_offset(source, start),
            line: &source[line_start..line_end],
            width,
        }
    }
}

impl fmt::Display for Snippet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let number = self.location.line.to_string();
        writeln!(f, "{number} | {}", self.line)?;
        write!(
            f,
            "{:gutter$} | {:pad$}{}",
            "",
            "",
            "^".repeat(self.width),
            gutter = number.len(),
            pad = self.location.column - 1,
        )
    }
}

impl ParseError {
    pub fn snippet<'a>(&self, source: &'a str) -> Snippet<'a> {
        Snippet::new(source, self.offset..self.offset)
    }
}

impl EvaluationError {
    pub fn snippet<'a>(&self, source: &'a str) -> Snippet<'a> {
        Snippet::new(source, self.range.clone())
    }
}

#[cfg(feature = "diagnostics")]
pub use self::diagnostics::TemplateDiagnostic;

#[cfg(feature = "diagnostics")]
mod diagnostics {
    use std::fmt;

    use miette::{Diagnostic, LabeledSpan, NamedSource, Report, SourceSpan};

    use crate::ast::Range;
    use crate::error::{EvaluationError, ParseError};

    /// An error together with the source it refers to, renderable by miette.
    #[derive(Debug)]
    pub struct TemplateDiagnostic {
        message: String,
        source_code: NamedSource<String>,
        span: SourceSpan,
    }

    impl TemplateDiagnostic {
        fn new(message: String, name: &str, source: &str, range: Range) -> Self {
            Self {
                message,
                source_code: NamedSource::new(name, source.to_string()),
                span: SourceSpan::new(range.start.into(), range.end - range.start),
            }
        }
    }

    impl fmt::Display for TemplateDiagnostic {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.message)
        }
    }

    impl std::error::Error for TemplateDiagnostic {}

    impl Diagnostic for TemplateDiagnostic {
        fn source_code(&self) -> Option<&dyn miette::SourceCode> {
            Some(&self.source_code)
        }

        fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
            Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
                Some("here".to_string()),
                self.span,
            ))))
        }
    }

    impl ParseError {
        pub fn to_diagnostic(&self, name: &str, source: &str) -> TemplateDiagnostic {
            TemplateDiagnostic::new(self.reason.to_string(), name, source, self.offset..self.offset)
        }

        pub fn to_report(&self, name: &str, source: &str) -> Report {
            Report::new(self.to_diagnostic(name, source))
        }
    }

    impl EvaluationError {
        pub fn to_diagnostic(&self, name: &str, source: &str) -> TemplateDiagnostic {
            TemplateDiagnostic::new(self.reason.to_string(), name, source, self.range.clone())
        }

        pub fn to_report(&self, name: &str, source: &str) -> Report {
            Report::new(self.to_diagnostic(name, source))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{evaluate, parse, EvaluationContext};

    #[test]
    fn location_from_offset() {
        let source = "<ul>\n  <li>{ x }</li>\n</ul>";
        assert_eq!(
            SourceLocation::from_offset(source, 0),
            SourceLocation { line: 1, column: 1 }
        );
        assert_eq!(
            SourceLocation::from_offset(source, 13),
            SourceLocation { line: 2, column: 9 }
        );
        assert_eq!(SourceLocation::from_offset(source, 999).line, 3);
    }

    #[test]
    fn column_counts_characters() {
        assert_eq!(SourceLocation::from_offset("é{x", 2).column, 2);
    }

    #[test]
    fn evaluation_snippet() {
        let source = "<p>{ title }</p>";
        let err = evaluate(&parse(source).unwrap(), &EvaluationContext::new()).unwrap_err();
        assert_eq!(
            err.snippet(source).to_string(),
            "1 | <p>{ title }</p>\n  |      ^^^^^"
        );
    }

    #[test]
    fn parse_snippet_on_later_line() {
        let source = "<ul>\n  <li>{ 1 }</li>\n</ul>";
        let err = parse(source).unwrap_err();
        let snippet = err.snippet(source);
        assert_eq!(snippet.location, SourceLocation { line: 2, column: 9 });
        assert_eq!(snippet.to_string(), "2 |   <li>{ 1 }</li>\n  |         ^");
    }
}
