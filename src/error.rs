use thiserror::Error;

use crate::ast::Range;

/// Why parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A required literal token (`{`, `}`, `=`, a keyword) was absent.
    #[error("expected `{0}`")]
    Expected(&'static str),
    /// The element was never closed by its exact `</name>` literal.
    #[error("expected closing tag `</{0}>`")]
    ExpectedClosingTag(String),
    #[error("expected identifier")]
    ExpectedIdentifier,
    #[error("expected tag name")]
    ExpectedTagName,
    #[error("expected attribute name")]
    ExpectedAttributeName,
    /// Input at this point starts neither a `{` expression nor a `<` element.
    #[error("unexpected input")]
    UnexpectedRemainder,
}

/// A parse failure located at a single byte offset of the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at offset {offset}")]
pub struct ParseError {
    pub reason: ParseErrorKind,
    pub offset: usize,
}

impl ParseError {
    pub fn new(reason: ParseErrorKind, offset: usize) -> Self {
        Self { reason, offset }
    }
}

/// Why evaluation stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationErrorKind {
    #[error("variable `{0}` is not bound")]
    VariableMissing(String),
    /// Attribute values must evaluate to plain strings.
    #[error("expected a string")]
    ExpectedString,
    #[error("expected an array")]
    ExpectedArray,
    /// Arrays cannot be rendered as HTML.
    #[error("expected a value that can be rendered as HTML")]
    ExpectedHtmlConvertible,
}

/// An evaluation failure located at the range of the offending sub-expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason} at {range:?}")]
pub struct EvaluationError {
    pub reason: EvaluationErrorKind,
    pub range: Range,
}

impl EvaluationError {
    pub fn new(reason: EvaluationErrorKind, range: Range) -> Self {
        Self { reason, range }
    }
}

/// Either phase of [`crate::render`] failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

impl Error {
    /// Source range to point at; a parse offset becomes an empty range.
    pub fn range(&self) -> Range {
        match self {
            Error::Parse(e) => e.offset..e.offset,
            Error::Evaluation(e) => e.range.clone(),
        }
    }
}
