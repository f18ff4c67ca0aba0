//! tagtmpl: a minimal HTML templating language.
//!
//! A template mixes markup elements with embedded expressions:
//!
//! - `{ name }` inserts the value bound to `name`.
//! - `<tag attr={ name }> ... </tag>` renders an element; attribute values
//!   are always brace-delimited expressions.
//! - `{ for item in items } ... { end }` repeats its body once per element
//!   of the array bound to `items`.
//!
//! Source text is parsed into a tree where every node records the byte
//! range it came from ([`parse`]), then evaluated against an
//! [`EvaluationContext`] ([`evaluate`]). Both phases stop at the first
//! problem and report exactly where it is, so callers can point at the
//! offending token (see [`Snippet`]).
//!
//! Escaping depends on the kind of value being inserted:
//! - [`TemplateValue::String`] is escaped (`&`, `<`, `>` in body text, `"`
//!   in attribute values).
//! - [`TemplateValue::RawHtml`] is inserted verbatim.
//! - [`TemplateValue::Array`] can only be looped over.
//!
//! Not supported:
//! - Literal text between nodes (whitespace between nodes is ignored).
//! - Includes, macros, arithmetic, or boolean expressions.
//! - Loop indices and custom escaping.
//!
//! Note that `for` and `end` are recognized by comparing identifiers, not
//! reserved as keywords: a variable literally named `for` cannot be
//! referenced, and inside a loop body `{ end }` always closes the loop.

mod ast;
mod chars;
mod error;
mod escape;
mod eval;
mod parser;
mod report;
mod value;

pub use ast::{AnnotatedExpression, Expression, Range, SimpleExpression};
pub use chars::{is_attribute_name_char, is_identifier_char, is_tag_name_char};
pub use error::{Error, EvaluationError, EvaluationErrorKind, ParseError, ParseErrorKind};
pub use escape::{escape_attribute, escape_html};
pub use eval::evaluate;
pub use parser::{parse, Parser};
#[cfg(feature = "diagnostics")]
pub use report::TemplateDiagnostic;
pub use report::{Snippet, SourceLocation};
pub use value::{EvaluationContext, TemplateValue};

/// Parse `source` and evaluate it against `context` in one call.
///
/// ```
/// use tagtmpl::{render, EvaluationContext, TemplateValue};
///
/// let mut context = EvaluationContext::new();
/// context.insert("items", vec!["one", "two"]);
/// let html = render("<ul>{ for item in items }<li>{ item }</li>{ end }</ul>", &context).unwrap();
/// assert_eq!(html, TemplateValue::raw_html("<ul><li>one</li><li>two</li></ul>"));
/// ```
pub fn render(source: &str, context: &EvaluationContext) -> Result<TemplateValue, Error> {
    let tree = parse(source)?;
    Ok(evaluate(&tree, context)?)
}
