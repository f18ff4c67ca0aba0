use tracing::{debug, trace};

use crate::ast::*;
use crate::error::{EvaluationError, EvaluationErrorKind};
use crate::escape::escape_attribute;
use crate::value::{EvaluationContext, TemplateValue};

type Result<T> = std::result::Result<T, EvaluationError>;

/// Evaluate a parsed template against `context`.
///
/// Tags and loops evaluate to [`TemplateValue::RawHtml`]; a bare variable
/// evaluates to whatever it is bound to, unescaped. On failure the error
/// carries the range of the sub-expression that caused it.
pub fn evaluate(node: &AnnotatedExpression, context: &EvaluationContext) -> Result<TemplateValue> {
    eval_node(node, context).inspect_err(|err| {
        debug!(range = ?err.range, reason = %err.reason, "template evaluation failed");
    })
}

fn eval_node(node: &AnnotatedExpression, context: &EvaluationContext) -> Result<TemplateValue> {
    match &node.expression {
        Expression::Variable { name } => context.get(name).cloned().ok_or_else(|| {
            EvaluationError::new(
                EvaluationErrorKind::VariableMissing(name.clone()),
                node.range.clone(),
            )
        }),
        Expression::Tag {
            name,
            attributes,
            body,
        } => {
            let mut inner = String::new();
            render_body(body, context, &mut inner)?;

            let mut attrs = String::new();
            for (attribute, value) in attributes {
                let TemplateValue::String(text) = eval_node(value, context)? else {
                    return Err(EvaluationError::new(
                        EvaluationErrorKind::ExpectedString,
                        value.range.clone(),
                    ));
                };
                attrs.push(' ');
                attrs.push_str(attribute);
                attrs.push_str("=\"");
                attrs.push_str(&escape_attribute(&text));
                attrs.push('"');
            }

            Ok(TemplateValue::RawHtml(format!(
                "<{name}{attrs}>{inner}</{name}>"
            )))
        }
        Expression::For {
            variable_name,
            collection,
            body,
        } => {
            let TemplateValue::Array(items) = eval_node(collection, context)? else {
                return Err(EvaluationError::new(
                    EvaluationErrorKind::ExpectedArray,
                    collection.range.clone(),
                ));
            };

            let mut out = String::new();
            for (index, item) in items.into_iter().enumerate() {
                trace!(variable = %variable_name, index, "loop iteration");
                // Fresh scope per iteration; `context` itself is never modified.
                let scope = context.with_binding(variable_name.as_str(), item);
                render_body(body, &scope, &mut out)?;
            }
            Ok(TemplateValue::RawHtml(out))
        }
    }
}

/// Evaluate each child in order and append its HTML form to `out`.
fn render_body(
    children: &[AnnotatedExpression],
    context: &EvaluationContext,
    out: &mut String,
) -> Result<()> {
    for child in children {
        let html = eval_node(child, context)?.into_html().map_err(|_| {
            EvaluationError::new(
                EvaluationErrorKind::ExpectedHtmlConvertible,
                child.range.clone(),
            )
        })?;
        out.push_str(&html);
    }
    Ok(())
}
