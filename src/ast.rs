use std::fmt;

use indexmap::IndexMap;

/// Half-open byte range into the template source.
pub type Range = std::ops::Range<usize>;

/// One syntactic unit, generic over how its children are stored.
///
/// `R` is [`AnnotatedExpression`] for parser output and [`SimpleExpression`]
/// once source ranges have been stripped.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression<R> {
    Variable {
        name: String,
    },
    Tag {
        name: String,
        attributes: IndexMap<String, R>, // source order
        body: Vec<R>,
    },
    For {
        variable_name: String,
        collection: Box<R>,
        body: Vec<R>,
    },
}

impl<R> Expression<R> {
    /// Transform every direct child, keeping the shape of the node.
    pub fn map<S>(self, mut f: impl FnMut(R) -> S) -> Expression<S> {
        match self {
            Expression::Variable { name } => Expression::Variable { name },
            Expression::Tag {
                name,
                attributes,
                body,
            } => Expression::Tag {
                name,
                attributes: attributes.into_iter().map(|(k, v)| (k, f(v))).collect(),
                body: body.into_iter().map(f).collect(),
            },
            Expression::For {
                variable_name,
                collection,
                body,
            } => Expression::For {
                variable_name,
                collection: Box::new(f(*collection)),
                body: body.into_iter().map(f).collect(),
            },
        }
    }

    /// Like [`Expression::map`], but borrows the children.
    pub fn map_ref<S>(&self, mut f: impl FnMut(&R) -> S) -> Expression<S> {
        match self {
            Expression::Variable { name } => Expression::Variable { name: name.clone() },
            Expression::Tag {
                name,
                attributes,
                body,
            } => Expression::Tag {
                name: name.clone(),
                attributes: attributes.iter().map(|(k, v)| (k.clone(), f(v))).collect(),
                body: body.iter().map(f).collect(),
            },
            Expression::For {
                variable_name,
                collection,
                body,
            } => Expression::For {
                variable_name: variable_name.clone(),
                collection: Box::new(f(&**collection)),
                body: body.iter().map(f).collect(),
            },
        }
    }
}

/// A parsed node together with the source range that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedExpression {
    pub expression: Expression<AnnotatedExpression>,
    pub range: Range,
}

impl AnnotatedExpression {
    pub fn new(expression: Expression<AnnotatedExpression>, range: Range) -> Self {
        Self { expression, range }
    }

    /// Drop all ranges, leaving only the structure.
    pub fn simplify(&self) -> SimpleExpression {
        SimpleExpression(self.expression.map_ref(AnnotatedExpression::simplify))
    }
}

/// Range-free tree, used for structural comparison and printing.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleExpression(pub Expression<SimpleExpression>);

impl SimpleExpression {
    pub fn variable(name: impl Into<String>) -> Self {
        SimpleExpression(Expression::Variable { name: name.into() })
    }

    pub fn tag<N: Into<String>>(
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = (N, SimpleExpression)>,
        body: Vec<SimpleExpression>,
    ) -> Self {
        SimpleExpression(Expression::Tag {
            name: name.into(),
            attributes: attributes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            body,
        })
    }

    pub fn for_loop(
        variable_name: impl Into<String>,
        collection: SimpleExpression,
        body: Vec<SimpleExpression>,
    ) -> Self {
        SimpleExpression(Expression::For {
            variable_name: variable_name.into(),
            collection: Box::new(collection),
            body,
        })
    }

    // Expression position: inside `{ }` or as a loop collection.
    fn fmt_inline(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Expression::Variable { name } => f.write_str(name),
            _ => write!(f, "{self}"),
        }
    }
}

/// Prints the node back as template source.
impl fmt::Display for SimpleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Expression::Variable { name } => write!(f, "{{ {name} }}"),
            Expression::Tag {
                name,
                attributes,
                body,
            } => {
                write!(f, "<{name}")?;
                for (attr, value) in attributes {
                    write!(f, " {attr}={{ ")?;
                    value.fmt_inline(f)?;
                    f.write_str(" }")?;
                }
                f.write_str(">")?;
                for child in body {
                    write!(f, "{child}")?;
                }
                write!(f, "</{name}>")
            }
            Expression::For {
                variable_name,
                collection,
                body,
            } => {
                write!(f, "{{ for {variable_name} in ")?;
                collection.fmt_inline(f)?;
                f.write_str(" }")?;
                for child in body {
                    write!(f, "{child}")?;
                }
                f.write_str("{ end }")
            }
        }
    }
}
