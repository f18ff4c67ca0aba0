use std::collections::HashMap;

use im::HashMap as ImHashMap;

use crate::escape::escape_html;

/// A value a template expression can evaluate to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateValue {
    /// Plain text, escaped whenever it is inserted into markup.
    String(String),
    /// Already rendered markup, inserted verbatim.
    RawHtml(String),
    /// Only usable as a loop collection.
    Array(Vec<TemplateValue>),
}

impl TemplateValue {
    pub fn raw_html(html: impl Into<String>) -> Self {
        TemplateValue::RawHtml(html.into())
    }

    /// The text of a `String` or `RawHtml` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TemplateValue::String(s) | TemplateValue::RawHtml(s) => Some(s.as_str()),
            TemplateValue::Array(_) => None,
        }
    }

    /// Render as an HTML fragment. Arrays have no HTML form.
    pub fn to_html(&self) -> Option<String> {
        match self {
            TemplateValue::String(s) => Some(escape_html(s).into_owned()),
            TemplateValue::RawHtml(html) => Some(html.clone()),
            TemplateValue::Array(_) => None,
        }
    }

    /// Owning variant of [`TemplateValue::to_html`].
    pub fn into_html(self) -> Result<String, Self> {
        match self {
            TemplateValue::String(s) => Ok(escape_html(&s).into_owned()),
            TemplateValue::RawHtml(html) => Ok(html),
            array @ TemplateValue::Array(_) => Err(array),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        TemplateValue::String(s)
    }
}

impl<T: Into<TemplateValue>> From<Vec<T>> for TemplateValue {
    fn from(items: Vec<T>) -> Self {
        TemplateValue::Array(items.into_iter().map(Into::into).collect())
    }
}

/// Variable bindings visible to an evaluation.
///
/// Backed by a persistent map, so cloning is cheap and deriving a child
/// scope never touches the parent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationContext {
    bindings: ImHashMap<String, TemplateValue>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TemplateValue>) {
        self.bindings.insert(name.into(), value.into());
    }

    /// A new context with `name` bound to `value`, shadowing any prior binding.
    pub fn with_binding(&self, name: impl Into<String>, value: impl Into<TemplateValue>) -> Self {
        Self {
            bindings: self.bindings.update(name.into(), value.into()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TemplateValue> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Into<String>, V: Into<TemplateValue>> FromIterator<(K, V)> for EvaluationContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, TemplateValue>> for EvaluationContext {
    fn from(map: HashMap<String, TemplateValue>) -> Self {
        map.into_iter().collect()
    }
}
