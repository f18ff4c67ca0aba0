//! Escaping for the two places a string value can land in rendered HTML.
//!
//! The policy is deliberately narrow: body text only escapes `&`, `<` and
//! `>`; attribute values (always emitted double-quoted) only escape `"`.

use std::borrow::Cow;

/// Escape a string for insertion into element body text.
pub fn escape_html(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape a string for insertion between the quotes of an attribute value.
pub fn escape_attribute(input: &str) -> Cow<'_, str> {
    if input.contains('"') {
        Cow::Owned(input.replace('"', "&quot;"))
    } else {
        Cow::Borrowed(input)
    }
}
