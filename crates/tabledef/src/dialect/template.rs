//! Two-pass template rendering.
//!
//! Pass 1 ([`render`]) fills vocabulary templates from a declaration's fields:
//!
//! ```text
//! VARCHAR[[({length})]]                       {length} optional
//! DECIMAL({precision},{scale})                scalar placeholders
//! bucketed_by = ARRAY[{by:sq}]                list joined as 'a', 'b'
//! SORTKEY({keys:dq})                          list joined as "a", "b"
//! ```
//!
//! A `[[...]]` group is emitted only when every placeholder inside it
//! resolves. Placeholders outside a group that do not resolve are kept
//! verbatim.
//!
//! Pass 2 ([`substitute`]) replaces plain `{name}` placeholders from a
//! parameter map, as used for partition conditions. Both passes scan their
//! input once, so substituted text is never rescanned.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(?::(sq|dq))?\}").unwrap());

static PARAMETER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

static OPTIONAL_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());

/// Value available to pass-1 templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    Text(String),
    List(Vec<String>),
}

impl TemplateValue {
    fn items(&self) -> Vec<&str> {
        match self {
            TemplateValue::Text(s) => vec![s.as_str()],
            TemplateValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    fn plain(&self) -> String {
        match self {
            TemplateValue::Text(s) => s.clone(),
            TemplateValue::List(items) => items.join(", "),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::Text(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        TemplateValue::Text(s)
    }
}

/// Pass-1 rendering context.
pub type TemplateContext = BTreeMap<String, TemplateValue>;

/// Render a vocabulary template (pass 1).
pub fn render(template: &str, context: &TemplateContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;
    for group in OPTIONAL_GROUP.captures_iter(template) {
        let (Some(whole), Some(inner)) = (group.get(0), group.get(1)) else {
            continue;
        };
        out.push_str(&render_segment(&template[last..whole.start()], context).0);
        let (rendered, complete) = render_segment(inner.as_str(), context);
        if complete {
            out.push_str(&rendered);
        }
        last = whole.end();
    }
    out.push_str(&render_segment(&template[last..], context).0);
    out
}

/// Render placeholders of one segment; the flag is false if any was missing.
fn render_segment(segment: &str, context: &TemplateContext) -> (String, bool) {
    let mut complete = true;
    let rendered = PLACEHOLDER.replace_all(segment, |caps: &Captures| {
        let name = &caps[1];
        match context.get(name) {
            Some(value) => match caps.get(2).map(|m| m.as_str()) {
                Some("sq") => quote_items(value, '\''),
                Some("dq") => quote_items(value, '"'),
                _ => value.plain(),
            },
            None => {
                complete = false;
                caps[0].to_string()
            }
        }
    });
    (rendered.into_owned(), complete)
}

fn quote_items(value: &TemplateValue, quote: char) -> String {
    value
        .items()
        .iter()
        .map(|item| format!("{quote}{item}{quote}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Replace `{name}` placeholders from `params` (pass 2).
///
/// Placeholders without a parameter are left untouched.
pub fn substitute(text: &str, params: &BTreeMap<String, String>) -> String {
    PARAMETER
        .replace_all(text, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// [`substitute`] over a short list of pairs.
pub fn substitute_pairs(text: &str, pairs: &[(&str, &str)]) -> String {
    PARAMETER
        .replace_all(text, |caps: &Captures| {
            match pairs.iter().find(|(name, _)| *name == &caps[1]) {
                Some((_, value)) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
