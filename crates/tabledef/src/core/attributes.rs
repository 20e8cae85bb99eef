//! Free-form declaration attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A single attribute value supplied by the schema author.
///
/// YAML scalars and sequences deserialize directly into the matching variant.
/// List items may be any scalar and are kept in their rendered form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(#[serde(deserialize_with = "scalar_list")] Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListItem {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn scalar_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<ListItem>::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .map(|item| match item {
            ListItem::Bool(b) => b.to_string(),
            ListItem::Int(i) => i.to_string(),
            ListItem::Float(x) => x.to_string(),
            ListItem::Text(s) => s,
        })
        .collect())
}

impl AttrValue {
    /// Items of a list value; scalars are treated as a one-item list.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            AttrValue::List(items) => items.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Boolean view of the value, if it has one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::Text(s) => match s.to_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::Float(x) => write!(f, "{}", x),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Int(i64::from(i))
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        AttrValue::Float(x)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(items: Vec<String>) -> Self {
        AttrValue::List(items)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(items: Vec<&str>) -> Self {
        AttrValue::List(items.into_iter().map(String::from).collect())
    }
}

/// Open attribute map carried by columns and table properties.
pub type Attributes = BTreeMap<String, AttrValue>;
