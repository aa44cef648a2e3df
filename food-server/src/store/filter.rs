//! Document filters
//!
//! A [`Filter`] is a conjunction of [`Condition`]s over top-level or dotted
//! field paths. Backends either evaluate it in memory ([`Filter::matches`])
//! or translate it to their own query language.

use serde_json::Value;

use super::Document;

/// A single predicate on one field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field == value`
    Eq(String, Value),
    /// `field != value` (a missing field counts as "not equal")
    Ne(String, Value),
    /// `field` equals one of `values`
    In(String, Vec<Value>),
    /// Any of `fields` contains `needle`, case-insensitive
    Search { fields: Vec<String>, needle: String },
}

/// Conjunction of conditions. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the document identifier
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().eq("id", id.into())
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    /// Add an equality condition only when `value` is present
    pub fn eq_opt<V: Into<Value>>(self, field: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn ne(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne(field.into(), value.into()));
        self
    }

    pub fn is_in<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::In(
            field.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Case-insensitive substring search over one or more fields
    pub fn search(mut self, fields: &[&str], needle: impl Into<String>) -> Self {
        let needle = needle.into();
        if needle.trim().is_empty() {
            return self;
        }
        self.conditions.push(Condition::Search {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            needle: needle.to_lowercase(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| condition_matches(c, doc))
    }
}

fn condition_matches(condition: &Condition, doc: &Document) -> bool {
    match condition {
        Condition::Eq(field, value) => get_path(doc, field) == Some(value),
        Condition::Ne(field, value) => get_path(doc, field) != Some(value),
        Condition::In(field, values) => {
            get_path(doc, field).is_some_and(|v| values.iter().any(|candidate| candidate == v))
        }
        Condition::Search { fields, needle } => fields.iter().any(|field| {
            get_path(doc, field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(needle.as_str()))
        }),
    }
}

/// Resolve a dotted path (`a.b.c`) inside a document
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = doc.get(first)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Collect every scalar reachable through a dotted path, flattening arrays
/// on the way (`menu_items.add_on_items.add_on_id`).
pub fn collect_path(value: &Value, path: &str, out: &mut Vec<Value>) {
    let (head, rest) = match path.split_once('.') {
        Some((h, r)) => (h, Some(r)),
        None => (path, None),
    };
    match value {
        Value::Array(items) => {
            for item in items {
                collect_path(item, path, out);
            }
        }
        Value::Object(map) => {
            let Some(next) = map.get(head) else { return };
            match rest {
                Some(rest) => collect_path(next, rest, out),
                None => match next {
                    Value::Array(items) => out.extend(items.iter().cloned()),
                    other => out.push(other.clone()),
                },
            }
        }
        _ => {}
    }
}
