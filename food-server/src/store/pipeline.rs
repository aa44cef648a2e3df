//! Aggregation pipelines
//!
//! The subset of pipeline stages the API needs for joined reads
//! (`$match`, `$lookup`, `$unwind`, `$project`, `$sort`, `$limit`).
//! [`execute`] runs any pipeline on top of a backend's `find_many`, so every
//! [`DocumentStore`] supports `aggregate` without its own query planner.

use std::cmp::Ordering;

use serde_json::Value;

use super::filter::{Filter, collect_path, get_path};
use super::{Document, DocumentStore, StoreResult};

/// One pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    /// Join documents of `from` whose `foreign_field` equals any value found
    /// at `local_field` (dotted, arrays flattened) into array field `as_field`
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        as_field: String,
    },
    /// Replace an array field by one document per element
    Unwind {
        path: String,
        preserve_empty: bool,
    },
    /// Drop top-level fields
    Project { exclude: Vec<String> },
    Sort { field: String, descending: bool },
    Limit(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching(mut self, filter: Filter) -> Self {
        self.stages.push(Stage::Match(filter));
        self
    }

    pub fn lookup(mut self, from: &str, local_field: &str, foreign_field: &str, as_field: &str) -> Self {
        self.stages.push(Stage::Lookup {
            from: from.to_string(),
            local_field: local_field.to_string(),
            foreign_field: foreign_field.to_string(),
            as_field: as_field.to_string(),
        });
        self
    }

    pub fn unwind(mut self, path: &str, preserve_empty: bool) -> Self {
        self.stages.push(Stage::Unwind {
            path: path.to_string(),
            preserve_empty,
        });
        self
    }

    pub fn project_out(mut self, fields: &[&str]) -> Self {
        self.stages.push(Stage::Project {
            exclude: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }

    pub fn sort(mut self, field: &str, descending: bool) -> Self {
        self.stages.push(Stage::Sort {
            field: field.to_string(),
            descending,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.stages.push(Stage::Limit(n));
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

/// Run `pipeline` against `collection`
///
/// A leading `Match` is pushed down into `find_many`; every other stage is
/// evaluated in memory. Lookups are batched: one `find_many` per stage,
/// whatever the number of input documents.
pub async fn execute<S>(store: &S, collection: &str, pipeline: &Pipeline) -> StoreResult<Vec<Document>>
where
    S: DocumentStore + ?Sized,
{
    let (initial, rest) = match pipeline.stages.split_first() {
        Some((Stage::Match(filter), rest)) => (filter.clone(), rest),
        _ => (Filter::new(), pipeline.stages.as_slice()),
    };

    let mut docs = store.find_many(collection, &initial).await?;

    for stage in rest {
        docs = match stage {
            Stage::Match(filter) => docs.into_iter().filter(|d| filter.matches(d)).collect(),
            Stage::Lookup {
                from,
                local_field,
                foreign_field,
                as_field,
            } => lookup(store, docs, from, local_field, foreign_field, as_field).await?,
            Stage::Unwind {
                path,
                preserve_empty,
            } => unwind(docs, path, *preserve_empty),
            Stage::Project { exclude } => docs
                .into_iter()
                .map(|mut d| {
                    for field in exclude {
                        d.remove(field);
                    }
                    d
                })
                .collect(),
            Stage::Sort { field, descending } => {
                docs.sort_by(|a, b| {
                    let ord = compare_values(get_path(a, field), get_path(b, field));
                    if *descending { ord.reverse() } else { ord }
                });
                docs
            }
            Stage::Limit(n) => {
                docs.truncate(*n);
                docs
            }
        };
    }

    Ok(docs)
}

async fn lookup<S>(
    store: &S,
    mut docs: Vec<Document>,
    from: &str,
    local_field: &str,
    foreign_field: &str,
    as_field: &str,
) -> StoreResult<Vec<Document>>
where
    S: DocumentStore + ?Sized,
{
    let mut per_doc: Vec<Vec<Value>> = Vec::with_capacity(docs.len());
    let mut wanted: Vec<Value> = Vec::new();
    for doc in &docs {
        let mut keys = Vec::new();
        collect_path(&Value::Object(doc.clone()), local_field, &mut keys);
        for key in &keys {
            if !wanted.contains(key) {
                wanted.push(key.clone());
            }
        }
        per_doc.push(keys);
    }

    let joined = if wanted.is_empty() {
        Vec::new()
    } else {
        store
            .find_many(from, &Filter::new().is_in(foreign_field, wanted))
            .await?
    };

    for (doc, keys) in docs.iter_mut().zip(per_doc) {
        let matched: Vec<Value> = joined
            .iter()
            .filter(|j| get_path(j, foreign_field).is_some_and(|v| keys.contains(v)))
            .cloned()
            .map(Value::Object)
            .collect();
        doc.insert(as_field.to_string(), Value::Array(matched));
    }

    Ok(docs)
}

fn unwind(docs: Vec<Document>, path: &str, preserve_empty: bool) -> Vec<Document> {
    let mut out = Vec::with_capacity(docs.len());
    for mut doc in docs {
        match doc.remove(path) {
            Some(Value::Array(items)) if !items.is_empty() => {
                for item in items {
                    let mut copy = doc.clone();
                    copy.insert(path.to_string(), item);
                    out.push(copy);
                }
            }
            Some(Value::Array(_)) | Some(Value::Null) | None => {
                if preserve_empty {
                    out.push(doc);
                }
            }
            Some(scalar) => {
                doc.insert(path.to_string(), scalar);
                out.push(doc);
            }
        }
    }
    out
}

/// Total order over JSON values for sorting: missing < null < bool < number < string
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
