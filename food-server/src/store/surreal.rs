//! SurrealDB document store
//!
//! 嵌入式 SurrealDB (RocksDB) 后端。文档以 `doc_id` 字段保存其字符串 ID，
//! 记录 ID 为 `collection:doc_id`；读取时 `doc_id` 还原为 `id`。
//! 过滤条件翻译为参数化的 WHERE 子句，字段名只允许标识符。

use async_trait::async_trait;
use serde_json::Value;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

use super::filter::Condition;
use super::{Document, DocumentStore, Filter, StoreError, StoreResult};
use crate::utils::id::new_object_id;

const ID_FIELD: &str = "doc_id";

#[derive(Clone)]
pub struct SurrealStore {
    db: Surreal<Db>,
}

impl SurrealStore {
    /// Open (or create) the embedded database at `path`
    pub async fn open(path: &str, namespace: &str, database: &str) -> StoreResult<Self> {
        let db = Surreal::new::<RocksDb>(path).await?;
        db.use_ns(namespace).use_db(database).await?;
        tracing::info!(path, namespace, database, "SurrealDB store opened");
        Ok(Self { db })
    }

    pub fn from_db(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

/// WHERE clause plus its bound parameters
#[derive(Debug, Default)]
struct WhereClause {
    sql: String,
    binds: Vec<(String, Value)>,
}

fn validate_field(field: &str) -> StoreResult<String> {
    let valid = !field.is_empty()
        && field.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if !valid {
        return Err(StoreError::InvalidQuery(format!("invalid field name: {field}")));
    }
    Ok(if field == "id" {
        ID_FIELD.to_string()
    } else {
        field.to_string()
    })
}

fn build_where(filter: &Filter) -> StoreResult<WhereClause> {
    let mut clause = WhereClause::default();
    let mut parts = Vec::with_capacity(filter.conditions().len());

    for (i, condition) in filter.conditions().iter().enumerate() {
        let param = format!("p{i}");
        match condition {
            Condition::Eq(field, value) => {
                parts.push(format!("{} = ${param}", validate_field(field)?));
                clause.binds.push((param, value.clone()));
            }
            Condition::Ne(field, value) => {
                parts.push(format!("{} != ${param}", validate_field(field)?));
                clause.binds.push((param, value.clone()));
            }
            Condition::In(field, values) => {
                parts.push(format!("{} INSIDE ${param}", validate_field(field)?));
                clause.binds.push((param, Value::Array(values.clone())));
            }
            Condition::Search { fields, needle } => {
                let ors = fields
                    .iter()
                    .map(|f| {
                        validate_field(f)
                            .map(|f| format!("string::lowercase({f} ?? '') CONTAINS ${param}"))
                    })
                    .collect::<StoreResult<Vec<_>>>()?;
                parts.push(format!("({})", ors.join(" OR ")));
                clause.binds.push((param, Value::String(needle.clone())));
            }
        }
    }

    if !parts.is_empty() {
        clause.sql = format!(" WHERE {}", parts.join(" AND "));
    }
    Ok(clause)
}

/// Stored row -> document (`doc_id` back to `id`)
fn restore_id(row: Value) -> StoreResult<Document> {
    let Value::Object(mut doc) = row else {
        return Err(StoreError::Serialization("row is not an object".into()));
    };
    if let Some(id) = doc.remove(ID_FIELD) {
        doc.insert("id".to_string(), id);
    }
    Ok(doc)
}

#[async_trait]
impl DocumentStore for SurrealStore {
    fn backend(&self) -> &'static str {
        "surrealdb"
    }

    async fn find_many(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let clause = build_where(filter)?;
        let sql = format!("SELECT * OMIT id FROM type::table($tb){}", clause.sql);
        let mut query = self.db.query(sql).bind(("tb", collection.to_string()));
        for bind in clause.binds {
            query = query.bind(bind);
        }
        let rows: Vec<Value> = query.await?.take(0)?;
        rows.into_iter().map(restore_id).collect()
    }

    async fn insert(&self, collection: &str, mut doc: Document) -> StoreResult<String> {
        let id = match doc.remove("id") {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => new_object_id(),
        };
        doc.insert(ID_FIELD.to_string(), Value::String(id.clone()));

        let result = self
            .db
            .query("CREATE type::thing($tb, $key) CONTENT $doc RETURN NONE")
            .bind(("tb", collection.to_string()))
            .bind(("key", id.clone()))
            .bind(("doc", Value::Object(doc)))
            .await?
            .check();

        match result {
            Ok(_) => Ok(id),
            Err(e) if e.to_string().contains("already exists") => {
                Err(StoreError::Duplicate(format!("{collection}:{id}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, collection: &str, filter: &Filter, mut patch: Document) -> StoreResult<u64> {
        patch.remove("id");
        patch.remove(ID_FIELD);
        let clause = build_where(filter)?;
        let sql = format!(
            "UPDATE type::table($tb) MERGE $patch{} RETURN {ID_FIELD}",
            clause.sql
        );
        let mut query = self
            .db
            .query(sql)
            .bind(("tb", collection.to_string()))
            .bind(("patch", Value::Object(patch)));
        for bind in clause.binds {
            query = query.bind(bind);
        }
        let rows: Vec<Value> = query.await?.take(0)?;
        Ok(rows.len() as u64)
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let clause = build_where(filter)?;
        let sql = format!(
            "DELETE type::table($tb){} RETURN $before.{ID_FIELD}",
            clause.sql
        );
        let mut query = self.db.query(sql).bind(("tb", collection.to_string()));
        for bind in clause.binds {
            query = query.bind(bind);
        }
        let mut response = query.await?.check()?;
        let removed: Vec<Value> = response.take(0)?;
        Ok(removed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_where_clause_translation() {
        let filter = Filter::by_id("o1")
            .eq("status", "in_progress")
            .is_in("table_id", ["t1", "t2"])
            .search(&["name", "email"], "Aung");
        let clause = build_where(&filter).unwrap();

        assert_eq!(
            clause.sql,
            " WHERE doc_id = $p0 AND status = $p1 AND table_id INSIDE $p2 AND \
             (string::lowercase(name ?? '') CONTAINS $p3 OR string::lowercase(email ?? '') CONTAINS $p3)"
        );
        assert_eq!(clause.binds.len(), 4);
        assert_eq!(clause.binds[3].1, json!("aung"));
    }

    #[test]
    fn test_empty_filter_has_no_where() {
        assert!(build_where(&Filter::new()).unwrap().sql.is_empty());
    }

    #[test]
    fn test_field_names_are_validated() {
        assert!(build_where(&Filter::new().eq("name; DELETE users", 1)).is_err());
        assert!(build_where(&Filter::new().eq("menu_items.menu_id", "m")).is_ok());
        assert!(build_where(&Filter::new().eq("1abc", 1)).is_err());
    }

    #[test]
    fn test_restore_id() {
        let doc = restore_id(json!({"doc_id": "abc", "name": "A1"})).unwrap();
        assert_eq!(doc["id"], "abc");
        assert!(doc.get("doc_id").is_none());
    }
}
