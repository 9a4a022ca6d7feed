// PageGate - Table Store Contract
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Generic record operations keyed by logical resource name. Pages and the
// auth provider consume this seam; the dispatcher itself never touches it.
// Resource names may carry a PostgREST-style filter suffix, e.g.
// "lessons?author_id=eq.42" — both backends honor it for list().

use anyhow::Result;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

/// Resource name split into table + optional equality filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKey<'a> {
    pub table: &'a str,
    /// (field, expected value) from a "?field=eq.value" suffix
    pub filter: Option<(&'a str, &'a str)>,
}

/// Parse "table?field=eq.value" — anything malformed degrades to no filter
pub fn parse_resource(resource: &str) -> ResourceKey<'_> {
    match resource.split_once('?') {
        None => ResourceKey {
            table: resource,
            filter: None,
        },
        Some((table, suffix)) => {
            let filter = suffix
                .split_once('=')
                .and_then(|(field, op)| op.strip_prefix("eq.").map(|v| (field, v)));
            ResourceKey { table, filter }
        }
    }
}

/// Does a record satisfy an equality filter? Values compared as strings
/// so numeric ids filter the same way PostgREST treats them.
pub fn matches_filter(record: &Value, filter: Option<(&str, &str)>) -> bool {
    match filter {
        None => true,
        Some((field, want)) => match record.get(field) {
            Some(Value::String(s)) => s == want,
            Some(Value::Number(n)) => n.to_string() == want,
            Some(Value::Bool(b)) => b.to_string() == want,
            _ => false,
        },
    }
}

/// Record field as display text ("?" when absent). Pages render lists of
/// records and never care about the underlying JSON type.
pub fn field_text(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => "?".to_string(),
    }
}

/// The data collaborator: list/get/insert/update/delete over JSON records.
/// Implementations: TableDb (LMDB), RemoteTableStore (hosted backend),
/// MemoryStore (tests and demo seeding).
pub trait TableStore {
    fn list(&self, resource: &str) -> Result<Vec<Value>>;
    fn get(&self, resource: &str, id: &str) -> Result<Option<Value>>;
    /// Insert a record; the stored copy (with assigned id) is returned
    fn insert(&self, resource: &str, record: Value) -> Result<Value>;
    /// Shallow-merge a patch into an existing record
    fn update(&self, resource: &str, id: &str, patch: Value) -> Result<Option<Value>>;
    fn delete(&self, resource: &str, id: &str) -> Result<bool>;
}

/// In-memory store. Backs tests and the demo seed; same contract as the
/// persistent backends.
pub struct MemoryStore {
    tables: RefCell<HashMap<String, Vec<Value>>>,
    next_id: RefCell<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RefCell::new(HashMap::new()),
            next_id: RefCell::new(1),
        }
    }

    fn assign_id(&self, record: &mut Value) -> String {
        if let Some(id) = record.get("id").and_then(|v| v.as_str()) {
            return id.to_string();
        }
        let mut next = self.next_id.borrow_mut();
        let id = next.to_string();
        *next += 1;
        if let Value::Object(map) = record {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        id
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore for MemoryStore {
    fn list(&self, resource: &str) -> Result<Vec<Value>> {
        let key = parse_resource(resource);
        let tables = self.tables.borrow();
        let rows = tables.get(key.table).cloned().unwrap_or_default();
        Ok(rows
            .into_iter()
            .filter(|r| matches_filter(r, key.filter))
            .collect())
    }

    fn get(&self, resource: &str, id: &str) -> Result<Option<Value>> {
        let key = parse_resource(resource);
        let tables = self.tables.borrow();
        Ok(tables.get(key.table).and_then(|rows| {
            rows.iter()
                .find(|r| r.get("id").and_then(|v| v.as_str()) == Some(id))
                .cloned()
        }))
    }

    fn insert(&self, resource: &str, mut record: Value) -> Result<Value> {
        let key = parse_resource(resource);
        self.assign_id(&mut record);
        self.tables
            .borrow_mut()
            .entry(key.table.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn update(&self, resource: &str, id: &str, patch: Value) -> Result<Option<Value>> {
        let key = parse_resource(resource);
        let mut tables = self.tables.borrow_mut();
        let rows = match tables.get_mut(key.table) {
            Some(rows) => rows,
            None => return Ok(None),
        };
        for row in rows.iter_mut() {
            if row.get("id").and_then(|v| v.as_str()) == Some(id) {
                if let (Value::Object(target), Value::Object(fields)) = (&mut *row, &patch) {
                    for (k, v) in fields {
                        target.insert(k.clone(), v.clone());
                    }
                }
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    fn delete(&self, resource: &str, id: &str) -> Result<bool> {
        let key = parse_resource(resource);
        let mut tables = self.tables.borrow_mut();
        let rows = match tables.get_mut(key.table) {
            Some(rows) => rows,
            None => return Ok(false),
        };
        let before = rows.len();
        rows.retain(|r| r.get("id").and_then(|v| v.as_str()) != Some(id));
        Ok(rows.len() < before)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_key_parsing() {
        assert_eq!(
            parse_resource("lessons"),
            ResourceKey { table: "lessons", filter: None }
        );
        assert_eq!(
            parse_resource("lessons?author_id=eq.42"),
            ResourceKey { table: "lessons", filter: Some(("author_id", "42")) }
        );
        // Unknown operator degrades to unfiltered
        assert_eq!(parse_resource("lessons?author_id=gt.42").filter, None);
    }

    #[test]
    fn insert_assigns_sequential_ids() {
        let store = MemoryStore::new();
        let a = store.insert("users", json!({"email": "a@portal"})).unwrap();
        let b = store.insert("users", json!({"email": "b@portal"})).unwrap();
        assert_eq!(a["id"], "1");
        assert_eq!(b["id"], "2");
    }

    #[test]
    fn list_honors_equality_filter() {
        let store = MemoryStore::new();
        store
            .insert("lessons", json!({"title": "Algebra", "author_id": "t1"}))
            .unwrap();
        store
            .insert("lessons", json!({"title": "Geometry", "author_id": "t2"}))
            .unwrap();

        let mine = store.list("lessons?author_id=eq.t1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["title"], "Algebra");

        let all = store.list("lessons").unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn numeric_fields_filter_as_strings() {
        let store = MemoryStore::new();
        store.insert("quizzes", json!({"lesson_id": 7})).unwrap();
        let hits = store.list("quizzes?lesson_id=eq.7").unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn get_update_delete_round_trip() {
        let store = MemoryStore::new();
        let row = store
            .insert("users", json!({"email": "x@portal", "role": "student"}))
            .unwrap();
        let id = row["id"].as_str().unwrap().to_string();

        let fetched = store.get("users", &id).unwrap().unwrap();
        assert_eq!(fetched["role"], "student");

        let updated = store
            .update("users", &id, json!({"role": "teacher"}))
            .unwrap()
            .unwrap();
        assert_eq!(updated["role"], "teacher");
        assert_eq!(updated["email"], "x@portal");

        assert!(store.delete("users", &id).unwrap());
        assert!(store.get("users", &id).unwrap().is_none());
        assert!(!store.delete("users", &id).unwrap());
    }
}
