// PageGate - Tables LMDB
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// LMDB-backed table store: the local data backend behind the generic
// list/insert/update/delete seam. Records are JSON under "table/id" keys;
// per-table id sequences live in a separate meta database.
//
// Database: TABLES
// Storage: LIVE/TABLES/TABLES.DB/

use crate::store::{matches_filter, parse_resource, TableStore};
use anyhow::{anyhow, Result};
use chrono::Utc;
use heed::types::*;
use heed::{Database, Env, EnvOpenOptions};
use serde_json::Value;
use std::path::Path;

const MAX_DB_SIZE: usize = 50 * 1024 * 1024; // 50MB

/// LMDB-backed table store
pub struct TableDb {
    env: Env,
    /// Record store: "table/id" -> JSON
    data: Database<Str, Str>,
    /// Bookkeeping: "seq:table" -> next id
    meta: Database<Str, Str>,
}

impl TableDb {
    /// Open or create the tables LMDB at the given path
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(MAX_DB_SIZE)
                .max_dbs(4)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let data = env.create_database(&mut wtxn, Some("tables"))?;
        let meta = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        log::info!("TABLES LMDB opened at {:?}", path);
        Ok(Self { env, data, meta })
    }

    fn record_key(table: &str, id: &str) -> String {
        format!("{}/{}", table, id)
    }

    /// Next id for a table, advancing the stored sequence
    fn next_id(&self, wtxn: &mut heed::RwTxn, table: &str) -> Result<String> {
        let seq_key = format!("seq:{}", table);
        let next: u64 = self
            .meta
            .get(wtxn, &seq_key)?
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        self.meta.put(wtxn, &seq_key, &(next + 1).to_string())?;
        Ok(next.to_string())
    }

    /// Total stored records (diagnostics)
    pub fn entry_count(&self) -> Result<u64> {
        let rtxn = self.env.read_txn()?;
        let stat = self.data.stat(&rtxn)?;
        Ok(stat.entries as u64)
    }
}

impl TableStore for TableDb {
    fn list(&self, resource: &str) -> Result<Vec<Value>> {
        let key = parse_resource(resource);
        let prefix = format!("{}/", key.table);
        let rtxn = self.env.read_txn()?;
        let mut rows = Vec::new();
        for result in self.data.prefix_iter(&rtxn, &prefix)? {
            let (_, json) = result?;
            let record: Value = serde_json::from_str(json)?;
            if matches_filter(&record, key.filter) {
                rows.push(record);
            }
        }
        Ok(rows)
    }

    fn get(&self, resource: &str, id: &str) -> Result<Option<Value>> {
        let key = parse_resource(resource);
        let rtxn = self.env.read_txn()?;
        match self.data.get(&rtxn, &Self::record_key(key.table, id))? {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, resource: &str, mut record: Value) -> Result<Value> {
        let key = parse_resource(resource);
        let mut wtxn = self.env.write_txn()?;

        let id = match record.get("id").and_then(|v| v.as_str()) {
            Some(id) => id.to_string(),
            None => self.next_id(&mut wtxn, key.table)?,
        };
        let map = record
            .as_object_mut()
            .ok_or_else(|| anyhow!("record for '{}' must be a JSON object", key.table))?;
        map.insert("id".to_string(), Value::String(id.clone()));
        map.entry("created_at".to_string())
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        self.data.put(
            &mut wtxn,
            &Self::record_key(key.table, &id),
            &serde_json::to_string(&record)?,
        )?;
        wtxn.commit()?;
        Ok(record)
    }

    fn update(&self, resource: &str, id: &str, patch: Value) -> Result<Option<Value>> {
        let key = parse_resource(resource);
        let record_key = Self::record_key(key.table, id);
        let mut wtxn = self.env.write_txn()?;

        let mut record: Value = match self.data.get(&wtxn, &record_key)? {
            Some(json) => serde_json::from_str(json)?,
            None => return Ok(None),
        };
        if let (Value::Object(target), Value::Object(fields)) = (&mut record, &patch) {
            for (k, v) in fields {
                target.insert(k.clone(), v.clone());
            }
        }

        self.data
            .put(&mut wtxn, &record_key, &serde_json::to_string(&record)?)?;
        wtxn.commit()?;
        Ok(Some(record))
    }

    fn delete(&self, resource: &str, id: &str) -> Result<bool> {
        let key = parse_resource(resource);
        let mut wtxn = self.env.write_txn()?;
        let deleted = self.data.delete(&mut wtxn, &Self::record_key(key.table, id))?;
        wtxn.commit()?;
        Ok(deleted)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open_temp() -> (tempfile::TempDir, TableDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = TableDb::open(dir.path()).unwrap();
        (dir, db)
    }

    #[test]
    fn insert_assigns_ids_and_stamps() {
        let (_dir, db) = open_temp();
        let a = db.insert("lessons", json!({"title": "Algebra"})).unwrap();
        let b = db.insert("lessons", json!({"title": "Geometry"})).unwrap();
        assert_eq!(a["id"], "1");
        assert_eq!(b["id"], "2");
        assert!(a["created_at"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn explicit_ids_are_respected() {
        let (_dir, db) = open_temp();
        let row = db
            .insert("users", json!({"id": "t1", "email": "t@portal"}))
            .unwrap();
        assert_eq!(row["id"], "t1");
        assert_eq!(db.get("users", "t1").unwrap().unwrap()["email"], "t@portal");
    }

    #[test]
    fn list_scopes_to_table_and_filter() {
        let (_dir, db) = open_temp();
        db.insert("lessons", json!({"title": "A", "author_id": "t1"}))
            .unwrap();
        db.insert("lessons", json!({"title": "B", "author_id": "t2"}))
            .unwrap();
        db.insert("quizzes", json!({"title": "Q"})).unwrap();

        assert_eq!(db.list("lessons").unwrap().len(), 2);
        assert_eq!(db.list("quizzes").unwrap().len(), 1);

        let filtered = db.list("lessons?author_id=eq.t1").unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0]["title"], "A");
    }

    #[test]
    fn table_prefix_does_not_bleed() {
        // "topic" records must not surface when listing "topics" or vice versa
        let (_dir, db) = open_temp();
        db.insert("topic", json!({"title": "bare"})).unwrap();
        db.insert("topics", json!({"title": "plural"})).unwrap();
        let rows = db.list("topic").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], "bare");
    }

    #[test]
    fn update_merges_and_delete_removes() {
        let (_dir, db) = open_temp();
        let row = db
            .insert("users", json!({"email": "x@portal", "role": "student"}))
            .unwrap();
        let id = row["id"].as_str().unwrap().to_string();

        let updated = db
            .update("users", &id, json!({"role": "teacher"}))
            .unwrap()
            .unwrap();
        assert_eq!(updated["role"], "teacher");
        assert_eq!(updated["email"], "x@portal");

        assert!(db.delete("users", &id).unwrap());
        assert!(db.get("users", &id).unwrap().is_none());
        assert!(db.update("users", &id, json!({})).unwrap().is_none());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = TableDb::open(dir.path()).unwrap();
            db.insert("users", json!({"id": "u1", "email": "keep@portal"}))
                .unwrap();
        }
        let db = TableDb::open(dir.path()).unwrap();
        assert_eq!(
            db.get("users", "u1").unwrap().unwrap()["email"],
            "keep@portal"
        );
        assert_eq!(db.entry_count().unwrap(), 1);
    }
}
