//! Static data tables.
//!
//! Tables are JSON text assets stored under the `tables` group and loaded
//! through the [`AssetCache`]. Two shapes are accepted:
//!
//! - an array of objects, each carrying an `id` field;
//! - an object keyed by id.
//!
//! Ids are compared by their string form, so `3` and `"3"` match the same
//! record.

use crate::resources::address::{Address, AddressGroup};
use crate::resources::assetcache::AssetCache;
use bevy_ecs::prelude::Resource;
use log::{error, info, warn};
use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("table not found: {0}")]
    Missing(String),

    #[error("error parsing table {table}: {details}")]
    Parse { table: String, details: String },
}

#[derive(Resource, Default)]
pub struct TableReader {
    tables: FxHashMap<String, Value>,
}

impl TableReader {
    pub fn new() -> Self {
        info!("[TableReader] Initialized");
        TableReader::default()
    }

    /// Address of a table's JSON text.
    pub fn table_address(name: &str) -> Address {
        Address::in_group(AddressGroup::Tables, name)
    }

    /// Load and parse a table. Loading an already loaded table is a no-op.
    pub fn load_table(&mut self, cache: &mut AssetCache, name: &str) -> Result<(), TableError> {
        if self.tables.contains_key(name) {
            warn!("[TableReader] Table already loaded: {}", name);
            return Ok(());
        }
        let text = cache
            .text(&Self::table_address(name))
            .ok_or_else(|| TableError::Missing(name.to_string()))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| TableError::Parse {
            table: name.to_string(),
            details: e.to_string(),
        })?;
        self.tables.insert(name.to_string(), value);
        info!("[TableReader] Loaded table: {}", name);
        Ok(())
    }

    /// Whole table, loading it on demand.
    pub fn table(&mut self, cache: &mut AssetCache, name: &str) -> Option<&Value> {
        if !self.tables.contains_key(name) {
            if let Err(e) = self.load_table(cache, name) {
                error!("[TableReader] Failed to load table {}: {}", name, e);
                return None;
            }
        }
        self.tables.get(name)
    }

    /// One record by id, loading the table on demand.
    pub fn record(&mut self, cache: &mut AssetCache, name: &str, id: &str) -> Option<&Value> {
        let table = self.table(cache, name)?;
        find_record(table, id)
    }

    pub fn unload_table(&mut self, name: &str) {
        if self.tables.remove(name).is_some() {
            info!("[TableReader] Unloaded table: {}", name);
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}

/// Locate a record by id in either supported table shape.
pub fn find_record<'a>(table: &'a Value, id: &str) -> Option<&'a Value> {
    match table {
        Value::Array(rows) => rows
            .iter()
            .find(|row| row.get("id").and_then(id_string).as_deref() == Some(id)),
        Value::Object(map) => map.get(id),
        _ => None,
    }
}

fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer field that may be stored as a number or a numeric string.
pub fn field_i64(record: &Value, field: &str) -> Option<i64> {
    match record.get(field)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn field_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(field)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::assetloader::{Asset, AssetError, AssetKind, AssetLoader};
    use serde_json::json;
    use std::sync::Arc;

    struct Tables;

    impl AssetLoader for Tables {
        fn load(&self, address: &Address, _kind: AssetKind) -> Result<Asset, AssetError> {
            let text = match address.as_str() {
                "tables/Units" => r#"[{"id": 1, "name": "Knight"}, {"id": "2", "name": "Archer"}]"#,
                "tables/Keyed" => r#"{"7": {"name": "Seven"}}"#,
                "tables/Broken" => "[{",
                _ => return Err(AssetError::NotFound(address.clone())),
            };
            Ok(Asset::Text(text.to_string()))
        }
    }

    fn cache() -> AssetCache {
        AssetCache::new(Arc::new(Tables))
    }

    #[test]
    fn record_matches_numeric_and_string_ids() {
        let mut cache = cache();
        let mut tables = TableReader::new();
        let knight = tables.record(&mut cache, "Units", "1").unwrap();
        assert_eq!(field_str(knight, "name"), Some("Knight"));
        let archer = tables.record(&mut cache, "Units", "2").unwrap();
        assert_eq!(field_str(archer, "name"), Some("Archer"));
        assert!(tables.record(&mut cache, "Units", "3").is_none());
    }

    #[test]
    fn keyed_tables_are_supported() {
        let mut cache = cache();
        let mut tables = TableReader::new();
        let rec = tables.record(&mut cache, "Keyed", "7").unwrap();
        assert_eq!(field_str(rec, "name"), Some("Seven"));
    }

    #[test]
    fn missing_and_broken_tables_yield_none() {
        let mut cache = cache();
        let mut tables = TableReader::new();
        assert!(tables.table(&mut cache, "Nope").is_none());
        assert!(tables.table(&mut cache, "Broken").is_none());
        assert!(!tables.is_loaded("Broken"));
        assert!(matches!(
            tables.load_table(&mut cache, "Broken"),
            Err(TableError::Parse { .. })
        ));
    }

    #[test]
    fn double_load_is_noop_and_unload_forgets() {
        let mut cache = cache();
        let mut tables = TableReader::new();
        tables.load_table(&mut cache, "Units").unwrap();
        tables.load_table(&mut cache, "Units").unwrap();
        assert_eq!(cache.loads_issued(), 1);
        tables.unload_table("Units");
        assert!(!tables.is_loaded("Units"));
    }

    #[test]
    fn field_i64_accepts_numeric_strings() {
        let rec = json!({"a": 5, "b": "12", "c": "x"});
        assert_eq!(field_i64(&rec, "a"), Some(5));
        assert_eq!(field_i64(&rec, "b"), Some(12));
        assert_eq!(field_i64(&rec, "c"), None);
        assert_eq!(field_i64(&rec, "d"), None);
    }
}
