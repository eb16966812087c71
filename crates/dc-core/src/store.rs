//! The recorded output store and its on-disk envelope.
//!
//! The store maps qualified names to value trees. It is append-only while a
//! collect session runs (insert-once) and read-only while a verify session
//! runs. On disk it is pretty JSON wrapped in a versioned envelope so
//! incompatible files fail loudly instead of mis-comparing.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use dc_common::{Error, Result, Value};

/// Schema version for persisted output stores.
pub const STORE_SCHEMA_VERSION: &str = "1.0.0";

/// Versioned on-disk envelope for the store.
#[derive(Debug, Serialize, Deserialize)]
struct StoreEnvelope {
    /// Schema version for compatibility checking.
    schema_version: String,

    /// Recorded outputs keyed by qualified name.
    records: BTreeMap<String, Value>,
}

/// Mapping from qualified name to recorded value tree.
#[derive(Debug, Clone, Default)]
pub struct OutputStore {
    records: BTreeMap<String, Value>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value under a qualified name. Returns false without
    /// touching the store if the name is already present (insert-once).
    pub fn insert(&mut self, name: String, value: Value) -> bool {
        use std::collections::btree_map::Entry;
        match self.records.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.records.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Recorded qualified names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Width of the longest qualified name, for aligned drift rows.
    pub fn name_width(&self) -> usize {
        self.records.keys().map(|name| name.len()).max().unwrap_or(0)
    }

    /// Save the store to a pretty-JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let envelope = StoreEnvelope {
            schema_version: STORE_SCHEMA_VERSION.to_string(),
            records: self.records.clone(),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&envelope)?;
        fs::write(path, json)?;
        info!(path = %path.display(), records = self.records.len(), "collected outputs saved");
        Ok(())
    }

    /// Load a store from a JSON file, rejecting incompatible major versions.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let envelope: StoreEnvelope = serde_json::from_str(&content)?;

        let major = schema_major(&envelope.schema_version);
        if major != schema_major(STORE_SCHEMA_VERSION) {
            return Err(Error::IncompatibleSchema {
                found: envelope.schema_version,
                expected: STORE_SCHEMA_VERSION.to_string(),
            });
        }

        info!(path = %path.display(), records = envelope.records.len(), "collected outputs loaded");
        Ok(Self {
            records: envelope.records,
        })
    }
}

fn schema_major(version: &str) -> u32 {
    version
        .split('.')
        .next()
        .unwrap_or("0")
        .parse::<u32>()
        .unwrap_or(0)
}
