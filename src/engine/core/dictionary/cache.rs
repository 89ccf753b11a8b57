use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::engine::schema::StorageColumn;
use crate::engine::types::Value;

/// Key under which a column's dictionary is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnIdentifier {
    column_id: String,
}

impl ColumnIdentifier {
    pub fn new(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.column_id
    }
}

impl From<&StorageColumn> for ColumnIdentifier {
    fn from(column: &StorageColumn) -> Self {
        Self::new(column.column_id.clone())
    }
}

impl fmt::Display for ColumnIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_id)
    }
}

/// Maps surrogate keys of one column to their values.
pub trait ValueResolver: Send + Sync {
    fn resolve(&self, surrogate: i32) -> Option<Value>;
}

/// Read-mostly dictionary lookup shared by concurrent scans. Loading and
/// eviction belong to whoever owns the cache.
pub trait DictionaryCache: Send + Sync {
    fn lookup(&self, column: &ColumnIdentifier) -> Option<Arc<dyn ValueResolver>>;
}

/// Resolver over a fixed surrogate table.
#[derive(Debug, Default, Clone)]
pub struct MapResolver {
    values: HashMap<i32, Value>,
}

impl MapResolver {
    pub fn new(values: HashMap<i32, Value>) -> Self {
        Self { values }
    }

    /// Assigns surrogates in order starting at 2; 1 is reserved for the
    /// member default.
    pub fn from_sequence(values: impl IntoIterator<Item = Value>) -> Self {
        let values = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i as i32 + 2, v))
            .collect();
        Self { values }
    }

    pub fn surrogate_of(&self, value: &Value) -> Option<i32> {
        self.values
            .iter()
            .find_map(|(k, v)| (v == value).then_some(*k))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ValueResolver for MapResolver {
    fn resolve(&self, surrogate: i32) -> Option<Value> {
        self.values.get(&surrogate).cloned()
    }
}

#[derive(Default)]
pub struct InMemoryDictionaryCache {
    entries: RwLock<HashMap<ColumnIdentifier, Arc<dyn ValueResolver>>>,
}

impl InMemoryDictionaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, column: ColumnIdentifier, resolver: Arc<dyn ValueResolver>) {
        debug!(target: "segment_stream::dictionary", column = %column, "Registered dictionary");
        self.entries.write().insert(column, resolver);
    }

    pub fn evict(&self, column: &ColumnIdentifier) -> bool {
        self.entries.write().remove(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl DictionaryCache for InMemoryDictionaryCache {
    fn lookup(&self, column: &ColumnIdentifier) -> Option<Arc<dyn ValueResolver>> {
        self.entries.read().get(column).cloned()
    }
}
