use std::sync::Arc;

use crate::engine::core::dictionary::{
    ColumnIdentifier, DictionaryCache, InMemoryDictionaryCache, MapResolver, ValueResolver,
};
use crate::engine::schema::{DataType, StorageColumn};
use crate::engine::types::Value;

#[test]
fn map_resolver_assigns_surrogates_after_member_default() {
    let resolver = MapResolver::from_sequence(vec![
        Value::String("de".into()),
        Value::String("fr".into()),
    ]);
    assert_eq!(resolver.resolve(1), None);
    assert_eq!(resolver.resolve(2), Some(Value::String("de".into())));
    assert_eq!(resolver.resolve(3), Some(Value::String("fr".into())));
    assert_eq!(resolver.surrogate_of(&Value::String("fr".into())), Some(3));
    assert_eq!(resolver.len(), 2);
}

#[test]
fn in_memory_cache_registers_and_evicts() {
    let cache = InMemoryDictionaryCache::new();
    let column = StorageColumn::dictionary("country", 0, DataType::String).with_column_id("c-01");
    let id = ColumnIdentifier::from(&column);
    assert_eq!(id.as_str(), "c-01");
    assert!(cache.lookup(&id).is_none());

    cache.register(
        id.clone(),
        Arc::new(MapResolver::from_sequence(vec![Value::String("nl".into())])),
    );
    let resolver = cache.lookup(&id).expect("registered resolver");
    assert_eq!(resolver.resolve(2), Some(Value::String("nl".into())));
    assert_eq!(cache.len(), 1);

    assert!(cache.evict(&id));
    assert!(!cache.evict(&id));
    assert!(cache.is_empty());
}
