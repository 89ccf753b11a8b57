pub mod cache;
pub mod complex;
pub mod direct;

pub use cache::{
    ColumnIdentifier, DictionaryCache, InMemoryDictionaryCache, MapResolver, ValueResolver,
};
pub use complex::{ComplexDecoderProvider, ComplexTypeDecoder, NestedTypeDecoder};
pub use direct::{DirectDictionaryGenerator, MEMBER_DEFAULT_SURROGATE};

#[cfg(test)]
mod cache_test;
