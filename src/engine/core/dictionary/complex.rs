use std::sync::Arc;

use tracing::warn;

use crate::engine::core::dictionary::{
    ColumnIdentifier, DictionaryCache, DirectDictionaryGenerator, ValueResolver,
};
use crate::engine::errors::ScanError;
use crate::engine::schema::{ColumnEncoding, DataType, StorageColumn};
use crate::engine::types::{Value, no_dictionary};
use crate::shared::config::DirectDictionaryConfig;

/// Turns the nested-encoded bytes of a complex column into a value.
pub trait ComplexTypeDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Value, ScanError>;
}

/// Lets a host replace the nested decoder of selected complex columns.
pub trait ComplexDecoderProvider: Send + Sync {
    fn decoder_for(&self, column: &StorageColumn) -> Option<Arc<dyn ComplexTypeDecoder>>;
}

/// Decoder for the default nested layout:
/// arrays as `[i32 count][child]*`, structs as `[i16 fields][child]*`, and
/// primitive leaves encoded like their top-level counterparts.
pub struct NestedTypeDecoder {
    root: Node,
}

enum Node {
    Array(Box<Node>),
    Struct(Vec<Node>),
    NoDictionary(DataType),
    Direct(DirectDictionaryGenerator),
    /// Without a resolver the surrogate is forwarded as `Int`
    Dictionary(Option<Arc<dyn ValueResolver>>),
}

impl NestedTypeDecoder {
    pub fn new(
        column: &StorageColumn,
        dictionary: Option<&dyn DictionaryCache>,
        direct: &DirectDictionaryConfig,
    ) -> Result<Self, ScanError> {
        Ok(Self {
            root: build_node(column, dictionary, direct)?,
        })
    }
}

fn build_node(
    column: &StorageColumn,
    dictionary: Option<&dyn DictionaryCache>,
    direct: &DirectDictionaryConfig,
) -> Result<Node, ScanError> {
    Ok(match column.encoding {
        ColumnEncoding::Complex => match column.data_type {
            DataType::Array => {
                let child = column.children.first().ok_or_else(|| {
                    ScanError::ComplexDecode(format!("array '{}' has no child", column.name))
                })?;
                Node::Array(Box::new(build_node(child, dictionary, direct)?))
            }
            _ => Node::Struct(
                column
                    .children
                    .iter()
                    .map(|c| build_node(c, dictionary, direct))
                    .collect::<Result<_, _>>()?,
            ),
        },
        ColumnEncoding::DirectDictionary => Node::Direct(DirectDictionaryGenerator::for_type(
            &column.data_type,
            direct,
        )?),
        ColumnEncoding::Dictionary => {
            let resolver = dictionary.and_then(|d| d.lookup(&ColumnIdentifier::from(column)));
            if resolver.is_none() {
                warn!(
                    target: "segment_stream::dictionary",
                    column = %column.column_id,
                    "No dictionary registered; forwarding surrogates"
                );
            }
            Node::Dictionary(resolver)
        }
        ColumnEncoding::NoDictionary | ColumnEncoding::Plain => {
            Node::NoDictionary(column.data_type.clone())
        }
    })
}

impl ComplexTypeDecoder for NestedTypeDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Value, ScanError> {
        let mut cursor = Cursor { bytes, pos: 0 };
        let value = self.root.decode(&mut cursor)?;
        if cursor.pos != bytes.len() {
            return Err(ScanError::ComplexDecode(format!(
                "{} trailing bytes after nested value",
                bytes.len() - cursor.pos
            )));
        }
        Ok(value)
    }
}

impl Node {
    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Value, ScanError> {
        match self {
            Node::Array(child) => {
                let count = cursor.read_i32()?;
                let count = usize::try_from(count).map_err(|_| {
                    ScanError::ComplexDecode(format!("negative array length {count}"))
                })?;
                let mut items = Vec::with_capacity(count.min(cursor.remaining()));
                for _ in 0..count {
                    items.push(child.decode(cursor)?);
                }
                Ok(Value::Array(items))
            }
            Node::Struct(children) => {
                let fields = cursor.read_i16()?;
                if usize::try_from(fields).ok() != Some(children.len()) {
                    return Err(ScanError::ComplexDecode(format!(
                        "struct has {} fields, schema declares {}",
                        fields,
                        children.len()
                    )));
                }
                children
                    .iter()
                    .map(|c| c.decode(cursor))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Struct)
            }
            Node::NoDictionary(data_type) => {
                let len = cursor.read_u16()? as usize;
                no_dictionary::decode(cursor.take(len)?, data_type)
            }
            Node::Direct(generator) => generator.value_of(cursor.read_i32()?),
            Node::Dictionary(resolver) => {
                let surrogate = cursor.read_i32()?;
                Ok(match resolver {
                    Some(r) => r.resolve(surrogate).unwrap_or(Value::Null),
                    None => Value::Int(surrogate),
                })
            }
        }
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ScanError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                ScanError::ComplexDecode(format!(
                    "nested value truncated: need {} bytes at {} of {}",
                    n,
                    self.pos,
                    self.bytes.len()
                ))
            })?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn read_i32(&mut self) -> Result<i32, ScanError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(i32::from_be_bytes(raw))
    }

    fn read_i16(&mut self) -> Result<i16, ScanError> {
        let mut raw = [0u8; 2];
        raw.copy_from_slice(self.take(2)?);
        Ok(i16::from_be_bytes(raw))
    }

    fn read_u16(&mut self) -> Result<u16, ScanError> {
        let mut raw = [0u8; 2];
        raw.copy_from_slice(self.take(2)?);
        Ok(u16::from_be_bytes(raw))
    }
}
