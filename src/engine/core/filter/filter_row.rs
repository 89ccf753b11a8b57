use crate::engine::errors::FilterError;
use crate::engine::types::Value;

/// Reusable slot array the predicate reads from.
///
/// Dimension values sit at their dimension ordinal; measure values follow
/// the dimension ordinal space. Slots never written for a scan keep `Null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRow {
    values: Vec<Value>,
}

impl FilterRow {
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![Value::Null; len],
        }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, slot: usize) -> Result<&Value, FilterError> {
        self.values.get(slot).ok_or(FilterError::MissingSlot(slot))
    }

    pub fn slot_mut(&mut self, slot: usize) -> Result<&mut Value, FilterError> {
        self.values
            .get_mut(slot)
            .ok_or(FilterError::MissingSlot(slot))
    }

    pub fn set(&mut self, slot: usize, value: Value) -> Result<(), FilterError> {
        *self.slot_mut(slot)? = value;
        Ok(())
    }

    /// Writes `bytes` into the slot, reusing its buffer.
    #[inline]
    pub fn set_bytes(&mut self, slot: usize, bytes: &[u8]) -> Result<(), FilterError> {
        self.slot_mut(slot)?.set_bytes(bytes);
        Ok(())
    }
}
