use serde::{Deserialize, Serialize};

/// Structured header that follows each blocklet's sync marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockletHeader {
    pub row_count: u32,
    /// Byte length of the row payload that follows the header
    pub payload_length: u32,
    pub min_max_index: Option<MinMaxIndex>,
}

/// Per-column value bounds in storage order, encoded the same way the row
/// payload encodes each column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinMaxIndex {
    pub min_values: Vec<Vec<u8>>,
    pub max_values: Vec<Vec<u8>>,
}

impl BlockletHeader {
    pub fn new(row_count: u32, payload_length: u32) -> Self {
        Self {
            row_count,
            payload_length,
            min_max_index: None,
        }
    }

    pub fn with_min_max(mut self, min_values: Vec<Vec<u8>>, max_values: Vec<Vec<u8>>) -> Self {
        self.min_max_index = Some(MinMaxIndex {
            min_values,
            max_values,
        });
        self
    }

    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
