//! Transfer (edge) in a protocol graph: move `volume` from src to dst.

use serde::{Deserialize, Serialize};
use super::VertexId;
use crate::model::{PropertyMap, Value};

/// Opaque transfer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransferId(pub u64);

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed liquid transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub src: VertexId,
    pub dst: VertexId,
    /// Positive, in the protocol's volume unit.
    pub volume: f64,
    pub properties: PropertyMap,
}

impl Transfer {
    pub fn new(id: TransferId, src: VertexId, dst: VertexId, volume: f64) -> Self {
        Self {
            id,
            src,
            dst,
            volume,
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
