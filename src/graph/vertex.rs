//! Vertex in a protocol graph: a reagent or a reaction intermediate.

use serde::{Deserialize, Serialize};
use crate::model::{Component, ID, PropertyMap, Value};

/// Opaque vertex identifier, unique within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vertex of a protocol graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    /// Becomes the `id` attribute of the well this vertex resolves to.
    pub label: String,
    /// Reagents are shared and deduplicated; everything else is a sample.
    pub is_reagent: bool,
    /// Pinned well, e.g. a ladder that always sits in `H12`.
    pub well_fixed: Option<String>,
    /// Plate override. Defaults to the reagent plate or the writer's plate.
    pub plate: Option<String>,
    /// Extra attributes written into the well alongside `id`.
    pub properties: PropertyMap,
}

impl Vertex {
    pub fn new(id: VertexId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            is_reagent: false,
            well_fixed: None,
            plate: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn reagent(mut self) -> Self {
        self.is_reagent = true;
        self
    }

    pub fn fixed_at(mut self, well: impl Into<String>) -> Self {
        self.well_fixed = Some(well.into());
        self
    }

    pub fn on_plate(mut self, plate: impl Into<String>) -> Self {
        self.plate = Some(plate.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The well attributes this vertex stands for.
    pub fn component(&self) -> Component {
        let mut c = self.properties.clone();
        c.insert(ID.to_owned(), Value::String(self.label.clone()));
        c
    }
}
