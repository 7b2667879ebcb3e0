//! Part metadata from an external part registry.
//!
//! The registry itself (ICE or anything else) lives outside this crate.
//! It only has to answer one question: for a set of plasmids, which parts
//! make each of them up, and what are those parts' parameters.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::{PropertyMap, Value};
use crate::{Error, Result};

/// Parameter naming a part's kind.
pub const TYPE: &str = "Type";

/// Placeholder parts that exist only on paper, never in a well.
pub const DOMINO: &str = "DOMINO";

/// One part and its registry parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDescriptor {
    pub id: String,
    pub parameters: PropertyMap,
}

impl PartDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), parameters: PropertyMap::new() }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// False for placeholder parts such as dominoes.
    pub fn is_physical(&self) -> bool {
        self.parameter(TYPE).and_then(Value::as_str) != Some(DOMINO)
    }
}

/// plasmid id → (part id → part)
pub type PlasmidParts = IndexMap<String, IndexMap<String, PartDescriptor>>;

/// Source of part metadata.
pub trait PartSource {
    fn plasmid_parts(&self, plasmid_ids: &[String]) -> Result<PlasmidParts>;
}

/// Ids of every physical part across all plasmids, first-seen order, no repeats.
pub fn physical_part_ids(parts: &PlasmidParts) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in parts.values().flat_map(|plasmid| plasmid.values()) {
        if part.is_physical() && !out.contains(&part.id) {
            out.push(part.id.clone());
        }
    }
    out
}

// ============================================================================
// In-memory source
// ============================================================================

/// A part source backed by a map, for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPartSource {
    plasmids: PlasmidParts,
}

impl InMemoryPartSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, plasmid_id: impl Into<String>, part: PartDescriptor) {
        self.plasmids
            .entry(plasmid_id.into())
            .or_default()
            .insert(part.id.clone(), part);
    }

    /// Load `plasmid,part,<param>...` rows from a CSV file.
    pub fn from_table(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_owned()).collect();

        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| Error::InvalidTable {
                path: path.display().to_string(),
                reason: format!("no '{name}' column"),
            })
        };
        let plasmid_col = column("plasmid")?;
        let part_col = column("part")?;

        let mut source = Self::new();
        for record in reader.records() {
            let record = record?;
            let plasmid = record.get(plasmid_col).unwrap_or_default().trim();
            let mut part = PartDescriptor::new(record.get(part_col).unwrap_or_default().trim());
            for (i, header) in headers.iter().enumerate() {
                if i == plasmid_col || i == part_col {
                    continue;
                }
                part.parameters
                    .insert(header.clone(), Value::from_cell(record.get(i).unwrap_or_default()));
            }
            source.insert(plasmid, part);
        }
        Ok(source)
    }
}

impl PartSource for InMemoryPartSource {
    /// Unknown plasmids are skipped.
    fn plasmid_parts(&self, plasmid_ids: &[String]) -> Result<PlasmidParts> {
        Ok(plasmid_ids
            .iter()
            .filter_map(|id| self.plasmids.get(id).map(|parts| (id.clone(), parts.clone())))
            .collect())
    }
}
