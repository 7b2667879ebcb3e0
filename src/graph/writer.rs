//! Graph writers and the graph → plate → worklist export.
//!
//! A protocol step implements [`GraphWriter`] to describe its topology.
//! [`export`] builds that graph, places every vertex on a plate via
//! [`place`](crate::storage::place), and emits one [`WorklistEntry`] per
//! transfer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProtocolGraph, Vertex, VertexId};
use crate::storage::{Placement, PlateRegistry, place};
use crate::{Error, Result};

/// The contract every protocol step implements.
pub trait GraphWriter {
    /// Step name. Also the default plate for non-reagent vertices and the
    /// worklist file name.
    fn name(&self) -> &str;

    /// Build the step's complete topology into an empty graph.
    fn initialise(&self, graph: &mut ProtocolGraph) -> Result<()>;
}

/// One transfer instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorklistEntry {
    pub src_well: String,
    pub src_plate: String,
    pub dst_well: String,
    pub dst_plate: String,
    pub volume: f64,
    pub src_id: String,
    pub dst_id: String,
}

/// Ordered transfer instructions produced by one writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Worklist {
    pub name: String,
    pub entries: Vec<WorklistEntry>,
}

impl Worklist {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WorklistEntry> {
        self.entries.iter()
    }

    /// Every plate named by an entry, first-seen order.
    pub fn plates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for entry in &self.entries {
            for plate in [&entry.src_plate, &entry.dst_plate] {
                if !out.contains(plate) {
                    out.push(plate.clone());
                }
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a Worklist {
    type Item = &'a WorklistEntry;
    type IntoIter = std::slice::Iter<'a, WorklistEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Build `writer`'s graph and resolve it against `plates`.
///
/// The graph lives only for the duration of this call.
pub fn export(
    writer: &dyn GraphWriter,
    plates: &mut PlateRegistry,
    reagent_plate: &str,
) -> Result<Worklist> {
    let mut graph = ProtocolGraph::new();
    writer.initialise(&mut graph)?;
    debug!(
        writer = writer.name(),
        vertices = graph.vertex_count(),
        transfers = graph.transfer_count(),
        "graph initialised"
    );
    resolve(&graph, writer.name(), plates, reagent_plate)
}

/// Resolve every transfer of `graph` to physical wells.
///
/// Non-reagent vertices without a plate of their own go to `output_plate`,
/// reagents to `reagent_plate`. Each vertex is placed once.
pub fn resolve(
    graph: &ProtocolGraph,
    output_plate: &str,
    plates: &mut PlateRegistry,
    reagent_plate: &str,
) -> Result<Worklist> {
    let mut resolved: HashMap<VertexId, Placement> = HashMap::new();
    let mut worklist = Worklist::new(output_plate);

    for transfer in graph.transfers() {
        let (src, src_at) =
            resolve_vertex(graph, transfer.src, &mut resolved, output_plate, plates, reagent_plate)?;
        let (dst, dst_at) =
            resolve_vertex(graph, transfer.dst, &mut resolved, output_plate, plates, reagent_plate)?;
        worklist.entries.push(WorklistEntry {
            src_well: src_at.well.name(),
            src_plate: src_at.plate,
            dst_well: dst_at.well.name(),
            dst_plate: dst_at.plate,
            volume: transfer.volume,
            src_id: src.label.clone(),
            dst_id: dst.label.clone(),
        });
    }

    Ok(worklist)
}

fn resolve_vertex<'g>(
    graph: &'g ProtocolGraph,
    id: VertexId,
    resolved: &mut HashMap<VertexId, Placement>,
    output_plate: &str,
    plates: &mut PlateRegistry,
    reagent_plate: &str,
) -> Result<(&'g Vertex, Placement)> {
    let vertex = graph
        .vertex(id)
        .ok_or_else(|| Error::GraphError(format!("unknown vertex {id}")))?;
    if let Some(placement) = resolved.get(&id) {
        return Ok((vertex, placement.clone()));
    }
    let placement = place_vertex(vertex, output_plate, plates, reagent_plate)?;
    resolved.insert(id, placement.clone());
    Ok((vertex, placement))
}

fn place_vertex(
    vertex: &Vertex,
    output_plate: &str,
    plates: &mut PlateRegistry,
    reagent_plate: &str,
) -> Result<Placement> {
    let plate = vertex.plate.as_deref().unwrap_or(if vertex.is_reagent {
        reagent_plate
    } else {
        output_plate
    });
    place(
        &vertex.component(),
        plate,
        vertex.is_reagent,
        plates,
        vertex.well_fixed.as_deref(),
    )
}
