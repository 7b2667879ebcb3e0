//! # Protocol Graph
//!
//! One laboratory step as a directed attributed multigraph. Vertices are
//! reagents or intermediates, transfers carry a volume. A [`GraphWriter`]
//! builds the graph; [`writer::export`] resolves it onto plates.
//!
//! Vertices and transfers keep insertion order, which fixes the order of
//! the exported worklist.

pub mod vertex;
pub mod transfer;
pub mod writer;

pub use vertex::{Vertex, VertexId};
pub use transfer::{Transfer, TransferId};
pub use writer::{GraphWriter, Worklist, WorklistEntry, export};

use std::collections::HashMap;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtocolGraph {
    vertices: Vec<Vertex>,
    transfers: Vec<Transfer>,
    /// vertex id → position in `vertices`
    index: HashMap<VertexId, usize>,
}

impl ProtocolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex labelled `label`, letting `configure` set its attributes.
    ///
    /// ```
    /// use assembly_rs::graph::ProtocolGraph;
    ///
    /// let mut graph = ProtocolGraph::new();
    /// let ladder = graph.add_vertex("ladder", |v| v.reagent().fixed_at("H12"));
    /// assert_eq!(graph.vertex(ladder).unwrap().well_fixed.as_deref(), Some("H12"));
    /// ```
    pub fn add_vertex(
        &mut self,
        label: impl Into<String>,
        configure: impl FnOnce(Vertex) -> Vertex,
    ) -> VertexId {
        let id = VertexId(self.vertices.len() as u64);
        let mut vertex = configure(Vertex::new(id, label));
        vertex.id = id;
        self.index.insert(id, self.vertices.len());
        self.vertices.push(vertex);
        id
    }

    /// Shorthand for a non-reagent vertex with no other attributes.
    pub fn add_sample(&mut self, label: impl Into<String>) -> VertexId {
        self.add_vertex(label, |v| v)
    }

    /// Shorthand for an unpinned reagent vertex.
    pub fn add_reagent(&mut self, label: impl Into<String>) -> VertexId {
        self.add_vertex(label, Vertex::reagent)
    }

    /// Add a transfer of `volume` from `src` to `dst`.
    pub fn add_edge(&mut self, src: VertexId, dst: VertexId, volume: f64) -> Result<TransferId> {
        self.add_transfer(src, dst, volume, |t| t)
    }

    /// Add a transfer, letting `configure` attach metadata.
    pub fn add_transfer(
        &mut self,
        src: VertexId,
        dst: VertexId,
        volume: f64,
        configure: impl FnOnce(Transfer) -> Transfer,
    ) -> Result<TransferId> {
        for end in [src, dst] {
            if !self.index.contains_key(&end) {
                return Err(Error::GraphError(format!("unknown vertex {end}")));
            }
        }
        if src == dst {
            return Err(Error::GraphError(format!("self transfer on vertex {src}")));
        }
        if !volume.is_finite() || volume <= 0.0 {
            return Err(Error::GraphError(format!(
                "transfer {src} -> {dst} has invalid volume {volume}"
            )));
        }

        let id = TransferId(self.transfers.len() as u64);
        let mut transfer = configure(Transfer::new(id, src, dst, volume));
        transfer.id = id;
        transfer.src = src;
        transfer.dst = dst;
        self.transfers.push(transfer);
        Ok(id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.index.get(&id).map(|&i| &self.vertices[i])
    }

    /// First vertex with the given label.
    pub fn vertex_by_label(&self, label: &str) -> Option<&Vertex> {
        self.vertices.iter().find(|v| v.label == label)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    /// Transfers leaving `id`, in insertion order.
    pub fn outbound(&self, id: VertexId) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter().filter(move |t| t.src == id)
    }

    /// Transfers arriving at `id`, in insertion order.
    pub fn inbound(&self, id: VertexId) -> impl Iterator<Item = &Transfer> {
        self.transfers.iter().filter(move |t| t.dst == id)
    }
}
