//! Colony QC: run every colony PCR product next to a ladder.

use crate::graph::{GraphWriter, ProtocolGraph};
use crate::Result;

/// Ladder position on both the reagent plate and the QC plate.
pub const LADDER_WELL: &str = "H12";

pub const LADDER_VOLUME: f64 = 2.0;
pub const LADDER_BUFFER_VOLUME: f64 = 22.0;
pub const PCR_VOLUME: f64 = 1.0;
pub const PRODUCT_BUFFER_VOLUME: f64 = 23.0;

/// For each part `p`: `p_pcr` (1.0) + `buffer` (23.0) → `p_product`.
/// Plus one ladder lane: `ladder` (2.0) + `buffer` (22.0) → `ladder_product`.
#[derive(Debug, Clone)]
pub struct ColonyQcWriter {
    part_ids: Vec<String>,
    output_name: String,
}

impl ColonyQcWriter {
    pub fn new<I, S>(part_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_output_name(part_ids, "colony_qc")
    }

    pub fn with_output_name<I, S>(part_ids: I, output_name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            part_ids: part_ids.into_iter().map(Into::into).collect(),
            output_name: output_name.into(),
        }
    }

    pub fn part_ids(&self) -> &[String] {
        &self.part_ids
    }
}

impl GraphWriter for ColonyQcWriter {
    fn name(&self) -> &str {
        &self.output_name
    }

    fn initialise(&self, graph: &mut ProtocolGraph) -> Result<()> {
        let ladder = graph.add_vertex("ladder", |v| v.reagent().fixed_at(LADDER_WELL));
        let buffer = graph.add_reagent("buffer");
        let ladder_product = graph.add_vertex("ladder_product", |v| v.fixed_at(LADDER_WELL));

        graph.add_edge(ladder, ladder_product, LADDER_VOLUME)?;
        graph.add_edge(buffer, ladder_product, LADDER_BUFFER_VOLUME)?;

        for part_id in &self.part_ids {
            let part = graph.add_sample(format!("{part_id}_pcr"));
            let product = graph.add_sample(format!("{part_id}_product"));

            graph.add_edge(part, product, PCR_VOLUME)?;
            graph.add_edge(buffer, product, PRODUCT_BUFFER_VOLUME)?;
        }

        Ok(())
    }
}
