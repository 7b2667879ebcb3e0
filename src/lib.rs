//! # assembly-rs — liquid-handling plans for DNA assembly
//!
//! Turns protocol steps (PCR setup, digestion, QC, ligation) into concrete
//! well assignments and transfer worklists.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphWriter` is the contract between a protocol step and the planner
//! 2. **Plain data**: `Value`, `PropertyMap`, `Well` cross every boundary
//! 3. **Explicit state**: the `PlateRegistry` is owned and passed by `&mut`, never global
//! 4. **Reuse before allocate**: a component already on any plate is never placed twice
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use assembly_rs::{Planner, PipelineConfig, Step};
//! use assembly_rs::protocols::ColonyQcWriter;
//!
//! # fn example() -> assembly_rs::Result<()> {
//! let mut planner = Planner::open("input_plates", PipelineConfig::default())?;
//! let steps = vec![Step::single(ColonyQcWriter::new(["p1", "p2"]))];
//! let report = planner.run(&steps, "out".as_ref())?;
//! println!("{} worklist entries", report.total_entries());
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! | Layer | Module | Description |
//! |-------|--------|-------------|
//! | Addressing | `model::well` | Well names ↔ (row, col) ↔ linear index |
//! | Storage | `storage` | `Plate` grids and the `PlateRegistry` |
//! | Graph | `graph` | Protocol graphs, writers, worklist export |
//! | Orchestration | `pipeline` | Runs writers in sequence against shared plates |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod graph;
pub mod protocols;
pub mod pipeline;
pub mod config;
pub mod import;
pub mod export;
pub mod parts;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Component, PropertyMap, Value,
    Well, Shape, FillOrder,
};

// ============================================================================
// Re-exports: Storage, Graph, Pipeline
// ============================================================================

pub use storage::{Placement, Plate, PlateRegistry};
pub use graph::{GraphWriter, ProtocolGraph, Worklist, WorklistEntry};
pub use pipeline::{RunReport, Step, WriterOutcome};
pub use config::PipelineConfig;

use std::path::Path;

// ============================================================================
// Top-level Planner handle
// ============================================================================

/// The primary entry point. A `Planner` owns the plates of one run and the
/// configuration the writers run under.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    plates: PlateRegistry,
    config: PipelineConfig,
}

impl Planner {
    /// A planner with no plates yet.
    pub fn new(config: PipelineConfig) -> Self {
        Self { plates: PlateRegistry::new(), config }
    }

    /// A planner seeded with every `*.csv` plate under `input_dir`.
    pub fn open(input_dir: impl AsRef<Path>, config: PipelineConfig) -> Result<Self> {
        let plates = import::load_input_plates(input_dir)?;
        Ok(Self { plates, config })
    }

    /// Replace the plate registry.
    pub fn with_plates(mut self, plates: PlateRegistry) -> Self {
        self.plates = plates;
        self
    }

    /// Run `steps` in order, writing worklists and plates under `out_dir`.
    pub fn run(&mut self, steps: &[Step], out_dir: &Path) -> Result<RunReport> {
        pipeline::run(steps, &mut self.plates, &self.config, out_dir)
    }

    pub fn plates(&self) -> &PlateRegistry {
        &self.plates
    }

    pub fn plates_mut(&mut self) -> &mut PlateRegistry {
        &mut self.plates
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn into_plates(self) -> PlateRegistry {
        self.plates
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid well address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Plate '{plate}' cannot be {rows}x{cols}: rows must be 1..=26 and columns at least 1")]
    InvalidShape { plate: String, rows: usize, cols: usize },

    #[error("Plate '{plate}' has no 'id' property")]
    MissingIdentifier { plate: String },

    #[error("Plate '{plate}' is full ({capacity} wells)")]
    PlateFull { plate: String, capacity: usize },

    #[error("No well matches {criteria} on any plate")]
    NoMatchFound { criteria: String },

    #[error("Invalid table {path}: {reason}")]
    InvalidTable { path: String, reason: String },

    #[error("Graph error: {0}")]
    GraphError(String),

    #[error("Writer '{writer}' failed: {source}")]
    WriterFailed {
        writer: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
