//! Protocol writers shipped with the crate.
//!
//! Every laboratory step (PCR, digestion, QC, LCR, …) is a
//! [`GraphWriter`](crate::graph::GraphWriter); only colony QC lives here.

pub mod colony_qc;

pub use colony_qc::ColonyQcWriter;
