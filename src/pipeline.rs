//! Pipeline orchestration. Runs writers in order against shared plate state.
//!
//! ```text
//! steps ──► Single(w) ──► export(w, clone) ──► plates/<p>.csv ──► worklists/<w>.csv ──► commit
//!       └─► Group([a, b, ...]) ── same, in order; a failure skips the rest
//! ```
//!
//! Every writer exports against a clone of the registry. The clone replaces
//! the registry only when the export succeeds, so a failing writer leaves no
//! half-placed components behind.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::export::{write_plate, write_worklist};
use crate::graph::{export, GraphWriter};
use crate::import::plate_from_table;
use crate::storage::PlateRegistry;
use crate::{Error, Result};

pub const WORKLISTS_DIR: &str = "worklists";
pub const PLATES_DIR: &str = "plates";
pub const REPORT_FILE: &str = "report.json";

// ============================================================================
// Steps
// ============================================================================

/// One entry of a pipeline.
pub enum Step {
    Single(Box<dyn GraphWriter>),
    /// Writers that depend on each other, run in order.
    Group(Vec<Box<dyn GraphWriter>>),
}

impl Step {
    pub fn single(writer: impl GraphWriter + 'static) -> Self {
        Step::Single(Box::new(writer))
    }

    pub fn group(writers: Vec<Box<dyn GraphWriter>>) -> Self {
        Step::Group(writers)
    }

    /// Writers of this step, in run order.
    pub fn writers(&self) -> &[Box<dyn GraphWriter>] {
        match self {
            Step::Single(writer) => std::slice::from_ref(writer),
            Step::Group(writers) => writers,
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.writers().iter().map(|w| w.name()).collect();
        match self {
            Step::Single(_) => write!(f, "Single({})", names.join("")),
            Step::Group(_) => write!(f, "Group({names:?})"),
        }
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Succeeded,
    Failed,
    /// An earlier member of the same group failed.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterOutcome {
    pub writer: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub entries: usize,
    /// Plates named by the writer's worklist.
    pub plates: Vec<String>,
}

impl WriterOutcome {
    fn new(writer: &str, status: OutcomeStatus) -> Self {
        Self {
            writer: writer.to_owned(),
            status,
            error: None,
            entries: 0,
            plates: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == OutcomeStatus::Succeeded
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub outcomes: Vec<WriterOutcome>,
}

impl RunReport {
    pub fn total_entries(&self) -> usize {
        self.outcomes.iter().map(|o| o.entries).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &WriterOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(WriterOutcome::succeeded)
    }

    pub fn outcome(&self, writer: &str) -> Option<&WriterOutcome> {
        self.outcomes.iter().find(|o| o.writer == writer)
    }
}

// ============================================================================
// Run
// ============================================================================

/// Run `steps` in order against `plates`, writing output under `out_dir`.
///
/// With `continue_on_error` unset the first failing writer stops the run and
/// its error is returned as [`Error::WriterFailed`]; output of earlier writers
/// and the report so far stay on disk.
pub fn run(
    steps: &[Step],
    plates: &mut PlateRegistry,
    config: &PipelineConfig,
    out_dir: &Path,
) -> Result<RunReport> {
    load_reagents(plates, config)?;
    fs::create_dir_all(out_dir)?;

    let mut report = RunReport::default();
    for step in steps {
        let writers = step.writers();
        for (i, writer) in writers.iter().enumerate() {
            match run_writer(writer.as_ref(), plates, config, out_dir) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(err) => {
                    error!(writer = writer.name(), error = %err, "writer failed");
                    report.outcomes.push(WriterOutcome {
                        error: Some(err.to_string()),
                        ..WriterOutcome::new(writer.name(), OutcomeStatus::Failed)
                    });
                    for rest in &writers[i + 1..] {
                        warn!(writer = rest.name(), after = writer.name(), "skipped");
                        report.outcomes.push(WriterOutcome::new(rest.name(), OutcomeStatus::Skipped));
                    }

                    if !config.continue_on_error {
                        write_report(&report, out_dir)?;
                        return Err(Error::WriterFailed {
                            writer: writer.name().to_owned(),
                            source: Box::new(err),
                        });
                    }
                    break;
                }
            }
        }
    }

    write_report(&report, out_dir)?;
    info!(
        writers = report.outcomes.len(),
        entries = report.total_entries(),
        "pipeline finished"
    );
    Ok(report)
}

fn run_writer(
    writer: &dyn GraphWriter,
    plates: &mut PlateRegistry,
    config: &PipelineConfig,
    out_dir: &Path,
) -> Result<WriterOutcome> {
    let mut staged = plates.clone();
    let worklist = export(writer, &mut staged, &config.reagent_plate)?;

    // plates first: a worklist on disk means its plates were written too
    for plate in staged.plates() {
        write_plate(plate, &out_dir.join(PLATES_DIR))?;
    }
    let worklists = out_dir.join(WORKLISTS_DIR);
    if let Err(err) = write_worklist(&worklist, &worklists) {
        let _ = fs::remove_file(worklists.join(format!("{}.csv", worklist.name)));
        return Err(err);
    }
    *plates = staged;

    info!(writer = writer.name(), entries = worklist.len(), "writer finished");
    Ok(WriterOutcome {
        entries: worklist.len(),
        plates: worklist.plates(),
        ..WriterOutcome::new(writer.name(), OutcomeStatus::Succeeded)
    })
}

/// Import the configured reagent table unless its plate is already loaded.
fn load_reagents(plates: &mut PlateRegistry, config: &PipelineConfig) -> Result<()> {
    let Some(path) = &config.reagents else {
        return Ok(());
    };
    let plate = plate_from_table(path)?;
    if plates.contains(plate.name()) {
        info!(plate = plate.name(), "reagent plate already loaded");
    } else {
        info!(plate = plate.name(), path = %path.display(), "loaded reagents");
        plates.insert(plate);
    }
    Ok(())
}

fn write_report(report: &RunReport, out_dir: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(report)?;
    fs::write(out_dir.join(REPORT_FILE), text)?;
    Ok(())
}
