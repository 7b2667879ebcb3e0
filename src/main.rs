//! Command-line front end: plan liquid handling for one protocol step.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use assembly_rs::parts::{physical_part_ids, InMemoryPartSource, PartSource};
use assembly_rs::protocols::ColonyQcWriter;
use assembly_rs::{PipelineConfig, Planner, Step};

#[derive(Debug, Parser)]
#[command(name = "assembly", version, about = "Well assignments and worklists for DNA assembly")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run colony PCR products next to a ladder
    ColonyQc {
        /// Directory of input plate tables (*.csv, searched recursively)
        #[arg(long)]
        input: PathBuf,

        /// Output directory for worklists, plates and the run report
        #[arg(long)]
        out: PathBuf,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Part table (plasmid,part,Type,...) used to expand --plasmid
        #[arg(long, requires = "plasmid")]
        parts: Option<PathBuf>,

        /// Plasmid whose physical parts are added to the run
        #[arg(long, requires = "parts")]
        plasmid: Vec<String>,

        /// Part ids to run directly
        part_ids: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::ColonyQc { input, out, config, parts, plasmid, part_ids } => {
            let config = match &config {
                Some(path) => PipelineConfig::load_from(path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => PipelineConfig::load()?,
            };

            let mut ids = part_ids;
            if let Some(path) = &parts {
                let source = InMemoryPartSource::from_table(path)
                    .with_context(|| format!("reading parts from {}", path.display()))?;
                for id in physical_part_ids(&source.plasmid_parts(&plasmid)?) {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
            if ids.is_empty() {
                bail!("no parts to run; pass part ids or --parts with --plasmid");
            }

            let mut planner = Planner::open(&input, config)
                .with_context(|| format!("loading input plates from {}", input.display()))?;
            let steps = vec![Step::single(ColonyQcWriter::new(ids))];
            let report = planner.run(&steps, &out)?;

            for outcome in &report.outcomes {
                println!(
                    "{:<16} {:?}  {} entries  plates: {}",
                    outcome.writer,
                    outcome.status,
                    outcome.entries,
                    outcome.plates.join(", ")
                );
            }
            println!("{} entries written to {}", report.total_entries(), out.display());
            if !report.is_success() {
                bail!("{} writer(s) failed", report.failures().count());
            }
        }
    }

    Ok(())
}
