//! Pipeline configuration.
//!
//! Loaded with Figment from, in increasing priority:
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables prefixed with `ASSEMBLY_`
//!
//! ```text
//! ASSEMBLY_REAGENTS=plates/reagents.csv
//! ASSEMBLY_REAGENT_PLATE=reagents
//! ASSEMBLY_CONTINUE_ON_ERROR=true
//! ```

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Reagent definition table, imported as a plate before the first step.
    #[serde(default)]
    pub reagents: Option<PathBuf>,
    /// Plate used for reagent vertices that do not name one.
    #[serde(default = "default_reagent_plate")]
    pub reagent_plate: String,
    /// Keep running later steps after a writer fails.
    #[serde(default)]
    pub continue_on_error: bool,
}

fn default_reagent_plate() -> String {
    "reagents".to_owned()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reagents: None,
            reagent_plate: default_reagent_plate(),
            continue_on_error: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with `ASSEMBLY_*` environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self::figment(None).extract()?)
    }

    /// Defaults, then the TOML file at `path`, then the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::figment(Some(path.as_ref())).extract()?)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("ASSEMBLY_"))
    }

    pub fn with_reagents(mut self, path: impl Into<PathBuf>) -> Self {
        self.reagents = Some(path.into());
        self
    }
}
