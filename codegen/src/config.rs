//! Generator configuration.
//!
//! Names the three directory roots and the run settings. Loadable from and
//! savable to YAML so a project can check its generator settings in.
//!
//! # Example YAML
//!
//! ```yaml
//! sql_source_dir: src/main/sql
//! generated_source_dir: target/sqlgen/src
//! generated_resource_dir: target/sqlgen/sql
//! jobs: 4
//! force: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GenerateError, Result};

/// Where SQL files are read from and where outputs are written.
///
/// # Examples
///
/// ```
/// use sqlgen_codegen::GeneratorConfig;
///
/// let config = GeneratorConfig::new("sql", "gen/src", "gen/sql").with_jobs(2);
/// assert_eq!(config.jobs, Some(2));
/// assert!(!config.force);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Root of the `.sql` input tree.
    pub sql_source_dir: PathBuf,
    /// Root the generated `.rs` files are written under.
    pub generated_source_dir: PathBuf,
    /// Root the `noParam` query resources are written under.
    pub generated_resource_dir: PathBuf,
    /// Worker threads (`None` = available parallelism).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Regenerate every file regardless of staleness.
    #[serde(default)]
    pub force: bool,
}

impl GeneratorConfig {
    pub fn new(
        sql_source_dir: impl Into<PathBuf>,
        generated_source_dir: impl Into<PathBuf>,
        generated_resource_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sql_source_dir: sql_source_dir.into(),
            generated_source_dir: generated_source_dir.into(),
            generated_resource_dir: generated_resource_dir.into(),
            jobs: None,
            force: false,
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// Relative directories are kept as written; they resolve against the
    /// process working directory.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] if the file cannot be read, or
    /// [`GenerateError::Config`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| GenerateError::io(path, e))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).map_err(|e| GenerateError::config(path, e))
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] if the file cannot be created, or
    /// [`GenerateError::Config`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|e| GenerateError::io(path, e))?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self).map_err(|e| GenerateError::config(path, e))
    }
}
