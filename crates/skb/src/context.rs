//! Runtime context for command execution.

use anyhow::{Context as _, Result};
use shirokuma_config::{Config, resolve_data_dir};
use shirokuma_repo::Repository;

use crate::cli::{GlobalArgs, OutputFormat};

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Resolved configuration (data root, export root, profile).
    pub config: Config,

    /// Output format for command results.
    pub format: OutputFormat,

    /// Verbose output.
    pub verbose: bool,

    /// Quiet mode: suppress non-essential output.
    pub quiet: bool,
}

impl RuntimeContext {
    /// Builds a `RuntimeContext` from parsed global arguments.
    ///
    /// Data-dir priority: `--data-dir` flag > `SHIROKUMA_DATA_DIR` env >
    /// nearest `.shirokuma/` walking up > `.shirokuma` in the cwd.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let data_dir = resolve_data_dir(global.data_dir.as_deref());
        let config = Config::load(&data_dir)
            .with_context(|| format!("loading config from {}", data_dir.display()))?;

        Ok(Self {
            config,
            format: global.format,
            verbose: global.verbose,
            quiet: global.quiet,
        })
    }

    /// Opens the repository at the configured data root.
    pub fn open_repo(&self) -> Result<Repository> {
        Ok(Repository::open(self.config.data_dir.clone())?)
    }

    /// Returns `true` when output should be JSON.
    pub fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
