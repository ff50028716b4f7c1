//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::config::{ValidatorConfig, ValidatorConfigBuilder};
use anyhow::{Context, Result};

/// Convert CLI arguments to a validated `ValidatorConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build the configuration: `--config` file first, then flag overrides
    pub(crate) fn from_cli(cli: &Cli) -> Result<ValidatorConfig> {
        let base = match &cli.config {
            Some(path) => ValidatorConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?,
            None => ValidatorConfig::default(),
        };

        let mut builder = ValidatorConfigBuilder::from_config(base);
        if let Some(root) = &cli.root {
            builder = builder.root_path(root);
        }
        if let Some(dir) = &cli.error_dir {
            builder = builder.error_dir_path(dir);
        }
        if let Some(workers) = cli.workers {
            builder = builder.max_workers(workers);
        }
        if let Some(name) = &cli.dataset_name {
            builder = builder.dataset_name(name);
        }
        if let Some(report) = &cli.report {
            builder = builder.report_path(report);
        }
        if let Some(interval) = cli.progress_interval {
            builder = builder.progress_interval(interval);
        }

        builder.build().context("Invalid configuration")
    }
}
