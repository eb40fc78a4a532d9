//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use shipmate_core::config::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_YAML};

use crate::cli::{output, Cli};

/// Initialize a new Shipmate configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self.write_config(&cwd)?;

        if !cli.quiet {
            output::success(&format!(
                "Created configuration at {}",
                style(config_path.display()).cyan()
            ));
            println!();
            println!("Next steps:");
            println!("  1. Edit {} to list your package directories", config_path.display());
            println!("  2. Run {} to check discovery", style("shipmate list").cyan());
            println!("  3. Run {} to see what needs a release", style("shipmate changed").cyan());
        }

        Ok(())
    }

    fn write_config(&self, cwd: &std::path::Path) -> anyhow::Result<PathBuf> {
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_YAML));

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(config_path)
    }
}
