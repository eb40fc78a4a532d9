//! List command

use clap::Args;
use tracing::info;

use crate::cli::output;
use crate::cli::workspace::Workspace;
use crate::cli::{Cli, OutputFormat};

/// List workspace packages and their local dependencies
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Also show packages that depend on each package
    #[arg(long)]
    pub dependents: bool,
}

impl ListCommand {
    /// Execute the list command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing list command");
        let cwd = std::env::current_dir()?;
        let workspace = Workspace::load(&cwd)?;
        let cyclic = workspace.graph.cyclic_packages();

        match cli.format {
            OutputFormat::Json => {
                let packages: Vec<_> = workspace
                    .graph
                    .iter()
                    .map(|node| {
                        serde_json::json!({
                            "name": node.name,
                            "version": node.version,
                            "location": workspace.display_location(&node.location),
                            "dependencies": node.dependencies,
                            "dependents": node.dependents,
                        })
                    })
                    .collect();
                let output = serde_json::json!({
                    "root": workspace.root.to_string_lossy(),
                    "packages": packages,
                    "cycles": cyclic,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if workspace.graph.is_empty() {
                    if !cli.quiet {
                        output::info("No packages found");
                    }
                    return Ok(());
                }

                println!("{}", output::header("Packages"));
                for node in workspace.graph.iter() {
                    println!(
                        "  {} {} {}",
                        output::package_style().apply_to(&node.name),
                        output::version_style().apply_to(&node.version),
                        output::path_style().apply_to(workspace.display_location(&node.location))
                    );
                    if !node.dependencies.is_empty() {
                        println!("    depends on: {}", node.dependencies.join(", "));
                    }
                    if self.dependents && !node.dependents.is_empty() {
                        println!("    used by:    {}", node.dependents.join(", "));
                    }
                }

                if !cyclic.is_empty() && !cli.quiet {
                    println!();
                    output::warning(&format!(
                        "Dependency cycle between: {}",
                        cyclic.join(", ")
                    ));
                }
            }
        }

        Ok(())
    }
}
