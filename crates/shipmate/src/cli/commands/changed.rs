//! Changed command

use clap::Args;
use tracing::info;

use shipmate_core::config::Config;
use shipmate_core::monorepo::{ForcedSpec, UpdateCollector, UpdateOptions, ALL_PACKAGES};
use shipmate_core::ReleaseType;
use shipmate_git::GitRepo;

use crate::cli::output;
use crate::cli::workspace::Workspace;
use crate::cli::{Cli, OutputFormat};

/// List packages that changed since the last release
#[derive(Debug, Args)]
pub struct ChangedCommand {
    /// Compare against this reference instead of the latest annotated tag
    #[arg(long)]
    pub since: Option<String>,

    /// Only consider the changes of the HEAD commit
    #[arg(long)]
    pub canary: bool,

    /// Upcoming bump (major, minor, patch, premajor, preminor, prepatch, prerelease)
    #[arg(long, value_name = "TYPE")]
    pub cd_version: Option<ReleaseType>,

    /// Ignore changed files matching this glob (repeatable)
    #[arg(long = "ignore-changes", value_name = "GLOB")]
    pub ignore_changes: Vec<String>,

    /// Always release packages matching these globs; without a value, all of them
    #[arg(
        long,
        value_name = "GLOBS",
        num_args = 0..=1,
        default_missing_value = ALL_PACKAGES
    )]
    pub force_publish: Vec<String>,

    /// Only consider packages whose name matches this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub scope: Vec<String>,
}

impl ChangedCommand {
    /// Execute the changed command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(canary = self.canary, since = ?self.since, "executing changed command");
        let cwd = std::env::current_dir()?;
        let workspace = Workspace::load(&cwd)?;
        if workspace.config_path.is_none() && cli.chatty() {
            output::warning("No shipmate config found, using defaults");
        }

        let repo = GitRepo::discover(&workspace.root)?;
        let repo_root = repo.path().canonicalize()?;
        let options = self.update_options(&workspace.config);

        let updates = UpdateCollector::new(&workspace.graph, &repo, repo_root)
            .with_scope(self.scope.iter().cloned())
            .collect(&options)?;

        match cli.format {
            OutputFormat::Json => {
                let output: Vec<_> = updates
                    .iter()
                    .map(|u| {
                        serde_json::json!({
                            "name": u.node.name,
                            "version": u.node.version,
                            "location": workspace.display_location(&u.node.location),
                            "reason": u.reason,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if updates.is_empty() {
                    if !cli.quiet {
                        output::info("No changed packages found");
                    }
                    return Ok(());
                }

                for update in &updates {
                    let mut line = format!(
                        "{} {} ({})",
                        output::package_style().apply_to(&update.node.name),
                        output::version_style().apply_to(&update.node.version),
                        update.reason
                    );
                    if cli.verbose {
                        line.push_str(&format!(
                            " {}",
                            output::path_style()
                                .apply_to(workspace.display_location(&update.node.location))
                        ));
                    }
                    println!("{}", line);
                }

                if !cli.quiet {
                    output::success(&format!(
                        "{} of {} packages need a release",
                        updates.len(),
                        workspace.graph.len()
                    ));
                }
            }
        }

        Ok(())
    }

    /// Merge flags over the `updates` section of the config
    fn update_options(&self, config: &Config) -> UpdateOptions {
        let updates = &config.updates;

        let ignore_changes = if self.ignore_changes.is_empty() {
            updates.ignore_changes.clone()
        } else {
            self.ignore_changes.clone()
        };

        let force_publish = if self.force_publish.is_empty() {
            updates.forced_spec()
        } else {
            ForcedSpec::from_patterns(&self.force_publish)
        };

        UpdateOptions {
            canary: self.canary,
            since: self.since.clone().or_else(|| updates.since.clone()),
            cd_version: self.cd_version,
            ignore_changes,
            force_publish,
        }
    }
}
