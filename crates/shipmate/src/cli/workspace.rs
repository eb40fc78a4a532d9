//! Loading the workspace a command runs against

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use shipmate_core::config::{load_config_or_default, Config};
use shipmate_core::monorepo::{PackageDiscovery, PackageGraph};
use shipmate_git::GitRepo;

/// Configuration and package graph of the current workspace
pub struct Workspace {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub root: PathBuf,
    pub graph: PackageGraph,
}

impl Workspace {
    /// Load the workspace containing `cwd`.
    ///
    /// The root is the directory holding the config file, else the git
    /// working directory, else `cwd` itself.
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let (config, config_path) = load_config_or_default(cwd)?;

        let root = match config_path.as_deref().and_then(Path::parent) {
            Some(dir) => dir.to_path_buf(),
            None => match GitRepo::discover(cwd) {
                Ok(repo) => repo.path().to_path_buf(),
                Err(_) => cwd.to_path_buf(),
            },
        };
        let root = root.canonicalize()?;
        debug!(root = %root.display(), "workspace root");

        let packages = PackageDiscovery::new(&root, config.packages.clone()).discover()?;
        let graph = PackageGraph::build(&packages)?;

        let cyclic = graph.cyclic_packages();
        if !cyclic.is_empty() {
            warn!(packages = ?cyclic, "dependency cycle in workspace");
        }

        Ok(Self {
            config,
            config_path,
            root,
            graph,
        })
    }

    /// Location of a package relative to the workspace root
    pub fn display_location(&self, location: &Path) -> String {
        let relative = location.strip_prefix(&self.root).unwrap_or(location);
        if relative.as_os_str().is_empty() {
            ".".to_string()
        } else {
            relative.display().to_string()
        }
    }
}
