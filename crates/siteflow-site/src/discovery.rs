//! Site file discovery
//!
//! Search order:
//! 1. an explicit path (`--config`) or the `SITEFLOW_CONFIG` environment variable
//! 2. current directory: `site.local.kdl`, `site.kdl`
//! 3. `./.siteflow/`: same order
//!
//! When nothing is found the built-in defaults are used with the current
//! directory as project root.

use crate::error::{Result, SiteError};
use crate::model::SiteConfig;
use crate::parser::parse_site_file;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the site file directly
pub const CONFIG_ENV: &str = "SITEFLOW_CONFIG";

const CANDIDATES: [&str; 2] = ["site.local.kdl", "site.kdl"];

/// Site configuration together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedSite {
    pub config: SiteConfig,
    /// Directory relative paths in the configuration resolve against
    pub project_root: PathBuf,
    /// File the configuration was read from, `None` for built-in defaults
    pub source: Option<PathBuf>,
}

/// Locate the site file
pub fn find_site_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    let explicit = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    if let Some(path) = explicit {
        debug!(path = %path.display(), "Using explicitly configured site file");
        if !path.is_file() {
            return Err(SiteError::DiscoveryError {
                path,
                message: "no such file".to_string(),
            });
        }
        return Ok(Some(path));
    }

    let current_dir = std::env::current_dir()?;
    for dir in [current_dir.clone(), current_dir.join(".siteflow")] {
        for filename in CANDIDATES {
            let path = dir.join(filename);
            debug!(checking = %path.display(), "Looking for site file");
            if path.is_file() {
                return Ok(Some(path));
            }
        }
    }

    Ok(None)
}

/// Find and parse the site configuration
pub fn load_site(explicit: Option<&Path>) -> Result<LoadedSite> {
    match find_site_file(explicit)? {
        Some(path) => {
            let config = parse_site_file(&path)?;
            let project_root = project_root_for(&path)?;
            info!(
                site_file = %path.display(),
                project_root = %project_root.display(),
                "Loaded site configuration"
            );
            Ok(LoadedSite {
                config,
                project_root,
                source: Some(path),
            })
        }
        None => {
            info!("No site file found, using built-in defaults");
            Ok(LoadedSite {
                config: SiteConfig::default(),
                project_root: std::env::current_dir()?,
                source: None,
            })
        }
    }
}

/// Project root for a site file; files under `.siteflow/` belong to its parent
fn project_root_for(path: &Path) -> Result<PathBuf> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    if dir.file_name().and_then(|n| n.to_str()) == Some(".siteflow")
        && let Some(parent) = dir.parent()
    {
        return Ok(parent.to_path_buf());
    }
    Ok(dir)
}
