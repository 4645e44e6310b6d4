//! Directory upload mapper
//!
//! Mirrors a local directory into object entries: every regular file under
//! the root becomes one [`ObjectEntry`] whose key is its path relative to
//! the root, with `/` as separator.

use crate::error::{Result, SiteError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// One local file mapped to a remote object key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Remote key, `/`-separated
    pub key: String,
    /// Local file the object's bytes are read from
    pub source: PathBuf,
    pub content_type: String,
}

/// Content type guessed from the file extension
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}

/// Walk `root` and map every file below it to an object entry
///
/// A missing root is not an error: a warning is logged and no entries are
/// produced. Entries are sorted by key.
pub fn map_directory(root: &Path) -> Result<Vec<ObjectEntry>> {
    if !root.is_dir() {
        warn!(root = %root.display(), "Website directory does not exist, skipping upload");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    visit_dir(root, "", &mut entries)?;
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    debug!(root = %root.display(), count = entries.len(), "Mapped upload directory");
    Ok(entries)
}

fn visit_dir(dir: &Path, prefix: &str, entries: &mut Vec<ObjectEntry>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().into_string().map_err(|_| {
            SiteError::InvalidConfig(format!(
                "file name is not valid UTF-8: {}",
                path.display()
            ))
        })?;
        let key = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        if path.is_dir() {
            visit_dir(&path, &key, entries)?;
        } else {
            let key = key.replace('\\', "/");
            debug!(key = %key, source = %path.display(), "Mapped file");
            entries.push(ObjectEntry {
                content_type: content_type_for(&path),
                key,
                source: path,
            });
        }
    }
    Ok(())
}
