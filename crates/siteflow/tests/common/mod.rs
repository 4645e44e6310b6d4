use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestProject {
    pub root: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn write_site_kdl(&self, content: &str) {
        fs::write(self.root.path().join("site.kdl"), content).unwrap();
    }

    /// Write a file below the project root, creating parent directories
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Write an executable engine script and return its path
    #[allow(dead_code)]
    #[cfg(unix)]
    pub fn write_engine(&self, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.root.path().join("engine.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// Seed `.siteflow/state.json`
    #[allow(dead_code)]
    pub fn write_state(&self, content: &str) {
        self.write_file(".siteflow/state.json", content);
    }

    #[allow(dead_code)]
    pub fn read_state(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.root.path().join(".siteflow/state.json")).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}
