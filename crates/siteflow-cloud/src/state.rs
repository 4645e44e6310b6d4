//! Recorded state of realized resources
//!
//! Manages the `.siteflow/state.json` file which tracks what the
//! provisioning engine last realized for each declared resource.

use crate::action::{ActionType, ApplyResult, Plan};
use crate::error::{CloudError, Result};
use crate::output::AttributeSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".siteflow";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Global state containing every realized resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Resources indexed by type:id
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a resource
    pub fn set_resource(&mut self, key: String, state: ResourceState) {
        self.resources.insert(key, state);
        self.updated_at = Utc::now();
    }

    /// Remove a resource
    pub fn remove_resource(&mut self, key: &str) -> Option<ResourceState> {
        let result = self.resources.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    /// Get a resource by key
    pub fn get_resource(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }

    /// Fold the outcome of an apply into the recorded state.
    ///
    /// Realized resources replace their previous record; resources whose
    /// delete action succeeded are dropped. Resources whose action failed
    /// keep their record, marked [`ResourceStatus::Error`]. Engines that do
    /// not echo inputs back get the planned configuration recorded for them.
    pub fn record(&mut self, plan: &Plan, result: &ApplyResult) {
        for (key, realized) in &result.realized {
            let mut realized = realized.clone();
            if realized.inputs.is_null()
                && let Some(action) = plan
                    .actions
                    .iter()
                    .find(|a| a.action_type != ActionType::Delete && a.resource_key() == *key)
            {
                if let Some(config) = action.details.get("config") {
                    realized.inputs = config.clone();
                }
                if let Some(deps) = action
                    .details
                    .get("depends_on")
                    .and_then(|d| serde_json::from_value(d.clone()).ok())
                {
                    realized.depends_on = deps;
                }
            }
            self.set_resource(key.clone(), realized);
        }
        for action in plan.actions_by_type(ActionType::Delete) {
            if result.succeeded(&action.id) {
                self.remove_resource(&action.resource_key());
            }
        }
        for failed in &result.failed {
            let Some(action) = plan.actions.iter().find(|a| a.id == failed.action_id) else {
                continue;
            };
            if let Some(recorded) = self.resources.get_mut(&action.resource_key()) {
                recorded.status = ResourceStatus::Error;
                recorded.updated_at = Utc::now();
            }
        }
    }
}

impl AttributeSource for GlobalState {
    fn attribute(&self, resource: &str, name: &str) -> Option<serde_json::Value> {
        let state = self.resources.get(resource)?;
        if name == "id" {
            return state
                .attributes
                .get("id")
                .cloned()
                .or_else(|| Some(serde_json::Value::String(state.id.clone())));
        }
        state.attributes.get(name).cloned()
    }
}

/// State of a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Provider-specific resource ID
    pub id: String,

    /// Resource type
    pub resource_type: String,

    /// Current status
    #[serde(default)]
    pub status: ResourceStatus,

    /// Realized attributes (arn, endpoint, domain name, ...)
    pub attributes: HashMap<String, serde_json::Value>,

    /// Declared configuration this resource was realized from
    #[serde(default)]
    pub inputs: serde_json::Value,

    /// Keys of the resources this one was realized after
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// When the resource was created
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            status: ResourceStatus::Unknown,
            attributes: HashMap::new(),
            inputs: serde_json::Value::Null,
            depends_on: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_inputs(mut self, inputs: serde_json::Value) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.depends_on = depends_on;
        self
    }

}

/// Status of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Resource is realized and serving
    Ready,
    /// Last apply of this resource failed
    Error,
    /// Status not reported by the engine
    #[default]
    Unknown,
}

/// State manager for reading/writing state files
pub struct StateManager {
    /// Project root directory
    project_root: PathBuf,
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("state_path", &self.state_path())
            .finish()
    }
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// Get the state directory path
    fn state_dir(&self) -> PathBuf {
        self.project_root.join(STATE_DIR)
    }

    /// Get the state file path
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    /// Get the backup file path
    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    /// Get the lock file path
    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    /// Ensure the state directory exists
    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!(dir = %dir.display(), "Created state directory");
        }
        Ok(())
    }

    /// Load the current state
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No recorded state yet");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        // Version check
        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!(resources = state.resources.len(), "Loaded state");
        Ok(state)
    }

    /// Save the state
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        // Create backup if state file exists
        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!(backup = %backup.display(), "Rotated previous state");
        }

        // Write new state
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::info!(resources = state.resources.len(), path = %path.display(), "Saved state");
        Ok(())
    }

    /// Acquire a lock for exclusive access
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();

        // Check for existing lock
        if lock_path.exists() {
            let content = fs::read_to_string(&lock_path).await?;
            let lock_info: LockInfo = serde_json::from_str(&content)?;

            // Check if lock is stale (older than 1 hour)
            let age = Utc::now().signed_duration_since(lock_info.acquired_at);
            if age.num_hours() < 1 {
                return Err(CloudError::LockError(format!(
                    "State is locked by {} since {}",
                    lock_info.holder, lock_info.acquired_at
                )));
            }

            tracing::warn!(holder = %lock_info.holder, "Removing stale state lock");
        }

        // Create lock
        let lock_info = LockInfo {
            holder: format!(
                "{}:{}",
                std::env::var("HOSTNAME")
                    .or_else(|_| std::env::var("HOST"))
                    .unwrap_or_else(|_| "unknown".to_string()),
                std::process::id()
            ),
            acquired_at: Utc::now(),
        };

        let content = serde_json::to_string_pretty(&lock_info)?;
        fs::write(&lock_path, content).await?;

        tracing::debug!("Acquired state lock");
        Ok(StateLock {
            lock_path,
            released: false,
        })
    }
}

/// Lock information
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Release the lock
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::diff;
    use crate::provider::{ResourceConfig, ResourceSet};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_state_save_load() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = GlobalState::new();
        state.set_resource(
            "s3-bucket:site".to_string(),
            ResourceState::new("site-a1b2c3", "s3-bucket")
                .with_status(ResourceStatus::Ready)
                .with_attribute(
                    "website_endpoint",
                    serde_json::json!("site-a1b2c3.s3-website-us-east-1.amazonaws.com"),
                ),
        );

        manager.save(&state).await.unwrap();
        // second save rotates the first into the backup file
        manager.save(&state).await.unwrap();
        assert!(temp_dir.path().join(".siteflow/state.json.backup").exists());

        let loaded = manager.load().await.unwrap();
        assert_eq!(loaded.resources.len(), 1);
        assert!(loaded.resources.contains_key("s3-bucket:site"));
    }

    #[tokio::test]
    async fn test_empty_state() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let state = manager.load().await.unwrap();
        assert!(state.resources.is_empty());
    }

    #[tokio::test]
    async fn test_newer_state_version_rejected() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let mut state = GlobalState::new();
        state.version = STATE_VERSION + 1;
        manager.save(&state).await.unwrap();

        let err = manager.load().await.unwrap_err();
        assert!(matches!(err, CloudError::StateError(_)));
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_until_released() {
        let temp_dir = tempdir().unwrap();
        let manager = StateManager::new(temp_dir.path());

        let lock = manager.acquire_lock().await.unwrap();
        assert!(matches!(
            manager.acquire_lock().await,
            Err(CloudError::LockError(_))
        ));

        lock.release().await.unwrap();
        let again = manager.acquire_lock().await.unwrap();
        again.release().await.unwrap();
    }

    #[test]
    fn test_id_attribute_falls_back_to_realized_id() {
        let mut state = GlobalState::new();
        state.set_resource(
            "s3-bucket:site".to_string(),
            ResourceState::new("site-a1b2c3", "s3-bucket")
                .with_attribute("arn", serde_json::json!("arn:aws:s3:::site-a1b2c3")),
        );

        assert_eq!(
            state.attribute("s3-bucket:site", "id"),
            Some(serde_json::json!("site-a1b2c3"))
        );
        assert_eq!(
            state.attribute("s3-bucket:site", "arn"),
            Some(serde_json::json!("arn:aws:s3:::site-a1b2c3"))
        );
        assert_eq!(state.attribute("s3-bucket:site", "missing"), None);
        assert_eq!(state.attribute("s3-bucket:other", "id"), None);
    }

    #[test]
    fn test_record_apply_outcome() {
        let mut desired = ResourceSet::new();
        desired
            .add(ResourceConfig::new(
                "s3-object",
                "index.html",
                "aws",
                serde_json::json!({"content_type": "text/html"}),
            ))
            .unwrap();

        let mut state = GlobalState::new();
        state.set_resource(
            "s3-object:old.html".to_string(),
            ResourceState::new("old.html", "s3-object"),
        );

        let plan = diff(&desired, &state).unwrap();
        let mut result = ApplyResult::new();
        for action in &plan.actions {
            result.add_success(action.id.clone(), String::new());
        }
        result.realized.insert(
            "s3-object:index.html".to_string(),
            ResourceState::new("index.html", "s3-object").with_status(ResourceStatus::Ready),
        );

        state.record(&plan, &result);
        let recorded = state.get_resource("s3-object:index.html").unwrap();
        assert_eq!(recorded.inputs["content_type"], "text/html");
        assert!(state.get_resource("s3-object:old.html").is_none());

        // the recorded inputs make the same declaration a no-op
        let replan = diff(&desired, &state).unwrap();
        assert!(!replan.has_changes);
    }

    #[test]
    fn test_failed_actions_keep_record_marked_error() {
        let mut desired = ResourceSet::new();
        desired
            .add(ResourceConfig::new(
                "s3-object",
                "index.html",
                "aws",
                serde_json::json!({"content_type": "text/html"}),
            ))
            .unwrap();

        let mut state = GlobalState::new();
        state.set_resource(
            "s3-object:index.html".to_string(),
            ResourceState::new("index.html", "s3-object")
                .with_status(ResourceStatus::Ready)
                .with_inputs(serde_json::json!({"content_type": "text/plain"})),
        );
        state.set_resource(
            "s3-object:old.html".to_string(),
            ResourceState::new("old.html", "s3-object").with_status(ResourceStatus::Ready),
        );

        let plan = diff(&desired, &state).unwrap();
        let mut result = ApplyResult::new();
        for action in &plan.actions {
            result.add_failure(action.id.clone(), "access denied".to_string());
        }

        state.record(&plan, &result);
        let kept = state.get_resource("s3-object:index.html").unwrap();
        assert_eq!(kept.status, ResourceStatus::Error);
        assert_eq!(kept.inputs["content_type"], "text/plain");
        assert_eq!(
            state.get_resource("s3-object:old.html").unwrap().status,
            ResourceStatus::Error
        );
    }
}
