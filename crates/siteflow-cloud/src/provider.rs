//! Provisioning engine boundary and declared resources

use crate::action::{ApplyResult, Plan, diff};
use crate::error::{CloudError, Result};
use crate::state::GlobalState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provisioning engine abstraction
///
/// The engine realizes declared resources against a real cloud account.
/// siteflow only declares, diffs and records; everything that talks to a
/// cloud API lives behind this trait.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the engine name (e.g. "pulumi-bridge")
    fn name(&self) -> &str;

    /// Returns the engine display name for UI
    fn display_name(&self) -> &str;

    /// Check if the engine is installed and usable
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Fetch the realized state of every resource the engine manages
    async fn get_state(&self) -> Result<GlobalState>;

    /// Calculate the diff between desired and current state
    async fn plan(&self, desired: &ResourceSet, current: &GlobalState) -> Result<Plan> {
        diff(desired, current)
    }

    /// Apply the planned actions
    async fn apply(&self, plan: &Plan) -> Result<ApplyResult>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// Set of declared resources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Resources indexed by key (type:id)
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. Keys are unique within a set.
    pub fn add(&mut self, resource: ResourceConfig) -> Result<()> {
        let key = resource.key();
        if self.resources.contains_key(&key) {
            return Err(CloudError::DuplicateResource(key));
        }
        self.resources.insert(key, resource);
        Ok(())
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Option<&ResourceConfig> {
        let key = format!("{}:{}", resource_type, id);
        self.resources.get(&key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Configuration for a declared cloud resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "s3-bucket", "cloudfront-distribution")
    pub resource_type: String,

    /// Resource identifier
    pub id: String,

    /// Provider name
    pub provider: String,

    /// Resource-specific configuration. Unrealized attributes of other
    /// resources appear as `${type:id.attr}` placeholders.
    pub config: serde_json::Value,

    /// Keys of the resources this one must be realized after
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        provider: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            provider: provider.into(),
            config,
            depends_on: Vec::new(),
        }
    }

    /// Add a dependency on another resource key, ignoring repeats
    pub fn depends_on(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.depends_on.contains(&key) {
            self.depends_on.push(key);
        }
        self
    }

    /// Get the full resource key (type:id)
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource_type, self.id)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}
