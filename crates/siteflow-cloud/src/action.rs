//! Planned actions and the desired-vs-recorded diff

use crate::error::{CloudError, Result};
use crate::provider::{ResourceConfig, ResourceSet};
use crate::state::{GlobalState, ResourceState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Represents a planned action for a cloud resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "s3-bucket", "s3-object")
    pub resource_type: String,

    /// Resource identifier
    pub resource_id: String,

    /// Description of the action
    pub description: String,

    /// Additional details about the action
    pub details: BTreeMap<String, serde_json::Value>,
}

impl Action {
    fn for_resource(action_type: ActionType, resource: &ResourceConfig) -> Self {
        let key = resource.key();
        let mut details = BTreeMap::new();
        details.insert(
            "provider".to_string(),
            serde_json::Value::String(resource.provider.clone()),
        );
        if action_type != ActionType::NoOp {
            details.insert("config".to_string(), resource.config.clone());
            details.insert(
                "depends_on".to_string(),
                serde_json::json!(resource.depends_on),
            );
        }
        Self {
            id: format!("{}-{}", action_type, key),
            action_type,
            resource_type: resource.resource_type.clone(),
            resource_id: resource.id.clone(),
            description: format!("{} {}", action_type, key),
            details,
        }
    }

    fn delete(key: &str, recorded: &ResourceState) -> Self {
        let resource_id = key
            .split_once(':')
            .map(|(_, id)| id)
            .unwrap_or(key)
            .to_string();
        Self {
            id: format!("{}-{}", ActionType::Delete, key),
            action_type: ActionType::Delete,
            resource_type: recorded.resource_type.clone(),
            resource_id,
            description: format!("{} {}", ActionType::Delete, key),
            details: [(
                "realized_id".to_string(),
                serde_json::Value::String(recorded.id.clone()),
            )]
            .into_iter()
            .collect(),
        }
    }

    /// Full resource key (type:id) this action applies to
    pub fn resource_key(&self) -> String {
        format!("{}:{}", self.resource_type, self.resource_id)
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource
    Update,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of applying actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    /// Successfully applied actions
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,

    /// Realized state of created or updated resources, by key
    #[serde(default)]
    pub realized: BTreeMap<String, ResourceState>,

    /// Total execution time in milliseconds
    #[serde(default)]
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            realized: BTreeMap::new(),
            duration_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action_id: String, message: String) {
        self.succeeded.push(ActionResult {
            action_id,
            success: true,
            message,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action_id: String, error: String) {
        self.failed.push(ActionResult {
            action_id,
            success: false,
            message: String::new(),
            error: Some(error),
        });
    }

    /// Whether the action with this id was applied
    pub fn succeeded(&self, action_id: &str) -> bool {
        self.succeeded.iter().any(|r| r.action_id == action_id)
    }
}

impl Default for ApplyResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// ID of the action
    pub action_id: String,

    /// Whether the action succeeded
    pub success: bool,

    /// Success message
    #[serde(default)]
    pub message: String,

    /// Error message if failed
    #[serde(default)]
    pub error: Option<String>,
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform, dependencies first
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

/// Diff the desired resources against the recorded state
///
/// Creates, updates and no-ops come first in dependency order; deletes of
/// resources no longer declared follow with dependents before dependencies.
pub fn diff(desired: &ResourceSet, current: &GlobalState) -> Result<Plan> {
    let mut actions = Vec::with_capacity(desired.len());

    let desired_graph: BTreeMap<&str, Vec<&str>> = desired
        .resources
        .iter()
        .map(|(key, r)| {
            (
                key.as_str(),
                r.depends_on.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    for key in dependency_order(&desired_graph)? {
        let resource = &desired.resources[key];
        let action_type = match current.get_resource(key) {
            None => ActionType::Create,
            Some(recorded) if recorded.inputs != resource.config => ActionType::Update,
            Some(_) => ActionType::NoOp,
        };
        actions.push(Action::for_resource(action_type, resource));
    }

    let orphan_graph: BTreeMap<&str, Vec<&str>> = current
        .resources
        .iter()
        .filter(|(key, _)| !desired.contains(key))
        .map(|(key, r)| {
            (
                key.as_str(),
                r.depends_on.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let mut deletes = dependency_order(&orphan_graph)?;
    deletes.reverse();
    for key in deletes {
        actions.push(Action::delete(key, &current.resources[key]));
    }

    tracing::debug!(actions = actions.len(), "Computed plan");
    Ok(Plan::new(actions))
}

/// Topologically sort keys so that every key follows its dependencies.
/// Dependencies outside the graph are ignored; ties break alphabetically.
fn dependency_order<'a>(graph: &BTreeMap<&'a str, Vec<&'a str>>) -> Result<Vec<&'a str>> {
    let mut remaining: BTreeMap<&'a str, BTreeSet<&'a str>> = graph
        .iter()
        .map(|(key, deps)| {
            (
                *key,
                deps.iter()
                    .copied()
                    .filter(|dep| graph.contains_key(dep))
                    .collect(),
            )
        })
        .collect();

    let mut order = Vec::with_capacity(graph.len());
    while !remaining.is_empty() {
        let ready: Vec<&'a str> = remaining
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(key, _)| *key)
            .collect();

        if ready.is_empty() {
            let stuck: Vec<&str> = remaining.keys().copied().collect();
            return Err(CloudError::CircularDependency(stuck.join(", ")));
        }

        for key in &ready {
            remaining.remove(key);
        }
        for deps in remaining.values_mut() {
            for key in &ready {
                deps.remove(key);
            }
        }
        order.extend(ready);
    }
    Ok(order)
}
