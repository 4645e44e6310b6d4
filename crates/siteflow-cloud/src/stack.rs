//! Declaration context
//!
//! A [`Stack`] is the single value every declaration goes through: it owns
//! the [`ResourceSet`] being built and the named exports operators read
//! after provisioning. Passing it explicitly keeps declaration code free of
//! module-level state and testable without touching a cloud account.

use crate::error::Result;
use crate::output::{AttributeSource, Output};
use crate::provider::{ResourceConfig, ResourceSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Resource graph under construction plus its exports
#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    provider: String,
    resources: ResourceSet,
    exports: BTreeMap<String, Output<String>>,
}

impl Stack {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            resources: ResourceSet::new(),
            exports: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a resource and return its key
    ///
    /// Dependencies are derived from the outputs in `inputs`: every
    /// resource an input output refers to becomes a `depends_on` edge.
    pub fn declare(
        &mut self,
        resource_type: &str,
        id: &str,
        config: serde_json::Value,
        inputs: &[&Output<String>],
    ) -> Result<String> {
        let mut resource = ResourceConfig::new(resource_type, id, self.provider.clone(), config);
        for output in inputs {
            for dep in output.dependencies() {
                resource = resource.depends_on(dep.resource.clone());
            }
        }
        let key = resource.key();
        self.resources.add(resource)?;
        tracing::debug!(resource = %key, "Declared resource");
        Ok(key)
    }

    /// Publish a named output
    pub fn export(&mut self, name: impl Into<String>, value: Output<String>) {
        self.exports.insert(name.into(), value);
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.resources
    }

    pub fn exports(&self) -> &BTreeMap<String, Output<String>> {
        &self.exports
    }

    /// Resolve every export; unresolved ones map to `None`
    pub fn resolve_exports(&self, source: &dyn AttributeSource) -> BTreeMap<String, Option<String>> {
        self.exports
            .iter()
            .map(|(name, output)| (name.clone(), output.resolve(source)))
            .collect()
    }

    /// The declared graph as handed to the provisioning engine
    pub fn graph(&self) -> StackGraph {
        StackGraph {
            stack: self.name.clone(),
            resources: self.resources.resources.values().cloned().collect(),
            exports: self
                .exports
                .iter()
                .map(|(name, output)| (name.clone(), output.template()))
                .collect(),
        }
    }
}

/// Serializable snapshot of a stack
#[derive(Debug, Clone, Serialize)]
pub struct StackGraph {
    pub stack: String,
    pub resources: Vec<ResourceConfig>,
    pub exports: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CloudError;
    use crate::state::{GlobalState, ResourceState};
    use serde_json::json;

    #[test]
    fn test_declare_derives_dependencies_from_outputs() {
        let mut stack = Stack::new("demo", "aws");
        let bucket = stack
            .declare("s3-bucket", "site", json!({}), &[])
            .unwrap();
        let id = Output::attribute(bucket.clone(), "id");

        let policy = stack
            .declare("s3-bucket-policy", "policy", json!({"bucket": id.template()}), &[&id])
            .unwrap();

        let declared = &stack.resources().resources[&policy];
        assert_eq!(declared.depends_on, vec![bucket]);
        assert_eq!(declared.provider, "aws");
        assert_eq!(declared.config["bucket"], json!("${s3-bucket:site.id}"));
    }

    #[test]
    fn test_declare_twice_fails() {
        let mut stack = Stack::new("demo", "aws");
        stack.declare("s3-object", "a.txt", json!({}), &[]).unwrap();
        let err = stack.declare("s3-object", "a.txt", json!({}), &[]).unwrap_err();
        assert!(matches!(err, CloudError::DuplicateResource(_)));
    }

    #[test]
    fn test_exports_resolve_against_state() {
        let mut stack = Stack::new("demo", "aws");
        let bucket = stack.declare("s3-bucket", "site", json!({}), &[]).unwrap();
        stack.export("bucket_name", Output::attribute(bucket.clone(), "id"));
        stack.export("greeting", Output::known("hi".to_string()));

        let pending = stack.resolve_exports(&GlobalState::new());
        assert_eq!(pending["bucket_name"], None);
        assert_eq!(pending["greeting"], Some("hi".to_string()));

        let mut state = GlobalState::new();
        state.set_resource(bucket, ResourceState::new("site-123", "s3-bucket"));
        let resolved = stack.resolve_exports(&state);
        assert_eq!(resolved["bucket_name"], Some("site-123".to_string()));
    }

    #[test]
    fn test_graph_renders_placeholders() {
        let mut stack = Stack::new("demo", "aws");
        let bucket = stack.declare("s3-bucket", "site", json!({}), &[]).unwrap();
        stack.export("bucket_name", Output::attribute(bucket, "id"));

        let graph = stack.graph();
        assert_eq!(graph.stack, "demo");
        assert_eq!(graph.resources.len(), 1);
        assert_eq!(graph.exports["bucket_name"], "${s3-bucket:site.id}");
    }
}
