//! Deferred resource attributes
//!
//! Most interesting attributes of a cloud resource (its generated id, ARN,
//! endpoint, ...) only exist once the provisioning engine has realized it.
//! [`Output`] models such a value: it is either known up front, or computed
//! from one or more realized attributes through a chain of [`Output::map`]
//! transformations.
//!
//! An output is resolved against any [`AttributeSource`], usually the
//! recorded [`GlobalState`](crate::state::GlobalState). When nothing has been
//! realized yet, [`Output::template`] renders the value with `${type:id.attr}`
//! placeholders in place of the missing attributes, which is what ends up in
//! the declared resource graph handed to the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Lookup of realized resource attributes
pub trait AttributeSource {
    /// Returns the attribute `name` of the resource with key `resource`
    fn attribute(&self, resource: &str, name: &str) -> Option<serde_json::Value>;
}

/// Reference to a single attribute of a declared resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeRef {
    /// Resource key (type:id)
    pub resource: String,

    /// Attribute name (e.g. "id", "arn", "website_endpoint")
    pub attribute: String,
}

impl AttributeRef {
    pub fn new(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }

    /// Placeholder substituted by the engine once the attribute is known
    pub fn placeholder(&self) -> String {
        format!("${{{}.{}}}", self.resource, self.attribute)
    }
}

impl fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource, self.attribute)
    }
}

/// Source answering every lookup with the attribute's placeholder
struct Placeholders;

impl AttributeSource for Placeholders {
    fn attribute(&self, resource: &str, name: &str) -> Option<serde_json::Value> {
        Some(serde_json::Value::String(
            AttributeRef::new(resource, name).placeholder(),
        ))
    }
}

type Resolver<T> = dyn Fn(&dyn AttributeSource) -> Option<T> + Send + Sync;

/// A value that may only become known after provisioning
pub struct Output<T> {
    dependencies: Vec<AttributeRef>,
    resolver: Arc<Resolver<T>>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            dependencies: self.dependencies.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + Sync + 'static> Output<T> {
    /// An output whose value is already known
    pub fn known(value: T) -> Self {
        Self {
            dependencies: Vec::new(),
            resolver: Arc::new(move |_: &dyn AttributeSource| Some(value.clone())),
        }
    }
}

impl<T: 'static> Output<T> {
    /// Transform the eventual value
    pub fn map<U: 'static, F>(&self, f: F) -> Output<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.resolver);
        Output {
            dependencies: self.dependencies.clone(),
            resolver: Arc::new(move |source: &dyn AttributeSource| inner(source).map(&f)),
        }
    }

    /// Combine with another output; resolves once both sides resolve
    pub fn zip<U: 'static>(&self, other: &Output<U>) -> Output<(T, U)> {
        let left = Arc::clone(&self.resolver);
        let right = Arc::clone(&other.resolver);
        let mut dependencies = self.dependencies.clone();
        for dep in &other.dependencies {
            if !dependencies.contains(dep) {
                dependencies.push(dep.clone());
            }
        }
        Output {
            dependencies,
            resolver: Arc::new(move |source: &dyn AttributeSource| {
                Some((left(source)?, right(source)?))
            }),
        }
    }

    /// Resolve against realized attributes, `None` while any input is missing
    pub fn resolve(&self, source: &dyn AttributeSource) -> Option<T> {
        (self.resolver)(source)
    }

    /// Attributes this output is computed from
    pub fn dependencies(&self) -> &[AttributeRef] {
        &self.dependencies
    }

    /// Whether the value is available without provisioning anything
    pub fn is_known(&self) -> bool {
        self.dependencies.is_empty()
    }
}

impl Output<String> {
    /// The attribute `name` of the resource with key `resource`
    ///
    /// Non-string attribute values resolve to their JSON rendering.
    pub fn attribute(resource: impl Into<String>, name: impl Into<String>) -> Self {
        let reference = AttributeRef::new(resource, name);
        let lookup = reference.clone();
        Self {
            dependencies: vec![reference],
            resolver: Arc::new(move |source: &dyn AttributeSource| {
                source
                    .attribute(&lookup.resource, &lookup.attribute)
                    .map(|value| match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
            }),
        }
    }

    /// Render with placeholders standing in for every unrealized attribute
    pub fn template(&self) -> String {
        self.resolve(&Placeholders).unwrap_or_default()
    }
}
