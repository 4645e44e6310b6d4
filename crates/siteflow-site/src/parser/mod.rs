//! KDL parser
//!
//! Parses a `site.kdl` into a [`SiteConfig`]. Values not mentioned in the
//! file keep their defaults, and unknown top-level nodes are ignored.

mod bucket;
mod cdn;


use bucket::parse_bucket;
use cdn::{parse_cdn, parse_engine};

use crate::error::{Result, SiteError};
use crate::model::SiteConfig;
use kdl::{KdlDocument, KdlNode};
use std::fs;
use std::path::{Path, PathBuf};

/// Parse a site file
pub fn parse_site_file<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_site_string(&content)
}

/// Parse a site description from a string
pub fn parse_site_string(content: &str) -> Result<SiteConfig> {
    let doc: KdlDocument = content.parse()?;
    let mut config = SiteConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "project" => {
                config.project = required_name(node, "project")?;
            }
            "provider" => {
                config.provider = required_name(node, "provider")?;
            }
            "bucket" => {
                config.bucket = parse_bucket(node)?;
            }
            "upload" => {
                if let Some(source) = child_string(node, "source").or_else(|| first_string(node)) {
                    config.upload.source = PathBuf::from(source);
                }
            }
            "cdn" => {
                config.cdn = parse_cdn(node)?;
            }
            "engine" => {
                config.engine = Some(parse_engine(node)?);
            }
            other => {
                tracing::debug!(node = other, "Ignoring unknown node");
            }
        }
    }

    Ok(config)
}

/// First argument of a node as a string
fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn required_name(node: &KdlNode, kind: &str) -> Result<String> {
    first_string(node).ok_or_else(|| SiteError::InvalidConfig(format!("{kind} requires a name")))
}

/// Every string argument of a node
fn all_strings(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter_map(|e| e.value().as_string().map(|s| s.to_string()))
        .collect()
}

fn first_bool(node: &KdlNode) -> Result<bool> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_bool())
        .ok_or_else(|| {
            SiteError::InvalidConfig(format!("{} expects #true or #false", node.name().value()))
        })
}

fn first_integer(node: &KdlNode) -> Result<i128> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_integer())
        .ok_or_else(|| SiteError::InvalidConfig(format!("{} expects a number", node.name().value())))
}

/// Non-negative integer argument
fn first_u64(node: &KdlNode) -> Result<u64> {
    let value = first_integer(node)?;
    u64::try_from(value).map_err(|_| {
        SiteError::InvalidConfig(format!(
            "{} must not be negative: {}",
            node.name().value(),
            value
        ))
    })
}

fn first_port(node: &KdlNode) -> Result<u16> {
    let value = first_integer(node)?;
    u16::try_from(value).map_err(|_| {
        SiteError::InvalidConfig(format!(
            "{} is not a valid port: {}",
            node.name().value(),
            value
        ))
    })
}

/// String argument of the first child named `name`
fn child_string(node: &KdlNode, name: &str) -> Option<String> {
    node.children()?
        .nodes()
        .iter()
        .find(|child| child.name().value() == name)
        .and_then(first_string)
}
