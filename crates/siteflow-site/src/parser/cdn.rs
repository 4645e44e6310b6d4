//! cdn / engine node parsing

use super::{all_strings, first_bool, first_port, first_string, first_u64, required_name};
use crate::error::{Result, SiteError};
use crate::model::{CdnSettings, EngineSettings};
use kdl::KdlNode;

/// Parse a `cdn` node
pub fn parse_cdn(node: &KdlNode) -> Result<CdnSettings> {
    let mut cdn = CdnSettings {
        name: required_name(node, "cdn")?,
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "enabled" => cdn.enabled = first_bool(child)?,
                "price-class" | "price_class" => {
                    if let Some(v) = first_string(child) {
                        cdn.price_class = v;
                    }
                }
                "viewer-protocol-policy" | "viewer_protocol_policy" => {
                    if let Some(v) = first_string(child) {
                        cdn.viewer_protocol_policy = v;
                    }
                }
                "allowed-methods" | "allowed_methods" => cdn.allowed_methods = all_strings(child),
                "cached-methods" | "cached_methods" => cdn.cached_methods = all_strings(child),
                "min-ttl" | "min_ttl" => cdn.min_ttl = first_u64(child)?,
                "default-ttl" | "default_ttl" => cdn.default_ttl = first_u64(child)?,
                "max-ttl" | "max_ttl" => cdn.max_ttl = first_u64(child)?,
                "http-port" | "http_port" => cdn.http_port = first_port(child)?,
                "https-port" | "https_port" => cdn.https_port = first_port(child)?,
                "origin-protocol-policy" | "origin_protocol_policy" => {
                    if let Some(v) = first_string(child) {
                        cdn.origin_protocol_policy = v;
                    }
                }
                "origin-ssl-protocols" | "origin_ssl_protocols" => {
                    cdn.origin_ssl_protocols = all_strings(child);
                }
                "forward-query-string" | "forward_query_string" => {
                    cdn.forward_query_string = first_bool(child)?;
                }
                "forward-cookies" | "forward_cookies" => {
                    if let Some(v) = first_string(child) {
                        cdn.forward_cookies = v;
                    }
                }
                "geo-restriction" | "geo_restriction" => {
                    if let Some(v) = first_string(child) {
                        cdn.geo_restriction = v;
                    }
                }
                other => {
                    tracing::debug!(node = other, "Ignoring unknown cdn setting");
                }
            }
        }
    }

    if cdn.min_ttl > cdn.default_ttl || cdn.default_ttl > cdn.max_ttl {
        return Err(SiteError::InvalidConfig(format!(
            "cdn TTLs must satisfy min <= default <= max (got {} / {} / {})",
            cdn.min_ttl, cdn.default_ttl, cdn.max_ttl
        )));
    }

    Ok(cdn)
}

/// Parse an `engine` node
pub fn parse_engine(node: &KdlNode) -> Result<EngineSettings> {
    let command = required_name(node, "engine")?;
    let args = node
        .children()
        .and_then(|children| {
            children
                .nodes()
                .iter()
                .find(|child| child.name().value() == "args")
        })
        .map(all_strings)
        .unwrap_or_default();

    Ok(EngineSettings { command, args })
}
