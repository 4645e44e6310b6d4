//! bucket node parsing

use super::{first_bool, first_string, required_name};
use crate::error::Result;
use crate::model::{BucketSettings, PublicAccessSettings};
use kdl::KdlNode;

/// Parse a `bucket` node
pub fn parse_bucket(node: &KdlNode) -> Result<BucketSettings> {
    let mut bucket = BucketSettings {
        name: required_name(node, "bucket")?,
        ..Default::default()
    };

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "index-document" | "index_document" => {
                    if let Some(doc) = first_string(child) {
                        bucket.index_document = doc;
                    }
                }
                "policy" => {
                    bucket.policy = required_name(child, "policy")?;
                }
                "public-access" | "public_access" => {
                    bucket.public_access = parse_public_access(child)?;
                }
                other => {
                    tracing::debug!(node = other, "Ignoring unknown bucket setting");
                }
            }
        }
    }

    Ok(bucket)
}

fn parse_public_access(node: &KdlNode) -> Result<PublicAccessSettings> {
    let mut access = PublicAccessSettings::default();
    if let Some(name) = first_string(node) {
        access.name = name;
    }

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "block-public-acls" | "block_public_acls" => {
                    access.block_public_acls = first_bool(child)?;
                }
                "ignore-public-acls" | "ignore_public_acls" => {
                    access.ignore_public_acls = first_bool(child)?;
                }
                "block-public-policy" | "block_public_policy" => {
                    access.block_public_policy = first_bool(child)?;
                }
                "restrict-public-buckets" | "restrict_public_buckets" => {
                    access.restrict_public_buckets = first_bool(child)?;
                }
                _ => {}
            }
        }
    }

    Ok(access)
}
