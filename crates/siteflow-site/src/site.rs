//! Static website stack declaration

use crate::error::Result;
use crate::model::{CdnSettings, PublicAccessSettings, SiteConfig};
use crate::policy::policy_output;
use crate::upload::{ObjectEntry, map_directory};
use serde_json::json;
use siteflow_cloud::{Output, Stack};
use std::path::{Path, PathBuf};
use tracing::info;

pub const BUCKET: &str = "s3-bucket";
pub const PUBLIC_ACCESS_BLOCK: &str = "s3-public-access-block";
pub const BUCKET_POLICY: &str = "s3-bucket-policy";
pub const OBJECT: &str = "s3-object";
pub const DISTRIBUTION: &str = "cloudfront-distribution";

/// The declared bucket, passed to everything that attaches to it
#[derive(Debug, Clone)]
pub struct BucketRef {
    /// Resource key (type:id)
    pub key: String,
    pub id: Output<String>,
    pub arn: Output<String>,
    pub website_endpoint: Output<String>,
}

impl BucketRef {
    fn new(key: String) -> Self {
        Self {
            id: Output::attribute(key.clone(), "id"),
            arn: Output::attribute(key.clone(), "arn"),
            website_endpoint: Output::attribute(key.clone(), "website_endpoint"),
            key,
        }
    }
}

/// Declared website stack
#[derive(Debug, Clone)]
pub struct SiteStack {
    pub stack: Stack,
    pub bucket: BucketRef,
    /// Files declared as objects
    pub objects: Vec<ObjectEntry>,
    /// Resolved upload directory
    pub upload_root: PathBuf,
    /// Whether the upload directory was missing
    pub upload_skipped: bool,
}

/// Declare every resource of the site
///
/// Relative upload directories resolve against `project_root`.
pub fn declare_site(config: &SiteConfig, project_root: &Path) -> Result<SiteStack> {
    let mut stack = Stack::new(&config.project, &config.provider);

    let bucket_key = stack.declare(
        BUCKET,
        &config.bucket.name,
        json!({
            "website": {
                "index_document": config.bucket.index_document,
            }
        }),
        &[],
    )?;
    let bucket = BucketRef::new(bucket_key);

    declare_public_access(&mut stack, &bucket, &config.bucket.public_access)?;

    stack.declare(
        BUCKET_POLICY,
        &config.bucket.policy,
        json!({
            "bucket": bucket.id.template(),
            "policy": policy_output(&bucket.id).template(),
        }),
        &[&bucket.id],
    )?;

    let upload_root = if config.upload.source.is_absolute() {
        config.upload.source.clone()
    } else {
        project_root.join(&config.upload.source)
    };
    let upload_skipped = !upload_root.is_dir();
    let objects = map_directory(&upload_root)?;
    for entry in &objects {
        declare_object(&mut stack, &bucket, entry)?;
    }

    let cdn_key = declare_distribution(&mut stack, &bucket, &config.cdn)?;

    stack.export("bucket_name", bucket.id.clone());
    stack.export("website_url", bucket.website_endpoint.clone());
    stack.export("cdn_url", Output::attribute(cdn_key, "domain_name"));

    info!(
        stack = %stack.name(),
        resources = stack.resources().len(),
        objects = objects.len(),
        "Declared site"
    );

    Ok(SiteStack {
        stack,
        bucket,
        objects,
        upload_root,
        upload_skipped,
    })
}

fn declare_public_access(
    stack: &mut Stack,
    bucket: &BucketRef,
    settings: &PublicAccessSettings,
) -> Result<String> {
    Ok(stack.declare(
        PUBLIC_ACCESS_BLOCK,
        &settings.name,
        json!({
            "bucket": bucket.id.template(),
            "block_public_acls": settings.block_public_acls,
            "ignore_public_acls": settings.ignore_public_acls,
            "block_public_policy": settings.block_public_policy,
            "restrict_public_buckets": settings.restrict_public_buckets,
        }),
        &[&bucket.id],
    )?)
}

fn declare_object(stack: &mut Stack, bucket: &BucketRef, entry: &ObjectEntry) -> Result<String> {
    Ok(stack.declare(
        OBJECT,
        &entry.key,
        json!({
            "bucket": bucket.id.template(),
            "key": entry.key,
            "source": entry.source.to_string_lossy(),
            "content_type": entry.content_type,
        }),
        &[&bucket.id],
    )?)
}

fn declare_distribution(
    stack: &mut Stack,
    bucket: &BucketRef,
    cdn: &CdnSettings,
) -> Result<String> {
    let origin_id = bucket.arn.template();
    Ok(stack.declare(
        DISTRIBUTION,
        &cdn.name,
        json!({
            "enabled": cdn.enabled,
            "origins": [{
                "origin_id": origin_id,
                "domain_name": bucket.website_endpoint.template(),
                "custom_origin_config": {
                    "http_port": cdn.http_port,
                    "https_port": cdn.https_port,
                    "origin_protocol_policy": cdn.origin_protocol_policy,
                    "origin_ssl_protocols": cdn.origin_ssl_protocols,
                },
            }],
            "default_cache_behavior": {
                "target_origin_id": origin_id,
                "viewer_protocol_policy": cdn.viewer_protocol_policy,
                "allowed_methods": cdn.allowed_methods,
                "cached_methods": cdn.cached_methods,
                "forwarded_values": {
                    "query_string": cdn.forward_query_string,
                    "cookies": { "forward": cdn.forward_cookies },
                },
                "min_ttl": cdn.min_ttl,
                "default_ttl": cdn.default_ttl,
                "max_ttl": cdn.max_ttl,
            },
            "price_class": cdn.price_class,
            "restrictions": {
                "geo_restriction": { "restriction_type": cdn.geo_restriction },
            },
            "viewer_certificate": { "cloudfront_default_certificate": true },
        }),
        &[&bucket.arn, &bucket.website_endpoint],
    )?)
}
