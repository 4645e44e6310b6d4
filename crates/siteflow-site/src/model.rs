//! Site configuration model
//!
//! [`SiteConfig::default`] describes the color-challenge website exactly;
//! a `site.kdl` only needs to mention what differs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whole site description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Project (stack) name
    pub project: String,

    /// Provider the resources are declared against
    pub provider: String,

    pub bucket: BucketSettings,

    pub upload: UploadSettings,

    pub cdn: CdnSettings,

    /// Provisioning engine; `None` means preview-only
    pub engine: Option<EngineSettings>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            project: "color-challenge".to_string(),
            provider: "aws".to_string(),
            bucket: BucketSettings::default(),
            upload: UploadSettings::default(),
            cdn: CdnSettings::default(),
            engine: None,
        }
    }
}

/// Storage bucket with website hosting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSettings {
    pub name: String,
    pub index_document: String,
    /// Resource name of the bucket policy
    pub policy: String,
    pub public_access: PublicAccessSettings,
}

impl Default for BucketSettings {
    fn default() -> Self {
        Self {
            name: "color-challenge-website-bucket".to_string(),
            index_document: "index.html".to_string(),
            policy: "bucket-policy".to_string(),
            public_access: PublicAccessSettings::default(),
        }
    }
}

/// Public-access block attached to the bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicAccessSettings {
    pub name: String,
    pub block_public_acls: bool,
    pub ignore_public_acls: bool,
    pub block_public_policy: bool,
    pub restrict_public_buckets: bool,
}

impl Default for PublicAccessSettings {
    fn default() -> Self {
        Self {
            name: "color-challenge-bucket-public-access-block".to_string(),
            block_public_acls: false,
            ignore_public_acls: false,
            block_public_policy: false,
            restrict_public_buckets: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSettings {
    /// Directory mirrored into the bucket, relative to the project root
    pub source: PathBuf,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            source: PathBuf::from("./www"),
        }
    }
}

/// CDN distribution fronting the bucket's website endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdnSettings {
    pub name: String,
    pub enabled: bool,
    pub price_class: String,
    pub viewer_protocol_policy: String,
    pub allowed_methods: Vec<String>,
    pub cached_methods: Vec<String>,
    pub min_ttl: u64,
    pub default_ttl: u64,
    pub max_ttl: u64,
    pub http_port: u16,
    pub https_port: u16,
    pub origin_protocol_policy: String,
    pub origin_ssl_protocols: Vec<String>,
    pub forward_query_string: bool,
    pub forward_cookies: String,
    pub geo_restriction: String,
}

impl Default for CdnSettings {
    fn default() -> Self {
        let methods = || vec!["GET".to_string(), "HEAD".to_string(), "OPTIONS".to_string()];
        Self {
            name: "website-cdn".to_string(),
            enabled: true,
            price_class: "PriceClass_100".to_string(),
            viewer_protocol_policy: "redirect-to-https".to_string(),
            allowed_methods: methods(),
            cached_methods: methods(),
            min_ttl: 0,
            default_ttl: 3600,
            max_ttl: 86400,
            http_port: 80,
            https_port: 443,
            origin_protocol_policy: "http-only".to_string(),
            origin_ssl_protocols: vec!["TLSv1.2".to_string()],
            forward_query_string: false,
            forward_cookies: "none".to_string(),
            geo_restriction: "none".to_string(),
        }
    }
}

/// External provisioning engine command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}
