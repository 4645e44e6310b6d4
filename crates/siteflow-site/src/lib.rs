//! siteflow static website stack
//!
//! Reads a `site.kdl` description and declares the resources that host a
//! static website: a storage bucket with website hosting, its public-access
//! settings and read policy, one object per file under the upload directory,
//! and a CDN distribution in front of the bucket.

pub mod discovery;
pub mod error;
pub mod model;
pub mod parser;
pub mod policy;
pub mod site;
pub mod upload;

pub use discovery::{LoadedSite, find_site_file, load_site};
pub use error::{Result, SiteError};
pub use model::{
    BucketSettings, CdnSettings, EngineSettings, PublicAccessSettings, SiteConfig, UploadSettings,
};
pub use parser::{parse_site_file, parse_site_string};
pub use policy::{policy_output, public_read_policy};
pub use site::{BucketRef, SiteStack, declare_site};
pub use upload::{ObjectEntry, content_type_for, map_directory};
