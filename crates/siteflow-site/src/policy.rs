//! Bucket access policy

use serde_json::{Value, json};
use siteflow_cloud::Output;

/// Policy granting anonymous read on every object in the bucket
pub fn public_read_policy(bucket_id: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": "*",
            "Action": ["s3:GetObject"],
            "Resource": [format!("arn:aws:s3:::{bucket_id}/*")]
        }]
    })
}

/// Serialized policy document, available once the bucket id is known
pub fn policy_output(bucket_id: &Output<String>) -> Output<String> {
    bucket_id.map(|id| public_read_policy(&id).to_string())
}
