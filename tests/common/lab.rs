//! The S3 bucket lab scenario.
//!
//! A module that creates one bucket named after a username; the test
//! identity is injected so parallel instances never collide on bucket
//! names or remote state.

use std::path::Path;

use infratest::{BackendConfig, TerraformOptions};

pub const LAB_USERNAME: &str = "rafael.torices";
pub const LAB_STATE_KEY: &str = "eu-central-1/terratest-test-lab.tfstate";
pub const LAB_REGION: &str = "eu-central-1";

/// Bucket created by the module for this identity
pub fn expected_bucket_name(username: &str) -> String {
    format!("terratest-lab-{username}")
}

/// ARN of that bucket
pub fn expected_bucket_arn(username: &str) -> String {
    format!("arn:aws:s3:::{}", expected_bucket_name(username))
}

/// Bucket holding the remote state for this identity's test run
pub fn state_bucket(username: &str) -> String {
    format!("terratest-test-{username}")
}

/// Full provisioning options for the lab module
pub fn lab_options(terraform_dir: &Path, username: &str) -> TerraformOptions {
    TerraformOptions::new(terraform_dir)
        .with_var("username", username)
        .with_backend(BackendConfig::new(
            state_bucket(username),
            LAB_STATE_KEY,
            LAB_REGION,
        ))
        .with_no_color(true)
        .with_default_retryable_errors()
}
