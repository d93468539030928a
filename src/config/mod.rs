//! Configuration parsing.
//!
//! Handles loading the deployment configuration from a YAML file, with
//! environment variable interpolation for values that should not live on
//! disk (credentials, passwords).
//!
//! The pipeline depends on these values being present; it performs no
//! validation of their contents beyond what deserialization enforces.

mod vars;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, EnvInterpolationSnafu, ReadFileSnafu, YamlParseSnafu};

/// Main configuration structure for the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub aws: AwsConfig,
    pub warehouse: WarehouseConfig,
    pub iam: IamConfig,
    pub s3: S3Config,
    pub stack: StackConfig,
}

/// AWS account and credential settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Region hosting the stack, the cluster, and the source buckets.
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Warehouse cluster shape and connection parameters.
///
/// The cluster fields feed the stack template parameters; the connection
/// fields feed both the template and the database driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Cluster endpoint address (known once the stack is up).
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub master_username: String,
    pub master_password: String,
    pub cluster_identifier: String,
    #[serde(default = "default_cluster_type")]
    pub cluster_type: String,
    pub node_type: String,
    pub number_of_nodes: u32,
}

/// IAM role attached to the cluster for bulk loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IamConfig {
    pub role_name: String,
    /// ARN embedded in COPY statement credentials.
    pub role_arn: String,
}

/// Object-storage paths for the raw source data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Root of the listening-activity log files.
    pub log_data: String,
    /// JSONPaths descriptor mapping log fields to staging columns.
    pub log_json_path: String,
    /// Root of the song catalog, sharded by leading-letter prefix.
    pub song_data: String,
}

/// Stack name, template, and poll-loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackConfig {
    pub name: String,
    /// Template file forwarded verbatim as the stack template body.
    pub template_path: PathBuf,
    /// Seconds to sleep between stack status checks (default: 30).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Bound on status checks before giving up (default: unbounded).
    #[serde(default)]
    pub max_poll_attempts: Option<u32>,
}

fn default_port() -> u16 {
    5439
}

fn default_cluster_type() -> String {
    "multi-node".to_string()
}

fn default_poll_interval_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from a YAML file, interpolating environment
    /// variables in the raw text before parsing.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).context(ReadFileSnafu)?;
        let text = vars::interpolate(&raw).map_err(|errors| {
            EnvInterpolationSnafu {
                message: errors.join("\n"),
            }
            .build()
        })?;
        serde_yaml::from_str(&text).context(YamlParseSnafu)
    }
}
