//! Error types for floe using snafu.
//!
//! No failure is retried anywhere: driver and SDK errors propagate unmodified
//! inside these context wrappers and terminate the run.

use aws_sdk_cloudformation::error::SdkError;
use aws_sdk_cloudformation::operation::create_stack::CreateStackError;
use aws_sdk_cloudformation::operation::delete_stack::DeleteStackError;
use aws_sdk_cloudformation::operation::describe_stacks::DescribeStacksError;
use snafu::prelude::*;
use std::path::PathBuf;

use crate::stack::poll::PollError;

// ============ Config Errors ============

/// Errors that can occur while loading the configuration file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[snafu(display("Failed to read configuration file"))]
    ReadFile { source: std::io::Error },

    /// Failed to parse the YAML configuration.
    #[snafu(display("Failed to parse YAML configuration"))]
    YamlParse { source: serde_yaml::Error },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },
}

// ============ Warehouse Errors ============

/// Errors that can occur while talking to the warehouse.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum WarehouseError {
    /// Could not establish the warehouse connection.
    #[snafu(display("Failed to connect to the warehouse"))]
    Connect { source: tokio_postgres::Error },

    /// A statement in an execution plan failed. Earlier statements in the
    /// plan stay committed (autocommit, no rollback).
    #[snafu(display("Statement failed: {label}"))]
    Statement {
        label: String,
        source: tokio_postgres::Error,
    },
}

// ============ Stack Errors ============

/// Errors that can occur during stack lifecycle operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StackError {
    /// Could not read the stack template file.
    #[snafu(display("Failed to read stack template {}", path.display()))]
    ReadTemplate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The stack creation request was rejected.
    #[snafu(display("Failed to submit stack creation"))]
    CreateStack {
        source: SdkError<CreateStackError>,
    },

    /// The stack deletion request was rejected.
    #[snafu(display("Failed to submit stack deletion"))]
    DeleteStack {
        source: SdkError<DeleteStackError>,
    },

    /// A stack status check failed.
    #[snafu(display("Failed to describe stack"))]
    DescribeStacks {
        source: SdkError<DescribeStacksError>,
    },

    /// The stack description carried no status.
    #[snafu(display("Stack description carried no status"))]
    MissingStatus,

    /// The stack reached a status it can never progress from.
    #[snafu(display("Stack entered terminal status {status}"))]
    StackFailed { status: String },

    /// The poll loop gave up before the stack reached the target status.
    #[snafu(display("Stack status polling gave up"))]
    Poll {
        #[snafu(source(from(PollError<StackError>, Box::new)))]
        source: Box<PollError<StackError>>,
    },
}

// ============ Top-level Errors ============

/// Top-level error for a run, reported by `main`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EtlError {
    /// Configuration loading failed.
    #[snafu(display("Configuration error"))]
    Config { source: ConfigError },

    /// A warehouse operation failed.
    #[snafu(display("Warehouse operation failed"))]
    Warehouse { source: WarehouseError },

    /// A stack lifecycle operation failed.
    #[snafu(display("Stack operation failed"))]
    Stack { source: StackError },
}
