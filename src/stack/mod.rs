//! Stack lifecycle controller.
//!
//! Creates or deletes the CloudFormation stack holding the warehouse cluster
//! and its IAM role, polling stack status to a terminal state. Unlike the
//! tool this replaces, a stack that lands in a failure or rollback status
//! aborts the poll loop instead of being polled forever.

pub mod poll;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::SdkError;
use aws_sdk_cloudformation::operation::describe_stacks::DescribeStacksError;
use aws_sdk_cloudformation::types::{Capability, Output, Parameter, StackStatus};
use snafu::prelude::*;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{Config, StackConfig};
use crate::error::{
    CreateStackSnafu, DeleteStackSnafu, DescribeStacksSnafu, MissingStatusSnafu, PollSnafu,
    ReadTemplateSnafu, StackError, StackFailedSnafu,
};
use self::poll::{PollConfig, PollError, poll_until};

/// Output key for the IAM role ARN granted to COPY statements.
pub const ROLE_ARN_OUTPUT: &str = "IamRoleArn";
/// Output key for the cluster endpoint address.
pub const ENDPOINT_OUTPUT: &str = "ClusterEndpoint";

/// Controller for the warehouse infrastructure stack.
///
/// Holds only what the lifecycle operations need: the client, the stack
/// section of the configuration, and the template parameters resolved at
/// construction.
pub struct StackController {
    client: Client,
    stack: StackConfig,
    parameters: Vec<Parameter>,
    poll: PollConfig,
}

impl StackController {
    /// Build a CloudFormation client from the configured region and
    /// credentials.
    pub async fn new(config: &Config) -> Self {
        let credentials = Credentials::from_keys(
            config.aws.access_key_id.as_str(),
            config.aws.secret_access_key.as_str(),
            None,
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;
        let client = Client::new(&shared);
        let poll = PollConfig {
            interval: Duration::from_secs(config.stack.poll_interval_secs),
            max_attempts: config.stack.max_poll_attempts,
        };
        Self {
            client,
            stack: config.stack.clone(),
            parameters: template_parameters(config),
            poll,
        }
    }

    /// Submit stack creation and wait for `CREATE_COMPLETE`.
    ///
    /// Fails if a stack with the same name already exists. On success the
    /// role ARN and cluster endpoint outputs are logged; a missing or
    /// duplicated output key is logged as absent, not treated as an error.
    pub async fn create(&self) -> Result<(), StackError> {
        let template = tokio::fs::read_to_string(&self.stack.template_path)
            .await
            .with_context(|_| ReadTemplateSnafu {
                path: self.stack.template_path.clone(),
            })?;

        info!("creating stack '{}'", self.stack.name);
        let response = self
            .client
            .create_stack()
            .stack_name(&self.stack.name)
            .template_body(template)
            .capabilities(Capability::CapabilityNamedIam)
            .set_parameters(Some(self.parameters.clone()))
            .send()
            .await
            .context(CreateStackSnafu)?;
        if let Some(stack_id) = response.stack_id() {
            info!(%stack_id, "stack creation submitted");
        }

        info!("provisioning resources, this may take a while");
        self.wait_for(StackStatus::CreateComplete).await?;

        let outputs = self.outputs().await?;
        for key in [ROLE_ARN_OUTPUT, ENDPOINT_OUTPUT] {
            match stack_output(&outputs, key) {
                Some(value) => info!("stack output {key}: {value}"),
                None => warn!("stack output {key} is absent"),
            }
        }
        Ok(())
    }

    /// Submit stack deletion and wait for `DELETE_COMPLETE`.
    pub async fn delete(&self) -> Result<(), StackError> {
        info!("deleting stack '{}'", self.stack.name);
        self.client
            .delete_stack()
            .stack_name(&self.stack.name)
            .send()
            .await
            .context(DeleteStackSnafu)?;

        info!("removing resources, this may take a while");
        self.wait_for(StackStatus::DeleteComplete).await
    }

    /// Fetch the current stack status.
    pub async fn status(&self) -> Result<StackStatus, StackError> {
        let response = self
            .client
            .describe_stacks()
            .stack_name(&self.stack.name)
            .send()
            .await
            .context(DescribeStacksSnafu)?;
        response
            .stacks()
            .first()
            .and_then(|stack| stack.stack_status().cloned())
            .context(MissingStatusSnafu)
    }

    /// Poll stack status until it reaches `target`.
    async fn wait_for(&self, target: StackStatus) -> Result<(), StackError> {
        let fetch = || async {
            let status = match self.status().await {
                Ok(status) => status,
                // Describe-by-name stops resolving once deletion finishes.
                Err(StackError::DescribeStacks { source })
                    if target == StackStatus::DeleteComplete && is_not_found(&source) =>
                {
                    StackStatus::DeleteComplete
                }
                Err(e) => return Err(e),
            };
            info!("current status: {}", status.as_str());
            ensure!(
                !is_failure(&status),
                StackFailedSnafu {
                    status: status.as_str(),
                }
            );
            Ok(status)
        };

        match poll_until(fetch, |status| *status == target, &self.poll).await {
            Ok(_) => Ok(()),
            // Surface the fetch-side error (API failure, terminal status)
            // directly; only exhaustion is the poll loop's own failure.
            Err(PollError::Fetch { source }) => Err(source),
            Err(exhausted) => Err(exhausted).context(PollSnafu),
        }
    }

    /// Outputs of the stack description, if any.
    async fn outputs(&self) -> Result<Vec<Output>, StackError> {
        let response = self
            .client
            .describe_stacks()
            .stack_name(&self.stack.name)
            .send()
            .await
            .context(DescribeStacksSnafu)?;
        Ok(response
            .stacks()
            .first()
            .map(|stack| stack.outputs().to_vec())
            .unwrap_or_default())
    }
}

/// The nine template parameters. Keys must match the template verbatim.
fn template_parameters(config: &Config) -> Vec<Parameter> {
    [
        ("RoleNameParam", config.iam.role_name.clone()),
        (
            "ClusterIdentifierParam",
            config.warehouse.cluster_identifier.clone(),
        ),
        ("ClusterTypeParam", config.warehouse.cluster_type.clone()),
        ("NodeTypeParam", config.warehouse.node_type.clone()),
        (
            "NumberOfNodesParam",
            config.warehouse.number_of_nodes.to_string(),
        ),
        ("DBNameParam", config.warehouse.database.clone()),
        ("PortParam", config.warehouse.port.to_string()),
        (
            "MasterUsernameParam",
            config.warehouse.master_username.clone(),
        ),
        (
            "MasterUserPasswordParam",
            config.warehouse.master_password.clone(),
        ),
    ]
    .into_iter()
    .map(|(key, value)| {
        Parameter::builder()
            .parameter_key(key)
            .parameter_value(value)
            .build()
    })
    .collect()
}

/// Statuses the stack can never progress from toward a creation or deletion
/// target.
fn is_failure(status: &StackStatus) -> bool {
    matches!(
        status,
        StackStatus::CreateFailed
            | StackStatus::RollbackInProgress
            | StackStatus::RollbackComplete
            | StackStatus::RollbackFailed
            | StackStatus::DeleteFailed
    )
}

/// True when the describe call failed because no stack by that name exists.
fn is_not_found<R>(error: &SdkError<DescribeStacksError, R>) -> bool {
    match error {
        SdkError::ServiceError(context) => {
            let meta = context.err().meta();
            meta.code() == Some("ValidationError")
                && meta
                    .message()
                    .is_some_and(|message| message.contains("does not exist"))
        }
        _ => false,
    }
}

/// Resolve a stack output by key.
///
/// A key that is missing resolves to `None`; so does a key that appears more
/// than once, since an ambiguous key has no single value (not first-match).
pub fn stack_output<'a>(outputs: &'a [Output], key: &str) -> Option<&'a str> {
    let mut matches = outputs
        .iter()
        .filter(|output| output.output_key() == Some(key));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    first.output_value()
}
