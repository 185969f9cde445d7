use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "aws_s3_bucket")]
    S3Bucket,
    #[serde(rename = "aws_lambda_function")]
    LambdaFunction,
    #[serde(rename = "aws_iam_policy")]
    IamPolicy,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::S3Bucket => "aws_s3_bucket",
            ResourceKind::LambdaFunction => "aws_lambda_function",
            ResourceKind::IamPolicy => "aws_iam_policy",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

/// A cloud resource whose access policy has already been retrieved, either
/// inline (JSON value or the JSON-encoded string AWS APIs return) or as a
/// file on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyResource {
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub name: String,
    pub arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Json>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolicyRef<'a> {
    Inline(&'a Json),
    File(&'a Path),
    None,
}

impl PolicyResource {
    pub fn new(kind: ResourceKind, name: impl Into<String>, arn: impl Into<String>) -> Self {
        Self { kind, name: name.into(), arn: arn.into(), policy: None, policy_file: None }
    }

    pub fn with_policy(mut self, policy: Json) -> Self { self.policy = Some(policy); self }

    pub fn with_policy_file(mut self, path: impl Into<PathBuf>) -> Self { self.policy_file = Some(path.into()); self }

    pub fn policy_ref(&self) -> anyhow::Result<PolicyRef<'_>> {
        match (&self.policy, &self.policy_file) {
            (Some(_), Some(_)) => anyhow::bail!("resource '{}' sets both policy and policy_file", self.name),
            (Some(p), None) => Ok(PolicyRef::Inline(p)),
            (None, Some(f)) => Ok(PolicyRef::File(f)),
            (None, None) => Ok(PolicyRef::None),
        }
    }
}
