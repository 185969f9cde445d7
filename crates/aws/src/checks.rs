use polcheck_policy::{PolicyError, PolicyResult};
use std::sync::Arc;

use crate::resource::{PolicyResource, ResourceKind};
use crate::verdict::{Finding, Verdict};

/// One compliance rule over a single resource's evaluated policy.
pub trait Check: Send + Sync {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn kind(&self) -> ResourceKind;

    /// Verdict and message for a policy that evaluated cleanly.
    fn judge(&self, resource: &PolicyResource, result: &PolicyResult) -> (Verdict, String);

    fn assess(&self, resource: &PolicyResource, outcome: &Result<PolicyResult, PolicyError>) -> Finding {
        let (verdict, message) = if resource.kind != self.kind() {
            (Verdict::NotApplicable, format!("check applies to {} resources, not {}", self.kind(), resource.kind))
        } else {
            match outcome {
                Ok(result) => self.judge(resource, result),
                Err(e) => (Verdict::Error, e.to_string()),
            }
        };
        Finding::new(self.id(), resource, verdict, message)
    }
}

pub struct S3BucketPolicyPublicAccess;

impl Check for S3BucketPolicyPublicAccess {
    fn id(&self) -> &'static str { "s3_bucket_policy_public_access" }
    fn description(&self) -> &'static str { "S3 bucket policy must not allow public access" }
    fn kind(&self) -> ResourceKind { ResourceKind::S3Bucket }

    fn judge(&self, r: &PolicyResource, result: &PolicyResult) -> (Verdict, String) {
        if !result.is_policy_attached() {
            (Verdict::Pass, format!("S3 Bucket {} does not have a bucket policy.", r.name))
        } else if result.is_publicly_accessible() {
            (Verdict::Fail, format!("S3 Bucket {} has a bucket policy allowing public access.", r.name))
        } else {
            (Verdict::Pass, format!("S3 Bucket {} has a bucket policy that does not allow public access.", r.name))
        }
    }
}

pub struct LambdaFunctionNotPubliclyAccessible;

impl Check for LambdaFunctionNotPubliclyAccessible {
    fn id(&self) -> &'static str { "awslambda_function_not_publicly_accessible" }
    fn description(&self) -> &'static str { "Lambda function resource policy must not allow public invocation" }
    fn kind(&self) -> ResourceKind { ResourceKind::LambdaFunction }

    fn judge(&self, r: &PolicyResource, result: &PolicyResult) -> (Verdict, String) {
        if !result.is_policy_attached() {
            (Verdict::Pass, format!("Lambda function {} does not have a resource-based policy.", r.name))
        } else if result.is_publicly_accessible() {
            (Verdict::Fail, format!("Lambda function {} has a resource-based policy with public access.", r.name))
        } else {
            (Verdict::Pass, format!("Lambda function {} has a resource-based policy without public access.", r.name))
        }
    }
}

pub struct LambdaFunctionResourcePolicyScoped;

impl Check for LambdaFunctionResourcePolicyScoped {
    fn id(&self) -> &'static str { "awslambda_function_resource_policy_scoped" }
    fn description(&self) -> &'static str { "Lambda function resource policy grants must be scoped to known callers" }
    fn kind(&self) -> ResourceKind { ResourceKind::LambdaFunction }

    fn judge(&self, r: &PolicyResource, result: &PolicyResult) -> (Verdict, String) {
        if !result.is_policy_attached() {
            (Verdict::Pass, format!("Lambda function {} does not have a resource-based policy.", r.name))
        } else if result.is_publicly_accessible() {
            (Verdict::Fail, format!("Lambda function {} grants invocation to callers without a source account restriction.", r.name))
        } else if !result.grants_to_resource(&r.arn) {
            (Verdict::Info, format!("Lambda function {} resource policy does not reference this function.", r.name))
        } else {
            (Verdict::Pass, format!("Lambda function {} resource policy grants are scoped.", r.name))
        }
    }
}

pub struct IamPolicyNoWildcardServiceActions;

impl Check for IamPolicyNoWildcardServiceActions {
    fn id(&self) -> &'static str { "iam_policy_no_wildcard_service_actions" }
    fn description(&self) -> &'static str { "IAM policy must not allow all actions of a service" }
    fn kind(&self) -> ResourceKind { ResourceKind::IamPolicy }

    fn judge(&self, r: &PolicyResource, result: &PolicyResult) -> (Verdict, String) {
        if result.has_wildcard_service_actions() {
            (Verdict::Fail, format!("Custom Policy {} allows '<service>:*' privileges.", r.name))
        } else {
            (Verdict::Pass, format!("Custom Policy {} does not allow '<service>:*' privileges.", r.name))
        }
    }
}

pub struct IamPolicyNoAdministrativePrivileges;

impl Check for IamPolicyNoAdministrativePrivileges {
    fn id(&self) -> &'static str { "iam_policy_no_administrative_privileges" }
    fn description(&self) -> &'static str { "IAM policy must not grant '*:*' administrative privileges" }
    fn kind(&self) -> ResourceKind { ResourceKind::IamPolicy }

    fn judge(&self, r: &PolicyResource, result: &PolicyResult) -> (Verdict, String) {
        if result.has_administrative_access() {
            (Verdict::Fail, format!("Policy {} allows '*:*' administrative privileges.", r.name))
        } else {
            (Verdict::Pass, format!("Policy {} does not allow '*:*' administrative privileges.", r.name))
        }
    }
}

/// All built-in checks, in report order.
pub fn registry() -> Vec<Arc<dyn Check>> {
    vec![
        Arc::new(S3BucketPolicyPublicAccess),
        Arc::new(LambdaFunctionNotPubliclyAccessible),
        Arc::new(LambdaFunctionResourcePolicyScoped),
        Arc::new(IamPolicyNoWildcardServiceActions),
        Arc::new(IamPolicyNoAdministrativePrivileges),
    ]
}

/// Registered checks restricted to `ids`; an empty list selects everything.
pub fn select(ids: &[String]) -> anyhow::Result<Vec<Arc<dyn Check>>> {
    let all = registry();
    if ids.is_empty() { return Ok(all); }
    for id in ids {
        if !all.iter().any(|c| c.id() == id) { anyhow::bail!("unknown check '{}'", id); }
    }
    Ok(all.into_iter().filter(|c| ids.iter().any(|id| id == c.id())).collect())
}
