//! AWS-facing layer around the policy evaluator: resource descriptions,
//! policy sources, the policy-aware compliance checks and batch scanning.

mod checks;
mod resource;
mod scan;
mod source;
mod verdict;

pub use checks::{
    registry, select, Check, IamPolicyNoAdministrativePrivileges, IamPolicyNoWildcardServiceActions,
    LambdaFunctionNotPubliclyAccessible, LambdaFunctionResourcePolicyScoped, S3BucketPolicyPublicAccess,
};
pub use resource::{PolicyRef, PolicyResource, ResourceKind};
pub use scan::{scan, scan_resource};
pub use source::{LocalSource, PolicySource};
pub use verdict::{Finding, Summary, Verdict};
