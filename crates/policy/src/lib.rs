//! Policy statement evaluation: decides whether an IAM-style policy
//! document grants public access, wildcard service actions or
//! administrative privilege.
//!
//! ```
//! use polcheck_policy::PolicyEvaluator;
//!
//! let raw = br#"{"Statement":{"Effect":"Allow","Principal":"*","Action":"s3:GetObject","Resource":"arn:aws:s3:::site/*"}}"#;
//! let result = PolicyEvaluator::evaluate(raw).unwrap();
//! assert!(result.is_publicly_accessible());
//! assert!(!result.has_administrative_access());
//! assert!(result.grants_to_resource("arn:aws:s3:::site"));
//! ```

mod action;
mod condition;
mod evaluator;
mod principal;
mod resource;
mod statement;

pub use action::{action_grants_wildcard_service, action_is_global_wildcard};
pub use condition::{has_source_account_scoping, SOURCE_ACCOUNT_KEY};
pub use evaluator::{PolicyError, PolicyEvaluator, PolicyResult};
pub use principal::is_public;
pub use resource::{resource_is_unrestricted, resource_matches_target};
pub use statement::{classify, StatementClassification};

pub use polcheck_core::{
    normalize, ConditionBlock, ConditionValue, Effect, NormalizeError, PolicyDocument, PolicyInput, PrincipalSpec, Statement,
};
