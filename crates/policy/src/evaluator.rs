use polcheck_core::{normalize, NormalizeError, PolicyDocument, PolicyInput, PrincipalSpec};
use serde::Serialize;
use thiserror::Error;

use crate::resource::resource_matches_target;
use crate::statement::{classify, StatementClassification};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// Callers render this as an ERROR verdict, never as PASS or FAIL.
    #[error("malformed policy: {reason}")]
    MalformedPolicy { reason: String },
}

impl From<NormalizeError> for PolicyError {
    fn from(e: NormalizeError) -> Self { PolicyError::MalformedPolicy { reason: e.to_string() } }
}

/// Outcome of evaluating one policy document (or its absence).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyResult {
    document: Option<PolicyDocument>,
    classifications: Vec<StatementClassification>,
}

impl PolicyResult {
    /// Result for a resource with no policy attached: grants nothing.
    pub fn no_policy() -> Self { Self::default() }

    pub fn is_policy_attached(&self) -> bool { self.document.is_some() }

    /// The normalized document this result was computed from.
    pub fn document(&self) -> Option<&PolicyDocument> { self.document.as_ref() }

    /// Per-statement classifications, in statement order.
    pub fn classifications(&self) -> &[StatementClassification] { &self.classifications }

    pub fn is_publicly_accessible(&self) -> bool { self.classifications.iter().any(|c| c.is_public_grant) }

    pub fn has_wildcard_service_actions(&self) -> bool { self.classifications.iter().any(|c| c.is_wildcard_action_grant) }

    pub fn has_administrative_access(&self) -> bool { self.classifications.iter().any(|c| c.is_admin_grant) }

    /// Whether some `Allow` statement with a recognised principal covers `target`.
    pub fn grants_to_resource(&self, target: &str) -> bool {
        let Some(doc) = &self.document else { return false };
        doc.allow_statements()
            .filter(|s| s.principal != PrincipalSpec::Unknown)
            .any(|s| s.resources.iter().any(|r| resource_matches_target(r, target)))
    }
}

/// Stateless entry point; every call works only on its own input.
pub struct PolicyEvaluator;

impl PolicyEvaluator {
    pub fn evaluate(raw: &[u8]) -> Result<PolicyResult, PolicyError> {
        let document = normalize(raw)?;
        let classifications = document.statements.iter().map(classify).collect();
        Ok(PolicyResult { document: Some(document), classifications })
    }

    pub fn evaluate_input(input: PolicyInput<'_>) -> Result<PolicyResult, PolicyError> {
        match input {
            PolicyInput::Attached(raw) => Self::evaluate(raw),
            PolicyInput::NoPolicyAttached => Ok(PolicyResult::no_policy()),
        }
    }
}
