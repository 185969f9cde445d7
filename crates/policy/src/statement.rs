use polcheck_core::{PrincipalSpec, Statement};
use serde::Serialize;

use crate::action::action_grants_wildcard_service;
use crate::condition::has_source_account_scoping;
use crate::principal::is_public;
use crate::resource::resource_is_unrestricted;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatementClassification {
    pub is_public_grant: bool,
    pub is_wildcard_action_grant: bool,
    pub is_admin_grant: bool,
}

/// Classify one statement. `Deny` statements classify as all-false; no
/// deny-over-allow composition is attempted.
pub fn classify(s: &Statement) -> StatementClassification {
    if !s.effect.is_allow() { return StatementClassification::default(); }

    let scoped = has_source_account_scoping(s.condition.as_ref());
    let broad_principal = is_public(&s.principal) || matches!(s.principal, PrincipalSpec::Service(_));
    let is_wildcard_action_grant = s.actions.iter().any(|a| action_grants_wildcard_service(a));

    StatementClassification {
        is_public_grant: broad_principal && !scoped,
        is_wildcard_action_grant,
        is_admin_grant: is_wildcard_action_grant && s.resources.iter().any(|r| resource_is_unrestricted(r)),
    }
}
