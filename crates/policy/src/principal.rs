use polcheck_core::PrincipalSpec;

/// Only `Everyone` is public on its own. Unscoped service principals are
/// handled by the statement classifier.
pub fn is_public(p: &PrincipalSpec) -> bool { matches!(p, PrincipalSpec::Everyone) }
