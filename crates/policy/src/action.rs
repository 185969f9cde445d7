use regex::Regex;
use std::sync::LazyLock;

static SERVICE_WILDCARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+:\*$").expect("static service wildcard pattern"));

pub fn action_is_global_wildcard(pattern: &str) -> bool { pattern == "*" }

/// `*` or `service:*`. Partial wildcards such as `s3:Get*` are scoped, not
/// wildcard grants.
pub fn action_grants_wildcard_service(pattern: &str) -> bool {
    action_is_global_wildcard(pattern) || SERVICE_WILDCARD.is_match(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_wildcard() {
        assert!(action_is_global_wildcard("*"));
        assert!(!action_is_global_wildcard("s3:*"));
        assert!(!action_is_global_wildcard("**"));
        assert!(!action_is_global_wildcard(" *"));
    }

    #[test]
    fn test_service_wildcard() {
        assert!(action_grants_wildcard_service("*"));
        assert!(action_grants_wildcard_service("s3:*"));
        assert!(action_grants_wildcard_service("EC2:*"));
        assert!(action_grants_wildcard_service("lambda:*"));
        assert!(!action_grants_wildcard_service("s3:Get*"));
        assert!(!action_grants_wildcard_service("s3:GetObject"));
        assert!(!action_grants_wildcard_service(":*"));
        assert!(!action_grants_wildcard_service("resource-groups:*"));
        assert!(!action_grants_wildcard_service("s3:*\n"));
        assert!(!action_grants_wildcard_service("s3:**"));
    }
}
