pub fn resource_is_unrestricted(pattern: &str) -> bool { pattern == "*" }

/// ARNs are compared as opaque strings. A pattern naming the target with a
/// trailing `/*` or `:*` ("the resource or anything under it") also matches.
pub fn resource_matches_target(pattern: &str, target: &str) -> bool {
    if resource_is_unrestricted(pattern) || pattern == target { return true; }
    ["/*", ":*"].iter()
        .any(|suffix| pattern.strip_suffix(suffix) == Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted() {
        assert!(resource_is_unrestricted("*"));
        assert!(!resource_is_unrestricted("arn:aws:s3:::*"));
    }

    #[test]
    fn test_matches_target() {
        let fn_arn = "arn:aws:lambda:us-east-1:123456789012:function:f";
        assert!(resource_matches_target(fn_arn, fn_arn));
        assert!(resource_matches_target("*", fn_arn));
        assert!(resource_matches_target(&format!("{fn_arn}:*"), fn_arn));
        assert!(resource_matches_target("arn:aws:s3:::bucket/*", "arn:aws:s3:::bucket"));
        assert!(!resource_matches_target("arn:aws:s3:::bucket/*", "arn:aws:s3:::other"));
        assert!(!resource_matches_target("arn:aws:s3:::bucket/key", "arn:aws:s3:::bucket"));
        assert!(!resource_matches_target("arn:aws:s3:::bucket", "arn:aws:s3:::bucket/*"));
        assert!(!resource_matches_target("arn:aws:s3:::*", "arn:aws:s3:::bucket"));
    }
}
