use polcheck_core::{ConditionBlock, ConditionValue};

pub const SOURCE_ACCOUNT_KEY: &str = "aws:SourceAccount";

/// True when some operator pins `aws:SourceAccount` to a non-empty JSON
/// string. Boolean or numeric values, and any other condition, do not scope.
pub fn has_source_account_scoping(c: Option<&ConditionBlock>) -> bool {
    c.is_some_and(|c| c.values_for(SOURCE_ACCOUNT_KEY)
        .filter_map(ConditionValue::as_str)
        .any(|v| !v.is_empty()))
}
