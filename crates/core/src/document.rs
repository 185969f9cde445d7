use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect { Allow, Deny }

impl Effect {
    pub fn is_allow(self) -> bool { self == Effect::Allow }
}

/// Who a statement applies to, collapsed to a single classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id")]
pub enum PrincipalSpec {
    Everyone,
    AccountOrRole(String),
    Service(String),
    Unknown,
}

impl PrincipalSpec {
    /// Ordering used when several principals are listed: the statement is
    /// satisfied by any of them, so the broadest one wins.
    pub fn permissiveness(&self) -> u8 {
        match self {
            PrincipalSpec::Everyone => 3,
            PrincipalSpec::Service(_) => 2,
            PrincipalSpec::AccountOrRole(_) => 1,
            PrincipalSpec::Unknown => 0,
        }
    }
}

/// A condition value with the JSON type it had in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConditionValue {
    String(String),
    Bool(bool),
    Number(serde_json::Number),
}

impl ConditionValue {
    /// Only values that were JSON strings; booleans and numbers give `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self { ConditionValue::String(s) => Some(s), _ => None }
    }
}

/// Operator name -> condition key -> values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConditionBlock(pub BTreeMap<String, BTreeMap<String, Vec<ConditionValue>>>);

impl ConditionBlock {
    /// All values recorded for `key` under any operator. Condition keys
    /// compare ASCII case-insensitively, as IAM does.
    pub fn values_for<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ConditionValue> + 'a {
        self.0.values()
            .flat_map(|keys| keys.iter())
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .flat_map(|(_, vals)| vals.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    pub principal: PrincipalSpec,
    /// Never empty, duplicates removed, first occurrence order.
    pub actions: Vec<String>,
    /// Never empty, duplicates removed, first occurrence order.
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    pub fn allow_statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().filter(|s| s.effect.is_allow())
    }
}

/// What a caller hands the evaluator: raw policy bytes, or the fact that
/// the resource carries no policy at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyInput<'a> {
    Attached(&'a [u8]),
    NoPolicyAttached,
}

impl<'a> From<Option<&'a [u8]>> for PolicyInput<'a> {
    fn from(raw: Option<&'a [u8]>) -> Self {
        match raw { Some(b) => PolicyInput::Attached(b), None => PolicyInput::NoPolicyAttached }
    }
}
