use serde_json::{Map as JsonMap, Value as Json};
use std::collections::BTreeMap;

use crate::document::{ConditionBlock, ConditionValue, Effect, PolicyDocument, PrincipalSpec, Statement};
use crate::error::NormalizeError;

// Statement elements we deliberately do not model. Ignoring them would
// silently widen or narrow a grant, so their presence rejects the statement.
const UNSUPPORTED: [&str; 3] = ["NotAction", "NotResource", "NotPrincipal"];

/// Parse raw policy JSON into the canonical document. Fails fast on the
/// first malformed statement.
pub fn normalize(raw: &[u8]) -> Result<PolicyDocument, NormalizeError> {
    let root: Json = serde_json::from_slice(raw)
        .map_err(|e| NormalizeError::InvalidJson { reason: e.to_string() })?;
    let obj = root.as_object().ok_or(NormalizeError::NotAnObject)?;

    let version = match obj.get("Version") {
        None => None,
        Some(Json::String(v)) => Some(v.clone()),
        Some(other) => return Err(NormalizeError::MalformedField {
            field: "Version", reason: format!("expected a string, got {}", kind_of(other)),
        }),
    };

    let raw_statements: Vec<&Json> = match obj.get("Statement") {
        None => return Err(NormalizeError::MissingStatement),
        Some(s @ Json::Object(_)) => vec![s],
        Some(Json::Array(items)) => items.iter().collect(),
        Some(other) => return Err(NormalizeError::MalformedField {
            field: "Statement", reason: format!("expected an object or array, got {}", kind_of(other)),
        }),
    };

    let statements = raw_statements.into_iter().enumerate()
        .map(|(i, s)| match s {
            Json::Object(m) => statement(i, m),
            other => Err(NormalizeError::statement(i, format!("expected an object, got {}", kind_of(other)))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PolicyDocument { version, statements })
}

fn statement(index: usize, m: &JsonMap<String, Json>) -> Result<Statement, NormalizeError> {
    if let Some(k) = UNSUPPORTED.iter().find(|k| m.contains_key(**k)) {
        return Err(NormalizeError::statement(index, format!("unsupported element {k}")));
    }

    let sid = match m.get("Sid") {
        None => None,
        Some(Json::String(s)) => Some(s.clone()),
        Some(other) => return Err(NormalizeError::statement(index, format!("Sid must be a string, got {}", kind_of(other)))),
    };

    let effect = match m.get("Effect") {
        Some(Json::String(e)) if e == "Allow" => Effect::Allow,
        Some(Json::String(e)) if e == "Deny" => Effect::Deny,
        Some(Json::String(e)) => return Err(NormalizeError::statement(index, format!("unknown Effect \"{e}\""))),
        Some(other) => return Err(NormalizeError::statement(index, format!("Effect must be a string, got {}", kind_of(other)))),
        None => return Err(NormalizeError::statement(index, "missing Effect")),
    };

    let actions = string_set(m.get("Action"), "Action").map_err(|r| NormalizeError::statement(index, r))?;
    let resources = string_set(m.get("Resource"), "Resource").map_err(|r| NormalizeError::statement(index, r))?;
    let condition = condition(m.get("Condition")).map_err(|r| NormalizeError::statement(index, r))?;

    Ok(Statement { sid, effect, principal: principal(m.get("Principal")), actions, resources, condition })
}

/// Scalar-or-array of non-empty strings, deduplicated in first-seen order.
fn string_set(value: Option<&Json>, field: &str) -> Result<Vec<String>, String> {
    let items: Vec<&Json> = match value {
        None => return Err(format!("missing {field}")),
        Some(Json::Array(a)) => a.iter().collect(),
        Some(v) => vec![v],
    };
    if items.is_empty() { return Err(format!("{field} must not be empty")); }

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Json::String(s) if s.is_empty() => return Err(format!("{field} contains an empty string")),
            Json::String(s) => { if !out.contains(s) { out.push(s.clone()); } }
            other => return Err(format!("{field} entries must be strings, got {}", kind_of(other))),
        }
    }
    Ok(out)
}

/// Total: shapes we do not recognise become `Unknown`, never public.
fn principal(value: Option<&Json>) -> PrincipalSpec {
    let m = match value {
        Some(Json::String(s)) if s == "*" => return PrincipalSpec::Everyone,
        Some(Json::Object(m)) => m,
        _ => return PrincipalSpec::Unknown,
    };

    let mut best = PrincipalSpec::Unknown;
    for (key, ids) in m {
        for id in scalar_or_array_strs(ids) {
            let candidate = match key.as_str() {
                "AWS" if id == "*" => PrincipalSpec::Everyone,
                "AWS" => PrincipalSpec::AccountOrRole(id.to_string()),
                "Service" => PrincipalSpec::Service(id.to_string()),
                _ => PrincipalSpec::Unknown,
            };
            if candidate.permissiveness() > best.permissiveness() { best = candidate; }
        }
    }
    best
}

fn scalar_or_array_strs(v: &Json) -> Vec<&str> {
    match v {
        Json::String(s) if !s.is_empty() => vec![s.as_str()],
        Json::Array(a) => a.iter().filter_map(Json::as_str).filter(|s| !s.is_empty()).collect(),
        _ => Vec::new(),
    }
}

fn condition(value: Option<&Json>) -> Result<Option<ConditionBlock>, String> {
    let ops = match value {
        None | Some(Json::Null) => return Ok(None),
        Some(Json::Object(ops)) => ops,
        Some(other) => return Err(format!("Condition must be an object, got {}", kind_of(other))),
    };

    let mut block = BTreeMap::new();
    for (op, keys) in ops {
        let keys = keys.as_object()
            .ok_or_else(|| format!("Condition operator {op} must map to an object"))?;
        let mut parsed = BTreeMap::new();
        for (key, vals) in keys {
            let vals = match vals {
                Json::Array(a) => a.iter().map(|v| condition_value(op, key, v)).collect::<Result<Vec<_>, _>>()?,
                v => vec![condition_value(op, key, v)?],
            };
            parsed.insert(key.clone(), vals);
        }
        block.insert(op.clone(), parsed);
    }
    Ok(Some(ConditionBlock(block)))
}

fn condition_value(op: &str, key: &str, v: &Json) -> Result<ConditionValue, String> {
    match v {
        Json::String(s) => Ok(ConditionValue::String(s.clone())),
        Json::Bool(b) => Ok(ConditionValue::Bool(*b)),
        Json::Number(n) => Ok(ConditionValue::Number(n.clone())),
        other => Err(format!("Condition {op}/{key} has a {} value", kind_of(other))),
    }
}

fn kind_of(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
