use serde::{Deserialize, Serialize};
use std::fmt;

use crate::resource::PolicyResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Verdict { Pass, Fail, Error, NotApplicable, Info }

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Error => "ERROR",
            Verdict::NotApplicable => "NOT-APPLICABLE",
            Verdict::Info => "INFO",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.pad(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub check_id: String,
    pub resource_name: String,
    pub resource_arn: String,
    pub verdict: Verdict,
    pub message: String,
}

impl Finding {
    pub fn new(check_id: &str, resource: &PolicyResource, verdict: Verdict, message: impl Into<String>) -> Self {
        Finding {
            check_id: check_id.to_string(),
            resource_name: resource.name.clone(),
            resource_arn: resource.arn.clone(),
            verdict,
            message: message.into(),
        }
    }
}

/// Count of findings per verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub pass: usize,
    pub fail: usize,
    pub error: usize,
    pub not_applicable: usize,
    pub info: usize,
}

impl Summary {
    pub fn from_findings<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut s = Summary::default();
        for f in findings {
            match f.verdict {
                Verdict::Pass => s.pass += 1,
                Verdict::Fail => s.fail += 1,
                Verdict::Error => s.error += 1,
                Verdict::NotApplicable => s.not_applicable += 1,
                Verdict::Info => s.info += 1,
            }
        }
        s
    }

    pub fn has_failures(&self) -> bool { self.fail > 0 || self.error > 0 }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} passed, {} failed, {} errors, {} not applicable, {} info",
            self.pass, self.fail, self.error, self.not_applicable, self.info)
    }
}
