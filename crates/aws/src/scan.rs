use anyhow::Result;
use polcheck_policy::{PolicyEvaluator, PolicyInput};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};

use crate::checks::Check;
use crate::resource::PolicyResource;
use crate::source::PolicySource;
use crate::verdict::{Finding, Verdict};

/// Run `checks` against every resource, at most `jobs` resources at a time
/// (clamped to `1..=Semaphore::MAX_PERMITS`). Findings come back sorted by
/// resource name, resource ARN, then check id.
pub async fn scan(
    resources: Vec<PolicyResource>,
    source: Arc<dyn PolicySource>,
    checks: Vec<Arc<dyn Check>>,
    jobs: usize,
) -> Result<Vec<Finding>> {
    let permits = Arc::new(Semaphore::new(jobs.clamp(1, Semaphore::MAX_PERMITS)));
    let checks: Arc<[Arc<dyn Check>]> = checks.into();
    let total = resources.len();

    let mut tasks = JoinSet::new();
    for resource in resources {
        let permits = permits.clone();
        let source = source.clone();
        let checks = checks.clone();
        let span = tracing::info_span!("resource", name = %resource.name, kind = %resource.kind);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await?;
            anyhow::Ok(scan_resource(&resource, source.as_ref(), &checks).await)
        }.instrument(span));
    }

    let mut findings = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        findings.extend(joined??);
    }
    findings.sort_by(|a, b| {
        (&a.resource_name, &a.resource_arn, &a.check_id).cmp(&(&b.resource_name, &b.resource_arn, &b.check_id))
    });
    info!(resources = total, findings = findings.len(), "scan complete");
    Ok(findings)
}

/// Fetch and evaluate one resource's policy once, then run every check
/// that applies to its kind.
pub async fn scan_resource(resource: &PolicyResource, source: &dyn PolicySource, checks: &[Arc<dyn Check>]) -> Vec<Finding> {
    let applicable: Vec<&Arc<dyn Check>> = checks.iter().filter(|c| c.kind() == resource.kind).collect();
    if applicable.is_empty() { return Vec::new(); }

    let raw = match source.fetch(resource).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "policy fetch failed");
            return applicable.iter()
                .map(|c| Finding::new(c.id(), resource, Verdict::Error, format!("{e:#}")))
                .collect();
        }
    };

    let outcome = PolicyEvaluator::evaluate_input(PolicyInput::from(raw.as_deref()));
    match &outcome {
        Ok(r) => debug!(attached = r.is_policy_attached(), public = r.is_publicly_accessible(),
            wildcard = r.has_wildcard_service_actions(), admin = r.has_administrative_access(), "policy evaluated"),
        Err(e) => warn!(error = %e, "policy rejected"),
    }

    applicable.iter().map(|c| c.assess(resource, &outcome)).collect()
}
