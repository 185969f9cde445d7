use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value as Json;
use std::path::PathBuf;

use crate::resource::{PolicyRef, PolicyResource};

/// Where raw policy bytes come from. `Ok(None)` means the resource has no
/// policy attached.
#[async_trait]
pub trait PolicySource: Send + Sync {
    async fn fetch(&self, resource: &PolicyResource) -> Result<Option<Vec<u8>>>;
}

/// Resolves inline policies and policy files relative to `base_dir`.
#[derive(Debug, Clone)]
pub struct LocalSource { base_dir: PathBuf }

impl LocalSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self { Self { base_dir: base_dir.into() } }
}

#[async_trait]
impl PolicySource for LocalSource {
    async fn fetch(&self, resource: &PolicyResource) -> Result<Option<Vec<u8>>> {
        match resource.policy_ref()? {
            PolicyRef::None => Ok(None),
            PolicyRef::Inline(Json::String(s)) => Ok(Some(s.clone().into_bytes())),
            PolicyRef::Inline(v) => Ok(Some(serde_json::to_vec(v)?)),
            PolicyRef::File(p) => {
                let path = self.base_dir.join(p);
                let bytes = tokio::fs::read(&path).await
                    .with_context(|| format!("read policy file {}", path.display()))?;
                Ok(Some(bytes))
            }
        }
    }
}
