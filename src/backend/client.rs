//! Rollback client for optimistically created backend records.

use std::time::Duration;

use serde_json::json;

use crate::config::BackendConfig;
use crate::observability::metrics;
use crate::types::{MarketplaceError, MarketplaceResult};

/// Backend collection a record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackResource {
    Nfts,
    Projects,
}

impl RollbackResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RollbackResource::Nfts => "nfts",
            RollbackResource::Projects => "projects",
        }
    }
}

/// HTTP client for the marketplace backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    /// Build a client, or `None` when no backend is configured.
    pub fn new(config: &BackendConfig) -> MarketplaceResult<Option<Self>> {
        let Some(base_url) = config.base_url.as_deref() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MarketplaceError::Backend(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Some(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }))
    }

    /// `POST {base}/{resource}/unset`.
    pub fn unset_url(&self, resource: RollbackResource) -> String {
        format!("{}/{}/unset", self.base_url, resource.as_str())
    }

    /// Remove the record `id` from `resource`.
    pub async fn unset(&self, resource: RollbackResource, id: &str) -> MarketplaceResult<()> {
        let response = self
            .client
            .post(self.unset_url(resource))
            .json(&json!({ "_id": id }))
            .send()
            .await
            .map_err(|e| MarketplaceError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketplaceError::Backend(format!(
                "{} unset returned status {}",
                resource.as_str(),
                status
            )));
        }
        Ok(())
    }

    /// Unset the record and record the outcome. Failures are only logged.
    pub async fn rollback(&self, resource: RollbackResource, id: &str) {
        match self.unset(resource, id).await {
            Ok(()) => {
                metrics::record_rollback(resource.as_str(), "success");
                tracing::info!(resource = resource.as_str(), id, "Backend record rolled back");
            }
            Err(e) => {
                metrics::record_rollback(resource.as_str(), "error");
                tracing::warn!(resource = resource.as_str(), id, error = %e, "Backend rollback failed");
            }
        }
    }
}
