//! Enterprise SCIM directory client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{ScimGroup, ScimListResponse};
use crate::error::{Result, SyncError};
use crate::group::{GroupSource, IdentityGroup};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpTransport};

/// Default SCIM host for GitHub Enterprise Cloud.
pub const DEFAULT_SCIM_BASE_URL: &str = "https://api.github.com";

/// Client for `GET {base}/scim/v2/enterprises/{enterprise}/Groups`.
#[derive(Clone)]
pub struct ScimClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: String,
    enterprise: String,
}

impl ScimClient {
    /// Create a client backed by reqwest with the given per-call timeout.
    pub fn new(base_url: &str, token: &str, enterprise: &str, timeout: Duration) -> Result<Self> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| SyncError::Config(e.to_string()))?;
        Self::new_with_transport(base_url, token, enterprise, Arc::new(transport))
    }

    pub fn new_with_transport(
        base_url: &str,
        token: &str,
        enterprise: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        url::Url::parse(base_url)
            .map_err(|e| SyncError::Config(format!("invalid SCIM base URL '{base_url}': {e}")))?;
        if token.is_empty() {
            return Err(SyncError::Config("SCIM token is empty".to_string()));
        }
        if enterprise.is_empty() {
            return Err(SyncError::Config("enterprise slug is empty".to_string()));
        }

        Ok(Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            enterprise: enterprise.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn enterprise(&self) -> &str {
        &self.enterprise
    }

    fn groups_url(&self) -> String {
        format!(
            "{}/scim/v2/enterprises/{}/Groups",
            self.base_url, self.enterprise
        )
    }

    /// Fetch the raw SCIM group listing.
    pub async fn list_groups(&self) -> Result<ScimListResponse<ScimGroup>> {
        let url = self.groups_url();
        tracing::debug!(url = %url, "Fetching SCIM groups");

        let request = HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: vec![
                ("Accept".to_string(), "application/scim+json".to_string()),
                ("User-Agent".to_string(), "teamsync".to_string()),
                ("Authorization".to_string(), format!("Bearer {}", self.token)),
            ],
            body: Vec::new(),
        };

        let response = self.transport.send(request).await?;
        let operation = format!("list SCIM groups for enterprise {}", self.enterprise);
        if !response.is_success() {
            return Err(SyncError::from_status(
                operation,
                response.status,
                response.text(),
            ));
        }

        ScimListResponse::from_slice(&response.body).map_err(|e| SyncError::json(operation, e))
    }
}

#[async_trait]
impl GroupSource for ScimClient {
    fn label(&self) -> &'static str {
        "scim"
    }

    async fn fetch_groups(&self) -> Result<Vec<IdentityGroup>> {
        let list = self.list_groups().await?;
        if list.total_results as usize > list.resources.len() {
            tracing::warn!(
                total = list.total_results,
                returned = list.resources.len(),
                "SCIM listing returned fewer groups than it reports"
            );
        }

        let groups = list
            .resources
            .into_iter()
            .filter_map(|group| {
                if group.display_name.trim().is_empty() {
                    tracing::warn!(id = %group.id, "Skipping SCIM group without a display name");
                    return None;
                }
                Some(IdentityGroup::new(group.id.as_str(), group.display_name))
            })
            .collect();
        Ok(groups)
    }
}
