//! GitHub REST client for team and external-group endpoints.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{ExternalGroup, ExternalGroupList, LinkRequest, NewTeam, Team, TeamMember};
use crate::error::{Result, SyncError};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

/// Default REST API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// REST API version sent with every request.
pub const API_VERSION: &str = "2022-11-28";

/// Page size for list endpoints (GitHub's maximum).
pub const PER_PAGE: u32 = 100;

/// Page number named by the `rel="next"` entry of a `Link` header.
///
/// Entries look like
/// `<https://api.github.com/organizations/123/teams?per_page=100&page=2>; rel="next"`.
/// Entries without a parseable `page` query parameter are ignored.
pub fn next_page(link_header: &str) -> Option<u32> {
    link_header.split(',').find_map(|entry| {
        let (target, params) = entry.trim().split_once(';')?;
        let is_next = params
            .split(';')
            .filter_map(|p| p.trim().strip_prefix("rel="))
            .any(|rel| rel.trim_matches('"') == "next");
        if !is_next {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        let url = url::Url::parse(target).ok()?;
        let page = url
            .query_pairs()
            .find_map(|(key, value)| (key == "page").then(|| value.into_owned()))?;
        page.parse().ok()
    })
}

/// GitHub API client scoped to one organization.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    token: String,
    org: String,
}

impl GitHubClient {
    /// Create a client backed by reqwest with the given per-call timeout.
    pub fn new(api_base: &str, token: &str, org: &str, timeout: Duration) -> Result<Self> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| SyncError::Config(e.to_string()))?;
        Self::new_with_transport(api_base, token, org, Arc::new(transport))
    }

    pub fn new_with_transport(
        api_base: &str,
        token: &str,
        org: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        url::Url::parse(api_base)
            .map_err(|e| SyncError::Config(format!("invalid API base URL '{api_base}': {e}")))?;
        if token.is_empty() {
            return Err(SyncError::Config("GitHub token is empty".to_string()));
        }
        if org.is_empty() {
            return Err(SyncError::Config("organization is empty".to_string()));
        }

        Ok(Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            org: org.to_string(),
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Send a request and return the response whatever its status.
    async fn send(&self, method: HttpMethod, path: &str, body: Vec<u8>) -> Result<HttpResponse> {
        let url = format!("{}{}", self.api_base, path);
        tracing::debug!(method = method.as_str(), url = %url, "GitHub request");

        let mut headers = vec![
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("X-GitHub-Api-Version".to_string(), API_VERSION.to_string()),
            ("User-Agent".to_string(), "teamsync".to_string()),
            ("Authorization".to_string(), format!("Bearer {}", self.token)),
        ];
        if !body.is_empty() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;

        tracing::debug!(status = response.status, "GitHub response");
        Ok(response)
    }

    /// Send a request and fail unless it returns 2xx.
    async fn send_checked(
        &self,
        operation: &str,
        method: HttpMethod,
        path: &str,
        body: Vec<u8>,
    ) -> Result<HttpResponse> {
        let response = self.send(method, path, body).await?;
        if !response.is_success() {
            return Err(SyncError::from_status(
                operation,
                response.status,
                response.text(),
            ));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<T> {
        let response = self
            .send_checked(operation, HttpMethod::Get, path, Vec::new())
            .await?;
        serde_json::from_slice(&response.body).map_err(|e| SyncError::json(operation, e))
    }

    fn encode<B: Serialize>(operation: &str, body: &B) -> Result<Vec<u8>> {
        serde_json::to_vec(body).map_err(|e| SyncError::json(operation, e))
    }

    /// List every team in the organization, following `Link` pagination.
    pub async fn list_teams(&self) -> Result<Vec<Team>> {
        let operation = format!("list teams for organization {}", self.org);
        let mut teams = Vec::new();
        let mut page = 1u32;

        loop {
            let path = format!(
                "/orgs/{}/teams?per_page={}&page={}",
                self.org, PER_PAGE, page
            );
            let response = self
                .send_checked(&operation, HttpMethod::Get, &path, Vec::new())
                .await?;
            let batch: Vec<Team> = serde_json::from_slice(&response.body)
                .map_err(|e| SyncError::json(operation.as_str(), e))?;
            tracing::debug!(page, count = batch.len(), "Fetched teams page");
            teams.extend(batch);

            match response.header("link").and_then(next_page) {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(teams)
    }

    /// `POST /orgs/{org}/teams`.
    pub async fn create_team(&self, team: &NewTeam) -> Result<Team> {
        let operation = format!("create team {}", team.name);
        let body = Self::encode(&operation, team)?;
        let path = format!("/orgs/{}/teams", self.org);
        let response = self
            .send_checked(&operation, HttpMethod::Post, &path, body)
            .await?;
        serde_json::from_slice(&response.body).map_err(|e| SyncError::json(operation, e))
    }

    /// First page of a team's members.
    pub async fn list_team_members(&self, team_slug: &str) -> Result<Vec<TeamMember>> {
        let operation = format!("list members of team {team_slug}");
        let path = format!(
            "/orgs/{}/teams/{}/members?per_page={}",
            self.org, team_slug, PER_PAGE
        );
        self.get_json(&operation, &path).await
    }

    /// Remove a member from a team.
    ///
    /// Returns `false` when GitHub reports the membership as absent (404).
    pub async fn remove_team_membership(&self, team_slug: &str, login: &str) -> Result<bool> {
        let operation = format!("remove {login} from team {team_slug}");
        let path = format!(
            "/orgs/{}/teams/{}/memberships/{}",
            self.org, team_slug, login
        );
        match self
            .send_checked(&operation, HttpMethod::Delete, &path, Vec::new())
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `GET /orgs/{org}/teams/{slug}/external-groups` as raw JSON.
    ///
    /// A 404 comes back as [`SyncError::NotFound`].
    pub async fn get_team_external_groups(&self, team_slug: &str) -> Result<serde_json::Value> {
        let operation = format!("check external group link for team {team_slug}");
        let path = format!("/orgs/{}/teams/{}/external-groups", self.org, team_slug);
        self.get_json(&operation, &path).await
    }

    /// `PATCH /orgs/{org}/teams/{slug}/external-groups`.
    pub async fn update_team_external_groups(
        &self,
        team_slug: &str,
        request: &LinkRequest,
    ) -> Result<()> {
        let operation = format!("link team {team_slug} to external group");
        let body = Self::encode(&operation, request)?;
        let path = format!("/orgs/{}/teams/{}/external-groups", self.org, team_slug);
        self.send_checked(&operation, HttpMethod::Patch, &path, body)
            .await?;
        Ok(())
    }

    /// `GET /orgs/{org}/external-groups`.
    pub async fn list_external_groups(&self) -> Result<Vec<ExternalGroup>> {
        let operation = format!("list external groups for organization {}", self.org);
        let path = format!("/orgs/{}/external-groups", self.org);
        let list: ExternalGroupList = self.get_json(&operation, &path).await?;
        Ok(list.groups)
    }
}
