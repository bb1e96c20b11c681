//! Organization team lookup with a per-run cache.

use super::client::GitHubClient;
use super::types::Team;
use crate::error::Result;

/// Case-insensitive team name comparison.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Resolves teams by name or id against a lazily loaded team list.
///
/// The full list is fetched once, on the first lookup, and never refreshed;
/// teams created during the run are added through [`TeamDirectory::append`].
pub struct TeamDirectory<'a> {
    client: &'a GitHubClient,
    cache: Option<Vec<Team>>,
}

impl<'a> TeamDirectory<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self {
            client,
            cache: None,
        }
    }

    /// Whether the team list has been fetched.
    pub fn is_loaded(&self) -> bool {
        self.cache.is_some()
    }

    /// Number of cached teams (zero before the first lookup).
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, Vec::len)
    }

    async fn teams(&mut self) -> Result<&[Team]> {
        if self.cache.is_none() {
            let teams = self.client.list_teams().await?;
            tracing::debug!(
                org = self.client.org(),
                count = teams.len(),
                "Loaded team list"
            );
            self.cache = Some(teams);
        }
        Ok(self.cache.as_deref().unwrap_or_default())
    }

    /// First team whose name matches `name`, ignoring case.
    pub async fn resolve_by_name(&mut self, name: &str) -> Result<Option<Team>> {
        let teams = self.teams().await?;
        Ok(teams.iter().find(|t| names_match(&t.name, name)).cloned())
    }

    pub async fn resolve_by_id(&mut self, id: u64) -> Result<Option<Team>> {
        let teams = self.teams().await?;
        Ok(teams.iter().find(|t| t.id == id).cloned())
    }

    /// Record a team created during this run.
    ///
    /// Ignored while the cache is unloaded; the first fetch will include it.
    pub fn append(&mut self, team: Team) {
        if let Some(cache) = self.cache.as_mut() {
            cache.push(team);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::github::client::tests::{client, team_json, teams_url};
    use crate::http::{HttpMethod, MockTransport};

    fn with_teams(teams: serde_json::Value) -> MockTransport {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, teams_url(1), 200, teams);
        transport
    }

    #[test]
    fn test_names_match_ignores_case() {
        assert!(names_match("Engineering", "engineering"));
        assert!(names_match("ÉQUIPE", "équipe"));
        assert!(!names_match("Engineering", "Engineers"));
    }

    #[tokio::test]
    async fn test_resolve_by_name_is_case_insensitive() {
        let transport = with_teams(serde_json::json!([
            team_json(1, "engineering", "engineering"),
            team_json(2, "security", "Security"),
        ]));
        let client = client(&transport);
        let mut directory = TeamDirectory::new(&client);

        let team = directory.resolve_by_name("Engineering").await.unwrap();
        assert_eq!(team.map(|t| t.id), Some(1));
        let missing = directory.resolve_by_name("Finance").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_resolve_returns_first_match() {
        let transport = with_teams(serde_json::json!([
            team_json(1, "ops", "Ops"),
            team_json(2, "ops-1", "OPS"),
        ]));
        let client = client(&transport);
        let mut directory = TeamDirectory::new(&client);

        let team = directory.resolve_by_name("ops").await.unwrap().unwrap();
        assert_eq!(team.slug, "ops");
    }

    #[tokio::test]
    async fn test_team_list_is_fetched_once() {
        let transport = with_teams(serde_json::json!([team_json(42, "security", "Security")]));
        let client = client(&transport);
        let mut directory = TeamDirectory::new(&client);
        assert!(!directory.is_loaded());

        for name in ["Security", "security", "Unknown", "Other"] {
            directory.resolve_by_name(name).await.unwrap();
        }
        let by_id = directory.resolve_by_id(42).await.unwrap();

        assert_eq!(by_id.map(|t| t.slug), Some("security".to_string()));
        assert!(directory.resolve_by_id(7).await.unwrap().is_none());
        assert_eq!(transport.count(HttpMethod::Get, &teams_url(1)), 1);
        assert_eq!(directory.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_append_makes_team_visible_without_refetch() {
        let transport = with_teams(serde_json::json!([]));
        let client = client(&transport);
        let mut directory = TeamDirectory::new(&client);

        assert!(directory.resolve_by_name("Platform").await.unwrap().is_none());
        directory.append(serde_json::from_value(team_json(5, "platform", "Platform")).unwrap());

        let team = directory.resolve_by_name("platform").await.unwrap();
        assert_eq!(team.map(|t| t.id), Some(5));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_append_before_load_is_ignored() {
        let transport = with_teams(serde_json::json!([]));
        let client = client(&transport);
        let mut directory = TeamDirectory::new(&client);

        directory.append(serde_json::from_value(team_json(5, "platform", "Platform")).unwrap());
        assert_eq!(directory.cached_len(), 0);
        assert!(directory.resolve_by_name("Platform").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates_and_is_not_cached() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            teams_url(1),
            401,
            serde_json::json!({"message": "Bad credentials"}),
        );
        let client = client(&transport);
        let mut directory = TeamDirectory::new(&client);

        let err = directory.resolve_by_name("Platform").await.unwrap_err();
        assert!(matches!(err, SyncError::Auth { status: 401, .. }));
        assert!(!directory.is_loaded());
    }
}
