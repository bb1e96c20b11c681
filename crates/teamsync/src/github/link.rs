//! Team to external-group links.

use super::client::GitHubClient;
use super::types::{LinkGroupId, LinkRequest};
use crate::error::Result;
use crate::group::IdentityGroup;

/// Whether an external-groups body shows an existing link.
///
/// GitHub answers with a `groups` array; some proxies flatten a single link to
/// a top-level `group_id`. Either shape counts.
pub fn body_has_link(body: &serde_json::Value) -> bool {
    if body.get("group_id").is_some_and(|v| !v.is_null()) {
        return true;
    }
    body.get("groups")
        .and_then(|g| g.as_array())
        .is_some_and(|groups| {
            groups
                .iter()
                .any(|g| g.get("group_id").is_some_and(|v| !v.is_null()))
        })
}

/// Links teams to identity groups through the external-groups endpoint.
pub struct GroupLinker<'a> {
    client: &'a GitHubClient,
    send_group_name: bool,
    strict_group_ids: bool,
}

impl<'a> GroupLinker<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self {
            client,
            send_group_name: false,
            strict_group_ids: false,
        }
    }

    /// Include `group_name` in link requests.
    pub fn send_group_name(mut self, enabled: bool) -> Self {
        self.send_group_name = enabled;
        self
    }

    /// Reject group ids that are not numeric instead of sending them verbatim.
    pub fn strict_group_ids(mut self, enabled: bool) -> Self {
        self.strict_group_ids = enabled;
        self
    }

    /// Whether the team is already linked to any external group.
    ///
    /// A 404 means no link; any other failure is returned.
    pub async fn is_linked(&self, team_slug: &str) -> Result<bool> {
        match self.client.get_team_external_groups(team_slug).await {
            Ok(body) => Ok(body_has_link(&body)),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Build the PATCH body for `group`.
    ///
    /// Fails with [`crate::SyncError::InvalidGroupId`] in strict mode when the
    /// id is not numeric.
    pub fn prepare(&self, group: &IdentityGroup) -> Result<LinkRequest> {
        let group_id = match group.id.to_numeric() {
            Ok(n) => LinkGroupId::Numeric(n),
            Err(e) if self.strict_group_ids => return Err(e),
            Err(_) => LinkGroupId::Opaque(group.id.as_str().to_string()),
        };
        let group_name = self
            .send_group_name
            .then(|| group.display_name.clone());
        Ok(LinkRequest {
            group_id,
            group_name,
        })
    }

    /// Send a prepared link request.
    pub async fn send(&self, team_slug: &str, request: &LinkRequest) -> Result<()> {
        self.client
            .update_team_external_groups(team_slug, request)
            .await?;
        tracing::info!(team = team_slug, group_id = ?request.group_id, "Linked team");
        Ok(())
    }

    /// Link `team_slug` to `group`. Re-linking an existing link succeeds.
    pub async fn link(&self, team_slug: &str, group: &IdentityGroup) -> Result<()> {
        let request = self.prepare(group)?;
        self.send(team_slug, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::github::client::tests::{API, client};
    use crate::http::{HttpMethod, MockTransport};

    fn external_groups_url(slug: &str) -> String {
        format!("{API}/orgs/acme/teams/{slug}/external-groups")
    }

    #[test]
    fn test_body_has_link_shapes() {
        assert!(body_has_link(&serde_json::json!({"group_id": 7})));
        assert!(body_has_link(&serde_json::json!({
            "groups": [{"group_id": 7, "group_name": "Platform"}]
        })));
        assert!(!body_has_link(&serde_json::json!({"groups": []})));
        assert!(!body_has_link(&serde_json::json!({"group_id": null})));
        assert!(!body_has_link(&serde_json::json!({})));
    }

    #[tokio::test]
    async fn test_is_linked_reads_groups_array() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            external_groups_url("security"),
            200,
            serde_json::json!({"groups": [{"group_id": 2, "group_name": "Security"}]}),
        );
        transport.push_json(
            HttpMethod::Get,
            external_groups_url("platform"),
            200,
            serde_json::json!({"groups": []}),
        );

        let client = client(&transport);
        let linker = GroupLinker::new(&client);
        assert!(linker.is_linked("security").await.unwrap());
        assert!(!linker.is_linked("platform").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_linked_false_on_404() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            external_groups_url("platform"),
            404,
            serde_json::json!({"message": "Not Found"}),
        );

        let client = client(&transport);
        assert!(!GroupLinker::new(&client).is_linked("platform").await.unwrap());
    }

    #[tokio::test]
    async fn test_is_linked_errors_on_other_status() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            external_groups_url("platform"),
            500,
            serde_json::json!({"message": "Server Error"}),
        );

        let client = client(&transport);
        let err = GroupLinker::new(&client)
            .is_linked("platform")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("Server Error"));
    }

    #[test]
    fn test_prepare_numeric_and_opaque_ids() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let linker = GroupLinker::new(&client);

        let numeric = linker.prepare(&IdentityGroup::new("42", "Security")).unwrap();
        assert_eq!(numeric.group_id, LinkGroupId::Numeric(42));
        assert_eq!(numeric.group_name, None);

        let opaque = linker.prepare(&IdentityGroup::new("g1", "Platform")).unwrap();
        assert_eq!(opaque.group_id, LinkGroupId::Opaque("g1".to_string()));
    }

    #[test]
    fn test_prepare_strict_rejects_non_numeric() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let linker = GroupLinker::new(&client).strict_group_ids(true);

        let err = linker
            .prepare(&IdentityGroup::new("8f9a3c1e-8b8d", "Platform"))
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidGroupId { .. }));
    }

    #[tokio::test]
    async fn test_link_patches_with_group_name() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Patch,
            external_groups_url("security"),
            200,
            serde_json::json!({"groups": [{"group_id": 2}]}),
        );

        let client = client(&transport);
        GroupLinker::new(&client)
            .send_group_name(true)
            .link("security", &IdentityGroup::new("2", "Security"))
            .await
            .unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, HttpMethod::Patch);
        assert_eq!(
            request.json_body(),
            Some(serde_json::json!({"group_id": 2, "group_name": "Security"}))
        );
    }

    #[tokio::test]
    async fn test_link_422_carries_status_and_body() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Patch,
            external_groups_url("platform"),
            422,
            serde_json::json!({"message": "Validation Failed"}),
        );

        let client = client(&transport);
        let err = GroupLinker::new(&client)
            .link("platform", &IdentityGroup::new("7", "Platform"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Rejected { status: 422, .. }));
        assert!(err.to_string().contains("Validation Failed"));
    }

    #[tokio::test]
    async fn test_strict_link_makes_no_request() {
        let transport = MockTransport::new();
        let client = client(&transport);
        let result = GroupLinker::new(&client)
            .strict_group_ids(true)
            .link("platform", &IdentityGroup::new("g1", "Platform"))
            .await;
        assert!(result.is_err());
        assert!(transport.requests().is_empty());
    }
}
