//! The organization's external-group listing as a group source.

use async_trait::async_trait;

use super::client::GitHubClient;
use super::types::ExternalGroup;
use crate::error::Result;
use crate::group::{GroupSource, IdentityGroup};

impl From<ExternalGroup> for IdentityGroup {
    fn from(group: ExternalGroup) -> Self {
        IdentityGroup::new(group.group_id, group.group_name)
    }
}

#[async_trait]
impl GroupSource for GitHubClient {
    fn label(&self) -> &'static str {
        "github"
    }

    async fn fetch_groups(&self) -> Result<Vec<IdentityGroup>> {
        let groups = self.list_external_groups().await?;
        tracing::debug!(org = self.org(), count = groups.len(), "Fetched external groups");
        Ok(groups
            .into_iter()
            .filter(|g| !g.group_name.trim().is_empty())
            .map(IdentityGroup::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::client::tests::{API, client};
    use crate::group::GroupId;
    use crate::http::{HttpMethod, MockTransport};

    #[tokio::test]
    async fn test_external_groups_become_identity_groups() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/orgs/acme/external-groups"),
            200,
            serde_json::json!({"groups": [
                {"group_id": 1, "group_name": "Platform"},
                {"group_id": 2, "group_name": ""},
                {"group_id": 3, "group_name": "Security"}
            ]}),
        );

        let client = client(&transport);
        assert_eq!(client.label(), "github");
        let groups = client.fetch_groups().await.unwrap();
        assert_eq!(
            groups,
            vec![
                IdentityGroup::new(GroupId::from(1u64), "Platform"),
                IdentityGroup::new(GroupId::from(3u64), "Security"),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            format!("{API}/orgs/acme/external-groups"),
            401,
            serde_json::json!({"message": "Bad credentials"}),
        );

        let err = client(&transport).fetch_groups().await.unwrap_err();
        assert!(err.is_auth());
    }
}
