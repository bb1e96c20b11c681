//! Team creation.
//!
//! Creating a team through the API makes the calling principal a member of
//! it. The provisioner learns who that default member is from the first team
//! it creates and removes them from every team it creates afterwards.

use super::client::GitHubClient;
use super::directory::TeamDirectory;
use super::types::{NewTeam, Team};
use crate::error::Result;

pub struct TeamProvisioner<'a> {
    client: &'a GitHubClient,
    remove_default_member: bool,
    default_member: Option<String>,
}

impl<'a> TeamProvisioner<'a> {
    pub fn new(client: &'a GitHubClient, remove_default_member: bool) -> Self {
        Self {
            client,
            remove_default_member,
            default_member: None,
        }
    }

    /// The auto-added member observed so far, if any.
    pub fn default_member(&self) -> Option<&str> {
        self.default_member.as_deref()
    }

    /// Create a closed team and register it with `directory`.
    ///
    /// The team exists once this returns; cleanup is the separate
    /// [`remove_default_member`](Self::remove_default_member) step.
    pub async fn create_team(
        &self,
        directory: &mut TeamDirectory<'_>,
        name: &str,
        description: &str,
    ) -> Result<Team> {
        let team = self
            .client
            .create_team(&NewTeam::closed(name, description))
            .await?;
        tracing::info!(team = %team.name, id = team.id, slug = %team.slug, "Created team");
        directory.append(team.clone());
        Ok(team)
    }

    /// Drop the auto-added member from a freshly created `team`.
    ///
    /// Returns the login removed, or `None` when cleanup is disabled, no
    /// default member is known, or the member was already gone.
    pub async fn remove_default_member(&mut self, team: &Team) -> Result<Option<String>> {
        if !self.remove_default_member {
            return Ok(None);
        }

        if self.default_member.is_none() {
            let members = self.client.list_team_members(&team.slug).await?;
            if let Some(first) = members.into_iter().next() {
                tracing::debug!(login = %first.login, "Detected default team member");
                self.default_member = Some(first.login);
            }
        }

        // Not an else: a member detected above is removed in the same call.
        let Some(login) = self.default_member.as_deref() else {
            return Ok(None);
        };
        let removed = self
            .client
            .remove_team_membership(&team.slug, login)
            .await?;
        if removed {
            tracing::debug!(login, team = %team.slug, "Removed default member");
            Ok(Some(login.to_string()))
        } else {
            tracing::debug!(login, team = %team.slug, "Default member was not on team");
            Ok(None)
        }
    }
}
