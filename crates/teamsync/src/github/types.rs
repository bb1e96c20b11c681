//! GitHub REST payloads used by the team and external-group endpoints.

use serde::{Deserialize, Serialize};

/// Team visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamPrivacy {
    /// Visible to every member of the organization.
    Closed,
    /// Only visible to organization owners and team members.
    Secret,
    #[serde(other)]
    Other,
}

/// A GitHub team, trimmed to the fields reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u64,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privacy: Option<TeamPrivacy>,
}

/// Body of `POST /orgs/{org}/teams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTeam {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub privacy: TeamPrivacy,
}

impl NewTeam {
    /// An organization-visible team.
    pub fn closed(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            privacy: TeamPrivacy::Closed,
        }
    }
}

/// A member as returned by `GET /orgs/{org}/teams/{slug}/members`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamMember {
    pub id: u64,
    pub login: String,
}

/// An entry of `GET /orgs/{org}/external-groups`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalGroup {
    pub group_id: u64,
    pub group_name: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExternalGroupList {
    pub groups: Vec<ExternalGroup>,
}

/// Group id as sent in a link request.
///
/// GitHub expects a number; ids that do not parse are sent verbatim and left
/// for the API to accept or reject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LinkGroupId {
    Numeric(u64),
    Opaque(String),
}

/// Body of `PATCH /orgs/{org}/teams/{slug}/external-groups`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRequest {
    pub group_id: LinkGroupId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}
