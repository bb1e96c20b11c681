//! GitHub organization side of reconciliation.
//!
//! - [`client`] - REST client over [`crate::http::HttpTransport`]
//! - [`directory`] - cached team lookup by name or id
//! - [`provision`] - team creation and default-member cleanup
//! - [`link`] - external-group links
//! - `groups` - `GitHubClient` as a [`crate::group::GroupSource`]

pub mod client;
pub mod directory;
mod groups;
pub mod link;
pub mod provision;
pub mod types;

pub use client::{API_VERSION, DEFAULT_API_BASE_URL, GitHubClient, next_page};
pub use directory::{TeamDirectory, names_match};
pub use link::{GroupLinker, body_has_link};
pub use provision::TeamProvisioner;
pub use types::{
    ExternalGroup, LinkGroupId, LinkRequest, NewTeam, Team, TeamMember, TeamPrivacy,
};
