//! Teamsync - keep GitHub teams in step with identity-provider groups.
//!
//! For every group an identity source reports, teamsync makes sure a team of
//! the same name exists in the organization and is linked to the group
//! through GitHub's external-groups API.
//!
//! # Example
//!
//! ```ignore
//! use teamsync::github::GitHubClient;
//! use teamsync::scim::ScimClient;
//! use teamsync::sync::{ReconcileOptions, Reconciler};
//!
//! let scim = ScimClient::new(scim_base, &scim_token, "acme", timeout)?;
//! let github = GitHubClient::new(api_base, &github_token, "acme", timeout)?;
//! let report = Reconciler::new(&github, ReconcileOptions::default())
//!     .run(&scim)
//!     .await?;
//! ```

pub mod error;
pub mod github;
pub mod group;
pub mod http;
pub mod scim;
pub mod sync;

pub use error::{Result, SyncError, short_error_message};
pub use group::{GroupId, GroupSource, IdentityGroup};
pub use http::DEFAULT_TIMEOUT;
