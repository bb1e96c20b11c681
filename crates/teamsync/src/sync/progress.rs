//! Progress events for a reconciliation run.
//!
//! The engine reports what it is doing through an optional callback so the
//! CLI can render either a progress bar or log lines.

use crate::group::IdentityGroup;

/// Progress events emitted while reconciling groups with teams.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum ReconcileProgress {
    /// Fetching groups from the identity source.
    FetchingGroups {
        /// Source label ("scim", "github").
        source: String,
    },

    /// Groups fetched.
    GroupsFetched {
        source: String,
        count: usize,
    },

    /// Starting work on one group.
    ProcessingGroup {
        /// 1-indexed position in source order.
        index: usize,
        total: usize,
        group: IdentityGroup,
    },

    /// An existing team matched the group's display name.
    TeamResolved {
        group: String,
        team_slug: String,
        team_id: u64,
    },

    /// No team matched; creating one.
    CreatingTeam { group: String },

    /// Team created.
    TeamCreated {
        group: String,
        team_slug: String,
        team_id: u64,
    },

    /// The auto-added default member was removed from a new team.
    DefaultMemberRemoved { team_slug: String, login: String },

    /// Sending the link request.
    Linking { team_slug: String, group_id: String },

    /// Team linked to the group.
    Linked { team_slug: String, group_id: String },

    /// Link already present; no request sent.
    AlreadyLinked { team_slug: String },

    /// Dry run: what would happen for this group.
    Planned {
        group: String,
        /// Slug of the existing team, if one matched.
        existing_team: Option<String>,
        /// A team would be created for this group.
        creates_team: bool,
    },

    /// The group could not be reconciled.
    GroupFailed {
        group: String,
        status: Option<u16>,
        error: String,
    },

    /// The run stopped after a failure; `remaining` groups were not processed.
    Aborted { remaining: usize },

    /// Run finished.
    Complete {
        linked: usize,
        created: usize,
        failed: usize,
    },
}

/// Callback for progress events.
pub type ProgressCallback = Box<dyn Fn(ReconcileProgress) + Send + Sync>;

/// Emit a progress event if a callback is set.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: ReconcileProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}
