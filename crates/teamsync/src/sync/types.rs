//! Options and results of a reconciliation run.

use crate::group::{GroupId, IdentityGroup};

/// Description given to teams created for a group.
pub fn team_description(group_id: &GroupId) -> String {
    format!("Team synced with IdP group {group_id}")
}

/// Options for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Record a failed group and keep going; `false` stops after the first failure.
    pub continue_on_error: bool,
    /// Remove the member GitHub adds to every newly created team.
    pub remove_default_member: bool,
    /// Check for an existing link before sending one.
    pub skip_linked: bool,
    /// Include the group's display name in link requests.
    pub send_group_name: bool,
    /// Fail groups whose id is not numeric before anything is created.
    pub strict_group_ids: bool,
    /// Resolve teams only and report what would change.
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            remove_default_member: true,
            skip_linked: false,
            send_group_name: false,
            strict_group_ids: false,
            dry_run: false,
        }
    }
}

/// What happened to a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Existing team linked.
    Linked { team_slug: String },
    /// Team created, then linked.
    CreatedAndLinked { team_slug: String },
    /// Link already present (only with `skip_linked`).
    AlreadyLinked { team_slug: String },
    /// Dry run. `existing_team` is the matched team's slug; without one the
    /// team is either created for this group (`creates_team`) or was already
    /// planned for an earlier group of the same name.
    Planned {
        existing_team: Option<String>,
        creates_team: bool,
    },
}

/// A group that could not be reconciled.
#[derive(Debug, Clone)]
pub struct GroupFailure {
    pub group: IdentityGroup,
    /// Rendered error, including status and response body when there is one.
    pub error: String,
    pub status: Option<u16>,
    /// Slug of a team created for the group before the failure.
    pub created_team: Option<String>,
}

/// Summary of a reconciliation run.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Groups returned by the source.
    pub groups: usize,
    /// Teams created, including those whose group failed afterwards.
    pub created: usize,
    /// Link requests that succeeded.
    pub linked: usize,
    /// Teams skipped because a link was already present.
    pub already_linked: usize,
    /// Groups planned in a dry run.
    pub planned: usize,
    /// Teams a dry run would create.
    pub planned_creates: usize,
    pub failures: Vec<GroupFailure>,
    /// Set when the run stopped early after a failure.
    pub aborted: bool,
}

impl ReconcileReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// True when every group was reconciled and the run ran to completion.
    pub fn is_success(&self) -> bool {
        !self.has_failures() && !self.aborted
    }

    pub(crate) fn record(&mut self, outcome: &GroupOutcome) {
        match outcome {
            // Creation is counted when it happens, not here.
            GroupOutcome::Linked { .. } | GroupOutcome::CreatedAndLinked { .. } => {
                self.linked += 1
            }
            GroupOutcome::AlreadyLinked { .. } => self.already_linked += 1,
            GroupOutcome::Planned { creates_team, .. } => {
                self.planned += 1;
                if *creates_team {
                    self.planned_creates += 1;
                }
            }
        }
    }
}
