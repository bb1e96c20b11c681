use teamsync::sync::ReconcileProgress;

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: ReconcileProgress) {
        match event {
            ReconcileProgress::FetchingGroups { source } => {
                tracing::info!(source = %source, "Fetching groups");
            }

            ReconcileProgress::GroupsFetched { source, count } => {
                tracing::info!(source = %source, count, "Groups fetched");
            }

            ReconcileProgress::ProcessingGroup {
                index,
                total,
                group,
            } => {
                tracing::info!(
                    group = %group.display_name,
                    id = %group.id,
                    index,
                    total,
                    "Processing group"
                );
            }

            ReconcileProgress::TeamResolved {
                group,
                team_slug,
                team_id,
            } => {
                tracing::info!(group = %group, team = %team_slug, team_id, "Team already exists");
            }

            ReconcileProgress::CreatingTeam { group } => {
                tracing::info!(group = %group, "Creating team");
            }

            ReconcileProgress::TeamCreated {
                group,
                team_slug,
                team_id,
            } => {
                tracing::info!(group = %group, team = %team_slug, team_id, "Created team");
            }

            ReconcileProgress::DefaultMemberRemoved { team_slug, login } => {
                tracing::info!(team = %team_slug, login = %login, "Removed default member");
            }

            ReconcileProgress::Linking {
                team_slug,
                group_id,
            } => {
                tracing::debug!(team = %team_slug, group_id = %group_id, "Linking team");
            }

            ReconcileProgress::Linked {
                team_slug,
                group_id,
            } => {
                tracing::info!(team = %team_slug, group_id = %group_id, "Linked team");
            }

            ReconcileProgress::AlreadyLinked { team_slug } => {
                tracing::info!(team = %team_slug, "Already linked");
            }

            ReconcileProgress::Planned {
                group,
                existing_team,
                creates_team,
            } => {
                tracing::info!(
                    group = %group,
                    team = ?existing_team,
                    creates_team,
                    "Would link"
                );
            }

            ReconcileProgress::GroupFailed {
                group,
                status,
                error,
            } => {
                tracing::warn!(group = %group, status = ?status, error = %error, "Group failed");
            }

            ReconcileProgress::Aborted { remaining } => {
                tracing::warn!(remaining, "Run stopped after a failed group");
            }

            ReconcileProgress::Complete {
                linked,
                created,
                failed,
            } => {
                tracing::info!(linked, created, failed, "Reconciliation complete");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
