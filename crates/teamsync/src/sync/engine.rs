//! Group to team reconciliation.
//!
//! Groups are processed strictly in source order, one at a time. For each
//! group the engine resolves a team by display name, creates one when none
//! matches, and links the team to the group.
//!
//! # Example
//!
//! ```ignore
//! use teamsync::github::GitHubClient;
//! use teamsync::sync::{ReconcileOptions, Reconciler};
//!
//! let client = GitHubClient::new(api_base, &token, "my-org", timeout)?;
//! let report = Reconciler::new(&client, ReconcileOptions::default())
//!     .run(&scim)
//!     .await?;
//! println!("{} created, {} failed", report.created, report.failures.len());
//! ```

use std::collections::HashSet;

use super::progress::{ProgressCallback, ReconcileProgress, emit};
use super::types::{
    GroupFailure, GroupOutcome, ReconcileOptions, ReconcileReport, team_description,
};
use crate::error::{Result, short_error_message};
use crate::github::{GitHubClient, GroupLinker, LinkRequest, TeamDirectory, TeamProvisioner};
use crate::group::{GroupSource, IdentityGroup};

/// Reconciles identity groups with the teams of one organization.
///
/// One `Reconciler` per run: the team cache and the detected default member
/// live as long as it does.
pub struct Reconciler<'a> {
    directory: TeamDirectory<'a>,
    provisioner: TeamProvisioner<'a>,
    linker: GroupLinker<'a>,
    options: ReconcileOptions,
    on_progress: Option<&'a ProgressCallback>,
    /// Lowercased names of teams a dry run has already planned to create.
    planned: HashSet<String>,
}

impl<'a> Reconciler<'a> {
    pub fn new(client: &'a GitHubClient, options: ReconcileOptions) -> Self {
        Self {
            directory: TeamDirectory::new(client),
            provisioner: TeamProvisioner::new(client, options.remove_default_member),
            linker: GroupLinker::new(client)
                .send_group_name(options.send_group_name)
                .strict_group_ids(options.strict_group_ids),
            options,
            on_progress: None,
            planned: HashSet::new(),
        }
    }

    pub fn with_progress(mut self, on_progress: &'a ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Fetch every group from `source` and reconcile each one.
    ///
    /// Only a failure to fetch the groups is returned as an error; per-group
    /// failures end up in the report.
    pub async fn run(&mut self, source: &dyn GroupSource) -> Result<ReconcileReport> {
        emit(
            self.on_progress,
            ReconcileProgress::FetchingGroups {
                source: source.label().to_string(),
            },
        );
        let groups = source.fetch_groups().await?;
        let total = groups.len();
        tracing::info!(source = source.label(), count = total, "Fetched groups");
        emit(
            self.on_progress,
            ReconcileProgress::GroupsFetched {
                source: source.label().to_string(),
                count: total,
            },
        );

        let mut report = ReconcileReport {
            groups: total,
            ..Default::default()
        };

        for (i, group) in groups.into_iter().enumerate() {
            emit(
                self.on_progress,
                ReconcileProgress::ProcessingGroup {
                    index: i + 1,
                    total,
                    group: group.clone(),
                },
            );

            let mut created_team = None;
            let result = self.reconcile_group(&group, &mut created_team).await;
            if created_team.is_some() {
                report.created += 1;
            }

            match result {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    let status = e.status();
                    let error = e.to_string();
                    tracing::warn!(
                        group = %group.display_name,
                        id = %group.id,
                        error = %error,
                        "Failed to reconcile group"
                    );
                    emit(
                        self.on_progress,
                        ReconcileProgress::GroupFailed {
                            group: group.display_name.clone(),
                            status,
                            error: short_error_message(&e),
                        },
                    );
                    report.failures.push(GroupFailure {
                        group,
                        error,
                        status,
                        created_team,
                    });

                    if !self.options.continue_on_error {
                        let remaining = total - i - 1;
                        tracing::warn!(remaining, "Stopping after failed group");
                        emit(self.on_progress, ReconcileProgress::Aborted { remaining });
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        emit(
            self.on_progress,
            ReconcileProgress::Complete {
                linked: report.linked,
                created: report.created,
                failed: report.failures.len(),
            },
        );
        Ok(report)
    }

    /// Reconcile one group. `created_team` is set as soon as a team is
    /// created, so a later failure still accounts for it.
    async fn reconcile_group(
        &mut self,
        group: &IdentityGroup,
        created_team: &mut Option<String>,
    ) -> Result<GroupOutcome> {
        // Built first so a rejected id fails the group before a team exists.
        let request = self.linker.prepare(group)?;
        let existing = self.directory.resolve_by_name(&group.display_name).await?;

        if self.options.dry_run {
            return self.plan(group, existing.map(|t| t.slug)).await;
        }

        match existing {
            Some(team) => {
                emit(
                    self.on_progress,
                    ReconcileProgress::TeamResolved {
                        group: group.display_name.clone(),
                        team_slug: team.slug.clone(),
                        team_id: team.id,
                    },
                );

                if self.options.skip_linked && self.linker.is_linked(&team.slug).await? {
                    tracing::info!(team = %team.slug, "Team already linked");
                    emit(
                        self.on_progress,
                        ReconcileProgress::AlreadyLinked {
                            team_slug: team.slug.clone(),
                        },
                    );
                    return Ok(GroupOutcome::AlreadyLinked {
                        team_slug: team.slug,
                    });
                }

                self.send_link(&team.slug, group, &request).await?;
                Ok(GroupOutcome::Linked {
                    team_slug: team.slug,
                })
            }
            None => {
                emit(
                    self.on_progress,
                    ReconcileProgress::CreatingTeam {
                        group: group.display_name.clone(),
                    },
                );
                let team = self
                    .provisioner
                    .create_team(
                        &mut self.directory,
                        &group.display_name,
                        &team_description(&group.id),
                    )
                    .await?;
                *created_team = Some(team.slug.clone());
                emit(
                    self.on_progress,
                    ReconcileProgress::TeamCreated {
                        group: group.display_name.clone(),
                        team_slug: team.slug.clone(),
                        team_id: team.id,
                    },
                );
                if let Some(login) = self.provisioner.remove_default_member(&team).await? {
                    emit(
                        self.on_progress,
                        ReconcileProgress::DefaultMemberRemoved {
                            team_slug: team.slug.clone(),
                            login,
                        },
                    );
                }

                self.send_link(&team.slug, group, &request).await?;
                Ok(GroupOutcome::CreatedAndLinked {
                    team_slug: team.slug,
                })
            }
        }
    }

    async fn send_link(
        &self,
        team_slug: &str,
        group: &IdentityGroup,
        request: &LinkRequest,
    ) -> Result<()> {
        emit(
            self.on_progress,
            ReconcileProgress::Linking {
                team_slug: team_slug.to_string(),
                group_id: group.id.to_string(),
            },
        );
        self.linker.send(team_slug, request).await?;
        emit(
            self.on_progress,
            ReconcileProgress::Linked {
                team_slug: team_slug.to_string(),
                group_id: group.id.to_string(),
            },
        );
        Ok(())
    }

    /// Dry-run outcome for `group`. Only read-only calls are made.
    async fn plan(
        &mut self,
        group: &IdentityGroup,
        existing_team: Option<String>,
    ) -> Result<GroupOutcome> {
        if let Some(slug) = existing_team.as_deref()
            && self.options.skip_linked
            && self.linker.is_linked(slug).await?
        {
            emit(
                self.on_progress,
                ReconcileProgress::AlreadyLinked {
                    team_slug: slug.to_string(),
                },
            );
            return Ok(GroupOutcome::AlreadyLinked {
                team_slug: slug.to_string(),
            });
        }

        let creates_team =
            existing_team.is_none() && self.planned.insert(group.display_name.to_lowercase());
        tracing::info!(
            group = %group.display_name,
            team = existing_team.as_deref().unwrap_or("<new>"),
            creates_team,
            "Planned link"
        );
        emit(
            self.on_progress,
            ReconcileProgress::Planned {
                group: group.display_name.clone(),
                existing_team: existing_team.clone(),
                creates_team,
            },
        );
        Ok(GroupOutcome::Planned {
            existing_team,
            creates_team,
        })
    }
}
