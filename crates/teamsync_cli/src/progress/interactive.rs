use std::sync::Mutex;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use teamsync::sync::ReconcileProgress;

/// Interactive progress reporter using indicatif.
///
/// A spinner while groups are fetched, then one bar advancing per group.
/// Notable steps (created teams, failures) are printed above the bar.
pub struct InteractiveReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl InteractiveReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    pub fn handle(&self, event: ReconcileProgress) {
        let mut bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());

        match event {
            ReconcileProgress::FetchingGroups { source } => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.set_prefix(format!("{source:8}"));
                pb.set_message("Fetching groups...");
                pb.enable_steady_tick(Duration::from_millis(100));
                *bar = Some(pb);
            }

            ReconcileProgress::GroupsFetched { source, count } => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
                let pb = ProgressBar::new(count as u64);
                pb.set_style(Self::bar_style());
                pb.set_prefix(format!("{source:8}"));
                *bar = Some(pb);
            }

            ReconcileProgress::ProcessingGroup { group, .. } => {
                if let Some(pb) = bar.as_ref() {
                    pb.set_message(group.display_name);
                }
            }

            ReconcileProgress::TeamCreated {
                team_slug, team_id, ..
            } => {
                Self::println(
                    bar.as_ref(),
                    format!(
                        "{} Created team {} (id {})",
                        style("+").green().bold(),
                        style(team_slug).cyan(),
                        team_id
                    ),
                );
            }

            ReconcileProgress::DefaultMemberRemoved { team_slug, login } => {
                Self::println(
                    bar.as_ref(),
                    format!(
                        "  {} removed {} from {}",
                        style("-").dim(),
                        style(login).dim(),
                        team_slug
                    ),
                );
            }

            ReconcileProgress::Linked { .. } | ReconcileProgress::AlreadyLinked { .. } => {
                if let Some(pb) = bar.as_ref() {
                    pb.inc(1);
                }
            }

            ReconcileProgress::Planned {
                group,
                existing_team,
                creates_team,
            } => {
                let target = match (existing_team, creates_team) {
                    (Some(slug), _) => format!("existing team {}", style(slug).cyan()),
                    (None, true) => style("new team").yellow().to_string(),
                    (None, false) => "team planned above".to_string(),
                };
                Self::println(
                    bar.as_ref(),
                    format!("{} {} -> {}", style("~").yellow(), group, target),
                );
                if let Some(pb) = bar.as_ref() {
                    pb.inc(1);
                }
            }

            ReconcileProgress::GroupFailed {
                group,
                status,
                error,
            } => {
                let status = status.map(|s| format!(" [{s}]")).unwrap_or_default();
                Self::println(
                    bar.as_ref(),
                    format!(
                        "{} {}{}: {}",
                        style("✗").red().bold(),
                        style(group).bold(),
                        status,
                        error
                    ),
                );
                if let Some(pb) = bar.as_ref() {
                    pb.inc(1);
                }
            }

            ReconcileProgress::Aborted { remaining } => {
                Self::println(
                    bar.as_ref(),
                    format!(
                        "{} Stopping, {} group(s) not processed",
                        style("⚠").yellow(),
                        remaining
                    ),
                );
            }

            ReconcileProgress::Complete { .. } => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
            }

            _ => {}
        }
    }

    /// Finish the bar if a run ended without a `Complete` event.
    pub fn finish(&self) {
        let mut bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = bar.take()
            && !pb.is_finished()
        {
            pb.finish_and_clear();
        }
    }

    fn println(bar: Option<&ProgressBar>, line: String) {
        match bar {
            Some(pb) => pb.println(line),
            None => println!("{line}"),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{prefix:.bold.cyan} {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}/{len:3} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }
}

impl Default for InteractiveReporter {
    fn default() -> Self {
        Self::new()
    }
}
