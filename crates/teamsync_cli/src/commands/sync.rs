//! `teamsync sync`: reconcile every group with the organization's teams.

use std::sync::Arc;

use console::{Term, style};
use teamsync::sync::{ReconcileOptions, ReconcileReport, Reconciler};

use crate::SyncArgs;
use crate::commands::{CommandStatus, github_client, group_source};
use crate::config::Config;
use crate::progress::ProgressReporter;

impl SyncArgs {
    /// Layer the command-line flags over the configured options.
    ///
    /// Flags only ever switch behavior on; config values stay in effect
    /// when a flag is absent.
    fn apply(&self, options: &mut ReconcileOptions) {
        if self.fail_fast {
            options.continue_on_error = false;
        }
        if self.skip_linked {
            options.skip_linked = true;
        }
        if self.keep_default_member {
            options.remove_default_member = false;
        }
        if self.send_group_name {
            options.send_group_name = true;
        }
        if self.strict_group_ids {
            options.strict_group_ids = true;
        }
        options.dry_run = self.dry_run;
    }
}

/// Handle `teamsync sync`.
pub(crate) async fn handle_sync(
    args: SyncArgs,
    config: &Config,
) -> Result<CommandStatus, Box<dyn std::error::Error>> {
    let mut options = config.reconcile_options();
    args.apply(&mut options);
    let source_kind = args.source.unwrap_or(config.sync.source);

    let github = github_client(config)?;
    let source = group_source(source_kind, config, &github)?;

    let is_tty = Term::stdout().is_term();
    if is_tty {
        println!(
            "Reconciling {} groups with teams in {}{}\n",
            style(source_kind.as_str()).cyan(),
            style(github.org()).cyan().bold(),
            if options.dry_run { " (dry run)" } else { "" }
        );
    } else {
        tracing::info!(
            source = source_kind.as_str(),
            org = github.org(),
            dry_run = options.dry_run,
            continue_on_error = options.continue_on_error,
            "Starting reconciliation"
        );
    }

    let dry_run = options.dry_run;
    let reporter = Arc::new(ProgressReporter::new());
    let callback = reporter.as_callback();
    let mut reconciler = Reconciler::new(&github, options).with_progress(&callback);

    let report = tokio::select! {
        result = reconciler.run(source.as_ref()) => result,
        _ = tokio::signal::ctrl_c() => {
            reporter.finish();
            if is_tty {
                eprintln!("\n{} Interrupted", style("⚠").yellow());
            } else {
                tracing::warn!("Interrupted, stopping reconciliation");
            }
            return Ok(CommandStatus::Interrupted);
        }
    };
    reporter.finish();
    let report = report?;

    print_report(&report, dry_run, is_tty);
    Ok(if report.is_success() {
        CommandStatus::Success
    } else {
        CommandStatus::Failed
    })
}

fn print_report(report: &ReconcileReport, dry_run: bool, is_tty: bool) {
    if !is_tty {
        tracing::info!(
            groups = report.groups,
            created = report.created,
            linked = report.linked,
            already_linked = report.already_linked,
            planned = report.planned,
            failed = report.failures.len(),
            aborted = report.aborted,
            "Reconciliation finished"
        );
        for failure in &report.failures {
            tracing::error!(
                group = %failure.group.display_name,
                id = %failure.group.id,
                status = ?failure.status,
                created_team = ?failure.created_team,
                error = %failure.error,
                "Group failed"
            );
        }
        return;
    }

    println!();
    if dry_run {
        println!(
            "{} {} groups: {} team(s) would be created, {} link(s) would be sent",
            style("Dry run").yellow().bold(),
            report.groups,
            report.planned_creates,
            report.planned
        );
    } else {
        println!(
            "{} {} groups: {} created, {} linked, {} already linked",
            style("✓").green().bold(),
            report.groups,
            style(report.created).green(),
            style(report.linked).green(),
            report.already_linked
        );
    }

    if report.has_failures() {
        println!(
            "\n{} {} group(s) failed:",
            style("✗").red().bold(),
            report.failures.len()
        );
        for failure in &report.failures {
            println!(
                "  - {} ({}): {}",
                style(&failure.group.display_name).bold(),
                failure.group.id,
                failure.error
            );
            if let Some(slug) = &failure.created_team {
                println!("    team {} was created before the failure", style(slug).cyan());
            }
        }
    }
    if report.aborted {
        println!(
            "\n{} Stopped after the first failed group (--fail-fast or continue_on_error = false)",
            style("⚠").yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut options = ReconcileOptions::default();
        let args = SyncArgs {
            fail_fast: true,
            keep_default_member: true,
            skip_linked: true,
            dry_run: true,
            ..Default::default()
        };

        args.apply(&mut options);

        assert!(!options.continue_on_error);
        assert!(!options.remove_default_member);
        assert!(options.skip_linked);
        assert!(options.dry_run);
        assert!(!options.send_group_name);
    }

    #[test]
    fn test_absent_flags_keep_config_values() {
        let mut options = ReconcileOptions {
            continue_on_error: false,
            send_group_name: true,
            ..Default::default()
        };

        SyncArgs::default().apply(&mut options);

        assert!(!options.continue_on_error);
        assert!(options.send_group_name);
        assert!(options.remove_default_member);
        assert!(!options.dry_run);
    }
}
