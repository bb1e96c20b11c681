//! `teamsync link-status`: report whether teams are linked to a group.

use console::{Term, style};
use teamsync::github::GroupLinker;
use teamsync::short_error_message;

use crate::commands::{CommandStatus, github_client};
use crate::config::Config;

pub(crate) async fn handle_link_status(
    slugs: &[String],
    config: &Config,
) -> Result<CommandStatus, Box<dyn std::error::Error>> {
    let github = github_client(config)?;
    let linker = GroupLinker::new(&github);
    let is_tty = Term::stdout().is_term();
    let mut status = CommandStatus::Success;

    for slug in slugs {
        match linker.is_linked(slug).await {
            Ok(linked) if is_tty => {
                let label = if linked {
                    style("linked").green()
                } else {
                    style("not linked").yellow()
                };
                println!("{}: {}", style(slug).cyan(), label);
            }
            Ok(linked) => tracing::info!(team = %slug, linked, "Link status"),
            Err(e) => {
                status = CommandStatus::Failed;
                if is_tty {
                    println!(
                        "{}: {} {}",
                        style(slug).cyan(),
                        style("error").red().bold(),
                        short_error_message(&e)
                    );
                } else {
                    tracing::error!(team = %slug, error = %e, "Failed to read link status");
                }
            }
        }
    }

    Ok(status)
}
