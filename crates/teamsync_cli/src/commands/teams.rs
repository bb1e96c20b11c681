//! `teamsync teams`: list the organization's teams.

use console::{Term, style};

use crate::commands::{CommandStatus, github_client};
use crate::config::Config;

pub(crate) async fn handle_teams(
    config: &Config,
) -> Result<CommandStatus, Box<dyn std::error::Error>> {
    let github = github_client(config)?;
    let teams = github.list_teams().await?;

    if !Term::stdout().is_term() {
        for team in &teams {
            tracing::info!(id = team.id, slug = %team.slug, name = %team.name, "Team");
        }
        tracing::info!(org = github.org(), count = teams.len(), "Listed teams");
        return Ok(CommandStatus::Success);
    }

    let width = teams.iter().map(|t| t.slug.len()).max().unwrap_or(0);
    for team in &teams {
        println!(
            "{:>10}  {:width$}  {}",
            team.id,
            style(&team.slug).cyan(),
            team.name,
        );
    }
    println!(
        "\n{} team(s) in {}",
        teams.len(),
        style(github.org()).bold()
    );
    Ok(CommandStatus::Success)
}
