//! `teamsync groups`: list what the identity source returns.

use console::{Term, style};

use crate::commands::{CommandStatus, github_client, group_source};
use crate::config::{Config, SourceKind};

pub(crate) async fn handle_groups(
    source: Option<SourceKind>,
    config: &Config,
) -> Result<CommandStatus, Box<dyn std::error::Error>> {
    let kind = source.unwrap_or(config.sync.source);
    let github = github_client(config)?;
    let source = group_source(kind, config, &github)?;

    let groups = source.fetch_groups().await?;

    if !Term::stdout().is_term() {
        for group in &groups {
            tracing::info!(id = %group.id, name = %group.display_name, "Group");
        }
        tracing::info!(source = kind.as_str(), count = groups.len(), "Listed groups");
        return Ok(CommandStatus::Success);
    }

    if groups.is_empty() {
        println!("No groups returned by the {} source.", kind.as_str());
        return Ok(CommandStatus::Success);
    }

    let width = groups
        .iter()
        .map(|g| g.id.as_str().len())
        .max()
        .unwrap_or(0);
    for group in &groups {
        println!(
            "{:width$}  {}",
            style(group.id.as_str()).dim(),
            group.display_name,
        );
    }
    println!(
        "\n{} group(s) from {}",
        groups.len(),
        style(kind.as_str()).cyan()
    );
    Ok(CommandStatus::Success)
}
