pub(crate) mod groups;
pub(crate) mod link_status;
pub(crate) mod meta;
pub(crate) mod sync;
pub(crate) mod teams;

use std::process::ExitCode;

use teamsync::GroupSource;
use teamsync::github::GitHubClient;
use teamsync::scim::ScimClient;

use crate::config::{Config, SourceKind};

/// How a command that ran to completion went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandStatus {
    Success,
    /// Some items (groups, teams) failed.
    Failed,
    /// Stopped by Ctrl+C.
    Interrupted,
}

impl CommandStatus {
    pub(crate) fn exit_code(self) -> ExitCode {
        match self {
            Self::Success => ExitCode::SUCCESS,
            Self::Failed => ExitCode::from(1),
            Self::Interrupted => ExitCode::from(130),
        }
    }
}

/// GitHub client from validated configuration.
pub(crate) fn github_client(config: &Config) -> Result<GitHubClient, Box<dyn std::error::Error>> {
    let settings = config.github_settings()?;
    Ok(GitHubClient::new(
        &settings.api_base_url,
        &settings.token,
        &settings.organization,
        config.timeout(),
    )?)
}

/// Group source for `kind`, reusing `github` for the external-groups listing.
pub(crate) fn group_source(
    kind: SourceKind,
    config: &Config,
    github: &GitHubClient,
) -> Result<Box<dyn GroupSource>, Box<dyn std::error::Error>> {
    match kind {
        SourceKind::Github => Ok(Box::new(github.clone())),
        SourceKind::Scim => {
            let settings = config.scim_settings()?;
            Ok(Box::new(ScimClient::new(
                &settings.base_url,
                &settings.token,
                &settings.enterprise_slug,
                config.timeout(),
            )?))
        }
    }
}
