//! Teamsync CLI - keep GitHub teams linked to identity-provider groups.

mod commands;
mod config;
mod progress;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::{Term, style};
use tracing_subscriber::EnvFilter;

use crate::commands::CommandStatus;
use crate::config::SourceKind;

#[derive(Parser)]
#[command(name = "teamsync")]
#[command(version)]
#[command(about = "Reconcile identity-provider groups with GitHub teams")]
#[command(
    long_about = "Teamsync reads the groups of an identity provider (through enterprise SCIM or \
the organization's external-groups listing), makes sure every group has a GitHub team of the \
same name, and links each team to its group."
)]
#[command(after_long_help = r#"EXAMPLES
    Reconcile every group with the organization's teams:
        $ teamsync sync

    Read groups from the enterprise SCIM endpoint instead:
        $ teamsync sync --source scim

    See what would change without touching anything:
        $ teamsync sync --dry-run

    Check whether teams are linked:
        $ teamsync link-status platform security

    Generate shell completions:
        $ teamsync completions bash > ~/.local/share/bash-completion/completions/teamsync

CONFIGURATION
    Teamsync reads configuration from:
      1. ~/.config/teamsync/config.toml (or $XDG_CONFIG_HOME/teamsync/config.toml)
      2. ./teamsync.toml, or ./appsettings.json
      3. Environment variables (TEAMSYNC_ prefix, e.g., TEAMSYNC_GITHUB__TOKEN)
      4. GitHubToken, GitHubOrganization, EnterpriseSlug, SCIMToken, SCIMBaseUrl, APIBaseUrl
      5. .env file in current directory

EXIT STATUS
    0  every group reconciled
    1  at least one group failed, or the run stopped early
    2  the run could not start (configuration, authentication, group listing)
"#)]
struct Cli {
    /// Organization to reconcile (overrides configuration)
    #[arg(short, long, global = true)]
    org: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and link a team for every identity group
    Sync(SyncArgs),
    /// List the groups the identity source returns
    Groups {
        /// Group source (default from config or "github")
        #[arg(short, long, value_enum)]
        source: Option<SourceKind>,
    },
    /// List the organization's teams
    Teams,
    /// Show whether teams are linked to an external group
    LinkStatus {
        /// Team slug(s)
        #[arg(required = true)]
        slugs: Vec<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Options for `teamsync sync`. Each flag overrides the `[sync]` config section.
#[derive(Debug, Clone, Default, clap::Args)]
struct SyncArgs {
    /// Group source (default from config or "github")
    #[arg(short, long, value_enum)]
    source: Option<SourceKind>,

    /// Stop after the first group that fails
    #[arg(short = 'x', long)]
    fail_fast: bool,

    /// Check for an existing link before linking
    #[arg(short = 'k', long)]
    skip_linked: bool,

    /// Leave the auto-added member on newly created teams
    #[arg(long)]
    keep_default_member: bool,

    /// Send the group name along with the group id when linking
    #[arg(long)]
    send_group_name: bool,

    /// Fail groups whose id is not numeric instead of sending it as-is
    #[arg(long)]
    strict_group_ids: bool,

    /// Dry run - show what would be done without making changes
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Initialize tracing for non-TTY mode (structured logging)
    // Only initialize if not connected to a TTY
    if !Term::stdout().is_term() {
        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::new("teamsync=info,teamsync_cli=info"),
        };

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        return match commands::meta::handle_completions(*shell) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(e.as_ref()),
        };
    }

    let mut config = match config::Config::load() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };
    if let Some(org) = cli.org {
        config.github.organization = Some(org);
    }

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::handle_sync(args, &config).await,
        Commands::Groups { source } => commands::groups::handle_groups(source, &config).await,
        Commands::Teams => commands::teams::handle_teams(&config).await,
        Commands::LinkStatus { slugs } => {
            commands::link_status::handle_link_status(&slugs, &config).await
        }
        Commands::Completions { .. } => Ok(CommandStatus::Success),
    };

    match result {
        Ok(status) => status.exit_code(),
        Err(e) => fail(e.as_ref()),
    }
}

/// Report an error that kept a command from running; exit status 2.
fn fail(error: &dyn std::error::Error) -> ExitCode {
    if Term::stdout().is_term() {
        eprintln!("{} {}", style("Error:").red().bold(), error);
    } else {
        tracing::error!(error = %error, "teamsync failed");
    }
    ExitCode::from(2)
}
