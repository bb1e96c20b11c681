//! Configuration for teamsync.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Flat environment variables kept from the `appsettings.json` era
//!    (`GitHubToken`, `GitHubOrganization`, `SCIMToken`, ...)
//! 3. Environment variables prefixed with `TEAMSYNC_`, using `__` between
//!    section and key (e.g. `TEAMSYNC_GITHUB__TOKEN`)
//! 4. Local config file (`./teamsync.toml`, or `./appsettings.json`)
//! 5. XDG config file (`~/.config/teamsync/config.toml`)
//! 6. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."          # or TEAMSYNC_GITHUB__TOKEN / GitHubToken
//! organization = "acme"
//! api_base_url = "https://api.github.com"
//!
//! [scim]
//! token = "..."
//! base_url = "https://api.github.com"
//! enterprise_slug = "acme-enterprise"
//!
//! [sync]
//! source = "github"          # or "scim"
//! continue_on_error = true
//! remove_default_member = true
//! skip_linked = false
//! send_group_name = false
//! strict_group_ids = false
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use serde_json::{Map, Value};
use teamsync::SyncError;
use teamsync::github::DEFAULT_API_BASE_URL;
use teamsync::scim::DEFAULT_SCIM_BASE_URL;
use teamsync::sync::ReconcileOptions;

/// Flat setting names and the nested keys they map to.
///
/// Used for both `appsettings.json` keys (matched case-insensitively) and
/// environment variables (matched exactly).
const LEGACY_KEYS: &[(&str, &str)] = &[
    ("GitHubToken", "github.token"),
    ("GitHub__APIToken", "github.token"),
    ("GitHubOrganization", "github.organization"),
    ("Organization", "github.organization"),
    ("GitHub__Organization", "github.organization"),
    ("APIBaseUrl", "github.api_base_url"),
    ("GitHub__APIBaseUrl", "github.api_base_url"),
    ("EnterpriseSlug", "scim.enterprise_slug"),
    ("SCIMToken", "scim.token"),
    ("SCIMBaseUrl", "scim.base_url"),
];

/// Where groups are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Enterprise SCIM `Groups` endpoint.
    Scim,
    /// The organization's external-groups listing.
    Github,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scim => "scim",
            Self::Github => "github",
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub scim: ScimConfig,
    pub sync: SyncConfig,
}

/// GitHub organization settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Token with `admin:org` scope.
    pub token: Option<String>,
    pub organization: Option<String>,
    /// REST API base, for GitHub Enterprise Server.
    pub api_base_url: Option<String>,
}

/// Enterprise SCIM settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScimConfig {
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub enterprise_slug: Option<String>,
}

/// Reconciliation defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub source: SourceKind,
    pub continue_on_error: bool,
    pub remove_default_member: bool,
    pub skip_linked: bool,
    pub send_group_name: bool,
    pub strict_group_ids: bool,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let options = ReconcileOptions::default();
        Self {
            source: SourceKind::Github,
            continue_on_error: options.continue_on_error,
            remove_default_member: options.remove_default_member,
            skip_linked: options.skip_linked,
            send_group_name: options.send_group_name,
            strict_group_ids: options.strict_group_ids,
            timeout_secs: teamsync::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Validated GitHub settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    pub api_base_url: String,
    pub token: String,
    pub organization: String,
}

/// Validated SCIM settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScimSettings {
    pub base_url: String,
    pub token: String,
    pub enterprise_slug: String,
}

impl Config {
    /// Load configuration from every layer.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "teamsync") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("teamsync.toml");
        let appsettings = PathBuf::from("appsettings.json");
        if local_config.exists() {
            tracing::debug!("Loading config from ./teamsync.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        } else if appsettings.exists() {
            tracing::debug!("Loading config from ./appsettings.json");
            let translated = read_appsettings(&appsettings)?;
            builder = builder.add_source(File::from_str(&translated, FileFormat::Json));
        }

        builder = builder.add_source(
            Environment::with_prefix("TEAMSYNC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        for (key, value) in legacy_env_overrides(|name| std::env::var(name).ok()) {
            builder = builder.set_override(key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// GitHub settings, failing when a required value is missing.
    pub fn github_settings(&self) -> Result<GitHubSettings, SyncError> {
        Ok(GitHubSettings {
            api_base_url: self
                .github
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            token: required(&self.github.token, "github.token", "GitHubToken")?,
            organization: required(
                &self.github.organization,
                "github.organization",
                "GitHubOrganization",
            )?,
        })
    }

    /// SCIM settings, failing when a required value is missing.
    pub fn scim_settings(&self) -> Result<ScimSettings, SyncError> {
        Ok(ScimSettings {
            base_url: self
                .scim
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SCIM_BASE_URL.to_string()),
            token: required(&self.scim.token, "scim.token", "SCIMToken")?,
            enterprise_slug: required(
                &self.scim.enterprise_slug,
                "scim.enterprise_slug",
                "EnterpriseSlug",
            )?,
        })
    }

    /// Reconcile options before CLI flags are applied.
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            continue_on_error: self.sync.continue_on_error,
            remove_default_member: self.sync.remove_default_member,
            skip_linked: self.sync.skip_linked,
            send_group_name: self.sync.send_group_name,
            strict_group_ids: self.sync.strict_group_ids,
            dry_run: false,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.sync.timeout_secs.max(1))
    }
}

fn required(value: &Option<String>, key: &str, legacy: &str) -> Result<String, SyncError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SyncError::Config(format!(
            "missing {key} (set it in teamsync.toml, TEAMSYNC_{}, or {legacy})",
            key.to_uppercase().replace('.', "__")
        ))),
    }
}

/// Nested key for a flat setting name, ignoring case.
fn legacy_target(name: &str) -> Option<&'static str> {
    LEGACY_KEYS
        .iter()
        .find(|(flat, _)| flat.eq_ignore_ascii_case(name))
        .map(|(_, nested)| *nested)
}

/// Overrides for the flat environment variables that are set.
///
/// Later entries of [`LEGACY_KEYS`] win when two names map to the same key.
fn legacy_env_overrides(
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<(&'static str, String)> {
    LEGACY_KEYS
        .iter()
        .filter_map(|(name, key)| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .map(|v| (*key, v))
        })
        .collect()
}

fn read_appsettings(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Message(format!("failed to read {}: {e}", path.display())))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| ConfigError::Message(format!("invalid {}: {e}", path.display())))?;
    Ok(translate_appsettings(value).to_string())
}

/// Rewrite an `appsettings.json` document into the nested layout.
///
/// Flat keys (`GitHubToken`) and the `GitHub` section (`APIToken`,
/// `Organization`, `APIBaseUrl`) are mapped onto `github`/`scim` keys;
/// `github`, `scim` and `sync` sections already in the nested layout are kept.
fn translate_appsettings(value: Value) -> Value {
    let mut out = Map::new();
    let Value::Object(root) = value else {
        return Value::Object(out);
    };

    for (name, value) in root {
        if let Value::Object(section) = value {
            for (key, value) in section {
                let target = legacy_target(&format!("{name}__{key}"))
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}.{}", name.to_lowercase(), key));
                insert_dotted(&mut out, &target, value);
            }
        } else if let Some(target) = legacy_target(&name) {
            insert_dotted(&mut out, target, value);
        }
    }

    Value::Object(out)
}

fn insert_dotted(out: &mut Map<String, Value>, dotted: &str, value: Value) {
    let Some((section, key)) = dotted.split_once('.') else {
        out.insert(dotted.to_string(), value);
        return;
    };
    let entry = out
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(map) = entry {
        map.insert(key.to_string(), value);
    }
}
