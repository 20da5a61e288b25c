//! Application context for the Taxdesk CLI.
//!
//! Bundles the parsed CLI arguments with the lazily-loaded config file.

use std::path::PathBuf;
use std::time::Duration;

use once_cell::unsync::OnceCell;
use tracing::debug;

use taxdesk_core::activity::ActivityMetadata;
use taxdesk_core::returns::TransitionPolicy;
use taxdesk_core::{SqliteStore, Workspace};

use crate::cli::Cli;
use crate::config::{read_config, TaxdeskConfig};
use crate::constants::CLIENT_USER_AGENT;
use crate::errors::CliError;
use crate::ui::{UiContext, UiFlags};

use super::resolver::{missing_store_message, resolve_config_path, resolve_store_path};

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<TaxdeskConfig>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, if one exists. Loaded once.
    pub fn config(&self) -> anyhow::Result<Option<&TaxdeskConfig>> {
        let loaded = self.config.get_or_try_init(|| -> anyhow::Result<_> {
            let path = resolve_config_path()?;
            if !path.exists() {
                debug!(path = %path.display(), "no config file");
                return Ok(None);
            }
            Ok(Some(read_config(&path)?))
        })?;
        Ok(loaded.as_ref())
    }

    /// UI context from the global flags and the configured timezone.
    ///
    /// An unreadable config or unknown timezone falls back to UTC.
    pub fn ui_context(&self) -> UiContext {
        let flags = UiFlags {
            json: self.cli.json,
            format: self.cli.format,
            no_color: self.cli.no_color,
            ascii: self.cli.ascii,
        };
        let timezone = self
            .config()
            .ok()
            .flatten()
            .and_then(|config| config.ui.timezone.as_deref())
            .and_then(|tz| tz.parse::<chrono_tz::Tz>().ok());
        UiContext::detect(flags, timezone)
    }

    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        resolve_store_path(self.cli, self.config()?)
    }

    /// Open the workspace on the resolved store, applying config settings.
    pub fn open_workspace(&self) -> anyhow::Result<Workspace<SqliteStore>> {
        let path = self.store_path()?;
        if !path.exists() {
            return Err(CliError::not_found(
                missing_store_message(&path),
                "Hint: Run `taxdesk init` to create a store.",
            )
            .into());
        }
        let store = SqliteStore::open(&path)?;
        debug!(path = %path.display(), "store opened");

        let config = self.config()?;
        let policy = match config.map(|c| c.returns.strict_transitions) {
            Some(true) => TransitionPolicy::Strict,
            _ => TransitionPolicy::Permissive,
        };
        let latency = config
            .map(|c| Duration::from_millis(c.settings.simulated_latency_ms))
            .unwrap_or(Duration::ZERO);

        Ok(Workspace::new(store)
            .with_policy(policy)
            .with_save_latency(latency)
            .with_client(ActivityMetadata {
                ip: None,
                user_agent: Some(CLIENT_USER_AGENT.to_string()),
            }))
    }
}
