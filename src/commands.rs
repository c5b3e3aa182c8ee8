//! CLI command definitions and dispatch.

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use socialhub_cache::MemoryQueryCache;
use socialhub_core::config::AppConfig;
use socialhub_core::types::{Credentials, ProfileId};
use socialhub_realtime::sink::{TracingActivityLog, TracingNotifier};
use socialhub_realtime::{ConnectionStatus, EventDispatcher, RealtimeClient, WsTransport};
use socialhub_state::storage::FileStorage;
use socialhub_state::{ApiClient, AppStore, Collaborators};

/// SocialHub dashboard client
#[derive(Debug, Parser)]
#[command(name = "socialhub", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load from the config directory
    #[arg(long, default_value = "development")]
    pub env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store credentials issued by the server
    Login {
        /// Access token
        #[arg(long)]
        token: String,
        /// Manager account id
        #[arg(long)]
        manager_id: i64,
        /// Active profile id
        #[arg(long)]
        profile_id: i64,
    },
    /// Forget the stored session
    Logout,
    /// Switch the active profile
    SwitchProfile {
        /// Profile to act as
        profile_id: i64,
    },
    /// Show the stored session and the current user
    Whoami,
    /// Follow the live event stream until interrupted
    Listen,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> anyhow::Result<()> {
        let app = build_app(&config)?;

        let result = match &self.command {
            Commands::Login {
                token,
                manager_id,
                profile_id,
            } => {
                app.session()
                    .login(&Credentials::new(token.as_str(), *manager_id, *profile_id))
                    .context("Login failed")?;
                println!("Logged in as profile {}", profile_id);
                Ok(())
            }
            Commands::Logout => {
                app.session().logout().await.context("Logout failed")?;
                println!("Logged out");
                Ok(())
            }
            Commands::SwitchProfile { profile_id } => switch_profile(&app, *profile_id).await,
            Commands::Whoami => whoami(&app).await,
            Commands::Listen => listen(&app).await,
        };

        app.shutdown();
        result
    }
}

/// Wire the client from configuration.
fn build_app(config: &AppConfig) -> anyhow::Result<AppStore> {
    let storage = Arc::new(
        FileStorage::open(&config.storage.path)
            .with_context(|| format!("Cannot open session storage {}", config.storage.path))?,
    );
    let cache = Arc::new(MemoryQueryCache::new(&config.cache));
    let notifier = Arc::new(TracingNotifier);
    let api = Arc::new(ApiClient::new(&config.api).context("Cannot build HTTP client")?);

    let dispatcher = Arc::new(EventDispatcher::new(
        cache.clone(),
        notifier.clone(),
        Arc::new(TracingActivityLog),
    ));
    let realtime = RealtimeClient::new(&config.realtime, Arc::new(WsTransport), dispatcher);

    let app = AppStore::new(
        Collaborators {
            storage,
            cache,
            notifier,
            switcher: api.clone(),
            user_info: api,
        },
        realtime,
    )
    .context("Cannot restore session")?;
    Ok(app)
}

async fn switch_profile(app: &AppStore, profile_id: i64) -> anyhow::Result<()> {
    let profile_id = ProfileId(profile_id);
    let switched = app
        .session()
        .set_active_profile(profile_id)
        .await
        .with_context(|| format!("Could not switch to profile {}", profile_id))?;

    if switched {
        println!("Switched to profile {}", profile_id);
    } else {
        println!("Profile {} is already active", profile_id);
    }
    Ok(())
}

async fn whoami(app: &AppStore) -> anyhow::Result<()> {
    let user = app
        .session()
        .refresh_user_info()
        .await
        .context("Could not fetch the current user")?;
    let session = app.session().session();

    let report = serde_json::json!({
        "authenticated": session.is_authenticated(),
        "manager_id": session.manager_id,
        "active_profile_id": session.active_profile_id,
        "user": user,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn listen(app: &AppStore) -> anyhow::Result<()> {
    if !app.session().is_authenticated() {
        bail!("Not logged in. Run `socialhub login` first");
    }

    let mut status = app.realtime().subscribe_status();
    app.start();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing event stream");
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                info!(status = current.as_str(), "Connection status changed");
                if current == ConnectionStatus::Disconnected && !app.session().is_authenticated() {
                    break;
                }
            }
        }
    }

    Ok(())
}
