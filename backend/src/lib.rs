//! Taskspace Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and implementations
//! - commands: Command handlers and the named router
//! - tools: Tool surface for the chat assistant

use std::path::{Path, PathBuf};

pub mod auth;
pub mod cascade;
pub mod commands;
pub mod config;
pub mod domain;
pub mod live;
pub mod repository;
pub mod tools;

use auth::Tenant;
use config::AppConfig;
use domain::{DomainError, DomainResult};
use live::{LiveHub, Topic};
use repository::{init_db, DbState, Repositories};

/// Application state shared across commands
pub struct AppState {
    pub db_state: DbState,
    pub repos: Repositories,
    pub live: LiveHub,
    pub config: AppConfig,
}

impl AppState {
    /// Open (and migrate) the database named by the config
    pub async fn open(config: AppConfig) -> DomainResult<Self> {
        let db_state = init_db(&config.db_path).await.map_err(DomainError::Internal)?;
        let repos = Repositories::new(db_state.connection());
        let live = LiveHub::new(config.live_channel_capacity);
        Ok(Self {
            db_state,
            repos,
            live,
            config,
        })
    }

    /// Fresh in-memory state (tests, previews)
    pub async fn in_memory() -> DomainResult<Self> {
        let config = AppConfig {
            db_path: PathBuf::from(":memory:"),
            ..AppConfig::default()
        };
        Self::open(config).await
    }

    /// Announce a committed change to live subscribers
    pub fn publish(&self, tenant: &Tenant, topic: Topic) -> u64 {
        self.live.publish(&tenant.organization_id, topic)
    }
}

/// Install the rolling file logger described by the config
pub fn init_logging(config: &AppConfig) -> DomainResult<()> {
    rolling_logger::init_logger(config.log_dir.clone(), &config.app_name).map_err(DomainError::Internal)?;
    let _ = rolling_logger::info(&format!("{} logging to {}", config.app_name, config.log_dir.display()));
    Ok(())
}

/// Load config, start logging and open the database
pub async fn start(config_path: &Path) -> DomainResult<AppState> {
    let config = AppConfig::load(config_path)?;
    init_logging(&config)?;

    match AppState::open(config).await {
        Ok(state) => {
            let _ = rolling_logger::info("DB init success");
            Ok(state)
        }
        Err(e) => {
            let _ = rolling_logger::error(&format!("DB init failed: {}", e));
            Err(e)
        }
    }
}
