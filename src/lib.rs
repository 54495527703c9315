//! # sharpe-rank lib

use std::{
    env,
    path::PathBuf,
    sync::{LazyLock, OnceLock},
};

use directories::ProjectDirs;
use tokio::sync::RwLock;

use crate::{
    config::{Config, ConfigStore},
    error::SrResult,
};

pub mod analysis;
pub mod api;
pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod gui;
pub mod period;
pub mod provider;
pub mod report;
pub mod ticker;
pub mod utils;

pub static CHANNEL_BUFFER_DEFAULT: usize = 64;
pub static VERSION: &str = env!("CARGO_PKG_VERSION");

/// Loads the stored settings into the process-wide state, `config_path`
/// overrides the platform default location.
pub async fn init(config_path: Option<PathBuf>) -> SrResult<()> {
    let _ = env_logger::Builder::new()
        .parse_filters(env::var("LOG").as_deref().unwrap_or("off"))
        .try_init();

    let store = match config_path {
        Some(path) => ConfigStore::new(&path),
        None => ConfigStore::default_location()?,
    };

    let config = store.load()?;
    *CONFIG.write().await = config;

    let _ = CONFIG_STORE.set(store);

    Ok(())
}

mod cache;
mod ds;

static CACHE_PATH: LazyLock<PathBuf> = LazyLock::new(|| {
    match ProjectDirs::from("", "", env!("CARGO_PKG_NAME")) {
        Some(proj_dirs) => proj_dirs.cache_dir().to_path_buf(),
        None => env::current_dir().unwrap_or_default(),
    }
    .join("cache.db")
});

static CONFIG: LazyLock<RwLock<Config>> = LazyLock::new(|| RwLock::new(Config::default()));

static CONFIG_STORE: OnceLock<ConfigStore> = OnceLock::new();
