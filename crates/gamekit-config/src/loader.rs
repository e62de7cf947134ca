use gamekit_core::{GameError, Result};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::schema::GameConfig;

/// Environment lookup used for overrides on load and on every reload.
type EnvSource = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Loads and reloads the gamekit configuration.
pub struct ConfigLoader {
    config: Arc<RwLock<GameConfig>>,
    config_path: PathBuf,
    env: EnvSource,
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("config_path", &self.config_path)
            .finish_non_exhaustive()
    }
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > GAMEKIT_CONFIG env > ~/.gamekit/gamekit.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("GAMEKIT_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gamekit")
            .join("gamekit.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load), reading overrides through `env` instead of
    /// the process environment. [`reload`](Self::reload) keeps using `env`.
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read_file(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            GameConfig::default()
        };

        let config = Self::apply_env_overrides(config, &env);

        // Log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(GameError::Config(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
            env: Arc::new(env),
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> GameConfig {
        self.config.read().clone()
    }

    /// Shared handle that observes reloads.
    pub fn shared(&self) -> Arc<RwLock<GameConfig>> {
        Arc::clone(&self.config)
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn read_file(path: &Path) -> Result<GameConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<GameConfig>(&raw).map_err(|e| {
            GameError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply env var overrides. Credentials from the environment only fill
    /// in values the file leaves unset; `GAMEKIT_LOG_LEVEL` always wins.
    pub fn apply_env_overrides<F>(mut config: GameConfig, env: F) -> GameConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = env("GAMEKIT_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Some(v) = env("GAMEKIT_API_URL") {
            config.game.api_url = v;
        }
        if config.game.api_key.is_none() {
            config.game.api_key = env("VIRTUALS_API_KEY");
        }
        if config.telegram.bot_token.is_none() {
            config.telegram.bot_token = env("TELEGRAM_BOT_TOKEN");
        }
        if config.discord.bot_token.is_none() {
            config.discord.bot_token = env("DISCORD_BOT_TOKEN");
        }
        config
    }

    /// Reload the config from disk. A file that fails to parse or validate
    /// leaves the current config in place.
    pub fn reload(&self) -> Result<()> {
        if !self.config_path.exists() {
            return Err(GameError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::read_file(&self.config_path)?;
        let new_config = Self::apply_env_overrides(new_config, self.env.as_ref());
        new_config.validate().map_err(GameError::Config)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}
