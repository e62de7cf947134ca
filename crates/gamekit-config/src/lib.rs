//! # gamekit-config
//!
//! Configuration for gamekit. Reads `gamekit.toml`, then fills unset
//! credentials from the environment.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::GameConfig;
pub use schema::{
    AgentConfig, ConfigWarning, DiscordConfig, GameApiConfig, HttpConfig, LoggingConfig,
    TelegramConfig, WarningSeverity,
};
