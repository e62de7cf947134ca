use gamekit_config::GameConfig;
use gamekit_core::{FunctionDescriptor, GameError, Result};
use std::collections::BTreeMap;

use crate::discord::DiscordFunctions;
use crate::telegram::TelegramFunctions;

/// A named set of function descriptors for one platform.
///
/// Lookups are pure: they build a descriptor from the registry's own
/// configuration and never perform I/O.
pub trait FunctionRegistry: Send + Sync {
    /// Platform tag, e.g. "telegram".
    fn platform(&self) -> &str;

    /// Registered function names, in listing order.
    fn names(&self) -> &'static [&'static str];

    /// Build the descriptor registered under `name`.
    fn function(&self, name: &str) -> Result<FunctionDescriptor>;

    /// Name to description for every registered function.
    fn functions(&self) -> BTreeMap<String, String> {
        self.names()
            .iter()
            .filter_map(|name| {
                self.function(name)
                    .ok()
                    .map(|f| (name.to_string(), f.description().to_string()))
            })
            .collect()
    }
}

pub(crate) fn unknown(name: &str) -> GameError {
    GameError::UnknownFunction(name.to_string())
}

/// Build the registry for `platform` from the loaded config.
pub fn registry_for(platform: &str, config: &GameConfig) -> Result<Box<dyn FunctionRegistry>> {
    match platform.to_ascii_lowercase().as_str() {
        "telegram" => Ok(Box::new(TelegramFunctions::from_config(&config.telegram)?)),
        "discord" => Ok(Box::new(DiscordFunctions::from_config(&config.discord)?)),
        other => Err(GameError::Config(format!(
            "unknown platform '{other}' (expected telegram or discord)"
        ))),
    }
}
