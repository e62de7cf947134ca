//! # gamekit-platforms
//!
//! Function registries for chat platforms. Registries only build
//! [`FunctionDescriptor`](gamekit_core::FunctionDescriptor)s; every call goes
//! through the shared [`Invoker`](gamekit_core::Invoker).

pub mod discord;
pub mod registry;
pub mod telegram;

pub use discord::DiscordFunctions;
pub use registry::{FunctionRegistry, registry_for};
pub use telegram::{TelegramClient, TelegramFunctions, WebhookMessage, parse_webhook};
