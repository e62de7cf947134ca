use gamekit_config::DiscordConfig;
use gamekit_core::{
    ArgType, FunctionDescriptor, GameError, HttpMethod, RequestTemplate, Result,
};

use crate::registry::{FunctionRegistry, unknown};

const PLATFORM: &str = "discord";

const NAMES: &[&str] = &["sendMessage", "addReaction", "pinMessage", "deleteMessage"];

/// Discord REST v10 function descriptors, authorized with `Bot {token}`.
#[derive(Debug, Clone)]
pub struct DiscordFunctions {
    bot_token: String,
    base_url: String,
}

impl DiscordFunctions {
    pub fn new(bot_token: &str, api_base: &str) -> Self {
        Self {
            bot_token: bot_token.to_string(),
            base_url: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &DiscordConfig) -> Result<Self> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            GameError::Config("discord.bot_token is not set (or DISCORD_BOT_TOKEN)".into())
        })?;
        Ok(Self::new(token, &config.api_base))
    }

    fn template(&self, method: HttpMethod, path: &str) -> RequestTemplate {
        RequestTemplate::new(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bot {}", self.bot_token))
            .platform(PLATFORM)
    }

    pub fn send_message(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder("send_message", "Send a text message to a Discord channel.")
            .arg("channel_id", "ID of the Discord channel to send the message to.", ArgType::String)
            .arg("content", "Content of the message to send.", ArgType::String)
            .request(
                self.template(HttpMethod::Post, "/channels/{{channel_id}}/messages")
                    .header("Content-Type", "application/json")
                    .field("content", "{{content}}")
                    .on_success("Message sent successfully.")
                    .on_error("Failed to send message: {{response.message}}"),
            )
            .build()
    }

    /// `emoji` must already be URL-encoded for unicode emoji, or `name:id`
    /// for custom ones.
    pub fn add_reaction(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder("add_reaction", "Add a reaction emoji to a message.")
            .arg("channel_id", "ID of the Discord channel containing the message.", ArgType::String)
            .arg("message_id", "ID of the message to add a reaction to.", ArgType::String)
            .arg("emoji", "Emoji to add as a reaction (Unicode or custom emoji).", ArgType::String)
            .request(
                self.template(
                    HttpMethod::Put,
                    "/channels/{{channel_id}}/messages/{{message_id}}/reactions/{{emoji}}/@me",
                )
                .on_success("Reaction added successfully.")
                .on_error("Failed to add reaction: {{response.message}}"),
            )
            .build()
    }

    pub fn pin_message(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder("pin_message", "Pin a message in a Discord channel.")
            .arg("channel_id", "ID of the Discord channel containing the message.", ArgType::String)
            .arg("message_id", "ID of the message to pin.", ArgType::String)
            .request(
                self.template(HttpMethod::Put, "/channels/{{channel_id}}/pins/{{message_id}}")
                    .on_success("Message pinned successfully.")
                    .on_error("Failed to pin message: {{response.message}}"),
            )
            .build()
    }

    pub fn delete_message(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder("delete_message", "Delete a message from a Discord channel.")
            .arg("channel_id", "ID of the Discord channel containing the message.", ArgType::String)
            .arg("message_id", "ID of the message to delete.", ArgType::String)
            .request(
                self.template(
                    HttpMethod::Delete,
                    "/channels/{{channel_id}}/messages/{{message_id}}",
                )
                .on_success("Message deleted successfully.")
                .on_error("Failed to delete message: {{response.message}}"),
            )
            .build()
    }
}

impl FunctionRegistry for DiscordFunctions {
    fn platform(&self) -> &str {
        PLATFORM
    }

    fn names(&self) -> &'static [&'static str] {
        NAMES
    }

    fn function(&self, name: &str) -> Result<FunctionDescriptor> {
        match name {
            "sendMessage" => self.send_message(),
            "addReaction" => self.add_reaction(),
            "pinMessage" => self.pin_message(),
            "deleteMessage" => self.delete_message(),
            _ => Err(unknown(name)),
        }
    }
}
