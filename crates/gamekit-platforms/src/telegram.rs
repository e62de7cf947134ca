use gamekit_config::TelegramConfig;
use gamekit_core::{
    ArgType, FunctionDescriptor, GameError, HttpMethod, InvocationResult, Invoker, PayloadField,
    RequestTemplate, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::registry::{FunctionRegistry, unknown};

const PLATFORM: &str = "telegram";

const NAMES: &[&str] = &[
    "sendMessage",
    "sendMedia",
    "createPoll",
    "updatePinnedMessage",
    "deleteMessages",
];

/// Telegram Bot API function descriptors.
#[derive(Debug, Clone)]
pub struct TelegramFunctions {
    /// `{api_base}/bot{token}`
    base_url: String,
}

impl TelegramFunctions {
    pub fn new(bot_token: &str, api_base: &str) -> Self {
        Self {
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
        }
    }

    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            GameError::Config("telegram.bot_token is not set (or TELEGRAM_BOT_TOKEN)".into())
        })?;
        Ok(Self::new(token, &config.api_base))
    }

    fn template(&self, method: &str) -> RequestTemplate {
        RequestTemplate::new(HttpMethod::Post, format!("{}/{}", self.base_url, method))
            .header("Content-Type", "application/json")
            .platform(PLATFORM)
    }

    pub fn send_message(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder(
            "send_message",
            "Send a text message that is contextually appropriate and adds value to the conversation. Consider chat type (private/group) and ongoing discussion context.",
        )
        .arg(
            "chat_id",
            "Unique identifier for the target chat or username of the target channel",
            ArgType::String,
        )
        .arg(
            "text",
            "Message text to send. Should be contextually relevant and maintain conversation flow.",
            ArgType::String,
        )
        .request(
            self.template("sendMessage")
                .field("chat_id", "{{chat_id}}")
                .field("text", "{{text}}")
                .on_success("Message sent successfully. Message ID: {{response.result.message_id}}")
                .on_error("Failed to send message: {{response.description}}"),
        )
        .build()
    }

    /// The media type picks both the endpoint (`sendphoto`, `sendvideo`, ...)
    /// and the payload key holding the file.
    pub fn send_media(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder(
            "send_media",
            "Send a media message (photo, document, video, etc.) with optional caption. Use when visual or document content adds value to the conversation.",
        )
        .arg("chat_id", "Target chat identifier where media will be sent", ArgType::String)
        .arg(
            "media_type",
            "Type of media to send: 'photo', 'document', 'video', 'audio'. Choose appropriate type for content.",
            ArgType::String,
        )
        .arg(
            "media",
            "File ID or URL of the media to send. Ensure content is appropriate and relevant.",
            ArgType::String,
        )
        .arg(
            "caption",
            "Optional text caption accompanying the media. Should provide context or explanation when needed, or follows up the conversation.",
            ArgType::String,
        )
        .request(
            self.template("send{{media_type}}")
                .field("chat_id", "{{chat_id}}")
                .field("{{media_type}}", "{{media}}")
                .field("caption", "{{caption}}")
                .on_success(
                    "Media sent successfully. Type: {{media_type}}, Message ID: {{response.result.message_id}}",
                )
                .on_error("Failed to send media: {{response.description}}"),
        )
        .build()
    }

    pub fn create_poll(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder(
            "create_poll",
            "Create an interactive poll to gather user opinions or make group decisions. Useful for engagement and collecting feedback.",
        )
        .arg("chat_id", "Chat where the poll will be created", ArgType::String)
        .arg("question", "Main poll question. Should be clear and specific.", ArgType::String)
        .arg(
            "options",
            "List of answer options. Make options clear and mutually exclusive.",
            ArgType::Array,
        )
        .arg(
            "is_anonymous",
            "Whether poll responses are anonymous. Consider privacy and group dynamics.",
            ArgType::Boolean,
        )
        .request(
            self.template("sendPoll")
                .field("chat_id", "{{chat_id}}")
                .field("question", "{{question}}")
                .field("options", PayloadField::binding("options"))
                .field("is_anonymous", PayloadField::binding("is_anonymous"))
                .on_success("Poll created successfully. Poll ID: {{response.result.poll.id}}")
                .on_error("Failed to create poll: {{response.description}}"),
        )
        .build()
    }

    pub fn update_pinned_message(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder(
            "update_pinned_message",
            "Pin an important message in a chat. Use for announcements, important information, or group rules.",
        )
        .arg("chat_id", "Chat where the message will be pinned", ArgType::String)
        .arg(
            "message_id",
            "ID of the message to pin. Ensure message contains valuable information worth pinning.",
            ArgType::String,
        )
        .arg(
            "disable_notification",
            "Whether to send notification about pinned message. Consider group size and message importance.",
            ArgType::Boolean,
        )
        .request(
            self.template("pinChatMessage")
                .field("chat_id", "{{chat_id}}")
                .field("message_id", "{{message_id}}")
                .field("disable_notification", PayloadField::binding("disable_notification"))
                .on_success("Message pinned successfully")
                .on_error("Failed to pin message: {{response.description}}"),
        )
        .build()
    }

    /// Deletes one message per call; see [`TelegramClient::delete_messages`]
    /// for the batch form.
    pub fn delete_messages(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder(
            "delete_messages",
            "Delete multiple messages from a chat. Use for moderation or cleaning up outdated information.",
        )
        .arg("chat_id", "Chat containing the messages to delete", ArgType::String)
        .arg(
            "message_id",
            "IDs of the messages to delete. Consider impact before deletion.",
            ArgType::String,
        )
        .request(
            self.template("deleteMessage")
                .field("chat_id", "{{chat_id}}")
                .field("message_id", "{{message_id}}")
                .on_success("Message deleted successfully")
                .on_error("Failed to delete message: {{response.description}}"),
        )
        .build()
    }

    /// Not listed in the registry; used by [`TelegramClient::set_webhook`].
    pub fn set_webhook(&self) -> Result<FunctionDescriptor> {
        FunctionDescriptor::builder("set_webhook", "Register the URL Telegram pushes updates to.")
            .arg("url", "HTTPS URL that will receive updates", ArgType::String)
            .request(
                self.template("setWebhook")
                    .field("url", "{{url}}")
                    .on_success("Webhook set successfully: {{response.description}}")
                    .on_error("Failed to set webhook: {{response.description}}"),
            )
            .build()
    }
}

impl FunctionRegistry for TelegramFunctions {
    fn platform(&self) -> &str {
        PLATFORM
    }

    fn names(&self) -> &'static [&'static str] {
        NAMES
    }

    fn function(&self, name: &str) -> Result<FunctionDescriptor> {
        match name {
            "sendMessage" => self.send_message(),
            "sendMedia" => self.send_media(),
            "createPoll" => self.create_poll(),
            "updatePinnedMessage" => self.update_pinned_message(),
            "deleteMessages" => self.delete_messages(),
            _ => Err(unknown(name)),
        }
    }
}

// ── Webhook ────────────────────────────────────────────────────

/// Chat and text extracted from an incoming Telegram update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookMessage {
    pub chat_id: i64,
    pub text: String,
}

/// Extract `{chat_id, text}` from a Telegram update payload.
pub fn parse_webhook(update: &Value) -> Result<WebhookMessage> {
    let msg = update
        .get("message")
        .filter(|m| m.is_object())
        .ok_or_else(|| GameError::InvalidPayload("update has no message".into()))?;
    let text = msg["text"]
        .as_str()
        .ok_or_else(|| GameError::InvalidPayload("message has no text".into()))?;
    let chat_id = msg["chat"]["id"]
        .as_i64()
        .ok_or_else(|| GameError::InvalidPayload("message has no chat.id".into()))?;

    debug!(chat_id, text_len = text.len(), "received webhook message");
    Ok(WebhookMessage {
        chat_id,
        text: text.to_string(),
    })
}

// ── Client ─────────────────────────────────────────────────────

/// Telegram registry bound to an invoker.
#[derive(Clone)]
pub struct TelegramClient {
    functions: TelegramFunctions,
    invoker: Invoker,
}

impl TelegramClient {
    pub fn new(functions: TelegramFunctions, invoker: Invoker) -> Self {
        Self { functions, invoker }
    }

    pub fn registry(&self) -> &TelegramFunctions {
        &self.functions
    }

    /// Look up `name` and invoke it with positional `args`.
    pub async fn invoke(&self, name: &str, args: &[Value]) -> Result<Value> {
        let function = self.functions.function(name)?;
        self.invoker.invoke(&function, args).await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<Value> {
        let function = self.functions.set_webhook()?;
        let body = self.invoker.invoke(&function, &[json!(url)]).await?;
        info!(url, "webhook registered");
        Ok(body)
    }

    /// Delete each message in turn. A failed id is recorded and the rest are
    /// still attempted.
    pub async fn delete_messages(
        &self,
        chat_id: &str,
        message_ids: &[i64],
    ) -> Result<BTreeMap<i64, InvocationResult>> {
        let function = self.functions.delete_messages()?;
        let mut results = BTreeMap::new();
        for &id in message_ids {
            let outcome = match self
                .invoker
                .dispatch(&function, &[json!(chat_id), json!(id.to_string())])
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => InvocationResult::Failure(json!(e.to_string())),
            };
            if !outcome.is_success() {
                warn!(
                    chat_id,
                    message_id = id,
                    reason = %outcome.value(),
                    "failed to delete message"
                );
            }
            results.insert(id, outcome);
        }
        Ok(results)
    }

    pub fn webhook(&self, update: &Value) -> Result<WebhookMessage> {
        parse_webhook(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trims_slash() {
        let f = TelegramFunctions::new("T", "https://api.telegram.org/");
        assert_eq!(
            f.send_message().unwrap().config().url,
            "https://api.telegram.org/botT/sendMessage"
        );
    }

    #[test]
    fn test_from_config_requires_token() {
        let err = TelegramFunctions::from_config(&TelegramConfig::default()).unwrap_err();
        assert!(matches!(err, GameError::Config(_)));
    }

    #[test]
    fn test_every_listed_name_resolves() {
        let f = TelegramFunctions::new("T", "https://api.telegram.org");
        for name in f.names() {
            let descriptor = f.function(name).unwrap();
            assert_eq!(descriptor.config().platform.as_deref(), Some("telegram"));
        }
        assert_eq!(f.functions().len(), 5);
    }

    #[test]
    fn test_webhook_missing_message() {
        assert!(matches!(
            parse_webhook(&json!({"update_id": 1})),
            Err(GameError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_webhook_missing_chat_id() {
        let update = json!({"message": {"text": "hi", "chat": {}}});
        assert!(matches!(parse_webhook(&update), Err(GameError::InvalidPayload(_))));
    }
}
