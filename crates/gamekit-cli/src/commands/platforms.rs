use gamekit_config::GameConfig;
use gamekit_core::{Event, EventBus, GameError, Invoker, Result};
use gamekit_platforms::{
    FunctionRegistry, TelegramClient, TelegramFunctions, parse_webhook, registry_for,
};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::info;

use super::{parse_arg, print_json, transport};

pub(super) fn cmd_functions(config: &GameConfig, platform: &str) -> Result<()> {
    let registry = registry_for(platform, config)?;
    let functions = registry.functions();
    let width = functions.keys().map(String::len).max().unwrap_or(0);
    for (name, description) in &functions {
        println!("{name:<width$}  {description}");
    }
    Ok(())
}

pub(super) fn cmd_describe(config: &GameConfig, platform: &str, name: &str) -> Result<()> {
    let function = registry_for(platform, config)?.function(name)?;
    print_json(&function.to_json()?)
}

pub(super) async fn cmd_invoke(
    config: &GameConfig,
    platform: &str,
    name: &str,
    raw_args: &[String],
) -> Result<()> {
    let function = registry_for(platform, config)?.function(name)?;
    let args: Vec<Value> = raw_args
        .iter()
        .enumerate()
        .map(|(i, raw)| parse_arg(raw, function.args().get(i).map(|a| a.arg_type)))
        .collect();

    let events = EventBus::default();
    let mut rx = events.subscribe();
    let invoker = Invoker::new(transport(config)).with_events(events);
    let result = invoker.invoke(&function, &args).await;

    while let Ok(event) = rx.try_recv() {
        if let Event::Feedback { message, .. } = event {
            eprintln!("{message}");
        }
    }
    print_json(&result?)
}

fn telegram_client(config: &GameConfig) -> Result<TelegramClient> {
    Ok(TelegramClient::new(
        TelegramFunctions::from_config(&config.telegram)?,
        Invoker::new(transport(config)),
    ))
}

pub(super) async fn cmd_delete_messages(
    config: &GameConfig,
    chat_id: &str,
    message_ids: &[i64],
) -> Result<()> {
    let results = telegram_client(config)?
        .delete_messages(chat_id, message_ids)
        .await?;
    let failed = results.values().filter(|r| !r.is_success()).count();
    for (id, outcome) in &results {
        let status = if outcome.is_success() { "deleted" } else { "failed" };
        println!("{id}: {status}");
    }
    if failed > 0 {
        return Err(GameError::RequestFailed {
            function: "delete_messages".into(),
            reason: format!("{failed} of {} deletions failed", results.len()),
        });
    }
    Ok(())
}

pub(super) fn cmd_webhook(file: &Path) -> Result<()> {
    let raw = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)?
    };
    let update: Value = serde_json::from_str(&raw)
        .map_err(|e| GameError::InvalidPayload(format!("update is not JSON: {e}")))?;
    print_json(&parse_webhook(&update)?)
}

pub(super) async fn cmd_set_webhook(config: &GameConfig, url: &str) -> Result<()> {
    let body = telegram_client(config)?.set_webhook(url).await?;
    info!(url, "telegram webhook updated");
    print_json(&body)
}
