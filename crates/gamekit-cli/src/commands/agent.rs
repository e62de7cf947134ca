use gamekit_agent::{Agent, AgentExport};
use gamekit_config::GameConfig;
use gamekit_core::{FunctionDescriptor, GameError, Result};
use std::path::Path;
use uuid::Uuid;

use super::{print_json, transport};

pub(super) struct ReactOptions {
    pub platform: String,
    pub session: Option<String>,
    pub tweet_id: Option<String>,
    pub event: Option<String>,
    pub task: Option<String>,
}

/// Descriptors from a JSON array file; none when no file is given.
fn read_custom_functions(path: Option<&Path>) -> Result<Vec<FunctionDescriptor>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| GameError::Config(format!("failed to parse {}: {}", path.display(), e)))
}

/// Agent from config plus any custom functions listed in `custom_functions`.
fn load_agent(config: &GameConfig, custom_functions: Option<&Path>) -> Result<Agent> {
    let mut agent = Agent::from_config(config, transport(config))?;
    for function in read_custom_functions(custom_functions)? {
        agent.add_custom_function(function);
    }
    Ok(agent)
}

fn session_id(session: Option<String>) -> String {
    session.unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub(super) async fn cmd_game_functions(config: &GameConfig) -> Result<()> {
    let functions = load_agent(config, None)?
        .list_available_default_twitter_functions()
        .await?;
    for (name, description) in &functions {
        println!("{name}: {description}");
    }
    Ok(())
}

/// Export works offline, so it never asks for `game.api_key`.
pub(super) fn cmd_export(config: &GameConfig, custom_functions: Option<&Path>) -> Result<()> {
    let mut export = AgentExport::from_config(config);
    export.custom_functions = read_custom_functions(custom_functions)?;
    println!("{}", export.to_json_string()?);
    Ok(())
}

pub(super) async fn cmd_simulate(
    config: &GameConfig,
    session: Option<String>,
    custom_functions: Option<&Path>,
) -> Result<()> {
    let agent = load_agent(config, custom_functions)?;
    let session = session_id(session);
    eprintln!("session: {session}");
    print_json(&agent.simulate_twitter(&session).await?)
}

pub(super) async fn cmd_react(
    config: &GameConfig,
    options: ReactOptions,
    custom_functions: Option<&Path>,
) -> Result<()> {
    let agent = load_agent(config, custom_functions)?;
    let result = agent
        .react(
            &session_id(options.session),
            &options.platform,
            options.tweet_id,
            options.event,
            options.task,
        )
        .await?;
    print_json(&result)
}

pub(super) async fn cmd_deploy(config: &GameConfig, custom_functions: Option<&Path>) -> Result<()> {
    let agent = load_agent(config, custom_functions)?;
    print_json(&agent.deploy_twitter().await?)
}
