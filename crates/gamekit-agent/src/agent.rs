use gamekit_config::GameConfig;
use gamekit_core::{FunctionDescriptor, HttpTransport, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::client::{DeployArgs, GameClient, GameState, ReactArgs, SimulateArgs};

/// Serialized form of an agent, as written by [`Agent::export`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentExport {
    pub goal: String,
    pub description: String,
    pub world_info: String,
    /// Enabled default functions.
    pub functions: Vec<String>,
    pub custom_functions: Vec<FunctionDescriptor>,
}

impl AgentExport {
    /// Export straight from the `[agent]` section; needs no API key.
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            goal: config.agent.goal.clone(),
            description: config.agent.description.clone(),
            world_info: config.agent.world_info.clone(),
            functions: config.agent.functions.clone(),
            custom_functions: Vec::new(),
        }
    }

    /// Pretty JSON with a 4-space indent.
    pub fn to_json_string(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// An agent hosted by the GAME backend.
pub struct Agent {
    client: GameClient,
    goal: String,
    description: String,
    world_info: String,
    main_heartbeat: u32,
    reaction_heartbeat: u32,
    enabled_functions: Vec<String>,
    custom_functions: Vec<FunctionDescriptor>,
}

impl Agent {
    pub fn new(client: GameClient) -> Self {
        Self {
            client,
            goal: String::new(),
            description: String::new(),
            world_info: String::new(),
            main_heartbeat: 15,
            reaction_heartbeat: 5,
            enabled_functions: Vec::new(),
            custom_functions: Vec::new(),
        }
    }

    /// Build an agent from the `[game]` and `[agent]` config sections.
    pub fn from_config(config: &GameConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let client = GameClient::from_config(&config.game, transport)?;
        let mut agent = Self::new(client);
        agent.goal = config.agent.goal.clone();
        agent.description = config.agent.description.clone();
        agent.world_info = config.agent.world_info.clone();
        agent.main_heartbeat = config.agent.main_heartbeat;
        agent.reaction_heartbeat = config.agent.reaction_heartbeat;
        agent.enabled_functions = config.agent.functions.clone();
        Ok(agent)
    }

    /// Rebuild an agent from an export. Heartbeats keep their defaults.
    pub fn import(client: GameClient, export: AgentExport) -> Self {
        let mut agent = Self::new(client);
        agent.goal = export.goal;
        agent.description = export.description;
        agent.world_info = export.world_info;
        agent.enabled_functions = export.functions;
        agent.custom_functions = export.custom_functions;
        agent
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) {
        self.goal = goal.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_world_info(&mut self, world_info: impl Into<String>) {
        self.world_info = world_info.into();
    }

    pub fn set_main_heartbeat(&mut self, minutes: u32) {
        self.main_heartbeat = minutes;
    }

    pub fn set_reaction_heartbeat(&mut self, minutes: u32) {
        self.reaction_heartbeat = minutes;
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn world_info(&self) -> &str {
        &self.world_info
    }

    pub fn main_heartbeat(&self) -> u32 {
        self.main_heartbeat
    }

    pub fn reaction_heartbeat(&self) -> u32 {
        self.reaction_heartbeat
    }

    pub fn enabled_functions(&self) -> &[String] {
        &self.enabled_functions
    }

    pub fn custom_functions(&self) -> &[FunctionDescriptor] {
        &self.custom_functions
    }

    pub async fn list_available_default_twitter_functions(
        &self,
    ) -> Result<BTreeMap<String, String>> {
        self.client.get_functions().await
    }

    /// Replace the set of enabled default functions.
    pub fn use_default_twitter_functions<I, S>(&mut self, functions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_functions = functions.into_iter().map(Into::into).collect();
    }

    pub fn add_custom_function(&mut self, function: FunctionDescriptor) {
        self.custom_functions.push(function);
    }

    pub async fn simulate_twitter(&self, session_id: &str) -> Result<Value> {
        let args = SimulateArgs {
            session_id: session_id.to_string(),
            goal: self.goal.clone(),
            description: self.description.clone(),
            world_info: self.world_info.clone(),
            functions: self.enabled_functions.clone(),
            custom_functions: self.custom_functions.clone(),
        };
        self.client.simulate(&args).await
    }

    pub async fn react(
        &self,
        session_id: &str,
        platform: &str,
        tweet_id: Option<String>,
        event: Option<String>,
        task: Option<String>,
    ) -> Result<Value> {
        let args = ReactArgs {
            platform: platform.to_string(),
            session_id: session_id.to_string(),
            goal: self.goal.clone(),
            description: self.description.clone(),
            world_info: self.world_info.clone(),
            functions: self.enabled_functions.clone(),
            custom_functions: self.custom_functions.clone(),
            event,
            task,
            tweet_id,
        };
        self.client.react(&args).await
    }

    pub async fn deploy_twitter(&self) -> Result<Value> {
        let args = DeployArgs {
            goal: self.goal.clone(),
            description: self.description.clone(),
            world_info: self.world_info.clone(),
            functions: self.enabled_functions.clone(),
            custom_functions: self.custom_functions.clone(),
            game_state: GameState {
                main_heartbeat: self.main_heartbeat,
                reaction_heartbeat: self.reaction_heartbeat,
            },
        };
        let result = self.client.deploy(&args).await?;
        info!(
            functions = self.enabled_functions.len(),
            custom_functions = self.custom_functions.len(),
            "agent deployed"
        );
        Ok(result)
    }

    pub fn to_export(&self) -> AgentExport {
        AgentExport {
            goal: self.goal.clone(),
            description: self.description.clone(),
            world_info: self.world_info.clone(),
            functions: self.enabled_functions.clone(),
            custom_functions: self.custom_functions.clone(),
        }
    }

    /// Pretty JSON with a 4-space indent.
    pub fn export(&self) -> Result<String> {
        self.to_export().to_json_string()
    }
}
