use gamekit_config::GameApiConfig;
use gamekit_core::{
    FunctionDescriptor, GameError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, Result,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Body of `POST /simulate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateArgs {
    pub session_id: String,
    pub goal: String,
    pub description: String,
    pub world_info: String,
    pub functions: Vec<String>,
    pub custom_functions: Vec<FunctionDescriptor>,
}

/// Body of `POST /react/{platform}`. `event`, `task` and `tweet_id` are only
/// sent when set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactArgs {
    #[serde(skip)]
    pub platform: String,
    pub session_id: String,
    pub goal: String,
    pub description: String,
    pub world_info: String,
    pub functions: Vec<String>,
    pub custom_functions: Vec<FunctionDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_id: Option<String>,
}

/// Heartbeat intervals, in minutes, of a deployed agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub main_heartbeat: u32,
    pub reaction_heartbeat: u32,
}

/// Body of `POST /deploy`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployArgs {
    pub goal: String,
    pub description: String,
    pub world_info: String,
    pub functions: Vec<String>,
    pub custom_functions: Vec<FunctionDescriptor>,
    pub game_state: GameState,
}

/// HTTP client for the hosted GAME API.
///
/// Every call carries the `x-api-key` header. POST bodies are wrapped as
/// `{"data": ...}` and the `data` field of the response is returned.
#[derive(Clone)]
pub struct GameClient {
    api_url: String,
    api_key: String,
    transport: Arc<dyn HttpTransport>,
}

impl GameClient {
    pub fn new(api_key: impl Into<String>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_url: GameApiConfig::default().api_url,
            api_key: api_key.into(),
            transport,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn from_config(config: &GameApiConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            GameError::Config("game.api_key is not set (or VIRTUALS_API_KEY)".into())
        })?;
        Ok(Self::new(api_key, transport).with_api_url(&config.api_url))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Default functions offered by the backend, name to description.
    pub async fn get_functions(&self) -> Result<BTreeMap<String, String>> {
        let request = HttpRequest::new(HttpMethod::Get, format!("{}/functions", self.api_url))
            .header("x-api-key", self.api_key.as_str());
        let response = self.send("functions", request).await?;

        let functions = response.body["data"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let name = item["fn_name"].as_str()?;
                        let description = item["fn_description"].as_str().unwrap_or_default();
                        Some((name.to_string(), description.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(functions)
    }

    pub async fn simulate(&self, args: &SimulateArgs) -> Result<Value> {
        self.post("simulate", "/simulate".into(), args).await
    }

    pub async fn react(&self, args: &ReactArgs) -> Result<Value> {
        self.post("react", format!("/react/{}", args.platform), args)
            .await
    }

    pub async fn deploy(&self, args: &DeployArgs) -> Result<Value> {
        self.post("deploy", "/deploy".into(), args).await
    }

    async fn post<T: Serialize>(&self, operation: &str, path: String, data: &T) -> Result<Value> {
        let request = HttpRequest::new(HttpMethod::Post, format!("{}{}", self.api_url, path))
            .header("x-api-key", self.api_key.as_str())
            .json(json!({ "data": data }));
        let response = self.send(operation, request).await?;
        Ok(response.body.get("data").cloned().unwrap_or(Value::Null))
    }

    async fn send(&self, operation: &str, request: HttpRequest) -> Result<HttpResponse> {
        debug!(operation, url = %request.url, "calling GAME API");
        let response = self.transport.send(request).await.inspect_err(|e| {
            error!(operation, error = %e, "GAME API request failed");
        })?;

        if !response.is_success() {
            error!(
                operation,
                status = response.status,
                body = %response.body,
                "GAME API returned an error"
            );
            let reason = if response.body.is_null() {
                format!("HTTP {}", response.status)
            } else {
                serde_json::to_string(&response.body)?
            };
            return Err(GameError::RequestFailed {
                function: operation.to_string(),
                reason,
            });
        }
        Ok(response)
    }
}
