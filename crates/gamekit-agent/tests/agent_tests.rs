#[cfg(test)]
mod tests {
    use gamekit_agent::*;
    use gamekit_config::GameConfig;
    use gamekit_core::mock::MockTransport;
    use gamekit_core::{ArgType, FunctionDescriptor, GameError, HttpMethod, RequestTemplate};
    use serde_json::json;
    use std::sync::Arc;

    const API: &str = "https://game-api.virtuals.io/api";

    fn agent(transport: &MockTransport) -> Agent {
        let mut agent = Agent::new(GameClient::new("secret", Arc::new(transport.clone())));
        agent.set_goal("Grow the community");
        agent.set_description("A friendly bot");
        agent.set_world_info("Crypto twitter");
        agent.use_default_twitter_functions(["wait", "post_tweet"]);
        agent
    }

    fn ping() -> FunctionDescriptor {
        FunctionDescriptor::builder("ping", "Ping a host")
            .id("fn-1")
            .arg("host", "Host to ping", ArgType::String)
            .request(RequestTemplate::new(HttpMethod::Get, "https://{{host}}/ping"))
            .build()
            .unwrap()
    }

    // ── Client tests ───────────────────────────────────────────

    #[tokio::test]
    async fn test_get_functions() {
        let transport = MockTransport::new().with_response(
            200,
            json!({"data": [
                {"fn_name": "wait", "fn_description": "Wait"},
                {"fn_name": "post_tweet", "fn_description": "Post a tweet"}
            ]}),
        );
        let functions = agent(&transport)
            .list_available_default_twitter_functions()
            .await
            .unwrap();

        assert_eq!(functions.len(), 2);
        assert_eq!(functions["post_tweet"], "Post a tweet");
        let req = &transport.requests()[0];
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, format!("{API}/functions"));
        assert_eq!(req.headers["x-api-key"], "secret");
    }

    #[tokio::test]
    async fn test_simulate_wraps_data() {
        let transport = MockTransport::new().with_response(200, json!({"data": {"ok": 1}}));
        let mut a = agent(&transport);
        a.add_custom_function(ping());
        let result = a.simulate_twitter("session-1").await.unwrap();

        assert_eq!(result, json!({"ok": 1}));
        let req = &transport.requests()[0];
        assert_eq!(req.url, format!("{API}/simulate"));
        let data = &req.body.as_ref().unwrap()["data"];
        assert_eq!(data["sessionId"], "session-1");
        assert_eq!(data["goal"], "Grow the community");
        assert_eq!(data["worldInfo"], "Crypto twitter");
        assert_eq!(data["functions"], json!(["wait", "post_tweet"]));
        assert_eq!(data["customFunctions"][0]["fn_name"], "ping");
        assert_eq!(data["customFunctions"][0]["id"], "fn-1");
    }

    #[tokio::test]
    async fn test_react_omits_unset_fields() {
        let transport = MockTransport::new();
        agent(&transport)
            .react("s", "twitter", Some("123".into()), None, None)
            .await
            .unwrap();

        let req = &transport.requests()[0];
        assert_eq!(req.url, format!("{API}/react/twitter"));
        let data = req.body.as_ref().unwrap()["data"].as_object().unwrap();
        assert_eq!(data["tweetId"], "123");
        assert!(!data.contains_key("event"));
        assert!(!data.contains_key("task"));
        assert!(!data.contains_key("platform"));
    }

    #[tokio::test]
    async fn test_deploy_sends_game_state() {
        let transport = MockTransport::new().with_response(200, json!({"data": {"id": "agent-1"}}));
        let mut a = agent(&transport);
        a.set_main_heartbeat(30);
        let result = a.deploy_twitter().await.unwrap();

        assert_eq!(result["id"], "agent-1");
        let requests = transport.requests();
        let data = &requests[0].body.as_ref().unwrap()["data"];
        assert_eq!(data["gameState"], json!({"mainHeartbeat": 30, "reactionHeartbeat": 5}));
    }

    #[tokio::test]
    async fn test_backend_error_is_request_failed() {
        let transport =
            MockTransport::new().with_response(401, json!({"error": "invalid api key"}));
        let err = agent(&transport).deploy_twitter().await.unwrap_err();
        match err {
            GameError::RequestFailed { function, reason } => {
                assert_eq!(function, "deploy");
                assert!(reason.contains("invalid api key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_is_rethrown() {
        let transport = MockTransport::new().with_error("dns failure");
        let err = agent(&transport).simulate_twitter("s").await.unwrap_err();
        assert!(matches!(err, GameError::Transport { .. }));
    }

    // ── Export tests ───────────────────────────────────────────

    #[test]
    fn test_export_import_keeps_functions() {
        let transport = MockTransport::new();
        let mut a = agent(&transport);
        let function = ping();
        a.add_custom_function(function.clone());
        let exported = a.export().unwrap();

        let parsed: AgentExport = serde_json::from_str(&exported).unwrap();
        assert_eq!(parsed.goal, "Grow the community");
        assert_eq!(parsed.functions, vec!["wait", "post_tweet"]);
        assert_eq!(parsed.custom_functions, vec![function]);

        let restored = Agent::import(GameClient::new("k", Arc::new(transport)), parsed);
        assert_eq!(restored.world_info(), "Crypto twitter");
        assert_eq!(restored.custom_functions().len(), 1);
    }

    // ── Config tests ───────────────────────────────────────────

    #[test]
    fn test_from_config() {
        let mut config = GameConfig::default();
        config.game.api_key = Some("k".into());
        config.game.api_url = "https://staging.example/api/".into();
        config.agent.goal = "g".into();
        config.agent.reaction_heartbeat = 9;
        config.agent.functions = vec!["wait".into()];

        let a = Agent::from_config(&config, Arc::new(MockTransport::new())).unwrap();
        assert_eq!(a.goal(), "g");
        assert_eq!(a.reaction_heartbeat(), 9);
        assert_eq!(a.enabled_functions(), ["wait".to_string()]);
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let err = Agent::from_config(&GameConfig::default(), Arc::new(MockTransport::new()))
            .err()
            .unwrap();
        assert!(matches!(err, GameError::Config(_)));
    }

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let client = GameClient::new("k", Arc::new(MockTransport::new()))
            .with_api_url("https://staging.example/api/");
        assert_eq!(client.api_url(), "https://staging.example/api");
    }
}
