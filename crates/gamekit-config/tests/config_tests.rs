#[cfg(test)]
mod tests {
    use gamekit_config::ConfigLoader;
    use gamekit_config::schema::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_game_config_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.game.api_url, "https://game-api.virtuals.io/api");
        assert!(config.game.api_key.is_none());
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert_eq!(config.discord.api_base, "https://discord.com/api/v10");
        assert_eq!(config.agent.main_heartbeat, 15);
        assert_eq!(config.agent.reaction_heartbeat, 5);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.connect_timeout_secs, 10);
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = GameConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: GameConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.game.api_url, config.game.api_url);
        assert_eq!(restored.agent.main_heartbeat, config.agent.main_heartbeat);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            [agent]
            goal = "grow the community"
            functions = ["wait", "post_tweet"]

            [telegram]
            bot_token = "123:abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.agent.goal, "grow the community");
        assert_eq!(config.agent.functions, vec!["wait", "post_tweet"]);
        assert_eq!(config.agent.main_heartbeat, 15);
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_default_config_is_valid() {
        let warnings = GameConfig::default().validate().unwrap();
        assert!(warnings.iter().all(|w| w.severity != WarningSeverity::Error));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = GameConfig::default();
        config.http.timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.contains("http.timeout_secs"));
    }

    #[test]
    fn test_non_http_url_is_error() {
        let mut config = GameConfig::default();
        config.telegram.api_base = "ftp://api.telegram.org".into();
        let err = config.validate().unwrap_err();
        assert!(err.contains("telegram.api_base"));
    }

    #[test]
    fn test_trailing_slash_is_warning() {
        let mut config = GameConfig::default();
        config.discord.api_base = "https://discord.com/api/v10/".into();
        let warnings = config.validate().unwrap();
        assert!(warnings
            .iter()
            .any(|w| w.field == "discord.api_base" && w.severity == WarningSeverity::Warning));
    }

    #[test]
    fn test_unknown_log_format_is_warning() {
        let mut config = GameConfig::default();
        config.logging.format = "xml".into();
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "logging.format"));
    }

    // ── Env override tests ─────────────────────────────────────

    #[test]
    fn test_env_fills_missing_credentials() {
        let env: HashMap<&str, &str> = [
            ("VIRTUALS_API_KEY", "vk"),
            ("TELEGRAM_BOT_TOKEN", "1:t"),
            ("GAMEKIT_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();
        let config = ConfigLoader::apply_env_overrides(GameConfig::default(), |k| {
            env.get(k).map(|v| v.to_string())
        });
        assert_eq!(config.game.api_key.as_deref(), Some("vk"));
        assert_eq!(config.telegram.bot_token.as_deref(), Some("1:t"));
        assert!(config.discord.bot_token.is_none());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_file_credentials_win_over_env() {
        let mut config = GameConfig::default();
        config.game.api_key = Some("from-file".into());
        let config = ConfigLoader::apply_env_overrides(config, |k| {
            (k == "VIRTUALS_API_KEY").then(|| "from-env".to_string())
        });
        assert_eq!(config.game.api_key.as_deref(), Some("from-file"));
    }

    // ── Loader tests ───────────────────────────────────────────

    #[test]
    fn test_load_from_file() {
        let file = write_config("[game]\napi_key = \"k\"\n\n[agent]\nmain_heartbeat = 30\n");
        let loader = ConfigLoader::load_with_env(Some(file.path()), no_env).unwrap();
        let config = loader.get();
        assert_eq!(config.game.api_key.as_deref(), Some("k"));
        assert_eq!(config.agent.main_heartbeat, 30);
        assert_eq!(loader.path(), file.path());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loader = ConfigLoader::load_with_env(Some(&path), no_env).unwrap();
        assert_eq!(loader.get().agent.reaction_heartbeat, 5);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let file = write_config("[agent\nmain_heartbeat = ");
        assert!(ConfigLoader::load_with_env(Some(file.path()), no_env).is_err());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let file = write_config("[agent]\nmain_heartbeat = 0\n");
        let err = ConfigLoader::load_with_env(Some(file.path()), no_env).unwrap_err();
        assert!(err.to_string().contains("agent.main_heartbeat"));
    }

    #[test]
    fn test_reload_updates_shared_config() {
        let mut file = write_config("[agent]\ngoal = \"first\"\n");
        let loader = ConfigLoader::load_with_env(Some(file.path()), no_env).unwrap();
        let shared = loader.shared();
        assert_eq!(shared.read().agent.goal, "first");

        file.as_file_mut().set_len(0).unwrap();
        std::fs::write(file.path(), "[agent]\ngoal = \"second\"\n").unwrap();
        loader.reload().unwrap();
        assert_eq!(shared.read().agent.goal, "second");
    }

    #[test]
    fn test_reload_keeps_injected_env() {
        let mut file = write_config("[agent]\ngoal = \"first\"\n");
        let loader = ConfigLoader::load_with_env(Some(file.path()), |k| {
            (k == "VIRTUALS_API_KEY").then(|| "injected".to_string())
        })
        .unwrap();
        assert_eq!(loader.get().game.api_key.as_deref(), Some("injected"));

        file.as_file_mut().set_len(0).unwrap();
        std::fs::write(file.path(), "[agent]\ngoal = \"second\"\n").unwrap();
        loader.reload().unwrap();
        let config = loader.get();
        assert_eq!(config.agent.goal, "second");
        assert_eq!(config.game.api_key.as_deref(), Some("injected"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = std::path::Path::new("/tmp/explicit.toml");
        assert_eq!(ConfigLoader::resolve_path(Some(path)), path);
    }
}
