use serde::{Deserialize, Serialize};

/// Root configuration, mapped to `gamekit.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub game: GameApiConfig,
    pub telegram: TelegramConfig,
    pub discord: DiscordConfig,
    pub agent: AgentConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

// ── GAME backend ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameApiConfig {
    /// Base URL of the hosted GAME API.
    pub api_url: String,
    /// Sent as `x-api-key`. Falls back to `VIRTUALS_API_KEY`.
    pub api_key: Option<String>,
}

impl Default for GameApiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://game-api.virtuals.io/api".into(),
            api_key: None,
        }
    }
}

// ── Telegram ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Falls back to `TELEGRAM_BOT_TOKEN`.
    pub bot_token: Option<String>,
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: "https://api.telegram.org".into(),
        }
    }
}

// ── Discord ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Falls back to `DISCORD_BOT_TOKEN`.
    pub bot_token: Option<String>,
    pub api_base: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_base: "https://discord.com/api/v10".into(),
        }
    }
}

// ── Agent ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub goal: String,
    pub description: String,
    pub world_info: String,
    /// Minutes between main-loop runs of a deployed agent.
    pub main_heartbeat: u32,
    /// Minutes between reaction runs of a deployed agent.
    pub reaction_heartbeat: u32,
    /// Default functions enabled on the hosted agent.
    pub functions: Vec<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            goal: String::new(),
            description: String::new(),
            world_info: String::new(),
            main_heartbeat: 15,
            reaction_heartbeat: 5,
            functions: vec![],
        }
    }
}

// ── HTTP ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "json", "compact".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

/// A single config validation issue.
#[derive(Debug)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            WarningSeverity::Error => "error",
            WarningSeverity::Warning => "warning",
            WarningSeverity::Info => "info",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

fn check_url(field: &str, url: &str, warnings: &mut Vec<ConfigWarning>) {
    if url.trim().is_empty() {
        warnings.push(ConfigWarning {
            field: field.into(),
            message: "URL is empty".into(),
            severity: WarningSeverity::Error,
            hint: Some("Remove the key to use the default".into()),
        });
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        warnings.push(ConfigWarning {
            field: field.into(),
            message: format!("'{}' is not an http(s) URL", url),
            severity: WarningSeverity::Error,
            hint: None,
        });
    } else if url.ends_with('/') {
        warnings.push(ConfigWarning {
            field: field.into(),
            message: "trailing slash will produce '//' in request paths".into(),
            severity: WarningSeverity::Warning,
            hint: Some(format!("Use '{}'", url.trim_end_matches('/'))),
        });
    }
}

impl GameConfig {
    /// Validate the config and return a list of warnings.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Endpoints ───
        check_url("game.api_url", &self.game.api_url, &mut warnings);
        check_url("telegram.api_base", &self.telegram.api_base, &mut warnings);
        check_url("discord.api_base", &self.discord.api_base, &mut warnings);

        // ── Credentials ───
        if self.game.api_key.as_deref().is_some_and(str::is_empty) {
            warnings.push(ConfigWarning {
                field: "game.api_key".into(),
                message: "api_key is set but empty".into(),
                severity: WarningSeverity::Warning,
                hint: Some("Set it or export VIRTUALS_API_KEY".into()),
            });
        }
        if let Some(token) = &self.telegram.bot_token {
            if !token.contains(':') {
                warnings.push(ConfigWarning {
                    field: "telegram.bot_token".into(),
                    message: "token does not look like '<id>:<secret>'".into(),
                    severity: WarningSeverity::Warning,
                    hint: Some("Copy the token exactly as issued by @BotFather".into()),
                });
            }
        }

        // ── Heartbeats ───
        if self.agent.main_heartbeat == 0 {
            warnings.push(ConfigWarning {
                field: "agent.main_heartbeat".into(),
                message: "main heartbeat is 0".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 15".into()),
            });
        }
        if self.agent.reaction_heartbeat == 0 {
            warnings.push(ConfigWarning {
                field: "agent.reaction_heartbeat".into(),
                message: "reaction heartbeat is 0".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 5".into()),
            });
        }
        if self.agent.goal.is_empty() {
            warnings.push(ConfigWarning {
                field: "agent.goal".into(),
                message: "no goal set; simulate and deploy will send an empty goal".into(),
                severity: WarningSeverity::Info,
                hint: None,
            });
        }

        // ── HTTP ───
        if self.http.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                field: "http.timeout_secs".into(),
                message: "timeout is 0, every request would fail".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. 30".into()),
            });
        }
        if self.http.connect_timeout_secs > self.http.timeout_secs {
            warnings.push(ConfigWarning {
                field: "http.connect_timeout_secs".into(),
                message: "connect timeout exceeds the request timeout".into(),
                severity: WarningSeverity::Warning,
                hint: None,
            });
        }

        // ── Logging ───
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_levels.join(", "))),
            });
        }
        let valid_formats = ["pretty", "json", "compact"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", valid_formats.join(", "))),
            });
        }

        // Check for hard errors
        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| format!("{}: {}", w.field, w.message))
            .collect();

        if !errors.is_empty() {
            return Err(format!("Configuration errors:\n  • {}", errors.join("\n  • ")));
        }

        Ok(warnings)
    }
}
