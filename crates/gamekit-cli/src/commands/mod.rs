use clap::{Parser, Subcommand};
use gamekit_config::{ConfigLoader, GameConfig, LoggingConfig};
use gamekit_core::{ArgType, GameError, HttpTransport, ReqwestTransport, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod agent;
mod platforms;

/// gamekit: typed HTTP functions for hosted agents and chat platforms
#[derive(Parser)]
#[command(name = "gamekit", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to gamekit.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the functions a platform registry offers
    Functions {
        /// telegram or discord
        platform: String,
    },
    /// Print the full descriptor of one function as JSON
    Describe { platform: String, name: String },
    /// Invoke a platform function with positional arguments
    Invoke {
        platform: String,
        /// Registry name, e.g. sendMessage
        name: String,
        /// Arguments in order; each is parsed as JSON, else taken as a string
        args: Vec<String>,
    },
    /// Delete several Telegram messages, one request per id
    DeleteMessages {
        chat_id: String,
        #[arg(required = true)]
        message_ids: Vec<i64>,
    },
    /// Parse a Telegram webhook update from a file ("-" for stdin)
    Webhook { file: PathBuf },
    /// Register the Telegram webhook URL
    SetWebhook { url: String },
    /// List the default functions offered by the GAME backend
    GameFunctions,
    /// Print the agent definition as JSON
    Export {
        /// JSON file with an array of custom function descriptors
        #[arg(long)]
        custom_functions: Option<PathBuf>,
    },
    /// Simulate the agent on the GAME backend
    Simulate {
        /// Session ID (generated if omitted)
        #[arg(short, long)]
        session: Option<String>,
        #[arg(long)]
        custom_functions: Option<PathBuf>,
    },
    /// Ask the hosted agent to react to an event
    React {
        platform: String,
        #[arg(short, long)]
        session: Option<String>,
        #[arg(long)]
        tweet_id: Option<String>,
        #[arg(long)]
        event: Option<String>,
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        custom_functions: Option<PathBuf>,
    },
    /// Deploy the agent to the GAME backend
    Deploy {
        #[arg(long)]
        custom_functions: Option<PathBuf>,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // --verbose > --quiet > --log-level > config
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level
                .as_deref()
                .unwrap_or(config.logging.level.as_str())
        };
        init_tracing(&config.logging, log_level);

        match self.command {
            Commands::Functions { platform } => platforms::cmd_functions(&config, &platform),
            Commands::Describe { platform, name } => {
                platforms::cmd_describe(&config, &platform, &name)
            }
            Commands::Invoke {
                platform,
                name,
                args,
            } => platforms::cmd_invoke(&config, &platform, &name, &args).await,
            Commands::DeleteMessages {
                chat_id,
                message_ids,
            } => platforms::cmd_delete_messages(&config, &chat_id, &message_ids).await,
            Commands::Webhook { file } => platforms::cmd_webhook(&file),
            Commands::SetWebhook { url } => platforms::cmd_set_webhook(&config, &url).await,
            Commands::GameFunctions => agent::cmd_game_functions(&config).await,
            Commands::Export { custom_functions } => {
                agent::cmd_export(&config, custom_functions.as_deref())
            }
            Commands::Simulate {
                session,
                custom_functions,
            } => agent::cmd_simulate(&config, session, custom_functions.as_deref()).await,
            Commands::React {
                platform,
                session,
                tweet_id,
                event,
                task,
                custom_functions,
            } => {
                let options = agent::ReactOptions {
                    platform,
                    session,
                    tweet_id,
                    event,
                    task,
                };
                agent::cmd_react(&config, options, custom_functions.as_deref()).await
            }
            Commands::Deploy { custom_functions } => {
                agent::cmd_deploy(&config, custom_functions.as_deref()).await
            }
            Commands::Config { json } => Self::cmd_config(config, json),
        }
    }

    fn cmd_config(config: GameConfig, json: bool) -> Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| GameError::Config(e.to_string()))?
            );
        }
        Ok(())
    }
}

fn init_tracing(logging: &LoggingConfig, level: &str) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => builder.json().with_target(true).init(),
        "compact" => builder.compact().with_target(false).init(),
        _ => builder.with_target(false).init(),
    }
}

/// Shared HTTP transport built from the `[http]` section.
pub(crate) fn transport(config: &GameConfig) -> Arc<dyn HttpTransport> {
    Arc::new(ReqwestTransport::with_timeouts(
        Duration::from_secs(config.http.connect_timeout_secs),
        Duration::from_secs(config.http.timeout_secs),
    ))
}

/// A CLI argument as JSON, falling back to a plain string. Arguments
/// declared as strings are never parsed, so `12345` stays `"12345"`.
pub(crate) fn parse_arg(raw: &str, arg_type: Option<ArgType>) -> Value {
    if arg_type == Some(ArgType::String) {
        return Value::String(raw.to_string());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub(crate) fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("[\"a\",\"b\"]", Some(ArgType::Array)), json!(["a", "b"]));
        assert_eq!(parse_arg("true", Some(ArgType::Boolean)), json!(true));
        assert_eq!(parse_arg("hello world", None), json!("hello world"));
        assert_eq!(parse_arg("12345", Some(ArgType::String)), json!("12345"));
        assert_eq!(parse_arg("12345", None), json!(12345));
    }

    #[test]
    fn test_cli_parses_invoke() {
        let cli = Cli::try_parse_from([
            "gamekit", "invoke", "telegram", "sendMessage", "\"1\"", "hi",
        ])
        .unwrap();
        match cli.command {
            Commands::Invoke { platform, name, args } => {
                assert_eq!(platform, "telegram");
                assert_eq!(name, "sendMessage");
                assert_eq!(args, vec!["\"1\"", "hi"]);
            }
            _ => panic!("expected invoke"),
        }
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["gamekit", "-v", "-q", "config"]).is_err());
    }
}
