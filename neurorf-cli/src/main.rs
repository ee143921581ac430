//! # NeuroRF CLI
//!
//! Command-line interface for the antenna design agent.
//!
//! Usage:
//!   neurorf design <request>
//!   neurorf validate [file.json]
//!   neurorf parse <request>
//!   neurorf prompt <request>
//!   neurorf env
//!
//! Examples:
//!   neurorf design "Design a patch antenna for 2.4 GHz"
//!   neurorf --provider openai design --request-id r-42 "dipole at 433 MHz"
//!   cat answer.json | neurorf validate

use clap::{Parser, Subcommand};
use neurorf_agent::{Agent, AgentConfig};
use neurorf_core::config::{self, Overrides, Settings, ENV_KEYS};
use neurorf_core::{
    DesignPrompt, Error, GeminiProvider, IntentParser, LlmProvider, ModelResponse, OpenAIProvider,
    ProviderType, Result,
};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_REQUEST: &str = "I need a Bluetooth antenna.";

#[derive(Parser)]
#[command(name = "neurorf")]
#[command(author, version, about = "NeuroRF - LLM-driven antenna design")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Load environment variables from this dotenv file only
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// LLM provider (gemini, openai); overrides NEURORF_PROVIDER
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model name; overrides NEURORF_MODEL
    #[arg(long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a design request end to end
    Design {
        /// Request ID prepended to the prompt
        #[arg(long)]
        request_id: Option<String>,

        /// Ask for a pyaedt session (falls back to the mock session)
        #[arg(long)]
        pyaedt: bool,

        /// The design request
        #[arg(trailing_var_arg = true)]
        request: Vec<String>,
    },
    /// Validate a model response from a JSON file or stdin
    Validate {
        /// Path to the JSON file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Show the intent parsed from a request
    Parse {
        #[arg(trailing_var_arg = true, required = true)]
        request: Vec<String>,
    },
    /// Show the prompt generated for a request
    Prompt {
        #[arg(long)]
        request_id: Option<String>,

        #[arg(trailing_var_arg = true, required = true)]
        request: Vec<String>,
    },
    /// Show which environment variables are set (values masked)
    Env,
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("neurorf=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("neurorf=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        Error::serialization_failed("failed to render output").set_source(e)
    })?;
    println!("{}", text);
    Ok(())
}

fn join_request(words: &[String]) -> String {
    let request = words.join(" ");
    if request.trim().is_empty() {
        DEFAULT_REQUEST.to_string()
    } else {
        request
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            Error::from(e)
                .with_operation("cli::validate")
                .with_context("path", path.display().to_string())
        }),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

async fn design<P: LlmProvider>(
    provider: P,
    settings: &Settings,
    request: &str,
    request_id: Option<&str>,
    pyaedt: bool,
) -> Result<()> {
    let mut agent = Agent::with_config(provider, AgentConfig::from_settings(settings));
    let use_pyaedt = if pyaedt { Some(true) } else { None };

    let result = agent.run_design(request, request_id, use_pyaedt).await?;
    println!("{}", result.to_json_pretty()?);

    debug!(
        calls = agent.usage().total_calls,
        tokens = agent.usage().total_tokens(),
        "Design finished"
    );
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let loaded = config::load_env(cli.env_file.as_deref())?;
    debug!(files = ?loaded, "Environment loaded");

    let overrides = Overrides {
        provider: cli.provider.as_deref().map(str::parse::<ProviderType>).transpose()?,
        model: cli.model,
    };

    match cli.command {
        Commands::Design {
            request_id,
            pyaedt,
            request,
        } => {
            let request = join_request(&request);
            let settings = Settings::from_env_with(&overrides)?;
            debug!(?settings, "Resolved settings");

            let config = settings.provider_config();
            match settings.provider {
                ProviderType::Gemini => {
                    let provider = GeminiProvider::new(config)?;
                    design(provider, &settings, &request, request_id.as_deref(), pyaedt).await
                }
                ProviderType::OpenAI => {
                    let provider = OpenAIProvider::new(config)?;
                    design(provider, &settings, &request, request_id.as_deref(), pyaedt).await
                }
            }
        }
        Commands::Validate { file } => {
            let text = read_input(file.as_deref())?;
            let response = ModelResponse::from_text(&text)?;
            print_json(&response)
        }
        Commands::Parse { request } => {
            let intent = IntentParser::new().parse(&join_request(&request));
            print_json(&intent)
        }
        Commands::Prompt {
            request_id,
            request,
        } => {
            let intent = IntentParser::new().parse(&join_request(&request));
            println!("{}", DesignPrompt::build(&intent, request_id.as_deref()));
            Ok(())
        }
        Commands::Env => print_json(&config::env_info(ENV_KEYS)),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        error!(kind = e.kind().as_str(), "{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_design_defaults_to_smoke_request() {
        let cli = Cli::try_parse_from(["neurorf", "design"]).unwrap();
        match cli.command {
            Commands::Design { request, pyaedt, .. } => {
                assert_eq!(join_request(&request), DEFAULT_REQUEST);
                assert!(!pyaedt);
            }
            _ => panic!("expected design"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "neurorf",
            "design",
            "--request-id",
            "r1",
            "--provider",
            "openai",
            "patch",
            "at",
            "2.4",
            "GHz",
        ])
        .unwrap();
        assert_eq!(cli.provider.as_deref(), Some("openai"));
        match cli.command {
            Commands::Design {
                request,
                request_id,
                ..
            } => {
                assert_eq!(request_id.as_deref(), Some("r1"));
                assert_eq!(join_request(&request), "patch at 2.4 GHz");
            }
            _ => panic!("expected design"),
        }
    }

    #[test]
    fn test_validate_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer.json");
        std::fs::write(
            &path,
            r#"{"antenna_type": "dipole", "frequencies_hz": [1e9], "tasks": [{"id": 1}]}"#,
        )
        .unwrap();

        let text = read_input(Some(&path)).unwrap();
        assert!(ModelResponse::from_text(&text).is_ok());

        let err = read_input(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert_eq!(err.context_value("path").map(|p| p.ends_with("missing.json")), Some(true));
    }
}
