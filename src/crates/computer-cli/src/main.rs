//! # computer
//!
//! Drive a remote desktop automation daemon from the command line.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use computer_gateway::config::{load_config_file, ENV_PREFIX};
use computer_gateway::logging::LogGuard;
use computer_gateway::{
    ActionKind, ActionRequest, ComputerGateway, DesktopClient, GatewayConfig, ToolDefinition,
    ToolResult, ValidateConfig,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "computer")]
#[command(about = "Drive a remote desktop through its automation daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Daemon base URL
    #[arg(long, global = true, env = "COMPUTER_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute one action and print the result as JSON
    Act {
        /// Action name, e.g. left_click or scroll
        action: ActionKind,

        /// Text to type, key combination, or click modifiers
        #[arg(short, long)]
        text: Option<String>,

        /// Target coordinate as X,Y
        #[arg(long, value_parser = parse_coordinate)]
        coordinate: Option<(u32, u32)>,

        /// Action option as key=value; values are parsed as JSON when possible
        #[arg(short = 'o', long = "option", value_parser = parse_option)]
        options: Vec<(String, Value)>,
    },

    /// Execute a raw JSON action request (inline or @file)
    Run {
        /// JSON object, or @path to a file containing one
        request: String,
    },

    /// Save a PNG screenshot
    Screenshot {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the pointer position
    Cursor,

    /// Print the tool definition for LLM tool-use APIs
    ToolSpec,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Act {
            action,
            text,
            coordinate,
            options,
        } => {
            let request = build_request(action, text, coordinate, options);
            execute(config, request).await?;
        }
        Commands::Run { request } => {
            let request = read_request(&request)?;
            execute(config, request).await?;
        }
        Commands::Screenshot { output } => {
            let _guard = LogGuard::new("screenshot");
            let desktop = DesktopClient::from_config(&config)?;
            let png = desktop.screenshot().await?;
            std::fs::write(&output, &png)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Saved {} bytes to {}", png.len(), output.display());
        }
        Commands::Cursor => {
            let desktop = DesktopClient::from_config(&config)?;
            let position = desktop.mouse_position().await?;
            println!("X={},Y={}", position.x, position.y);
        }
        Commands::ToolSpec => {
            let definition = ToolDefinition::for_display(&config.display);
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Defaults, then the config file, then `COMPUTER_*` variables, then flags.
fn load_config(cli: &Cli) -> Result<GatewayConfig> {
    let config = match &cli.config {
        Some(path) => load_config_file::<GatewayConfig>(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => GatewayConfig::default(),
    };

    let mut config = config.with_env_overrides(ENV_PREFIX)?;

    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_s = timeout;
    }

    config.validate()?;
    tracing::debug!(base_url = %config.base_url, "Configuration loaded");
    Ok(config)
}

async fn execute(config: GatewayConfig, request: ActionRequest) -> Result<()> {
    let _guard = LogGuard::new(format!("action {}", request.action));
    let gateway = ComputerGateway::new(config)?;

    let result: ToolResult = gateway.execute(request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(error) = result.error() {
        bail!("{}", error);
    }
    Ok(())
}

fn build_request(
    action: ActionKind,
    text: Option<String>,
    coordinate: Option<(u32, u32)>,
    options: Vec<(String, Value)>,
) -> ActionRequest {
    let mut request = ActionRequest::new(action);
    if let Some(text) = text {
        request = request.with_text(text);
    }
    if let Some((x, y)) = coordinate {
        request = request.with_coordinate(x, y);
    }
    for (key, value) in options {
        request = request.with_option(key, value);
    }
    request
}

fn read_request(source: &str) -> Result<ActionRequest> {
    let raw = match source.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path))?,
        None => source.to_string(),
    };

    let value: Value = serde_json::from_str(&raw).context("Request is not valid JSON")?;
    Ok(ActionRequest::from_json(value)?)
}

fn parse_coordinate(s: &str) -> Result<(u32, u32)> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("expected X,Y, got {}", s))?;
    let x = x.trim().parse().with_context(|| format!("invalid x in {}", s))?;
    let y = y.trim().parse().with_context(|| format!("invalid y in {}", s))?;
    Ok((x, y))
}

fn parse_option(s: &str) -> Result<(String, Value)> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got {}", s))?;
    if key.is_empty() {
        bail!("option key must not be empty");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
