//! Command-line interface for SensorLink.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sensorlink_core::config::env_vars;
use sensorlink_core::{decode_sensor_reading, GatewayConfig, SensorReadingLayout};

/// SensorLink - HTTP to MQTT gateway for industrial sensors.
#[derive(Parser, Debug)]
#[command(name = "sensorlink")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the gateway: HTTP API plus MQTT bridge.
    Serve {
        /// Host to bind to (overrides the environment).
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (overrides the environment).
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Decode a compressed sensor reading and print it as JSON.
    Decode {
        /// File holding the base64 payload, or `-` for stdin.
        #[arg(required = true)]
        input: PathBuf,
        /// Samples per reading (defaults to the configured value).
        #[arg(long)]
        sequence_length: Option<usize>,
        /// Channels per sample (defaults to the configured value).
        #[arg(long)]
        sample_size: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Serve { host, port } => run_server(host, port).await,
        Command::Decode {
            input,
            sequence_length,
            sample_size,
        } => run_decode(input, sequence_length, sample_size),
    }
}

fn init_logging(verbose: bool) {
    let json_logging = std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "sensorlink={lvl},sensorlink_core={lvl},sensorlink_bridge={lvl},sensorlink_api={lvl},warn",
            lvl = default_level
        ))
    });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

/// Run the gateway until Ctrl+C or SIGTERM.
async fn run_server(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = GatewayConfig::from_env().context("invalid configuration")?;
    if let Some(host) = host {
        config.http_host = host;
    }
    if let Some(port) = port {
        config.http_port = port;
    }

    tracing::info!(
        "Starting SensorLink on {} (broker {}:{}, gateway API {})",
        config.bind_address(),
        config.broker_host,
        config.broker_port,
        config.gateway_api_url
    );
    sensorlink_api::run(config).await
}

/// Decode one reading from a file or stdin.
fn run_decode(
    input: PathBuf,
    sequence_length: Option<usize>,
    sample_size: Option<usize>,
) -> Result<()> {
    let configured = GatewayConfig::from_env().context("invalid configuration")?;
    let layout = SensorReadingLayout::new(
        sequence_length.unwrap_or(configured.sequence_length),
        sample_size.unwrap_or(configured.sample_size),
    );
    if layout.sequence_length == 0 || layout.sample_size == 0 {
        anyhow::bail!("sequence length and sample size must be positive");
    }

    let encoded = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(&input)
            .with_context(|| format!("failed to read {}", input.display()))?
    };

    let reading = decode_sensor_reading(&encoded, layout)?;
    println!("{}", serde_json::to_string_pretty(&reading)?);
    Ok(())
}
