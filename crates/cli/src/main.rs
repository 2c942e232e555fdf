use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "forwarder")]
#[command(about = "Kinesis data forwarder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: FORWARDER_CONFIG_PATH or ~/.forwarder/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Serve the ingestion handler over local HTTP (POST /events).
    Serve {
        /// Config file path (default: FORWARDER_CONFIG_PATH or ~/.forwarder/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// HTTP port (default from config or 15152)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run as an AWS Lambda function (API Gateway proxy or WebSocket events).
    Lambda {
        /// Config file path (default: FORWARDER_CONFIG_PATH or ~/.forwarder/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Send one forward event to a running local gateway and print the reply.
    Send {
        /// Title of the record.
        #[arg(long)]
        title: String,

        /// Action tag (default: kinesis-data-forwarder).
        #[arg(long, default_value = forwarder::gateway::FORWARD_ACTION)]
        action: String,

        /// Gateway events URL.
        #[arg(long, default_value = "http://127.0.0.1:15152/events")]
        url: String,
    },

    /// Create, delete, or look up a Kinesis stream (e.g. against LocalStack).
    Stream {
        #[command(subcommand)]
        op: StreamOp,

        /// Config file path (default: FORWARDER_CONFIG_PATH or ~/.forwarder/config.json)
        #[arg(long, short, value_name = "PATH", global = true)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StreamOp {
    /// Create a stream with one shard.
    Create { name: Option<String> },
    /// Delete a stream.
    Delete { name: Option<String> },
    /// Print the stream ARN.
    Arn { name: Option<String> },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Version) => {
            println!("forwarder {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Commands::Init { config }) => run_init(config).map_err(|e| ("init", e)),
        Some(Commands::Serve { config, port }) => {
            run_serve(config, port).await.map_err(|e| ("serve", e))
        }
        Some(Commands::Lambda { config }) => run_lambda(config).await.map_err(|e| ("lambda", e)),
        Some(Commands::Send { title, action, url }) => {
            run_send(title, action, url).await.map_err(|e| ("send", e))
        }
        Some(Commands::Stream { op, config }) => {
            run_stream(op, config).await.map_err(|e| ("stream", e))
        }
        None => {
            println!("Run with --help for usage");
            Ok(())
        }
    };

    if let Err((command, e)) = result {
        log::error!("{} failed: {:#}", command, e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(forwarder::config::default_config_path);
    let dir = forwarder::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let (mut config, _path) = forwarder::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    let handler = Arc::new(forwarder::build_handler(&config).await);
    log::info!(
        "starting gateway on {}:{} (stream {})",
        config.gateway.bind,
        config.gateway.port,
        handler.stream_name()
    );
    forwarder::gateway::run_gateway(config.gateway, handler).await
}

async fn run_lambda(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, _path) = forwarder::config::load_config(config_path)?;
    let handler = Arc::new(forwarder::build_handler(&config).await);
    forwarder::lambda::run_lambda(handler)
        .await
        .map_err(|e| anyhow::anyhow!("lambda runtime: {}", e))
}

async fn run_send(title: String, action: String, url: String) -> anyhow::Result<()> {
    let event = serde_json::json!({
        "action": action,
        "data": { "title": title },
    });
    let resp = reqwest::Client::new().post(&url).json(&event).send().await?;
    let status = resp.status();
    let body = resp.text().await?;
    if body.is_empty() {
        println!("{}", status);
    } else {
        println!("{} {}", status, body);
    }
    Ok(())
}

async fn run_stream(op: StreamOp, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (config, _path) = forwarder::config::load_config(config_path)?;
    let sink = forwarder::sink::KinesisSink::from_config(&config.kinesis).await;
    let resolve = |name: Option<String>| {
        name.unwrap_or_else(|| forwarder::config::resolve_stream_name(&config.kinesis))
    };
    match op {
        StreamOp::Create { name } => {
            let name = resolve(name);
            sink.create_stream(&name).await?;
            println!("created stream {}", name);
        }
        StreamOp::Delete { name } => {
            let name = resolve(name);
            sink.delete_stream(&name).await?;
            println!("deleted stream {}", name);
        }
        StreamOp::Arn { name } => {
            let name = resolve(name);
            println!("{}", sink.stream_arn(&name).await?);
        }
    }
    Ok(())
}
