use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_cli::transport::{cli, http};
use studio_cli::Config;

#[derive(Parser)]
#[command(name = "studio")]
#[command(author, version = studio_cli::VERSION, about = "Studio - multi-provider AI chat with comparison, voice and vision", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: STUDIO_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session
    Chat {
        /// Initial message to send
        message: Option<String>,

        /// Provider to start with (openai, anthropic, xai, deepseek)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model to start with (must belong to the provider)
        #[arg(short, long)]
        model: Option<String>,

        /// Call the real provider APIs instead of the simulator
        #[arg(long)]
        live: bool,
    },

    /// Ask every provider the same prompt and compare the answers
    Compare {
        prompt: String,

        /// Call the real provider APIs instead of the simulator
        #[arg(long)]
        live: bool,
    },

    /// List providers and their models
    Models {
        /// Only list this provider's models
        provider: Option<String>,
    },

    /// Render the dashboard panels for a fresh session
    Dashboard {
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: [server].host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: [server].port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "studio_cli=debug,studio=debug,llm=debug"
    } else {
        "studio_cli=info,studio=info,llm=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Chat {
            message,
            provider,
            model,
            live,
        } => {
            tracing::info!("Starting chat session");
            let options = cli::ChatOptions {
                provider,
                model,
                live,
                message,
            };
            cli::run_chat(config, options).await?;
        }
        Commands::Compare { prompt, live } => {
            cli::run_compare(config, &prompt, live).await?;
        }
        Commands::Models { provider } => {
            cli::run_models(&config, provider.as_deref())?;
        }
        Commands::Dashboard { json } => {
            cli::run_dashboard(&config, json)?;
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            tracing::info!("Starting HTTP server on {}:{}", host, port);
            http::run_http_server(&config, &host, port).await?;
        }
    }

    Ok(())
}
