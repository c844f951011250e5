use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedback_widget::api;
use feedback_widget::config::{ServerConfig, API_BASE};
use feedback_widget::models::Feedback;

#[derive(Parser)]
#[command(name = "feedback-widget")]
#[command(about = "Embeddable feedback widget and its storage service")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Server options used when no subcommand is given
    #[command(flatten)]
    server: ServerConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the feedback server
    Serve(ServerConfig),
    /// Check whether a feedback server is up
    Status {
        /// Base URL of the server
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "feedback_widget=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(config)) => serve(config).await?,
        Some(Commands::Status { url }) => status(&url).await?,
        None => serve(cli.server).await?,
    }

    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = config.bind_address();
    tracing::info!("Starting feedback server on {}", addr);

    let db = config.open_database()?;
    let app = api::create_router(db, &config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Feedback server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn status(url: &str) -> anyhow::Result<()> {
    let endpoint = format!("{}{}", url.trim_end_matches('/'), API_BASE);

    match reqwest::get(&endpoint).await {
        Ok(response) if response.status().is_success() => {
            let feedbacks: Vec<Feedback> = response.json().await?;
            println!("Feedback server at {} is up ({} records)", url, feedbacks.len());
        }
        Ok(response) => {
            println!(
                "Feedback server at {} responded with {}",
                url,
                response.status()
            );
        }
        Err(e) => {
            println!("Feedback server at {} is not reachable: {}", url, e);
        }
    }

    Ok(())
}
