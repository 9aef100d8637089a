use atomcamp_chat::Result;
use atomcamp_chat::commands::{ask_question, serve_chat, show_status};
use atomcamp_chat::config::{get_config_dir, run_interactive_config, show_config};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atomcamp-chat")]
#[command(about = "Retrieval-augmented chat assistant for the Atomcamp platform")]
#[command(version)]
struct Cli {
    /// Base directory for config.toml and the index snapshot
    #[arg(long, global = true, env = "ATOMCAMP_CHAT_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedding server and completion settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Start the HTTP chat server
    Serve,
    /// Answer a single question and exit
    Ask {
        /// The question to answer
        question: String,
    },
    /// Show embedder, index and credential status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config_dir = get_config_dir(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
        Commands::Serve => {
            serve_chat(&config_dir).await?;
        }
        Commands::Ask { question } => {
            tokio::task::spawn_blocking(move || ask_question(&config_dir, &question))
                .await
                .map_err(anyhow::Error::from)??;
        }
        Commands::Status => {
            tokio::task::spawn_blocking(move || show_status(&config_dir))
                .await
                .map_err(anyhow::Error::from)??;
        }
    }

    Ok(())
}
