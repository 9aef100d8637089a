use anyhow::{Context, Result};
use console::style;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::assistant::{Assistant, ResponseSource};
use crate::config::Config;
use crate::embeddings::OllamaClient;
use crate::index::{IndexError, VectorIndex};
use crate::server::{AppState, serve};

fn load_config(config_dir: &Path) -> Result<Config> {
    let config = Config::load(config_dir).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Port to listen on: a valid `PORT` value overrides the configured one
#[inline]
pub fn resolve_port(configured: u16, env_value: Option<&str>) -> u16 {
    match env_value.map(str::trim) {
        None | Some("") => configured,
        Some(value) => match value.parse::<u16>() {
            Ok(port) if port != 0 => port,
            _ => {
                warn!("Ignoring invalid PORT value {:?}, using {}", value, configured);
                configured
            }
        },
    }
}

/// Initialize the assistant and serve the chat API until Ctrl-C
#[inline]
pub async fn serve_chat(config_dir: &Path) -> Result<()> {
    let config = load_config(config_dir)?;

    let port = resolve_port(config.server.port, std::env::var("PORT").ok().as_deref());
    let addr: SocketAddr = format!("{}:{}", config.server.host, port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, port
            )
        })?;

    info!("Initializing assistant before accepting requests");
    let assistant = tokio::task::spawn_blocking(move || Assistant::from_config(&config))
        .await
        .context("Assistant initialization panicked")??;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    serve(listener, AppState::new(Arc::new(assistant))).await
}

/// Answer a single question on stdout
#[inline]
pub fn ask_question(config_dir: &Path, question: &str) -> Result<()> {
    let config = load_config(config_dir)?;
    let assistant = Assistant::from_config(&config)?;

    let answer = assistant.respond(question);
    let source = match answer.source {
        ResponseSource::Remote => "remote model".to_string(),
        ResponseSource::FallbackKeyword(topic) => format!("canned {} answer", topic),
        ResponseSource::FallbackGeneric => "generic answer".to_string(),
    };

    eprintln!("{}", style(format!("Answered from {}", source)).dim());
    println!("{}", answer.text);
    Ok(())
}

/// Config for `status`, falling back to defaults rooted at `config_dir`
fn status_config(config_dir: &Path) -> Config {
    Config::load(config_dir).unwrap_or_else(|e| {
        warn!("Using default configuration: {:#}", e);
        Config {
            base_dir: config_dir.to_path_buf(),
            ..Config::default()
        }
    })
}

/// Report embedder reachability, snapshot state and credential presence
#[inline]
pub fn show_status(config_dir: &Path) -> Result<()> {
    let config = status_config(config_dir);

    eprintln!("{}", style("Atomcamp Chat Status").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Embedding Server:").bold().yellow());
    match OllamaClient::new(&config.ollama) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                eprintln!(
                    "  {} {}:{}",
                    style("Connected").green(),
                    config.ollama.host,
                    config.ollama.port
                );
                eprintln!("  Model: {}", style(&config.ollama.model).cyan());
            }
            Err(e) => eprintln!("  {} {}", style("Unreachable:").red(), e),
        },
        Err(e) => eprintln!("  {} {}", style("Misconfigured:").red(), e),
    }
    eprintln!();

    let snapshot_dir = config.snapshot_path();
    eprintln!("{}", style("Vector Index:").bold().yellow());
    eprintln!("  Location: {}", style(snapshot_dir.display()).cyan());
    match VectorIndex::load(&snapshot_dir, config.ollama.embedding_dimension as usize) {
        Ok(index) => {
            eprintln!("  Passages: {}", style(index.len()).cyan());
            eprintln!("  Built with: {}", style(index.embedding_model()).cyan());
            eprintln!("  Dimension: {}", style(index.dimension()).cyan());
        }
        Err(IndexError::NotFound { .. }) => {
            eprintln!(
                "  {}",
                style("No snapshot yet, one is built on first start").yellow()
            );
        }
        Err(e) => eprintln!("  {} {}", style("Unusable, will be rebuilt:").red(), e),
    }
    eprintln!();

    eprintln!("{}", style("Remote Completion:").bold().yellow());
    eprintln!("  Model: {}", style(&config.completion.model).cyan());
    let credential = if std::env::var(&config.completion.api_key_env).is_ok() {
        style("set".to_string()).green()
    } else {
        style("not set, answers use canned fallbacks".to_string()).red()
    };
    eprintln!(
        "  {}: {}",
        style(&config.completion.api_key_env).cyan(),
        credential
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_override() {
        assert_eq!(resolve_port(7860, None), 7860);
        assert_eq!(resolve_port(7860, Some("")), 7860);
        assert_eq!(resolve_port(7860, Some("8080")), 8080);
        assert_eq!(resolve_port(7860, Some(" 9000 ")), 9000);
        assert_eq!(resolve_port(7860, Some("0")), 7860);
        assert_eq!(resolve_port(7860, Some("not-a-port")), 7860);
        assert_eq!(resolve_port(7860, Some("70000")), 7860);
    }

    #[test]
    fn status_tolerates_missing_setup() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let mut config = Config::load(temp_dir.path()).expect("defaults should load");
        config.ollama.port = 1;
        config.save().expect("config should save");

        assert!(show_status(temp_dir.path()).is_ok());
    }

    #[test]
    fn invalid_config_keeps_base_dir_for_status() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp_dir.path().join("config.toml"), "not = [valid")
            .expect("should write config file");

        let config = status_config(temp_dir.path());

        assert_eq!(config.get_base_dir(), temp_dir.path());
        assert_eq!(
            config.snapshot_path(),
            temp_dir.path().join("atomcamp_vector_db")
        );
    }
}
