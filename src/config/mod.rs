// Configuration management module
// TOML settings for the embedder, completion client, chunking and server

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    CompletionConfig, Config, ConfigError, OllamaConfig, RetrievalConfig, ServerConfig,
};

/// Resolve the base directory: an explicit override wins over `~/.atomcamp-chat`
#[inline]
pub fn get_config_dir(
    override_dir: Option<&std::path::Path>,
) -> Result<std::path::PathBuf, ConfigError> {
    match override_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Config::config_dir(),
    }
}
