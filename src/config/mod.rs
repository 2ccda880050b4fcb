// Configuration management module
// Handles the TOML settings file and the interactive setup flow

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{Config, ConfigError, GeminiConfig, OllamaConfig, RetrievalConfig};
