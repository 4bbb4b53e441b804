use std::env;
use std::path::PathBuf;

use ostad_server::config::AppConfig;
use ostad_server::state::AppState;
use ostad_server::{ServerBuilder, observability};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    /// From --config CLI argument
    CliArgument,
    /// From OSTAD_CONFIG environment variable
    EnvironmentVariable,
    /// No config file; defaults plus environment overrides
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (OSTAD_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present, before anything reads the environment
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    // Initialize tracing early with the default level
    observability::init_tracing();

    let (config_path, source) = resolve_config_path();

    let cfg = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(
        path = %config_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string()),
        source = %source,
        "Configuration loaded"
    );

    observability::apply_logging_level(&cfg.logging.level);

    let state = AppState::from_config(&cfg)?;
    let server = ServerBuilder::new(cfg, state).build()?;
    server.run().await
}

/// Resolve the config file path from `--config <path>`, `OSTAD_CONFIG`, or
/// an `ostad.toml` next to the binary if it exists.
fn resolve_config_path() -> (Option<PathBuf>, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (Some(PathBuf::from(path)), ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("OSTAD_CONFIG") {
        return (Some(PathBuf::from(path)), ConfigSource::EnvironmentVariable);
    }

    let default = PathBuf::from("ostad.toml");
    if default.exists() {
        return (Some(default), ConfigSource::Default);
    }
    (None, ConfigSource::Default)
}
