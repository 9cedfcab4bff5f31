use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod catalog;
mod cli_style;
mod config;
mod credentials;
mod gateway;
mod session;
mod shell;

use config::{AppConfig, CliConfig, FileConfig};
use credentials::FileCredentialStore;
use gateway::GitHubGateway;
use session::Session;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=cli_style::get_styles())]
struct CliArgs {
    /// Path to an optional TOML config file; its values override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the file where credentials are persisted.
    #[clap(long, value_parser = parse_path)]
    pub credentials_path: Option<PathBuf>,

    /// Root URL of the GitHub API (override for GitHub Enterprise).
    #[clap(long, default_value = config::DEFAULT_API_URL)]
    pub api_url: String,

    /// Timeout in seconds for remote requests.
    #[clap(long, default_value_t = config::DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// Commit message used for every save.
    #[clap(long, default_value = config::DEFAULT_COMMIT_MESSAGE)]
    pub commit_message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let cli_config = CliConfig {
        credentials_path: cli_args.credentials_path,
        api_url: cli_args.api_url,
        request_timeout_sec: cli_args.request_timeout_sec,
        commit_message: cli_args.commit_message,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!(
        "catalog-editor {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let credential_store = FileCredentialStore::new(app_config.credentials_path.clone());
    let gateway = GitHubGateway::new(
        app_config.api_url.clone(),
        app_config.request_timeout_sec,
        app_config.commit_message.clone(),
    )?;

    let mut session = Session::new(Arc::new(gateway), Box::new(credential_store));

    match session.startup().await {
        Ok(true) => info!("Restored persisted session"),
        Ok(false) => {}
        Err(err) => {
            // The shell still starts; the user can fix credentials there.
            tracing::error!("Could not restore persisted session: {}", err);
        }
    }

    shell::run(&mut session, &app_config).await
}
