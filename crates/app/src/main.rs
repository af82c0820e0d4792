//! termbridge - session client for the terminology API
//!
//! Signs in, keeps the token fresh and issues authenticated requests from
//! the command line. The session is stored on disk so it survives between
//! invocations.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use termbridge_application::auth::{
    AuthGateway, CredentialStore, GatewaySettings, Presenter, SessionGuard, SessionStore,
};
use termbridge_domain::{AuthError, ClientConfig, RouteTable};
use termbridge_infrastructure::{ConfigRepository, FileStorage, ReqwestTransport};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod terminal;

use terminal::Terminal;

/// termbridge - session client for the terminology API
#[derive(Parser, Debug)]
#[command(name = "termbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL, overrides the configuration
    #[arg(long)]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// User id, e.g. DR001
        #[arg(short, long)]
        user_id: String,

        /// Password
        #[arg(short, long, env = "TERMBRIDGE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the stored session and what the interface would display
    Status,

    /// Exchange the stored token for a fresh one
    Refresh,

    /// Check whether a page may be opened with the current session
    Open {
        /// Page path, e.g. /dashboard
        path: String,
    },

    /// Send an authenticated GET request and print the body
    Get {
        /// API path, e.g. /api/search?q=fever
        path: String,
    },

    /// Ask the server who the current token belongs to
    Userinfo,

    /// Keep the session fresh until interrupted
    Keepalive,
}

/// Everything a command needs, wired from configuration.
pub struct App {
    /// Gateway owning the session lifecycle.
    pub gateway: AuthGateway,
    /// Terminal front end the session reports to.
    pub terminal: Arc<Terminal>,
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let repository = cli
        .config
        .as_ref()
        .map_or_else(ConfigRepository::new, ConfigRepository::with_path);
    let mut config = repository.load().await.with_context(|| {
        format!(
            "Failed to load configuration from {}",
            repository
                .path()
                .map_or_else(|| "<none>".to_string(), |p| p.display().to_string())
        )
    })?;

    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn build_app(config: &ClientConfig) -> Result<App> {
    let storage_dir = config
        .storage_dir
        .clone()
        .or_else(FileStorage::default_dir)
        .context("Could not determine a directory for the session file")?;
    tracing::debug!(dir = %storage_dir.display(), "using session storage");

    let storage = Arc::new(FileStorage::new(storage_dir));
    let store = SessionStore::new(CredentialStore::new(storage));

    let terminal = Arc::new(Terminal::new(config.landing_page.clone()));
    let presenter = Presenter::new(
        terminal.clone(),
        terminal.clone(),
        terminal.clone(),
        terminal.clone(),
    );
    let guard = SessionGuard::new(store, RouteTable::standard(&config.landing_page), presenter)
        .with_redirect_delay(config.permission_redirect_delay());

    let transport = ReqwestTransport::new(&config.base_url, config.request_timeout())
        .context("Failed to create HTTP client")?;
    let gateway = AuthGateway::new(guard, Arc::new(transport), GatewaySettings::from(config));

    Ok(App { gateway, terminal })
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli).await?;
    let app = build_app(&config)?;

    match cli.command {
        Commands::Login { user_id, password } => {
            commands::login(&app, &user_id, &password).await
        }
        Commands::Logout => {
            commands::logout(&app).await;
            Ok(())
        }
        Commands::Status => {
            commands::status(&app);
            Ok(())
        }
        Commands::Refresh => commands::refresh(&app).await,
        Commands::Open { path } => commands::open(&app, &path).await,
        Commands::Get { path } => commands::get(&app, &path).await,
        Commands::Userinfo => commands::userinfo(&app).await,
        Commands::Keepalive => commands::keepalive(&app).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Session errors were reported by the command that hit them.
            if e.downcast_ref::<AuthError>().is_none() {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
