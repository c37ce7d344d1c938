use anyhow::Result;
use clap::{Parser, Subcommand};

use aksjeradar::config::AppConfig;
use aksjeradar::core::log::init_logging;
use aksjeradar::core::tier::SubscriptionTier;
use aksjeradar::db::{UserStore, open_pool};
use aksjeradar::error::AppError;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the web server (default)
    Serve,
    /// Change a user's subscription tier
    Promote {
        /// Account email
        email: String,
        /// Target tier: free, basic, pro or admin
        tier: String,
    },
    /// Soft-disable a user account
    Deactivate {
        /// Account email
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Promote { email, tier }) => {
            promote(cli.config_path.as_deref(), &email, &tier)
        }
        Some(Commands::Deactivate { email }) => deactivate(cli.config_path.as_deref(), &email),
        Some(Commands::Serve) | None => aksjeradar::run(cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> Result<()> {
    use anyhow::Context;

    let path = AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
server:
  bind: "127.0.0.1"
  port: 8000

provider:
  base_url: "https://query1.finance.yahoo.com"
  daily_budget: 500
  timeout_secs: 10

cache:
  ttl_secs: 300

session:
  ttl_hours: 168
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

fn user_store(config_path: Option<&str>) -> Result<UserStore> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    let pool = open_pool(&config.database_path()?, 1)?;
    Ok(UserStore::new(pool))
}

fn promote(config_path: Option<&str>, email: &str, tier: &str) -> Result<()> {
    let tier: SubscriptionTier = tier.parse()?;
    let users = user_store(config_path)?;
    let user = users
        .find_by_email(email)
        .map_err(anyhow::Error::new)?
        .ok_or_else(|| AppError::NotFound(format!("no user with email {email}")))
        .map_err(anyhow::Error::new)?;
    users.set_tier(user.id, tier).map_err(anyhow::Error::new)?;
    tracing::info!(email, %tier, "Updated tier");
    Ok(())
}

fn deactivate(config_path: Option<&str>, email: &str) -> Result<()> {
    let users = user_store(config_path)?;
    let user = users
        .find_by_email(email)
        .map_err(anyhow::Error::new)?
        .ok_or_else(|| AppError::NotFound(format!("no user with email {email}")))
        .map_err(anyhow::Error::new)?;
    users.deactivate(user.id).map_err(anyhow::Error::new)?;
    tracing::info!(email, "Deactivated user");
    Ok(())
}
