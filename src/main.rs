use anyhow::{Context, Result};
use easy_apply::utils::logging;
use easy_apply::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("APPLY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    // Load configuration
    let config = Config::load(&config_path).with_context(|| format!("loading {}", config_path))?;

    // Initialize logging
    logging::init(config.verbose_logging);

    // Initialize and run the application
    App::initialize(config).await?.run().await?;

    Ok(())
}
