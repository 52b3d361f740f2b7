use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppResult, DriverError};

/// Launch a fresh browser and open `url`
pub async fn launch_browser(url: &str, headless: bool, executable: Option<&Path>) -> AppResult<(Browser, Page)> {
    info!("🚀 Launching browser (headless: {})...", headless);

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = executable {
        builder = builder.chrome_executable(executable);
    }
    let config = builder
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-blink-features=AutomationControlled",
        ])
        .build()
        .map_err(|e| {
            error!("Invalid browser configuration: {}", e);
            DriverError::ConnectionFailed { port: 0, message: e }
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("Browser launch failed: {}", e);
        DriverError::ConnectionFailed {
            port: 0,
            message: e.to_string(),
        }
    })?;
    debug!("Browser launched");

    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page(url).await.map_err(|e| {
        error!("Failed to open page: {}", e);
        DriverError::from(e)
    })?;

    info!("✅ Browser ready at {}", url);
    Ok((browser, page))
}
