use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppResult, DriverError};

/// Attach to a running browser over its remote debugging port and pick a page.
///
/// A page whose URL contains `target_host` is reused (keeps the logged-in
/// tab); otherwise a blank page is opened.
pub async fn connect_to_browser_and_page(port: u16, target_host: Option<&str>) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("Connecting to browser: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("Browser connection failed: {}", e);
        DriverError::ConnectionFailed {
            port,
            message: e.to_string(),
        }
    })?;
    debug!("Browser connected");

    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // let the target list sync
    sleep(tokio::time::Duration::from_millis(300)).await;

    let pages = browser.pages().await?;
    debug!("{} open page(s)", pages.len());

    if let Some(host) = target_host {
        for p in pages.iter() {
            if let Ok(Some(url)) = p.url().await {
                if url.contains(host) {
                    info!("✓ Reusing page: {}", url);
                    return Ok((browser, p.clone()));
                }
            }
        }
        debug!("No page on {}, opening a new one", host);
    }

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("Failed to open page: {}", e);
        DriverError::from(e)
    })?;
    Ok((browser, page))
}
