mod connection;
mod headless;

pub use connection::connect_to_browser_and_page;
pub use headless::launch_browser;

use chromiumoxide::{Browser, Page};

use crate::config::Config;
use crate::error::AppResult;

/// Launch or attach, depending on `config.launch_browser`
pub async fn open_browser(config: &Config, start_url: &str) -> AppResult<(Browser, Page)> {
    if config.launch_browser {
        launch_browser(start_url, config.headless, config.chrome_executable.as_deref()).await
    } else {
        let host = start_url
            .split("://")
            .nth(1)
            .and_then(|rest| rest.split('/').next());
        connect_to_browser_and_page(config.browser_debug_port, host).await
    }
}
