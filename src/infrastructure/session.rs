//! UI session - the driver adapter
//!
//! Wraps a [`UiDriver`] with the semantics the workflow relies on:
//! - clicks retried with jittered backoff on interception / staleness
//! - bounded polling waits for visibility and clickability
//! - human-paced typing
//!
//! Only one component drives the session at a time; sequencing is the
//! caller's job, there are no locks here.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::driver::{ContextId, ElementHandle, UiDriver};
use crate::infrastructure::pacing::Pacer;
use crate::infrastructure::retry::RetryPolicy;

pub struct UiSession {
    driver: Arc<dyn UiDriver>,
    retry: RetryPolicy,
    pacer: Pacer,
    poll_interval: Duration,
}

impl UiSession {
    pub fn new(driver: Arc<dyn UiDriver>, retry: RetryPolicy, pacer: Pacer) -> Self {
        Self {
            driver,
            retry,
            pacer,
            poll_interval: Duration::from_millis(250),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn driver(&self) -> &dyn UiDriver {
        self.driver.as_ref()
    }

    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }

    // ========== navigation ==========

    pub async fn navigate(&self, url: &str) -> AppResult<()> {
        debug!("Navigating to {}", url);
        self.retry
            .execute("navigate", || self.driver.navigate(url))
            .await
    }

    pub async fn current_url(&self) -> AppResult<String> {
        self.driver.current_url().await
    }

    pub async fn page_text(&self) -> AppResult<String> {
        self.driver.page_text().await
    }

    // ========== lookup ==========

    pub async fn find(&self, selector: &str, scope: Option<ElementHandle>) -> AppResult<Option<ElementHandle>> {
        self.driver.find(selector, scope).await
    }

    pub async fn find_all(&self, selector: &str, scope: Option<ElementHandle>) -> AppResult<Vec<ElementHandle>> {
        self.driver.find_all(selector, scope).await
    }

    /// First selector (in order) that matches anything
    pub async fn find_first(
        &self,
        selectors: &[&str],
        scope: Option<ElementHandle>,
    ) -> AppResult<Option<(ElementHandle, String)>> {
        for selector in selectors {
            if let Some(element) = self.driver.find(selector, scope).await? {
                return Ok(Some((element, selector.to_string())));
            }
        }
        Ok(None)
    }

    /// First visible and enabled match across `selectors`
    pub async fn find_first_clickable(
        &self,
        selectors: &[&str],
        scope: Option<ElementHandle>,
    ) -> AppResult<Option<ElementHandle>> {
        for selector in selectors {
            for element in self.driver.find_all(selector, scope).await? {
                if self.is_clickable(element).await? {
                    return Ok(Some(element));
                }
            }
        }
        Ok(None)
    }

    /// Text of the first selector yielding non-empty text
    pub async fn text_by_selectors(
        &self,
        scope: Option<ElementHandle>,
        selectors: &[&str],
    ) -> AppResult<Option<String>> {
        for selector in selectors {
            if let Some(element) = self.driver.find(selector, scope).await? {
                let text = self.text(element).await?;
                if !text.is_empty() {
                    return Ok(Some(text));
                }
            }
        }
        Ok(None)
    }

    /// Trimmed visible text; stale elements read as empty
    pub async fn text(&self, element: ElementHandle) -> AppResult<String> {
        match self.driver.text(element).await {
            Ok(text) => Ok(text.trim().to_string()),
            Err(e) if e.is_transient() => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn attribute(&self, element: ElementHandle, name: &str) -> AppResult<Option<String>> {
        self.driver.attribute(element, name).await
    }

    pub async fn is_clickable(&self, element: ElementHandle) -> AppResult<bool> {
        Ok(self.driver.is_visible(element).await? && self.driver.is_enabled(element).await?)
    }

    /// Clickable `button` / link whose text contains one of `words`.
    /// Earlier words win over later ones.
    pub async fn find_button_by_text(
        &self,
        words: &[&str],
        scope: Option<ElementHandle>,
    ) -> AppResult<Option<(ElementHandle, String)>> {
        let candidates = self
            .driver
            .find_all("button, a[role='button'], input[type='submit']", scope)
            .await?;
        let mut labelled = Vec::with_capacity(candidates.len());
        for element in candidates {
            let text = self.text(element).await?.to_lowercase();
            labelled.push((element, text));
        }

        for word in words {
            for (element, text) in &labelled {
                if text.contains(word) && self.is_clickable(*element).await? {
                    return Ok(Some((*element, word.to_string())));
                }
            }
        }
        Ok(None)
    }

    /// Texts of visible elements matching any error selector
    pub async fn visible_errors(
        &self,
        selectors: &[&str],
        scope: Option<ElementHandle>,
    ) -> AppResult<Vec<String>> {
        let mut errors = Vec::new();
        for selector in selectors {
            for element in self.driver.find_all(selector, scope).await? {
                if self.driver.is_visible(element).await.unwrap_or(false) {
                    let text = self.text(element).await?;
                    if !text.is_empty() {
                        errors.push(text);
                    }
                }
            }
        }
        Ok(errors)
    }

    // ========== bounded waits ==========

    /// Poll until one of `selectors` has a visible match or `timeout` expires.
    pub async fn wait_until_visible_any(
        &self,
        selectors: &[&str],
        scope: Option<ElementHandle>,
        timeout: Duration,
    ) -> AppResult<(ElementHandle, String)> {
        let deadline = Instant::now() + timeout;
        loop {
            for selector in selectors {
                for element in self.driver.find_all(selector, scope).await? {
                    if self.driver.is_visible(element).await.unwrap_or(false) {
                        return Ok((element, selector.to_string()));
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(AppError::timeout(selectors.join(" | "), timeout.as_millis() as u64));
            }
            sleep(self.poll_interval).await;
        }
    }

    pub async fn wait_until_visible(&self, selector: &str, timeout: Duration) -> AppResult<ElementHandle> {
        self.wait_until_visible_any(&[selector], None, timeout)
            .await
            .map(|(element, _)| element)
    }

    pub async fn wait_until_clickable(&self, selector: &str, timeout: Duration) -> AppResult<ElementHandle> {
        let deadline = Instant::now() + timeout;
        loop {
            for element in self.driver.find_all(selector, None).await? {
                if self.is_clickable(element).await.unwrap_or(false) {
                    return Ok(element);
                }
            }
            if Instant::now() >= deadline {
                return Err(AppError::timeout(selector, timeout.as_millis() as u64));
            }
            sleep(self.poll_interval).await;
        }
    }

    // ========== interaction ==========

    /// Click with bounded retry on transient faults
    pub async fn click(&self, element: ElementHandle) -> AppResult<()> {
        self.retry
            .execute("click", || self.driver.click(element))
            .await
    }

    /// Clear the field, then type one character at a time with a random delay
    pub async fn human_type(&self, element: ElementHandle, text: &str) -> AppResult<()> {
        self.retry
            .execute("clear", || self.driver.clear(element))
            .await?;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.driver.type_text(element, ch.encode_utf8(&mut buf)).await?;
            let delay = self.pacer.keystroke_delay();
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
        Ok(())
    }

    pub async fn select_option(&self, element: ElementHandle, label: &str) -> AppResult<()> {
        self.retry
            .execute("select", || self.driver.select_option(element, label))
            .await
    }

    pub async fn set_files(&self, element: ElementHandle, paths: &[std::path::PathBuf]) -> AppResult<()> {
        self.driver.set_files(element, paths).await
    }

    /// Random pause between interactions
    pub async fn settle(&self) {
        self.pacer.jitter().await;
    }

    // ========== contexts ==========

    pub async fn current_context(&self) -> AppResult<ContextId> {
        self.driver.current_context().await
    }

    pub async fn context_set(&self) -> AppResult<HashSet<ContextId>> {
        Ok(self.driver.list_contexts().await?.into_iter().collect())
    }

    pub async fn switch_context(&self, id: &ContextId) -> AppResult<()> {
        self.driver.switch_context(id).await
    }

    pub async fn close_context(&self, id: &ContextId) -> AppResult<()> {
        match self.driver.close_context(id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_run_level() => Err(e),
            Err(e) => {
                warn!("Closing context {} failed: {}", id, e);
                Ok(())
            }
        }
    }
}
