//! Chrome driver - infrastructure layer
//!
//! Holds the only browser resource and implements [`UiDriver`] on top of
//! chromiumoxide. Elements are kept in a registry and handed out as opaque
//! handles (one handle per DOM node); the registry is dropped whenever the
//! active page changes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, Page};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppResult, DriverError};
use crate::infrastructure::driver::{ContextId, ElementHandle, UiDriver};

const JS_TAG_NAME: &str = "function() { return this.tagName.toLowerCase(); }";
const JS_IS_VISIBLE: &str = "function() {
    const r = this.getBoundingClientRect();
    const s = window.getComputedStyle(this);
    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';
}";
const JS_IS_ENABLED: &str =
    "function() { return !this.disabled && this.getAttribute('aria-disabled') !== 'true'; }";
const JS_IS_CHECKED: &str = "function() { return !!this.checked; }";
const JS_CLEAR: &str = "function() {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
}";
/// File inputs are often hidden behind a styled button
const JS_REVEAL: &str = "function() {
    this.removeAttribute('hidden');
    this.style.display = 'block';
    this.style.visibility = 'visible';
    this.style.opacity = '1';
}";

/// Chrome driver
///
/// Responsibilities:
/// - own the `Browser` and the currently active `Page`
/// - expose JS evaluation (`eval` / `eval_as`)
/// - map element handles to live chromiumoxide elements
pub struct ChromeDriver {
    browser: Browser,
    active: Mutex<Page>,
    registry: Mutex<Registry>,
    next_handle: AtomicU64,
}

#[derive(Default)]
struct Registry {
    elements: HashMap<u64, Arc<Element>>,
    /// backend node id -> handle
    by_node: HashMap<i64, u64>,
}

impl ChromeDriver {
    pub fn new(browser: Browser, page: Page) -> Self {
        Self {
            browser,
            active: Mutex::new(page),
            registry: Mutex::new(Registry::default()),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Currently active page
    pub fn page(&self) -> Page {
        lock(&self.active).clone()
    }

    /// Evaluate a JS expression on the active page
    pub async fn eval(&self, js_code: impl Into<String>) -> AppResult<JsonValue> {
        let result = self.page().evaluate(js_code.into()).await?;
        Ok(result.into_value()?)
    }

    /// Evaluate and deserialize into `T`
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> AppResult<T> {
        let value = self.eval(js_code).await?;
        Ok(serde_json::from_value(value)?)
    }

    // ========== element registry ==========

    fn register(&self, elements: Vec<Element>) -> Vec<ElementHandle> {
        let mut registry = lock(&self.registry);
        elements
            .into_iter()
            .map(|element| {
                let node = *element.backend_node_id.inner();
                if let Some(id) = registry.by_node.get(&node).copied() {
                    return ElementHandle(id);
                }
                let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
                registry.by_node.insert(node, id);
                registry.elements.insert(id, Arc::new(element));
                ElementHandle(id)
            })
            .collect()
    }

    fn element(&self, handle: ElementHandle) -> AppResult<Arc<Element>> {
        lock(&self.registry)
            .elements
            .get(&handle.0)
            .cloned()
            .ok_or_else(|| DriverError::UnknownHandle(handle.0).into())
    }

    fn forget_elements(&self) {
        let mut registry = lock(&self.registry);
        registry.elements.clear();
        registry.by_node.clear();
    }

    async fn call_on(&self, handle: ElementHandle, function: &str) -> AppResult<JsonValue> {
        let element = self.element(handle)?;
        let returns = element.call_js_fn(function, false).await?;
        Ok(returns.result.value.unwrap_or(JsonValue::Null))
    }

    async fn call_on_bool(&self, handle: ElementHandle, function: &str) -> AppResult<bool> {
        Ok(self.call_on(handle, function).await?.as_bool().unwrap_or(false))
    }

    async fn page_by_context(&self, id: &ContextId) -> AppResult<Page> {
        for page in self.browser.pages().await? {
            if page.target_id().inner() == &id.0 {
                return Ok(page);
            }
        }
        Err(DriverError::UnknownContext(id.0.clone()).into())
    }
}

#[async_trait]
impl UiDriver for ChromeDriver {
    async fn navigate(&self, url: &str) -> AppResult<()> {
        self.forget_elements();
        self.page().goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> AppResult<String> {
        Ok(self.page().url().await?.unwrap_or_default())
    }

    async fn find(&self, selector: &str, scope: Option<ElementHandle>) -> AppResult<Option<ElementHandle>> {
        Ok(self.find_all(selector, scope).await?.into_iter().next())
    }

    async fn find_all(&self, selector: &str, scope: Option<ElementHandle>) -> AppResult<Vec<ElementHandle>> {
        let found = match scope {
            Some(scope) => self.element(scope)?.find_elements(selector).await,
            None => self.page().find_elements(selector).await,
        };
        match found {
            Ok(elements) => Ok(self.register(elements)),
            // querySelectorAll with zero hits surfaces as NotFound on some versions
            Err(chromiumoxide::error::CdpError::NotFound) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn click(&self, element: ElementHandle) -> AppResult<()> {
        self.element(element)?.click().await?;
        Ok(())
    }

    async fn type_text(&self, element: ElementHandle, text: &str) -> AppResult<()> {
        let element = self.element(element)?;
        element.focus().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn clear(&self, element: ElementHandle) -> AppResult<()> {
        self.call_on(element, JS_CLEAR).await?;
        Ok(())
    }

    async fn text(&self, element: ElementHandle) -> AppResult<String> {
        Ok(self.element(element)?.inner_text().await?.unwrap_or_default())
    }

    async fn attribute(&self, element: ElementHandle, name: &str) -> AppResult<Option<String>> {
        Ok(self.element(element)?.attribute(name).await?)
    }

    async fn tag_name(&self, element: ElementHandle) -> AppResult<String> {
        Ok(self
            .call_on(element, JS_TAG_NAME)
            .await?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn is_visible(&self, element: ElementHandle) -> AppResult<bool> {
        self.call_on_bool(element, JS_IS_VISIBLE).await
    }

    async fn is_enabled(&self, element: ElementHandle) -> AppResult<bool> {
        self.call_on_bool(element, JS_IS_ENABLED).await
    }

    async fn is_selected(&self, element: ElementHandle) -> AppResult<bool> {
        self.call_on_bool(element, JS_IS_CHECKED).await
    }

    async fn select_option(&self, element: ElementHandle, label: &str) -> AppResult<()> {
        let wanted = serde_json::to_string(label.trim())?;
        let function = format!(
            "function() {{
                const wanted = {wanted};
                for (const o of this.options) {{
                    if (o.text.trim() === wanted) {{
                        this.value = o.value;
                        this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                        return true;
                    }}
                }}
                return false;
            }}"
        );
        if self.call_on_bool(element, &function).await? {
            Ok(())
        } else {
            Err(DriverError::OptionNotFound {
                option: label.to_string(),
            }
            .into())
        }
    }

    async fn set_files(&self, element: ElementHandle, paths: &[PathBuf]) -> AppResult<()> {
        self.call_on(element, JS_REVEAL).await?;
        let target = self.element(element)?;
        let files = paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>();
        let mut params = SetFileInputFilesParams::new(files);
        params.backend_node_id = Some(target.backend_node_id.clone());
        self.page().execute(params).await?;
        debug!("Attached {} file(s) to {}", paths.len(), element);
        Ok(())
    }

    async fn page_text(&self) -> AppResult<String> {
        self.eval_as::<Option<String>>("document.body ? document.body.innerText : ''")
            .await
            .map(Option::unwrap_or_default)
    }

    async fn list_contexts(&self) -> AppResult<Vec<ContextId>> {
        Ok(self
            .browser
            .pages()
            .await?
            .iter()
            .map(|p| ContextId(p.target_id().inner().clone()))
            .collect())
    }

    async fn current_context(&self) -> AppResult<ContextId> {
        Ok(ContextId(self.page().target_id().inner().clone()))
    }

    async fn switch_context(&self, id: &ContextId) -> AppResult<()> {
        let page = self.page_by_context(id).await?;
        page.bring_to_front().await?;
        *lock(&self.active) = page;
        self.forget_elements();
        debug!("Switched to context {}", id);
        Ok(())
    }

    async fn close_context(&self, id: &ContextId) -> AppResult<()> {
        let page = self.page_by_context(id).await?;
        page.close().await?;
        debug!("Closed context {}", id);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
