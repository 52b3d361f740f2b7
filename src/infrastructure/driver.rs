//! UI driver - infrastructure layer
//!
//! The raw automation primitives the engine needs, and nothing else. Retry,
//! waiting and pacing live one level up in [`UiSession`](super::UiSession).

use std::fmt::Display;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::AppResult;

/// Opaque handle to an element the driver has handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

impl Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tab / window / frame the driver can switch between
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub String);

impl Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// UI driver
///
/// Responsibilities:
/// - locate elements (page-wide or inside a scope element)
/// - read element state (text, attributes, visibility)
/// - perform single, unpaced interactions
/// - manage browser contexts
///
/// Implementations never retry or sleep on their own.
#[async_trait]
pub trait UiDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> AppResult<()>;

    async fn current_url(&self) -> AppResult<String>;

    /// First element matching `selector`, or `None`
    async fn find(&self, selector: &str, scope: Option<ElementHandle>) -> AppResult<Option<ElementHandle>>;

    /// Every element matching `selector`, in document order
    async fn find_all(&self, selector: &str, scope: Option<ElementHandle>) -> AppResult<Vec<ElementHandle>>;

    async fn click(&self, element: ElementHandle) -> AppResult<()>;

    /// Send keystrokes to the element (no clearing, no delays)
    async fn type_text(&self, element: ElementHandle, text: &str) -> AppResult<()>;

    async fn clear(&self, element: ElementHandle) -> AppResult<()>;

    /// Visible text of the element
    async fn text(&self, element: ElementHandle) -> AppResult<String>;

    async fn attribute(&self, element: ElementHandle, name: &str) -> AppResult<Option<String>>;

    /// Lowercase tag name
    async fn tag_name(&self, element: ElementHandle) -> AppResult<String>;

    async fn is_visible(&self, element: ElementHandle) -> AppResult<bool>;

    async fn is_enabled(&self, element: ElementHandle) -> AppResult<bool>;

    /// Checked state of a radio / checkbox
    async fn is_selected(&self, element: ElementHandle) -> AppResult<bool>;

    /// Select the `<option>` whose visible text equals `label`
    async fn select_option(&self, element: ElementHandle, label: &str) -> AppResult<()>;

    /// Attach files to a (possibly hidden) file input
    async fn set_files(&self, element: ElementHandle, paths: &[PathBuf]) -> AppResult<()>;

    /// Visible text of the whole document
    async fn page_text(&self) -> AppResult<String>;

    async fn list_contexts(&self) -> AppResult<Vec<ContextId>>;

    async fn current_context(&self) -> AppResult<ContextId>;

    async fn switch_context(&self, id: &ContextId) -> AppResult<()>;

    async fn close_context(&self, id: &ContextId) -> AppResult<()>;
}
