//! Test doubles shared by the integration tests
//!
//! `FakeDriver` is a tiny in-memory browser: pages are element trees keyed
//! by URL, clicks can navigate, open a tab or re-render the page in place,
//! and a small CSS matcher (tag, `.class`, `#id`, `[attr]`, `[attr=v]`,
//! `[attr*=v]`, `[attr^=v]`, descendant combinator, comma lists) resolves
//! the same selector tables the real boards use.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use easy_apply::config::Config;
use easy_apply::error::{AppResult, DriverError};
use easy_apply::infrastructure::{ContextId, ElementHandle, Pacer, RetryPolicy, UiDriver, UiSession};
use easy_apply::models::{ApplicationOutcome, JobCandidate};
use easy_apply::services::{
    AnswerOracle, DocumentGenerator, DocumentSelection, EventLogger, GeneratedDocuments, JobPostingSummary,
};

pub const BASE: &str = "https://www.linkedin.com";

// ========== page builder ==========

#[derive(Debug, Clone)]
pub enum Action {
    /// Load another URL in the current tab
    Navigate(String),
    /// Open a new tab on a URL (focus stays where it was)
    OpenTab(String),
    /// Replace the current document with the template registered under
    /// the key, keeping the URL (modals, multi-step forms)
    Render(String),
}

#[derive(Debug, Clone)]
pub struct El {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<El>,
    visible: bool,
    enabled: bool,
    on_click: Option<Action>,
}

pub fn el(tag: &str) -> El {
    El {
        tag: tag.to_string(),
        attrs: BTreeMap::new(),
        text: String::new(),
        children: Vec::new(),
        visible: true,
        enabled: true,
        on_click: None,
    }
}

impl El {
    pub fn class(mut self, class: &str) -> Self {
        let entry = self.attrs.entry("class".to_string()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(class);
        self
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn child(mut self, child: El) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn on_click(mut self, action: Action) -> Self {
        self.on_click = Some(action);
        self
    }
}

// ========== live documents ==========

#[derive(Debug)]
struct Node {
    handle: u64,
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    children: Vec<usize>,
    parent: Option<usize>,
    visible: bool,
    enabled: bool,
    checked: bool,
    on_click: Option<Action>,
}

#[derive(Debug)]
struct Document {
    url: String,
    nodes: Vec<Node>,
}

impl Document {
    fn build(url: &str, template: &El, next_handle: &mut u64) -> Self {
        let mut doc = Document {
            url: url.to_string(),
            nodes: Vec::new(),
        };
        doc.push(template, None, next_handle);
        doc
    }

    /// Pre-order, so arena order is document order
    fn push(&mut self, el: &El, parent: Option<usize>, next_handle: &mut u64) -> usize {
        *next_handle += 1;
        let index = self.nodes.len();
        self.nodes.push(Node {
            handle: *next_handle,
            tag: el.tag.clone(),
            attrs: el.attrs.clone(),
            text: el.text.clone(),
            children: Vec::new(),
            parent,
            visible: el.visible,
            enabled: el.enabled,
            checked: el.attrs.contains_key("checked"),
            on_click: el.on_click.clone(),
        });
        for child in &el.children {
            let child_index = self.push(child, Some(index), next_handle);
            self.nodes[index].children.push(child_index);
        }
        index
    }

    fn index_of(&self, handle: ElementHandle) -> Option<usize> {
        self.nodes.iter().position(|n| n.handle == handle.0)
    }

    fn is_descendant(&self, mut index: usize, ancestor: usize) -> bool {
        while let Some(parent) = self.nodes[index].parent {
            if parent == ancestor {
                return true;
            }
            index = parent;
        }
        false
    }

    fn visible(&self, mut index: usize) -> bool {
        loop {
            if !self.nodes[index].visible {
                return false;
            }
            match self.nodes[index].parent {
                Some(parent) => index = parent,
                None => return true,
            }
        }
    }

    /// Own text plus visible descendants, one line per element
    fn text(&self, index: usize) -> String {
        let node = &self.nodes[index];
        let mut parts = Vec::new();
        if !node.text.is_empty() {
            parts.push(node.text.clone());
        }
        for child in &node.children {
            if self.nodes[*child].visible {
                let text = self.text(*child);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }
        parts.join("\n")
    }

    fn select(&self, selector: &str, scope: Option<usize>) -> Vec<usize> {
        let list = parse_selector_list(selector);
        (0..self.nodes.len())
            .filter(|i| scope.map_or(true, |s| self.is_descendant(*i, s)))
            .filter(|i| list.iter().any(|complex| self.matches_complex(*i, complex)))
            .collect()
    }

    fn matches_complex(&self, index: usize, complex: &[Compound]) -> bool {
        let Some((last, ancestors)) = complex.split_last() else {
            return false;
        };
        if !last.matches(&self.nodes[index]) {
            return false;
        }
        let mut cursor = self.nodes[index].parent;
        for compound in ancestors.iter().rev() {
            loop {
                let Some(current) = cursor else {
                    return false;
                };
                cursor = self.nodes[current].parent;
                if compound.matches(&self.nodes[current]) {
                    break;
                }
            }
        }
        true
    }
}

// ========== selectors ==========

#[derive(Debug, Clone)]
enum AttrTest {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrTest)>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attrs.get("id") != Some(id) {
                return false;
            }
        }
        let classes: Vec<&str> = node
            .attrs
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default();
        if !self.classes.iter().all(|c| classes.contains(&c.as_str())) {
            return false;
        }
        self.attrs.iter().all(|(name, test)| match (node.attrs.get(name), test) {
            (None, _) => false,
            (Some(_), AttrTest::Exists) => true,
            (Some(v), AttrTest::Equals(want)) => v == want,
            (Some(v), AttrTest::Contains(want)) => v.contains(want.as_str()),
            (Some(v), AttrTest::Prefix(want)) => v.starts_with(want.as_str()),
        })
    }
}

/// Split on `sep` outside brackets and quotes
fn split_top_level(input: &str, is_sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for ch in input.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(ch);
                current.push(ch);
            }
            (None, '[') => {
                depth += 1;
                current.push(ch);
            }
            (None, ']') => {
                depth -= 1;
                current.push(ch);
            }
            (None, c) if depth == 0 && is_sep(c) => {
                if !current.trim().is_empty() {
                    parts.push(current.trim().to_string());
                }
                current.clear();
            }
            (None, c) => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn parse_selector_list(selector: &str) -> Vec<Vec<Compound>> {
    split_top_level(selector, |c| c == ',')
        .iter()
        .map(|complex| {
            split_top_level(complex, char::is_whitespace)
                .iter()
                .map(|c| parse_compound(c))
                .collect()
        })
        .collect()
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '*'
}

fn parse_compound(input: &str) -> Compound {
    let chars: Vec<char> = input.chars().collect();
    let mut compound = Compound::default();
    let mut i = 0;

    let read_ident = |i: &mut usize| {
        let start = *i;
        while *i < chars.len() && is_ident(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect::<String>()
    };

    if i < chars.len() && is_ident(chars[i]) {
        compound.tag = Some(read_ident(&mut i));
    }
    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                compound.classes.push(read_ident(&mut i));
            }
            '#' => {
                i += 1;
                compound.id = Some(read_ident(&mut i));
            }
            '[' => {
                let start = i + 1;
                let mut quote: Option<char> = None;
                i += 1;
                while i < chars.len() {
                    match (quote, chars[i]) {
                        (Some(q), c) if c == q => quote = None,
                        (Some(_), _) => {}
                        (None, '"') | (None, '\'') => quote = Some(chars[i]),
                        (None, ']') => break,
                        _ => {}
                    }
                    i += 1;
                }
                let inner: String = chars[start..i].iter().collect();
                i += 1;
                compound.attrs.push(parse_attr(&inner));
            }
            _ => i += 1,
        }
    }
    compound
}

fn parse_attr(inner: &str) -> (String, AttrTest) {
    let unquote = |v: &str| {
        v.trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .replace("\\\"", "\"")
    };
    for (op, build) in [
        ("*=", AttrTest::Contains as fn(String) -> AttrTest),
        ("^=", AttrTest::Prefix as fn(String) -> AttrTest),
        ("=", AttrTest::Equals as fn(String) -> AttrTest),
    ] {
        if let Some((name, value)) = inner.split_once(op) {
            return (name.trim().to_string(), build(unquote(value)));
        }
    }
    (inner.trim().to_string(), AttrTest::Exists)
}

// ========== driver ==========

#[derive(Debug)]
struct Tab {
    id: ContextId,
    doc: Document,
}

#[derive(Debug, Default)]
struct State {
    pages: HashMap<String, El>,
    tabs: Vec<Tab>,
    current: Option<ContextId>,
    next_handle: u64,
    next_tab: u64,
    visits: Vec<String>,
    clicks: Vec<String>,
    uploads: Vec<PathBuf>,
    /// URL → successful loads allowed before navigation times out
    load_limits: HashMap<String, usize>,
}

impl State {
    fn template(&self, key: &str) -> El {
        self.pages.get(key).cloned().unwrap_or_else(|| el("body"))
    }

    fn open_tab(&mut self, url: &str) -> ContextId {
        self.next_tab += 1;
        let id = ContextId(format!("tab-{}", self.next_tab));
        let template = self.template(url);
        let doc = Document::build(url, &template, &mut self.next_handle);
        self.visits.push(url.to_string());
        self.tabs.push(Tab { id: id.clone(), doc });
        id
    }

    fn tab_mut(&mut self) -> Result<&mut Tab, DriverError> {
        let current = self
            .current
            .clone()
            .ok_or_else(|| DriverError::UnknownContext("no current tab".to_string()))?;
        self.tabs
            .iter_mut()
            .find(|t| t.id == current)
            .ok_or(DriverError::UnknownContext(current.0))
    }

    fn doc(&self) -> Result<&Document, DriverError> {
        let current = self
            .current
            .as_ref()
            .ok_or_else(|| DriverError::UnknownContext("no current tab".to_string()))?;
        self.tabs
            .iter()
            .find(|t| &t.id == current)
            .map(|t| &t.doc)
            .ok_or_else(|| DriverError::UnknownContext(current.0.clone()))
    }

    fn node(&self, handle: ElementHandle) -> Result<(&Document, usize), DriverError> {
        let doc = self.doc()?;
        let index = doc
            .index_of(handle)
            .ok_or_else(|| DriverError::StaleElement(handle.to_string()))?;
        Ok((doc, index))
    }

    fn load(&mut self, url: &str) -> Result<(), DriverError> {
        if let Some(limit) = self.load_limits.get(url) {
            if self.visits.iter().filter(|v| *v == url).count() >= *limit {
                return Err(DriverError::Timeout {
                    selector: url.to_string(),
                    timeout_ms: 0,
                });
            }
        }
        let template = self.template(url);
        let mut next = self.next_handle;
        let doc = Document::build(url, &template, &mut next);
        self.next_handle = next;
        self.visits.push(url.to_string());
        self.tab_mut()?.doc = doc;
        Ok(())
    }

    fn render(&mut self, key: &str) -> Result<(), DriverError> {
        let template = self.template(key);
        let mut next = self.next_handle;
        let url = self.doc()?.url.clone();
        let doc = Document::build(&url, &template, &mut next);
        self.next_handle = next;
        self.tab_mut()?.doc = doc;
        Ok(())
    }
}

/// Scripted in-memory browser
#[derive(Debug, Default)]
pub struct FakeDriver {
    state: Mutex<State>,
}

impl FakeDriver {
    /// One tab, on `start_url`
    pub fn new(start_url: &str) -> Self {
        let driver = FakeDriver::default();
        {
            let mut state = driver.lock();
            let id = state.open_tab(start_url);
            state.current = Some(id);
        }
        driver
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register the page served at `url` (or rendered under that key)
    pub fn page(&self, url: impl Into<String>, template: El) -> &Self {
        self.lock().pages.insert(url.into(), template);
        self
    }

    /// Navigation to `url` times out once it has been loaded `loads` times
    pub fn stop_loading_after(&self, url: impl Into<String>, loads: usize) -> &Self {
        self.lock().load_limits.insert(url.into(), loads);
        self
    }

    pub fn visits(&self) -> Vec<String> {
        self.lock().visits.clone()
    }

    pub fn visited(&self, url: &str) -> bool {
        self.lock().visits.iter().any(|v| v == url)
    }

    /// `id`, `aria-label` or text of every clicked element
    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.lock().uploads.clone()
    }

    pub fn tab_count(&self) -> usize {
        self.lock().tabs.len()
    }

    pub fn current_tab(&self) -> Option<ContextId> {
        self.lock().current.clone()
    }

    pub fn url(&self) -> String {
        self.lock().doc().map(|d| d.url.clone()).unwrap_or_default()
    }

    /// `value` attribute of the element with `id` in the current document
    pub fn value_of(&self, id: &str) -> Option<String> {
        let state = self.lock();
        let doc = state.doc().ok()?;
        doc.nodes
            .iter()
            .find(|n| n.attrs.get("id").map(String::as_str) == Some(id))
            .and_then(|n| n.attrs.get("value").cloned())
    }

    pub fn is_checked(&self, id: &str) -> bool {
        let state = self.lock();
        state
            .doc()
            .ok()
            .and_then(|doc| {
                doc.nodes
                    .iter()
                    .find(|n| n.attrs.get("id").map(String::as_str) == Some(id))
            })
            .map(|n| n.checked)
            .unwrap_or(false)
    }
}

fn describe(node: &Node) -> String {
    node.attrs
        .get("id")
        .or_else(|| node.attrs.get("aria-label"))
        .cloned()
        .unwrap_or_else(|| node.text.clone())
}

#[async_trait]
impl UiDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> AppResult<()> {
        Ok(self.lock().load(url)?)
    }

    async fn current_url(&self) -> AppResult<String> {
        Ok(self.lock().doc()?.url.clone())
    }

    async fn find(&self, selector: &str, scope: Option<ElementHandle>) -> AppResult<Option<ElementHandle>> {
        Ok(self.find_all(selector, scope).await?.into_iter().next())
    }

    async fn find_all(&self, selector: &str, scope: Option<ElementHandle>) -> AppResult<Vec<ElementHandle>> {
        let state = self.lock();
        let doc = state.doc()?;
        let scope = match scope {
            Some(handle) => Some(
                doc.index_of(handle)
                    .ok_or_else(|| DriverError::StaleElement(handle.to_string()))?,
            ),
            None => None,
        };
        Ok(doc
            .select(selector, scope)
            .into_iter()
            .map(|i| ElementHandle(doc.nodes[i].handle))
            .collect())
    }

    async fn click(&self, element: ElementHandle) -> AppResult<()> {
        let mut state = self.lock();
        let (action, description) = {
            let (doc, index) = state.node(element)?;
            if !doc.visible(index) || !doc.nodes[index].enabled {
                return Err(DriverError::NotInteractable(element.to_string()).into());
            }
            let node = &doc.nodes[index];
            (node.on_click.clone(), describe(node))
        };
        state.clicks.push(description);

        {
            let tab = state.tab_mut()?;
            let index = tab
                .doc
                .index_of(element)
                .ok_or_else(|| DriverError::StaleElement(element.to_string()))?;
            let kind = tab.doc.nodes[index].attrs.get("type").cloned().unwrap_or_default();
            if tab.doc.nodes[index].tag == "input" && kind == "radio" {
                let name = tab.doc.nodes[index].attrs.get("name").cloned();
                for node in tab.doc.nodes.iter_mut() {
                    if node.tag == "input" && node.attrs.get("name") == name.as_ref() {
                        node.checked = false;
                    }
                }
                tab.doc.nodes[index].checked = true;
            } else if tab.doc.nodes[index].tag == "input" && kind == "checkbox" {
                tab.doc.nodes[index].checked = !tab.doc.nodes[index].checked;
            }
        }

        match action {
            Some(Action::Navigate(url)) => state.load(&url)?,
            Some(Action::OpenTab(url)) => {
                state.open_tab(&url);
            }
            Some(Action::Render(key)) => state.render(&key)?,
            None => {}
        }
        Ok(())
    }

    async fn type_text(&self, element: ElementHandle, text: &str) -> AppResult<()> {
        let mut state = self.lock();
        let tab = state.tab_mut()?;
        let index = tab
            .doc
            .index_of(element)
            .ok_or_else(|| DriverError::StaleElement(element.to_string()))?;
        tab.doc.nodes[index]
            .attrs
            .entry("value".to_string())
            .or_default()
            .push_str(text);
        Ok(())
    }

    async fn clear(&self, element: ElementHandle) -> AppResult<()> {
        let mut state = self.lock();
        let tab = state.tab_mut()?;
        let index = tab
            .doc
            .index_of(element)
            .ok_or_else(|| DriverError::StaleElement(element.to_string()))?;
        tab.doc.nodes[index].attrs.insert("value".to_string(), String::new());
        Ok(())
    }

    async fn text(&self, element: ElementHandle) -> AppResult<String> {
        let state = self.lock();
        let (doc, index) = state.node(element)?;
        Ok(doc.text(index))
    }

    async fn attribute(&self, element: ElementHandle, name: &str) -> AppResult<Option<String>> {
        let state = self.lock();
        let (doc, index) = state.node(element)?;
        Ok(doc.nodes[index].attrs.get(name).cloned())
    }

    async fn tag_name(&self, element: ElementHandle) -> AppResult<String> {
        let state = self.lock();
        let (doc, index) = state.node(element)?;
        Ok(doc.nodes[index].tag.to_lowercase())
    }

    async fn is_visible(&self, element: ElementHandle) -> AppResult<bool> {
        let state = self.lock();
        let (doc, index) = state.node(element)?;
        Ok(doc.visible(index))
    }

    async fn is_enabled(&self, element: ElementHandle) -> AppResult<bool> {
        let state = self.lock();
        let (doc, index) = state.node(element)?;
        Ok(doc.nodes[index].enabled)
    }

    async fn is_selected(&self, element: ElementHandle) -> AppResult<bool> {
        let state = self.lock();
        let (doc, index) = state.node(element)?;
        Ok(doc.nodes[index].checked)
    }

    async fn select_option(&self, element: ElementHandle, label: &str) -> AppResult<()> {
        let mut state = self.lock();
        let tab = state.tab_mut()?;
        let index = tab
            .doc
            .index_of(element)
            .ok_or_else(|| DriverError::StaleElement(element.to_string()))?;
        let value = tab.doc.nodes[index]
            .children
            .iter()
            .map(|c| &tab.doc.nodes[*c])
            .find(|option| option.tag == "option" && option.text == label)
            .map(|option| option.attrs.get("value").cloned().unwrap_or_else(|| option.text.clone()))
            .ok_or_else(|| DriverError::OptionNotFound {
                option: label.to_string(),
            })?;
        tab.doc.nodes[index].attrs.insert("value".to_string(), value);
        Ok(())
    }

    async fn set_files(&self, element: ElementHandle, paths: &[PathBuf]) -> AppResult<()> {
        let mut state = self.lock();
        state.node(element)?;
        state.uploads.extend(paths.iter().cloned());
        Ok(())
    }

    async fn page_text(&self) -> AppResult<String> {
        let state = self.lock();
        let doc = state.doc()?;
        Ok(doc.text(0))
    }

    async fn list_contexts(&self) -> AppResult<Vec<ContextId>> {
        Ok(self.lock().tabs.iter().map(|t| t.id.clone()).collect())
    }

    async fn current_context(&self) -> AppResult<ContextId> {
        self.lock()
            .current
            .clone()
            .ok_or_else(|| DriverError::UnknownContext("no current tab".to_string()).into())
    }

    async fn switch_context(&self, id: &ContextId) -> AppResult<()> {
        let mut state = self.lock();
        if !state.tabs.iter().any(|t| &t.id == id) {
            return Err(DriverError::UnknownContext(id.0.clone()).into());
        }
        state.current = Some(id.clone());
        Ok(())
    }

    async fn close_context(&self, id: &ContextId) -> AppResult<()> {
        let mut state = self.lock();
        let before = state.tabs.len();
        state.tabs.retain(|t| &t.id != id);
        if state.tabs.len() == before {
            return Err(DriverError::UnknownContext(id.0.clone()).into());
        }
        // the browser focuses the first remaining tab
        if state.current.as_ref() == Some(id) {
            state.current = state.tabs.first().map(|t| t.id.clone());
        }
        Ok(())
    }
}

pub fn session(driver: Arc<FakeDriver>) -> UiSession {
    UiSession::new(driver, RetryPolicy::immediate(2), Pacer::instant()).with_poll_interval(Duration::from_millis(5))
}

// ========== services ==========

/// Oracle answering from a fixed script. Questions are matched by
/// lowercase substring; unscripted questions get a default.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: Vec<(String, Vec<String>)>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, question_part: &str, answer: &str) -> Self {
        self.script
            .push((question_part.to_lowercase(), vec![answer.to_string()]));
        self
    }

    pub fn answers(mut self, question_part: &str, answers: &[&str]) -> Self {
        self.script.push((
            question_part.to_lowercase(),
            answers.iter().map(|a| a.to_string()).collect(),
        ));
        self
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn lookup(&self, question: &str) -> Option<Vec<String>> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.to_string());
        }
        let lower = question.to_lowercase();
        self.script
            .iter()
            .find(|(part, _)| lower.contains(part.as_str()))
            .map(|(_, answers)| answers.clone())
    }
}

#[async_trait]
impl AnswerOracle for ScriptedOracle {
    async fn answer_free_text(&self, _job: &JobCandidate, question: &str) -> AppResult<String> {
        Ok(self
            .lookup(question)
            .and_then(|a| a.into_iter().next())
            .unwrap_or_else(|| "42".to_string()))
    }

    async fn answer_from_options(&self, _job: &JobCandidate, question: &str, options: &[String]) -> AppResult<String> {
        Ok(self
            .lookup(question)
            .and_then(|a| a.into_iter().next())
            .or_else(|| options.first().cloned())
            .unwrap_or_default())
    }

    async fn classify_and_extract(
        &self,
        _job: &JobCandidate,
        question: &str,
        _options: &[String],
    ) -> AppResult<Vec<String>> {
        Ok(self.lookup(question).unwrap_or_default())
    }

    async fn parse_job_posting(&self, job: &JobCandidate) -> AppResult<JobPostingSummary> {
        Ok(JobPostingSummary {
            normalized_title: job.title.to_lowercase(),
            documents: DocumentSelection::default(),
        })
    }
}

/// Fixed documents (or none)
#[derive(Debug, Default)]
pub struct FixedDocuments {
    pub documents: GeneratedDocuments,
}

#[async_trait]
impl DocumentGenerator for FixedDocuments {
    async fn generate(&self, _job: &JobCandidate, _selection: &DocumentSelection) -> GeneratedDocuments {
        self.documents.clone()
    }
}

#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<ApplicationOutcome>>,
    closed: AtomicBool,
}

impl RecordingLogger {
    pub fn records(&self) -> Vec<ApplicationOutcome> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl EventLogger for RecordingLogger {
    fn record(&self, outcome: &ApplicationOutcome) {
        if self.is_closed() {
            return;
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(outcome.clone());
        }
    }

    fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

// ========== LinkedIn-shaped fixtures ==========

#[derive(Debug, Clone, Copy)]
pub struct Tile<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub company: &'a str,
    pub location: &'a str,
}

pub fn job_url(id: &str) -> String {
    format!("{}/jobs/view/{}/", BASE, id)
}

pub fn results_page(tiles: &[Tile<'_>]) -> El {
    el("body").child(
        el("div").class("jobs-search-results-list").children(tiles.iter().map(|tile| {
            el("li")
                .class("scaffold-layout__list-item")
                .attr("data-occludable-job-id", tile.id)
                .child(
                    el("a")
                        .class("job-card-list__title")
                        .attr("href", &format!("/jobs/view/{}/?trk=search", tile.id))
                        .text(tile.title),
                )
                .child(el("div").class("artdeco-entity-lockup__subtitle").text(tile.company))
                .child(el("div").class("artdeco-entity-lockup__caption").text(tile.location))
        })),
    )
}

/// Results page the board shows once a search runs dry
pub fn no_results_page() -> El {
    el("body").child(
        el("div")
            .class("jobs-search-results-list")
            .child(el("h2").text("No matching jobs found.")),
    )
}

/// Posting detail with an Easy Apply button performing `apply`
pub fn detail_page(apply: Action) -> El {
    el("body").child(
        el("div")
            .class("jobs-details")
            .child(el("div").id("job-details").text(
                "We are looking for an engineer to build reliable distributed systems in Rust.",
            ))
            .child(
                el("button")
                    .class("jobs-apply-button")
                    .text("Easy Apply")
                    .on_click(apply),
            ),
    )
}

/// Easy Apply modal holding `sections` and one advance button
pub fn modal(sections: Vec<El>, advance: El) -> El {
    el("body").child(
        el("div")
            .class("jobs-easy-apply-modal")
            .children(sections)
            .child(advance),
    )
}

pub fn section() -> El {
    el("div").class("jobs-easy-apply-form-section__grouping")
}

pub fn text_question(id: &str, label: &str) -> El {
    section()
        .child(el("label").attr("for", id).text(label))
        .child(el("input").id(id).attr("type", "text"))
}

pub fn radio_question(name: &str, question: &str, options: &[&str]) -> El {
    let mut fieldset = el("fieldset")
        .class("jobs-easy-apply-form-section__grouping")
        .child(el("legend").text(question));
    for option in options {
        let id = format!("{}-{}", name, option.to_lowercase());
        fieldset = fieldset
            .child(
                el("input")
                    .id(&id)
                    .attr("type", "radio")
                    .attr("name", name)
                    .attr("value", option),
            )
            .child(el("label").attr("for", &id).text(option));
    }
    fieldset
}

/// Labelled select with a placeholder first
pub fn select_question(id: &str, label: &str, options: &[&str]) -> El {
    let select = el("select")
        .id(id)
        .child(el("option").attr("value", "").text("Select an option"))
        .children(options.iter().map(|o| el("option").attr("value", o).text(o)));
    section()
        .child(el("label").attr("for", id).text(label))
        .child(select)
}

/// Checkbox ids are `<name>-<lowercased option>`
pub fn checkbox_question(name: &str, question: &str, options: &[&str]) -> El {
    let mut fieldset = el("fieldset")
        .class("jobs-easy-apply-form-section__grouping")
        .child(el("legend").text(question));
    for option in options {
        let id = format!("{}-{}", name, option.to_lowercase());
        fieldset = fieldset
            .child(
                el("input")
                    .id(&id)
                    .attr("type", "checkbox")
                    .attr("name", name)
                    .attr("value", option),
            )
            .child(el("label").attr("for", &id).text(option));
    }
    fieldset
}

/// Hidden file input behind its label, as the boards render it
pub fn file_question(id: &str, label: &str) -> El {
    section()
        .child(el("label").attr("for", id).text(label))
        .child(el("input").id(id).attr("type", "file").hidden())
}

/// Submit button that leaves the page untouched, so filled values stay
/// inspectable
pub fn inert_submit() -> El {
    el("button")
        .attr("aria-label", "Submit application")
        .text("Submit application")
}

pub fn submit_button(next: Action) -> El {
    el("button")
        .attr("aria-label", "Submit application")
        .text("Submit application")
        .on_click(next)
}

pub fn next_button(next: Action) -> El {
    el("button")
        .attr("aria-label", "Continue to next step")
        .text("Next")
        .on_click(next)
}

pub fn error_banner(message: &str) -> El {
    el("div").class("artdeco-inline-feedback--error").text(message)
}

pub fn test_config(output_dir: PathBuf) -> Config {
    Config {
        positions: vec!["Rust Engineer".to_string()],
        locations: vec!["Remote".to_string()],
        max_search_pages: 3,
        page_dwell_secs: 0,
        long_pause_every: 0,
        typing_delay_min_ms: 0,
        typing_delay_max_ms: 0,
        surface_timeout_secs: 1,
        click_max_attempts: 2,
        output_dir: output_dir.join("output"),
        log_dir: output_dir.join("log"),
        answer_cache_path: output_dir.join("answers.json"),
        ..Config::default()
    }
}
