//! In-memory web driver for unit testing.
//!
//! [`MockWebDriver`] keeps a small DOM arena and answers [`WebDriver`] calls
//! against it, so the adapter's resolution, fill and wait logic runs for real.
//! Supported lookups: every [`By`] strategy, compound CSS selectors without
//! combinators, and the XPath shapes the page builder emits (`.//tag[@a='v'
//! and ...]`, `./*`, `//tag`, and `(expr)[n]` groups).

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use regex::Regex;

use super::{By, DriverError, DriverResult, WebDriver, WebElementRef};
use crate::wait::Point;

const DOCUMENT_TAG: &str = "#document";

// =============================================================================
// NODE DESCRIPTIONS
// =============================================================================

/// Declarative description of a DOM node
#[derive(Debug, Clone)]
pub struct MockNode {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    displayed: bool,
    enabled: bool,
    selected: bool,
    location: Point,
    children: Vec<MockNode>,
}

impl MockNode {
    /// A visible, enabled node
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            attributes: BTreeMap::new(),
            text: String::new(),
            displayed: true,
            enabled: true,
            selected: false,
            location: Point::default(),
            children: Vec::new(),
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the `id` attribute
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Set the own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Checked or selected
    #[must_use]
    pub const fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Position
    #[must_use]
    pub const fn at(mut self, x: i64, y: i64) -> Self {
        self.location = Point { x, y };
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

/// A DOM mutation applied once its time has come
#[derive(Debug, Clone)]
pub enum MockChange {
    /// Make the node with this id visible
    Show(String),
    /// Hide the node with this id
    Hide(String),
    /// Enable the node with this id
    Enable(String),
    /// Disable the node with this id
    Disable(String),
    /// Detach the node with this id; existing handles go stale
    Remove(String),
    /// Move the node with this id
    Move(String, Point),
    /// Append a node under the node with this id
    Insert(String, MockNode),
}

// =============================================================================
// ARENA
// =============================================================================

#[derive(Debug, Clone)]
struct DomNode {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    displayed: bool,
    enabled: bool,
    selected: bool,
    location: Point,
    parent: Option<usize>,
    children: Vec<usize>,
    removed: bool,
}

#[derive(Debug)]
struct MockDom {
    nodes: Vec<DomNode>,
    root: usize,
    frame: Option<usize>,
    url: String,
    routes: HashMap<String, Vec<MockNode>>,
    scheduled: Vec<(Instant, MockChange)>,
    flaky_keystrokes: u32,
    calls: Vec<String>,
    scripts: Vec<String>,
    closed: bool,
}

impl MockDom {
    fn empty() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: 0,
            frame: None,
            url: "about:blank".to_string(),
            routes: HashMap::new(),
            scheduled: Vec::new(),
            flaky_keystrokes: 0,
            calls: Vec::new(),
            scripts: Vec::new(),
            closed: false,
        };
        dom.load(Vec::new());
        dom
    }

    fn load(&mut self, body: Vec<MockNode>) {
        for node in &mut self.nodes {
            node.removed = true;
        }
        let root = self.insert(None, MockNode::new(DOCUMENT_TAG).children(body));
        self.root = root;
        self.frame = None;
    }

    fn insert(&mut self, parent: Option<usize>, node: MockNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(DomNode {
            tag: node.tag,
            attributes: node.attributes,
            text: node.text,
            displayed: node.displayed,
            enabled: node.enabled,
            selected: node.selected,
            location: node.location,
            parent,
            children: Vec::new(),
            removed: false,
        });
        for child in node.children {
            let child_index = self.insert(Some(index), child);
            self.nodes[index].children.push(child_index);
        }
        index
    }

    fn apply_due(&mut self) {
        let now = Instant::now();
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|(at, _)| *at <= now);
        self.scheduled = pending;
        for (_, change) in due {
            self.apply(change);
        }
    }

    fn apply(&mut self, change: MockChange) {
        match change {
            MockChange::Show(id) => {
                if let Some(i) = self.find_by_id(&id) {
                    self.nodes[i].displayed = true;
                }
            }
            MockChange::Hide(id) => {
                if let Some(i) = self.find_by_id(&id) {
                    self.nodes[i].displayed = false;
                }
            }
            MockChange::Enable(id) => {
                if let Some(i) = self.find_by_id(&id) {
                    self.nodes[i].enabled = true;
                }
            }
            MockChange::Disable(id) => {
                if let Some(i) = self.find_by_id(&id) {
                    self.nodes[i].enabled = false;
                }
            }
            MockChange::Remove(id) => {
                if let Some(i) = self.find_by_id(&id) {
                    self.mark_removed(i);
                    if let Some(parent) = self.nodes[i].parent {
                        self.nodes[parent].children.retain(|c| *c != i);
                    }
                }
            }
            MockChange::Move(id, point) => {
                if let Some(i) = self.find_by_id(&id) {
                    self.nodes[i].location = point;
                }
            }
            MockChange::Insert(id, node) => {
                if let Some(i) = self.find_by_id(&id) {
                    let child = self.insert(Some(i), node);
                    self.nodes[i].children.push(child);
                }
            }
        }
    }

    fn mark_removed(&mut self, index: usize) {
        self.nodes[index].removed = true;
        let children = self.nodes[index].children.clone();
        for child in children {
            self.mark_removed(child);
        }
    }

    fn find_by_id(&self, id: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| !n.removed && n.attributes.get("id").is_some_and(|v| v == id))
    }

    fn node(&self, element: &WebElementRef) -> DriverResult<usize> {
        let index = element
            .0
            .strip_prefix("node-")
            .and_then(|i| i.parse::<usize>().ok())
            .filter(|i| *i < self.nodes.len())
            .ok_or_else(|| DriverError::NotFound(element.0.clone()))?;
        if self.nodes[index].removed {
            return Err(DriverError::StaleElementReference(element.0.clone()));
        }
        Ok(index)
    }

    fn document(&self) -> usize {
        self.frame.unwrap_or(self.root)
    }

    fn is_frame(&self, index: usize) -> bool {
        matches!(self.nodes[index].tag.as_str(), "iframe" | "frame")
    }

    /// Descendants in document order, not crossing into nested frames
    fn descendants(&self, context: usize) -> Vec<usize> {
        let mut found = Vec::new();
        let mut stack: Vec<usize> = self.nodes[context].children.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            found.push(index);
            if !self.is_frame(index) {
                stack.extend(self.nodes[index].children.iter().rev().copied());
            }
        }
        found
    }

    fn visible(&self, index: usize) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            if !self.nodes[i].displayed {
                return false;
            }
            current = self.nodes[i].parent;
        }
        true
    }

    fn visible_text(&self, index: usize) -> String {
        if !self.visible(index) {
            return String::new();
        }
        let mut parts = Vec::new();
        let own = self.nodes[index].text.trim();
        if !own.is_empty() {
            parts.push(own.to_string());
        }
        for child in &self.nodes[index].children {
            let text = self.visible_text(*child);
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join(" ")
    }

    fn check_open(&self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::WebDriver("session is closed".into()));
        }
        Ok(())
    }
}

fn element_ref(index: usize) -> WebElementRef {
    WebElementRef(format!("node-{index}"))
}

// =============================================================================
// SELECTORS
// =============================================================================

fn matches_by(dom: &MockDom, index: usize, by: &By) -> DriverResult<bool> {
    let node = &dom.nodes[index];
    let attr = |name: &str| node.attributes.get(name).map(String::as_str);
    Ok(match by {
        By::Id(v) => attr("id") == Some(v.as_str()),
        By::Name(v) => attr("name") == Some(v.as_str()),
        By::ClassName(v) => attr("class").is_some_and(|c| c.split_whitespace().any(|c| c == v)),
        By::LinkText(v) => node.tag == "a" && dom.visible_text(index) == v.trim(),
        By::TagName(v) => node.tag.eq_ignore_ascii_case(v),
        By::CssSelector(selector) => css_matches(node, selector)?,
        By::XPath(_) => false,
    })
}

fn css_matches(node: &DomNode, selector: &str) -> DriverResult<bool> {
    let compound = Regex::new(
        r#"^([A-Za-z][\w-]*|\*)?((?:#[\w-]+|\.[\w-]+|\[[\w-]+(?:=['"]?[^'"\]]*['"]?)?\])*)$"#,
    )
    .map_err(|e| DriverError::WebDriver(e.to_string()))?;
    let part = Regex::new(r#"#([\w-]+)|\.([\w-]+)|\[([\w-]+)(?:=['"]?([^'"\]]*)['"]?)?\]"#)
        .map_err(|e| DriverError::WebDriver(e.to_string()))?;

    let selector = selector.trim();
    let caps = compound
        .captures(selector)
        .ok_or_else(|| DriverError::WebDriver(format!("unsupported css selector '{selector}'")))?;
    if let Some(tag) = caps.get(1) {
        if tag.as_str() != "*" && !node.tag.eq_ignore_ascii_case(tag.as_str()) {
            return Ok(false);
        }
    }
    let rest = caps.get(2).map_or("", |m| m.as_str());
    for p in part.captures_iter(rest) {
        let ok = if let Some(id) = p.get(1) {
            node.attributes.get("id").is_some_and(|v| v == id.as_str())
        } else if let Some(class) = p.get(2) {
            node.attributes
                .get("class")
                .is_some_and(|c| c.split_whitespace().any(|c| c == class.as_str()))
        } else if let Some(name) = p.get(3) {
            match (node.attributes.get(name.as_str()), p.get(4)) {
                (Some(actual), Some(expected)) => actual == expected.as_str(),
                (Some(_), None) => true,
                (None, _) => false,
            }
        } else {
            true
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

enum Axis {
    Descendant,
    Child,
    Absolute,
}

fn xpath_find(dom: &MockDom, context: usize, expression: &str) -> DriverResult<Vec<usize>> {
    let unsupported = || DriverError::WebDriver(format!("unsupported xpath '{expression}'"));
    let group = Regex::new(r"^\((.+)\)\[(\d+)\]$").map_err(|e| DriverError::WebDriver(e.to_string()))?;
    let step = Regex::new(r"^(\.//|//|\./)([A-Za-z][\w-]*|\*)(?:\[(.+)\])?$")
        .map_err(|e| DriverError::WebDriver(e.to_string()))?;
    let predicate = Regex::new(r#"^@([\w-]+)=(?:'([^']*)'|"([^"]*)")$"#)
        .map_err(|e| DriverError::WebDriver(e.to_string()))?;

    let expression = expression.trim();
    if let Some(caps) = group.captures(expression) {
        let inner = caps.get(1).map_or("", |m| m.as_str());
        let position: usize = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(unsupported)?;
        let matches = xpath_find(dom, context, inner)?;
        return Ok(position
            .checked_sub(1)
            .and_then(|i| matches.get(i).copied())
            .into_iter()
            .collect());
    }

    let caps = step.captures(expression).ok_or_else(unsupported)?;
    let axis = match caps.get(1).map(|m| m.as_str()) {
        Some(".//") => Axis::Descendant,
        Some("./") => Axis::Child,
        _ => Axis::Absolute,
    };
    let tag = caps.get(2).map_or("*", |m| m.as_str());
    let mut conditions = Vec::new();
    if let Some(predicates) = caps.get(3) {
        for clause in predicates.as_str().split(" and ") {
            let p = predicate.captures(clause.trim()).ok_or_else(unsupported)?;
            let name = p.get(1).map_or("", |m| m.as_str()).to_string();
            let value = p
                .get(2)
                .or_else(|| p.get(3))
                .map_or("", |m| m.as_str())
                .to_string();
            conditions.push((name, value));
        }
    }

    let candidates = match axis {
        Axis::Descendant => dom.descendants(context),
        Axis::Absolute => dom.descendants(dom.document()),
        Axis::Child => dom.nodes[context].children.clone(),
    };
    Ok(candidates
        .into_iter()
        .filter(|i| {
            let node = &dom.nodes[*i];
            (tag == "*" || node.tag.eq_ignore_ascii_case(tag))
                && conditions
                    .iter()
                    .all(|(name, value)| node.attributes.get(name).is_some_and(|v| v == value))
        })
        .collect())
}

// =============================================================================
// DRIVER
// =============================================================================

/// In-memory [`WebDriver`]
#[derive(Debug)]
pub struct MockWebDriver {
    dom: RefCell<MockDom>,
}

impl Default for MockWebDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWebDriver {
    /// A driver showing an empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            dom: RefCell::new(MockDom::empty()),
        }
    }

    /// A driver showing `body` at `url`
    #[must_use]
    pub fn with_page(url: &str, body: Vec<MockNode>) -> Self {
        let driver = Self::new();
        driver.set_page(url, body);
        driver
    }

    /// Register the document served for a URL on navigation
    #[must_use]
    pub fn with_route(self, url: &str, body: Vec<MockNode>) -> Self {
        let _ = self.dom.borrow_mut().routes.insert(url.to_string(), body);
        self
    }

    /// Replace the current document
    pub fn set_page(&self, url: &str, body: Vec<MockNode>) {
        let mut dom = self.dom.borrow_mut();
        dom.load(body);
        dom.url = url.to_string();
    }

    /// Apply `change` once `after` has passed
    pub fn schedule(&self, after: Duration, change: MockChange) {
        self.dom
            .borrow_mut()
            .scheduled
            .push((Instant::now() + after, change));
    }

    /// Apply `change` now
    pub fn apply(&self, change: MockChange) {
        self.dom.borrow_mut().apply(change);
    }

    /// The next `count` keystroke entries lose their last character
    pub fn drop_keystrokes(&self, count: u32) {
        self.dom.borrow_mut().flaky_keystrokes = count;
    }

    /// Handle of the live node with this id
    pub fn element_by_id(&self, id: &str) -> Option<WebElementRef> {
        self.dom.borrow().find_by_id(id).map(element_ref)
    }

    /// `value` attribute of the node with this id
    pub fn value_of(&self, id: &str) -> Option<String> {
        let dom = self.dom.borrow();
        dom.find_by_id(id)
            .and_then(|i| dom.nodes[i].attributes.get("value").cloned())
    }

    /// Selected state of the node with this id
    pub fn is_selected_by_id(&self, id: &str) -> bool {
        let dom = self.dom.borrow();
        dom.find_by_id(id).is_some_and(|i| dom.nodes[i].selected)
    }

    /// Recorded verb calls, e.g. `click:go`
    pub fn calls(&self) -> Vec<String> {
        self.dom.borrow().calls.clone()
    }

    /// Scripts executed so far
    pub fn scripts(&self) -> Vec<String> {
        self.dom.borrow().scripts.clone()
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.dom.borrow().closed
    }

    fn with_dom<T>(&self, f: impl FnOnce(&mut MockDom) -> DriverResult<T>) -> DriverResult<T> {
        let mut dom = self.dom.borrow_mut();
        dom.check_open()?;
        dom.apply_due();
        f(&mut dom)
    }

    fn record(dom: &mut MockDom, verb: &str, index: usize) {
        let label = dom.nodes[index]
            .attributes
            .get("id")
            .cloned()
            .unwrap_or_else(|| format!("node-{index}"));
        dom.calls.push(format!("{verb}:{label}"));
    }

    fn interactable(dom: &MockDom, index: usize, element: &WebElementRef) -> DriverResult<()> {
        if dom.visible(index) {
            Ok(())
        } else {
            Err(DriverError::ElementNotVisible(element.0.clone()))
        }
    }
}

impl WebDriver for MockWebDriver {
    fn find_elements(&self, scope: Option<&WebElementRef>, by: &By) -> DriverResult<Vec<WebElementRef>> {
        self.with_dom(|dom| {
            let context = match scope {
                Some(element) => dom.node(element)?,
                None => dom.document(),
            };
            let found = match by {
                By::XPath(expression) => xpath_find(dom, context, expression)?,
                other => {
                    let mut found = Vec::new();
                    for index in dom.descendants(context) {
                        if matches_by(dom, index, other)? {
                            found.push(index);
                        }
                    }
                    found
                }
            };
            Ok(found.into_iter().map(element_ref).collect())
        })
    }

    fn tag_name(&self, element: &WebElementRef) -> DriverResult<String> {
        self.with_dom(|dom| Ok(dom.nodes[dom.node(element)?].tag.clone()))
    }

    fn attribute(&self, element: &WebElementRef, name: &str) -> DriverResult<Option<String>> {
        self.with_dom(|dom| {
            let index = dom.node(element)?;
            let node = &dom.nodes[index];
            Ok(match name {
                "checked" | "selected" => node.selected.then(|| "true".to_string()),
                "value" if node.tag == "option" && !node.attributes.contains_key("value") => {
                    Some(node.text.clone())
                }
                _ => node.attributes.get(name).cloned(),
            })
        })
    }

    fn text(&self, element: &WebElementRef) -> DriverResult<String> {
        self.with_dom(|dom| {
            let index = dom.node(element)?;
            Ok(dom.visible_text(index))
        })
    }

    fn is_displayed(&self, element: &WebElementRef) -> DriverResult<bool> {
        self.with_dom(|dom| {
            let index = dom.node(element)?;
            Ok(dom.visible(index))
        })
    }

    fn is_enabled(&self, element: &WebElementRef) -> DriverResult<bool> {
        self.with_dom(|dom| Ok(dom.nodes[dom.node(element)?].enabled))
    }

    fn is_selected(&self, element: &WebElementRef) -> DriverResult<bool> {
        self.with_dom(|dom| Ok(dom.nodes[dom.node(element)?].selected))
    }

    fn click(&self, element: &WebElementRef) -> DriverResult<()> {
        self.with_dom(|dom| {
            let index = dom.node(element)?;
            Self::interactable(dom, index, element)?;
            Self::record(dom, "click", index);
            if !dom.nodes[index].enabled {
                return Ok(());
            }
            let tag = dom.nodes[index].tag.clone();
            let input_type = dom.nodes[index].attributes.get("type").cloned();
            match (tag.as_str(), input_type.as_deref()) {
                ("input", Some("checkbox")) => {
                    dom.nodes[index].selected = !dom.nodes[index].selected;
                }
                ("input", Some("radio")) => {
                    let group = dom.nodes[index].attributes.get("name").cloned();
                    if let Some(group) = group {
                        for node in &mut dom.nodes {
                            if node.attributes.get("name") == Some(&group) {
                                node.selected = false;
                            }
                        }
                    }
                    dom.nodes[index].selected = true;
                }
                ("option", _) => {
                    let select = dom.nodes[index].parent;
                    let multiple = select
                        .is_some_and(|s| dom.nodes[s].attributes.contains_key("multiple"));
                    if multiple {
                        dom.nodes[index].selected = !dom.nodes[index].selected;
                    } else {
                        if let Some(select) = select {
                            for sibling in dom.nodes[select].children.clone() {
                                dom.nodes[sibling].selected = false;
                            }
                        }
                        dom.nodes[index].selected = true;
                    }
                }
                _ => {}
            }
            Ok(())
        })
    }

    fn clear(&self, element: &WebElementRef) -> DriverResult<()> {
        self.with_dom(|dom| {
            let index = dom.node(element)?;
            Self::interactable(dom, index, element)?;
            Self::record(dom, "clear", index);
            let _ = dom.nodes[index]
                .attributes
                .insert("value".into(), String::new());
            Ok(())
        })
    }

    fn send_keys(&self, element: &WebElementRef, keys: &str) -> DriverResult<()> {
        self.with_dom(|dom| {
            let index = dom.node(element)?;
            Self::interactable(dom, index, element)?;
            Self::record(dom, "send_keys", index);
            let mut typed = keys.to_string();
            if dom.flaky_keystrokes > 0 {
                dom.flaky_keystrokes -= 1;
                let _ = typed.pop();
            }
            let node = &mut dom.nodes[index];
            // Fields marked data-case="upper" store what the user typed in upper case
            if node.attributes.get("data-case").is_some_and(|c| c == "upper") {
                typed = typed.to_uppercase();
            }
            let file_input = node.attributes.get("type").is_some_and(|t| t == "file");
            let value = node.attributes.entry("value".into()).or_default();
            if file_input {
                *value = typed;
            } else {
                value.push_str(&typed);
            }
            Ok(())
        })
    }

    fn hover(&self, element: &WebElementRef) -> DriverResult<()> {
        self.with_dom(|dom| {
            let index = dom.node(element)?;
            Self::interactable(dom, index, element)?;
            Self::record(dom, "hover", index);
            Ok(())
        })
    }

    fn location(&self, element: &WebElementRef) -> DriverResult<Point> {
        self.with_dom(|dom| Ok(dom.nodes[dom.node(element)?].location))
    }

    fn navigate(&self, url: &str) -> DriverResult<()> {
        self.with_dom(|dom| {
            dom.calls.push(format!("navigate:{url}"));
            if let Some(body) = dom.routes.get(url).cloned() {
                dom.load(body);
            }
            dom.url = url.to_string();
            Ok(())
        })
    }

    fn current_url(&self) -> DriverResult<String> {
        self.with_dom(|dom| Ok(dom.url.clone()))
    }

    fn execute_script(&self, script: &str, args: &[WebElementRef]) -> DriverResult<serde_json::Value> {
        self.with_dom(|dom| {
            for arg in args {
                let _ = dom.node(arg)?;
            }
            dom.scripts.push(script.to_string());
            Ok(serde_json::Value::Null)
        })
    }

    fn switch_to_frame(&self, frame: Option<&WebElementRef>) -> DriverResult<()> {
        self.with_dom(|dom| {
            match frame {
                Some(element) => {
                    let index = dom.node(element)?;
                    if !dom.is_frame(index) {
                        return Err(DriverError::WebDriver(format!(
                            "{} is a <{}>, not a frame",
                            element.0, dom.nodes[index].tag
                        )));
                    }
                    dom.frame = Some(index);
                }
                None => dom.frame = None,
            }
            Ok(())
        })
    }

    fn close(&self) -> DriverResult<()> {
        self.with_dom(|dom| {
            dom.closed = true;
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn driver() -> MockWebDriver {
        MockWebDriver::with_page(
            "http://host/",
            vec![
                MockNode::new("div").id("menu").attr("class", "nav main").children([
                    MockNode::new("a").attr("href", "/home").text("Home"),
                    MockNode::new("a").attr("href", "/about").text("About"),
                ]),
                MockNode::new("img").attr("alt", "Logo").attr("src", "/logo.png"),
                MockNode::new("iframe").id("frame").child(MockNode::new("input").id("inner")),
            ],
        )
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_basic_strategies() {
            let d = driver();
            assert_eq!(d.find_elements(None, &By::Id("menu".into())).unwrap().len(), 1);
            assert_eq!(d.find_elements(None, &By::ClassName("nav".into())).unwrap().len(), 1);
            assert_eq!(d.find_elements(None, &By::LinkText("About".into())).unwrap().len(), 1);
            assert_eq!(d.find_elements(None, &By::TagName("A".into())).unwrap().len(), 2);
        }

        #[test]
        fn test_css_compound() {
            let d = driver();
            let found = d.find_elements(None, &By::CssSelector("div#menu.main".into())).unwrap();
            assert_eq!(found.len(), 1);
            let found = d.find_elements(None, &By::CssSelector("a[href='/about']".into())).unwrap();
            assert_eq!(found.len(), 1);
            assert!(d.find_elements(None, &By::CssSelector("div > a".into())).is_err());
        }

        #[test]
        fn test_xpath_subset() {
            let d = driver();
            let img = d
                .find_elements(None, &By::XPath(".//img[@alt='Logo' and @src='/logo.png']".into()))
                .unwrap();
            assert_eq!(img.len(), 1);
            let second = d.find_elements(None, &By::XPath("(.//a)[2]".into())).unwrap();
            assert_eq!(d.text(&second[0]).unwrap(), "About");
            let menu = d.element_by_id("menu").unwrap();
            assert_eq!(d.find_elements(Some(&menu), &By::XPath("./*".into())).unwrap().len(), 2);
            assert!(d.find_elements(None, &By::XPath("//a[contains(., 'x')]".into())).is_err());
        }

        #[test]
        fn test_frames_isolate_documents() {
            let d = driver();
            assert!(d.find_elements(None, &By::Id("inner".into())).unwrap().is_empty());
            let frame = d.element_by_id("frame").unwrap();
            d.switch_to_frame(Some(&frame)).unwrap();
            assert_eq!(d.find_elements(None, &By::Id("inner".into())).unwrap().len(), 1);
            d.switch_to_frame(None).unwrap();
            assert!(d.find_elements(None, &By::Id("inner".into())).unwrap().is_empty());
        }
    }

    mod state_tests {
        use super::*;

        #[test]
        fn test_removed_nodes_are_stale() {
            let d = driver();
            let menu = d.element_by_id("menu").unwrap();
            d.apply(MockChange::Remove("menu".into()));
            assert!(matches!(d.is_displayed(&menu), Err(DriverError::StaleElementReference(_))));
        }

        #[test]
        fn test_scheduled_change_applies_later() {
            let d = driver();
            let menu = d.element_by_id("menu").unwrap();
            d.schedule(Duration::from_millis(30), MockChange::Hide("menu".into()));
            assert!(d.is_displayed(&menu).unwrap());
            std::thread::sleep(Duration::from_millis(50));
            assert!(!d.is_displayed(&menu).unwrap());
        }

        #[test]
        fn test_closed_session_rejects_calls() {
            let d = driver();
            d.close().unwrap();
            assert!(d.is_closed());
            assert!(d.current_url().is_err());
        }

        #[test]
        fn test_navigation_routes() {
            let d = MockWebDriver::new()
                .with_route("http://host/login", vec![MockNode::new("input").id("user")]);
            d.navigate("http://host/login").unwrap();
            assert_eq!(d.current_url().unwrap(), "http://host/login");
            assert!(d.element_by_id("user").is_some());
        }
    }
}
