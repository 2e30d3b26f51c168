//! In-memory control tree for unit testing.
//!
//! [`MockUiAutomation`] answers [`UiAutomation`] calls against a tree of
//! [`MockControl`]s. Searches walk every descendant of the scope (frames
//! included), match the control type and search properties, then apply the
//! `TagInstance` filter.

use std::cell::RefCell;
use std::collections::HashMap;

use super::{ControlRef, SearchSpec, UiAutomation, UiError, UiResult, TAG_INSTANCE};
use crate::wait::Point;

/// Declarative description of a control
#[derive(Debug, Clone)]
pub struct MockControl {
    control_type: String,
    properties: Vec<(String, String)>,
    visible: bool,
    enabled: bool,
    location: Point,
    children: Vec<MockControl>,
}

impl MockControl {
    /// A visible, enabled control
    pub fn new(control_type: impl Into<String>) -> Self {
        Self {
            control_type: control_type.into(),
            properties: Vec::new(),
            visible: true,
            enabled: true,
            location: Point::default(),
            children: Vec::new(),
        }
    }

    /// Set a property
    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Set the `Id` property
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.prop("Id", id)
    }

    /// Not visible
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
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

#[derive(Debug)]
struct Node {
    control_type: String,
    properties: Vec<(String, String)>,
    visible: bool,
    enabled: bool,
    location: Point,
    children: Vec<usize>,
    removed: bool,
}

impl Node {
    fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn set_property(&mut self, name: &str, value: &str) {
        match self.properties.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.properties.push((name.to_string(), value.to_string())),
        }
    }

    fn label(&self, index: usize) -> String {
        self.property("Id")
            .map_or_else(|| format!("ctl-{index}"), str::to_string)
    }
}

#[derive(Debug)]
struct MockUi {
    nodes: Vec<Node>,
    root: usize,
    uri: String,
    routes: HashMap<String, Vec<MockControl>>,
    calls: Vec<String>,
    scripts: Vec<String>,
    closed: bool,
}

impl MockUi {
    fn load(&mut self, body: Vec<MockControl>) {
        for node in &mut self.nodes {
            node.removed = true;
        }
        self.root = self.insert(MockControl::new("Document").children(body));
    }

    fn insert(&mut self, control: MockControl) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            control_type: control.control_type,
            properties: control.properties,
            visible: control.visible,
            enabled: control.enabled,
            location: control.location,
            children: Vec::new(),
            removed: false,
        });
        for child in control.children {
            let child_index = self.insert(child);
            self.nodes[index].children.push(child_index);
        }
        index
    }

    fn find_by_id(&self, id: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| !n.removed && n.property("Id") == Some(id))
    }

    fn node(&self, control: &ControlRef) -> UiResult<usize> {
        let index = control
            .0
            .strip_prefix("ctl-")
            .and_then(|i| i.parse::<usize>().ok())
            .filter(|i| *i < self.nodes.len())
            .ok_or_else(|| UiError::NotFound(control.0.clone()))?;
        if self.nodes[index].removed {
            return Err(UiError::ControlNotAvailable(control.0.clone()));
        }
        Ok(index)
    }

    fn descendants(&self, index: usize, out: &mut Vec<usize>) {
        for child in &self.nodes[index].children {
            out.push(*child);
            self.descendants(*child, out);
        }
    }

    fn matches(&self, index: usize, spec: &SearchSpec) -> bool {
        let node = &self.nodes[index];
        let type_matches = spec
            .control_type
            .as_deref()
            .map_or(true, |t| t.eq_ignore_ascii_case(&node.control_type));
        type_matches
            && spec
                .search_properties
                .iter()
                .all(|(k, v)| node.property(k) == Some(v.as_str()))
    }

    fn check_open(&self) -> UiResult<()> {
        if self.closed {
            return Err(UiError::Automation("browser window has been closed".into()));
        }
        Ok(())
    }

    fn record(&mut self, verb: &str, index: usize) {
        let label = self.nodes[index].label(index);
        self.calls.push(format!("{verb}:{label}"));
    }
}

/// Test double for [`UiAutomation`]
#[derive(Debug)]
pub struct MockUiAutomation {
    ui: RefCell<MockUi>,
}

impl Default for MockUiAutomation {
    fn default() -> Self {
        Self::new()
    }
}

impl MockUiAutomation {
    /// A window showing an empty document
    #[must_use]
    pub fn new() -> Self {
        let mut ui = MockUi {
            nodes: Vec::new(),
            root: 0,
            uri: "about:blank".to_string(),
            routes: HashMap::new(),
            calls: Vec::new(),
            scripts: Vec::new(),
            closed: false,
        };
        ui.load(Vec::new());
        Self { ui: RefCell::new(ui) }
    }

    /// A window showing `body` at `uri`
    #[must_use]
    pub fn with_page(uri: &str, body: Vec<MockControl>) -> Self {
        let automation = Self::new();
        {
            let mut ui = automation.ui.borrow_mut();
            ui.load(body);
            ui.uri = uri.to_string();
        }
        automation
    }

    /// Register the document served for a URL on navigation
    #[must_use]
    pub fn with_route(self, uri: &str, body: Vec<MockControl>) -> Self {
        let _ = self.ui.borrow_mut().routes.insert(uri.to_string(), body);
        self
    }

    /// Show or hide the control with this id
    pub fn set_visible(&self, id: &str, visible: bool) {
        let mut ui = self.ui.borrow_mut();
        if let Some(i) = ui.find_by_id(id) {
            ui.nodes[i].visible = visible;
        }
    }

    /// Enable or disable the control with this id
    pub fn set_enabled(&self, id: &str, enabled: bool) {
        let mut ui = self.ui.borrow_mut();
        if let Some(i) = ui.find_by_id(id) {
            ui.nodes[i].enabled = enabled;
        }
    }

    /// Detach the control with this id and its subtree
    pub fn remove(&self, id: &str) {
        let mut ui = self.ui.borrow_mut();
        let Some(index) = ui.find_by_id(id) else {
            return;
        };
        let mut subtree = vec![index];
        ui.descendants(index, &mut subtree);
        for i in subtree {
            ui.nodes[i].removed = true;
        }
        for node in &mut ui.nodes {
            node.children.retain(|c| *c != index);
        }
    }

    /// A property of the control with this id
    pub fn property_of(&self, id: &str, name: &str) -> Option<String> {
        let ui = self.ui.borrow();
        ui.find_by_id(id)
            .and_then(|i| ui.nodes[i].property(name).map(str::to_string))
    }

    /// Recorded calls, e.g. `click:go` or `set:user:Text=ann`
    pub fn calls(&self) -> Vec<String> {
        self.ui.borrow().calls.clone()
    }

    /// Scripts executed so far
    pub fn scripts(&self) -> Vec<String> {
        self.ui.borrow().scripts.clone()
    }

    /// Whether `close` was called
    pub fn is_closed(&self) -> bool {
        self.ui.borrow().closed
    }

    fn with_ui<T>(&self, f: impl FnOnce(&mut MockUi) -> UiResult<T>) -> UiResult<T> {
        let mut ui = self.ui.borrow_mut();
        ui.check_open()?;
        f(&mut ui)
    }
}

impl UiAutomation for MockUiAutomation {
    fn find_controls(&self, scope: Option<&ControlRef>, spec: &SearchSpec) -> UiResult<Vec<ControlRef>> {
        self.with_ui(|ui| {
            let start = match scope {
                Some(control) => ui.node(control)?,
                None => ui.root,
            };
            let mut candidates = Vec::new();
            ui.descendants(start, &mut candidates);
            let mut found: Vec<usize> = candidates
                .into_iter()
                .filter(|i| !ui.nodes[*i].removed && ui.matches(*i, spec))
                .collect();

            for (name, value) in &spec.filter_properties {
                if name.eq_ignore_ascii_case(TAG_INSTANCE) {
                    let instance = value
                        .parse::<usize>()
                        .map_err(|_| UiError::Automation(format!("bad TagInstance '{value}'")))?;
                    found = found.get(instance.wrapping_sub(1)).copied().into_iter().collect();
                } else {
                    found.retain(|i| ui.nodes[*i].property(name) == Some(value.as_str()));
                }
            }
            Ok(found.into_iter().map(|i| ControlRef(format!("ctl-{i}"))).collect())
        })
    }

    fn control_type(&self, control: &ControlRef) -> UiResult<String> {
        self.with_ui(|ui| Ok(ui.nodes[ui.node(control)?].control_type.clone()))
    }

    fn get_property(&self, control: &ControlRef, name: &str) -> UiResult<Option<String>> {
        self.with_ui(|ui| {
            let node = &ui.nodes[ui.node(control)?];
            if name.eq_ignore_ascii_case("Enabled") {
                return Ok(Some(if node.enabled { "True" } else { "False" }.to_string()));
            }
            Ok(node.property(name).map(str::to_string))
        })
    }

    fn set_property(&self, control: &ControlRef, name: &str, value: &str) -> UiResult<()> {
        self.with_ui(|ui| {
            let index = ui.node(control)?;
            if !ui.nodes[index].visible {
                return Err(UiError::ControlNotVisible(control.0.clone()));
            }
            if !ui.nodes[index].enabled {
                return Err(UiError::Automation(format!("control '{}' is disabled", control.0)));
            }
            if ui.nodes[index].control_type == "RadioButton" && name.eq_ignore_ascii_case("Selected") {
                let group = ui.nodes[index].property("Name").map(str::to_string);
                for node in &mut ui.nodes {
                    if node.control_type == "RadioButton" && node.property("Name").map(str::to_string) == group {
                        node.set_property("Selected", "False");
                    }
                }
            }
            ui.nodes[index].set_property(name, value);
            let label = ui.nodes[index].label(index);
            ui.calls.push(format!("set:{label}:{name}={value}"));
            Ok(())
        })
    }

    fn exists(&self, control: &ControlRef) -> UiResult<bool> {
        self.with_ui(|ui| Ok(ui.nodes[ui.node(control)?].visible))
    }

    fn enabled(&self, control: &ControlRef) -> UiResult<bool> {
        self.with_ui(|ui| Ok(ui.nodes[ui.node(control)?].enabled))
    }

    fn click(&self, control: &ControlRef) -> UiResult<()> {
        self.with_ui(|ui| {
            let index = ui.node(control)?;
            if !ui.nodes[index].visible {
                return Err(UiError::ControlNotVisible(control.0.clone()));
            }
            if ui.nodes[index].control_type == "CheckBox" {
                let checked = ui.nodes[index].property("Checked") == Some("True");
                ui.nodes[index].set_property("Checked", if checked { "False" } else { "True" });
            }
            ui.record("click", index);
            Ok(())
        })
    }

    fn hover(&self, control: &ControlRef) -> UiResult<()> {
        self.with_ui(|ui| {
            let index = ui.node(control)?;
            ui.record("hover", index);
            Ok(())
        })
    }

    fn draw_highlight(&self, control: &ControlRef) -> UiResult<()> {
        self.with_ui(|ui| {
            let index = ui.node(control)?;
            ui.record("highlight", index);
            Ok(())
        })
    }

    fn location(&self, control: &ControlRef) -> UiResult<Point> {
        self.with_ui(|ui| Ok(ui.nodes[ui.node(control)?].location))
    }

    fn navigate(&self, url: &str) -> UiResult<()> {
        self.with_ui(|ui| {
            if let Some(body) = ui.routes.get(url).cloned() {
                ui.load(body);
            }
            ui.uri = url.to_string();
            Ok(())
        })
    }

    fn uri(&self) -> UiResult<String> {
        self.with_ui(|ui| Ok(ui.uri.clone()))
    }

    fn execute_script(&self, script: &str) -> UiResult<serde_json::Value> {
        self.with_ui(|ui| {
            ui.scripts.push(script.to_string());
            Ok(serde_json::Value::Null)
        })
    }

    fn close(&self) -> UiResult<()> {
        self.with_ui(|ui| {
            ui.closed = true;
            Ok(())
        })
    }
}
