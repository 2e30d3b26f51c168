//! The built page object graph.
//!
//! A page factory produces a [`NativePage`]: a root [`ElementProxy`] plus one
//! slot per declared property. Proxies only carry the driver-native locator
//! and their search scope; nothing touches the live UI until an element
//! handler resolves a proxy at the moment of interaction.
//!
//! Ownership runs downward through slots. A child proxy holds its parent
//! strongly (it needs it as a search scope) but parents never hold children,
//! so the graph has no reference cycles.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::builder::PageFactory;
use crate::element_type::{ElementKind, ElementType};
use crate::schema::{PageSchema, VirtualProperty};

/// Locators used to walk a table's rows and cells
#[derive(Debug, Clone)]
pub struct TableRows<L> {
    /// Locates rows under the table
    pub row_locator: L,
    /// Locates header cells under a row
    pub header_cell_locator: L,
    /// Locates data cells under a row
    pub cell_locator: L,
}

/// How a list wrapper builds its items
#[derive(Clone)]
pub struct ListBinding<L> {
    /// Factory for one item page
    pub item_factory: PageFactory<L>,
    /// Locator matching every item under the list container
    pub item_locator: L,
    /// Control type of an item root
    pub item_type: ElementType,
}

impl<L: fmt::Debug> fmt::Debug for ListBinding<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListBinding")
            .field("item_factory", &self.item_factory.name())
            .field("item_locator", &self.item_locator)
            .field("item_type", &self.item_type.name)
            .finish()
    }
}

/// A lazily-resolved element
#[derive(Debug)]
pub struct ElementProxy<L> {
    name: String,
    element_type: ElementType,
    locator: L,
    parent: Option<Rc<ElementProxy<L>>>,
    list: Option<ListBinding<L>>,
    table: OnceCell<TableRows<L>>,
}

impl<L> ElementProxy<L> {
    /// Create a proxy
    pub fn new(
        name: impl Into<String>,
        element_type: ElementType,
        locator: L,
        parent: Option<Rc<ElementProxy<L>>>,
    ) -> Self {
        Self {
            name: name.into(),
            element_type,
            locator,
            parent,
            list: None,
            table: OnceCell::new(),
        }
    }

    /// Attach a list binding
    #[must_use]
    pub fn with_list(mut self, list: ListBinding<L>) -> Self {
        self.list = Some(list);
        self
    }

    /// Property or type name this proxy was built for
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Control type
    pub fn element_type(&self) -> &ElementType {
        &self.element_type
    }

    /// Build kind
    pub fn kind(&self) -> ElementKind {
        self.element_type.kind
    }

    /// Driver-native locator
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Search scope
    pub fn parent(&self) -> Option<&Rc<ElementProxy<L>>> {
        self.parent.as_ref()
    }

    /// List binding, for list wrappers
    pub fn list(&self) -> Option<&ListBinding<L>> {
        self.list.as_ref()
    }

    /// Row collection driver, for tables
    pub fn table_rows(&self) -> Option<&TableRows<L>> {
        self.table.get()
    }

    /// One-shot setter used by the builder after the table proxy exists
    pub(crate) fn assign_row_driver(&self, rows: TableRows<L>) -> bool {
        self.table.set(rows).is_ok()
    }

    /// Ancestors from the top-most down to the direct parent
    pub fn ancestors(&self) -> Vec<Rc<ElementProxy<L>>> {
        let mut chain = Vec::new();
        let mut current = self.parent.clone();
        while let Some(proxy) = current {
            current = proxy.parent.clone();
            chain.push(proxy);
        }
        chain.reverse();
        chain
    }
}

/// One built property slot
#[derive(Debug, Clone)]
pub enum NativeSlot<L> {
    /// Element, list, table or frame
    Element {
        /// Property name
        name: String,
        /// The proxy
        proxy: Rc<ElementProxy<L>>,
        /// Nested properties (fragment body or framed document)
        nested: Option<Rc<NativePage<L>>>,
        /// Alias names exposing attributes of the element
        virtual_properties: Vec<VirtualProperty>,
    },
    /// Plain value, no UI
    Value {
        /// Property name
        name: String,
        /// Current value
        cell: Rc<RefCell<Option<String>>>,
        /// Whether writes are accepted
        writable: bool,
    },
}

impl<L> NativeSlot<L> {
    /// Property name
    pub fn name(&self) -> &str {
        match self {
            Self::Element { name, .. } | Self::Value { name, .. } => name,
        }
    }

    /// Proxy of an element slot
    pub fn proxy(&self) -> Option<&Rc<ElementProxy<L>>> {
        match self {
            Self::Element { proxy, .. } => Some(proxy),
            Self::Value { .. } => None,
        }
    }

    /// Nested page of an element slot
    pub fn nested(&self) -> Option<&Rc<NativePage<L>>> {
        match self {
            Self::Element { nested, .. } => nested.as_ref(),
            Self::Value { .. } => None,
        }
    }
}

/// A built page (or fragment, list item, framed document)
#[derive(Debug)]
pub struct NativePage<L> {
    schema: Rc<PageSchema>,
    root: Rc<ElementProxy<L>>,
    slots: Vec<NativeSlot<L>>,
}

impl<L> NativePage<L> {
    /// Assemble a page
    pub fn new(schema: Rc<PageSchema>, root: Rc<ElementProxy<L>>, slots: Vec<NativeSlot<L>>) -> Self {
        Self { schema, root, slots }
    }

    /// Schema the page was built from
    pub fn schema(&self) -> &Rc<PageSchema> {
        &self.schema
    }

    /// Type name
    pub fn type_name(&self) -> &str {
        &self.schema.name
    }

    /// Root proxy
    pub fn root(&self) -> &Rc<ElementProxy<L>> {
        &self.root
    }

    /// All slots in declaration order
    pub fn slots(&self) -> &[NativeSlot<L>] {
        &self.slots
    }

    /// Slot by exact property name
    pub fn slot(&self, name: &str) -> Option<&NativeSlot<L>> {
        self.slots.iter().find(|s| s.name() == name)
    }

    /// Proxy of an element slot by exact property name
    pub fn element(&self, name: &str) -> Option<&Rc<ElementProxy<L>>> {
        self.slot(name).and_then(NativeSlot::proxy)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::element_type::ElementType;

    fn ty(kind: ElementKind) -> ElementType {
        ElementType::new("T", kind, "Parent")
    }

    #[test]
    fn test_ancestors_order() {
        let top = Rc::new(ElementProxy::new("top", ty(ElementKind::Document), (), None));
        let mid = Rc::new(ElementProxy::new("mid", ty(ElementKind::Element), (), Some(top)));
        let leaf = ElementProxy::new("leaf", ty(ElementKind::Element), (), Some(mid));
        let names: Vec<String> = leaf.ancestors().iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["top", "mid"]);
    }

    #[test]
    fn test_row_driver_assigned_once() {
        let table = ElementProxy::new("t", ty(ElementKind::Table), 0u8, None);
        let rows = TableRows {
            row_locator: 1u8,
            header_cell_locator: 2,
            cell_locator: 3,
        };
        assert!(table.assign_row_driver(rows.clone()));
        assert!(!table.assign_row_driver(rows));
        assert_eq!(table.table_rows().unwrap().row_locator, 1);
    }

    #[test]
    fn test_slot_lookup() {
        let schema = Rc::new(PageSchema::new("P"));
        let root = Rc::new(ElementProxy::new("P", ty(ElementKind::Document), (), None));
        let slots = vec![NativeSlot::Value {
            name: "Count".to_string(),
            cell: Rc::new(RefCell::new(Some("1".to_string()))),
            writable: true,
        }];
        let page = NativePage::new(schema, root, slots);
        assert!(page.slot("Count").is_some());
        assert!(page.element("Count").is_none());
        assert_eq!(page.type_name(), "P");
    }
}
