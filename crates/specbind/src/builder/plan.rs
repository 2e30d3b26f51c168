//! Compiled construction plans.
//!
//! A plan is everything the builder resolved from a schema: chosen
//! constructors, driver-native locators, list and table bindings. Running a
//! plan only allocates proxies, so repeated navigations pay the resolution
//! cost once.

use std::cell::RefCell;
use std::rc::Rc;

use super::{FactoryArgs, PageFactory};
use crate::element_type::{ElementKind, ElementType, ScopeSource};
use crate::proxy::{ElementProxy, ListBinding, NativePage, NativeSlot, TableRows};
use crate::result::{SpecBindError, SpecBindResult};
use crate::schema::{PageSchema, VirtualProperty};

/// Proxies available to constructors at instantiation time
#[derive(Debug)]
pub(crate) struct RuntimeScope<L> {
    pub(crate) parent: Option<Rc<ElementProxy<L>>>,
    pub(crate) root_locator: Option<Rc<ElementProxy<L>>>,
}

impl<L> RuntimeScope<L> {
    fn scope_for(&self, source: ScopeSource) -> Option<Rc<ElementProxy<L>>> {
        match source {
            ScopeSource::Parent => self.parent.clone(),
            ScopeSource::RootLocator => self
                .root_locator
                .clone()
                .or_else(|| self.parent.clone()),
            ScopeSource::Document => None,
        }
    }
}

#[derive(Debug)]
pub(crate) enum SlotPlan<L> {
    Element(ElementPlan<L>),
    Value {
        name: String,
        initial: Option<String>,
        writable: bool,
    },
}

impl<L: Clone> SlotPlan<L> {
    fn instantiate(&self, scope: &RuntimeScope<L>) -> NativeSlot<L> {
        match self {
            Self::Element(plan) => plan.instantiate(scope),
            Self::Value {
                name,
                initial,
                writable,
            } => NativeSlot::Value {
                name: name.clone(),
                cell: Rc::new(RefCell::new(initial.clone())),
                writable: *writable,
            },
        }
    }
}

#[derive(Debug)]
pub(crate) struct ElementPlan<L> {
    pub(crate) name: String,
    pub(crate) element_type: ElementType,
    pub(crate) scope: ScopeSource,
    pub(crate) locator: L,
    pub(crate) list: Option<ListBinding<L>>,
    pub(crate) table: Option<TableRows<L>>,
    pub(crate) nested: Option<NestedPlan<L>>,
    pub(crate) virtual_properties: Vec<VirtualProperty>,
}

impl<L: Clone> ElementPlan<L> {
    fn instantiate(&self, scope: &RuntimeScope<L>) -> NativeSlot<L> {
        let mut proxy = ElementProxy::new(
            self.name.clone(),
            self.element_type.clone(),
            self.locator.clone(),
            scope.scope_for(self.scope),
        );
        if let Some(list) = &self.list {
            proxy = proxy.with_list(list.clone());
        }
        let proxy = Rc::new(proxy);
        if let Some(rows) = &self.table {
            let _ = proxy.assign_row_driver(rows.clone());
        }
        let nested = self.nested.as_ref().map(|n| n.instantiate(&proxy));
        NativeSlot::Element {
            name: self.name.clone(),
            proxy,
            nested,
            virtual_properties: self.virtual_properties.clone(),
        }
    }
}

/// Properties nested under an element (fragment body or framed document)
#[derive(Debug)]
pub(crate) struct NestedPlan<L> {
    pub(crate) schema: Rc<PageSchema>,
    pub(crate) slots: Vec<SlotPlan<L>>,
    pub(crate) boundary: bool,
}

impl<L: Clone> NestedPlan<L> {
    fn instantiate(&self, owner: &Rc<ElementProxy<L>>) -> Rc<NativePage<L>> {
        let scope = RuntimeScope {
            parent: Some(Rc::clone(owner)),
            root_locator: self.boundary.then(|| Rc::clone(owner)),
        };
        let slots = self.slots.iter().map(|s| s.instantiate(&scope)).collect();
        Rc::new(NativePage::new(
            Rc::clone(&self.schema),
            Rc::clone(owner),
            slots,
        ))
    }
}

/// Reads the frame proxy a page lives in off a freshly built host document
#[derive(Debug)]
pub(crate) struct FrameLocator<L> {
    pub(crate) host: PageFactory<L>,
    pub(crate) property: String,
}

impl<L: Clone + 'static> FrameLocator<L> {
    fn locate(&self, parent: Option<Rc<ElementProxy<L>>>) -> SpecBindResult<Rc<ElementProxy<L>>> {
        let host = self.host.create(FactoryArgs { parent, root: None }, None)?;
        let proxy = host.element(&self.property).ok_or_else(|| {
            SpecBindError::construction(format!(
                "Frame property '{}' was not found on '{}'",
                self.property,
                host.type_name()
            ))
        })?;
        if proxy.kind() != ElementKind::Frame {
            return Err(SpecBindError::construction(format!(
                "Property '{}' on '{}' is a {}, not a frame",
                self.property,
                host.type_name(),
                proxy.element_type().name
            )));
        }
        Ok(Rc::clone(proxy))
    }
}

#[derive(Debug)]
pub(crate) struct PagePlan<L> {
    pub(crate) schema: Rc<PageSchema>,
    pub(crate) root_type: ElementType,
    pub(crate) root_locator: L,
    pub(crate) frame: Option<FrameLocator<L>>,
    pub(crate) slots: Vec<SlotPlan<L>>,
}

impl<L: Clone + 'static> PagePlan<L> {
    pub(crate) fn instantiate(
        &self,
        args: FactoryArgs<L>,
        post_init: Option<&dyn Fn(&NativePage<L>)>,
    ) -> SpecBindResult<Rc<NativePage<L>>> {
        let (root, boundary) = match args.root {
            // List items: the handler already pinned the item root
            Some(root) => (root, true),
            None => {
                let (parent, boundary) = match &self.frame {
                    Some(frame) => (Some(frame.locate(args.parent)?), true),
                    None => (args.parent, false),
                };
                let root = ElementProxy::new(
                    self.schema.name.clone(),
                    self.root_type.clone(),
                    self.root_locator.clone(),
                    parent,
                );
                (Rc::new(root), boundary)
            }
        };

        let scope = RuntimeScope {
            parent: Some(Rc::clone(&root)),
            root_locator: boundary.then(|| Rc::clone(&root)),
        };
        let slots = self.slots.iter().map(|s| s.instantiate(&scope)).collect();
        let page = NativePage::new(Rc::clone(&self.schema), root, slots);
        if let Some(post_init) = post_init {
            post_init(&page);
        }
        Ok(Rc::new(page))
    }
}
