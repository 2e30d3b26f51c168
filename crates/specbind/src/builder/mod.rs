//! Page object construction engine.
//!
//! [`PageBuilder`] compiles a [`PageSchema`] into a construction plan once and
//! wraps it in a [`PageFactory`] closure cached by schema name. Each driver
//! plugs in through [`BuilderHooks`]: which control types it knows, and how
//! declarative locator criteria become its native locator type.
//!
//! ## Toyota Way Application
//!
//! - **Muda**: Locator resolution and constructor selection happen once per
//!   schema, not once per navigation
//! - **Poka-Yoke**: Unresolvable constructors and incomplete XPath criteria
//!   fail the build with an actionable message

mod context;
mod plan;

pub use context::{ExpressionData, PageBuilderContext};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use plan::{ElementPlan, FrameLocator, NestedPlan, PagePlan, SlotPlan};

use crate::element_type::{ConstructorScope, ElementKind, ElementType, ElementTypeRegistry};
use crate::locator::{ElementLocator, NativeLocator};
use crate::proxy::{ElementProxy, ListBinding, NativePage, TableRows};
use crate::result::{SpecBindError, SpecBindResult};
use crate::schema::{PageSchema, PropertySchema};

// =============================================================================
// DRIVER HOOKS
// =============================================================================

/// Per-driver seam used while compiling schemas
pub trait BuilderHooks: 'static {
    /// Driver-native locator stored on every proxy
    type Locator: Clone + Default + fmt::Debug + 'static;

    /// Control types this driver knows
    fn registry(&self) -> &ElementTypeRegistry;

    /// Convert declarative criteria and native locators into the driver's
    /// locator for one element
    fn assign_element_attributes(
        &self,
        element_type: &ElementType,
        element_name: &str,
        locator: Option<&ElementLocator>,
        native: &[NativeLocator],
        target: &mut Self::Locator,
    ) -> SpecBindResult<()>;

    /// Apply class-level attributes to a finished page root
    fn assign_page_attributes(
        &self,
        schema: &PageSchema,
        root_type: &ElementType,
        target: &mut Self::Locator,
    ) -> SpecBindResult<()> {
        match &schema.locator {
            Some(locator) => {
                self.assign_element_attributes(root_type, &schema.name, Some(locator), &[], target)
            }
            None => Ok(()),
        }
    }

    /// Row and cell locators for a table control
    fn table_row_locator(&self, table_type: &ElementType) -> TableRows<Self::Locator>;

    /// Locator matching every item of a list under its container
    fn list_item_locator(
        &self,
        item_type: &ElementType,
        item: &PageSchema,
    ) -> SpecBindResult<Self::Locator> {
        let mut locator = Self::Locator::default();
        self.assign_element_attributes(item_type, &item.name, item.locator.as_ref(), &[], &mut locator)?;
        Ok(locator)
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Arguments to one factory invocation
#[derive(Debug)]
pub struct FactoryArgs<L> {
    /// Enclosing scope, usually absent for top-level pages
    pub parent: Option<Rc<ElementProxy<L>>>,
    /// Pre-resolved root, used for list items
    pub root: Option<Rc<ElementProxy<L>>>,
}

impl<L> Default for FactoryArgs<L> {
    fn default() -> Self {
        Self {
            parent: None,
            root: None,
        }
    }
}

type FactoryFn<L> =
    dyn Fn(FactoryArgs<L>, Option<&dyn Fn(&NativePage<L>)>) -> SpecBindResult<Rc<NativePage<L>>>;

/// A compiled, reusable constructor for one schema
pub struct PageFactory<L> {
    name: String,
    create: Rc<FactoryFn<L>>,
}

impl<L> Clone for PageFactory<L> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            create: Rc::clone(&self.create),
        }
    }
}

impl<L> fmt::Debug for PageFactory<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFactory").field("name", &self.name).finish()
    }
}

impl<L> PageFactory<L> {
    /// Schema name this factory builds
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a page, running `post_init` on the result before returning it
    pub fn create(
        &self,
        args: FactoryArgs<L>,
        post_init: Option<&dyn Fn(&NativePage<L>)>,
    ) -> SpecBindResult<Rc<NativePage<L>>> {
        (self.create)(args, post_init)
    }

    /// Two handles to the same compiled factory
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.create, &other.create)
    }
}

// =============================================================================
// BUILDER
// =============================================================================

const ITEM_KEY_SUFFIX: &str = "#item";

/// One compiled schema; entries under the same name differ in structure
struct CachedFactory<L> {
    schema: PageSchema,
    factory: PageFactory<L>,
}

/// Compiles schemas into cached page factories
pub struct PageBuilder<H: BuilderHooks> {
    hooks: H,
    cache: RefCell<HashMap<String, Vec<CachedFactory<H::Locator>>>>,
    compiled: Cell<usize>,
}

impl<H: BuilderHooks + fmt::Debug> fmt::Debug for PageBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageBuilder")
            .field("hooks", &self.hooks)
            .field("cached", &self.cache.borrow().len())
            .field("compiled", &self.compiled.get())
            .finish()
    }
}

impl<H: BuilderHooks> PageBuilder<H> {
    /// Create a builder over driver hooks
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            cache: RefCell::new(HashMap::new()),
            compiled: Cell::new(0),
        }
    }

    /// Driver hooks
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Number of schemas compiled so far (cache misses)
    pub fn compile_count(&self) -> usize {
        self.compiled.get()
    }

    /// Whether a factory for this schema name is cached
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.borrow().get(name).is_some_and(|entries| !entries.is_empty())
    }

    /// Get or compile the factory for a top-level page
    pub fn create_factory(&self, schema: &PageSchema) -> SpecBindResult<PageFactory<H::Locator>> {
        self.cached_or_compile(schema.name.clone(), schema, false)
    }

    /// Build a page in one call
    pub fn create_page(
        &self,
        schema: &PageSchema,
        parent: Option<Rc<ElementProxy<H::Locator>>>,
    ) -> SpecBindResult<Rc<NativePage<H::Locator>>> {
        self.create_factory(schema)?
            .create(FactoryArgs { parent, root: None }, None)
    }

    fn cached_or_compile(
        &self,
        key: String,
        schema: &PageSchema,
        item: bool,
    ) -> SpecBindResult<PageFactory<H::Locator>> {
        let cached = self.cache.borrow().get(&key).and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry.schema == *schema)
                .map(|entry| entry.factory.clone())
        });
        if let Some(factory) = cached {
            tracing::trace!(schema = %schema.name, "page factory cache hit");
            return Ok(factory);
        }

        let plan = Rc::new(self.compile_page(schema, item)?);
        self.compiled.set(self.compiled.get() + 1);
        tracing::debug!(schema = %schema.name, item, "compiled page factory");

        let factory = PageFactory {
            name: schema.name.clone(),
            create: Rc::new(
                move |args: FactoryArgs<H::Locator>, post_init: Option<&dyn Fn(&NativePage<H::Locator>)>| {
                    plan.instantiate(args, post_init)
                },
            ),
        };
        self.cache.borrow_mut().entry(key).or_default().push(CachedFactory {
            schema: schema.clone(),
            factory: factory.clone(),
        });
        Ok(factory)
    }

    fn compile_page(&self, schema: &PageSchema, item: bool) -> SpecBindResult<PagePlan<H::Locator>> {
        schema.validate()?;
        let registry = self.hooks.registry();
        let default_root = if item {
            registry.parent_type()
        } else {
            registry.document_type()
        };
        let root_type = registry
            .require(schema.element_type.as_deref().unwrap_or(default_root))?
            .clone();

        let frame = schema
            .frame
            .as_ref()
            .map(|target| -> SpecBindResult<FrameLocator<H::Locator>> {
                Ok(FrameLocator {
                    host: self.create_factory(&target.host)?,
                    property: target.property.clone(),
                })
            })
            .transpose()?;

        let mut context =
            PageBuilderContext::root(ExpressionData::named(schema.name.clone(), root_type.name.clone()));
        if item || frame.is_some() {
            let current = context.current.clone();
            context = context.with_root_locator(current);
        }
        let scope = ConstructorScope {
            has_parent: frame.is_some(),
            has_root_locator: frame.is_some(),
        };
        let _ = registry.select_constructor(&root_type, scope)?;

        let slots = self.compile_slots(schema, &context)?;

        let mut root_locator = H::Locator::default();
        self.hooks
            .assign_page_attributes(schema, &root_type, &mut root_locator)?;

        Ok(PagePlan {
            schema: Rc::new(schema.clone()),
            root_type,
            root_locator,
            frame,
            slots,
        })
    }

    fn compile_slots(
        &self,
        schema: &PageSchema,
        context: &PageBuilderContext,
    ) -> SpecBindResult<Vec<SlotPlan<H::Locator>>> {
        let mut slots = Vec::with_capacity(schema.properties.len());
        for property in &schema.properties {
            let Some(type_name) = property.element_type.as_deref() else {
                slots.push(SlotPlan::Value {
                    name: property.name.clone(),
                    initial: property.value.clone(),
                    writable: property.writable,
                });
                continue;
            };

            let Some(element_type) = self.hooks.registry().resolve(type_name) else {
                if property.has_element_metadata() {
                    return Err(SpecBindError::construction(format!(
                        "Property '{}' uses type '{}', which is not a supported element type",
                        context.child(ExpressionData::named(property.name.clone(), type_name)).path(),
                        type_name
                    )));
                }
                slots.push(SlotPlan::Value {
                    name: property.name.clone(),
                    initial: property.value.clone(),
                    writable: property.writable,
                });
                continue;
            };

            // A list's class-level locator describes its items, not the container
            let effective = if element_type.kind == ElementKind::List {
                property.locator.clone().filter(|l| !l.is_empty())
            } else {
                effective_locator(property)
            };
            if effective.is_none() && property.native_locators.is_empty() {
                tracing::debug!(
                    property = %context.child(ExpressionData::named(property.name.clone(), type_name)).path(),
                    "element property has no locator metadata; not built"
                );
                continue;
            }

            let plan = self.compile_element(property, element_type, effective.as_ref(), context)?;
            slots.push(SlotPlan::Element(plan));
        }
        Ok(slots)
    }

    fn compile_element(
        &self,
        property: &PropertySchema,
        element_type: &ElementType,
        locator: Option<&ElementLocator>,
        context: &PageBuilderContext,
    ) -> SpecBindResult<ElementPlan<H::Locator>> {
        let registry = self.hooks.registry();
        let (_, scope) = registry.select_constructor(element_type, context.constructor_scope())?;

        let mut native = H::Locator::default();
        self.hooks.assign_element_attributes(
            element_type,
            &property.name,
            locator,
            &property.native_locators,
            &mut native,
        )?;

        let current = ExpressionData::named(property.name.clone(), element_type.name.clone());
        let child_context = context.child(current.clone());

        let mut list = None;
        let mut table = None;
        let mut nested = None;
        match element_type.kind {
            ElementKind::List => {
                let item_schema = property.nested.as_deref().ok_or_else(|| {
                    SpecBindError::construction(format!(
                        "List property '{}' must declare an item type",
                        child_context.path()
                    ))
                })?;
                list = Some(self.compile_list(item_schema)?);
            }
            ElementKind::Table => {
                table = Some(self.hooks.table_row_locator(element_type));
            }
            ElementKind::Frame => {
                if let Some(document) = property.nested.as_deref() {
                    let frame_context = child_context.clone().with_root_locator(current);
                    nested = Some(NestedPlan {
                        schema: Rc::new(document.clone()),
                        slots: self.compile_slots(document, &frame_context)?,
                        boundary: true,
                    });
                }
            }
            ElementKind::Element | ElementKind::Document => {
                if let Some(fragment) = property.nested.as_deref() {
                    nested = Some(NestedPlan {
                        schema: Rc::new(fragment.clone()),
                        slots: self.compile_slots(fragment, &child_context)?,
                        boundary: false,
                    });
                }
            }
        }

        Ok(ElementPlan {
            name: property.name.clone(),
            element_type: element_type.clone(),
            scope,
            locator: native,
            list,
            table,
            nested,
            virtual_properties: property.virtual_properties.clone(),
        })
    }

    fn compile_list(&self, item_schema: &PageSchema) -> SpecBindResult<ListBinding<H::Locator>> {
        let registry = self.hooks.registry();
        let item_type = registry
            .require(item_schema.element_type.as_deref().unwrap_or(registry.parent_type()))?
            .clone();
        let item_locator = self.hooks.list_item_locator(&item_type, item_schema)?;
        let item_factory = self.cached_or_compile(
            format!("{}{ITEM_KEY_SUFFIX}", item_schema.name),
            item_schema,
            true,
        )?;
        Ok(ListBinding {
            item_factory,
            item_locator,
            item_type,
        })
    }
}

/// Property criteria first, then the nested type's class-level locator
fn effective_locator(property: &PropertySchema) -> Option<ElementLocator> {
    let own = property.locator.clone().filter(|l| !l.is_empty());
    let class_level = property
        .nested
        .as_ref()
        .and_then(|n| n.locator.clone())
        .filter(|l| !l.is_empty());
    match (own, class_level) {
        (Some(own), Some(class_level)) => Some(own.merged_with(&class_level)),
        (own, class_level) => own.or(class_level),
    }
}
