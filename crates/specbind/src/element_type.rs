//! Control type registry and constructor model.
//!
//! Every element-like property names a control type ("HtmlButton",
//! "WebElement", "IElementList", ...). A driver registers the types it knows
//! together with the constructors they expose, which is what the page builder
//! uses to decide how an element is scoped: under its parent, under a frame or
//! list root, or searched from the document.

use std::collections::HashMap;

use crate::result::{SpecBindError, SpecBindResult};

/// What a control type builds into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A single element (possibly with nested properties)
    Element,
    /// A collection wrapper whose items are built from an item schema
    List,
    /// A table with a row collection driver
    Table,
    /// A frame hosting its own document
    Frame,
    /// A page-level document root
    Document,
}

/// A constructor parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// The browser/driver object (satisfied when the type matches the registry's browser type)
    Browser(String),
    /// The enclosing element (satisfied when the type matches the registry's parent type)
    Parent(String),
    /// The root locator of a frame or list boundary
    RootLocator,
    /// Anything else; never satisfiable by the builder
    Other(String),
}

impl ParamType {
    fn type_name(&self) -> &str {
        match self {
            Self::Browser(t) | Self::Parent(t) | Self::Other(t) => t,
            Self::RootLocator => "RootLocator",
        }
    }
}

/// One constructor signature of a control type
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constructor {
    /// Parameters in declaration order
    pub params: Vec<ParamType>,
}

impl Constructor {
    /// Zero-argument constructor
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single-parameter constructor
    #[must_use]
    pub fn with(param: ParamType) -> Self {
        Self {
            params: vec![param],
        }
    }

    /// Number of parameters
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// How a chosen constructor scopes the built element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeSource {
    /// Searched under the parent element
    Parent,
    /// Searched under the frame or list root
    RootLocator,
    /// Searched from the top-level document
    Document,
}

/// A registered control type
#[derive(Debug, Clone)]
pub struct ElementType {
    /// Type name used in schemas
    pub name: String,
    /// Build kind
    pub kind: ElementKind,
    /// Native tag this control maps to, when fixed
    pub tag: Option<String>,
    /// Native input type, when fixed
    pub input_type: Option<String>,
    /// Name of the property that carries the control's display text
    pub text_property: Option<String>,
    /// Declared constructors
    pub constructors: Vec<Constructor>,
    /// Whether a zero-argument constructor may be used as a last resort
    pub allow_default_constructor: bool,
}

impl ElementType {
    /// A type constructed from its parent element
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ElementKind, parent_type: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            tag: None,
            input_type: None,
            text_property: None,
            constructors: vec![Constructor::with(ParamType::Parent(parent_type.to_string()))],
            allow_default_constructor: false,
        }
    }

    /// Set the native tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the native input type
    #[must_use]
    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    /// Set the display-text property name
    #[must_use]
    pub fn with_text_property(mut self, property: impl Into<String>) -> Self {
        self.text_property = Some(property.into());
        self
    }

    /// Replace the constructor list
    #[must_use]
    pub fn with_constructors(mut self, constructors: Vec<Constructor>) -> Self {
        self.constructors = constructors;
        self
    }

    /// Allow the zero-argument fallback
    #[must_use]
    pub const fn allow_default_constructor(mut self, allow: bool) -> Self {
        self.allow_default_constructor = allow;
        self
    }
}

/// What the builder can supply at the point a constructor is chosen
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstructorScope {
    /// An enclosing element exists
    pub has_parent: bool,
    /// A frame or list root is in effect
    pub has_root_locator: bool,
}

/// Registry of control types known to one driver
#[derive(Debug, Clone)]
pub struct ElementTypeRegistry {
    browser_type: String,
    parent_type: String,
    document_type: String,
    types: HashMap<String, ElementType>,
    abstract_types: HashMap<String, String>,
}

impl ElementTypeRegistry {
    /// Create a registry for a driver
    #[must_use]
    pub fn new(
        browser_type: impl Into<String>,
        parent_type: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            browser_type: browser_type.into(),
            parent_type: parent_type.into(),
            document_type: document_type.into(),
            types: HashMap::new(),
            abstract_types: HashMap::new(),
        }
    }

    /// Driver's browser type name
    #[must_use]
    pub fn browser_type(&self) -> &str {
        &self.browser_type
    }

    /// Driver's parent-element type name
    #[must_use]
    pub fn parent_type(&self) -> &str {
        &self.parent_type
    }

    /// Default page root type
    #[must_use]
    pub fn document_type(&self) -> &str {
        &self.document_type
    }

    /// Register a control type; a later registration replaces an earlier one
    pub fn register(&mut self, element_type: ElementType) {
        let _ = self
            .types
            .insert(element_type.name.clone(), element_type);
    }

    /// Map an abstract type name onto a registered concrete type
    pub fn register_abstract(&mut self, abstract_name: impl Into<String>, concrete: impl Into<String>) {
        let _ = self
            .abstract_types
            .insert(abstract_name.into(), concrete.into());
    }

    /// Whether a type name (abstract or concrete) is supported
    #[must_use]
    pub fn is_supported(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Resolve a type name, following abstract mappings
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&ElementType> {
        let concrete = self
            .abstract_types
            .get(name)
            .map_or(name, String::as_str);
        self.types.get(concrete)
    }

    /// Resolve a type name or fail with a construction error
    pub fn require(&self, name: &str) -> SpecBindResult<&ElementType> {
        self.resolve(name).ok_or_else(|| {
            SpecBindError::construction(format!(
                "Type '{name}' is not a supported element type for this driver"
            ))
        })
    }

    /// Choose a constructor: the most parameters wins, every parameter must be
    /// satisfiable, and the zero-argument form is used only when allowed.
    pub fn select_constructor(
        &self,
        element_type: &ElementType,
        scope: ConstructorScope,
    ) -> SpecBindResult<(Constructor, ScopeSource)> {
        let mut candidates: Vec<&Constructor> = element_type
            .constructors
            .iter()
            .filter(|c| c.arity() > 0)
            .collect();
        candidates.sort_by_key(|c| std::cmp::Reverse(c.arity()));

        for ctor in candidates {
            if let Some(source) = self.satisfy(ctor, scope) {
                return Ok((ctor.clone(), source));
            }
        }

        if element_type.allow_default_constructor
            && element_type.constructors.iter().any(|c| c.arity() == 0)
        {
            return Ok((Constructor::empty(), ScopeSource::Document));
        }

        Err(SpecBindError::construction(format!(
            "Constructor on type '{}' must have a single argument of type '{}'.",
            element_type.name, self.parent_type
        )))
    }

    fn satisfy(&self, ctor: &Constructor, scope: ConstructorScope) -> Option<ScopeSource> {
        let mut source = ScopeSource::Document;
        for param in &ctor.params {
            match param {
                ParamType::Browser(t) if *t == self.browser_type => {}
                ParamType::Parent(t) if *t == self.parent_type => {
                    // Root locators take precedence over the plain parent scope
                    if scope.has_root_locator {
                        source = ScopeSource::RootLocator;
                    } else if scope.has_parent {
                        source = ScopeSource::Parent;
                    }
                }
                ParamType::RootLocator if scope.has_root_locator => {
                    source = ScopeSource::RootLocator;
                }
                other => {
                    tracing::trace!(param = other.type_name(), "constructor parameter not satisfiable");
                    return None;
                }
            }
        }
        Some(source)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn registry() -> ElementTypeRegistry {
        let mut registry = ElementTypeRegistry::new("BrowserWindow", "UITestControl", "HtmlDocument");
        registry.register(ElementType::new("HtmlButton", ElementKind::Element, "UITestControl"));
        registry.register(ElementType::new(
            "ListWrapper",
            ElementKind::List,
            "UITestControl",
        ));
        registry.register_abstract("IElementList", "ListWrapper");
        registry
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_resolve_abstract() {
            let registry = registry();
            let resolved = registry.resolve("IElementList").unwrap();
            assert_eq!(resolved.name, "ListWrapper");
            assert_eq!(resolved.kind, ElementKind::List);
        }

        #[test]
        fn test_unknown_type_not_supported() {
            let registry = registry();
            assert!(!registry.is_supported("String"));
            assert!(registry.require("String").is_err());
        }
    }

    mod constructor_tests {
        use super::*;

        #[test]
        fn test_parent_constructor_selected() {
            let registry = registry();
            let button = registry.resolve("HtmlButton").unwrap().clone();
            let scope = ConstructorScope {
                has_parent: true,
                has_root_locator: false,
            };
            let (ctor, source) = registry.select_constructor(&button, scope).unwrap();
            assert_eq!(ctor.arity(), 1);
            assert_eq!(source, ScopeSource::Parent);
        }

        #[test]
        fn test_most_parameters_preferred() {
            let registry = registry();
            let ty = ElementType::new("Frag", ElementKind::Element, "UITestControl")
                .with_constructors(vec![
                    Constructor::with(ParamType::Parent("UITestControl".into())),
                    Constructor {
                        params: vec![
                            ParamType::Browser("BrowserWindow".into()),
                            ParamType::Parent("UITestControl".into()),
                        ],
                    },
                ]);
            let (ctor, _) = registry
                .select_constructor(&ty, ConstructorScope::default())
                .unwrap();
            assert_eq!(ctor.arity(), 2);
        }

        #[test]
        fn test_unsatisfiable_skipped_for_smaller() {
            let registry = registry();
            let ty = ElementType::new("Frag", ElementKind::Element, "UITestControl")
                .with_constructors(vec![
                    Constructor {
                        params: vec![
                            ParamType::Other("ILogger".into()),
                            ParamType::Parent("UITestControl".into()),
                        ],
                    },
                    Constructor::with(ParamType::Parent("UITestControl".into())),
                ]);
            let (ctor, _) = registry
                .select_constructor(&ty, ConstructorScope::default())
                .unwrap();
            assert_eq!(ctor.arity(), 1);
        }

        #[test]
        fn test_root_locator_scope() {
            let registry = registry();
            let button = registry.resolve("HtmlButton").unwrap().clone();
            let scope = ConstructorScope {
                has_parent: true,
                has_root_locator: true,
            };
            let (_, source) = registry.select_constructor(&button, scope).unwrap();
            assert_eq!(source, ScopeSource::RootLocator);
        }

        #[test]
        fn test_missing_constructor_message() {
            let registry = registry();
            let ty = ElementType::new("BadControl", ElementKind::Element, "UITestControl")
                .with_constructors(vec![Constructor::with(ParamType::Other("String".into()))]);
            let err = registry
                .select_constructor(&ty, ConstructorScope::default())
                .unwrap_err();
            let message = err.to_string();
            assert!(message.contains("must have a single argument of type"));
            assert!(message.contains("BadControl"));
            assert!(message.contains("UITestControl"));
        }

        #[test]
        fn test_default_constructor_only_when_allowed() {
            let registry = registry();
            let ty = ElementType::new("Plain", ElementKind::Element, "UITestControl")
                .with_constructors(vec![Constructor::empty()]);
            assert!(registry
                .select_constructor(&ty, ConstructorScope::default())
                .is_err());

            let allowed = ty.allow_default_constructor(true);
            let (ctor, source) = registry
                .select_constructor(&allowed, ConstructorScope::default())
                .unwrap();
            assert_eq!(ctor.arity(), 0);
            assert_eq!(source, ScopeSource::Document);
        }
    }
}
