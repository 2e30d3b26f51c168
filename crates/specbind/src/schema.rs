//! Declarative page schemas.
//!
//! A [`PageSchema`] describes one logical screen, dialog or frame: its
//! navigation metadata, its class-level locator and the properties it exposes.
//! Schemas are plain data, built in Rust with the fluent API, implemented by a
//! type through [`PageModel`], or loaded from YAML at startup.
//!
//! ```yaml
//! name: LoginPage
//! aliases: [Sign In]
//! navigation:
//!   url: /login
//! properties:
//!   - name: UserName
//!     element_type: HtmlEdit
//!     locator: { id: UserName }
//!   - name: Login
//!     element_type: HtmlButton
//!     locator: { id: go, text: Log In }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cookie::CookieDirective;
use crate::locator::{ElementLocator, NativeLocator};
use crate::result::{SpecBindError, SpecBindResult};

/// Navigation metadata for a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNavigation {
    /// URL template, e.g. `/users/{id}`
    pub url: String,
    /// Whether `url` is absolute rather than relative to the configured base
    #[serde(default)]
    pub is_absolute: bool,
    /// Explicit pattern used to recognise the page instead of the template
    #[serde(default)]
    pub url_pattern: Option<String>,
}

impl PageNavigation {
    /// Relative navigation target
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_absolute: false,
            url_pattern: None,
        }
    }
}

/// Locates the frame a page lives in by reading one property of a host document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTarget {
    /// Document type that declares the frame
    pub host: Box<PageSchema>,
    /// Name of the frame property on the host
    pub property: String,
}

/// An extra name for an element that exposes one of its attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualProperty {
    /// Logical name
    pub name: String,
    /// Attribute read from the shared element
    pub attribute: String,
}

/// One property on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Property name
    pub name: String,
    /// Control type; `None` marks a plain value property
    #[serde(default)]
    pub element_type: Option<String>,
    /// Search criteria
    #[serde(default)]
    pub locator: Option<ElementLocator>,
    /// Driver-native locators merged after the criteria-derived ones
    #[serde(default)]
    pub native_locators: Vec<NativeLocator>,
    /// Alias names exposing attributes of this element
    #[serde(default)]
    pub virtual_properties: Vec<VirtualProperty>,
    /// Nested properties (fragment body, list item type, or framed document)
    #[serde(default)]
    pub nested: Option<Box<PageSchema>>,
    /// Initial value of a plain value property
    #[serde(default)]
    pub value: Option<String>,
    /// Whether a plain value property accepts writes
    #[serde(default = "default_writable")]
    pub writable: bool,
}

const fn default_writable() -> bool {
    true
}

impl PropertySchema {
    /// An element-like property of the given control type
    #[must_use]
    pub fn element(name: impl Into<String>, element_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element_type: Some(element_type.into()),
            locator: None,
            native_locators: Vec::new(),
            virtual_properties: Vec::new(),
            nested: None,
            value: None,
            writable: true,
        }
    }

    /// A plain value property
    #[must_use]
    pub fn value(name: impl Into<String>, initial: Option<&str>) -> Self {
        Self {
            name: name.into(),
            element_type: None,
            locator: None,
            native_locators: Vec::new(),
            virtual_properties: Vec::new(),
            nested: None,
            value: initial.map(str::to_string),
            writable: true,
        }
    }

    /// Attach search criteria
    #[must_use]
    pub fn with_locator(mut self, locator: ElementLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Attach a driver-native locator
    #[must_use]
    pub fn with_native_locator(mut self, native: NativeLocator) -> Self {
        self.native_locators.push(native);
        self
    }

    /// Attach a virtual alias
    #[must_use]
    pub fn with_virtual(mut self, name: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.virtual_properties.push(VirtualProperty {
            name: name.into(),
            attribute: attribute.into(),
        });
        self
    }

    /// Attach a nested schema
    #[must_use]
    pub fn with_nested(mut self, nested: PageSchema) -> Self {
        self.nested = Some(Box::new(nested));
        self
    }

    /// Mark a value property read-only
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Whether this property carries element metadata at all
    #[must_use]
    pub fn has_element_metadata(&self) -> bool {
        self.locator.is_some() || !self.native_locators.is_empty()
    }
}

/// A page, fragment or list item type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSchema {
    /// Type name; the schema identity
    pub name: String,
    /// Extra lookup names for step text
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Root control type; the driver's document type when absent
    #[serde(default)]
    pub element_type: Option<String>,
    /// Navigation metadata
    #[serde(default)]
    pub navigation: Option<PageNavigation>,
    /// Frame the page lives in
    #[serde(default)]
    pub frame: Option<FrameTarget>,
    /// Class-level locator (fragments and list items)
    #[serde(default)]
    pub locator: Option<ElementLocator>,
    /// Cookies applied before the page is used
    #[serde(default)]
    pub cookies: Vec<CookieDirective>,
    /// Declared properties
    #[serde(default)]
    pub properties: Vec<PropertySchema>,
}

impl PageSchema {
    /// Create an empty schema
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            element_type: None,
            navigation: None,
            frame: None,
            locator: None,
            cookies: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Add an alias
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the root control type
    #[must_use]
    pub fn with_element_type(mut self, element_type: impl Into<String>) -> Self {
        self.element_type = Some(element_type.into());
        self
    }

    /// Set a relative navigation URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.navigation = Some(PageNavigation::new(url));
        self
    }

    /// Set full navigation metadata
    #[must_use]
    pub fn with_navigation(mut self, navigation: PageNavigation) -> Self {
        self.navigation = Some(navigation);
        self
    }

    /// Place the page inside a frame of a host document
    #[must_use]
    pub fn in_frame(mut self, host: PageSchema, property: impl Into<String>) -> Self {
        self.frame = Some(FrameTarget {
            host: Box::new(host),
            property: property.into(),
        });
        self
    }

    /// Set the class-level locator
    #[must_use]
    pub fn with_locator(mut self, locator: ElementLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Add a cookie directive
    #[must_use]
    pub fn with_cookie(mut self, cookie: CookieDirective) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Add a property
    #[must_use]
    pub fn with_property(mut self, property: PropertySchema) -> Self {
        self.properties.push(property);
        self
    }

    /// Find a declared property by exact name
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Parse one schema from YAML
    pub fn from_yaml_str(yaml: &str) -> SpecBindResult<Self> {
        let schema: Self = serde_yaml_ng::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Structural checks that do not need a driver
    pub fn validate(&self) -> SpecBindResult<()> {
        if self.name.trim().is_empty() {
            return Err(SpecBindError::construction("Page schema must have a name"));
        }
        let mut seen = std::collections::HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(SpecBindError::construction(format!(
                    "Page '{}' declares property '{}' more than once",
                    self.name, property.name
                )));
            }
            if let Some(nested) = &property.nested {
                nested.validate()?;
            }
        }
        Ok(())
    }
}

/// A Rust type that describes a page
pub trait PageModel: 'static {
    /// The declarative schema for this page
    fn schema() -> PageSchema;
}

/// A file holding several schemas
#[derive(Debug, Deserialize)]
struct SchemaFile {
    pages: Vec<PageSchema>,
}

/// Load every schema from a YAML file with a top-level `pages:` list
pub fn load_schemas(path: impl AsRef<Path>) -> SpecBindResult<Vec<PageSchema>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let file: SchemaFile = serde_yaml_ng::from_str(&content)?;
    for schema in &file.pages {
        schema.validate()?;
    }
    tracing::debug!(path = %path.display(), count = file.pages.len(), "loaded page schemas");
    Ok(file.pages)
}
