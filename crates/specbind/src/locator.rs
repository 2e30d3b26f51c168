//! Declarative element locators.
//!
//! An [`ElementLocator`] is the search criteria attached to a page property or
//! to a page type itself. It is driver neutral: each adapter's builder turns it
//! into native locator objects (WebDriver `By` strategies, search properties).
//!
//! [`NativeLocator`] carries the driver's own locator notation (the `FindsBy`
//! style: a strategy, a value and a priority). Adapters merge these after the
//! criteria-derived locators.

use serde::{Deserialize, Serialize};

/// Search criteria for one element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ElementLocator {
    /// Element id attribute
    pub id: Option<String>,
    /// Element name attribute
    pub name: Option<String>,
    /// CSS class name
    pub class: Option<String>,
    /// Displayed text (link text for anchors)
    pub text: Option<String>,
    /// Tag name of the element
    pub tag_name: Option<String>,
    /// 1-based position among matching elements
    pub index: Option<u32>,
    /// Link target or image source
    pub url: Option<String>,
    /// Image alternate text
    pub alt: Option<String>,
    /// Title attribute
    pub title: Option<String>,
    /// Input type attribute
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    /// Value attribute
    pub value: Option<String>,
    /// Explicit XPath expression
    pub xpath: Option<String>,
    /// Explicit CSS selector
    pub css_selector: Option<String>,
    /// Accessibility identifier (desktop controls)
    pub accessibility_id: Option<String>,
}

impl ElementLocator {
    /// Create an empty locator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the id criterion
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the name criterion
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the class criterion
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Set the text criterion
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the tag name
    #[must_use]
    pub fn tag_name(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    /// Set the 1-based index
    #[must_use]
    pub const fn index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the url criterion
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the alt criterion
    #[must_use]
    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    /// Set the title criterion
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the input type criterion
    #[must_use]
    pub fn input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }

    /// Set the value criterion
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set an explicit XPath
    #[must_use]
    pub fn xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpath = Some(xpath.into());
        self
    }

    /// Set an explicit CSS selector
    #[must_use]
    pub fn css_selector(mut self, css: impl Into<String>) -> Self {
        self.css_selector = Some(css.into());
        self
    }

    /// Set the accessibility id
    #[must_use]
    pub fn accessibility_id(mut self, id: impl Into<String>) -> Self {
        self.accessibility_id = Some(id.into());
        self
    }

    /// True when no criterion carries a non-blank value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_none()
            && [
                &self.id,
                &self.name,
                &self.class,
                &self.text,
                &self.tag_name,
                &self.url,
                &self.alt,
                &self.title,
                &self.input_type,
                &self.value,
                &self.xpath,
                &self.css_selector,
                &self.accessibility_id,
            ]
            .iter()
            .all(|v| non_blank(v).is_none())
    }

    /// Fill criteria missing here from a fallback locator (class-level defaults)
    #[must_use]
    pub fn merged_with(&self, fallback: &Self) -> Self {
        fn pick(a: &Option<String>, b: &Option<String>) -> Option<String> {
            non_blank(a).or_else(|| non_blank(b)).map(str::to_string)
        }
        Self {
            id: pick(&self.id, &fallback.id),
            name: pick(&self.name, &fallback.name),
            class: pick(&self.class, &fallback.class),
            text: pick(&self.text, &fallback.text),
            tag_name: pick(&self.tag_name, &fallback.tag_name),
            index: self.index.or(fallback.index),
            url: pick(&self.url, &fallback.url),
            alt: pick(&self.alt, &fallback.alt),
            title: pick(&self.title, &fallback.title),
            input_type: pick(&self.input_type, &fallback.input_type),
            value: pick(&self.value, &fallback.value),
            xpath: pick(&self.xpath, &fallback.xpath),
            css_selector: pick(&self.css_selector, &fallback.css_selector),
            accessibility_id: pick(&self.accessibility_id, &fallback.accessibility_id),
        }
    }
}

/// Returns the trimmed-nonempty contents of an optional criterion
#[must_use]
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
}

/// Locator strategy for driver-native locators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum How {
    /// By id
    Id,
    /// By name
    Name,
    /// By class name
    ClassName,
    /// By link text
    LinkText,
    /// By tag name
    TagName,
    /// By XPath
    XPath,
    /// By CSS selector
    CssSelector,
}

/// A driver-native locator declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeLocator {
    /// Strategy
    pub how: How,
    /// Strategy argument
    pub using: String,
    /// Lower values are tried first
    #[serde(default)]
    pub priority: i32,
}

impl NativeLocator {
    /// Create a native locator with default priority
    #[must_use]
    pub fn new(how: How, using: impl Into<String>) -> Self {
        Self {
            how,
            using: using.into(),
            priority: 0,
        }
    }

    /// Set the priority
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Sort native locators by declared priority, keeping declaration order on ties
#[must_use]
pub fn ordered_native_locators(native: &[NativeLocator]) -> Vec<&NativeLocator> {
    let mut ordered: Vec<&NativeLocator> = native.iter().collect();
    ordered.sort_by_key(|n| n.priority);
    ordered
}
