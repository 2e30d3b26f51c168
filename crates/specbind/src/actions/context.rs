//! Inputs handed to each action.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::handler::ComboBoxItem;
use crate::result::{SpecBindError, SpecBindResult};
use crate::validation::{ListComparison, ValidationTable};
use crate::wait::WaitConditions;

/// What an action operates on
pub trait ActionContext: fmt::Debug {
    /// Property on the current page, when the action targets one
    fn property_name(&self) -> Option<&str>;

    /// Page name from step text, when the action targets a page
    fn target_page(&self) -> Option<&str> {
        None
    }
}

macro_rules! property_context {
    ($ty:ty) => {
        impl ActionContext for $ty {
            fn property_name(&self) -> Option<&str> {
                Some(&self.property_name)
            }
        }
    };
}

// =============================================================================
// ELEMENT CONTEXTS
// =============================================================================

/// A single property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementContext {
    /// Property name
    pub property_name: String,
}

impl ElementContext {
    /// Context for a property
    pub fn new(property_name: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
        }
    }
}

property_context!(ElementContext);

/// A property and the data to enter into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryContext {
    /// Property name
    pub property_name: String,
    /// Text to enter
    pub data: String,
}

impl EntryContext {
    /// Context for entering `data`
    pub fn new(property_name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            data: data.into(),
        }
    }
}

property_context!(EntryContext);

/// A property and the state to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitForElementContext {
    /// Property name
    pub property_name: String,
    /// Target state
    pub condition: WaitConditions,
    /// Overrides the configured element timeout
    pub timeout: Option<Duration>,
}

impl WaitForElementContext {
    /// Wait with the configured timeout
    pub fn new(property_name: impl Into<String>, condition: WaitConditions) -> Self {
        Self {
            property_name: property_name.into(),
            condition,
            timeout: None,
        }
    }

    /// Wait at most `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

property_context!(WaitForElementContext);

// =============================================================================
// VALIDATION CONTEXTS
// =============================================================================

/// Rules checked against the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateItemContext {
    /// Rules
    pub validations: ValidationTable,
}

impl ValidateItemContext {
    /// Context for a rule table
    pub const fn new(validations: ValidationTable) -> Self {
        Self { validations }
    }
}

impl ActionContext for ValidateItemContext {
    fn property_name(&self) -> Option<&str> {
        None
    }
}

/// Rules checked against every item of a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateListContext {
    /// List property name
    pub property_name: String,
    /// How item verdicts combine
    pub comparison: ListComparison,
    /// Rules
    pub validations: ValidationTable,
}

impl ValidateListContext {
    /// Context for a list validation
    pub fn new(
        property_name: impl Into<String>,
        comparison: ListComparison,
        validations: ValidationTable,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            comparison,
            validations,
        }
    }
}

property_context!(ValidateListContext);

/// Expected options of a combo box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateComboBoxContext {
    /// Combo box property name
    pub property_name: String,
    /// How expected items relate to the actual options
    pub comparison: ListComparison,
    /// Expected options; a `None` value matches any value
    pub items: Vec<ComboBoxItem>,
}

impl ValidateComboBoxContext {
    /// Context for a combo box validation
    pub fn new(
        property_name: impl Into<String>,
        comparison: ListComparison,
        items: Vec<ComboBoxItem>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            comparison,
            items,
        }
    }
}

property_context!(ValidateComboBoxContext);

/// How a row count compares to the expected number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericComparison {
    /// Exactly
    Equals,
    /// Strictly more
    GreaterThan,
    /// At least
    GreaterThanEquals,
    /// Strictly fewer
    LessThan,
    /// At most
    LessThanEquals,
}

impl NumericComparison {
    /// Parse step phrasing ("equal to", "at least", "less than", ...)
    pub fn parse(text: &str) -> SpecBindResult<Self> {
        let key: String = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "" | "equals" | "equal" | "equalto" | "exactly" => Ok(Self::Equals),
            "greaterthan" | "morethan" => Ok(Self::GreaterThan),
            "atleast" | "greaterthanorequalto" | "greaterthanequals" => Ok(Self::GreaterThanEquals),
            "lessthan" | "fewerthan" => Ok(Self::LessThan),
            "atmost" | "lessthanorequalto" | "lessthanequals" => Ok(Self::LessThanEquals),
            _ => Err(SpecBindError::invalid_argument(
                "comparison",
                format!("'{text}' is not a known count comparison"),
            )),
        }
    }

    /// Whether `actual` satisfies the comparison against `expected`
    #[must_use]
    pub const fn evaluate(&self, actual: usize, expected: usize) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::GreaterThan => actual > expected,
            Self::GreaterThanEquals => actual >= expected,
            Self::LessThan => actual < expected,
            Self::LessThanEquals => actual <= expected,
        }
    }
}

impl fmt::Display for NumericComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equals => "equal to",
            Self::GreaterThan => "greater than",
            Self::GreaterThanEquals => "at least",
            Self::LessThan => "less than",
            Self::LessThanEquals => "at most",
        })
    }
}

/// Expected number of list items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCountContext {
    /// List property name
    pub property_name: String,
    /// Comparison applied to the item count
    pub comparison: NumericComparison,
    /// Expected count
    pub count: usize,
}

impl RowCountContext {
    /// Context for a count check
    pub fn new(property_name: impl Into<String>, comparison: NumericComparison, count: usize) -> Self {
        Self {
            property_name: property_name.into(),
            comparison,
            count,
        }
    }
}

property_context!(RowCountContext);

// =============================================================================
// LIST ITEM CONTEXTS
// =============================================================================

/// A list item by position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemByIndexContext {
    /// List property name
    pub property_name: String,
    /// One-based position
    pub index: usize,
}

impl ListItemByIndexContext {
    /// Context for the item at one-based `index`
    pub fn new(property_name: impl Into<String>, index: usize) -> Self {
        Self {
            property_name: property_name.into(),
            index,
        }
    }
}

property_context!(ListItemByIndexContext);

/// The first list item matching a rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItemByCriteriaContext {
    /// List property name
    pub property_name: String,
    /// Rules the item must satisfy
    pub validations: ValidationTable,
}

impl ListItemByCriteriaContext {
    /// Context for a criteria lookup
    pub fn new(property_name: impl Into<String>, validations: ValidationTable) -> Self {
        Self {
            property_name: property_name.into(),
            validations,
        }
    }
}

property_context!(ListItemByCriteriaContext);

// =============================================================================
// PAGE CONTEXTS
// =============================================================================

/// Whether a page step navigates or only checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageAction {
    /// Load the page's URL
    NavigateToPage,
    /// Require the browser to already show the page
    EnsureOnPage,
}

/// A page by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNavigationContext {
    /// Page name or alias
    pub page_name: String,
    /// Navigate or check
    pub page_action: PageAction,
    /// URL template parameters
    pub parameters: HashMap<String, String>,
}

impl PageNavigationContext {
    /// Context without URL parameters
    pub fn new(page_name: impl Into<String>, page_action: PageAction) -> Self {
        Self {
            page_name: page_name.into(),
            page_action,
            parameters: HashMap::new(),
        }
    }

    /// Add a URL template parameter
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.parameters.insert(name.into(), value.into());
        self
    }
}

impl ActionContext for PageNavigationContext {
    fn property_name(&self) -> Option<&str> {
        None
    }

    fn target_page(&self) -> Option<&str> {
        Some(&self.page_name)
    }
}

/// A page to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitForPageContext {
    /// Page name or alias
    pub page_name: String,
    /// Overrides the configured page timeout
    pub timeout: Option<Duration>,
}

impl WaitForPageContext {
    /// Wait with the configured timeout
    pub fn new(page_name: impl Into<String>) -> Self {
        Self {
            page_name: page_name.into(),
            timeout: None,
        }
    }

    /// Wait at most `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl ActionContext for WaitForPageContext {
    fn property_name(&self) -> Option<&str> {
        None
    }

    fn target_page(&self) -> Option<&str> {
        Some(&self.page_name)
    }
}

/// A dialog page to close
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseDialogContext {
    /// Page name or alias of the dialog
    pub page_name: String,
}

impl CloseDialogContext {
    /// Close the named dialog
    pub fn new(page_name: impl Into<String>) -> Self {
        Self {
            page_name: page_name.into(),
        }
    }
}

// Not page-targeted: closing must not re-add the dialog to history
impl ActionContext for CloseDialogContext {
    fn property_name(&self) -> Option<&str> {
        None
    }
}
