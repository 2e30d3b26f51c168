//! SpecBind: Plain-Language Steps over Declarative Page Objects
//!
//! Scenario steps such as "Given I navigate to the Home page" or
//! "Then I see the Results list contains" run against page objects
//! described as data. A page schema names its properties, their element
//! types and locators; the page builder compiles it once into a factory
//! that binds live elements for whichever UI adapter is in use.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    SPECBIND Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Step Text  │    │ Action     │    │ Browser    │            │
//! │   │ + Tables   │───►│ Pipeline   │───►│ (selenium/ │            │
//! │   │ (registry) │    │ pre/post   │    │  codedui)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                 │                 │                   │
//! │         ▼                 ▼                 ▼                   │
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Page       │    │ Validation │    │ Page       │            │
//! │   │ Mapper     │    │ Tables     │    │ Builder    │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use specbind::prelude::*;
//!
//! let registry = StepRegistry::with_defaults()?;
//! registry.execute(&context, "Given I navigate to the Home page", None)?;
//! registry.execute(&context, "Then I see", Some(&StepTable::parse(
//!     "| Field | Rule | Value |\n| Title | equals | Welcome |",
//! )?))?;
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod cookie;
mod element_type;
mod handler;
mod locator;
mod navigation;
mod page;
mod property;
mod proxy;
mod result;
mod schema;
mod wait;

/// Page factories compiled from schemas
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod builder;

/// Browser abstraction shared by the adapters
pub mod browser;

/// Validation tables, comparisons and results
pub mod validation;

/// Page name lookup
pub mod mapper;

/// Visited pages
pub mod history;

/// Actions and the pipeline that runs them
#[allow(clippy::missing_errors_doc)]
pub mod actions;

/// Step methods and the step registry
#[allow(clippy::missing_errors_doc)]
pub mod steps;

/// YAML and environment configuration
pub mod config;

/// Log output setup
pub mod tracing_support;

/// WebDriver adapter
#[cfg(feature = "selenium")]
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod selenium;

/// Search-property control adapter
#[cfg(feature = "codedui")]
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod codedui;

pub use actions::{
    Action, ActionContext, ActionEnv, ActionOutput, ActionPipelineService, ActionResult,
    ActionSettings, HighlightMode, NumericComparison, PageAction,
};
pub use browser::{Browser, DriverSession, PageCache};
pub use builder::{BuilderHooks, PageBuilder, PageFactory};
pub use config::{LoggingConfig, SpecBindConfig};
pub use cookie::{format_cookie_date, CookieBuilder, CookieDirective};
pub use element_type::{
    Constructor, ConstructorScope, ElementKind, ElementType, ElementTypeRegistry, ParamType,
    ScopeSource,
};
pub use handler::{ComboBoxItem, PageElementHandler};
pub use history::PageHistoryService;
pub use locator::{ordered_native_locators, ElementLocator, How, NativeLocator};
pub use mapper::PageMapper;
pub use navigation::UriHelper;
pub use page::{normalize_name, Page, PageBase, TableRowPage};
pub use property::{
    BoundElement, BoundList, BoundTable, ElementAccess, ListAccess, PropertyData, PropertyKind,
    ValueSlot,
};
pub use proxy::{ElementProxy, ListBinding, NativePage, NativeSlot, TableRows};
pub use result::{SpecBindError, SpecBindResult};
pub use schema::{
    load_schemas, FrameTarget, PageModel, PageNavigation, PageSchema, PropertySchema,
    VirtualProperty,
};
pub use steps::{CommonPageSteps, DataSteps, StepContext, StepRegistry, StepTable, WaitingSteps};
pub use tracing_support::init_tracing;
pub use validation::{ComparisonType, ListComparison, ValidationResult, ValidationTable};
pub use wait::{
    wait_for_condition, wait_until, CancellationToken, ElementProbe, Point, WaitConditions,
    WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Everything a step definition file needs
pub mod prelude {
    pub use super::actions::*;
    pub use super::config::*;
    pub use super::steps::*;
    pub use super::validation::*;
    pub use super::{
        Browser, ComboBoxItem, ElementLocator, Page, PageHistoryService, PageMapper, PageModel,
        PageSchema, PropertyData, PropertySchema, SpecBindError, SpecBindResult, WaitConditions,
    };
    pub use super::tracing_support::init_tracing;
}
