//! Action Pipeline
//!
//! Every step verb is an [`Action`] run through the [`ActionPipelineService`]:
//! pre-actions, the action itself, then post-actions. Actions never raise;
//! they return an [`ActionResult`] and the caller decides whether a failure
//! propagates through [`ActionResult::check_result`].
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: A validation failure reports every violated rule at once
//! - **Poka-Yoke**: Property lookups list the valid names when they miss
//! - **Heijunka**: Timeouts and retry mode come from one explicit
//!   [`ActionSettings`] value instead of global state

mod context;
mod element;
mod navigation;
mod pipeline;
mod validate;

pub use context::{
    ActionContext, CloseDialogContext, ElementContext, EntryContext, ListItemByCriteriaContext, ListItemByIndexContext,
    NumericComparison, PageAction, PageNavigationContext, RowCountContext, ValidateComboBoxContext,
    ValidateItemContext, ValidateListContext, WaitForElementContext, WaitForPageContext,
};
pub use element::{
    ButtonClickAction, ClearDataAction, EnterDataAction, GetElementAsPageAction,
    HoverOverElementAction, WaitForElementAction,
};
pub use navigation::{CloseDialogAction, PageNavigationAction, WaitForPageAction};
pub use pipeline::{
    ActionPipelineService, CookiePreAction, HighlightPreAction, PageHistoryPostAction, PostAction,
    PreAction,
};
pub use validate::{
    GetListItemByCriteriaAction, GetListItemByIndexAction, ValidateComboBoxAction,
    ValidateItemAction, ValidateListAction, ValidateListRowCountAction,
};

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::Browser;
use crate::history::PageHistoryService;
use crate::mapper::PageMapper;
use crate::page::Page;
use crate::property::PropertyData;
use crate::result::{SpecBindError, SpecBindResult};
use crate::validation::ValidationResult;
use crate::wait::{WaitOptions, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

// =============================================================================
// ACTION RESULT
// =============================================================================

/// Payload of a successful action
#[derive(Debug)]
pub enum ActionOutput {
    /// A page the scenario can switch to
    Page(Rc<dyn Page>),
    /// A value read from the UI
    Value(Option<String>),
    /// The full outcome of a validation
    Validation(ValidationResult),
}

/// Outcome of one action
#[derive(Debug)]
pub enum ActionResult {
    /// The action succeeded
    Success(Option<ActionOutput>),
    /// The action failed
    Failure(SpecBindError),
}

impl ActionResult {
    /// Success without payload
    #[must_use]
    pub const fn successful() -> Self {
        Self::Success(None)
    }

    /// Success with payload
    #[must_use]
    pub const fn successful_with(output: ActionOutput) -> Self {
        Self::Success(Some(output))
    }

    /// Failure
    #[must_use]
    pub const fn failure(error: SpecBindError) -> Self {
        Self::Failure(error)
    }

    /// Whether the action succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Payload of a success
    #[must_use]
    pub const fn output(&self) -> Option<&ActionOutput> {
        match self {
            Self::Success(output) => output.as_ref(),
            Self::Failure(_) => None,
        }
    }

    /// Page payload of a success
    #[must_use]
    pub fn page(&self) -> Option<Rc<dyn Page>> {
        match self.output() {
            Some(ActionOutput::Page(page)) => Some(Rc::clone(page)),
            _ => None,
        }
    }

    /// Error of a failure
    #[must_use]
    pub const fn error(&self) -> Option<&SpecBindError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// The payload, or the error of a failure
    pub fn check_result(self) -> SpecBindResult<Option<ActionOutput>> {
        match self {
            Self::Success(output) => Ok(output),
            Self::Failure(error) => Err(error),
        }
    }

    /// The page payload; a success without a page is an execution error
    pub fn check_page(self) -> SpecBindResult<Rc<dyn Page>> {
        match self.check_result()? {
            Some(ActionOutput::Page(page)) => Ok(page),
            _ => Err(SpecBindError::execute("The action did not produce a page")),
        }
    }
}

impl From<SpecBindResult<Option<ActionOutput>>> for ActionResult {
    fn from(result: SpecBindResult<Option<ActionOutput>>) -> Self {
        match result {
            Ok(output) => Self::Success(output),
            Err(error) => Self::Failure(error),
        }
    }
}

// =============================================================================
// ACTION
// =============================================================================

/// One step verb
pub trait Action {
    /// Input the action reads
    type Context: ActionContext;

    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Run against the scenario state
    fn execute(&self, env: &ActionEnv, context: &Self::Context) -> ActionResult;
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Whether elements are highlighted before they are used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// Never highlight
    #[default]
    Off,
    /// Highlight every element an action targets
    Full,
}

/// Timeouts and modes shared by every action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSettings {
    /// Element waits and validation retries
    pub element_timeout: Duration,
    /// Page waits
    pub page_timeout: Duration,
    /// Delay between polls
    pub poll_interval: Duration,
    /// Re-run failing validations until the element timeout
    pub retry_validation_until_timeout: bool,
    /// Element highlighting
    pub highlight_mode: HighlightMode,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            page_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            retry_validation_until_timeout: false,
            highlight_mode: HighlightMode::Off,
        }
    }
}

impl ActionSettings {
    /// Poller for element-level waits
    #[must_use]
    pub fn waiter(&self) -> Waiter {
        Waiter::with_options(
            WaitOptions::new()
                .with_timeout(millis(self.element_timeout))
                .with_poll_interval(millis(self.poll_interval)),
        )
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Scenario state every action runs against
pub struct ActionEnv {
    browser: Rc<dyn Browser>,
    mapper: Rc<PageMapper>,
    history: RefCell<PageHistoryService>,
    current_page: RefCell<Option<Rc<dyn Page>>>,
    settings: ActionSettings,
}

impl fmt::Debug for ActionEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEnv")
            .field("history", &self.history)
            .field("current_page", &self.current_page)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ActionEnv {
    /// Fresh state over a browser session
    pub fn new(browser: Rc<dyn Browser>, mapper: Rc<PageMapper>, settings: ActionSettings) -> Self {
        Self {
            browser,
            mapper,
            history: RefCell::new(PageHistoryService::new()),
            current_page: RefCell::new(None),
            settings,
        }
    }

    /// Browser session
    pub fn browser(&self) -> &Rc<dyn Browser> {
        &self.browser
    }

    /// Page names
    pub fn mapper(&self) -> &PageMapper {
        &self.mapper
    }

    /// Timeouts and modes
    pub const fn settings(&self) -> &ActionSettings {
        &self.settings
    }

    /// Pages visited so far
    pub fn history(&self) -> Ref<'_, PageHistoryService> {
        self.history.borrow()
    }

    /// Mutable history
    pub fn history_mut(&self) -> RefMut<'_, PageHistoryService> {
        self.history.borrow_mut()
    }

    /// Page the scenario is on, if any
    pub fn current_page(&self) -> Option<Rc<dyn Page>> {
        self.current_page.borrow().clone()
    }

    /// Switch the scenario to another page
    pub fn set_current_page(&self, page: Rc<dyn Page>) {
        tracing::debug!(page = page.page_type(), "current page changed");
        *self.current_page.borrow_mut() = Some(page);
    }

    /// The current page, or an execution error
    pub fn require_current_page(&self) -> SpecBindResult<Rc<dyn Page>> {
        self.current_page().ok_or_else(|| {
            SpecBindError::execute("No page is active; navigate to a page before using its properties")
        })
    }

    /// Property lookups on the current page
    pub fn locator(&self) -> SpecBindResult<PropertyLocator> {
        Ok(PropertyLocator::new(self.require_current_page()?))
    }
}

// =============================================================================
// PROPERTY LOCATOR
// =============================================================================

/// Name lookups on one page that explain their misses
#[derive(Debug, Clone)]
pub struct PropertyLocator {
    page: Rc<dyn Page>,
}

impl PropertyLocator {
    /// Locator over `page`
    pub fn new(page: Rc<dyn Page>) -> Self {
        Self { page }
    }

    /// Page being searched
    pub fn page(&self) -> &Rc<dyn Page> {
        &self.page
    }

    /// Any property
    pub fn get_property(&self, name: &str) -> SpecBindResult<Rc<PropertyData>> {
        self.page
            .try_get_property(name)
            .ok_or_else(|| self.not_found(name, &|_| true))
    }

    /// An element or list property
    pub fn get_element(&self, name: &str) -> SpecBindResult<Rc<PropertyData>> {
        self.page
            .try_get_element(name)
            .ok_or_else(|| self.not_found(name, &|p| p.is_element() || p.is_list()))
    }

    /// A list property
    pub fn get_list(&self, name: &str) -> SpecBindResult<Rc<PropertyData>> {
        let property = self
            .page
            .try_get_property(name)
            .ok_or_else(|| self.not_found(name, &PropertyData::is_list))?;
        if !property.is_list() {
            return Err(SpecBindError::execute(format!(
                "Property '{}' on page {} is not a list",
                property.name(),
                self.page.page_type()
            )));
        }
        Ok(property)
    }

    fn not_found(&self, name: &str, filter: &dyn Fn(&PropertyData) -> bool) -> SpecBindError {
        SpecBindError::execute(format!(
            "Could not locate property '{name}' on page {}. Valid Properties: {}",
            self.page.page_type(),
            self.page.property_names(filter).join(", ")
        ))
    }
}

// =============================================================================
// VALIDATION RETRY
// =============================================================================

/// Run a validation once, or keep re-running it until it passes or the
/// element timeout expires. A timed-out retry reports the last observed
/// outcome; only a retry that never completed an attempt is a timeout.
pub(crate) fn do_validate<T, F>(
    settings: &ActionSettings,
    waited_for: &str,
    mut validate: F,
) -> SpecBindResult<(bool, T)>
where
    F: FnMut() -> SpecBindResult<(bool, T)>,
{
    if !settings.retry_validation_until_timeout {
        return validate();
    }

    let mut last = None;
    let mut error = None;
    let waited = settings.waiter().poll(
        || match validate() {
            Ok(outcome) => {
                let valid = outcome.0;
                last = Some(outcome);
                valid
            }
            Err(err) => {
                error = Some(err);
                true
            }
        },
        settings.element_timeout,
        waited_for,
    );
    tracing::debug!(
        waited_for,
        attempts = waited.attempts,
        elapsed_ms = millis(waited.elapsed),
        "validation retry finished"
    );
    if let Some(err) = error {
        return Err(err);
    }
    last.ok_or_else(|| SpecBindError::Timeout {
        ms: millis(settings.element_timeout),
        message: waited_for.to_string(),
    })
}

// =============================================================================
// TEST FIXTURE
// =============================================================================


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    mod action_result_tests {
        use super::*;

        #[test]
        fn test_check_result() {
            assert!(ActionResult::successful().check_result().unwrap().is_none());
            let value = ActionResult::successful_with(ActionOutput::Value(Some("x".into())));
            assert!(value.is_success());
            assert!(matches!(value.output(), Some(ActionOutput::Value(Some(v))) if v == "x"));

            let failed = ActionResult::failure(SpecBindError::execute("boom"));
            assert!(!failed.is_success());
            assert_eq!(failed.error().unwrap().to_string(), "boom");
            assert!(failed.check_result().is_err());
        }

        #[test]
        fn test_check_page_without_page() {
            let err = ActionResult::successful().check_page().unwrap_err();
            assert!(err.to_string().contains("did not produce a page"));
        }

        #[test]
        fn test_from_result() {
            let ok: ActionResult = Ok(None).into();
            assert!(ok.is_success());
            let err: ActionResult = Err(SpecBindError::execute("x")).into();
            assert!(err.error().is_some());
        }
    }

    mod do_validate_tests {
        use super::*;

        fn retrying() -> ActionSettings {
            ActionSettings {
                element_timeout: Duration::from_millis(40),
                poll_interval: Duration::from_millis(5),
                retry_validation_until_timeout: true,
                ..ActionSettings::default()
            }
        }

        #[test]
        fn test_single_attempt_without_retry() {
            let calls = Cell::new(0);
            let (valid, value) = do_validate(&ActionSettings::default(), "x", || {
                calls.set(calls.get() + 1);
                Ok((false, calls.get()))
            })
            .unwrap();
            assert!(!valid);
            assert_eq!(value, 1);
            assert_eq!(calls.get(), 1);
        }

        #[test]
        fn test_retry_until_valid() {
            let calls = Cell::new(0);
            let (valid, value) = do_validate(&retrying(), "x", || {
                calls.set(calls.get() + 1);
                Ok((calls.get() >= 3, calls.get()))
            })
            .unwrap();
            assert!(valid);
            assert_eq!(value, 3);
        }

        #[test]
        fn test_timeout_reports_last_outcome() {
            let calls = Cell::new(0);
            let (valid, value) = do_validate(&retrying(), "x", || {
                calls.set(calls.get() + 1);
                Ok((false, calls.get()))
            })
            .unwrap();
            assert!(!valid);
            assert!(value > 1);
            assert_eq!(value, calls.get());
        }

        #[test]
        fn test_error_stops_retry() {
            let calls = Cell::new(0);
            let err = do_validate::<(), _>(&retrying(), "x", || {
                calls.set(calls.get() + 1);
                Err(SpecBindError::execute("broken"))
            })
            .unwrap_err();
            assert_eq!(err.to_string(), "broken");
            assert_eq!(calls.get(), 1);
        }
    }

    #[cfg(feature = "selenium")]
    mod locator_tests {
        use super::*;
        use crate::actions::fixture;

        #[test]
        fn test_miss_lists_valid_names() {
            let (_, env) = fixture::on_home();
            let err = env.locator().unwrap().get_element("Nope").unwrap_err();
            let message = err.to_string();
            assert!(message.contains("Could not locate property 'Nope' on page HomePage"));
            assert!(message.contains("User Name, Go, Off, Color, Results, Panel"));
            assert!(!message.contains("Note"));
        }

        #[test]
        fn test_list_lookup_rejects_elements() {
            let (_, env) = fixture::on_home();
            let locator = env.locator().unwrap();
            assert!(locator.get_list("results").is_ok());
            let err = locator.get_list("go").unwrap_err();
            assert!(err.to_string().contains("is not a list"));
        }

        #[test]
        fn test_no_current_page() {
            let (_, env) = fixture::env_with(fixture::settings());
            assert!(env.locator().unwrap_err().to_string().contains("No page is active"));
        }
    }
}
