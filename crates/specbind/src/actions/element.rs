//! Actions on a single element.

use super::{
    millis, Action, ActionEnv, ActionOutput, ActionResult, ElementContext, EntryContext,
    WaitForElementContext,
};
use crate::result::{SpecBindError, SpecBindResult};
use crate::wait::WaitConditions;

/// Click a button, link or any clickable element once it is enabled
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonClickAction;

impl Action for ButtonClickAction {
    type Context = ElementContext;

    fn name(&self) -> &'static str {
        "ButtonClick"
    }

    fn execute(&self, env: &ActionEnv, context: &ElementContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let element = env.locator()?.get_element(&context.property_name)?;
            let timeout = env.settings().element_timeout;
            if !element.wait_for_element_condition(WaitConditions::BecomesEnabled, timeout) {
                return Err(SpecBindError::execute(format!(
                    "Element '{}' was not enabled within {}ms and could not be clicked",
                    context.property_name,
                    millis(timeout)
                )));
            }
            element.click_element()?;
            Ok(None)
        };
        run().into()
    }
}

/// Move the pointer over an element
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverOverElementAction;

impl Action for HoverOverElementAction {
    type Context = ElementContext;

    fn name(&self) -> &'static str {
        "HoverOverElement"
    }

    fn execute(&self, env: &ActionEnv, context: &ElementContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            env.locator()?.get_element(&context.property_name)?.hover()?;
            Ok(None)
        };
        run().into()
    }
}

/// Enter text into a field, or set a value property
#[derive(Debug, Clone, Copy, Default)]
pub struct EnterDataAction;

impl Action for EnterDataAction {
    type Context = EntryContext;

    fn name(&self) -> &'static str {
        "EnterData"
    }

    fn execute(&self, env: &ActionEnv, context: &EntryContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            env.locator()?
                .get_property(&context.property_name)?
                .fill_data(&context.data)?;
            Ok(None)
        };
        run().into()
    }
}

/// Clear a field or value property
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearDataAction;

impl Action for ClearDataAction {
    type Context = ElementContext;

    fn name(&self) -> &'static str {
        "ClearData"
    }

    fn execute(&self, env: &ActionEnv, context: &ElementContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            env.locator()?.get_property(&context.property_name)?.clear_data()?;
            Ok(None)
        };
        run().into()
    }
}

/// Treat an element's nested properties as a page
#[derive(Debug, Clone, Copy, Default)]
pub struct GetElementAsPageAction;

impl Action for GetElementAsPageAction {
    type Context = ElementContext;

    fn name(&self) -> &'static str {
        "GetElementAsPage"
    }

    fn execute(&self, env: &ActionEnv, context: &ElementContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let page = env
                .locator()?
                .get_element(&context.property_name)?
                .get_item_as_page()?;
            Ok(Some(ActionOutput::Page(page)))
        };
        run().into()
    }
}

/// Wait for an element to reach a state
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitForElementAction;

impl Action for WaitForElementAction {
    type Context = WaitForElementContext;

    fn name(&self) -> &'static str {
        "WaitForElement"
    }

    fn execute(&self, env: &ActionEnv, context: &WaitForElementContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let element = env.locator()?.get_element(&context.property_name)?;
            let timeout = context.timeout.unwrap_or(env.settings().element_timeout);
            if !element.wait_for_element_condition(context.condition, timeout) {
                return Err(SpecBindError::execute(format!(
                    "Element '{}' did not satisfy '{}' within {}ms",
                    context.property_name,
                    context.condition,
                    millis(timeout)
                )));
            }
            Ok(None)
        };
        run().into()
    }
}

#[cfg(all(test, feature = "selenium"))]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::actions::fixture;
    use crate::selenium::MockChange;
    use std::time::Duration;

    #[test]
    fn test_click() {
        let (driver, env) = fixture::on_home();
        let result = ButtonClickAction.execute(&env, &ElementContext::new("Go"));
        assert!(result.is_success());
        assert!(driver.calls().contains(&"click:go".to_string()));
    }

    #[test]
    fn test_click_disabled_fails() {
        let (driver, env) = fixture::on_home();
        let result = ButtonClickAction.execute(&env, &ElementContext::new("Off"));
        assert!(result.error().unwrap().to_string().contains("was not enabled"));
        assert!(!driver.calls().contains(&"click:off".to_string()));
    }

    #[test]
    fn test_click_unknown_property() {
        let (_, env) = fixture::on_home();
        let result = ButtonClickAction.execute(&env, &ElementContext::new("Missing"));
        assert!(result.error().unwrap().to_string().contains("Valid Properties"));
    }

    #[test]
    fn test_enter_and_clear() {
        let (driver, env) = fixture::on_home();
        assert!(EnterDataAction
            .execute(&env, &EntryContext::new("user name", "ann"))
            .is_success());
        assert_eq!(driver.value_of("user").as_deref(), Some("ann"));
        assert!(ClearDataAction.execute(&env, &ElementContext::new("UserName")).is_success());
        assert_eq!(driver.value_of("user").as_deref(), Some(""));
    }

    #[test]
    fn test_enter_value_property() {
        let (_, env) = fixture::on_home();
        assert!(EnterDataAction.execute(&env, &EntryContext::new("Note", "final")).is_success());
        let note = env.current_page().unwrap().try_get_property("note").unwrap();
        assert_eq!(note.get_current_value().unwrap().as_deref(), Some("final"));
    }

    #[test]
    fn test_hover() {
        let (driver, env) = fixture::on_home();
        assert!(HoverOverElementAction.execute(&env, &ElementContext::new("Go")).is_success());
        assert!(driver.calls().contains(&"hover:go".to_string()));
    }

    #[test]
    fn test_element_as_page() {
        let (driver, env) = fixture::on_home();
        let panel = GetElementAsPageAction
            .execute(&env, &ElementContext::new("Panel"))
            .check_page()
            .unwrap();
        assert_eq!(panel.page_type(), "Panel");
        panel.try_get_property("inner").unwrap().fill_data("x").unwrap();
        assert_eq!(driver.value_of("inner").as_deref(), Some("x"));

        let err = GetElementAsPageAction
            .execute(&env, &ElementContext::new("Go"))
            .check_page()
            .unwrap_err();
        assert!(err.to_string().contains("cannot be used as a page"));
    }

    #[test]
    fn test_wait_for_element() {
        let (driver, env) = fixture::on_home();
        driver.schedule(Duration::from_millis(10), MockChange::Enable("off".into()));
        let context = WaitForElementContext::new("Off", WaitConditions::BecomesEnabled)
            .with_timeout(Duration::from_millis(500));
        assert!(WaitForElementAction.execute(&env, &context).is_success());

        let context = WaitForElementContext::new("Go", WaitConditions::BecomesNonExistent);
        let result = WaitForElementAction.execute(&env, &context);
        assert!(result.error().unwrap().to_string().contains("becomes non-existent"));
    }
}
