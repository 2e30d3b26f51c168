//! Regex dispatch from step text to step methods.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use regex::{Captures, Regex};

use super::{CommonPageSteps, DataSteps, StepContext, StepTable, WaitingSteps};
use crate::result::{SpecBindError, SpecBindResult};

/// A step method: the scenario, the pattern's captures and the step table
pub type StepHandler = Box<dyn Fn(&StepContext, &Captures<'_>, Option<&StepTable>) -> SpecBindResult<()>>;

struct StepBinding {
    pattern: Regex,
    handler: StepHandler,
}

/// Step bindings tried in registration order; the first match runs
#[derive(Default)]
pub struct StepRegistry {
    bindings: Vec<StepBinding>,
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.bindings.iter().map(|b| b.pattern.as_str()))
            .finish()
    }
}

fn capture<'t>(captures: &Captures<'t>, index: usize) -> &'t str {
    captures.get(index).map_or("", |m| m.as_str().trim())
}

fn number<T: FromStr>(captures: &Captures<'_>, index: usize) -> SpecBindResult<T> {
    let text = capture(captures, index);
    text.parse()
        .map_err(|_| SpecBindError::invalid_argument("step", format!("'{text}' is not a number")))
}

fn seconds(captures: &Captures<'_>, index: usize) -> SpecBindResult<Option<Duration>> {
    match captures.get(index) {
        Some(_) => Ok(Some(Duration::from_secs(number(captures, index)?))),
        None => Ok(None),
    }
}

fn required<'t>(table: Option<&'t StepTable>, step: &str) -> SpecBindResult<&'t StepTable> {
    table.ok_or_else(|| SpecBindError::execute(format!("The step '{step}' requires a table")))
}

impl StepRegistry {
    /// Registry without bindings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a pattern. Patterns match the whole step text, ignoring case,
    /// after the Given/When/Then/And/But keyword is removed.
    pub fn register<F>(&mut self, pattern: &str, handler: F) -> SpecBindResult<()>
    where
        F: Fn(&StepContext, &Captures<'_>, Option<&StepTable>) -> SpecBindResult<()> + 'static,
    {
        let pattern = Regex::new(&format!("(?i)^{pattern}$")).map_err(|err| {
            SpecBindError::invalid_argument("pattern", format!("Invalid step pattern '{pattern}': {err}"))
        })?;
        self.bindings.push(StepBinding {
            pattern,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Run the first binding matching `text`
    pub fn execute(&self, context: &StepContext, text: &str, table: Option<&StepTable>) -> SpecBindResult<()> {
        let step = strip_keyword(text);
        for binding in &self.bindings {
            if let Some(captures) = binding.pattern.captures(step) {
                tracing::info!(step, "executing step");
                return (binding.handler)(context, &captures, table);
            }
        }
        Err(SpecBindError::execute(format!("No step binding matches '{step}'")))
    }

    /// Registry with the default vocabulary
    pub fn with_defaults() -> SpecBindResult<Self> {
        let mut registry = Self::new();

        // Navigation
        registry.register(r"I navigate to the (.+?) page(?: with parameters)?", |ctx, c, table| {
            let steps = CommonPageSteps::new(ctx);
            let page = match table {
                Some(arguments) => steps.given_navigate_to_page_with_arguments(capture(c, 1), arguments),
                None => steps.given_navigate_to_page(capture(c, 1)),
            };
            page.map(|_| ())
        })?;
        registry.register(r"I am on the (.+?) page", |ctx, c, _| {
            CommonPageSteps::new(ctx).given_ensure_on_page(capture(c, 1)).map(|_| ())
        })?;
        registry.register(r"I return to the (.+?) page", |ctx, c, _| {
            CommonPageSteps::new(ctx).given_return_to_page(capture(c, 1)).map(|_| ())
        })?;
        registry.register(r"I close the (.+?) dialog", |ctx, c, _| {
            CommonPageSteps::new(ctx).when_i_close_dialog(capture(c, 1))
        })?;
        registry.register(r"I navigate to item (\d+) (?:in|of) the (.+?) list", |ctx, c, _| {
            CommonPageSteps::new(ctx)
                .given_navigate_to_list_item(number(c, 1)?, capture(c, 2))
                .map(|_| ())
        })?;
        registry.register(r"I navigate to the (.+?) list item matching criteria", |ctx, c, table| {
            CommonPageSteps::new(ctx)
                .given_navigate_to_list_item_by_criteria(capture(c, 1), required(table, "list item matching criteria")?)
                .map(|_| ())
        })?;
        registry.register(r"I navigate to the (.+?) element", |ctx, c, _| {
            CommonPageSteps::new(ctx).given_navigate_to_element(capture(c, 1)).map(|_| ())
        })?;

        // Interaction
        registry.register(r"I (?:choose|click|press) (?:the )?(.+?)", |ctx, c, _| {
            CommonPageSteps::new(ctx).when_i_choose(capture(c, 1))
        })?;
        registry.register(r"I hover over (?:the )?(.+?)", |ctx, c, _| {
            CommonPageSteps::new(ctx).when_i_hover_over(capture(c, 1))
        })?;
        registry.register(r"I enter data", |ctx, _, table| {
            DataSteps::new(ctx).when_i_enter_data(required(table, "I enter data")?)
        })?;
        registry.register(r"I clear (?:the )?(.+?)", |ctx, c, _| {
            DataSteps::new(ctx).when_i_clear(capture(c, 1))
        })?;

        // Validation
        registry.register(
            r"I see the (.+?) list has (?:(exactly|at least|at most|more than|less than|fewer than|greater than) )?(\d+) (?:items?|rows?)",
            |ctx, c, _| DataSteps::new(ctx).then_i_see_list_row_count(capture(c, 1), capture(c, 2), number(c, 3)?),
        )?;
        registry.register(r"I see the (.+?) list (.+?)", |ctx, c, table| {
            DataSteps::new(ctx).then_i_see_list(capture(c, 1), capture(c, 2), required(table, "I see the list")?)
        })?;
        registry.register(r"I see the (.+?) combo box (.+?)", |ctx, c, table| {
            DataSteps::new(ctx).then_i_see_combo_box_items(
                capture(c, 1),
                capture(c, 2),
                required(table, "I see the combo box")?,
            )
        })?;
        registry.register(r"I see(?: the following)?", |ctx, _, table| {
            DataSteps::new(ctx).then_i_see(required(table, "I see")?)
        })?;

        // Waiting
        registry.register(r"I wait(?: (\d+) seconds?)? for the (.+?) page", |ctx, c, _| {
            WaitingSteps::new(ctx)
                .wait_for_page(capture(c, 2), seconds(c, 1)?)
                .map(|_| ())
        })?;
        registry.register(r"I wait(?: (\d+) seconds?)? for (?:the )?(.+?) to (.+?)", |ctx, c, _| {
            WaitingSteps::new(ctx).wait_for_element(capture(c, 2), capture(c, 3), seconds(c, 1)?)
        })?;

        Ok(registry)
    }
}

fn strip_keyword(text: &str) -> &str {
    let trimmed = text.trim();
    for keyword in ["Given", "When", "Then", "And", "But"] {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    trimmed
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_keyword() {
        assert_eq!(strip_keyword("Given I enter data"), "I enter data");
        assert_eq!(strip_keyword("  And   I see"), "I see");
        assert_eq!(strip_keyword("Andrew clicks"), "Andrew clicks");
    }

    #[test]
    fn test_invalid_pattern() {
        let mut registry = StepRegistry::new();
        let err = registry.register("I (", |_, _, _| Ok(())).unwrap_err();
        assert_eq!(err.param_name(), Some("pattern"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_defaults_compile() {
        let registry = StepRegistry::with_defaults().unwrap();
        assert_eq!(registry.len(), 17);
    }

    #[cfg(feature = "selenium")]
    mod dispatch_tests {
        use super::*;
        use crate::steps::tests::context;

        fn table(text: &str) -> StepTable {
            StepTable::parse(text).unwrap()
        }

        #[test]
        fn test_scenario() {
            let (driver, ctx) = context();
            let registry = StepRegistry::with_defaults().unwrap();
            let run = |text: &str, table: Option<&StepTable>| registry.execute(&ctx, text, table);

            run("Given I navigate to the Home page", None).unwrap();
            run(
                "When I enter data",
                Some(&table("| Field | Value |\n| User Name | ann |")),
            )
            .unwrap();
            run("And I choose Go", None).unwrap();
            run(
                "Then I see",
                Some(&table("| Field | Rule | Value |\n| User Name | equals | ann |")),
            )
            .unwrap();
            run("And I see the Results list has 3 items", None).unwrap();
            run("And I see the Results list has at least 2 rows", None).unwrap();
            run(
                "And I see the Results list contains",
                Some(&table("| Field | Value |\n| Name | Zig |")),
            )
            .unwrap();
            run(
                "And I see the Color combo box starts with",
                Some(&table("| Text |\n| Red |")),
            )
            .unwrap();
            run("When I navigate to item 2 in the Results list", None).unwrap();
            assert_eq!(
                ctx.current_page()
                    .unwrap()
                    .try_get_property("Price")
                    .unwrap()
                    .get_current_value()
                    .unwrap()
                    .as_deref(),
                Some("20")
            );
            run("Given I return to the Home page", None).unwrap();
            run("Then I wait for Go to become enabled", None).unwrap();

            assert_eq!(driver.value_of("user").as_deref(), Some("ann"));
            assert!(driver.calls().contains(&"click:go".to_string()));
        }

        #[test]
        fn test_closed_dialog_cannot_be_returned_to() {
            let (_, ctx) = context();
            let registry = StepRegistry::with_defaults().unwrap();
            registry.execute(&ctx, "Given I navigate to the Home page", None).unwrap();
            registry.execute(&ctx, "When I close the Start dialog", None).unwrap();
            let err = registry
                .execute(&ctx, "Given I return to the Home page", None)
                .unwrap_err();
            assert!(matches!(err, SpecBindError::PageNavigation { .. }));
        }

        #[test]
        fn test_unmatched_step() {
            let (_, ctx) = context();
            let registry = StepRegistry::with_defaults().unwrap();
            let err = registry.execute(&ctx, "Then the moon is full", None).unwrap_err();
            assert!(err.to_string().contains("No step binding matches 'the moon is full'"));
        }

        #[test]
        fn test_table_required() {
            let (_, ctx) = context();
            let registry = StepRegistry::with_defaults().unwrap();
            let err = registry.execute(&ctx, "When I enter data", None).unwrap_err();
            assert!(err.to_string().contains("requires a table"));
        }
    }
}
