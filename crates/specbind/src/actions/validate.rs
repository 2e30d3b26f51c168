//! Validation and list item actions.
//!
//! Each validation runs through [`do_validate`], so retry mode applies to
//! all of them. A failure message always carries the full outcome table.

use super::{
    do_validate, Action, ActionEnv, ActionOutput, ActionResult, ListItemByCriteriaContext,
    ListItemByIndexContext, RowCountContext, ValidateComboBoxContext, ValidateItemContext,
    ValidateListContext,
};
use crate::handler::ComboBoxItem;
use crate::result::{SpecBindError, SpecBindResult};
use crate::validation::{ListComparison, ValidationResult};

// =============================================================================
// PAGE AND LIST VALIDATION
// =============================================================================

/// Check a rule table against the current page
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateItemAction;

impl Action for ValidateItemAction {
    type Context = ValidateItemContext;

    fn name(&self) -> &'static str {
        "ValidateItem"
    }

    fn execute(&self, env: &ActionEnv, context: &ValidateItemContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let page = env.require_current_page()?;
            let table = &context.validations;
            let (valid, result) = do_validate(env.settings(), "page validation", || {
                let item = table.validate_page(page.as_ref())?;
                Ok((item.is_valid(), ValidationResult::for_item(table, item)))
            })?;
            if !valid {
                return Err(SpecBindError::execute(format!(
                    "Value comparison(s) failed. See details for validation results.\n{}",
                    result.format_table()
                )));
            }
            Ok(Some(ActionOutput::Validation(result)))
        };
        run().into()
    }
}

/// Check a rule table against the items of a list
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateListAction;

impl Action for ValidateListAction {
    type Context = ValidateListContext;

    fn name(&self) -> &'static str {
        "ValidateList"
    }

    fn execute(&self, env: &ActionEnv, context: &ValidateListContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let list = env.locator()?.get_list(&context.property_name)?;
            let (valid, result) = do_validate(env.settings(), "list validation", || {
                let result = list.validate_list(context.comparison, &context.validations)?;
                Ok((result.is_valid, result))
            })?;
            if !valid {
                return Err(SpecBindError::execute(format!(
                    "List validation of field '{}' failed ({} {} item(s)).\n{}",
                    context.property_name,
                    context.comparison,
                    result.item_count,
                    result.format_table()
                )));
            }
            Ok(Some(ActionOutput::Validation(result)))
        };
        run().into()
    }
}

// =============================================================================
// COMBO BOX
// =============================================================================

fn item_matches(expected: &ComboBoxItem, actual: &ComboBoxItem) -> bool {
    expected.text.trim().eq_ignore_ascii_case(actual.text.trim())
        && expected
            .value
            .as_deref()
            .map_or(true, |value| actual.value.as_deref() == Some(value))
}

fn sequence_matches(expected: &[ComboBoxItem], actual: &[ComboBoxItem]) -> bool {
    expected.len() == actual.len() && expected.iter().zip(actual).all(|(e, a)| item_matches(e, a))
}

/// Whether the actual options satisfy the expected items under `comparison`
fn combo_box_matches(comparison: ListComparison, expected: &[ComboBoxItem], actual: &[ComboBoxItem]) -> bool {
    let present = |item: &ComboBoxItem| actual.iter().any(|a| item_matches(item, a));
    match comparison {
        ListComparison::Equals => sequence_matches(expected, actual),
        ListComparison::Contains => expected.iter().all(present),
        ListComparison::DoesNotContain => !expected.iter().any(present),
        ListComparison::StartsWith => {
            actual.len() >= expected.len() && sequence_matches(expected, &actual[..expected.len()])
        }
        ListComparison::EndsWith => {
            actual.len() >= expected.len()
                && sequence_matches(expected, &actual[actual.len() - expected.len()..])
        }
    }
}

fn describe_items(items: &[ComboBoxItem]) -> String {
    items
        .iter()
        .map(|item| match &item.value {
            Some(value) => format!("{} ({value})", item.text),
            None => item.text.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check the options of a combo box
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateComboBoxAction;

impl Action for ValidateComboBoxAction {
    type Context = ValidateComboBoxContext;

    fn name(&self) -> &'static str {
        "ValidateComboBox"
    }

    fn execute(&self, env: &ActionEnv, context: &ValidateComboBoxContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let element = env.locator()?.get_element(&context.property_name)?;
            let (valid, actual) = do_validate(env.settings(), "combo box validation", || {
                let actual = element.get_combo_box_items()?;
                Ok((combo_box_matches(context.comparison, &context.items, &actual), actual))
            })?;
            if !valid {
                return Err(SpecBindError::execute(format!(
                    "Combo box validation of field '{}' failed.\nExpected items ({}): {}\nActual items: {}",
                    context.property_name,
                    context.comparison,
                    describe_items(&context.items),
                    describe_items(&actual)
                )));
            }
            Ok(None)
        };
        run().into()
    }
}

/// Check the number of items in a list
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateListRowCountAction;

impl Action for ValidateListRowCountAction {
    type Context = RowCountContext;

    fn name(&self) -> &'static str {
        "ValidateListRowCount"
    }

    fn execute(&self, env: &ActionEnv, context: &RowCountContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let list = env.locator()?.get_list(&context.property_name)?;
            let (valid, actual) = do_validate(env.settings(), "list row count", || {
                let count = list.get_items()?.len();
                Ok((context.comparison.evaluate(count, context.count), count))
            })?;
            if !valid {
                return Err(SpecBindError::execute(format!(
                    "List count validation of field '{}' failed. Expected: {} {}, Actual: {actual}",
                    context.property_name, context.comparison, context.count
                )));
            }
            Ok(Some(ActionOutput::Value(Some(actual.to_string()))))
        };
        run().into()
    }
}

// =============================================================================
// LIST ITEMS
// =============================================================================

/// The list item at a one-based position, as a page
#[derive(Debug, Clone, Copy, Default)]
pub struct GetListItemByIndexAction;

impl Action for GetListItemByIndexAction {
    type Context = ListItemByIndexContext;

    fn name(&self) -> &'static str {
        "GetListItemByIndex"
    }

    fn execute(&self, env: &ActionEnv, context: &ListItemByIndexContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let position = context.index.checked_sub(1).ok_or_else(|| {
                SpecBindError::invalid_argument("index", "List item positions start at 1")
            })?;
            let list = env.locator()?.get_list(&context.property_name)?;
            let item = list.get_item_at_index(position)?.ok_or_else(|| {
                SpecBindError::execute(format!(
                    "Could not find item {} on list '{}'",
                    context.index, context.property_name
                ))
            })?;
            Ok(Some(ActionOutput::Page(item)))
        };
        run().into()
    }
}

/// The first list item matching a rule table, as a page
#[derive(Debug, Clone, Copy, Default)]
pub struct GetListItemByCriteriaAction;

impl Action for GetListItemByCriteriaAction {
    type Context = ListItemByCriteriaContext;

    fn name(&self) -> &'static str {
        "GetListItemByCriteria"
    }

    fn execute(&self, env: &ActionEnv, context: &ListItemByCriteriaContext) -> ActionResult {
        let run = || -> SpecBindResult<Option<ActionOutput>> {
            let list = env.locator()?.get_list(&context.property_name)?;
            let (_, (found, result)) = do_validate(env.settings(), "list item lookup", || {
                let (found, result) = list.find_item_in_list(&context.validations)?;
                Ok((found.is_some(), (found, result)))
            })?;
            found.map(|item| Some(ActionOutput::Page(item))).ok_or_else(|| {
                SpecBindError::execute(format!(
                    "Could not find an item in list '{}' matching the criteria.\n{}",
                    context.property_name,
                    result.format_table()
                ))
            })
        };
        run().into()
    }
}
