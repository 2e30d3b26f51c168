//! Data entry and validation steps.

use super::{StepContext, StepTable};
use crate::actions::{
    ClearDataAction, ElementContext, EnterDataAction, EntryContext, NumericComparison,
    RowCountContext, ValidateComboBoxAction, ValidateComboBoxContext, ValidateItemAction,
    ValidateItemContext, ValidateListAction, ValidateListContext, ValidateListRowCountAction,
};
use crate::handler::ComboBoxItem;
use crate::result::SpecBindResult;
use crate::validation::{ListComparison, ValidationTable};

/// Steps that enter and check data on the current page
#[derive(Debug, Clone, Copy)]
pub struct DataSteps<'a> {
    context: &'a StepContext,
}

impl<'a> DataSteps<'a> {
    /// Steps over a scenario
    pub const fn new(context: &'a StepContext) -> Self {
        Self { context }
    }

    /// When I enter data, from a `Field` / `Value` table; rows are entered
    /// in order and the first failure stops the step
    pub fn when_i_enter_data(&self, data: &StepTable) -> SpecBindResult<()> {
        let field = data.require_column("Field")?;
        let value = data.require_column("Value")?;
        for row in data.rows() {
            let cell = |i: usize| row.get(i).map_or("", String::as_str);
            let _ = self
                .context
                .perform(&EnterDataAction, &EntryContext::new(cell(field), cell(value)))?;
        }
        Ok(())
    }

    /// When I clear {field}
    pub fn when_i_clear(&self, property_name: &str) -> SpecBindResult<()> {
        self.context
            .perform(&ClearDataAction, &ElementContext::new(property_name))
            .map(|_| ())
    }

    /// Then I see, from a `Field` / `Rule` / `Value` table
    pub fn then_i_see(&self, rules: &StepTable) -> SpecBindResult<()> {
        let validations = ValidationTable::from_step_table(rules)?;
        self.context
            .perform(&ValidateItemAction, &ValidateItemContext::new(validations))
            .map(|_| ())
    }

    /// Then I see the {list} list {rule}
    pub fn then_i_see_list(&self, property_name: &str, rule: &str, rules: &StepTable) -> SpecBindResult<()> {
        let context = ValidateListContext::new(
            property_name,
            ListComparison::parse(rule)?,
            ValidationTable::from_step_table(rules)?,
        );
        self.context.perform(&ValidateListAction, &context).map(|_| ())
    }

    /// Then I see the {field} combo box {rule}, from a `Text` table with an
    /// optional `Value` column
    pub fn then_i_see_combo_box_items(
        &self,
        property_name: &str,
        rule: &str,
        items: &StepTable,
    ) -> SpecBindResult<()> {
        let text = items.require_column("Text")?;
        let value = items.column("Value");
        let expected = items
            .rows()
            .iter()
            .map(|row| {
                let cell = |i: usize| row.get(i).map_or("", String::as_str);
                ComboBoxItem::new(
                    cell(text),
                    value.map(cell).filter(|v| !v.is_empty()).map(str::to_string),
                )
            })
            .collect();
        let context = ValidateComboBoxContext::new(property_name, ListComparison::parse(rule)?, expected);
        self.context.perform(&ValidateComboBoxAction, &context).map(|_| ())
    }

    /// Then I see the {list} list has {comparison} {count} items
    pub fn then_i_see_list_row_count(&self, property_name: &str, comparison: &str, count: usize) -> SpecBindResult<()> {
        let context = RowCountContext::new(property_name, NumericComparison::parse(comparison)?, count);
        self.context.perform(&ValidateListRowCountAction, &context).map(|_| ())
    }
}

#[cfg(all(test, feature = "selenium"))]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::steps::tests::context;
    use crate::steps::CommonPageSteps;

    fn on_home() -> (std::rc::Rc<crate::selenium::MockWebDriver>, StepContext) {
        let (driver, ctx) = context();
        let _ = CommonPageSteps::new(&ctx).given_navigate_to_page("Home").unwrap();
        (driver, ctx)
    }

    #[test]
    fn test_enter_then_see() {
        let (driver, ctx) = on_home();
        let steps = DataSteps::new(&ctx);
        let data = StepTable::new(vec!["Field", "Value"])
            .with_row(vec!["User Name", "ann"])
            .with_row(vec!["Note", "final"]);
        steps.when_i_enter_data(&data).unwrap();
        assert_eq!(driver.value_of("user").as_deref(), Some("ann"));

        let rules = StepTable::new(vec!["Field", "Rule", "Value"])
            .with_row(vec!["User Name", "equals", "ANN"])
            .with_row(vec!["Note", "starts with", "fin"])
            .with_row(vec!["Off", "is not enabled", "true"]);
        steps.then_i_see(&rules).unwrap();
    }

    #[test]
    fn test_enter_data_requires_columns() {
        let (_, ctx) = on_home();
        let table = StepTable::new(vec!["Name", "Value"]).with_row(vec!["x", "y"]);
        let err = DataSteps::new(&ctx).when_i_enter_data(&table).unwrap_err();
        assert!(err.to_string().contains("'Field' column"));
    }

    #[test]
    fn test_clear() {
        let (driver, ctx) = on_home();
        let steps = DataSteps::new(&ctx);
        steps
            .when_i_enter_data(&StepTable::new(vec!["Field", "Value"]).with_row(vec!["User Name", "ann"]))
            .unwrap();
        steps.when_i_clear("User Name").unwrap();
        assert_eq!(driver.value_of("user").as_deref(), Some(""));
    }

    #[test]
    fn test_see_failure_lists_every_violation() {
        let (_, ctx) = on_home();
        let rules = StepTable::new(vec!["Field", "Value"])
            .with_row(vec!["Go", "Stop"])
            .with_row(vec!["Missing", "x"]);
        let message = DataSteps::new(&ctx).then_i_see(&rules).unwrap_err().to_string();
        assert!(message.contains("Stop"));
        assert!(message.contains("Missing"));
    }

    #[test]
    fn test_list_steps() {
        let (_, ctx) = on_home();
        let steps = DataSteps::new(&ctx);
        let rules = StepTable::new(vec!["Field", "Rule", "Value"]).with_row(vec!["Name", "does not equal", "Cobol"]);
        steps.then_i_see_list("Results", "equals", &rules).unwrap();
        steps.then_i_see_list_row_count("Results", "at most", 3).unwrap();
        assert!(steps.then_i_see_list_row_count("Results", "more than", 3).is_err());
        assert!(steps.then_i_see_list("Results", "sometimes", &rules).is_err());
    }

    #[test]
    fn test_combo_box_step() {
        let (_, ctx) = on_home();
        let items = StepTable::new(vec!["Text", "Value"])
            .with_row(vec!["Green", "g"])
            .with_row(vec!["Red", ""]);
        DataSteps::new(&ctx).then_i_see_combo_box_items("Color", "contains", &items).unwrap();
        let wrong = StepTable::new(vec!["Text"]).with_row(vec!["Red"]);
        assert!(DataSteps::new(&ctx)
            .then_i_see_combo_box_items("Color", "equals", &wrong)
            .is_err());
    }
}
