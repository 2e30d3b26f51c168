//! Table-driven validation of pages and lists.
//!
//! A step table with `Field`, `Rule` and `Value` columns becomes a
//! [`ValidationTable`]. Each rule is evaluated against one page (or one list
//! item page) and every outcome is kept, so a failure reports all violations
//! at once through [`ValidationResult::format_table`].

mod comparer;

pub use comparer::{parse_bool, ComparisonType};

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::page::Page;
use crate::result::{SpecBindError, SpecBindResult};
use crate::steps::StepTable;

// =============================================================================
// RULES
// =============================================================================

/// One rule: field, expected value, comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemValidation {
    /// Property name as written in the step
    pub field_name: String,
    /// Expected value
    pub comparison_value: String,
    /// Comparison applied
    pub comparison_type: ComparisonType,
}

impl ItemValidation {
    /// Create a rule
    pub fn new(
        field_name: impl Into<String>,
        comparison_value: impl Into<String>,
        comparison_type: ComparisonType,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            comparison_value: comparison_value.into(),
            comparison_type,
        }
    }

    /// Evaluate against a page. A field the page does not have is recorded,
    /// never raised.
    pub fn validate(&self, page: &dyn Page) -> SpecBindResult<PropertyResult> {
        let Some(property) = page.try_get_property(&self.field_name) else {
            return Ok(PropertyResult::missing(self.clone()));
        };
        let (is_valid, actual_value) = property.validate_item(self)?;
        Ok(PropertyResult {
            validation: self.clone(),
            field_exists: true,
            is_valid,
            actual_value,
        })
    }
}

impl fmt::Display for ItemValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} '{}'",
            self.field_name, self.comparison_type, self.comparison_value
        )
    }
}

/// An ordered set of rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationTable {
    validations: Vec<ItemValidation>,
}

impl ValidationTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule
    pub fn add(&mut self, field: &str, rule: &str, value: &str) {
        self.validations
            .push(ItemValidation::new(field, value, ComparisonType::parse(rule)));
    }

    /// Build from a step table with `Field`, `Value` and optional `Rule`
    /// columns; a missing rule means `equals`.
    pub fn from_step_table(table: &StepTable) -> SpecBindResult<Self> {
        let field = table.column("field").ok_or_else(|| {
            SpecBindError::execute("A validation table must contain a 'Field' column")
        })?;
        let value = table.column("value").ok_or_else(|| {
            SpecBindError::execute("A validation table must contain a 'Value' column")
        })?;
        let rule = table.column("rule");

        let mut validations = Self::new();
        for row in table.rows() {
            let cell = |i: usize| row.get(i).map_or("", String::as_str);
            validations.add(cell(field), rule.map_or("equals", cell), cell(value));
        }
        Ok(validations)
    }

    /// Rules in order
    pub fn validations(&self) -> &[ItemValidation] {
        &self.validations
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.validations.is_empty()
    }

    /// Evaluate every rule against one page
    pub fn validate_page(&self, page: &dyn Page) -> SpecBindResult<ValidationItemResult> {
        let property_results = self
            .validations
            .iter()
            .map(|v| v.validate(page))
            .collect::<SpecBindResult<Vec<_>>>()?;
        Ok(ValidationItemResult { property_results })
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Outcome of one rule on one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyResult {
    /// The rule
    pub validation: ItemValidation,
    /// Whether the field exists on the page
    pub field_exists: bool,
    /// Whether the comparison held
    pub is_valid: bool,
    /// Value read from the UI
    pub actual_value: Option<String>,
}

impl PropertyResult {
    fn missing(validation: ItemValidation) -> Self {
        Self {
            validation,
            field_exists: false,
            is_valid: false,
            actual_value: None,
        }
    }

    fn display_actual(&self) -> String {
        if !self.field_exists {
            return "<missing property>".to_string();
        }
        match &self.actual_value {
            Some(value) => value.clone(),
            None => "<null>".to_string(),
        }
    }
}

/// Outcome of every rule on one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationItemResult {
    /// One entry per rule
    pub property_results: Vec<PropertyResult>,
}

impl ValidationItemResult {
    /// All rules held
    pub fn is_valid(&self) -> bool {
        self.property_results.iter().all(|r| r.is_valid)
    }
}

/// How item results of a list combine into one verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ListComparison {
    /// Every item matches
    Equals,
    /// At least one item matches
    Contains,
    /// No item matches
    DoesNotContain,
    /// The first item matches
    StartsWith,
    /// The last item matches
    EndsWith,
}

impl ListComparison {
    /// Parse step phrasing ("contains", "does not contain", "starts with", ...)
    pub fn parse(text: &str) -> SpecBindResult<Self> {
        let key: String = text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "equals" | "equal" | "exists" | "matches" => Ok(Self::Equals),
            "contains" | "contain" | "hasitems" => Ok(Self::Contains),
            "doesnotcontain" | "notcontains" => Ok(Self::DoesNotContain),
            "startswith" | "startwith" => Ok(Self::StartsWith),
            "endswith" | "endwith" => Ok(Self::EndsWith),
            _ => Err(SpecBindError::invalid_argument(
                "comparison",
                format!("'{text}' is not a known list comparison"),
            )),
        }
    }

    /// Combine per-item verdicts
    #[must_use]
    pub fn evaluate(&self, items: &[bool]) -> bool {
        match self {
            Self::Equals => !items.is_empty() && items.iter().all(|v| *v),
            Self::Contains => items.iter().any(|v| *v),
            Self::DoesNotContain => !items.iter().any(|v| *v),
            Self::StartsWith => items.first().copied().unwrap_or(false),
            Self::EndsWith => items.last().copied().unwrap_or(false),
        }
    }
}

impl fmt::Display for ListComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::DoesNotContain => "does not contain",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
        })
    }
}

/// Aggregate outcome of a validation over one or more items
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Rules evaluated
    pub validations: Vec<ItemValidation>,
    /// Per-item outcomes in item order
    pub item_results: Vec<ValidationItemResult>,
    /// Overall verdict
    pub is_valid: bool,
    /// Number of items checked
    pub item_count: usize,
}

impl ValidationResult {
    /// Result for a single page
    pub fn for_item(table: &ValidationTable, item: ValidationItemResult) -> Self {
        let is_valid = item.is_valid();
        Self {
            validations: table.validations().to_vec(),
            item_results: vec![item],
            is_valid,
            item_count: 1,
        }
    }

    /// Result for a list, combined with `comparison`
    pub fn for_list(
        table: &ValidationTable,
        items: Vec<ValidationItemResult>,
        comparison: ListComparison,
    ) -> Self {
        let verdicts: Vec<bool> = items.iter().map(ValidationItemResult::is_valid).collect();
        Self {
            validations: table.validations().to_vec(),
            is_valid: comparison.evaluate(&verdicts),
            item_count: items.len(),
            item_results: items,
        }
    }

    /// Evaluate a table against each page in a list
    pub fn validate_list(
        table: &ValidationTable,
        pages: &[Rc<dyn Page>],
        comparison: ListComparison,
    ) -> SpecBindResult<Self> {
        let items = pages
            .iter()
            .map(|page| table.validate_page(page.as_ref()))
            .collect::<SpecBindResult<Vec<_>>>()?;
        Ok(Self::for_list(table, items, comparison))
    }

    /// Render every rule outcome as one aligned table
    pub fn format_table(&self) -> String {
        let mut rows = vec![[
            "Item".to_string(),
            "Field".to_string(),
            "Rule".to_string(),
            "Value".to_string(),
            "Actual".to_string(),
            "Result".to_string(),
        ]];
        for (index, item) in self.item_results.iter().enumerate() {
            for result in &item.property_results {
                rows.push([
                    (index + 1).to_string(),
                    result.validation.field_name.clone(),
                    result.validation.comparison_type.keyword().to_string(),
                    result.validation.comparison_value.clone(),
                    result.display_actual(),
                    if result.is_valid { "ok" } else { "FAILED" }.to_string(),
                ]);
            }
        }
        if self.item_results.is_empty() {
            for validation in &self.validations {
                rows.push([
                    "-".to_string(),
                    validation.field_name.clone(),
                    validation.comparison_type.keyword().to_string(),
                    validation.comparison_value.clone(),
                    "<no items>".to_string(),
                    "FAILED".to_string(),
                ]);
            }
        }

        let mut widths = [0usize; 6];
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        let mut out = String::new();
        for row in &rows {
            out.push('|');
            for (i, cell) in row.iter().enumerate() {
                out.push(' ');
                out.push_str(cell);
                out.push_str(&" ".repeat(widths[i] - cell.chars().count()));
                out.push_str(" |");
            }
            out.push('\n');
        }
        out
    }
}
