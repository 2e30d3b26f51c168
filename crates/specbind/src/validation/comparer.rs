//! Comparison rules used by table validations.

use std::fmt;

use serde::Serialize;

/// A validation rule keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ComparisonType {
    /// Values are equal (the default)
    #[default]
    Equals,
    /// Values differ
    DoesNotEqual,
    /// Actual contains expected
    Contains,
    /// Actual does not contain expected
    DoesNotContain,
    /// Actual starts with expected
    StartsWith,
    /// Actual ends with expected
    EndsWith,
    /// Element exists
    Exists,
    /// Element does not exist
    DoesNotExist,
    /// Element is enabled
    Enabled,
    /// Element is disabled
    NotEnabled,
}

impl ComparisonType {
    /// Parse a rule keyword. Case, spaces, dashes and underscores are
    /// ignored; anything unrecognised is `Equals`.
    #[must_use]
    pub fn parse(rule: &str) -> Self {
        let key: String = rule
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "exists" | "exist" => Self::Exists,
            "doesnotexist" | "notexists" => Self::DoesNotExist,
            "isenabled" | "enabled" => Self::Enabled,
            "isnotenabled" | "notenabled" | "disabled" => Self::NotEnabled,
            "contains" => Self::Contains,
            "doesnotcontain" => Self::DoesNotContain,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "doesnotequal" | "notequals" | "notequal" => Self::DoesNotEqual,
            _ => Self::Equals,
        }
    }

    /// Rule keyword as shown in reports
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::DoesNotEqual => "does not equal",
            Self::Contains => "contains",
            Self::DoesNotContain => "does not contain",
            Self::StartsWith => "starts with",
            Self::EndsWith => "ends with",
            Self::Exists => "exists",
            Self::DoesNotExist => "does not exist",
            Self::Enabled => "enabled",
            Self::NotEnabled => "not enabled",
        }
    }

    /// Whether the rule inspects element state rather than its value
    #[must_use]
    pub const fn is_state_check(&self) -> bool {
        matches!(
            self,
            Self::Exists | Self::DoesNotExist | Self::Enabled | Self::NotEnabled
        )
    }

    /// Compare an expected value with the value read from the UI.
    ///
    /// Text comparisons ignore case. Equality also holds when both sides
    /// parse as the same boolean or the same number.
    #[must_use]
    pub fn compare(&self, expected: &str, actual: Option<&str>) -> bool {
        let actual = actual.unwrap_or_default();
        let expected_lower = expected.trim().to_lowercase();
        let actual_lower = actual.trim().to_lowercase();
        match self {
            Self::Equals => values_equal(expected, actual),
            Self::DoesNotEqual => !values_equal(expected, actual),
            Self::Contains => actual_lower.contains(&expected_lower),
            Self::DoesNotContain => !actual_lower.contains(&expected_lower),
            Self::StartsWith => actual_lower.starts_with(&expected_lower),
            Self::EndsWith => actual_lower.ends_with(&expected_lower),
            // State rules are evaluated against the element, not its text
            Self::Exists | Self::DoesNotExist | Self::Enabled | Self::NotEnabled => false,
        }
    }

    /// Compare an observed element state against the rule. An explicit
    /// `false` comparison value inverts the expectation.
    #[must_use]
    pub fn compare_state(&self, expected: &str, observed: bool) -> bool {
        let wanted = parse_bool(expected).unwrap_or(true);
        observed == wanted
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parse a boolean the way step tables write them
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "checked" | "on" => Some(true),
        "false" | "no" | "unchecked" | "off" => Some(false),
        _ => None,
    }
}

fn values_equal(expected: &str, actual: &str) -> bool {
    let expected = expected.trim();
    let actual = actual.trim();
    if expected.to_lowercase() == actual.to_lowercase() {
        return true;
    }
    if let (Some(e), Some(a)) = (parse_bool(expected), parse_bool(actual)) {
        return e == a;
    }
    if let (Ok(e), Ok(a)) = (expected.parse::<f64>(), actual.parse::<f64>()) {
        return (e - a).abs() < f64::EPSILON;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_keywords() {
            assert_eq!(ComparisonType::parse("exists"), ComparisonType::Exists);
            assert_eq!(ComparisonType::parse("Does Not Exist"), ComparisonType::DoesNotExist);
            assert_eq!(ComparisonType::parse("isenabled"), ComparisonType::Enabled);
            assert_eq!(ComparisonType::parse("enabled"), ComparisonType::Enabled);
            assert_eq!(ComparisonType::parse("disabled"), ComparisonType::NotEnabled);
            assert_eq!(ComparisonType::parse("is not enabled"), ComparisonType::NotEnabled);
            assert_eq!(ComparisonType::parse("contains"), ComparisonType::Contains);
            assert_eq!(ComparisonType::parse("does_not_contain"), ComparisonType::DoesNotContain);
            assert_eq!(ComparisonType::parse("starts with"), ComparisonType::StartsWith);
            assert_eq!(ComparisonType::parse("ends-with"), ComparisonType::EndsWith);
            assert_eq!(ComparisonType::parse("not equals"), ComparisonType::DoesNotEqual);
            assert_eq!(ComparisonType::parse("notequal"), ComparisonType::DoesNotEqual);
        }

        #[test]
        fn test_default_is_equals() {
            assert_eq!(ComparisonType::parse(""), ComparisonType::Equals);
            assert_eq!(ComparisonType::parse("whatever"), ComparisonType::Equals);
        }
    }

    mod compare_tests {
        use super::*;

        #[test]
        fn test_equals_ignores_case() {
            assert!(ComparisonType::Equals.compare("Hello", Some("hello")));
            assert!(!ComparisonType::Equals.compare("Hello", Some("world")));
        }

        #[test]
        fn test_equals_by_value() {
            assert!(ComparisonType::Equals.compare("1.0", Some("1")));
            assert!(ComparisonType::Equals.compare("True", Some("yes")));
            assert!(ComparisonType::DoesNotEqual.compare("1", Some("2")));
        }

        #[test]
        fn test_missing_actual_is_empty() {
            assert!(ComparisonType::Equals.compare("", None));
            assert!(!ComparisonType::Equals.compare("x", None));
        }

        #[test]
        fn test_substring_rules() {
            assert!(ComparisonType::Contains.compare("ell", Some("HELLO")));
            assert!(ComparisonType::DoesNotContain.compare("xyz", Some("hello")));
            assert!(ComparisonType::StartsWith.compare("he", Some("Hello")));
            assert!(ComparisonType::EndsWith.compare("LO", Some("hello")));
        }

        #[test]
        fn test_state_rules() {
            assert!(ComparisonType::Exists.compare_state("", true));
            assert!(ComparisonType::Exists.compare_state("false", false));
            assert!(!ComparisonType::Enabled.compare_state("true", false));
        }
    }

    proptest! {
        #[test]
        fn prop_equals_reflexive_any_case(s in "[A-Za-z0-9 ]{0,20}") {
            prop_assert!(ComparisonType::Equals.compare(&s, Some(&s.to_uppercase())));
        }

        #[test]
        fn prop_contains_self(s in "[a-z]{1,12}", pre in "[a-z]{0,5}", post in "[a-z]{0,5}") {
            let actual = format!("{pre}{s}{post}");
            prop_assert!(ComparisonType::Contains.compare(&s, Some(&actual)));
            prop_assert!(!ComparisonType::DoesNotContain.compare(&s, Some(&actual)));
        }
    }
}
