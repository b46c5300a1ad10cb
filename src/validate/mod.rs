//! Rule-driven field and form validation
//!
//! Checks run in a fixed order (required, bounds, pattern, custom) and
//! stop at the first failure, so each field carries at most one error
//! message at a time.

use ahash::AHashMap;
use regex::Regex;

/// A value as it arrives from a form control
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Missing,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn number(value: f64) -> Self {
        FieldValue::Number(value)
    }

    /// Missing or blank text counts as empty; numbers never do.
    fn is_empty(&self) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Number(_) => false,
        }
    }

    /// Magnitude the min/max bounds apply to: the number itself, or
    /// the character count for text.
    fn magnitude(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => Some(s.chars().count() as f64),
            FieldValue::Missing => None,
        }
    }
}

/// Per-field validation rule
pub struct ValidationRule {
    required: bool,
    min: Option<f64>,
    max: Option<f64>,
    pattern: Option<Regex>,
    custom: Option<Box<dyn Fn(&FieldValue) -> Option<String>>>,
}

impl Default for ValidationRule {
    fn default() -> Self {
        Self {
            required: false,
            min: None,
            max: None,
            pattern: None,
            custom: None,
        }
    }
}

impl ValidationRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Custom predicate returning an error message, or None to pass
    pub fn custom(mut self, check: impl Fn(&FieldValue) -> Option<String> + 'static) -> Self {
        self.custom = Some(Box::new(check));
        self
    }

    /// First failing check's message, or None when the value passes
    fn check(&self, field: &str, value: &FieldValue) -> Option<String> {
        if value.is_empty() {
            if self.required {
                return Some(format!("{field} is required"));
            }
            // Optional and absent: remaining checks are skipped.
            return None;
        }
        if let Some(magnitude) = value.magnitude() {
            if let Some(min) = self.min {
                if magnitude < min {
                    return Some(format!("{field} must be at least {min}"));
                }
            }
            if let Some(max) = self.max {
                if magnitude > max {
                    return Some(format!("{field} must be at most {max}"));
                }
            }
        }
        if let (Some(pattern), FieldValue::Text(text)) = (&self.pattern, value) {
            if !pattern.is_match(text) {
                return Some(format!("{field} has an invalid format"));
            }
        }
        if let Some(custom) = &self.custom {
            if let Some(message) = custom(value) {
                return Some(message);
            }
        }
        None
    }
}

/// Keyed error store: at most one message per field
#[derive(Default)]
pub struct Validator {
    errors: AHashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one field; records or clears its error accordingly.
    pub fn validate_field(&mut self, field: &str, value: &FieldValue, rule: &ValidationRule) -> bool {
        match rule.check(field, value) {
            Some(message) => {
                self.errors.insert(field.to_string(), message);
                false
            }
            None => {
                self.errors.remove(field);
                true
            }
        }
    }

    /// Validate every field named in the rule map; entries without data
    /// validate as missing. True only if every field passes.
    pub fn validate_form(
        &mut self,
        data: &AHashMap<String, FieldValue>,
        rules: &AHashMap<String, ValidationRule>,
    ) -> bool {
        let mut all_valid = true;
        for (field, rule) in rules {
            let value = data.get(field).cloned().unwrap_or(FieldValue::Missing);
            all_valid &= self.validate_field(field, &value, rule);
        }
        all_valid
    }

    /// Clear one field's error, or all errors when no field is given.
    pub fn clear_errors(&mut self, field: Option<&str>) {
        match field {
            Some(field) => {
                self.errors.remove(field);
            }
            None => self.errors.clear(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.insert(field.to_string(), message.into());
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field_rejects_empty() {
        let mut v = Validator::new();
        let rule = ValidationRule::new().required();

        assert!(!v.validate_field("nickname", &FieldValue::Missing, &rule));
        assert_eq!(v.field_error("nickname"), Some("nickname is required"));

        assert!(!v.validate_field("nickname", &FieldValue::text("   "), &rule));
        assert!(v.validate_field("nickname", &FieldValue::text("Alice"), &rule));
        assert!(!v.has_errors());
    }

    #[test]
    fn test_optional_empty_field_short_circuits_to_valid() {
        let mut v = Validator::new();
        // Bounds and pattern would fail, but an optional empty value
        // skips them entirely.
        let rule = ValidationRule::new()
            .min(5.0)
            .pattern(Regex::new("^[a-z]+$").unwrap());
        assert!(v.validate_field("motto", &FieldValue::Missing, &rule));
        assert!(v.validate_field("motto", &FieldValue::text(""), &rule));
        assert!(!v.has_errors());
    }

    #[test]
    fn test_bounds_apply_to_numbers_and_text_length() {
        let mut v = Validator::new();
        let rule = ValidationRule::new().min(3.0).max(8.0);

        assert!(!v.validate_field("age", &FieldValue::number(2.0), &rule));
        assert!(v.validate_field("age", &FieldValue::number(5.0), &rule));

        assert!(!v.validate_field("name", &FieldValue::text("ab"), &rule));
        assert!(!v.validate_field("name", &FieldValue::text("abcdefghi"), &rule));
        assert!(v.validate_field("name", &FieldValue::text("abcd"), &rule));
    }

    #[test]
    fn test_first_failure_wins() {
        let mut v = Validator::new();
        let rule = ValidationRule::new()
            .required()
            .min(10.0)
            .custom(|_| Some("custom should not run".into()));

        assert!(!v.validate_field("field", &FieldValue::text("short"), &rule));
        assert_eq!(v.field_error("field"), Some("field must be at least 10"));
    }

    #[test]
    fn test_custom_predicate_message() {
        let mut v = Validator::new();
        let rule = ValidationRule::new().custom(|value| match value {
            FieldValue::Text(s) if s.contains(' ') => Some("no spaces allowed".into()),
            _ => None,
        });
        assert!(!v.validate_field("nickname", &FieldValue::text("two words"), &rule));
        assert_eq!(v.field_error("nickname"), Some("no spaces allowed"));
        assert!(v.validate_field("nickname", &FieldValue::text("oneword"), &rule));
    }

    #[test]
    fn test_validate_form_covers_rule_map() {
        let mut v = Validator::new();
        let mut rules = AHashMap::new();
        rules.insert("nickname".to_string(), ValidationRule::new().required().min(3.0));
        rules.insert("age".to_string(), ValidationRule::new().min(13.0));

        let mut data = AHashMap::new();
        data.insert("nickname".to_string(), FieldValue::text("Al"));
        // "age" absent entirely: optional, so it passes.
        assert!(!v.validate_form(&data, &rules));
        assert!(v.field_error("nickname").is_some());
        assert!(v.field_error("age").is_none());

        data.insert("nickname".to_string(), FieldValue::text("Alice"));
        assert!(v.validate_form(&data, &rules));
        assert!(!v.has_errors());
    }

    #[test]
    fn test_revalidation_replaces_prior_error() {
        let mut v = Validator::new();
        v.add_error("field", "stale");
        let rule = ValidationRule::new().required();
        assert!(!v.validate_field("field", &FieldValue::Missing, &rule));
        assert_eq!(v.field_error("field"), Some("field is required"));

        v.clear_errors(Some("field"));
        assert!(!v.has_errors());
    }
}
