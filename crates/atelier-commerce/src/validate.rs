//! Schema validation for marketplace entities.
//!
//! Validation is pure and synchronous; it never touches the store. Every
//! violation is reported as a field-addressed error so callers can surface
//! inline form errors without string matching.

use crate::money::Money;
use std::fmt;

/// A single constraint violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path of the offending field, e.g. `addresses[2].street`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A non-empty list of constraint violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// A single violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }

    /// The individual violations.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Check whether any violation addresses the given field.
    pub fn mentions(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for ValidationErrors {}

/// An entity that can be checked against its schema.
pub trait Validate {
    /// Validate the entity, reporting every violation at once.
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// Collector for constraint violations.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    /// Start a fresh validation pass.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation.
    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Require a non-empty string.
    pub fn require_non_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.error(field, "is required");
        }
    }

    /// Require a plausible email address.
    pub fn require_email(&mut self, field: &str, value: &str) {
        let valid = value.contains('@') && !value.starts_with('@') && !value.ends_with('@');
        if !valid {
            self.error(field, "must be a valid email address");
        }
    }

    /// Require a strictly positive amount.
    pub fn require_positive_amount(&mut self, field: &str, amount: &Money) {
        if !amount.is_positive() {
            self.error(field, "must be positive");
        }
    }

    /// Require a non-negative amount.
    pub fn require_non_negative_amount(&mut self, field: &str, amount: &Money) {
        if amount.is_negative() {
            self.error(field, "cannot be negative");
        }
    }

    /// Require a strictly positive integer.
    pub fn require_positive(&mut self, field: &str, value: i64) {
        if value <= 0 {
            self.error(field, "must be positive");
        }
    }

    /// Require a non-negative integer.
    pub fn require_non_negative(&mut self, field: &str, value: i64) {
        if value < 0 {
            self.error(field, "cannot be negative");
        }
    }

    /// Require an inclusive range.
    pub fn require_range(&mut self, field: &str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.error(field, format!("must be between {min} and {max}"));
        }
    }

    /// Require a minimum collection length.
    pub fn require_min_len<T>(&mut self, field: &str, items: &[T], min: usize) {
        if items.len() < min {
            let noun = if min == 1 { "entry" } else { "entries" };
            self.error(field, format!("must contain at least {min} {noun}"));
        }
    }

    /// Fold a nested entity's violations in under a field prefix.
    pub fn nested(&mut self, prefix: &str, result: Result<(), ValidationErrors>) {
        if let Err(errors) = result {
            for error in errors.0 {
                self.errors.push(FieldError {
                    field: format!("{prefix}.{}", error.field),
                    message: error.message,
                });
            }
        }
    }

    /// Finish the pass: `Ok` when nothing was recorded.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_clean_pass() {
        let mut v = Validator::new();
        v.require_non_empty("name", "Vase");
        v.require_positive_amount("price", &Money::new(100, Currency::USD));
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut v = Validator::new();
        v.require_non_empty("name", "");
        v.require_positive("quantity", 0);
        v.require_range("rating", 9, 1, 5);
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.errors().len(), 3);
        assert!(errors.mentions("name"));
        assert!(errors.mentions("rating"));
    }

    #[test]
    fn test_nested_prefixes_fields() {
        let mut inner = Validator::new();
        inner.require_non_empty("street", "");
        let mut outer = Validator::new();
        outer.nested("addresses[0]", inner.finish());
        let errors = outer.finish().unwrap_err();
        assert!(errors.mentions("addresses[0].street"));
    }

    #[test]
    fn test_email_check() {
        let mut v = Validator::new();
        v.require_email("email", "not-an-email");
        assert!(v.finish().is_err());

        let mut v = Validator::new();
        v.require_email("email", "asha@example.com");
        assert!(v.finish().is_ok());
    }
}
