//! Attribute validators run against configuration values during validation.
//!
//! Validators only see known, non-null values; null and unknown values are
//! skipped by the schema before a validator is called.

use crate::types::{AttributePath, Diagnostic, Dynamic};

pub trait Validator: Send + Sync {
    /// Human-readable description
    fn description(&self) -> String;

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>);
}

/// Character length bounds for string values
pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl StringLengthValidator {
    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// No upper bound; `at_least(1)` rejects the empty string
    pub fn at_least(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("length must be between {} and {}", min, max),
            (Some(min), None) => format!("length must be at least {}", min),
            (None, Some(max)) => format!("length must be at most {}", max),
            (None, None) => "any length".to_string(),
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(s) = value.as_string() else {
            return;
        };
        let len = s.chars().count();
        if let Some(min) = self.min {
            if len < min {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have minimum length of {}", path, min),
                        format!("Got length {}", len),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
        if let Some(max) = self.max {
            if len > max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must have maximum length of {}", path, max),
                        format!("Got length {}", len),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// String must be one of a fixed set of values (case sensitive)
pub struct StringInSliceValidator {
    pub values: Vec<String>,
}

impl StringInSliceValidator {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for StringInSliceValidator {
    fn description(&self) -> String {
        format!("one of [{}]", self.values.join(", "))
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            if !self.values.iter().any(|v| v == s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be {}", path, self.description()),
                        format!("Got '{}'", s),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl NumberRangeValidator {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("value must be between {} and {}", min, max),
            (Some(min), None) => format!("value must be at least {}", min),
            (None, Some(max)) => format!("value must be at most {}", max),
            (None, None) => "any value".to_string(),
        }
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let Some(n) = value.as_number() else {
            return;
        };
        if let Some(min) = self.min {
            if n < min {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be at least {}", path, min),
                        format!("Got {}", n),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
        if let Some(max) = self.max {
            if n > max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} must be at most {}", path, max),
                        format!("Got {}", n),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}

/// String must compile as a regular expression
pub struct RegexIsValidValidator;

impl Validator for RegexIsValidValidator {
    fn description(&self) -> String {
        "value must be a valid regular expression".to_string()
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if let Some(s) = value.as_string() {
            if let Err(e) = regex::Regex::new(s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("{} is not a valid regular expression", path),
                        e.to_string(),
                    )
                    .with_attribute(path.clone()),
                );
            }
        }
    }
}
