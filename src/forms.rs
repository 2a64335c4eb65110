//! Submitted-form validation: presence, minimum length and email shape.

use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$").ok()
});

/// Field name -> messages, in insertion order per field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|msgs| msgs.first())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Posted values plus the errors collected while checking them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Form {
    pub values: HashMap<String, String>,
    pub errors: FormErrors,
}

impl Form {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Record an error for every field that is absent or blank.
    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.errors.add(field, "This field cannot be blank");
            }
        }
    }

    /// Length is counted in characters of the trimmed value, so "Zoë" has
    /// three and "j  " has one.
    pub fn min_length(&mut self, field: &str, length: usize) -> bool {
        if self.get(field).trim().chars().count() < length {
            self.errors.add(
                field,
                format!("This field must be at least {} characters long", length),
            );
            return false;
        }
        true
    }

    pub fn is_email(&mut self, field: &str) {
        let value = self.get(field).trim();
        let ok = EMAIL_RE
            .as_ref()
            .map(|re| re.is_match(value))
            .unwrap_or(false);
        if !ok {
            self.errors.add(field, "Invalid email address");
        }
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}
