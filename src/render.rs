//! Page rendering seam.
//!
//! Handlers build a [`TemplateData`] and name a page; a [`Renderer`] turns
//! the pair into a response body. [`JsonRenderer`] emits the data as JSON,
//! which is what the test-suite and API clients consume.

use crate::errors::{AppError, AppResult};
use crate::forms::Form;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const TEMPLATES: &[&str] = &[
    "home.page",
    "about.page",
    "contact.page",
    "room.page",
    "search-availability.page",
    "choose-room.page",
    "make-reservation.page",
    "reservation-summary.page",
    "login.page",
    "admin-dashboard.page",
    "admin-new-reservations.page",
    "admin-all-reservations.page",
    "admin-reservations-show.page",
    "admin-reservations-calendar.page",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateData {
    pub string_map: BTreeMap<String, String>,
    pub int_map: BTreeMap<String, i64>,
    pub data: Map<String, Value>,
    pub flash: String,
    pub warning: String,
    pub error: String,
    pub form: Option<Form>,
    pub is_authenticated: bool,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` under `key` in `data`. Values that fail to serialize are
    /// logged and left out.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => {
                self.data.insert(key.to_string(), v);
            }
            Err(e) => tracing::error!(key, error = %e, "cannot serialize template value"),
        }
        self
    }

    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.string_map.insert(key.to_string(), value.into());
        self
    }

    pub fn with_int(mut self, key: &str, value: i64) -> Self {
        self.int_map.insert(key.to_string(), value);
        self
    }

    pub fn with_form(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }
}

pub struct Rendered {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, data: &TemplateData) -> AppResult<Rendered>;
}

#[derive(Serialize)]
struct Page<'a> {
    template: &'a str,
    #[serde(flatten)]
    data: &'a TemplateData,
}

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, template: &str, data: &TemplateData) -> AppResult<Rendered> {
        if !TEMPLATES.contains(&template) {
            return Err(AppError::Render(format!("template {} not found", template)));
        }
        let body = serde_json::to_vec_pretty(&Page { template, data })
            .map_err(|e| AppError::Render(e.to_string()))?;
        Ok(Rendered {
            content_type: "application/json",
            body,
        })
    }
}
