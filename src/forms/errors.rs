//! Server-reported validation errors and their per-field breakdown

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name the server uses for errors not tied to one field
pub const NON_FIELD_ERRORS_KEY: &str = "__all__";

/// Message shown when a submission never reached a verdict
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unfortunately, a network error occurred. Please try again later.";

/// One message with an optional machine-readable code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedMessage {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Validation failure for one field as sent by the server.
///
/// `field` is a plain field name, `__all__`, or a formset path of the form
/// `formsetName.index.fieldName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    #[serde(default)]
    pub extended_messages: Vec<ExtendedMessage>,
    /// Older servers send bare strings instead of extended messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            extended_messages: vec![ExtendedMessage {
                message: message.into(),
                code: None,
            }],
            messages: Vec::new(),
        }
    }

    /// Message texts, preferring extended messages
    pub fn message_texts(&self) -> Vec<String> {
        if self.extended_messages.is_empty() {
            self.messages.clone()
        } else {
            self.extended_messages
                .iter()
                .map(|m| m.message.clone())
                .collect()
        }
    }
}

/// Where a server-side field name points
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldPath<'a> {
    NonField,
    Field(&'a str),
    Formset {
        name: &'a str,
        index: usize,
        field: &'a str,
    },
}

fn parse_field_path(field: &str) -> FieldPath<'_> {
    if field == NON_FIELD_ERRORS_KEY {
        return FieldPath::NonField;
    }
    let mut parts = field.splitn(3, '.');
    if let (Some(name), Some(index), Some(rest)) = (parts.next(), parts.next(), parts.next()) {
        if let Ok(index) = index.parse::<usize>() {
            return FieldPath::Formset {
                name,
                index,
                field: rest,
            };
        }
    }
    FieldPath::Field(field)
}

/// Errors organized for display next to a form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    non_field_errors: Vec<String>,
    field_errors: BTreeMap<String, Vec<String>>,
    formset_errors: BTreeMap<String, BTreeMap<usize, FormErrors>>,
}

impl FormErrors {
    /// Sort server errors into non-field, field, and formset buckets
    pub fn from_field_errors(errors: &[FieldError]) -> Self {
        let mut result = FormErrors::default();
        for error in errors {
            result.add(&error.field, error.message_texts());
        }
        result
    }

    /// A single page-level error for transport failures
    pub fn network_error() -> Self {
        Self {
            non_field_errors: vec![NETWORK_ERROR_MESSAGE.to_string()],
            ..Default::default()
        }
    }

    fn add(&mut self, field: &str, messages: Vec<String>) {
        match parse_field_path(field) {
            FieldPath::NonField => self.non_field_errors.extend(messages),
            FieldPath::Field(name) => self
                .field_errors
                .entry(name.to_string())
                .or_default()
                .extend(messages),
            FieldPath::Formset { name, index, field } => self
                .formset_errors
                .entry(name.to_string())
                .or_default()
                .entry(index)
                .or_default()
                .add(field, messages),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.non_field_errors.is_empty()
            && self.field_errors.is_empty()
            && self.formset_errors.is_empty()
    }

    /// Errors shown as a page-level banner
    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }

    /// Errors shown next to a field; empty when the field is valid
    pub fn field_errors(&self, field: &str) -> &[String] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Names of fields carrying errors
    pub fn fields_with_errors(&self) -> impl Iterator<Item = &str> {
        self.field_errors.keys().map(String::as_str)
    }

    /// Errors for one row of a formset
    pub fn formset_errors(&self, formset: &str, index: usize) -> Option<&FormErrors> {
        self.formset_errors.get(formset)?.get(&index)
    }
}
