#![forbid(unsafe_code)]

//! Submission checks run before a response is saved.

use std::collections::BTreeMap;

use regex_lite::Regex;
use serde_json::Value;

use crate::schema::{Answers, FieldType, FormField, FormSchema};

/// Error messages keyed by field id. Empty means the submission is valid.
pub type FieldErrors = BTreeMap<String, String>;

/// Validate `answers` against every field of `form`.
///
/// Required fields need a non-blank answer (`null`, `false`, `""` and `[]`
/// count as blank). Text answers are then checked against the field's length
/// bounds, `pattern`, and the email/number format implied by its type. Blank
/// optional answers are never checked further.
#[must_use]
pub fn validate_submission(form: &FormSchema, answers: &Answers) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for field in &form.fields {
        if let Some(message) = check_field(field, answers.get(&field.id)) {
            errors.insert(field.id.clone(), message);
        }
    }
    if !errors.is_empty() {
        tracing::debug!(form_id = %form.id, errors = errors.len(), "submission rejected");
    }
    errors
}

fn check_field(field: &FormField, answer: Option<&Value>) -> Option<String> {
    if is_blank(answer) {
        return field
            .required
            .then(|| format!("{} is required", field.label));
    }
    let Some(Value::String(text)) = answer else {
        return None;
    };

    if let Some(rules) = &field.validation {
        let len = text.chars().count();
        if let Some(min) = rules.min_length
            && len < min
        {
            return Some(format!("{} must be at least {min} characters", field.label));
        }
        if let Some(max) = rules.max_length
            && len > max
        {
            return Some(format!("{} must be at most {max} characters", field.label));
        }
        if let Some(pattern) = &rules.pattern {
            match Regex::new(&format!("^(?:{pattern})$")) {
                Ok(re) if !re.is_match(text) => {
                    return Some(format!("{} is not in the expected format", field.label));
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(field_id = %field.id, pattern = %pattern, error = %err, "ignoring invalid pattern");
                }
            }
        }
    }

    match field.field_type {
        FieldType::Email if !looks_like_email(text) => {
            Some(format!("{} must be a valid email address", field.label))
        }
        FieldType::Number if text.trim().parse::<f64>().is_err() => {
            Some(format!("{} must be a number", field.label))
        }
        _ => None,
    }
}

fn is_blank(answer: Option<&Value>) -> bool {
    match answer {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !s.contains(char::is_whitespace)
}
