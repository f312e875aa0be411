#![forbid(unsafe_code)]

//! Form document model.
//!
//! These types are the "document" the editor snapshots into history and the
//! records persisted to storage. The JSON wire format uses camelCase keys so
//! stored data stays readable by the browser builder.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Title given to a freshly created form.
pub const DEFAULT_FORM_TITLE: &str = "New Form";

/// A record that can live in a [`Collection`](crate::Collection).
pub trait Document: Serialize + DeserializeOwned {
    /// Stable identifier used for upserts and lookups.
    fn id(&self) -> &str;
}

/// Generate a fresh random identifier.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Field types
// ---------------------------------------------------------------------------

/// The kinds of input a form field can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Select,
    Checkbox,
    Radio,
    Date,
    Email,
    Phone,
    Number,
}

impl FieldType {
    /// Every field type, in palette order.
    pub const ALL: [FieldType; 9] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Radio,
        FieldType::Date,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Number,
    ];

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Date => "date",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Number => "number",
        }
    }

    /// Label shown for this type in the field palette.
    #[must_use]
    pub const fn palette_label(self) -> &'static str {
        match self {
            Self::Text => "Text Input",
            Self::Textarea => "Textarea",
            Self::Select => "Dropdown",
            Self::Checkbox => "Checkbox",
            Self::Radio => "Radio Button",
            Self::Date => "Date Picker",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Number => "Number",
        }
    }

    /// Whether fields of this type carry a list of choices.
    #[must_use]
    pub const fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown field type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type: {0}")]
pub struct UnknownFieldType(pub String);

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownFieldType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Fields and steps
// ---------------------------------------------------------------------------

/// Optional constraints applied to text answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the whole answer must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    /// Index of the step this field belongs to.
    #[serde(default)]
    pub step: usize,
}

impl FormField {
    /// A field as dropped from the palette onto `step`.
    ///
    /// Choice types start with two placeholder options.
    #[must_use]
    pub fn from_palette(field_type: FieldType, step: usize) -> Self {
        let name = field_type.as_str();
        let mut title = name.to_string();
        if let Some(first) = title.get_mut(..1) {
            first.make_ascii_uppercase();
        }
        Self {
            id: new_id(),
            field_type,
            label: format!("{title} Field"),
            placeholder: Some(format!("Enter {name}")),
            required: false,
            help_text: None,
            options: field_type
                .has_options()
                .then(|| vec!["Option 1".to_string(), "Option 2".to_string()]),
            validation: None,
            step,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormStep {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl FormStep {
    /// An empty step with a fresh id.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            fields: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A complete form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub steps: Vec<FormStep>,
    #[serde(default)]
    pub is_multi_step: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSchema {
    /// The untouched form a new editing session starts from.
    #[must_use]
    pub fn blank() -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: DEFAULT_FORM_TITLE.to_string(),
            description: Some(String::new()),
            fields: Vec::new(),
            steps: vec![FormStep::new("Step 1")],
            is_multi_step: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the user has changed anything worth autosaving.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.fields.is_empty() || self.title != DEFAULT_FORM_TITLE
    }

    #[must_use]
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    #[must_use]
    pub fn field_index(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Fields belonging to step `step`, in document order.
    pub fn fields_in_step(&self, step: usize) -> impl Iterator<Item = &FormField> + '_ {
        self.fields.iter().filter(move |f| f.step == step)
    }

    /// Rebuild each step's field id list from the fields' `step` indices.
    ///
    /// `FormField::step` is authoritative. Fields pointing past the last
    /// step are moved onto it. A form without steps gets a default one.
    pub fn sync_steps(&mut self) {
        if self.steps.is_empty() {
            self.steps.push(FormStep::new("Step 1"));
        }
        let last = self.steps.len() - 1;
        for step in &mut self.steps {
            step.fields.clear();
        }
        for field in &mut self.fields {
            field.step = field.step.min(last);
            self.steps[field.step].fields.push(field.id.clone());
        }
    }
}

impl Document for FormSchema {
    fn id(&self) -> &str {
        &self.id
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Answers keyed by field id.
pub type Answers = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterInfo {
    pub user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// One submission of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormResponse {
    pub id: String,
    pub form_id: String,
    #[serde(default)]
    pub responses: Answers,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter_info: Option<SubmitterInfo>,
}

impl FormResponse {
    /// A submission stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(
        form_id: impl Into<String>,
        responses: Answers,
        submitter_info: Option<SubmitterInfo>,
    ) -> Self {
        Self {
            id: new_id(),
            form_id: form_id.into(),
            responses,
            submitted_at: Utc::now(),
            submitter_info,
        }
    }
}

impl Document for FormResponse {
    fn id(&self) -> &str {
        &self.id
    }
}
