#![forbid(unsafe_code)]

//! Starter templates for new forms.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::schema::{
    Document, FieldType, FieldValidation, FormField, FormSchema, FormStep, new_id,
};

/// The parts of a [`FormSchema`] a template defines: everything except the
/// identity and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSchema {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub steps: Vec<FormStep>,
    #[serde(default)]
    pub is_multi_step: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub schema: TemplateSchema,
}

impl FormTemplate {
    /// Build a new form from this template with a fresh id and timestamps.
    #[must_use]
    pub fn instantiate(&self) -> FormSchema {
        let now = Utc::now();
        let schema = self.schema.clone();
        FormSchema {
            id: new_id(),
            title: schema.title,
            description: schema.description,
            fields: schema.fields,
            steps: schema.steps,
            is_multi_step: schema.is_multi_step,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Document for FormTemplate {
    fn id(&self) -> &str {
        &self.id
    }
}

fn field(field_type: FieldType, label: &str, placeholder: Option<&str>, step: usize) -> FormField {
    FormField {
        id: new_id(),
        field_type,
        label: label.to_string(),
        placeholder: placeholder.map(str::to_string),
        required: true,
        help_text: None,
        options: None,
        validation: None,
        step,
    }
}

fn with_options(mut f: FormField, options: &[&str]) -> FormField {
    f.options = Some(options.iter().map(|o| (*o).to_string()).collect());
    f
}

fn with_min_length(mut f: FormField, min: usize) -> FormField {
    f.validation = Some(FieldValidation {
        min_length: Some(min),
        ..FieldValidation::default()
    });
    f
}

/// The templates shipped with the builder.
///
/// Field and step ids are generated on each call.
#[must_use]
pub fn builtin_templates() -> Vec<FormTemplate> {
    vec![
        FormTemplate {
            id: "contact-us".into(),
            name: "Contact Us".into(),
            description: "A simple contact form with name, email, and message fields".into(),
            schema: TemplateSchema {
                title: "Contact Us".into(),
                description: Some("Get in touch with us".into()),
                fields: vec![
                    field(FieldType::Text, "Full Name", Some("Enter your full name"), 0),
                    field(FieldType::Email, "Email Address", Some("Enter your email"), 0),
                    with_min_length(
                        field(FieldType::Textarea, "Message", Some("Enter your message"), 0),
                        10,
                    ),
                ],
                steps: vec![FormStep::new("Contact Information")],
                is_multi_step: false,
            },
        },
        FormTemplate {
            id: "job-application".into(),
            name: "Job Application".into(),
            description: "Multi-step job application form".into(),
            schema: TemplateSchema {
                title: "Job Application".into(),
                description: Some("Apply for a position at our company".into()),
                fields: vec![
                    field(FieldType::Text, "First Name", Some("Enter your first name"), 0),
                    field(FieldType::Text, "Last Name", Some("Enter your last name"), 0),
                    field(FieldType::Email, "Email", Some("Enter your email"), 0),
                    field(FieldType::Phone, "Phone Number", Some("Enter your phone number"), 1),
                    with_options(
                        field(FieldType::Select, "Position Applied For", None, 1),
                        &[
                            "Frontend Developer",
                            "Backend Developer",
                            "Full Stack Developer",
                            "UI/UX Designer",
                        ],
                    ),
                    with_min_length(
                        field(
                            FieldType::Textarea,
                            "Cover Letter",
                            Some("Tell us why you want to work here"),
                            2,
                        ),
                        50,
                    ),
                ],
                steps: vec![
                    FormStep::new("Personal Information"),
                    FormStep::new("Position Details"),
                    FormStep::new("Additional Information"),
                ],
                is_multi_step: true,
            },
        },
        FormTemplate {
            id: "event-registration".into(),
            name: "Event Registration".into(),
            description: "Event registration form with participant details".into(),
            schema: TemplateSchema {
                title: "Event Registration".into(),
                description: Some("Register for our upcoming event".into()),
                fields: vec![
                    field(FieldType::Text, "Full Name", Some("Enter your full name"), 0),
                    field(FieldType::Email, "Email Address", Some("Enter your email"), 0),
                    field(FieldType::Date, "Date of Birth", None, 0),
                    with_options(
                        field(FieldType::Select, "T-Shirt Size", None, 0),
                        &["XS", "S", "M", "L", "XL", "XXL"],
                    ),
                    field(
                        FieldType::Checkbox,
                        "I agree to the terms and conditions",
                        None,
                        0,
                    ),
                ],
                steps: vec![FormStep::new("Registration Details")],
                is_multi_step: false,
            },
        },
    ]
}

/// Look up a built-in template by id.
#[must_use]
pub fn builtin_template(id: &str) -> Option<FormTemplate> {
    builtin_templates().into_iter().find(|t| t.id == id)
}
