#![forbid(unsafe_code)]

//! JSON, CSV, and link export.

use serde_json::Value;

use crate::schema::{FormResponse, FormSchema};

/// Pretty-printed JSON for a form definition (2-space indent).
#[must_use]
pub fn form_json(form: &FormSchema) -> String {
    // Serializing a derived struct with string keys cannot fail.
    serde_json::to_string_pretty(form).unwrap_or_default()
}

/// Download name for a form export: whitespace runs become `_`.
#[must_use]
pub fn form_file_name(title: &str) -> String {
    format!("{}.json", underscore_whitespace(title))
}

/// Download name for a response export.
#[must_use]
pub fn responses_file_name(title: Option<&str>) -> String {
    format!("{}_responses.csv", title.unwrap_or("form"))
}

/// Link a respondent can open to fill in the form.
#[must_use]
pub fn share_url(base: &str, form_id: &str) -> String {
    format!("{}/form/{form_id}", base.trim_end_matches('/'))
}

/// Render responses as CSV.
///
/// Columns are `Submitted At`, `Response ID`, then one per field label of
/// `form` (none when the form is unknown). Every value is quoted. Returns an
/// empty string when there are no responses.
#[must_use]
pub fn responses_csv(form: Option<&FormSchema>, responses: &[FormResponse]) -> String {
    if responses.is_empty() {
        return String::new();
    }
    let fields = form.map(|f| f.fields.as_slice()).unwrap_or_default();

    let mut header = vec![
        header_cell("Submitted At"),
        header_cell("Response ID"),
    ];
    header.extend(fields.iter().map(|f| header_cell(&f.label)));

    let mut lines = Vec::with_capacity(responses.len() + 1);
    lines.push(header.join(","));
    for response in responses {
        let mut row = vec![
            quote(&response.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            quote(&response.id),
        ];
        row.extend(
            fields
                .iter()
                .map(|f| quote(&answer_text(response.responses.get(&f.id)))),
        );
        lines.push(row.join(","));
    }
    lines.join("\n")
}

fn underscore_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn answer_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| answer_text(Some(v)))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn header_cell(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        quote(s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Answers, FieldType, FormField};
    use chrono::TimeZone;

    fn response(id: &str, answers: &[(&str, Value)]) -> FormResponse {
        FormResponse {
            id: id.into(),
            form_id: "f".into(),
            responses: answers
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect::<Answers>(),
            submitted_at: chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap(),
            submitter_info: None,
        }
    }

    fn form_with(labels: &[(&str, &str)]) -> FormSchema {
        let mut form = FormSchema::blank();
        for (id, label) in labels {
            let mut field = FormField::from_palette(FieldType::Text, 0);
            field.id = (*id).into();
            field.label = (*label).into();
            form.fields.push(field);
        }
        form
    }

    #[test]
    fn file_names() {
        assert_eq!(form_file_name("Job  Application\tForm"), "Job_Application_Form.json");
        assert_eq!(responses_file_name(Some("Survey")), "Survey_responses.csv");
        assert_eq!(responses_file_name(None), "form_responses.csv");
    }

    #[test]
    fn share_url_strips_trailing_slash() {
        assert_eq!(share_url("https://forms.example/", "abc"), "https://forms.example/form/abc");
        assert_eq!(share_url("http://localhost:3000", "abc"), "http://localhost:3000/form/abc");
    }

    #[test]
    fn form_json_is_pretty() {
        let form = FormSchema::blank();
        let json = form_json(&form);
        assert!(json.starts_with("{\n  \"id\""));
        let back: FormSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, form);
    }

    #[test]
    fn csv_empty_without_responses() {
        assert_eq!(responses_csv(None, &[]), "");
    }

    #[test]
    fn csv_columns_follow_fields() {
        let form = form_with(&[("name", "Name"), ("agree", "Agree")]);
        let responses = vec![
            response("r1", &[("name", Value::from("Ada")), ("agree", Value::Bool(true))]),
            response("r2", &[("name", Value::from("Say \"hi\""))]),
        ];

        let csv = responses_csv(Some(&form), &responses);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Submitted At,Response ID,Name,Agree");
        assert_eq!(lines[1], "\"2024-03-09 14:30:00\",\"r1\",\"Ada\",\"true\"");
        assert_eq!(lines[2], "\"2024-03-09 14:30:00\",\"r2\",\"Say \"\"hi\"\"\",\"\"");
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn csv_without_form_has_fixed_columns() {
        let csv = responses_csv(None, &[response("r1", &[("x", Value::from(1))])]);
        assert_eq!(csv.lines().next(), Some("Submitted At,Response ID"));
    }

    #[test]
    fn csv_quotes_awkward_labels() {
        let form = form_with(&[("a", "City, State")]);
        let csv = responses_csv(Some(&form), &[response("r", &[])]);
        assert!(csv.starts_with("Submitted At,Response ID,\"City, State\"\n"));
    }

    #[test]
    fn csv_joins_multi_select_answers() {
        let form = form_with(&[("tags", "Tags")]);
        let answers = [("tags", serde_json::json!(["red", "blue"]))];
        let csv = responses_csv(Some(&form), &[response("r", &answers)]);
        assert!(csv.ends_with(",\"red; blue\""));
    }
}
