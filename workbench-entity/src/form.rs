//! Editable forms driven by an entity definition.
//!
//! Rendering produces one input per declared field. Submission collects the
//! posted `name=value` pairs into a [`Record`], applies the same checks the
//! browser applies to the rendered inputs, and hands the record to a
//! caller-supplied async handler.

use std::collections::HashMap;
use std::future::Future;

use serde::Serialize;
use serde_json::{Number, Value};
use tracing::debug;
use workbench_fields::{
    is_blank, validate_record, EntityDef, FieldDef, FieldType, Record, ValidationErrors,
};

use crate::error::{Result, SubmitError};
use crate::render::Renderer;

/// One choice for a reference field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceOption {
    pub id: String,
    pub label: String,
}

impl ReferenceOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// A form for creating or editing one record.
#[derive(Debug, Clone)]
pub struct EntityForm<'a> {
    entity: &'a EntityDef,
    initial: Option<Record>,
    reference_options: HashMap<String, Vec<ReferenceOption>>,
    errors: ValidationErrors,
    action: String,
    submit_label: String,
    cancel_href: Option<String>,
}

impl<'a> EntityForm<'a> {
    /// An empty form. Field defaults fill the inputs.
    pub fn new(entity: &'a EntityDef) -> Self {
        Self {
            entity,
            initial: None,
            reference_options: HashMap::new(),
            errors: ValidationErrors::new(),
            action: String::new(),
            submit_label: "Save".into(),
            cancel_href: None,
        }
    }

    /// Pre-fill inputs from an existing record. Defaults are not applied.
    pub fn with_initial(mut self, record: Record) -> Self {
        self.initial = Some(record);
        self
    }

    /// Choices for reference fields pointing at `entity`.
    pub fn with_reference_options(
        mut self,
        entity: impl Into<String>,
        options: Vec<ReferenceOption>,
    ) -> Self {
        self.reference_options.insert(entity.into(), options);
        self
    }

    /// Per-field messages shown next to the inputs.
    pub fn with_errors(mut self, errors: ValidationErrors) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    pub fn with_cancel_href(mut self, href: impl Into<String>) -> Self {
        self.cancel_href = Some(href.into());
        self
    }

    pub fn entity(&self) -> &EntityDef {
        self.entity
    }

    /// Render the form as HTML.
    pub fn render(&self, renderer: &Renderer) -> Result<String> {
        renderer.render("form", &self.view())
    }

    /// Build the view model handed to the template.
    fn view(&self) -> FormView {
        let fields = self
            .entity
            .fields
            .iter()
            .map(|field| self.field_view(field))
            .collect();
        FormView {
            action: self.action.clone(),
            submit_label: self.submit_label.clone(),
            cancel_href: self.cancel_href.clone(),
            fields,
        }
    }

    fn field_view(&self, field: &FieldDef) -> FormFieldView {
        let value = match &self.initial {
            Some(record) => record.get(&field.name).map(input_value).unwrap_or_default(),
            None => field.default.clone().unwrap_or_default(),
        };
        let value = if matches!(field.type_, FieldType::Password) {
            String::new()
        } else {
            value
        };

        let (kind, input_type) = match &field.type_ {
            FieldType::Select { .. } | FieldType::Reference { .. } => ("select", ""),
            FieldType::Textarea => ("textarea", ""),
            other => ("input", other.kind()),
        };

        let options = match &field.type_ {
            FieldType::Select { .. } => field
                .options()
                .into_iter()
                .map(|o| OptionView {
                    selected: o.value == value,
                    value: o.value.clone(),
                    label: o.display_label().to_string(),
                })
                .collect(),
            FieldType::Reference { entity } => self
                .reference_options
                .get(entity)
                .map(|opts| {
                    opts.iter()
                        .map(|o| OptionView {
                            selected: o.id == value,
                            value: o.id.clone(),
                            label: o.label.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        let (min, max, step) = match &field.type_ {
            FieldType::Number { min, max, integer } => (
                min.map(format_number),
                max.map(format_number),
                Some(if *integer { "1" } else { "any" }.to_string()),
            ),
            _ => (None, None, None),
        };

        FormFieldView {
            name: field.name.clone(),
            label: field.display_label(),
            kind,
            input_type,
            value,
            required: field.required,
            min,
            max,
            step,
            placeholder: field.placeholder.clone(),
            options,
            error: self.errors.for_field(&field.name).map(str::to_string),
        }
    }

    /// Collect submitted pairs into a record and validate it.
    ///
    /// Only declared fields are kept. Blank optional fields become `null`.
    /// Number fields are stored as JSON numbers.
    pub fn collect(&self, pairs: &[(String, String)]) -> std::result::Result<Record, ValidationErrors> {
        let submitted = pairs_to_record(pairs);
        let mut record = Record::new();
        for field in &self.entity.fields {
            let raw = submitted.get(&field.name);
            if is_blank(raw) {
                record.insert(field.name.clone(), Value::Null);
                continue;
            }
            let Some(Value::String(raw)) = raw else {
                continue;
            };
            let value = match &field.type_ {
                FieldType::Number { integer, .. } => coerce_number(raw, *integer),
                FieldType::Password | FieldType::Textarea => Value::String(raw.clone()),
                _ => Value::String(raw.trim().to_string()),
            };
            record.insert(field.name.clone(), value);
        }
        validate_record(self.entity, &record)?;
        Ok(record)
    }

    /// Collect, validate, then await `handler` with the record.
    ///
    /// The handler is not called when validation fails.
    pub async fn submit<F, Fut, T, E>(
        &self,
        pairs: &[(String, String)],
        handler: F,
    ) -> std::result::Result<T, SubmitError<E>>
    where
        F: FnOnce(Record) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let record = match self.collect(pairs) {
            Ok(record) => record,
            Err(errors) => {
                debug!(entity = %self.entity.name, errors = errors.len(), "form rejected");
                return Err(SubmitError::Invalid(errors));
            }
        };
        handler(record).await.map_err(SubmitError::Handler)
    }
}

/// Submitted pairs as a record of strings. Later duplicates win.
pub fn pairs_to_record(pairs: &[(String, String)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// String shown inside an input for a stored value.
pub fn input_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// `16.0` -> `16`, `12.5` -> `12.5`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parse a number for storage, leaving unparseable input as a string so
/// validation can report it.
///
/// Integer fields store whole values as JSON integers even when typed as
/// `2.0` or `1e3`.
fn coerce_number(raw: &str, integer: bool) -> Value {
    let trimmed = raw.trim();
    let parsed = trimmed.parse::<f64>().ok();
    if integer {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Number(i.into());
        }
        if let Some(whole) = parsed.and_then(whole_i64) {
            return Value::Number(whole.into());
        }
    }
    match parsed.and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(trimmed.to_string()),
    }
}

fn whole_i64(n: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range.
    (n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
}

#[derive(Debug, Serialize)]
struct FormView {
    action: String,
    submit_label: String,
    cancel_href: Option<String>,
    fields: Vec<FormFieldView>,
}

#[derive(Debug, Serialize)]
struct FormFieldView {
    name: String,
    label: String,
    kind: &'static str,
    input_type: &'static str,
    value: String,
    required: bool,
    min: Option<String>,
    max: Option<String>,
    step: Option<String>,
    placeholder: Option<String>,
    options: Vec<OptionView>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct OptionView {
    value: String,
    label: String,
    selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use workbench_fields::SelectOption;

    fn match_entity() -> EntityDef {
        EntityDef::new("match", "matches")
            .field(
                FieldDef::new(
                    "team_a",
                    FieldType::Reference {
                        entity: "team".into(),
                    },
                )
                .required()
                .with_label("Team A"),
            )
            .field(FieldDef::new("scheduled_date", FieldType::Date).required())
            .field(FieldDef::new(
                "score_a",
                FieldType::Number {
                    min: Some(0.0),
                    max: None,
                    integer: true,
                },
            ))
            .field(
                FieldDef::new(
                    "status",
                    FieldType::Select {
                        options: vec![
                            SelectOption::new("scheduled", 0).with_label("Scheduled"),
                            SelectOption::new("live", 1).with_label("Live"),
                        ],
                    },
                )
                .with_default("scheduled"),
            )
            .field(FieldDef::new("notes", FieldType::Textarea))
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_one_input_per_field() {
        let entity = match_entity();
        let renderer = Renderer::new().unwrap();
        let html = EntityForm::new(&entity)
            .with_action("/esports/match")
            .with_reference_options(
                "team",
                vec![
                    ReferenceOption::new("t1", "Cloud Nine"),
                    ReferenceOption::new("t2", "Fnatic"),
                ],
            )
            .render(&renderer)
            .unwrap();

        assert!(html.contains(r#"action="/esports/match""#));
        assert!(!html.contains("novalidate"));
        assert!(html.contains(r#"<select id="f-team_a" name="team_a" required>"#));
        assert!(html.contains(r#"<option value="t2">Fnatic</option>"#));
        assert!(html.contains(
            r#"<input type="date" id="f-scheduled_date" name="scheduled_date" value="" required>"#
        ));
        assert!(html.contains(
            r#"<input type="number" id="f-score_a" name="score_a" value="" min="0" step="1">"#
        ));
        assert!(html.contains(r#"<option value="scheduled" selected>Scheduled</option>"#));
        assert!(html.contains(r#"<textarea id="f-notes" name="notes" rows="4">"#));
        assert!(html.contains("Team A *"));
    }

    #[test]
    fn initial_values_fill_inputs() {
        let entity = match_entity();
        let renderer = Renderer::new().unwrap();
        let initial = json!({
            "team_a": "t1",
            "scheduled_date": "2024-05-01",
            "score_a": 2,
            "status": "live",
            "notes": "<b>final</b>"
        });
        let html = EntityForm::new(&entity)
            .with_initial(initial.as_object().unwrap().clone())
            .with_reference_options("team", vec![ReferenceOption::new("t1", "Cloud Nine")])
            .render(&renderer)
            .unwrap();
        assert!(html.contains(r#"<option value="t1" selected>Cloud Nine</option>"#));
        assert!(html.contains(r#"value="2024-05-01""#));
        assert!(html.contains(r#"value="2""#));
        assert!(html.contains(r#"<option value="live" selected>Live</option>"#));
        assert!(html.contains("&lt;b&gt;final&lt;/b&gt;"));
    }

    #[test]
    fn errors_render_next_to_fields() {
        let entity = match_entity();
        let renderer = Renderer::new().unwrap();
        let mut errors = ValidationErrors::new();
        errors.push("scheduled_date", "is required");
        let html = EntityForm::new(&entity)
            .with_errors(errors)
            .render(&renderer)
            .unwrap();
        assert!(html.contains(r#"<div class="field has-error">"#));
        assert!(html.contains(r#"<p class="error">is required</p>"#));
    }

    #[test]
    fn collect_coerces_and_nulls() {
        let entity = match_entity();
        let form = EntityForm::new(&entity);
        let record = form
            .collect(&pairs(&[
                ("team_a", "t1"),
                ("scheduled_date", " 2024-05-01 "),
                ("score_a", "3"),
                ("status", ""),
                ("notes", "  keep spacing "),
                ("hacker", "ignored"),
            ]))
            .unwrap();
        assert_eq!(record["team_a"], json!("t1"));
        assert_eq!(record["scheduled_date"], json!("2024-05-01"));
        assert_eq!(record["score_a"], json!(3));
        assert_eq!(record["status"], Value::Null);
        assert_eq!(record["notes"], json!("  keep spacing "));
        assert!(!record.contains_key("hacker"));
    }

    #[test]
    fn collect_stores_whole_numbers_as_integers() {
        let entity = match_entity();
        let form = EntityForm::new(&entity);
        for raw in ["2.0", "2e0", " 2 "] {
            let record = form
                .collect(&pairs(&[
                    ("team_a", "t1"),
                    ("scheduled_date", "2024-05-01"),
                    ("score_a", raw),
                ]))
                .unwrap();
            assert!(record["score_a"].is_i64(), "{raw} stored as {}", record["score_a"]);
            let score: Option<i64> = serde_json::from_value(record["score_a"].clone()).unwrap();
            assert_eq!(score, Some(2));
        }

        let errors = form
            .collect(&pairs(&[
                ("team_a", "t1"),
                ("scheduled_date", "2024-05-01"),
                ("score_a", "2.5"),
            ]))
            .unwrap_err();
        assert_eq!(errors.for_field("score_a"), Some("must be a whole number"));
    }

    #[test]
    fn collect_reports_violations() {
        let entity = match_entity();
        let form = EntityForm::new(&entity);
        let errors = form
            .collect(&pairs(&[("score_a", "lots"), ("status", "paused")]))
            .unwrap_err();
        assert_eq!(errors.for_field("team_a"), Some("is required"));
        assert_eq!(errors.for_field("scheduled_date"), Some("is required"));
        assert_eq!(errors.for_field("score_a"), Some("must be a number"));
        assert!(errors.for_field("status").is_some());
    }

    #[tokio::test]
    async fn submit_calls_handler_with_record() {
        let entity = match_entity();
        let form = EntityForm::new(&entity);
        let result: std::result::Result<String, SubmitError<String>> = form
            .submit(
                &pairs(&[("team_a", "t9"), ("scheduled_date", "2024-05-01")]),
                |record| async move {
                    Ok(record["team_a"].as_str().unwrap_or_default().to_string())
                },
            )
            .await;
        assert_eq!(result.unwrap(), "t9");
    }

    #[tokio::test]
    async fn submit_skips_handler_when_invalid() {
        let entity = match_entity();
        let form = EntityForm::new(&entity);
        let mut called = false;
        let result: std::result::Result<(), SubmitError<String>> = form
            .submit(&pairs(&[]), |_record| {
                called = true;
                async { Ok(()) }
            })
            .await;
        assert!(matches!(result, Err(SubmitError::Invalid(_))));
        assert!(!called);
    }

    #[tokio::test]
    async fn submit_propagates_handler_error() {
        let entity = match_entity();
        let form = EntityForm::new(&entity);
        let result: std::result::Result<(), SubmitError<String>> = form
            .submit(
                &pairs(&[("team_a", "t1"), ("scheduled_date", "2024-05-01")]),
                |_record| async { Err("backend down".to_string()) },
            )
            .await;
        match result {
            Err(SubmitError::Handler(message)) => assert_eq!(message, "backend down"),
            other => panic!("expected handler error, got {other:?}"),
        }
    }

    #[test]
    fn password_never_echoed() {
        let entity = EntityDef::new("login", "sessions")
            .field(FieldDef::new("password", FieldType::Password).required());
        let renderer = Renderer::new().unwrap();
        let html = EntityForm::new(&entity)
            .with_initial(json!({"password": "hunter2"}).as_object().unwrap().clone())
            .render(&renderer)
            .unwrap();
        assert!(!html.contains("hunter2"));
        assert!(html.contains(r#"type="password""#));
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(16.0), "16");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(input_value(&json!(1500.0)), "1500");
        assert_eq!(input_value(&json!(7)), "7");
        assert_eq!(input_value(&Value::Null), "");
    }
}
