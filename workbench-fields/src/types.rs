//! Core field and entity types for the schema registry.
//!
//! All types serialize to/from YAML via serde. Field definitions describe
//! named, typed attributes of a record. Entity definitions list the fields
//! belonging to a record type and the backend collection it lives in.

use serde::{Deserialize, Serialize};

/// A plain record: field name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A single option in a select field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub order: i32,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, order: i32) -> Self {
        Self {
            value: value.into(),
            label: None,
            color: None,
            order,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Label shown to the user, falling back to the raw value.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

/// The type of a field. Determines the input rendered and the value shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    /// Never echoed back into forms or tables.
    Password,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default)]
        integer: bool,
    },
    /// Calendar date stored as `YYYY-MM-DD`.
    Date,
    /// Wall-clock time stored as `HH:MM`.
    Time,
    Select {
        options: Vec<SelectOption>,
    },
    /// Stores the `$id` of a record in another entity type.
    Reference {
        entity: String,
    },
}

impl FieldType {
    /// Short name used for the HTML `type` attribute and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number { .. } => "number",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Select { .. } => "select",
            FieldType::Reference { .. } => "reference",
        }
    }
}

/// How a field value is displayed in tables and detail views.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    Text,
    Badge,
    Date,
    Number,
    Reference,
}

/// How a field sorts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortKind {
    Alphanumeric,
    OptionOrder,
    Datetime,
    Numeric,
}

/// The complete schema for a single named attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKind>,
    /// Hide the field from the table view. It still appears in forms.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden_in_table: bool,
}

impl FieldDef {
    /// A field with no constraints. Use the `with_*` helpers to refine it.
    pub fn new(name: impl Into<String>, type_: FieldType) -> Self {
        Self {
            name: name.into(),
            label: None,
            type_,
            required: false,
            default: None,
            placeholder: None,
            display: None,
            sort: None,
            hidden_in_table: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_sort(mut self, sort: SortKind) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn hidden_in_table(mut self) -> Self {
        self.hidden_in_table = true;
        self
    }

    /// Label shown to the user. Falls back to a title-cased field name.
    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => humanize(&self.name),
        }
    }

    /// Options for select fields, ordered by their `order` key.
    pub fn options(&self) -> Vec<&SelectOption> {
        match &self.type_ {
            FieldType::Select { options } => {
                let mut sorted: Vec<&SelectOption> = options.iter().collect();
                sorted.sort_by_key(|o| o.order);
                sorted
            }
            _ => Vec::new(),
        }
    }

    /// Infer sort behavior from field type if not explicitly set.
    pub fn effective_sort(&self) -> SortKind {
        if let Some(sort) = self.sort {
            return sort;
        }
        match &self.type_ {
            FieldType::Number { .. } => SortKind::Numeric,
            FieldType::Date | FieldType::Time => SortKind::Datetime,
            FieldType::Select { .. } => SortKind::OptionOrder,
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Password
            | FieldType::Reference { .. } => SortKind::Alphanumeric,
        }
    }

    /// Infer display from field type if not explicitly set.
    pub fn effective_display(&self) -> Display {
        if let Some(display) = self.display {
            return display;
        }
        match &self.type_ {
            FieldType::Number { .. } => Display::Number,
            FieldType::Date => Display::Date,
            FieldType::Select { .. } => Display::Badge,
            FieldType::Reference { .. } => Display::Reference,
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Password
            | FieldType::Time => Display::Text,
        }
    }
}

/// Declares the fields of one record type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityDef {
    /// URL-safe name, e.g. `appointment`.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Backend collection key. Resolved to a collection id by configuration.
    pub collection: String,
    /// Field used as the human-readable title of a record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_field: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            collection: collection.into(),
            title_field: None,
            fields: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_title_field(mut self, name: impl Into<String>) -> Self {
        self.title_field = Some(name.into());
        self
    }

    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => humanize(&self.name),
        }
    }

    /// Human-readable title for a record of this type.
    ///
    /// Uses `title_field`, then the first text field, then the record id.
    pub fn record_title(&self, record: &Record) -> String {
        let candidates = self
            .title_field
            .iter()
            .map(String::as_str)
            .chain(
                self.fields
                    .iter()
                    .filter(|f| matches!(f.type_, FieldType::Text))
                    .map(|f| f.name.as_str()),
            );
        for name in candidates {
            if let Some(s) = record.get(name).and_then(|v| v.as_str()) {
                if !s.is_empty() {
                    return s.to_string();
                }
            }
        }
        record
            .get("$id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

/// `date_of_birth` -> `Date of birth`.
pub fn humanize(name: &str) -> String {
    let spaced = name.replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
