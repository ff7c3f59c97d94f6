//! Sortable list views with per-row actions.
//!
//! Columns are usually derived from an entity definition with
//! [`columns_for`], but any key of the row records can be shown, and any
//! column can carry a custom cell renderer.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use workbench_fields::{parse_date, Display, EntityDef, FieldDef, Record, SortKind};

use crate::error::Result;
use crate::form::input_value;
use crate::render::{escape, escape_js, Renderer};

static NULL: Value = Value::Null;

/// Custom cell renderer: `(cell value, whole row) -> HTML`.
pub type CellRenderer = Arc<dyn Fn(&Value, &Record) -> String + Send + Sync>;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// The active sort: which column and which way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortState {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Clicking a header: the same key flips direction, a new key starts ascending.
    pub fn toggle(&mut self, key: &str) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key.to_string();
            self.direction = SortDirection::Asc;
        }
    }

    /// The state a click on `key` would produce, starting from `current`.
    pub fn toggled(current: Option<&SortState>, key: &str) -> SortState {
        match current {
            Some(state) => {
                let mut next = state.clone();
                next.toggle(key);
                next
            }
            None => SortState::asc(key),
        }
    }
}

/// One column of the table.
#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub sort_kind: SortKind,
    renderer: Option<CellRenderer>,
    option_order: HashMap<String, i32>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("sort_kind", &self.sort_kind)
            .field("custom_renderer", &self.renderer.is_some())
            .finish()
    }
}

impl Column {
    /// A plain, sortable text column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            sort_kind: SortKind::Alphanumeric,
            renderer: None,
            option_order: HashMap::new(),
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_sort_kind(mut self, kind: SortKind) -> Self {
        self.sort_kind = kind;
        self
    }

    /// Replace the default cell rendering.
    pub fn with_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&Value, &Record) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Derive a column from a field definition.
    ///
    /// Select fields render as colored badges and sort by option order;
    /// dates render as `Mar 1, 2024`.
    pub fn from_field(field: &FieldDef) -> Self {
        let mut column = Column::new(field.name.clone(), field.display_label())
            .with_sort_kind(field.effective_sort());
        match field.effective_display() {
            Display::Badge => {
                let badges: HashMap<String, (String, Option<String>)> = field
                    .options()
                    .into_iter()
                    .map(|o| {
                        (
                            o.value.clone(),
                            (o.display_label().to_string(), o.color.clone()),
                        )
                    })
                    .collect();
                column.option_order = field
                    .options()
                    .into_iter()
                    .map(|o| (o.value.clone(), o.order))
                    .collect();
                column = column.with_renderer(move |value, _| {
                    let raw = input_value(value);
                    if raw.is_empty() {
                        return String::new();
                    }
                    let (label, color) = badges
                        .get(&raw)
                        .map(|(l, c)| (l.clone(), c.clone()))
                        .unwrap_or_else(|| (raw.clone(), None));
                    let color = color.unwrap_or_else(|| "gray".into());
                    format!(
                        r#"<span class="badge badge-{}">{}</span>"#,
                        escape(&color),
                        escape(&label)
                    )
                });
            }
            Display::Date => {
                column = column.with_renderer(|value, _| {
                    let raw = input_value(value);
                    match parse_date(&raw) {
                        Some(date) => date.format("%b %-d, %Y").to_string(),
                        None => escape(&raw),
                    }
                });
            }
            Display::Text | Display::Number | Display::Reference => {}
        }
        column
    }

    /// Reference column showing the referenced record's title.
    ///
    /// `names` maps referenced ids to titles; unknown ids show the raw id.
    pub fn reference(field: &FieldDef, names: HashMap<String, String>) -> Self {
        Column::from_field(field).with_renderer(move |value, _| {
            let id = input_value(value);
            escape(names.get(&id).map(String::as_str).unwrap_or(&id))
        })
    }

    /// Render one cell.
    pub fn render_cell(&self, row: &Record) -> String {
        let value = row.get(&self.key).unwrap_or(&NULL);
        match &self.renderer {
            Some(render) => render(value, row),
            None => escape(&input_value(value)),
        }
    }

    /// Compare two rows by this column. Missing values always sort last.
    fn compare(&self, a: &Record, b: &Record, direction: SortDirection) -> Ordering {
        let va = a.get(&self.key).filter(|v| !is_missing(v));
        let vb = b.get(&self.key).filter(|v| !is_missing(v));
        let ordering = match (va, vb) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(a), Some(b)) => self.compare_values(a, b),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    fn compare_values(&self, a: &Value, b: &Value) -> Ordering {
        match self.sort_kind {
            SortKind::Numeric => {
                let na = as_f64(a).unwrap_or(f64::INFINITY);
                let nb = as_f64(b).unwrap_or(f64::INFINITY);
                na.partial_cmp(&nb).unwrap_or(Ordering::Equal)
            }
            SortKind::OptionOrder => {
                let oa = self.option_order.get(&input_value(a)).copied().unwrap_or(i32::MAX);
                let ob = self.option_order.get(&input_value(b)).copied().unwrap_or(i32::MAX);
                oa.cmp(&ob)
            }
            // ISO dates, `HH:MM` times and RFC 3339 timestamps order lexically.
            SortKind::Datetime => input_value(a).cmp(&input_value(b)),
            SortKind::Alphanumeric => input_value(a)
                .to_lowercase()
                .cmp(&input_value(b).to_lowercase()),
        }
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The schema-derived column set: every field not hidden from tables.
pub fn columns_for(entity: &EntityDef) -> Vec<Column> {
    entity
        .fields
        .iter()
        .filter(|f| !f.hidden_in_table)
        .filter(|f| !matches!(f.type_, workbench_fields::FieldType::Password))
        .map(Column::from_field)
        .collect()
}

/// Per-row actions, expressed as links under a base path.
///
/// With base `/clinic/doctor`, a row with id `d1` links to
/// `/clinic/doctor/d1` (view), `/clinic/doctor/d1/edit` (edit) and posts to
/// `/clinic/doctor/d1/delete` (delete, behind a confirmation dialog).
#[derive(Debug, Clone)]
pub struct RowActions {
    pub base_href: String,
    pub view: bool,
    pub edit: bool,
    pub delete: bool,
    pub confirm_message: String,
}

impl RowActions {
    pub fn all(base_href: impl Into<String>) -> Self {
        Self {
            base_href: base_href.into(),
            view: true,
            edit: true,
            delete: true,
            confirm_message: "Are you sure you want to delete this record?".into(),
        }
    }

    pub fn with_confirm_message(mut self, message: impl Into<String>) -> Self {
        self.confirm_message = message.into();
        self
    }

    fn href(&self, id: &str, suffix: &str) -> String {
        format!("{}/{}{}", self.base_href, urlencoding::encode(id), suffix)
    }
}

/// A table over a set of rows.
#[derive(Debug, Clone)]
pub struct EntityTable {
    columns: Vec<Column>,
    rows: Vec<Record>,
    sort: Option<SortState>,
    actions: Option<RowActions>,
    sort_href_base: Option<String>,
    empty_message: String,
}

impl EntityTable {
    pub fn new(columns: Vec<Column>, rows: Vec<Record>) -> Self {
        Self {
            columns,
            rows,
            sort: None,
            actions: None,
            sort_href_base: None,
            empty_message: "No records found.".into(),
        }
    }

    /// Apply a sort. Ignored if the key is not a sortable column.
    pub fn with_sort(mut self, sort: Option<SortState>) -> Self {
        self.sort = sort.filter(|s| {
            self.columns
                .iter()
                .any(|c| c.key == s.key && c.sortable)
        });
        self
    }

    pub fn with_actions(mut self, actions: RowActions) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Make sortable headers link to `<base>?sort=<key>&dir=<dir>`.
    pub fn with_sort_links(mut self, base: impl Into<String>) -> Self {
        self.sort_href_base = Some(base.into());
        self
    }

    pub fn with_empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Rows in display order. Sorting is stable.
    pub fn sorted_rows(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.rows.iter().collect();
        if let Some(sort) = &self.sort {
            if let Some(column) = self.columns.iter().find(|c| c.key == sort.key) {
                rows.sort_by(|a, b| column.compare(a, b, sort.direction));
            }
        }
        rows
    }

    /// Render the table as HTML.
    pub fn render(&self, renderer: &Renderer) -> Result<String> {
        renderer.render("table", &self.view())
    }

    fn view(&self) -> TableView {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let active = self.sort.as_ref().filter(|s| s.key == column.key);
                let indicator = active.map(|s| match s.direction {
                    SortDirection::Asc => "▲",
                    SortDirection::Desc => "▼",
                });
                let sort_href = match (&self.sort_href_base, column.sortable) {
                    (Some(base), true) => {
                        let next = SortState::toggled(self.sort.as_ref(), &column.key);
                        Some(format!(
                            "{}?sort={}&dir={}",
                            base,
                            urlencoding::encode(&next.key),
                            next.direction.as_str()
                        ))
                    }
                    _ => None,
                };
                ColumnView {
                    label: column.label.clone(),
                    sort_href,
                    indicator,
                }
            })
            .collect();

        let rows: Vec<RowView> = self
            .sorted_rows()
            .into_iter()
            .map(|row| {
                let id = row
                    .get("$id")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                let cells = self.columns.iter().map(|c| c.render_cell(row)).collect();
                let (view_href, edit_href, delete_href) = match &self.actions {
                    Some(actions) if !id.is_empty() => (
                        actions.view.then(|| actions.href(&id, "")),
                        actions.edit.then(|| actions.href(&id, "/edit")),
                        actions.delete.then(|| actions.href(&id, "/delete")),
                    ),
                    _ => (None, None, None),
                };
                RowView {
                    id,
                    cells,
                    view_href,
                    edit_href,
                    delete_href,
                }
            })
            .collect();

        let has_actions = self.actions.is_some();
        TableView {
            colspan: self.columns.len() + usize::from(has_actions),
            row_count: rows.len(),
            columns,
            rows,
            has_actions,
            confirm_js: self
                .actions
                .as_ref()
                .map(|a| escape_js(&a.confirm_message))
                .unwrap_or_default(),
            no_rows_text: self.empty_message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TableView {
    columns: Vec<ColumnView>,
    rows: Vec<RowView>,
    row_count: usize,
    colspan: usize,
    has_actions: bool,
    confirm_js: String,
    no_rows_text: String,
}

#[derive(Debug, Serialize)]
struct ColumnView {
    label: String,
    sort_href: Option<String>,
    indicator: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct RowView {
    id: String,
    cells: Vec<String>,
    view_href: Option<String>,
    edit_href: Option<String>,
    delete_href: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use workbench_fields::{FieldType, SelectOption};

    fn tournament() -> EntityDef {
        EntityDef::new("tournament", "tournaments")
            .field(FieldDef::new("name", FieldType::Text).required())
            .field(FieldDef::new(
                "prize_pool",
                FieldType::Number {
                    min: Some(0.0),
                    max: None,
                    integer: false,
                },
            ))
            .field(FieldDef::new("start_date", FieldType::Date))
            .field(FieldDef::new(
                "status",
                FieldType::Select {
                    options: vec![
                        SelectOption::new("upcoming", 0).with_color("blue"),
                        SelectOption::new("ongoing", 1).with_color("green"),
                        SelectOption::new("completed", 2),
                    ],
                },
            ))
            .field(FieldDef::new("description", FieldType::Textarea).hidden_in_table())
    }

    fn rows() -> Vec<Record> {
        vec![
            json!({"$id": "a", "name": "spring cup", "prize_pool": 500, "start_date": "2024-04-01", "status": "completed"}),
            json!({"$id": "b", "name": "Autumn Open", "prize_pool": 10000, "start_date": "2024-09-15", "status": "upcoming"}),
            json!({"$id": "c", "name": "Winter Major", "prize_pool": "", "status": "ongoing"}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    fn ids(table: &EntityTable) -> Vec<String> {
        table
            .sorted_rows()
            .iter()
            .map(|r| r["$id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn toggle_flips_same_key_and_resets_new_key() {
        let mut state = SortState::asc("name");
        state.toggle("name");
        assert_eq!(state.direction, SortDirection::Desc);
        state.toggle("name");
        assert_eq!(state.direction, SortDirection::Asc);
        state.toggle("name");
        state.toggle("date");
        assert_eq!(state, SortState::asc("date"));
        assert_eq!(SortState::toggled(None, "name"), SortState::asc("name"));
    }

    #[test]
    fn columns_skip_hidden_fields() {
        let columns = columns_for(&tournament());
        let keys: Vec<&str> = columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "prize_pool", "start_date", "status"]);
        assert_eq!(columns[1].sort_kind, SortKind::Numeric);
        assert_eq!(columns[3].sort_kind, SortKind::OptionOrder);
    }

    #[test]
    fn unsorted_keeps_input_order() {
        let table = EntityTable::new(columns_for(&tournament()), rows());
        assert_eq!(ids(&table), vec!["a", "b", "c"]);
    }

    #[test]
    fn alphanumeric_sort_is_case_insensitive() {
        let table = EntityTable::new(columns_for(&tournament()), rows())
            .with_sort(Some(SortState::asc("name")));
        assert_eq!(ids(&table), vec!["b", "a", "c"]);
    }

    #[test]
    fn numeric_sort_puts_missing_last_both_ways() {
        let asc = EntityTable::new(columns_for(&tournament()), rows())
            .with_sort(Some(SortState::asc("prize_pool")));
        assert_eq!(ids(&asc), vec!["a", "b", "c"]);

        let desc = EntityTable::new(columns_for(&tournament()), rows()).with_sort(Some(
            SortState {
                key: "prize_pool".into(),
                direction: SortDirection::Desc,
            },
        ));
        assert_eq!(ids(&desc), vec!["b", "a", "c"]);
    }

    #[test]
    fn option_order_sort() {
        let table = EntityTable::new(columns_for(&tournament()), rows())
            .with_sort(Some(SortState::asc("status")));
        assert_eq!(ids(&table), vec!["b", "c", "a"]);
    }

    #[test]
    fn unknown_sort_key_ignored() {
        let table = EntityTable::new(columns_for(&tournament()), rows())
            .with_sort(Some(SortState::asc("description")));
        assert!(table.sort().is_none());
        assert_eq!(ids(&table), vec!["a", "b", "c"]);
    }

    #[test]
    fn default_cell_renderers() {
        let columns = columns_for(&tournament());
        let row = &rows()[0];
        assert_eq!(columns[0].render_cell(row), "spring cup");
        assert_eq!(columns[1].render_cell(row), "500");
        assert_eq!(columns[2].render_cell(row), "Apr 1, 2024");
        assert_eq!(
            columns[3].render_cell(row),
            r#"<span class="badge badge-gray">completed</span>"#
        );
    }

    #[test]
    fn custom_and_reference_renderers() {
        let column = Column::new("name", "Name")
            .with_renderer(|value, row| format!("{}#{}", input_value(value), input_value(&row["$id"])));
        assert_eq!(column.render_cell(&rows()[1]), "Autumn Open#b");

        let field = FieldDef::new(
            "team_id",
            FieldType::Reference {
                entity: "team".into(),
            },
        );
        let names = HashMap::from([("t1".to_string(), "<C9>".to_string())]);
        let column = Column::reference(&field, names);
        let row = json!({"team_id": "t1"}).as_object().unwrap().clone();
        assert_eq!(column.render_cell(&row), "&lt;C9&gt;");
        let orphan = json!({"team_id": "t404"}).as_object().unwrap().clone();
        assert_eq!(column.render_cell(&orphan), "t404");
    }

    #[test]
    fn render_with_actions_and_sort_links() {
        let renderer = Renderer::new().unwrap();
        let html = EntityTable::new(columns_for(&tournament()), rows())
            .with_sort(Some(SortState::asc("name")))
            .with_sort_links("/esports/tournament")
            .with_actions(
                RowActions::all("/esports/tournament")
                    .with_confirm_message("Delete this tournament?"),
            )
            .render(&renderer)
            .unwrap();

        assert!(html.contains(r#"<a href="/esports/tournament?sort=name&amp;dir=desc">Name ▲</a>"#));
        assert!(html.contains(r#"<a href="/esports/tournament?sort=prize_pool&amp;dir=asc">Prize pool</a>"#));
        assert!(html.contains(r#"<a href="/esports/tournament/b">View</a>"#));
        assert!(html.contains(r#"<a href="/esports/tournament/b/edit">Edit</a>"#));
        assert!(html.contains(r#"action="/esports/tournament/b/delete""#));
        assert!(html.contains(r#"onsubmit="return confirm('Delete this tournament?');""#));
        assert!(html.find("Autumn Open").unwrap() < html.find("spring cup").unwrap());
    }

    #[test]
    fn render_empty_table() {
        let renderer = Renderer::new().unwrap();
        let html = EntityTable::new(columns_for(&tournament()), Vec::new())
            .with_actions(RowActions::all("/esports/tournament"))
            .with_empty_message("No tournaments yet.")
            .render(&renderer)
            .unwrap();
        assert!(html.contains(r#"<td colspan="5" class="empty">No tournaments yet.</td>"#));
    }
}
