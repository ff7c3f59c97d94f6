//! Template renderer for pages, forms and tables
//!
//! All HTML is produced by a fixed set of built-in Liquid templates. Templates
//! are compiled once when the `Renderer` is created; rendering only converts
//! the view model into a Liquid object and runs the compiled template.
//!
//! Liquid does not escape output on its own. Templates escape every plain
//! value with the `escape` filter; values that are already HTML (table cells,
//! nested forms, page bodies) are produced by Rust code that escapes with
//! [`escape`].

use std::collections::HashMap;

use serde::Serialize;
use tracing::trace;

use crate::error::{RenderError, Result};

/// Built-in templates, by name.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("page", include_str!("../templates/page.liquid")),
    ("form", include_str!("../templates/form.liquid")),
    ("table", include_str!("../templates/table.liquid")),
    ("detail", include_str!("../templates/detail.liquid")),
    ("dashboard", include_str!("../templates/dashboard.liquid")),
    ("listing", include_str!("../templates/listing.liquid")),
    ("edit", include_str!("../templates/edit.liquid")),
];

/// HTML-escape text for element content and attribute values.
pub fn escape(s: &str) -> String {
    html_escape::encode_safe(s).into_owned()
}

/// Escape text for a single-quoted JavaScript string literal.
pub fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}

/// Compiled template set.
pub struct Renderer {
    templates: HashMap<&'static str, liquid::Template>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&&str> = self.templates.keys().collect();
        names.sort();
        f.debug_struct("Renderer").field("templates", &names).finish()
    }
}

impl Renderer {
    /// Compile the built-in templates.
    pub fn new() -> Result<Self> {
        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(|e| RenderError::Parse {
                name: "<parser>".into(),
                message: e.to_string(),
            })?;

        let mut templates = HashMap::new();
        for (name, source) in BUILTIN_TEMPLATES {
            let template = parser.parse(source).map_err(|e| RenderError::Parse {
                name: (*name).to_string(),
                message: e.to_string(),
            })?;
            templates.insert(*name, template);
        }
        Ok(Self { templates })
    }

    /// Render a named template with a serializable view model.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::UnknownTemplate {
                name: name.to_string(),
            })?;
        let globals = liquid::to_object(data).map_err(|e| RenderError::Render {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        trace!(template = name, "rendering");
        template.render(&globals).map_err(|e| RenderError::Render {
            name: name.to_string(),
            message: e.to_string(),
        })
    }

    /// Wrap a body in the application shell.
    pub fn page(&self, page: &PageContext) -> Result<String> {
        self.render("page", page)
    }

    /// Key/value view of one record.
    pub fn detail(&self, view: &DetailView) -> Result<String> {
        self.render("detail", view)
    }

    /// Stat cards and free-form sections.
    pub fn dashboard(&self, view: &DashboardView) -> Result<String> {
        self.render("dashboard", view)
    }

    /// Heading, "new" link and a pre-rendered table.
    pub fn listing(&self, view: &ListingView) -> Result<String> {
        self.render("listing", view)
    }

    /// Heading, error summary and a pre-rendered form.
    pub fn edit(&self, view: &EditView) -> Result<String> {
        self.render("edit", view)
    }
}

/// One link in the top navigation.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub label: String,
    pub href: String,
    pub active: bool,
}

/// One entry in the theme picker.
#[derive(Debug, Clone, Serialize)]
pub struct ThemeChoice {
    pub name: String,
    pub label: String,
    pub selected: bool,
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Info,
    Error,
}

/// A one-off message shown above the page body.
#[derive(Debug, Clone, Serialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Everything the application shell needs.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub title: String,
    /// Name written to the `data-theme` attribute.
    pub theme: String,
    /// CSS custom property declarations for `:root`.
    pub theme_css: String,
    pub themes: Vec<ThemeChoice>,
    pub nav: Vec<NavItem>,
    pub flash: Option<Flash>,
    /// Pre-rendered HTML.
    pub body: String,
    /// Where the theme picker sends the user back to.
    pub return_to: String,
    pub signed_in: bool,
}

/// One label/value pair of a detail view. `value` is HTML.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub title: String,
    pub rows: Vec<DetailRow>,
    pub edit_href: Option<String>,
    pub delete_href: Option<String>,
    pub back_href: Option<String>,
    pub confirm_js: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatCard {
    pub label: String,
    pub value: String,
    pub href: Option<String>,
}

/// A titled block of pre-rendered HTML.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub heading: String,
    pub cards: Vec<StatCard>,
    pub sections: Vec<DashboardSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub heading: String,
    pub entity_label: String,
    pub new_href: Option<String>,
    /// Pre-rendered table HTML.
    pub table: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditView {
    pub heading: String,
    pub error_summary: Option<String>,
    /// Pre-rendered form HTML.
    pub form: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> PageContext {
        PageContext {
            title: "Dashboard <1>".into(),
            theme: "dark".into(),
            theme_css: "--bg: #111;".into(),
            themes: vec![
                ThemeChoice {
                    name: "light".into(),
                    label: "Light".into(),
                    selected: false,
                },
                ThemeChoice {
                    name: "dark".into(),
                    label: "Dark".into(),
                    selected: true,
                },
            ],
            nav: vec![NavItem {
                label: "Doctors".into(),
                href: "/clinic/doctor".into(),
                active: true,
            }],
            flash: Some(Flash::error("Could not save")),
            body: body.into(),
            return_to: "/clinic".into(),
            signed_in: true,
        }
    }

    #[test]
    fn builtin_templates_compile() {
        let renderer = Renderer::new().unwrap();
        assert!(format!("{renderer:?}").contains("page"));
    }

    #[test]
    fn page_sets_theme_attribute_and_escapes_title() {
        let renderer = Renderer::new().unwrap();
        let html = renderer.page(&page("<p>hello</p>")).unwrap();
        assert!(html.contains(r#"<html lang="en" data-theme="dark">"#));
        assert!(html.contains(":root { --bg: #111; }"));
        assert!(html.contains("<title>Dashboard &lt;1&gt;</title>"));
        assert!(html.contains("<p>hello</p>"));
        assert!(html.contains(r#"<option value="dark" selected>Dark</option>"#));
        assert!(html.contains(r#"<a href="/clinic/doctor" class="active">Doctors</a>"#));
        assert!(html.contains(r#"<div class="flash error">Could not save</div>"#));
        assert!(html.contains(r#"action="/logout""#));
    }

    #[test]
    fn page_without_flash_or_session() {
        let renderer = Renderer::new().unwrap();
        let mut ctx = page("");
        ctx.flash = None;
        ctx.signed_in = false;
        let html = renderer.page(&ctx).unwrap();
        assert!(!html.contains("class=\"flash"));
        assert!(!html.contains("/logout"));
    }

    #[test]
    fn unknown_template() {
        let renderer = Renderer::new().unwrap();
        let err = renderer.render("chart", &serde_json::json!({})).unwrap_err();
        assert!(matches!(err, RenderError::UnknownTemplate { .. }));
    }

    #[test]
    fn dashboard_cards() {
        let renderer = Renderer::new().unwrap();
        let html = renderer
            .dashboard(&DashboardView {
                heading: "Clinic".into(),
                cards: vec![StatCard {
                    label: "Doctors".into(),
                    value: "12".into(),
                    href: Some("/clinic/doctor".into()),
                }],
                sections: vec![DashboardSection {
                    heading: "Today".into(),
                    body: "<ul></ul>".into(),
                }],
            })
            .unwrap();
        assert!(html.contains(r#"<a href="/clinic/doctor">12</a>"#));
        assert!(html.contains("<h2>Today</h2>"));
        assert!(html.contains("<ul></ul>"));
    }

    #[test]
    fn escape_helpers() {
        assert_eq!(escape("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
        assert_eq!(escape_js("it's"), "it\\'s");
    }
}
