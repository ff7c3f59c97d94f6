//! Schema-driven forms and tables
//!
//! This crate turns `workbench-fields` entity definitions into HTML:
//!
//! - [`EntityForm`] renders one input per field and collects a submitted form
//!   back into a [`Record`](workbench_fields::Record), then hands it to an
//!   async handler.
//! - [`EntityTable`] renders rows under schema-derived (or hand-built)
//!   columns, with sort toggling and view/edit/delete row actions.
//! - [`Renderer`] owns the compiled Liquid templates, including the page
//!   shell every app page is wrapped in.
//!
//! ```rust,ignore
//! let renderer = Renderer::new()?;
//! let entity = schema.require("doctor")?;
//! let html = EntityTable::new(columns_for(entity), rows)
//!     .with_sort(Some(SortState::asc("name")))
//!     .with_actions(RowActions::all("/clinic/doctor"))
//!     .render(&renderer)?;
//! ```

pub mod error;
pub mod form;
pub mod render;
pub mod table;

pub use error::{RenderError, Result, SubmitError};
pub use form::{format_number, input_value, pairs_to_record, EntityForm, ReferenceOption};
pub use render::{
    escape, escape_js, DashboardSection, DashboardView, DetailRow, DetailView, EditView, Flash,
    FlashKind, ListingView, NavItem, PageContext, Renderer, StatCard, ThemeChoice,
};
pub use table::{columns_for, CellRenderer, Column, EntityTable, RowActions, SortDirection, SortState};
