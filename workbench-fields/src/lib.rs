//! Entity schema registry
//!
//! `workbench-fields` is a standalone, schema-only crate describing record
//! types declaratively. It knows nothing about tournaments or clinics;
//! each app provides its own entity definitions via `Schema::builder()`.
//!
//! # Architecture
//!
//! - **Schema-only**: Owns field and entity definitions, not record values
//! - **Declarative**: Forms, tables and validation are all driven by `FieldDef`
//! - **YAML overrides**: Entity definitions can be replaced from `<entity>.yaml` files
//! - **Browser-level validation**: `validate_record` enforces required/type/range/option checks only

pub mod error;
pub mod schema;
pub mod types;
pub mod validation;

pub use error::{FieldError, FieldsError, Result, ValidationErrors};
pub use schema::{Schema, SchemaBuilder};
pub use types::{humanize, Display, EntityDef, FieldDef, FieldType, Record, SelectOption, SortKind};
pub use validation::{
    is_blank, parse_date, parse_time, validate_record, validate_value, DATE_FORMAT, TIME_FORMAT,
};
