//! The two apps built on the entity system
//!
//! Each app module declares its records as serde models, its entity schema
//! for the form and table layer, a typed API with one [`Collection`] per
//! backend collection, and the dashboard services the JSON routes expose.
//!
//! - [`esports`]: tournaments, teams, players, matches and standings
//! - [`clinic`]: doctors, patients, appointments and schedules

pub mod clinic;
pub mod collection;
pub mod error;
pub mod esports;
pub mod meta;

pub use clinic::ClinicApi;
pub use collection::{Collection, PAGE_SIZE};
pub use error::{AppError, Result};
pub use esports::EsportsApi;
pub use meta::Meta;
