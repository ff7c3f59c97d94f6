//! Web shell for the esports and clinic apps
//!
//! Serves two kinds of routes from one router:
//!
//! - HTML pages under `/<app>/<entity>` built from each app's entity schema
//!   with `workbench-entity` forms and tables, wrapped in a themed page shell.
//! - JSON routes under `/api` for dashboard statistics, today's and upcoming
//!   appointments, doctor schedules and tournament standings.
//!
//! A session-cookie gate keeps signed-out visitors away from app pages and
//! signed-in visitors away from the login and register pages.

pub mod cache;
pub mod cookies;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod theme;
pub mod visitor;

pub use cache::{Cached, StatsCache};
pub use error::{ApiError, PageError, Result, WebError};
pub use middleware::redirect_for;
pub use routes::router;
pub use server::{build_backend, serve};
pub use state::{AppHandle, AppState};
pub use theme::{Theme, ThemeProvider, THEMES, THEME_COOKIE};
pub use visitor::Visitor;
