//! Per-request view of the caller: theme, session and location.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Html;
use workbench_entity::{Flash, NavItem, PageContext};

use crate::cookies::cookie_value;
use crate::error::PageError;
use crate::state::{AppHandle, AppState};
use crate::theme::{Theme, THEME_COOKIE};

#[derive(Debug, Clone)]
pub struct Visitor {
    pub theme: &'static Theme,
    /// Session secret from the session cookie.
    pub session: Option<String>,
    /// Path and query of the current request.
    pub location: String,
}

impl Visitor {
    pub fn signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Wrap `body` in the page shell.
    ///
    /// Navigation lists the apps, plus the entities of `app` when given.
    pub fn page(
        &self,
        state: &AppState,
        title: impl Into<String>,
        app: Option<&AppHandle>,
        flash: Option<Flash>,
        body: String,
    ) -> Result<Html<String>, PageError> {
        let context = PageContext {
            title: title.into(),
            theme: self.theme.name.to_string(),
            theme_css: self.theme.css(),
            themes: state.themes.choices(self.theme),
            nav: self.nav(state, app),
            flash,
            body,
            return_to: self.location.clone(),
            signed_in: self.signed_in(),
        };
        Ok(Html(state.renderer.page(&context)?))
    }

    fn nav(&self, state: &AppState, current: Option<&AppHandle>) -> Vec<NavItem> {
        let path = self
            .location
            .split_once('?')
            .map_or(self.location.as_str(), |(p, _)| p);
        let mut items = vec![NavItem {
            label: "Home".into(),
            href: "/".into(),
            active: path == "/",
        }];
        if !self.signed_in() {
            return items;
        }
        for app in &state.apps {
            let href = app.href();
            items.push(NavItem {
                label: app.label.clone(),
                active: path == href,
                href,
            });
        }
        if let Some(app) = current {
            for def in app.schema.entities() {
                let href = format!("/{}/{}", app.name, def.name);
                let active = path == href || path.starts_with(&format!("{href}/"));
                items.push(NavItem {
                    label: plural(&def.display_label()),
                    href,
                    active,
                });
            }
        }
        items
    }
}

/// `Match` -> `Matches`, `Team` -> `Teams`.
pub fn plural(label: &str) -> String {
    if label.ends_with("ch") || label.ends_with('s') || label.ends_with('x') {
        format!("{label}es")
    } else {
        format!("{label}s")
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Visitor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let stored = cookie_value(&parts.headers, THEME_COOKIE);
        let theme = state.themes.resolve(stored.as_deref());
        let session = cookie_value(&parts.headers, &state.session_cookie);
        let location = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
        Ok(Self {
            theme,
            session,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural("Team"), "Teams");
        assert_eq!(plural("Match"), "Matches");
        assert_eq!(plural("Doctor"), "Doctors");
    }
}
