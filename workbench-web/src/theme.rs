//! Named color themes and the provider that resolves the active one.

use workbench_entity::ThemeChoice;

use crate::error::{Result, WebError};

/// Cookie holding the visitor's chosen theme.
pub const THEME_COOKIE: &str = "theme";

/// A named set of CSS custom properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub label: &'static str,
    pub vars: &'static [(&'static str, &'static str)],
}

impl Theme {
    /// Declarations for a `:root` block, e.g. `--bg: #fff; --fg: #111;`.
    pub fn css(&self) -> String {
        self.vars
            .iter()
            .map(|(name, value)| format!("--{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub const THEMES: &[Theme] = &[
    Theme {
        name: "light",
        label: "Light",
        vars: &[
            ("bg", "#f8fafc"),
            ("fg", "#0f172a"),
            ("surface", "#ffffff"),
            ("border", "#e2e8f0"),
            ("muted", "#64748b"),
            ("accent", "#2563eb"),
            ("accent-fg", "#ffffff"),
            ("danger", "#dc2626"),
        ],
    },
    Theme {
        name: "dark",
        label: "Dark",
        vars: &[
            ("bg", "#0f172a"),
            ("fg", "#e2e8f0"),
            ("surface", "#1e293b"),
            ("border", "#334155"),
            ("muted", "#94a3b8"),
            ("accent", "#60a5fa"),
            ("accent-fg", "#0f172a"),
            ("danger", "#f87171"),
        ],
    },
    Theme {
        name: "esports",
        label: "Esports",
        vars: &[
            ("bg", "#0b0b14"),
            ("fg", "#f4f4f5"),
            ("surface", "#17172a"),
            ("border", "#2e2e4d"),
            ("muted", "#a1a1aa"),
            ("accent", "#a855f7"),
            ("accent-fg", "#ffffff"),
            ("danger", "#f43f5e"),
        ],
    },
    Theme {
        name: "clinic",
        label: "Clinic",
        vars: &[
            ("bg", "#f0fdfa"),
            ("fg", "#134e4a"),
            ("surface", "#ffffff"),
            ("border", "#99f6e4"),
            ("muted", "#5f7f7b"),
            ("accent", "#0d9488"),
            ("accent-fg", "#ffffff"),
            ("danger", "#e11d48"),
        ],
    },
];

/// Resolves the active theme from a stored preference.
#[derive(Debug, Clone)]
pub struct ThemeProvider {
    default: &'static Theme,
}

impl ThemeProvider {
    /// Fails if `default` names no built-in theme.
    pub fn new(default: &str) -> Result<Self> {
        let default = Self::find(default).ok_or_else(|| WebError::UnknownTheme {
            name: default.to_string(),
        })?;
        Ok(Self { default })
    }

    fn find(name: &str) -> Option<&'static Theme> {
        THEMES.iter().find(|t| t.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&'static Theme> {
        Self::find(name)
    }

    pub fn default_theme(&self) -> &'static Theme {
        self.default
    }

    /// The stored theme, or the default when none is stored or it is unknown.
    pub fn resolve(&self, stored: Option<&str>) -> &'static Theme {
        stored.and_then(Self::find).unwrap_or(self.default)
    }

    /// Theme picker entries with `active` selected.
    pub fn choices(&self, active: &Theme) -> Vec<ThemeChoice> {
        THEMES
            .iter()
            .map(|t| ThemeChoice {
                name: t.name.to_string(),
                label: t.label.to_string(),
                selected: t.name == active.name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_falls_back_to_default() {
        let provider = ThemeProvider::new("clinic").unwrap();
        assert_eq!(provider.resolve(None).name, "clinic");
        assert_eq!(provider.resolve(Some("neon")).name, "clinic");
        assert_eq!(provider.resolve(Some("dark")).name, "dark");
    }

    #[test]
    fn test_unknown_default_rejected() {
        let err = ThemeProvider::new("neon").unwrap_err();
        assert_eq!(err.to_string(), "unknown theme 'neon'");
    }

    #[test]
    fn test_every_theme_defines_the_same_variables() {
        let names = |t: &Theme| t.vars.iter().map(|(n, _)| *n).collect::<Vec<_>>();
        for theme in THEMES {
            assert_eq!(names(theme), names(&THEMES[0]), "{}", theme.name);
        }
    }

    #[test]
    fn test_css_and_choices() {
        let provider = ThemeProvider::new("light").unwrap();
        let dark = provider.get("dark").unwrap();
        assert!(dark.css().starts_with("--bg: #0f172a; --fg: #e2e8f0;"));
        let choices = provider.choices(dark);
        assert_eq!(choices.len(), 4);
        assert!(choices.iter().filter(|c| c.selected).all(|c| c.name == "dark"));
    }
}
