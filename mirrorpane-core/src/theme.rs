//! Color-scheme conversion for syntax highlighting
//!
//! The host ships the editor's color scheme as raw JSON whenever it changes
//! (`theme` message). This module defines the input schema (a TextMate-style
//! scope/settings list) and converts it into the fixed set of highlight
//! classes the UI's renderer understands. Conversion is pure: same scheme in,
//! same theme out.
//!
//! Scopes the mapping table does not recognize are skipped; a scheme that
//! matches nothing still produces a valid (empty) theme.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version tag stamped into every converted [`Theme`].
pub const THEME_SCHEMA_VERSION: u32 = 1;

/// Light/dark base of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Appearance {
    Light,
    #[default]
    Dark,
    HighContrast,
}

/// One or more TextMate scope selectors.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScopeSelector {
    One(String),
    Many(Vec<String>),
}

impl Default for ScopeSelector {
    fn default() -> Self {
        ScopeSelector::Many(Vec::new())
    }
}

impl ScopeSelector {
    /// Iterate the individual scope strings.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            ScopeSelector::One(scope) => std::slice::from_ref(scope),
            ScopeSelector::Many(scopes) => scopes.as_slice(),
        }
        .iter()
        .map(String::as_str)
    }
}

/// Styling attached to a scope rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenColorSettings {
    /// Hex color, e.g. "#ce9178"
    pub foreground: Option<String>,
    /// Space-separated flags: "bold", "italic", "underline"
    pub font_style: Option<String>,
}

/// One scope → settings rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenColorRule {
    pub scope: ScopeSelector,
    pub settings: TokenColorSettings,
}

/// Input schema: the color-scheme description as shipped by the host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorScheme {
    pub name: Option<String>,
    pub appearance: Appearance,
    pub token_colors: Vec<TokenColorRule>,
}

/// Resolved style for one highlight class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    pub foreground: Option<String>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Style {
    fn from_settings(settings: &TokenColorSettings) -> Self {
        let flags = settings.font_style.as_deref().unwrap_or("");
        Self {
            foreground: settings.foreground.clone(),
            bold: flags.split_whitespace().any(|f| f == "bold"),
            italic: flags.split_whitespace().any(|f| f == "italic"),
            underline: flags.split_whitespace().any(|f| f == "underline"),
        }
    }
}

/// Output schema: the style mapping the UI renders with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub schema_version: u32,
    pub name: Option<String>,
    pub appearance: Appearance,
    /// Keyed by highlight class ("comment", "string", "keyword", ...)
    pub styles: BTreeMap<String, Style>,
}

/// Map a TextMate scope onto a highlight class.
///
/// Longest-prefix entries first so "constant.numeric" wins over "constant".
fn class_for_scope(scope: &str) -> Option<&'static str> {
    const MAPPING: &[(&str, &str)] = &[
        ("comment", "comment"),
        ("string", "string"),
        ("keyword", "keyword"),
        ("storage", "keyword"),
        ("constant.numeric", "number"),
        ("constant", "literal"),
        ("entity.name.function", "function"),
        ("support.function", "function"),
        ("entity.name.type", "type"),
        ("support.type", "type"),
        ("entity.name.tag", "tag"),
        ("entity.other.attribute-name", "attribute"),
        ("variable", "variable"),
        ("punctuation", "punctuation"),
    ];

    MAPPING
        .iter()
        .filter(|(prefix, _)| {
            scope == *prefix
                || (scope.starts_with(*prefix) && scope[prefix.len()..].starts_with('.'))
        })
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, class)| *class)
}

/// Convert a color scheme into the UI's style mapping.
///
/// Rules apply in order, so a later rule for the same class overrides an
/// earlier one, matching how editors resolve overlapping scopes.
pub fn convert(scheme: &ColorScheme) -> Theme {
    let mut styles = BTreeMap::new();

    for rule in &scheme.token_colors {
        for scope in rule.scope.iter() {
            if let Some(class) = class_for_scope(scope.trim()) {
                styles.insert(class.to_string(), Style::from_settings(&rule.settings));
            }
        }
    }

    Theme {
        schema_version: THEME_SCHEMA_VERSION,
        name: scheme.name.clone(),
        appearance: scheme.appearance,
        styles,
    }
}
