//! Reconciliation of linter style flags with external formatter settings.
//!
//! Indentation and statement terminators can be configured twice: once via
//! the linter's `space`/`semicolon` flags and once in the formatter's own
//! config (`useTabs`/`tabWidth`/`semi`). [`merge_formatter`] accepts either
//! source alone, accepts both when they agree, and fails with a
//! `ConfigConflictError` when they do not.

use crate::error::{Result, XoError};
use crate::options::{Options, Space};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Trailing comma policy of the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    /// No trailing commas.
    None,
    /// Where valid in ES5.
    Es5,
    /// Everywhere possible.
    All,
}

/// The external formatter's settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatterOptions {
    /// Indent width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_width: Option<u32>,

    /// Indent with tabs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_tabs: Option<bool>,

    /// Print semicolons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semi: Option<bool>,

    /// Prefer single quotes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_quote: Option<bool>,

    /// Trailing comma policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_comma: Option<TrailingComma>,

    /// Spaces inside object literal braces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_spacing: Option<bool>,

    /// Put the `>` of a multi-line JSX element on the last line.
    #[serde(alias = "bracketSameLine", skip_serializing_if = "Option::is_none")]
    pub jsx_bracket_same_line: Option<bool>,

    /// Other formatter settings, passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormatterOptions {
    /// Field-by-field overlay with `other` winning.
    #[must_use]
    pub fn overlay(&self, other: &Self) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(other.extra.clone());

        Self {
            tab_width: other.tab_width.or(self.tab_width),
            use_tabs: other.use_tabs.or(self.use_tabs),
            semi: other.semi.or(self.semi),
            single_quote: other.single_quote.or(self.single_quote),
            trailing_comma: other.trailing_comma.or(self.trailing_comma),
            bracket_spacing: other.bracket_spacing.or(self.bracket_spacing),
            jsx_bracket_same_line: other.jsx_bracket_same_line.or(self.jsx_bracket_same_line),
            extra,
        }
    }
}

fn check_semicolon(semicolon: Option<bool>, semi: Option<bool>) -> Result<()> {
    match (semicolon, semi) {
        (Some(style), Some(formatter)) if style != formatter => {
            Err(XoError::config_conflict("semicolon", style, "semi", formatter))
        }
        _ => Ok(()),
    }
}

/// `space` and `useTabs` pair by truthiness: `space: true` or a width pairs
/// with `useTabs: true`, `space: false` pairs with `useTabs: false`.
fn check_use_tabs(space: Option<Space>, use_tabs: Option<bool>) -> Result<()> {
    let (Some(space), Some(use_tabs)) = (space, use_tabs) else {
        return Ok(());
    };

    let paired = !matches!(space, Space::Enabled(false));
    if paired == use_tabs {
        Ok(())
    } else {
        Err(XoError::config_conflict("space", space, "useTabs", use_tabs))
    }
}

fn check_tab_width(space: Option<Space>, tab_width: Option<u32>) -> Result<()> {
    match (space, tab_width) {
        (Some(Space::Width(width)), Some(tab_width)) if width != tab_width => Err(
            XoError::config_conflict("space", width, "tabWidth", tab_width),
        ),
        _ => Ok(()),
    }
}

/// Merges linter style flags into the formatter's settings.
///
/// Values the formatter config leaves unset are derived from the style flags,
/// falling back to `tabWidth: 2`, `useTabs: true`, `semi: true`,
/// `singleQuote: true`, `trailingComma: "none"`, `bracketSpacing: false` and
/// `jsxBracketSameLine: false`. Neither input is modified.
///
/// # Errors
///
/// Returns a `ConfigConflictError` naming both fields and values when the two
/// sources disagree on `semicolon`/`semi`, `space`/`useTabs` or
/// `space`/`tabWidth`.
pub fn merge_formatter(style: &Options, formatter: &FormatterOptions) -> Result<FormatterOptions> {
    check_semicolon(style.semicolon, formatter.semi)?;
    check_use_tabs(style.space, formatter.use_tabs)?;
    check_tab_width(style.space, formatter.tab_width)?;

    let derived = FormatterOptions {
        tab_width: Some(match style.space {
            Some(Space::Width(width)) => width,
            _ => 2,
        }),
        use_tabs: Some(style.space.and_then(Space::indent_width).is_none()),
        semi: Some(style.semicolon != Some(false)),
        single_quote: Some(true),
        trailing_comma: Some(TrailingComma::None),
        bracket_spacing: Some(false),
        jsx_bracket_same_line: Some(false),
        extra: Map::new(),
    };

    Ok(derived.overlay(formatter))
}
