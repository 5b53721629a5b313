//! Rendering of groups, resolved configurations and options.
//!
//! Every command result can be printed as JSON, YAML, a terminal table or a
//! compact plain-text listing. The text form only shows option categories
//! that are actually set, which keeps it readable next to the file list.

use crate::builder::ResolvedGroup;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::grouping::ConfigGroup;
use crate::options::Options;
use prettytable::{format, Attr, Cell, Row, Table};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Maximum width for the options column before truncation.
const MAX_OPTIONS_WIDTH: usize = 60;

#[must_use]
fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_OPTIONS_WIDTH {
        let kept: String = text.chars().take(MAX_OPTIONS_WIDTH.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

fn table_format() -> format::TableFormat {
    format::FormatBuilder::new()
        .separator(
            format::LinePosition::Top,
            format::LineSeparator::new('─', '┬', '┌', '┐'),
        )
        .separator(
            format::LinePosition::Title,
            format::LineSeparator::new('═', '╪', '╞', '╡'),
        )
        .separator(
            format::LinePosition::Intern,
            format::LineSeparator::new('─', '┼', '├', '┤'),
        )
        .separator(
            format::LinePosition::Bottom,
            format::LineSeparator::new('─', '┴', '└', '┘'),
        )
        .padding(1, 1)
        .build()
}

fn titled_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(table_format());
    table.set_titles(Row::new(
        titles
            .iter()
            .map(|title| Cell::new(title).with_style(Attr::Bold))
            .collect(),
    ));
    table
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        _ => Ok(serde_json::to_string_pretty(value)?),
    }
}

/// Options as compact JSON, leaving out empty categories.
///
/// # Errors
///
/// Returns an error if the options cannot be serialized.
pub fn compact_options(opts: &Options) -> Result<String> {
    let mut raw = opts.to_raw()?;
    raw.retain(|_, value| match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    });
    Ok(Value::Object(raw).to_string())
}

fn group_header(index: usize, hash: u64, files: usize) -> String {
    format!("Group {}  hash=0b{:b}  files={}", index + 1, hash, files)
}

fn push_paths(out: &mut String, paths: &[PathBuf]) {
    for path in paths {
        let _ = writeln!(out, "  - {}", path.display());
    }
}

/// Renders a grouping in the requested format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_groups(groups: &[ConfigGroup], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => serialize(groups, format),
        OutputFormat::Text => {
            let mut blocks = Vec::with_capacity(groups.len());
            for (index, group) in groups.iter().enumerate() {
                let mut block = group_header(index, group.hash, group.paths.len());
                block.push('\n');
                let _ = writeln!(block, "  options: {}", compact_options(&group.opts)?);
                push_paths(&mut block, &group.paths);
                blocks.push(block);
            }
            Ok(blocks.join("\n"))
        }
        OutputFormat::Table => {
            let mut table = titled_table(&["Group", "Hash", "Files", "Options"]);
            for (index, group) in groups.iter().enumerate() {
                table.add_row(Row::new(vec![
                    Cell::new(&(index + 1).to_string()),
                    Cell::new(&format!("0b{:b}", group.hash)),
                    Cell::new(&group.paths.len().to_string()),
                    Cell::new(&truncate(&compact_options(&group.opts)?)),
                ]));
            }
            Ok(table.to_string())
        }
    }
}

/// Renders resolved configurations in the requested format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_resolved(groups: &[ResolvedGroup], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => serialize(groups, format),
        OutputFormat::Text => {
            let mut blocks = Vec::with_capacity(groups.len());
            for (index, group) in groups.iter().enumerate() {
                let config = &group.config;
                let mut block = group_header(index, group.hash, group.paths.len());
                block.push('\n');
                let _ = writeln!(block, "  extends: {}", config.base_config.extends.join(", "));
                if !config.plugins.is_empty() {
                    let _ = writeln!(block, "  plugins: {}", config.plugins.join(", "));
                }
                let rules: Vec<&str> = config.rules.keys().map(String::as_str).collect();
                let _ = writeln!(block, "  rules: {}", rules.join(", "));
                push_paths(&mut block, &group.paths);
                blocks.push(block);
            }
            Ok(blocks.join("\n"))
        }
        OutputFormat::Table => {
            let mut table = titled_table(&["Group", "Files", "Extends", "Plugins", "Rules"]);
            for (index, group) in groups.iter().enumerate() {
                let config = &group.config;
                table.add_row(Row::new(vec![
                    Cell::new(&(index + 1).to_string()),
                    Cell::new(&group.paths.len().to_string()),
                    Cell::new(&config.base_config.extends.join("\n")),
                    Cell::new(&config.plugins.join("\n")),
                    Cell::new(&config.rules.len().to_string()),
                ]));
            }
            Ok(table.to_string())
        }
    }
}

/// Renders a single options record. Table and text both print compact JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_options(opts: &Options, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => serialize(opts, format),
        OutputFormat::Table | OutputFormat::Text => compact_options(opts),
    }
}
