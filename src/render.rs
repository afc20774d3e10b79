//! Output formatter: picks one of the three render paths (`table`, `json`,
//! `jsonschema`) per invocation and produces the final output string.
//!
//! The formatter is pure; all I/O happens in [`crate::output`]. The `json`
//! and `jsonschema` paths share a single projection function, so the `data`
//! payload of a schema envelope is always byte-identical to the plain JSON
//! output of the same result.

use crate::compact::CompactRegistry;
use crate::config::OutputSettings;
use crate::models::ApiModel;
use crate::output::{self, OutputOptions};
use crate::schema::{Decoded, SchemaEnvelope};
use crate::table::{self, DepthBudget};
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Jsonschema,
}

/// A command result: one instance or a sequence of instances. The two
/// project differently to JSON (object vs array), so the distinction is kept
/// all the way to the formatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultSet<T> {
    Single(T),
    Multiple(Vec<T>),
}

impl<T: ApiModel> ResultSet<T> {
    fn items(&self) -> Vec<&dyn ApiModel> {
        match self {
            ResultSet::Single(item) => vec![item as &dyn ApiModel],
            ResultSet::Multiple(items) => {
                items.iter().map(|item| item as &dyn ApiModel).collect()
            }
        }
    }
}

/// Format a typed result according to the configured output format.
pub fn format_result<T>(result: &ResultSet<T>, settings: &OutputSettings) -> Result<String>
where
    T: ApiModel + Serialize + Default,
{
    let items = result.items();
    for item in &items {
        item.validate()
            .context("response failed validation (use --raw to bypass)")?;
    }
    // The probe supplies the type name when the result is an empty sequence.
    let probe = T::default();
    let type_name = items
        .first()
        .map_or_else(|| probe.type_name(), |item| item.type_name());
    let projection = projection(result, settings.json.sort_keys)?;
    format_prepared(&items, type_name, &projection, settings)
}

/// Format and write a typed result.
pub fn render_result<T>(
    result: &ResultSet<T>,
    settings: &OutputSettings,
    dest: &OutputOptions,
) -> Result<()>
where
    T: ApiModel + Serialize + Default,
{
    let text = format_result(result, settings)?;
    output::write_output(&text, dest)?;
    Ok(())
}

/// Format a decoded schema envelope. `data` is the envelope payload, reused
/// as the JSON projection so decode-then-print reproduces the original
/// output.
pub fn format_decoded(
    decoded: &Decoded,
    data: &Value,
    settings: &OutputSettings,
) -> Result<String> {
    let items: Vec<&dyn ApiModel> = decoded.items.iter().map(Box::as_ref).collect();
    for item in &items {
        item.validate()
            .context("decoded payload failed validation")?;
    }
    let mut projection = data.clone();
    if settings.json.sort_keys {
        sort_keys(&mut projection);
    }
    format_prepared(&items, &decoded.type_name, &projection, settings)
}

/// Raw mode: no validation, always the JSON path.
pub fn format_raw(value: &Value, settings: &OutputSettings) -> Result<String> {
    let mut value = value.clone();
    if settings.json.sort_keys {
        sort_keys(&mut value);
    }
    to_json_string(&value, settings.json.indent)
}

fn format_prepared(
    items: &[&dyn ApiModel],
    type_name: &str,
    projection: &Value,
    settings: &OutputSettings,
) -> Result<String> {
    match settings.format {
        OutputFormat::Table => Ok(format_table(items, type_name, settings)),
        OutputFormat::Json => to_json_string(projection, settings.json.indent),
        OutputFormat::Jsonschema => {
            let envelope = SchemaEnvelope::new(type_name, projection.clone());
            let value = serde_json::to_value(&envelope).context("serializing schema envelope")?;
            to_json_string(&value, settings.json.indent)
        }
    }
}

fn format_table(items: &[&dyn ApiModel], type_name: &str, settings: &OutputSettings) -> String {
    if items.is_empty() {
        return "No resources found.".to_string();
    }

    if settings.table.compact {
        if let Some(table) = CompactRegistry::global().render(type_name, items) {
            return table.render();
        }
        debug!("no compact form for {type_name}, falling back to generic tables");
    }

    // Compact and description are mutually exclusive; compact wins when both
    // are requested, even if it then falls back to the generic layout.
    let with_description = settings.table.description && !settings.table.compact;
    let budget = DepthBudget::from_config(settings.table.max_depth);
    let rendered: Vec<String> = items
        .iter()
        .map(|item| table::render_tables(&table::auto_tables(*item, budget, with_description)))
        .collect();
    rendered.join("\n")
}

/// The plain-JSON projection shared by the `json` and `jsonschema` paths.
pub fn projection<T: Serialize>(value: &T, sort: bool) -> Result<Value> {
    let mut projected = serde_json::to_value(value).context("projecting result to JSON")?;
    if sort {
        sort_keys(&mut projected);
    }
    Ok(projected)
}

fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (_, v) in entries.iter_mut() {
                sort_keys(v);
            }
            map.extend(entries);
        }
        Value::Array(items) => {
            for item in items {
                sort_keys(item);
            }
        }
        _ => {}
    }
}

fn to_json_string(value: &Value, indent: usize) -> Result<String> {
    if indent == 0 {
        return serde_json::to_string(value).context("serializing JSON output");
    }
    let indent_str = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent_str.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("serializing JSON output")?;
    String::from_utf8(buf).context("serializing JSON output")
}
