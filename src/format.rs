//! Cell formatting helpers for table output.

pub const NONE_STR: &str = "None";

pub fn str_str(value: Option<&str>) -> String {
    value.unwrap_or(NONE_STR).to_string()
}

pub fn int_str(value: Option<i64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NONE_STR.to_string(),
    }
}

pub fn bool_str(value: Option<bool>) -> String {
    // The Harbor API sometimes uses a missing value to signify false.
    match value.unwrap_or(false) {
        true => "true".to_string(),
        false => "false".to_string(),
    }
}

/// Format a Harbor "boolean string" field.
///
/// `ProjectMetadata` carries booleans as the strings `"true"` and `"false"`.
/// Anything else is treated as unset and rendered as false, matching the
/// lenient handling of the original web UI.
pub fn boolstr_str(value: Option<&str>) -> String {
    match value {
        Some("true") => bool_str(Some(true)),
        Some("false") => bool_str(Some(false)),
        _ => bool_str(None),
    }
}

const KILOBYTE: u64 = 1000;
const MEGABYTE: u64 = KILOBYTE * 1000;
const GIGABYTE: u64 = MEGABYTE * 1000;
const TERABYTE: u64 = GIGABYTE * 1000;

/// Human-scaled byte count with decimal unit suffix.
pub fn bytes_to_str(b: u64) -> String {
    if b >= TERABYTE {
        format!("{:.2} TB", b as f64 / TERABYTE as f64)
    } else if b >= GIGABYTE {
        format!("{:.2} GB", b as f64 / GIGABYTE as f64)
    } else if b >= MEGABYTE {
        format!("{:.2} MB", b as f64 / MEGABYTE as f64)
    } else if b >= KILOBYTE {
        format!("{:.2} kB", b as f64 / KILOBYTE as f64)
    } else {
        format!("{b} B")
    }
}

/// Pluralize a table title when it covers more than one row.
pub fn plural_str(value: &str, count: usize) -> String {
    if count == 1 {
        return value.to_string();
    }
    if let Some(stem) = value.strip_suffix('y') {
        format!("{stem}ies")
    } else if value.ends_with('s') {
        value.to_string()
    } else {
        format!("{value}s")
    }
}
