//! Parameter-schema parsing.
//!
//! Descriptor rows carry their parameter schema as raw JSON text: an array of
//! objects with `paramName`, `paramType`, `paramDesc`, `required` and
//! `exampleValue` keys. Authoring tools are sloppy about types, so `required`
//! is accepted in boolean and string forms.

use serde_json::Value;

use super::ParamSpec;

/// Parse raw parameter-schema text into ordered parameter specs.
///
/// Entries with a blank or missing `paramName` are skipped. Returns an error
/// only when the text as a whole is not a JSON array; the caller degrades that
/// one tool to an empty parameter set.
pub fn parse_param_schema(raw: &str) -> serde_json::Result<Vec<ParamSpec>> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;

    let mut specs = Vec::with_capacity(entries.len());
    for entry in &entries {
        let name = entry
            .get("paramName")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or("");
        if name.is_empty() {
            continue;
        }

        specs.push(ParamSpec {
            name: name.to_string(),
            param_type: entry
                .get("paramType")
                .and_then(Value::as_str)
                .unwrap_or("string")
                .to_string(),
            description: entry
                .get("paramDesc")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            required: parse_required(entry.get("required")),
            default_value: entry.get("exampleValue").filter(|v| !v.is_null()).cloned(),
        });
    }

    Ok(specs)
}

/// Coerce the `required` field: booleans pass through, `"true"` (any case) and
/// `"1"` mean true, everything else is false.
fn parse_required(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    }
}
