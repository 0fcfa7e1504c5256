//! Response post-processing — data-type annotation.
//!
//! Tools that declare a display data-type get it stamped into their JSON
//! responses so downstream renderers can pick a presentation without sniffing
//! payloads. Non-JSON responses pass through untouched.

use serde_json::{json, Value};

/// Stamp a data-type into a response body.
///
/// JSON objects get the type injected (overwriting any existing `type` field);
/// arrays and scalars are wrapped as `{"type": ..., "data": ...}`. A blank
/// data-type, a blank body, or an unparseable body leaves the response
/// unchanged — annotation is cosmetic and must never fail an invocation.
pub fn annotate(body: &str, data_type: &str) -> String {
    if data_type.trim().is_empty() || body.trim().is_empty() {
        return body.to_string();
    }

    let parsed: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return body.to_string(),
    };

    let annotated = match parsed {
        Value::Object(mut map) => {
            map.insert("type".to_string(), Value::String(data_type.to_string()));
            Value::Object(map)
        }
        other => json!({ "type": data_type, "data": other }),
    };

    // Re-serialization of a Value cannot fail; fall back to the raw body all
    // the same rather than panic.
    serde_json::to_string(&annotated).unwrap_or_else(|_| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn object_gets_type_injected() {
        assert_eq!(annotate(r#"{"a":1}"#, "point"), r#"{"a":1,"type":"point"}"#);
    }

    #[test]
    fn existing_type_is_overwritten() {
        assert_eq!(
            annotate(r#"{"type":"old","a":1}"#, "legend"),
            r#"{"a":1,"type":"legend"}"#
        );
    }

    #[test]
    fn array_is_wrapped() {
        assert_eq!(
            annotate("[1,2,3]", "statistics"),
            r#"{"data":[1,2,3],"type":"statistics"}"#
        );
    }

    #[test]
    fn scalar_is_wrapped() {
        assert_eq!(annotate("42", "point"), r#"{"data":42,"type":"point"}"#);
    }

    #[test]
    fn non_json_passes_through() {
        assert_eq!(annotate("plain text body", "point"), "plain text body");
        assert_eq!(annotate("<html></html>", "point"), "<html></html>");
    }

    #[test]
    fn blank_type_or_body_is_untouched() {
        assert_eq!(annotate(r#"{"a":1}"#, "  "), r#"{"a":1}"#);
        assert_eq!(annotate("", "point"), "");
        assert_eq!(annotate("   ", "point"), "   ");
    }
}
