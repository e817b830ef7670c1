//! Template scanning and interpolation.
//!
//! Templates reference session variables as `{{ name }}`, optionally wrapped
//! in double quotes (`"{{ name }}"`). Scanning extracts the referenced names
//! in order of occurrence; interpolation replaces each occurrence with the
//! JSON serialization of the current session value. Both are pure string
//! transforms over a fixed grammar - the scan is driven by a single compiled
//! regex and therefore bounded by the input length on any input.

use crate::session::Session;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Cached regex matching `{{ name }}` with optional whitespace and optional
/// surrounding double quotes. Compiled once and reused.
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""?\{\{\s*(\w+)\s*\}\}"?"#).expect("Failed to compile placeholder regex")
});

/// Extracts the ordered sequence of variable names referenced in `template`.
///
/// One entry is returned per occurrence, so a name referenced twice appears
/// twice - call sites use the full sequence to drive interpolation and the
/// deduplicated view to decide "is referenced".
///
/// # Examples
///
/// ```
/// use rest_runner::template::scan_placeholders;
///
/// let names = scan_placeholders("/pet/{{petId}}/owner/{{ ownerId }}");
/// assert_eq!(names, vec!["petId", "ownerId"]);
/// assert!(scan_placeholders("no variables here").is_empty());
/// ```
pub fn scan_placeholders(template: &str) -> Vec<String> {
    // Fast path: nothing to scan.
    if !template.contains("{{") {
        return Vec::new();
    }

    PLACEHOLDER_REGEX
        .captures_iter(template)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Replaces every placeholder in `template` with the JSON serialization of
/// the corresponding session value.
///
/// A string value becomes a quoted JSON string, a number stays numeric, and
/// a name that was never set in the session serializes as `null` (the
/// serde_json convention for an absent value; the quoted placeholder form
/// consumes its surrounding quotes, so the JSON serialization supplies any
/// quoting the output needs).
///
/// # Examples
///
/// ```
/// use rest_runner::session::Session;
/// use rest_runner::template::interpolate;
/// use serde_json::json;
///
/// let mut session = Session::new();
/// session.set("petName", json!("Bruno"));
/// let body = interpolate(r#"{"name":"{{petName}}"}"#, &session);
/// assert_eq!(body, r#"{"name":"Bruno"}"#);
/// ```
pub fn interpolate(template: &str, session: &Session) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }

    let mut result = String::with_capacity(template.len() + template.len() / 4);
    let mut last_match_end = 0;

    for cap in PLACEHOLDER_REGEX.captures_iter(template) {
        let full_match = match cap.get(0) {
            Some(m) => m,
            None => continue,
        };
        let name = match cap.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };

        result.push_str(&template[last_match_end..full_match.start()]);

        let value = session.get(name).cloned().unwrap_or(Value::Null);
        result.push_str(&value.to_string());

        last_match_end = full_match.end();
    }

    result.push_str(&template[last_match_end..]);
    result
}
