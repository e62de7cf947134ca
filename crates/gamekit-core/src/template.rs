//! `{{placeholder}}` interpolation.
//!
//! Substitution is a single pass: a substituted value is never rescanned, and
//! a key with no value becomes the empty string.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Placeholder pattern: `{{` followed by the shortest run up to `}}`.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(.*?)\}\}").expect("fail to create the placeholder pattern")
});

/// Source of values for [`interpolate`].
pub trait TemplateValues {
    /// Rendered value for `key`, or `None` if unbound.
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl TemplateValues for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

impl TemplateValues for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        self.get(key).map(|v| Cow::Borrowed(v.as_str()))
    }
}

/// JSON objects resolve the exact key first, then a dotted path such as
/// `response.result.message_id` through nested objects and arrays.
impl TemplateValues for Map<String, Value> {
    fn lookup(&self, key: &str) -> Option<Cow<'_, str>> {
        resolve_path(self, key).map(render_value)
    }
}

fn resolve_path<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }

    let mut segments = key.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(object) => object.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Text form of a JSON value inside a template: strings verbatim, `null` as
/// empty, everything else as compact JSON.
pub fn render_value(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Replaces every `{{ key }}` in `template` with its value from `values`.
pub fn interpolate<V: TemplateValues + ?Sized>(template: &str, values: &V) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }
    PLACEHOLDER_PATTERN
        .replace_all(template, |captures: &Captures| {
            values
                .lookup(captures[1].trim())
                .map(Cow::into_owned)
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_missing_key_becomes_empty() {
        let values = strings(&[("x", "a")]);
        assert_eq!(interpolate("{{x}}-{{y}}", &values), "a-");
    }

    #[test]
    fn test_key_is_trimmed() {
        let values = strings(&[("chat_id", "42")]);
        assert_eq!(interpolate("/chats/{{ chat_id }}/pins", &values), "/chats/42/pins");
    }

    #[test]
    fn test_substitution_is_not_recursive() {
        let values = strings(&[("a", "{{b}}"), ("b", "nope")]);
        assert_eq!(interpolate("x{{a}}y", &values), "x{{b}}y");
    }

    #[test]
    fn test_idempotent_without_nested_placeholders() {
        let values = strings(&[("name", "bob")]);
        let once = interpolate("hi {{name}} {{other}}", &values);
        let twice = interpolate(&once, &values);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_template_without_placeholders_is_unchanged() {
        let values = strings(&[]);
        assert_eq!(interpolate("plain text }}{{", &values), "plain text }}{{");
    }

    #[test]
    fn test_json_values_render() {
        let values = json!({"n": 3, "flag": false, "list": ["a", "b"], "none": null});
        let values = values.as_object().unwrap();
        assert_eq!(
            interpolate("{{n}}|{{flag}}|{{list}}|{{none}}", values),
            r#"3|false|["a","b"]|"#
        );
    }

    #[test]
    fn test_dotted_path_lookup() {
        let values = json!({
            "response": {"ok": true, "result": {"message_id": 67890, "items": [{"id": "p1"}]}}
        });
        let values = values.as_object().unwrap();
        assert_eq!(
            interpolate("Message ID: {{response.result.message_id}}", values),
            "Message ID: 67890"
        );
        assert_eq!(interpolate("{{response.result.items.0.id}}", values), "p1");
        assert_eq!(interpolate("{{response.result.missing}}", values), "");
    }

    #[test]
    fn test_exact_dotted_key_wins() {
        let values = json!({"a.b": "flat", "a": {"b": "nested"}});
        assert_eq!(interpolate("{{a.b}}", values.as_object().unwrap()), "flat");
    }
}
