use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use uuid::Uuid;

use crate::error::{GameError, Result};
use crate::transport::HttpMethod;

/// Declared type of a function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    String,
    Array,
    Boolean,
    Number,
}

impl ArgType {
    /// Runtime check applied before a call. Only `string` and `array` are
    /// enforced; booleans and numbers are accepted as given.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ArgType::String => value.is_string(),
            ArgType::Array => value.is_array(),
            ArgType::Boolean | ArgType::Number => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Array => "array",
            ArgType::Boolean => "boolean",
            ArgType::Number => "number",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named, typed parameter of a function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub arg_type: ArgType,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, arg_type: ArgType) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            description: description.into(),
            arg_type,
        }
    }
}

/// A single payload entry, classified when the template is built.
///
/// - `Template` strings are interpolated against the named arguments.
/// - `Binding` inserts the raw value of one argument, keeping its JSON type.
/// - `Literal` values are copied verbatim.
///
/// On the wire a binding is written as its `{{arg}}` placeholder. A string
/// made of exactly one placeholder is always a `Binding`, whether it comes
/// from [`PayloadField::template`] or from JSON, so export and import agree.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadField {
    Template(String),
    Binding(String),
    Literal(Value),
}

impl PayloadField {
    pub fn template(template: impl Into<String>) -> Self {
        let template = template.into();
        match sole_placeholder(&template) {
            Some(argument) => PayloadField::Binding(argument.to_string()),
            None => PayloadField::Template(template),
        }
    }

    pub fn binding(argument: impl Into<String>) -> Self {
        PayloadField::Binding(argument.into())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        PayloadField::Literal(value.into())
    }
}

impl From<&str> for PayloadField {
    fn from(template: &str) -> Self {
        PayloadField::template(template)
    }
}

/// `chat_id` for `"{{chat_id}}"` or `"{{ chat_id }}"`; `None` for anything
/// with surrounding text or more than one placeholder.
fn sole_placeholder(template: &str) -> Option<&str> {
    let inner = template.strip_prefix("{{")?.strip_suffix("}}")?;
    if inner.contains("{{") || inner.contains("}}") {
        return None;
    }
    let name = inner.trim();
    (!name.is_empty()).then_some(name)
}

impl Serialize for PayloadField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PayloadField::Template(template) => serializer.serialize_str(template),
            PayloadField::Binding(argument) => {
                serializer.serialize_str(&format!("{{{{{argument}}}}}"))
            }
            PayloadField::Literal(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for PayloadField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(template) => PayloadField::template(template),
            other => PayloadField::Literal(other),
        })
    }
}

/// HTTP request template of a function (the `config` block of the export format).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestTemplate {
    pub method: HttpMethod,
    /// URL with `{{arg}}` placeholders.
    pub url: String,
    /// Header values, interpolated like the URL.
    pub headers: BTreeMap<String, String>,
    /// Body fields. Keys are templates too.
    pub payload: BTreeMap<String, PayloadField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_feedback: Option<String>,
    /// Platform tag, e.g. "telegram" or "discord".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub is_main_loop: bool,
    pub is_reaction: bool,
}

impl RequestTemplate {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, field: impl Into<PayloadField>) -> Self {
        self.payload.insert(key.into(), field.into());
        self
    }

    pub fn on_success(mut self, feedback: impl Into<String>) -> Self {
        self.success_feedback = Some(feedback.into());
        self
    }

    pub fn on_error(mut self, feedback: impl Into<String>) -> Self {
        self.error_feedback = Some(feedback.into());
        self
    }

    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A callable HTTP operation: name, typed arguments and request template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    #[serde(default = "new_id")]
    id: String,
    #[serde(rename = "fn_name")]
    name: String,
    #[serde(rename = "fn_description")]
    description: String,
    #[serde(default)]
    args: Vec<ArgumentDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(default)]
    config: RequestTemplate,
}

impl FunctionDescriptor {
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> FunctionBuilder {
        FunctionBuilder {
            id: None,
            name: name.into(),
            description: description.into(),
            args: Vec::new(),
            config: RequestTemplate::default(),
            hint: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Arguments in positional order.
    pub fn args(&self) -> &[ArgumentDescriptor] {
        &self.args
    }

    pub fn config(&self) -> &RequestTemplate {
        &self.config
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Export shape used by the hosted GAME backend.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Builder for [`FunctionDescriptor`]; `build` rejects duplicate argument names.
#[derive(Debug, Clone)]
pub struct FunctionBuilder {
    id: Option<String>,
    name: String,
    description: String,
    args: Vec<ArgumentDescriptor>,
    config: RequestTemplate,
    hint: Option<String>,
}

impl FunctionBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn arg(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        arg_type: ArgType,
    ) -> Self {
        self.args
            .push(ArgumentDescriptor::new(name, description, arg_type));
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn request(mut self, config: RequestTemplate) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<FunctionDescriptor> {
        let mut seen = HashSet::new();
        for arg in &self.args {
            if !seen.insert(arg.name.as_str()) {
                return Err(GameError::DuplicateArgument {
                    function: self.name.clone(),
                    argument: arg.name.clone(),
                });
            }
        }

        Ok(FunctionDescriptor {
            id: self.id.unwrap_or_else(new_id),
            name: self.name,
            description: self.description,
            args: self.args,
            hint: self.hint,
            config: self.config,
        })
    }
}
