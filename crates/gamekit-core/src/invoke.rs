use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{GameError, Result};
use crate::event::{Event, EventBus};
use crate::function::{FunctionDescriptor, PayloadField, RequestTemplate};
use crate::template::interpolate;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Classified outcome of one dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    /// 2xx response; holds the response body.
    Success(Value),
    /// Any other status or a transport failure; holds the failure reason.
    Failure(Value),
}

impl InvocationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationResult::Success(_))
    }

    /// Body on success, reason on failure.
    pub fn value(&self) -> &Value {
        match self {
            InvocationResult::Success(body) | InvocationResult::Failure(body) => body,
        }
    }

    /// Turn a failure into `RequestFailed` with the JSON-serialized reason.
    pub fn into_result(self, function: &str) -> Result<Value> {
        match self {
            InvocationResult::Success(body) => Ok(body),
            InvocationResult::Failure(reason) => Err(GameError::RequestFailed {
                function: function.to_string(),
                reason: serde_json::to_string(&reason)?,
            }),
        }
    }
}

/// Validate positional arguments and zip them with their names.
pub fn bind_arguments(function: &FunctionDescriptor, args: &[Value]) -> Result<Map<String, Value>> {
    let params = function.args();
    if args.len() != params.len() {
        return Err(GameError::ArgumentCount {
            function: function.name().to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }

    let mut named = Map::with_capacity(params.len());
    for (param, value) in params.iter().zip(args) {
        if !param.arg_type.accepts(value) {
            return Err(GameError::ArgumentType {
                function: function.name().to_string(),
                argument: param.name.clone(),
                expected: param.arg_type,
            });
        }
        named.insert(param.name.clone(), value.clone());
    }
    Ok(named)
}

/// Build the payload object. Keys are interpolated; an unbound `Binding`
/// renders empty, like a missing template key.
///
/// When two keys interpolate to the same name the later field in key order
/// wins and a warning is logged.
pub fn build_payload(
    fields: &BTreeMap<String, PayloadField>,
    named: &Map<String, Value>,
) -> Map<String, Value> {
    let mut payload = Map::with_capacity(fields.len());
    for (key, field) in fields {
        let value = match field {
            PayloadField::Template(template) => Value::String(interpolate(template, named)),
            PayloadField::Binding(argument) => named
                .get(argument)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
            PayloadField::Literal(value) => value.clone(),
        };
        let name = interpolate(key, named);
        if payload.insert(name.clone(), value).is_some() {
            warn!(key = %key, field = %name, "payload key collision, earlier value replaced");
        }
    }
    payload
}

/// Interpolate URL, headers and payload of a template.
pub fn assemble_request(template: &RequestTemplate, named: &Map<String, Value>) -> HttpRequest {
    let headers = template
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), interpolate(value, named)))
        .collect();
    let payload = build_payload(&template.payload, named);

    HttpRequest {
        method: template.method,
        url: interpolate(&template.url, named),
        headers,
        body: (!payload.is_empty()).then_some(Value::Object(payload)),
    }
}

/// Map a transport outcome onto success or failure.
pub fn classify(outcome: Result<HttpResponse>) -> InvocationResult {
    match outcome {
        Ok(response) if response.is_success() => InvocationResult::Success(response.body),
        Ok(response) => {
            if response.body.is_null() {
                InvocationResult::Failure(Value::String(format!("HTTP {}", response.status)))
            } else {
                InvocationResult::Failure(response.body)
            }
        }
        Err(GameError::Transport { message, body }) => {
            InvocationResult::Failure(body.unwrap_or(Value::String(message)))
        }
        Err(other) => InvocationResult::Failure(Value::String(other.to_string())),
    }
}

/// Runs function descriptors against an HTTP transport.
///
/// Each call is Validate -> Assemble -> Dispatch -> Classify -> Emit, with a
/// single awaited request and no retries. The invoker holds no per-call state,
/// so one instance can serve any number of concurrent calls.
#[derive(Clone)]
pub struct Invoker {
    transport: Arc<dyn HttpTransport>,
    events: Option<EventBus>,
}

impl Invoker {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            events: None,
        }
    }

    /// Publish dispatch and feedback events on `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Invoke and return the response body, or `RequestFailed` on failure.
    pub async fn invoke(&self, function: &FunctionDescriptor, args: &[Value]) -> Result<Value> {
        self.dispatch(function, args)
            .await?
            .into_result(function.name())
    }

    /// Invoke and return the classified outcome. Errors only on invalid arguments.
    pub async fn dispatch(
        &self,
        function: &FunctionDescriptor,
        args: &[Value],
    ) -> Result<InvocationResult> {
        let named = bind_arguments(function, args)?;
        let request = assemble_request(function.config(), &named);

        debug!(
            function = function.name(),
            method = %request.method,
            url = %request.url,
            "dispatching function request"
        );
        self.publish(Event::RequestDispatched {
            function: function.name().to_string(),
            method: request.method,
            url: request.url.clone(),
        });

        let outcome = classify(self.transport.send(request).await);
        self.publish(Event::InvocationCompleted {
            function: function.name().to_string(),
            success: outcome.is_success(),
        });
        self.emit_feedback(function, named, &outcome);

        Ok(outcome)
    }

    /// Invoke once per argument list, in order. A failing call does not stop
    /// the calls after it.
    pub async fn invoke_batch<I>(
        &self,
        function: &FunctionDescriptor,
        calls: I,
    ) -> Vec<Result<Value>>
    where
        I: IntoIterator<Item = Vec<Value>>,
    {
        let mut results = Vec::new();
        for args in calls {
            let result = self.invoke(function, &args).await;
            if let Err(e) = &result {
                warn!(function = function.name(), error = %e, "batch item failed");
            }
            results.push(result);
        }
        results
    }

    fn emit_feedback(
        &self,
        function: &FunctionDescriptor,
        mut values: Map<String, Value>,
        outcome: &InvocationResult,
    ) {
        let config = function.config();
        let (template, is_error) = match outcome {
            InvocationResult::Success(_) => (config.success_feedback.as_deref(), false),
            InvocationResult::Failure(_) => (config.error_feedback.as_deref(), true),
        };
        let Some(template) = template.filter(|t| !t.is_empty()) else {
            return;
        };

        values.insert("response".into(), outcome.value().clone());
        let message = interpolate(template, &values);
        if is_error {
            warn!(function = function.name(), feedback = %message, "function failed");
        } else {
            info!(function = function.name(), feedback = %message, "function succeeded");
        }
        self.publish(Event::Feedback {
            function: function.name().to_string(),
            message,
            is_error,
        });
    }

    fn publish(&self, event: Event) {
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::ArgType;
    use crate::transport::HttpMethod;
    use serde_json::json;

    fn poll() -> FunctionDescriptor {
        FunctionDescriptor::builder("create_poll", "Create a poll")
            .arg("chat_id", "chat", ArgType::String)
            .arg("options", "answers", ArgType::Array)
            .arg("is_anonymous", "anonymous", ArgType::Boolean)
            .request(
                RequestTemplate::new(HttpMethod::Post, "https://api.test/bot/sendPoll")
                    .header("X-Chat", "{{chat_id}}")
                    .field("chat_id", "{{chat_id}}")
                    .field("options", PayloadField::binding("options"))
                    .field("is_anonymous", PayloadField::binding("is_anonymous"))
                    .field("type", PayloadField::literal("regular")),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_bind_arguments_zips_in_order() {
        let named = bind_arguments(&poll(), &[json!("1"), json!(["a"]), json!(true)]).unwrap();
        assert_eq!(named["chat_id"], json!("1"));
        assert_eq!(named["options"], json!(["a"]));
        assert_eq!(named["is_anonymous"], json!(true));
    }

    #[test]
    fn test_bind_arguments_rejects_non_array() {
        let err = bind_arguments(&poll(), &[json!("1"), json!("a,b"), json!(true)]).unwrap_err();
        assert!(matches!(
            err,
            GameError::ArgumentType { ref argument, .. } if argument == "options"
        ));
    }

    #[test]
    fn test_assemble_request_keeps_binding_types() {
        let named =
            bind_arguments(&poll(), &[json!("1"), json!(["a", "b"]), json!(false)]).unwrap();
        let req = assemble_request(poll().config(), &named);
        assert_eq!(req.headers["X-Chat"], "1");
        assert_eq!(
            req.body,
            Some(json!({
                "chat_id": "1",
                "options": ["a", "b"],
                "is_anonymous": false,
                "type": "regular"
            }))
        );
    }

    #[test]
    fn test_payload_key_collision_keeps_one_value() {
        let fields: BTreeMap<String, PayloadField> = [
            ("chat_id".to_string(), PayloadField::template("{{chat_id}}")),
            ("{{media_type}}".to_string(), PayloadField::template("{{media}}")),
        ]
        .into_iter()
        .collect();
        let named = json!({"chat_id": "1", "media_type": "chat_id", "media": "file-9"});
        let payload = build_payload(&fields, named.as_object().unwrap());
        assert_eq!(payload.len(), 1);
        assert_eq!(payload["chat_id"], json!("file-9"));
    }

    #[test]
    fn test_unbound_binding_renders_empty() {
        let fields: BTreeMap<String, PayloadField> =
            [("note".to_string(), PayloadField::binding("missing"))].into_iter().collect();
        let payload = build_payload(&fields, &Map::new());
        assert_eq!(payload["note"], json!(""));
    }

    #[test]
    fn test_empty_payload_sends_no_body() {
        let template = RequestTemplate::new(HttpMethod::Delete, "https://api.test/{{id}}");
        let mut named = Map::new();
        named.insert("id".into(), json!("9"));
        let req = assemble_request(&template, &named);
        assert_eq!(req.url, "https://api.test/9");
        assert!(req.body.is_none());
    }

    #[test]
    fn test_classify() {
        assert!(classify(Ok(HttpResponse::new(201, json!({})))).is_success());
        assert_eq!(
            classify(Ok(HttpResponse::new(500, Value::Null))),
            InvocationResult::Failure(json!("HTTP 500"))
        );
        assert_eq!(
            classify(Err(GameError::transport("timed out"))),
            InvocationResult::Failure(json!("timed out"))
        );
        assert_eq!(
            classify(Err(GameError::Transport {
                message: "bad".into(),
                body: Some(json!({"description": "Bad Request"})),
            })),
            InvocationResult::Failure(json!({"description": "Bad Request"}))
        );
    }

    #[test]
    fn test_into_result_serializes_reason() {
        let err = InvocationResult::Failure(json!({"description": "chat not found"}))
            .into_result("send_message")
            .unwrap_err();
        match err {
            GameError::RequestFailed { function, reason } => {
                assert_eq!(function, "send_message");
                assert_eq!(reason, r#"{"description":"chat not found"}"#);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
