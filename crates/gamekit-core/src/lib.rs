//! # gamekit-core
//!
//! Function descriptors, `{{placeholder}}` interpolation, the HTTP transport
//! seam and the invocation engine shared by every gamekit crate.

pub mod error;
pub mod event;
pub mod function;
pub mod invoke;
pub mod mock;
pub mod template;
pub mod transport;

pub use error::{GameError, Result};
pub use event::{Event, EventBus};
pub use function::{
    ArgType, ArgumentDescriptor, FunctionBuilder, FunctionDescriptor, PayloadField,
    RequestTemplate,
};
pub use invoke::{InvocationResult, Invoker};
pub use template::{TemplateValues, interpolate};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
