//! # jsonh
//!
//! Turn plain async functions into JSON request handlers.
//!
//! A handler function takes, in this order and each optionally, a
//! [`ResponseSink`], a [`RequestContext`] and a [`Json<T>`] input record, and
//! returns `Result<T, E>` where `E` is [`Error`] or an error type that
//! implements [`Coder`]. [`JsonHandler`] checks the function's shape once, at
//! registration, and then answers every request with a `{"code", "msg", "data"}`
//! envelope:
//!
//! | outcome                                  | status | body                                      |
//! |------------------------------------------|--------|-------------------------------------------|
//! | `Ok(data)`                               | 200    | `{"code":200,"msg":"success","data":...}` |
//! | `Ok(())`                                 | 200    | `{"code":200,"msg":"success"}`            |
//! | `Err` with a code ([`Coder`])            | 400    | `{"code":<code>,"msg":<message>}`         |
//! | `Err` without a code                     | 500    | `{"code":500,"msg":"system error"}`       |
//! | body does not decode into the input      | 422    | `{"code":422,"msg":"input error"}`        |
//!
//! ```rust
//! use bytes::Bytes;
//! use http::Request;
//! use jsonh::{Json, JsonHandler, Result};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct Greet {
//!     greet: String,
//! }
//!
//! #[derive(Serialize)]
//! struct GreetResponse {
//!     reply: String,
//! }
//!
//! async fn greet(Json(g): Json<Greet>) -> Result<GreetResponse> {
//!     Ok(GreetResponse {
//!         reply: format!("Thx for {:?}", g.greet),
//!     })
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let handler = JsonHandler::new(greet)?;
//! let request = Request::post("/greet").body(Bytes::from(r#"{"greet":"hello"}"#))?;
//! let response = handler.call(request).await;
//! assert_eq!(response.status(), 200);
//! assert_eq!(
//!     response.body(),
//!     r#"{"code":200,"msg":"success","data":{"reply":"Thx for \"hello\""}}"#
//! );
//! # Ok(())
//! # }
//! ```

use std::{any::type_name, fmt, sync::Arc};

use bytes::Bytes;
use http::{
    HeaderValue, Request, Response,
    header::{CONTENT_TYPE, HeaderMap},
};

mod context;
mod descriptor;
mod error;
mod handler;
pub mod normalize;
mod response;
mod shape;
mod utils;

pub use context::*;
pub use descriptor::*;
pub use error::*;
pub use handler::*;
pub use normalize::ErrorFn;
pub use response::*;

use response::map_outcome;

/// Per-handler configuration.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    /// Name used in log events. Defaults to the handler function's type name.
    pub name: Option<String>,
    /// Applied to handler errors before they are classified.
    pub normalizer: Option<ErrorFn>,
}
impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("name", &self.name)
            .field("normalizer", &self.normalizer.is_some())
            .finish()
    }
}

type Thunk = Box<dyn Fn(CallArgs) -> BoxFuture<'static, Outcome> + Send + Sync>;

struct RawHandler {
    name: String,
    descriptor: Descriptor,
    thunk: Thunk,
    normalizer: Option<ErrorFn>,
}

/// A function adapted into a JSON request handler.
///
/// Cheap to clone; clones share the same function and descriptor.
#[derive(Clone)]
pub struct JsonHandler(Arc<RawHandler>);

impl JsonHandler {
    /// Adapts `f`, failing if its parameters are out of order, repeated, or
    /// its input is not a record.
    pub fn new<F, Args>(f: F) -> Result<Self, SignatureError>
    where
        F: HandlerFn<Args>,
    {
        Self::with_options(f, HandlerOptions::default())
    }

    pub fn with_normalizer<F, Args>(
        f: F,
        normalizer: impl Fn(Error) -> Error + Send + Sync + 'static,
    ) -> Result<Self, SignatureError>
    where
        F: HandlerFn<Args>,
    {
        Self::with_options(
            f,
            HandlerOptions {
                normalizer: Some(Arc::new(normalizer)),
                ..HandlerOptions::default()
            },
        )
    }

    pub fn with_options<F, Args>(f: F, options: HandlerOptions) -> Result<Self, SignatureError>
    where
        F: HandlerFn<Args>,
    {
        let name = options
            .name
            .unwrap_or_else(|| type_name::<F>().to_string());
        let descriptor = match F::descriptor() {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::error!(handler = %name, error = %e, "unsupported handler signature");
                return Err(e);
            }
        };
        tracing::debug!(handler = %name, ?descriptor, "handler registered");
        Ok(Self(Arc::new(RawHandler {
            name,
            descriptor,
            thunk: Box::new(move |args| <F as HandlerFn<Args>>::call(&f, args)),
            normalizer: options.normalizer,
        })))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }
    pub fn descriptor(&self) -> &Descriptor {
        &self.0.descriptor
    }

    /// Handles one request. Always produces a complete JSON response.
    pub async fn call(&self, request: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();
        let sink = ResponseSink::new();
        let args = CallArgs::new(sink.clone(), RequestContext::new(parts), body);
        let outcome = (self.0.thunk)(args).await;
        let (status, body) = map_outcome(outcome, self.0.normalizer.as_ref(), &self.0.name);

        let mut response = Response::new(body);
        *response.status_mut() = status;
        set_headers(response.headers_mut(), sink.take_headers());
        response
    }
}

fn set_headers(headers: &mut HeaderMap, extra: HeaderMap) {
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.extend(extra);
}

impl fmt::Debug for JsonHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonHandler")
            .field("name", &self.0.name)
            .field("descriptor", &self.0.descriptor)
            .finish()
    }
}
