use std::{
    any::TypeId,
    future::{Future, ready},
    ops::{Deref, DerefMut},
    pin::Pin,
};

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Deserializer;

use crate::{
    Descriptor, HandlerError, Outcome, ParamDecl, RequestContext, ResponseSink, SignatureError,
    shape,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Everything a handler's parameters can be extracted from.
pub struct CallArgs {
    sink: ResponseSink,
    cx: RequestContext,
    body: Bytes,
}
impl CallArgs {
    pub(crate) fn new(sink: ResponseSink, cx: RequestContext, body: Bytes) -> Self {
        Self { sink, cx, body }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A type that can appear as a handler parameter.
///
/// Implemented for [`ResponseSink`], [`RequestContext`] and [`Json<T>`].
pub trait Param: Sized + Send + 'static + sealed::Sealed {
    fn decl() -> ParamDecl;
    fn extract(args: &mut CallArgs) -> Result<Self, serde_json::Error>;
}

impl sealed::Sealed for ResponseSink {}
impl Param for ResponseSink {
    fn decl() -> ParamDecl {
        ParamDecl::ResponseSink
    }
    fn extract(args: &mut CallArgs) -> Result<Self, serde_json::Error> {
        Ok(args.sink.clone())
    }
}

impl sealed::Sealed for RequestContext {}
impl Param for RequestContext {
    fn decl() -> ParamDecl {
        ParamDecl::RequestContext
    }
    fn extract(args: &mut CallArgs) -> Result<Self, serde_json::Error> {
        Ok(args.cx.clone())
    }
}

/// Handler input decoded from the JSON request body.
///
/// `T` must be a struct with named fields, or a `Box` of one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}
impl<T> Deref for Json<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}
impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> sealed::Sealed for Json<T> {}
impl<T> Param for Json<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn decl() -> ParamDecl {
        ParamDecl::Input(shape::probe::<T>)
    }
    fn extract(args: &mut CallArgs) -> Result<Self, serde_json::Error> {
        decode(&args.body).map(Json)
    }
}

/// Decodes the first JSON value of `body`; bytes after it are ignored.
fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    match Deserializer::from_slice(body).into_iter::<T>().next() {
        Some(value) => value,
        None => serde_json::from_slice(body),
    }
}

/// Return type of a handler function.
///
/// Implemented for `Result<T, E>` where `E` is a [`HandlerError`]. `T = ()`
/// declares a handler without data output.
pub trait HandlerReturn: Send + 'static {
    fn produces_output() -> bool;
    fn into_outcome(self) -> Outcome;
}

impl<T, E> HandlerReturn for Result<T, E>
where
    T: Serialize + Send + 'static,
    E: HandlerError,
{
    fn produces_output() -> bool {
        TypeId::of::<T>() != TypeId::of::<()>()
    }
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(_) if !Self::produces_output() => Outcome::Succeeded(None),
            Ok(value) => match serde_json::value::to_raw_value(&value) {
                Ok(data) => Outcome::Succeeded(Some(data)),
                Err(e) => Outcome::EncodeFailed(e),
            },
            Err(e) => Outcome::Failed(e.into_error()),
        }
    }
}

/// An async function that can be adapted into a [`JsonHandler`](crate::JsonHandler).
///
/// `Args` is the tuple of parameter types. Implemented for functions taking up
/// to three [`Param`]s and returning a future of a [`HandlerReturn`].
pub trait HandlerFn<Args>: Send + Sync + 'static {
    fn descriptor() -> Result<Descriptor, SignatureError>;
    fn call(&self, args: CallArgs) -> BoxFuture<'static, Outcome>;
}

macro_rules! impl_handler_fn {
    ($($param:ident),*) => {
        impl<F, Fut, R, $($param,)*> HandlerFn<($($param,)*)> for F
        where
            F: Fn($($param),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: HandlerReturn,
            $($param: Param,)*
        {
            fn descriptor() -> Result<Descriptor, SignatureError> {
                Descriptor::build(&[$(<$param as Param>::decl(),)*], R::produces_output())
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn call(&self, mut args: CallArgs) -> BoxFuture<'static, Outcome> {
                $(
                    let $param = match <$param as Param>::extract(&mut args) {
                        Ok(p) => p,
                        Err(e) => return Box::pin(ready(Outcome::DecodeFailed(e))),
                    };
                )*
                let fut = self($($param),*);
                Box::pin(async move { fut.await.into_outcome() })
            }
        }
    };
}

impl_handler_fn!();
impl_handler_fn!(P1);
impl_handler_fn!(P1, P2);
impl_handler_fn!(P1, P2, P3);
