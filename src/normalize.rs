//! Error normalizers.
//!
//! A normalizer runs on a handler's error before it is classified, so errors
//! of foreign types can be turned into coded errors. It is never applied to
//! request body decode failures.

use std::{error::Error as StdError, sync::Arc};

use crate::{Coder, Error};

/// Transform applied to a handler's error before it is classified.
pub type ErrorFn = Arc<dyn Fn(Error) -> Error + Send + Sync>;

pub(crate) fn apply(normalizer: Option<&ErrorFn>, e: Error) -> Error {
    match normalizer {
        Some(f) => f(e),
        None => e,
    }
}

/// Status reported by a remote call, with a numeric code and a message.
///
/// Implement this for the status type of the RPC framework in use.
pub trait RemoteStatus {
    fn status_code(&self) -> i64;
    fn status_message(&self) -> &str;
}

/// Treats errors whose source is an `E` as coded.
///
/// Errors converted with `?` lose their `Coder` capability. This restores it
/// for one concrete type.
pub fn coded<E>() -> ErrorFn
where
    E: StdError + Coder + Send + Sync + 'static,
{
    Arc::new(|e: Error| {
        if e.is_coded() {
            return e;
        }
        match e.downcast::<E>() {
            Ok(source) => Error::coded(source),
            Err(e) => e,
        }
    })
}

/// Reports remote statuses of type `S` with their code and message.
///
/// Errors of other types are returned unchanged.
pub fn status<S>() -> ErrorFn
where
    S: StdError + RemoteStatus + Send + Sync + 'static,
{
    Arc::new(|e: Error| match e.downcast_ref::<S>() {
        Some(s) => Error::new(s.status_code(), s.status_message()),
        None => e,
    })
}

/// Applies `first`, then `second`.
pub fn chain(first: ErrorFn, second: ErrorFn) -> ErrorFn {
    Arc::new(move |e: Error| second(first(e)))
}
