use std::{
    error::Error as StdError,
    fmt::{self, Debug, Display},
};

use crate::utils::downcast;

/// Capability of errors that carry a client-facing code.
///
/// A handler error whose source implements `Coder` is answered with status 400
/// and `{"code": <code>, "msg": <message>}`. Every other error becomes the fixed
/// `{"code":500,"msg":"system error"}` envelope.
pub trait Coder {
    fn code(&self) -> i64;
}

/// Concrete error with a code and a public message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{msg}")]
pub struct CodeError {
    code: i64,
    msg: String,
}
impl CodeError {
    pub fn new(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
        }
    }
    pub fn message(&self) -> &str {
        &self.msg
    }
}
impl Coder for CodeError {
    fn code(&self) -> i64 {
        self.code
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageError(String);

trait CodedSource: StdError + Send + Sync + 'static {
    fn coder(&self) -> &dyn Coder;
    fn as_std(&self) -> &(dyn StdError + Send + Sync + 'static);
    fn into_std(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static>;
}
impl<E> CodedSource for E
where
    E: StdError + Coder + Send + Sync + 'static,
{
    fn coder(&self) -> &dyn Coder {
        self
    }
    fn as_std(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }
    fn into_std(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }
}

enum Source {
    Plain(Box<dyn StdError + Send + Sync + 'static>),
    Coded(Box<dyn CodedSource>),
}

/// Error returned by handler functions.
///
/// Any `std::error::Error` converts into `Error` with `?` and is treated as an
/// internal failure whose message is never sent to the client.
/// Use [`Error::new`] or [`Error::coded`] for errors that should be reported
/// with their code and message.
pub struct Error {
    source: Source,
}

impl Error {
    /// Creates an error reported to the client as `{"code": code, "msg": msg}`.
    pub fn new(code: i64, msg: impl Into<String>) -> Self {
        Self::coded(CodeError::new(code, msg))
    }

    /// Wraps an error that carries its own code.
    pub fn coded<E>(e: E) -> Self
    where
        E: StdError + Coder + Send + Sync + 'static,
    {
        Self {
            source: Source::Coded(Box::new(e)),
        }
    }

    /// Creates an internal error from a message.
    pub fn msg(msg: impl Display) -> Self {
        Self {
            source: Source::Plain(Box::new(MessageError(msg.to_string()))),
        }
    }

    pub fn coder(&self) -> Option<&dyn Coder> {
        match &self.source {
            Source::Plain(_) => None,
            Source::Coded(e) => Some(e.coder()),
        }
    }
    pub fn code(&self) -> Option<i64> {
        self.coder().map(|c| c.code())
    }
    pub fn is_coded(&self) -> bool {
        matches!(self.source, Source::Coded(_))
    }

    pub fn as_std_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        match &self.source {
            Source::Plain(e) => e.as_ref(),
            Source::Coded(e) => e.as_std(),
        }
    }

    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.as_std_error().is::<E>()
    }
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.as_std_error().downcast_ref::<E>()
    }

    /// Takes the source error out if it is an `E`, otherwise gives `self` back.
    pub fn downcast<E>(self) -> Result<E, Self>
    where
        E: StdError + Send + Sync + 'static,
    {
        match self.source {
            Source::Plain(e) => e.downcast::<E>().map(|e| *e).map_err(|e| Self {
                source: Source::Plain(e),
            }),
            Source::Coded(e) if e.as_std().is::<E>() => {
                e.into_std().downcast::<E>().map(|e| *e).map_err(|e| Self {
                    source: Source::Plain(e),
                })
            }
            source => Err(Self { source }),
        }
    }
}

impl<E> From<E> for Error
where
    E: StdError + Send + Sync + 'static,
{
    fn from(e: E) -> Self {
        match downcast::<CodeError, E>(e) {
            Ok(e) => Self::coded(e),
            Err(e) => Self {
                source: Source::Plain(Box::new(e)),
            },
        }
    }
}

/// Error type a handler function may return.
///
/// Implemented for [`Error`] and for every error type implementing [`Coder`],
/// which is reported with its own code. Other error types convert into
/// [`Error`] with `?` and are reported as internal failures.
pub trait HandlerError: Send + 'static {
    fn into_error(self) -> Error;
}
impl HandlerError for Error {
    fn into_error(self) -> Error {
        self
    }
}
impl<E> HandlerError for E
where
    E: StdError + Coder + Send + Sync + 'static,
{
    fn into_error(self) -> Error {
        Error::coded(self)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self.as_std_error(), f)
    }
}
impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Error");
        if let Some(code) = self.code() {
            d.field("code", &code);
        }
        d.field("source", self.as_std_error()).finish()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns early with an internal error built from a format string.
///
/// The message is logged but never sent to the client.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return ::std::result::Result::Err($crate::Error::msg(::std::format!($($arg)*)))
    };
}

/// Returns early with an error reported to the client with `code`.
#[macro_export]
macro_rules! bail_code {
    ($code:expr, $($arg:tt)*) => {
        return ::std::result::Result::Err($crate::Error::new($code, ::std::format!($($arg)*)))
    };
}
