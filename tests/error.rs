use std::{
    fmt::{self, Display},
    io,
};

use jsonh::{CodeError, Coder, Error, Result, bail, bail_code};

#[derive(Debug)]
struct DetailedError;

impl std::error::Error for DetailedError {}

impl Display for DetailedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DetailedError")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("limit {0} reached")]
struct LimitError(u32);

impl Coder for LimitError {
    fn code(&self) -> i64 {
        1200 + i64::from(self.0)
    }
}

#[test]
fn from_std_error_is_plain() {
    let e = Error::from(DetailedError);
    assert!(!e.is_coded());
    assert_eq!(e.code(), None);
    assert_eq!(e.to_string(), "DetailedError");
    assert!(e.is::<DetailedError>());
}

#[test]
fn question_mark_keeps_source() {
    fn f() -> Result<()> {
        Err::<(), _>(io::Error::new(io::ErrorKind::NotFound, "gone"))?;
        Ok(())
    }
    let e = f().unwrap_err();
    assert!(!e.is_coded());
    assert_eq!(
        e.downcast_ref::<io::Error>().map(|e| e.kind()),
        Some(io::ErrorKind::NotFound)
    );
}

#[test]
fn new_is_coded() {
    let e = Error::new(1000, "err b");
    assert!(e.is_coded());
    assert_eq!(e.code(), Some(1000));
    assert_eq!(e.to_string(), "err b");
    assert_eq!(
        e.downcast_ref::<CodeError>(),
        Some(&CodeError::new(1000, "err b"))
    );
}

#[test]
fn code_error_stays_coded_through_from() {
    fn f() -> Result<()> {
        Err::<(), _>(CodeError::new(7, "seven"))?;
        Ok(())
    }
    let e = f().unwrap_err();
    assert_eq!(e.code(), Some(7));
    assert_eq!(e.to_string(), "seven");
}

#[test]
fn custom_coder() {
    let e = Error::coded(LimitError(3));
    assert_eq!(e.code(), Some(1203));
    assert_eq!(e.to_string(), "limit 3 reached");
    assert_eq!(e.coder().map(|c| c.code()), Some(1203));

    let e = Error::from(LimitError(3));
    assert_eq!(e.code(), None);
}

#[test]
fn downcast_by_value() {
    let e = Error::coded(LimitError(1));
    let e = e.downcast::<DetailedError>().unwrap_err();
    assert!(e.is_coded());
    let source = e.downcast::<LimitError>().unwrap();
    assert_eq!(source.0, 1);

    let e = Error::from(DetailedError);
    assert!(e.downcast::<DetailedError>().is_ok());
}

#[test]
fn msg_is_plain() {
    let e = Error::msg(format_args!("x = {}", 1));
    assert!(!e.is_coded());
    assert_eq!(e.to_string(), "x = 1");
}

#[test]
fn bail_macros() {
    fn plain(x: i32) -> Result<i32> {
        if x < 0 {
            bail!("negative: {x}");
        }
        Ok(x)
    }
    fn coded(x: i32) -> Result<i32> {
        if x < 0 {
            bail_code!(1001, "negative: {}", x);
        }
        Ok(x)
    }
    assert_eq!(plain(1).unwrap(), 1);
    let e = plain(-1).unwrap_err();
    assert_eq!(e.code(), None);
    assert_eq!(e.to_string(), "negative: -1");

    let e = coded(-2).unwrap_err();
    assert_eq!(e.code(), Some(1001));
    assert_eq!(e.to_string(), "negative: -2");
}

#[test]
fn debug_shows_code() {
    let e = Error::new(5, "five");
    let s = format!("{e:?}");
    assert!(s.contains("code: 5"), "{s}");
    let s = format!("{:?}", Error::from(DetailedError));
    assert!(!s.contains("code"), "{s}");
    assert!(s.contains("DetailedError"), "{s}");
}

#[test]
fn handler_error_classifies_by_capability() {
    use jsonh::HandlerError;

    let e = LimitError(2).into_error();
    assert_eq!(e.code(), Some(1202));
    assert!(e.is::<LimitError>());

    let e = Error::msg("plain").into_error();
    assert_eq!(e.code(), None);
}
