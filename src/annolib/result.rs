use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
};
use tracing::warn;

/// Everything that can go wrong while annotating, i.e., reading, decoding, encoding or writing.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct AnError {
    msg: String,
}
impl AnError {
    pub fn new(msg: &str) -> AnError {
        AnError {
            msg: msg.to_string(),
        }
    }
    pub fn msg(&self) -> &str {
        &self.msg
    }
}
impl Display for AnError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}
impl Error for AnError {}
/// Result type with [`AnError`](AnError) as error type.
pub type AnResult<U> = Result<U, AnError>;

pub fn trace_ok_warn<T, E>(x: Result<T, E>) -> Option<T>
where
    E: Debug,
{
    match x {
        Ok(x) => Some(x),
        Err(e) => {
            warn!("{e:?}");
            None
        }
    }
}

/// Creates an [`AnError`](AnError) with a formatted message.
/// ```rust
/// # use std::error::Error;
/// use annolib::{anerr, result::AnError};
/// # fn main() -> Result<(), Box<dyn Error>> {
/// assert_eq!(anerr!("some error {}", 1), AnError::new(format!("some error {}", 1).as_str()));
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! anerr {
    ($s:literal) => {
        $crate::result::AnError::new(format!($s).as_str())
    };
    ($s:literal, $( $exps:expr ),*) => {
        $crate::result::AnError::new(format!($s, $($exps,)*).as_str())
    }
}

pub fn to_an<E: Debug>(e: E) -> AnError {
    anerr!(
        "original error type is '{:?}', error message is '{:?}'",
        std::any::type_name::<E>(),
        e
    )
}

#[test]
fn test_to_an() {
    let e = to_an(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
    assert!(e.msg().contains("std::io::error::Error"));
    assert!(e.msg().contains("gone"));
    assert_eq!(format!("{e}"), e.msg());
}

#[test]
fn test_trace_ok_warn() {
    assert_eq!(trace_ok_warn::<_, AnError>(Ok(3)), Some(3));
    assert_eq!(trace_ok_warn::<u8, _>(Err(anerr!("nope"))), None);
}
