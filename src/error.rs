use core::fmt::{self, Display, Formatter};
use std::{error, io, path::PathBuf};

use crate::version::ParseError;

/// An error that can occur while running workarounds before a task.
#[derive(Debug)]
pub enum Error {
    /// The platform version or one of the bounds is malformed.
    Parse(ParseError),
    /// Creating or deleting a directory failed.
    Io { path: PathBuf, cause: io::Error },
}

impl Display for Error {
    fn fmt(&self, fmt: &mut Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::Parse(err) => write!(fmt, "{}", err),
            Error::Io { path, cause } => write!(fmt, "{}: {}", path.display(), cause),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Io { cause, .. } => Some(cause),
        }
    }
}

impl From<ParseError> for Error {
    #[inline]
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}
