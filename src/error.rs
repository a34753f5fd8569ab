// vim: set ai et ts=4 sw=4 sts=4:
use std::error;
use std::fmt;

#[derive(PartialEq, Debug, Clone)]
pub enum Error {
    /// Malformed hints or content at construction time; fatal.
    Config(String),
    /// A solver proved that no placement satisfies the current marks.
    /// Expected and recoverable: inside a trial branch it disproves the
    /// branch's hypothesis.
    Contradiction(String),
}

impl Error {
    pub fn contradiction<S: Into<String>>(msg: S) -> Self {
        Error::Contradiction(msg.into())
    }
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(msg)        => write!(f, "invalid puzzle data: {}", msg),
            Error::Contradiction(msg) => write!(f, "contradiction: {}", msg),
        }
    }
}

impl error::Error for Error {}
