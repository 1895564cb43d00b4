//! Application errors
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
}

impl std::error::Error for AppError {}

#[derive(Debug)]
pub enum ErrorKind {
    Acc8(acc8::prelude::Acc8Error),
    Io(std::io::Error),
    Config(serde_yaml::Error),
    Utf8(std::string::FromUtf8Error),
    /// One or more programs of a batch failed to compile or run.
    Failed(usize),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "application error: {}", self.kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acc8(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Utf8(err) => write!(f, "source is not valid UTF-8: {err}"),
            Self::Failed(count) => write!(f, "{count} program(s) failed"),
        }
    }
}

impl From<acc8::prelude::Acc8Error> for AppError {
    fn from(err: acc8::prelude::Acc8Error) -> Self {
        Self {
            kind: ErrorKind::Acc8(err),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            kind: ErrorKind::Config(err),
        }
    }
}

impl From<std::string::FromUtf8Error> for AppError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self {
            kind: ErrorKind::Utf8(err),
        }
    }
}

impl From<ErrorKind> for AppError {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}
