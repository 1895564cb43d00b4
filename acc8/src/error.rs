//! Result and errors.
use std::fmt::{self, Display, Formatter};

pub type Acc8Result<T> = std::result::Result<T, Acc8Error>;

#[derive(Debug)]
pub enum Acc8Error {
    /// VM error during interpreter loop.
    Runtime(&'static str),
    /// Attempt to load an image that isn't exactly the size of memory.
    ImageSize(usize),
    /// Program didn't halt within the configured number of steps.
    StepLimit(usize),
    Fmt(fmt::Error),
}

impl Display for Acc8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime(msg) => write!(f, "runtime error: {}", msg),
            Self::ImageSize(size) => write!(
                f,
                "image must be exactly {} bytes, got {}",
                acc8_core::IMAGE_SIZE,
                size
            ),
            Self::StepLimit(limit) => write!(f, "program did not halt within {} steps", limit),
            Self::Fmt(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Acc8Error {}

impl From<fmt::Error> for Acc8Error {
    fn from(err: fmt::Error) -> Self {
        Acc8Error::Fmt(err)
    }
}
