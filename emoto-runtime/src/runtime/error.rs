use std::{error, fmt, io};

#[derive(Debug)]
pub enum Error {
    /// Configuration is invalid or could not be read.
    Config(String),
    /// A background task or the input reader could not be started.
    Startup(String),
    /// A background task did not terminate cleanly.
    Join(String),
    /// Terminal or device I/O failure.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "configuration error: {}", e),
            Error::Startup(e) => write!(f, "startup error: {}", e),
            Error::Join(e) => write!(f, "task join error: {}", e),
            Error::Io(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Io(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Error::Config(value.to_string())
    }
}
