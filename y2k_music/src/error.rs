// Error type for configuration, encoding, and file output.
//
// The composition pipeline itself cannot fail once a configuration has been
// validated; errors only arise at the edges: an empty or unknown style
// selection, an event that cannot be represented in a MIDI file, or I/O.

use std::fmt;
use std::io;

/// Everything that can go wrong around a generation call.
#[derive(Debug)]
pub enum Error {
    /// The configuration selected no styles.
    EmptyStyleList,
    /// A selected style name is not in the store.
    UnknownStyle(String),
    /// An event cannot be encoded without producing malformed bytes.
    DataIntegrity(String),
    Io(io::Error),
    Json(serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyStyleList => write!(f, "at least one style must be selected"),
            Error::UnknownStyle(name) => write!(f, "unknown style '{name}'"),
            Error::DataIntegrity(msg) => write!(f, "data integrity error: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "config error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
