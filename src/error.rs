use std::fmt;

/// Result type for config layering
pub type Result<T> = std::result::Result<T, Error>;

/// An error that occurred while layering a config file onto a [`Store`](crate::Store)
///
/// Building a store and reading flags from it never fails; only the
/// TOML config layer has an error channel.
#[derive(Debug)]
pub enum Error {
    /// Required config file is missing
    MissingConfig { path: String },

    /// TOML parsing error
    Toml(stoml::Error),

    /// IO error
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingConfig { path } => {
                write!(f, "required config file '{}' not found", path)
            }
            Error::Toml(e) => write!(f, "TOML error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Toml(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::MissingConfig { .. } => None,
        }
    }
}

impl From<stoml::Error> for Error {
    fn from(e: stoml::Error) -> Self {
        Error::Toml(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl Error {
    /// Returns true if the error is a missing config file
    pub fn is_missing_config(&self) -> bool {
        matches!(self, Error::MissingConfig { .. })
    }

    /// Print the error to stderr and exit with status 1
    pub fn exit(&self) -> ! {
        eprintln!("error: {}", self);
        std::process::exit(1);
    }
}
