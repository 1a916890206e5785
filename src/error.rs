use std::fmt::{self, Debug, Display};
use std::io;

/// Provides `EpiError` and maps to other errors to
/// convert to an `EpiError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum EpiError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CSVError(csv::Error),
    /// The designated root is not a node of the graph and isolated roots are not allowed.
    UnknownRootNode(String),
    ConfigError(String),
    ReportError(String),
    CommandError(String),
    EpiError(String),
}

impl From<io::Error> for EpiError {
    fn from(error: io::Error) -> Self {
        EpiError::IoError(error)
    }
}

impl From<serde_json::Error> for EpiError {
    fn from(error: serde_json::Error) -> Self {
        EpiError::JsonError(error)
    }
}

impl From<csv::Error> for EpiError {
    fn from(error: csv::Error) -> Self {
        EpiError::CSVError(error)
    }
}

impl From<String> for EpiError {
    fn from(error: String) -> Self {
        EpiError::EpiError(error)
    }
}

impl From<&str> for EpiError {
    fn from(error: &str) -> Self {
        EpiError::EpiError(error.to_string())
    }
}

impl std::error::Error for EpiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpiError::IoError(e) => Some(e),
            EpiError::JsonError(e) => Some(e),
            EpiError::CSVError(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for EpiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EpiError::UnknownRootNode(root) => {
                write!(f, "Error: root node `{root}` does not appear in the graph")
            }
            EpiError::ConfigError(msg) => write!(f, "Error: invalid configuration: {msg}"),
            EpiError::ReportError(msg) => write!(f, "Error: report: {msg}"),
            EpiError::CommandError(msg) => write!(f, "{msg}"),
            _ => write!(f, "Error: {self:?}"),
        }
    }
}
