//! Error types for xoopt.
//!
//! This module defines the error type shared by every resolution stage.
//! Each variant maps to a distinct failure mode so callers can decide how to
//! present it; the library itself never prints.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// The main error type for option resolution.
///
/// `XoError` provides specific error variants for different failure modes,
/// making it possible to programmatically handle different error cases.
#[derive(Debug)]
pub enum XoError {
    /// Options are malformed: a bad engine range, an override without
    /// `files`, a value of the wrong shape, or an unreadable settings file.
    ConfigError {
        /// Description of the configuration issue.
        message: String,
        /// The config file path, if applicable.
        path: Option<PathBuf>,
        /// The underlying error.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Two independently specified style settings disagree.
    ConfigConflict {
        /// The linter-side option name (e.g. `semicolon`).
        style_field: &'static str,
        /// The linter-side value, rendered for display.
        style_value: String,
        /// The formatter-side option name (e.g. `semi`).
        formatter_field: &'static str,
        /// The formatter-side value, rendered for display.
        formatter_value: String,
    },

    /// A shareable config or plugin could not be located.
    ModuleNotFound {
        /// The module name that was looked up.
        name: String,
        /// The directory resolution started from.
        cwd: PathBuf,
    },

    /// An error occurred during file system operations.
    IoError {
        /// The operation being performed.
        operation: String,
        /// The path involved in the error.
        path: Option<PathBuf>,
        /// The underlying IO error.
        source: Option<io::Error>,
    },

    /// A manifest or options file could not be parsed.
    ParseError {
        /// The file that failed to parse.
        file: Option<PathBuf>,
        /// Context about what was being parsed.
        context: String,
        /// The underlying error.
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error indicating an invalid argument or input.
    InvalidInput {
        /// Description of the invalid input.
        message: String,
        /// The argument or value that was invalid.
        argument: Option<String>,
    },
}

impl XoError {
    /// Creates a new `ConfigError` with the given message.
    ///
    /// # Examples
    /// ```
    /// use xoopt_core::error::XoError;
    ///
    /// let err = XoError::config_error("override entry is missing `files`");
    /// assert_eq!(err.name(), "ConfigError");
    /// ```
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Creates a new `ConfigError` with a file path.
    pub fn config_error_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::ConfigError {
            message: message.into(),
            path: Some(path),
            source: None,
        }
    }

    /// Creates a new `ConfigConflict` between a linter option and a formatter option.
    pub fn config_conflict(
        style_field: &'static str,
        style_value: impl fmt::Display,
        formatter_field: &'static str,
        formatter_value: impl fmt::Display,
    ) -> Self {
        Self::ConfigConflict {
            style_field,
            style_value: style_value.to_string(),
            formatter_field,
            formatter_value: formatter_value.to_string(),
        }
    }

    /// Creates a new `ModuleNotFound` error.
    pub fn module_not_found(name: impl Into<String>, cwd: PathBuf) -> Self {
        Self::ModuleNotFound {
            name: name.into(),
            cwd,
        }
    }

    /// Creates a new `IoError` with a path and underlying error.
    pub fn io_error_with_source(
        operation: impl Into<String>,
        path: PathBuf,
        source: io::Error,
    ) -> Self {
        Self::IoError {
            operation: operation.into(),
            path: Some(path),
            source: Some(source),
        }
    }

    /// Creates a new `ParseError` for a file, keeping the underlying error.
    pub fn parse_error_with_file(
        file: PathBuf,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ParseError {
            file: Some(file),
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new `InvalidInput` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            argument: None,
        }
    }

    /// Creates a new `InvalidInput` error with an argument name.
    pub fn invalid_input_with_arg(message: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            argument: Some(argument.into()),
        }
    }

    /// Returns the name of the error variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } => "ConfigError",
            Self::ConfigConflict { .. } => "ConfigConflictError",
            Self::ModuleNotFound { .. } => "ModuleNotFound",
            Self::IoError { .. } => "IoError",
            Self::ParseError { .. } => "ParseError",
            Self::InvalidInput { .. } => "InvalidInput",
        }
    }

    /// Returns suggested recovery actions for the error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigError { path, .. } => {
                let mut s = vec![
                    "Check the option names and value shapes".to_string(),
                    "Make sure every override entry has a `files` pattern".to_string(),
                ];
                match path.as_deref().and_then(|p| p.extension()).and_then(|e| e.to_str()) {
                    Some("toml") => s.push("Ensure the settings file is valid TOML".to_string()),
                    Some("json") => s.push(
                        "Ensure the options key in the manifest holds an object or false"
                            .to_string(),
                    ),
                    _ => {}
                }
                s
            }
            Self::ConfigConflict {
                style_field,
                formatter_field,
                ..
            } => vec![
                format!("Remove `{style_field}` or `{formatter_field}` so only one source sets it"),
                format!("Set `{style_field}` and `{formatter_field}` to agreeing values"),
            ],
            Self::ModuleNotFound { name, .. } => vec![
                format!("Install `{name}` in the project"),
                "Check the spelling of the `extends` entry".to_string(),
            ],
            Self::IoError { operation, .. } => {
                let mut s = vec![
                    "Check that the path exists and is accessible".to_string(),
                    "Verify you have the necessary permissions".to_string(),
                ];
                if operation.contains("read") {
                    s.push("Ensure the file is not locked by another process".to_string());
                }
                s
            }
            Self::ParseError { .. } => vec![
                "Ensure the file is valid JSON".to_string(),
                "Check for trailing commas or comments".to_string(),
            ],
            Self::InvalidInput { .. } => vec![
                "Review the command-line arguments".to_string(),
                "Verify all required arguments are provided".to_string(),
            ],
        }
    }
}

impl fmt::Display for XoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError { message, path, .. } => {
                if let Some(p) = path {
                    write!(f, "Configuration error in '{}': {}", p.display(), message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            Self::ConfigConflict {
                style_field,
                style_value,
                formatter_field,
                formatter_value,
            } => write!(
                f,
                "Configuration conflict: the formatter option `{}` is {} while `{}` is {}",
                formatter_field, formatter_value, style_field, style_value
            ),
            Self::ModuleNotFound { name, cwd } => {
                write!(
                    f,
                    "Couldn't find module '{}' from '{}'",
                    name,
                    cwd.display()
                )
            }
            Self::IoError {
                operation, path, ..
            } => {
                if let Some(p) = path {
                    write!(
                        f,
                        "IO error during '{}' at '{}': operation failed",
                        operation,
                        p.display()
                    )
                } else {
                    write!(f, "IO error during '{}': operation failed", operation)
                }
            }
            Self::ParseError { file, context, .. } => {
                if let Some(file) = file {
                    write!(f, "Parse error in '{}': {}", file.display(), context)
                } else {
                    write!(f, "Parse error: {}", context)
                }
            }
            Self::InvalidInput { message, argument } => {
                if let Some(arg) = argument {
                    write!(f, "Invalid input '{}': {}", arg, message)
                } else {
                    write!(f, "Invalid input: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for XoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigError { source, .. } => source.as_ref().map(|s| s.as_ref() as _),
            Self::ParseError { source, .. } => source.as_ref().map(|s| s.as_ref() as _),
            Self::IoError { source, .. } => source.as_ref().map(|e| e as _),
            Self::ConfigConflict { .. } | Self::ModuleNotFound { .. } | Self::InvalidInput { .. } => {
                None
            }
        }
    }
}

impl From<io::Error> for XoError {
    fn from(err: io::Error) -> Self {
        Self::IoError {
            operation: "file operation".to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<toml::de::Error> for XoError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for XoError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError {
            message: format!("Invalid options: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<globset::Error> for XoError {
    fn from(err: globset::Error) -> Self {
        Self::ConfigError {
            message: format!("Invalid override pattern: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<semver::Error> for XoError {
    fn from(err: semver::Error) -> Self {
        Self::ConfigError {
            message: format!("Invalid version range: {}", err),
            path: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for XoError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::ParseError {
            file: None,
            context: format!("Failed to parse/serialize YAML: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<walkdir::Error> for XoError {
    fn from(err: walkdir::Error) -> Self {
        Self::IoError {
            operation: "directory traversal".to_string(),
            path: err.path().map(PathBuf::from),
            source: None,
        }
    }
}

/// A type alias for `Result<T, XoError>`.
pub type Result<T> = std::result::Result<T, XoError>;
