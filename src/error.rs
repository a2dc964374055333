//! Error types for layered-config.

use crate::core::Interrupted;
use crate::sources::{FileType, SourceKind, UnknownSourceKind};
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for layered-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors returned by the configuration manager.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A builder option could not be applied.
    #[error("failed to apply option {index}: {source}")]
    Option {
        /// Position of the option in registration order
        index: usize,
        /// What went wrong
        #[source]
        source: OptionError,
    },

    /// A registered source reported a kind outside the known set.
    #[error("invalid source kind for source {index}: {source}")]
    InvalidSourceKind {
        /// Position of the source in precedence order
        index: usize,
        /// The rejected kind label
        #[source]
        source: UnknownSourceKind,
    },

    /// The initial model could not be captured as the base layer.
    #[error("failed to serialize initial config model: {0}")]
    Model(#[source] config::ConfigError),

    /// A source failed while loading into the namespace.
    #[error("failed to load config from source {index} (kind={kind}): {source}")]
    SourceLoad {
        /// Position of the source in precedence order
        index: usize,
        /// Kind of the failing source
        kind: SourceKind,
        /// Underlying cause
        #[source]
        source: SourceError,
    },

    /// The load context was cancelled or ran past its deadline between stages.
    #[error("configuration load interrupted before {stage}: {source}")]
    Interrupted {
        /// The stage that was about to run
        stage: LoadStage,
        /// Cancellation or deadline
        #[source]
        source: Interrupted,
    },

    /// The namespace could not be decoded into the model.
    #[error("failed to unmarshal config: {0}")]
    Unmarshal(#[source] NamespaceError),

    /// The model rejected its own contents.
    #[error("failed to validate config model: {0}")]
    Validation(#[from] ValidationError),

    /// A direct `set` failed.
    #[error("failed to set '{key}': {source}")]
    Set {
        /// The key being set
        key: String,
        /// Underlying cause
        #[source]
        source: NamespaceError,
    },
}

impl ConfigError {
    /// Returns true if the error was caused by cancellation or an expired deadline,
    /// whether the manager or a source noticed it.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Interrupted { .. } => true,
            Self::SourceLoad { source, .. } => source.interruption().is_some(),
            _ => false,
        }
    }
}

/// The point in the load pipeline an interruption was detected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// Before a source ran.
    Source {
        /// Position of the source in precedence order
        index: usize,
        /// Kind of the source
        kind: SourceKind,
    },
    /// Before the namespace was decoded into the model.
    Unmarshal,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source { index, kind } => write!(f, "source {} (kind={})", index, kind),
            Self::Unmarshal => write!(f, "unmarshal"),
        }
    }
}

/// Errors raised while applying builder options.
#[derive(Debug, thiserror::Error)]
pub enum OptionError {
    /// A source constructor failed.
    #[error("failed to create source {index}: {source}")]
    Source {
        /// Position of the source within the option
        index: usize,
        /// Underlying cause
        #[source]
        source: SourceError,
    },

    /// The key delimiter was empty.
    #[error("key delimiter must not be empty")]
    EmptyDelimiter,

    /// The load timeout was zero.
    #[error("load timeout must be greater than zero (got {0:?})")]
    ZeroTimeout(Duration),
}

/// Errors raised by a single source, at construction or load time.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Reading from disk failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file being read
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Input could not be parsed in the given format.
    #[error("failed to parse {file_type} input: {source}")]
    Parse {
        /// Format the input was parsed as
        file_type: FileType,
        /// Underlying cause
        #[source]
        source: config::ConfigError,
    },

    /// Input bytes were not valid text.
    #[error("{file_type} input is not valid UTF-8: {source}")]
    Encoding {
        /// Format the input was declared as
        file_type: FileType,
        /// Underlying cause
        #[source]
        source: std::str::Utf8Error,
    },

    /// Environment variables could not be collected.
    #[error("failed to read environment variables: {0}")]
    Environment(#[source] config::ConfigError),

    /// A struct could not be turned into a key/value tree.
    #[error("failed to serialize struct: {0}")]
    Serialize(#[source] config::ConfigError),

    /// A command-line flag value could not be read.
    #[error("failed to read flag '{name}': {reason}")]
    Flag {
        /// The flag id
        name: String,
        /// Why reading failed
        reason: String,
    },

    /// Merging the loaded values into the namespace failed.
    #[error("failed to merge into namespace: {0}")]
    Namespace(#[from] NamespaceError),

    /// The load context was cancelled or expired.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    /// Free-form error for custom sources.
    #[error("{0}")]
    Custom(String),

    /// Any other error from a custom source.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl SourceError {
    /// Create a custom source error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Wrap an arbitrary error.
    pub fn other<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Other(Box::new(err))
    }

    /// Returns true if an `io::Error` of the given kind appears anywhere in the error chain.
    pub fn has_io_kind(&self, kind: io::ErrorKind) -> bool {
        // `Other` is transparent, so its own `source()` skips the boxed error.
        let mut current: Option<&(dyn StdError + 'static)> = match self {
            Self::Other(inner) => Some(inner.as_ref()),
            _ => Some(self),
        };
        while let Some(err) = current {
            if let Some(io_err) = err.downcast_ref::<io::Error>() {
                if io_err.kind() == kind {
                    return true;
                }
            }
            current = err.source();
        }
        false
    }

    /// Returns true if the error chain contains a missing-file error.
    pub fn is_not_found(&self) -> bool {
        self.has_io_kind(io::ErrorKind::NotFound)
    }

    /// Returns the interruption behind this error, if any.
    pub fn interruption(&self) -> Option<Interrupted> {
        match self {
            Self::Interrupted(interrupted) => Some(*interrupted),
            _ => None,
        }
    }
}

/// Errors raised by the namespace.
#[derive(Debug, thiserror::Error)]
pub enum NamespaceError {
    /// The key was empty or had an empty segment.
    #[error("invalid key '{0}'")]
    InvalidKey(String),

    /// Strict merge refused to replace a value with one of a different type.
    #[error("strict merge: '{key}' holds {existing}, refusing to overwrite with {incoming}")]
    TypeMismatch {
        /// Full path of the conflicting key
        key: String,
        /// Type of the stored value
        existing: &'static str,
        /// Type of the incoming value
        incoming: &'static str,
    },

    /// A nested key was requested below a scalar value.
    #[error("'{key}' holds {existing}, cannot nest keys below it")]
    NotATable {
        /// Full path of the scalar
        key: String,
        /// Type of the stored value
        existing: &'static str,
    },

    /// Decoding into a typed value failed.
    #[error("{0}")]
    Deserialize(#[source] config::ConfigError),
}

/// Validation error for configuration validation.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific field has an invalid value.
    InvalidField {
        /// The field name/path
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Collapse a list of errors: `None` if empty, the error itself if there is one.
    pub fn from_errors(mut errors: Vec<ValidationError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "field '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}
