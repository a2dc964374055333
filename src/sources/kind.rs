//! The closed set of source kinds.

use std::fmt;
use std::str::FromStr;

/// What sort of input a source reads from.
///
/// The kind is a diagnostic tag only. Precedence comes from registration
/// order, never from the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Defaults compiled into the binary.
    Default,
    /// A file on the local filesystem.
    File,
    /// Process environment variables.
    Env,
    /// Command-line flags.
    Flag,
    /// An in-memory struct.
    Struct,
}

impl SourceKind {
    /// Every known kind.
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Default,
        SourceKind::File,
        SourceKind::Env,
        SourceKind::Flag,
        SourceKind::Struct,
    ];

    /// The label used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::File => "file",
            Self::Env => "env",
            Self::Flag => "pflag",
            Self::Struct => "struct",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A kind label that is not one of [`SourceKind::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid source kind: {0}")]
pub struct UnknownSourceKind(pub String);

impl FromStr for SourceKind {
    type Err = UnknownSourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownSourceKind(s.to_string()))
    }
}
