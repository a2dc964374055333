//! Supported file formats and extension-based inference.

use crate::error::SourceError;
use config::{File, FileFormat, Map, Source as _, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A configuration file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileType {
    /// TOML, also the fallback when nothing else matches.
    #[default]
    Toml,
    /// YAML (`.yaml` or `.yml`).
    Yaml,
    /// JSON.
    Json,
}

impl FileType {
    /// Infer the format from a path's extension.
    ///
    /// - `.toml` -> TOML
    /// - `.yaml`, `.yml` -> YAML
    /// - `.json` -> JSON
    ///
    /// Anything else yields `fallback`, or TOML when no fallback is given.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layered_config::sources::FileType;
    ///
    /// assert_eq!(FileType::infer("app.yml", None), FileType::Yaml);
    /// assert_eq!(FileType::infer("app.conf", Some(FileType::Json)), FileType::Json);
    /// assert_eq!(FileType::infer("app", None), FileType::Toml);
    /// ```
    pub fn infer(path: impl AsRef<Path>, fallback: Option<FileType>) -> FileType {
        Self::from_extension(path).unwrap_or(fallback.unwrap_or_default())
    }

    /// The format matching a path's extension, if it is a known one.
    pub fn from_extension(path: impl AsRef<Path>) -> Option<FileType> {
        match path.as_ref().extension()?.to_str()? {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// The lower-case name of the format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Parse text in this format into a nested map.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] if the text is malformed or its root is not a map.
    pub fn parse(&self, text: &str) -> Result<Map<String, Value>, SourceError> {
        File::from_str(text, self.format())
            .collect()
            .map_err(|source| SourceError::Parse {
                file_type: *self,
                source,
            })
    }

    fn format(&self) -> FileFormat {
        match self {
            Self::Toml => FileFormat::Toml,
            Self::Yaml => FileFormat::Yaml,
            Self::Json => FileFormat::Json,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A format name that is not TOML, YAML or JSON.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid config file type: {0}")]
pub struct UnknownFileType(pub String);

impl FromStr for FileType {
    type Err = UnknownFileType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(UnknownFileType(s.to_string())),
        }
    }
}
