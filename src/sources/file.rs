//! File-based configuration source.

use super::{FileType, Source, SourceFactory, SourceKind};
use crate::core::LoadContext;
use crate::error::SourceError;
use crate::namespace::Namespace;
use std::fs;
use std::path::PathBuf;

/// File-based configuration source.
///
/// Loads configuration from TOML, YAML, or JSON files with format detection
/// based on file extension. A missing or unreadable file is a load-time error,
/// so wrap the source in [`Optional`](super::Optional) when the file may be absent.
///
/// # Examples
///
/// ```rust,no_run
/// use layered_config::sources::{FileType, LocalFile};
///
/// let source = LocalFile::new("config/default.yaml");
/// let untyped = LocalFile::new("config/app.conf").with_fallback_type(FileType::Yaml);
/// ```
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
    file_type: Option<FileType>,
    fallback: Option<FileType>,
}

impl LocalFile {
    /// Create a new file source with automatic format detection.
    ///
    /// The format is detected from the file extension:
    /// - `.toml` -> TOML
    /// - `.yaml`, `.yml` -> YAML
    /// - `.json` -> JSON
    ///
    /// Files with any other extension are read as TOML unless a fallback is set.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_type: None,
            fallback: None,
        }
    }

    /// Format to use when the extension is not recognised.
    pub fn with_fallback_type(mut self, file_type: FileType) -> Self {
        self.fallback = Some(file_type);
        self
    }

    /// Skip inference and always read the file as `file_type`.
    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    /// The format the file will be parsed as.
    pub fn file_type(&self) -> FileType {
        self.file_type
            .unwrap_or_else(|| FileType::infer(&self.path, self.fallback))
    }
}

impl SourceFactory for LocalFile {
    fn create(self: Box<Self>) -> Result<Box<dyn Source>, SourceError> {
        let file_type = self.file_type();
        Ok(Box::new(FileSource {
            path: self.path,
            file_type,
        }))
    }
}

struct FileSource {
    path: PathBuf,
    file_type: FileType,
}

impl Source for FileSource {
    fn kind(&self) -> &str {
        SourceKind::File.as_str()
    }

    fn load(&self, ctx: &LoadContext, ns: &mut Namespace) -> Result<(), SourceError> {
        ctx.check()?;
        let bytes = fs::read(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        ctx.check()?;
        ns.load_bytes(&bytes, self.file_type)
    }

    fn name(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
