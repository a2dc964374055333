//! Defaults compiled into the binary.

use super::{FileType, Source, SourceFactory, SourceKind};
use crate::core::LoadContext;
use crate::error::SourceError;
use crate::namespace::Namespace;

/// Source for configuration text embedded in the binary, usually via `include_bytes!`.
///
/// The bytes must be UTF-8; that is checked when the manager is built.
/// Parsing happens on every load.
///
/// # Examples
///
/// ```rust
/// use layered_config::sources::{EmbeddedDefaults, FileType};
///
/// let defaults = EmbeddedDefaults::new("port = 8080", FileType::Toml);
/// ```
#[derive(Debug, Clone)]
pub struct EmbeddedDefaults {
    bytes: Vec<u8>,
    file_type: FileType,
}

impl EmbeddedDefaults {
    /// Create a source over `bytes` in the given format.
    pub fn new(bytes: impl Into<Vec<u8>>, file_type: FileType) -> Self {
        Self {
            bytes: bytes.into(),
            file_type,
        }
    }
}

impl SourceFactory for EmbeddedDefaults {
    fn create(self: Box<Self>) -> Result<Box<dyn Source>, SourceError> {
        let file_type = self.file_type;
        let text = String::from_utf8(self.bytes).map_err(|err| SourceError::Encoding {
            file_type,
            source: err.utf8_error(),
        })?;
        Ok(Box::new(EmbeddedSource { text, file_type }))
    }
}

struct EmbeddedSource {
    text: String,
    file_type: FileType,
}

impl Source for EmbeddedSource {
    fn kind(&self) -> &str {
        SourceKind::Default.as_str()
    }

    fn load(&self, ctx: &LoadContext, ns: &mut Namespace) -> Result<(), SourceError> {
        ctx.check()?;
        let map = self.file_type.parse(&self.text)?;
        ns.merge(map)?;
        Ok(())
    }

    fn name(&self) -> String {
        format!("default:{}", self.file_type)
    }
}
