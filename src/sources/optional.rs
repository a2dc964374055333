//! Wrapper that tolerates load failures of a source.

use super::{Source, SourceFactory};
use crate::core::LoadContext;
use crate::error::SourceError;
use crate::namespace::Namespace;
use std::io;
use std::sync::Arc;

type ErrorFilter = Arc<dyn Fn(&SourceError) -> bool + Send + Sync>;

/// Makes a source optional at load time.
///
/// Building the wrapped source still has to succeed: a malformed definition
/// aborts manager construction as usual. Only errors raised by `load` are
/// considered. With no allowed errors registered every load error is
/// suppressed; otherwise only errors matching one of the filters are, and the
/// rest abort the load.
///
/// A suppressed source may have merged part of its values before failing.
///
/// # Examples
///
/// ```rust
/// use layered_config::sources::{LocalFile, Optional};
///
/// // Skip the file when it does not exist, fail on anything else.
/// let source = Optional::new(LocalFile::new("config/local.toml")).allow_not_found();
/// ```
pub struct Optional<F> {
    inner: F,
    allowed: Vec<ErrorFilter>,
}

impl<F: SourceFactory> Optional<F> {
    /// Wrap a source factory. Without further filters all load errors are suppressed.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            allowed: Vec::new(),
        }
    }

    /// Suppress errors for which `filter` returns true.
    pub fn allow<P>(mut self, filter: P) -> Self
    where
        P: Fn(&SourceError) -> bool + Send + Sync + 'static,
    {
        self.allowed.push(Arc::new(filter));
        self
    }

    /// Suppress errors caused by an I/O error of the given kind.
    pub fn allow_io(self, kind: io::ErrorKind) -> Self {
        self.allow(move |err| err.has_io_kind(kind))
    }

    /// Suppress errors caused by a missing file.
    pub fn allow_not_found(self) -> Self {
        self.allow_io(io::ErrorKind::NotFound)
    }
}

impl<F: SourceFactory + 'static> SourceFactory for Optional<F> {
    fn create(self: Box<Self>) -> Result<Box<dyn Source>, SourceError> {
        let Self { inner, allowed } = *self;
        let inner = Box::new(inner).create()?;
        Ok(Box::new(OptionalSource { inner, allowed }))
    }
}

struct OptionalSource {
    inner: Box<dyn Source>,
    allowed: Vec<ErrorFilter>,
}

impl OptionalSource {
    fn is_allowed(&self, err: &SourceError) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|filter| filter(err))
    }
}

impl Source for OptionalSource {
    fn kind(&self) -> &str {
        self.inner.kind()
    }

    fn load(&self, ctx: &LoadContext, ns: &mut Namespace) -> Result<(), SourceError> {
        match self.inner.load(ctx, ns) {
            Err(err) if self.is_allowed(&err) => {
                tracing::debug!(
                    source = %self.inner.name(),
                    error = %err,
                    "optional source skipped"
                );
                Ok(())
            }
            result => result,
        }
    }

    fn name(&self) -> String {
        format!("optional:{}", self.inner.name())
    }
}
