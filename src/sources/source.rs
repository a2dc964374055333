//! The source abstraction.

use crate::core::LoadContext;
use crate::error::SourceError;
use crate::namespace::Namespace;

/// A unit of configuration input.
///
/// Implement this trait to plug custom inputs (remote stores, secrets,
/// generated values) into a [`Manager`](crate::core::Manager).
///
/// # Examples
///
/// ```rust
/// use layered_config::core::LoadContext;
/// use layered_config::error::SourceError;
/// use layered_config::namespace::Namespace;
/// use layered_config::sources::{Source, SourceKind};
///
/// struct Hostname;
///
/// impl Source for Hostname {
///     fn kind(&self) -> &str {
///         SourceKind::Default.as_str()
///     }
///
///     fn load(&self, ctx: &LoadContext, ns: &mut Namespace) -> Result<(), SourceError> {
///         ctx.check()?;
///         ns.set("server.host", "localhost")?;
///         Ok(())
///     }
/// }
/// ```
pub trait Source: Send + Sync {
    /// Kind label, checked against [`SourceKind`](super::SourceKind) when the manager is built.
    fn kind(&self) -> &str;

    /// Write this source's values into the namespace.
    ///
    /// The context must not be kept past the call. Sources doing blocking
    /// work should check it before and after.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, parsed or merged.
    fn load(&self, ctx: &LoadContext, ns: &mut Namespace) -> Result<(), SourceError>;

    /// Human-readable name for logging and debugging.
    fn name(&self) -> String {
        self.kind().to_string()
    }
}

/// Builds a [`Source`] while the manager is being constructed.
///
/// Checks that can fail before any input is read (malformed definitions,
/// bad encodings) belong in [`SourceFactory::create`]. Failures there abort
/// manager construction and are never suppressed by [`Optional`](super::Optional).
///
/// Closures returning `Result<Box<dyn Source>, SourceError>` are factories.
pub trait SourceFactory: Send {
    /// Validate the definition and produce the source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source definition is unusable.
    fn create(self: Box<Self>) -> Result<Box<dyn Source>, SourceError>;
}

impl<F> SourceFactory for F
where
    F: FnOnce() -> Result<Box<dyn Source>, SourceError> + Send,
{
    fn create(self: Box<Self>) -> Result<Box<dyn Source>, SourceError> {
        (*self)()
    }
}
