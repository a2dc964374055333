//! Configuration source implementations.
//!
//! A source writes its values into the shared [`Namespace`](crate::namespace::Namespace)
//! when the manager loads. Sources are registered through a [`SourceFactory`],
//! which runs once while the manager is built and may reject a malformed
//! definition before anything is loaded.

mod embedded;
mod env;
mod file;
mod file_type;
#[cfg(feature = "cli")]
mod flags;
mod kind;
mod optional;
mod source;
mod structure;

pub use embedded::EmbeddedDefaults;
pub use env::{Env, NESTING_SEPARATOR};
pub use file::LocalFile;
pub use file_type::{FileType, UnknownFileType};
#[cfg(feature = "cli")]
pub use flags::Flags;
pub use kind::{SourceKind, UnknownSourceKind};
pub use optional::Optional;
pub use source::{Source, SourceFactory};
pub use structure::StructSource;
pub(crate) use structure::to_table;
