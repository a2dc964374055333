//! Values taken from an in-memory struct.

use super::{Source, SourceFactory, SourceKind};
use crate::core::LoadContext;
use crate::error::SourceError;
use crate::namespace::Namespace;
use config::{Config, Map, Value, ValueKind};
use serde::Serialize;

/// Source reading an already-populated, serializable struct.
///
/// Field names (after any `#[serde(rename)]`) become keys and nested structs
/// become nested paths. `None` fields are left out, so they never clear values
/// set by earlier sources. The struct is serialized when the source is created;
/// a value that does not serialize to a map is rejected at that point.
///
/// # Examples
///
/// ```rust
/// use layered_config::sources::StructSource;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Overrides {
///     port: u16,
/// }
///
/// let source = StructSource::new(&Overrides { port: 9090 });
/// ```
#[derive(Debug)]
pub struct StructSource {
    serialized: Result<Map<String, Value>, config::ConfigError>,
}

impl StructSource {
    /// Capture the current contents of `value`.
    pub fn new<T: Serialize>(value: &T) -> Self {
        let serialized = to_table(value).map(|mut map| {
            prune_nil(&mut map);
            map
        });
        Self { serialized }
    }
}

impl SourceFactory for StructSource {
    fn create(self: Box<Self>) -> Result<Box<dyn Source>, SourceError> {
        let values = self.serialized.map_err(SourceError::Serialize)?;
        Ok(Box::new(CapturedStruct { values }))
    }
}

struct CapturedStruct {
    values: Map<String, Value>,
}

impl Source for CapturedStruct {
    fn kind(&self) -> &str {
        SourceKind::Struct.as_str()
    }

    fn load(&self, ctx: &LoadContext, ns: &mut Namespace) -> Result<(), SourceError> {
        ctx.check()?;
        ns.merge(self.values.clone())?;
        Ok(())
    }
}

/// Serialize `value` into a nested table, `None` fields included as nil.
pub(crate) fn to_table<T: Serialize>(value: &T) -> Result<Map<String, Value>, config::ConfigError> {
    Config::try_from(value)?.try_deserialize()
}

fn prune_nil(map: &mut Map<String, Value>) {
    map.retain(|_, value| match &mut value.kind {
        ValueKind::Nil => false,
        ValueKind::Table(child) => {
            prune_nil(child);
            true
        }
        _ => true,
    });
}
