//! The merged key/value tree that sources write into.

use crate::error::{NamespaceError, SourceError};
use crate::sources::FileType;
use config::{Map, Value, ValueKind};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Default separator between nested key segments.
pub const DEFAULT_DELIMITER: &str = ".";

/// Hierarchical key/value store holding everything loaded so far.
///
/// Keys are paths such as `server.port`, split on the configured delimiter.
/// Merging is deep: tables merge key by key, every other value replaces
/// whatever was stored at the same path.
///
/// # Examples
///
/// ```rust
/// use layered_config::namespace::Namespace;
///
/// let mut ns = Namespace::new(".", false);
/// ns.set("server.port", 8080).unwrap();
/// ns.set("server.host", "localhost").unwrap();
///
/// assert!(ns.exists("server.port"));
/// assert_eq!(ns.get_as::<u16>("server.port").unwrap(), Some(8080));
/// assert_eq!(ns.keys(), vec!["server.host", "server.port"]);
/// ```
#[derive(Debug, Clone)]
pub struct Namespace {
    root: Map<String, Value>,
    delimiter: String,
    strict: bool,
}

impl Namespace {
    /// Create an empty namespace.
    ///
    /// With `strict` set, a merge that would replace a stored value with one of
    /// a different type fails instead of overwriting it.
    pub fn new(delimiter: impl Into<String>, strict: bool) -> Self {
        Self {
            root: Map::new(),
            delimiter: delimiter.into(),
            strict,
        }
    }

    /// The key delimiter.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Whether strict merging is enabled.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Split a key into its path segments.
    ///
    /// # Errors
    ///
    /// Fails on an empty key or an empty segment (`a..b`, `.a`).
    pub fn split_key<'a>(&self, key: &'a str) -> Result<Vec<&'a str>, NamespaceError> {
        split_path(key, &self.delimiter)
    }

    /// Deep-merge a map into the namespace.
    ///
    /// Keys at any depth may themselves contain the delimiter; `{"a.b": 1}` and
    /// `{"a": {"b": 1}}` are equivalent.
    ///
    /// # Errors
    ///
    /// Fails on malformed keys, or on a type conflict when strict merging is on.
    /// Entries merged before the failing one stay merged.
    pub fn merge(&mut self, incoming: Map<String, Value>) -> Result<(), NamespaceError> {
        let merger = Merger {
            delimiter: &self.delimiter,
            strict: self.strict,
        };
        merger.merge_table(&mut self.root, incoming, "")
    }

    /// Parse `bytes` as `file_type` and merge the result.
    ///
    /// # Errors
    ///
    /// Fails if the input is not UTF-8, does not parse, or cannot be merged.
    pub fn load_bytes(&mut self, bytes: &[u8], file_type: FileType) -> Result<(), SourceError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|source| SourceError::Encoding { file_type, source })?;
        let map = file_type.parse(text)?;
        self.merge(map)?;
        Ok(())
    }

    /// Set a single value at `key`, using the same rules as [`Namespace::merge`].
    ///
    /// # Errors
    ///
    /// Fails on a malformed key or a strict-merge type conflict.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), NamespaceError> {
        let path = split_path(key, &self.delimiter)?;
        let merger = Merger {
            delimiter: &self.delimiter,
            strict: self.strict,
        };
        merger.merge_path(&mut self.root, &path, value.into(), "")
    }

    /// Look up the raw value stored at `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let path = self.split_key(key).ok()?;
        let (last, parents) = path.split_last()?;
        let mut table = &self.root;
        for segment in parents {
            match &table.get(*segment)?.kind {
                ValueKind::Table(child) => table = child,
                _ => return None,
            }
        }
        table.get(*last)
    }

    /// Decode the value at `key` into `T`. `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Fails if the stored value does not decode into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, NamespaceError> {
        self.get(key)
            .cloned()
            .map(Value::try_deserialize)
            .transpose()
            .map_err(NamespaceError::Deserialize)
    }

    /// Returns true if a value (of any type, tables included) is stored at `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All leaf values keyed by their full delimited path.
    pub fn flatten(&self) -> BTreeMap<String, Value> {
        let mut out = BTreeMap::new();
        flatten_into(&self.root, "", &self.delimiter, &mut out);
        out
    }

    /// Sorted full paths of every leaf value.
    pub fn keys(&self) -> Vec<String> {
        self.flatten().into_keys().collect()
    }

    /// Number of leaf values.
    pub fn len(&self) -> usize {
        self.flatten().len()
    }

    /// Returns true if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The nested tree as stored.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Decode the whole namespace into `T`.
    ///
    /// # Errors
    ///
    /// Fails if the tree does not match the shape of `T`.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T, NamespaceError> {
        Value::new(None, ValueKind::Table(self.root.clone()))
            .try_deserialize()
            .map_err(NamespaceError::Deserialize)
    }

    /// Decode the namespace laid over `base` into `T`.
    ///
    /// Tables merge key by key and any other stored value replaces the one in
    /// `base`. Whatever only `base` holds is decoded unchanged.
    ///
    /// # Errors
    ///
    /// Fails if the combined tree does not match the shape of `T`.
    pub fn unmarshal_over<T: DeserializeOwned>(
        &self,
        base: &Map<String, Value>,
    ) -> Result<T, NamespaceError> {
        let mut root = base.clone();
        overlay(&mut root, &self.root);
        Value::new(None, ValueKind::Table(root))
            .try_deserialize()
            .map_err(NamespaceError::Deserialize)
    }

    /// Decode the subtree at `key` into `T`.
    ///
    /// A missing key decodes like an empty table, so models with
    /// `#[serde(default)]` fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Fails on a malformed key or if the subtree does not match `T`.
    pub fn unmarshal_at<T: DeserializeOwned>(&self, key: &str) -> Result<T, NamespaceError> {
        self.split_key(key)?;
        self.get(key)
            .cloned()
            .unwrap_or_else(empty_table)
            .try_deserialize()
            .map_err(NamespaceError::Deserialize)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER, false)
    }
}

struct Merger<'a> {
    delimiter: &'a str,
    strict: bool,
}

impl Merger<'_> {
    fn merge_table(
        &self,
        dest: &mut Map<String, Value>,
        incoming: Map<String, Value>,
        prefix: &str,
    ) -> Result<(), NamespaceError> {
        for (key, value) in incoming {
            let path = split_path(&key, self.delimiter)?;
            self.merge_path(dest, &path, value, prefix)?;
        }
        Ok(())
    }

    fn merge_path(
        &self,
        dest: &mut Map<String, Value>,
        path: &[&str],
        value: Value,
        prefix: &str,
    ) -> Result<(), NamespaceError> {
        let Some((head, rest)) = path.split_first() else {
            return Ok(());
        };
        let full_key = join_key(prefix, head, self.delimiter);

        if rest.is_empty() {
            return self.merge_leaf(dest, head, value, &full_key);
        }

        let slot = dest.entry((*head).to_string()).or_insert_with(empty_table);
        let child = self.descend(slot, &full_key)?;
        self.merge_path(child, rest, value, &full_key)
    }

    fn merge_leaf(
        &self,
        dest: &mut Map<String, Value>,
        key: &str,
        value: Value,
        full_key: &str,
    ) -> Result<(), NamespaceError> {
        if matches!(value.kind, ValueKind::Table(_)) {
            let incoming = value.into_table().map_err(NamespaceError::Deserialize)?;
            let slot = dest.entry(key.to_string()).or_insert_with(empty_table);
            let child = self.descend(slot, full_key)?;
            return self.merge_table(child, incoming, full_key);
        }

        if self.strict {
            if let Some(existing) = dest.get(key) {
                check_compatible(full_key, &existing.kind, &value.kind)?;
            }
        }
        dest.insert(key.to_string(), value);
        Ok(())
    }

    // Make `slot` a table so keys can be nested under it.
    fn descend<'m>(
        &self,
        slot: &'m mut Value,
        full_key: &str,
    ) -> Result<&'m mut Map<String, Value>, NamespaceError> {
        if !matches!(slot.kind, ValueKind::Table(_)) {
            if self.strict && !matches!(slot.kind, ValueKind::Nil) {
                return Err(NamespaceError::TypeMismatch {
                    key: full_key.to_string(),
                    existing: type_name(&slot.kind),
                    incoming: "table",
                });
            }
            *slot = empty_table();
        }
        match &mut slot.kind {
            ValueKind::Table(map) => Ok(map),
            other => Err(NamespaceError::NotATable {
                key: full_key.to_string(),
                existing: type_name(other),
            }),
        }
    }
}

fn check_compatible(
    key: &str,
    existing: &ValueKind,
    incoming: &ValueKind,
) -> Result<(), NamespaceError> {
    if matches!(existing, ValueKind::Nil) || matches!(incoming, ValueKind::Nil) {
        return Ok(());
    }
    let (existing, incoming) = (type_name(existing), type_name(incoming));
    if existing != incoming {
        return Err(NamespaceError::TypeMismatch {
            key: key.to_string(),
            existing,
            incoming,
        });
    }
    Ok(())
}

/// Coarse type category of a value, used for strict merging and diagnostics.
pub(crate) fn type_name(kind: &ValueKind) -> &'static str {
    match kind {
        ValueKind::Nil => "nil",
        ValueKind::Boolean(_) => "bool",
        ValueKind::Float(_) => "float",
        ValueKind::String(_) => "string",
        ValueKind::Table(_) => "table",
        ValueKind::Array(_) => "array",
        _ => "integer",
    }
}

fn split_path<'a>(key: &'a str, delimiter: &str) -> Result<Vec<&'a str>, NamespaceError> {
    let parts: Vec<&str> = key.split(delimiter).collect();
    if key.is_empty() || parts.iter().any(|part| part.is_empty()) {
        return Err(NamespaceError::InvalidKey(key.to_string()));
    }
    Ok(parts)
}

fn join_key(prefix: &str, key: &str, delimiter: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{delimiter}{key}")
    }
}

// Keys are already split, so no delimiter handling is needed here.
fn overlay(dest: &mut Map<String, Value>, top: &Map<String, Value>) {
    for (key, value) in top {
        if let ValueKind::Table(incoming) = &value.kind {
            if let Some(ValueKind::Table(existing)) =
                dest.get_mut(key).map(|slot| &mut slot.kind)
            {
                overlay(existing, incoming);
                continue;
            }
        }
        dest.insert(key.clone(), value.clone());
    }
}

fn empty_table() -> Value {
    Value::new(None, ValueKind::Table(Map::new()))
}

fn flatten_into(
    table: &Map<String, Value>,
    prefix: &str,
    delimiter: &str,
    out: &mut BTreeMap<String, Value>,
) {
    for (key, value) in table {
        let full_key = join_key(prefix, key, delimiter);
        match &value.kind {
            ValueKind::Table(child) if !child.is_empty() => {
                flatten_into(child, &full_key, delimiter, out)
            }
            _ => {
                out.insert(full_key, value.clone());
            }
        }
    }
}
