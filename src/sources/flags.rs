//! Command-line flag source backed by `clap`.

use super::{Source, SourceFactory, SourceKind};
use crate::core::LoadContext;
use crate::error::SourceError;
use crate::namespace::Namespace;
use clap::parser::ValueSource;
use clap::{ArgMatches, Command};
use config::{Map, Value, ValueKind};
use std::collections::HashSet;

/// Source reading parsed `clap` arguments.
///
/// Each argument id is used as a key, so an argument with id `server.port`
/// lands at `server.port`. Values typed on the command line (or taken from an
/// `env` binding) always override. Values that only come from a clap
/// `default_value` are applied only when no earlier source set the key.
/// Arguments with several values become arrays. Argument group ids are not
/// keys and are ignored.
///
/// # Examples
///
/// ```rust
/// use clap::{Arg, Command};
/// use layered_config::sources::Flags;
///
/// let mut command = Command::new("app").arg(Arg::new("server.port").long("port"));
/// let matches = command.try_get_matches_from_mut(["app", "--port", "9090"]).unwrap();
///
/// let source = Flags::new(&command, &matches);
/// ```
#[derive(Debug, Clone)]
pub struct Flags {
    matches: ArgMatches,
    groups: HashSet<String>,
}

impl Flags {
    /// Create a source over matches already parsed by `command`.
    pub fn new(command: &Command, matches: &ArgMatches) -> Self {
        Self {
            matches: matches.clone(),
            groups: command
                .get_groups()
                .map(|group| group.get_id().as_str().to_string())
                .collect(),
        }
    }

    fn read(&self, ns: &Namespace) -> Result<Map<String, Value>, SourceError> {
        let mut map = Map::new();

        for id in self.matches.ids() {
            let name = id.as_str();
            if self.groups.contains(name) {
                continue;
            }
            let Some(origin) = self.matches.value_source(name) else {
                continue;
            };
            if origin == ValueSource::DefaultValue && ns.exists(name) {
                continue;
            }

            let raw = self
                .matches
                .try_get_raw(name)
                .map_err(|err| SourceError::Flag {
                    name: name.to_string(),
                    reason: err.to_string(),
                })?;
            let Some(raw) = raw else {
                continue;
            };

            let mut values = raw
                .map(|value| {
                    value.to_str().map(str::to_string).ok_or_else(|| SourceError::Flag {
                        name: name.to_string(),
                        reason: "value is not valid UTF-8".to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let value = match values.len() {
                0 => continue,
                1 => Value::from(values.remove(0)),
                _ => Value::new(
                    None,
                    ValueKind::Array(values.into_iter().map(Value::from).collect()),
                ),
            };
            map.insert(name.to_string(), value);
        }

        Ok(map)
    }
}

impl SourceFactory for Flags {
    fn create(self: Box<Self>) -> Result<Box<dyn Source>, SourceError> {
        Ok(self)
    }
}

impl Source for Flags {
    fn kind(&self) -> &str {
        SourceKind::Flag.as_str()
    }

    fn load(&self, ctx: &LoadContext, ns: &mut Namespace) -> Result<(), SourceError> {
        ctx.check()?;
        let map = self.read(ns)?;
        ns.merge(map)?;
        Ok(())
    }

    fn name(&self) -> String {
        "pflag:clap".to_string()
    }
}
