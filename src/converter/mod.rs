//! Field-mapping conversion of JSON objects
//!
//! An [`ObjectConverter`] turns one mapping into another in four moves:
//!
//! 1. drop excluded fields
//! 2. run per-field value converters (keyed by the *original* field name)
//! 3. rename fields
//! 4. merge the result over a set of extended (default/computed) properties
//!
//! Output is always a freshly built mapping; the source is never mutated and
//! nested values are copied, so a source object can be converted any number
//! of times, from any number of threads.
//!
//! # Example
//!
//! ```
//! use az_prom_rules_converter::config::ConversionOptions;
//! use az_prom_rules_converter::converter::ObjectConverter;
//! use serde_json::{json, Map, Value};
//!
//! fn defaults(_: &ConversionOptions) -> Map<String, Value> {
//!     let mut props = Map::new();
//!     props.insert("enabled".to_string(), json!(true));
//!     props
//! }
//!
//! let converter = ObjectConverter::builder(defaults)
//!     .exclude("internal")
//!     .rename("expr", "expression")
//!     .build();
//!
//! let source = json!({"expr": "up == 0", "internal": 1});
//! let converted = converter
//!     .convert(source.as_object().unwrap(), &ConversionOptions::default())
//!     .unwrap();
//!
//! assert_eq!(Value::Object(converted), json!({"enabled": true, "expression": "up == 0"}));
//! ```

pub mod group;
pub mod rules;

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::config::ConversionOptions;
use crate::error::ConvertError;

/// Converts the value of a single field
///
/// Receives the field name (for error reporting), the value and the options.
pub type ValueConverter =
    fn(&str, &Value, &ConversionOptions) -> Result<Value, ConvertError>;

/// Produces the extended properties a converted object starts from
pub type ExtendedPropsFn = fn(&ConversionOptions) -> Map<String, Value>;

/// Extended properties function that adds nothing
pub fn no_extended_props(_: &ConversionOptions) -> Map<String, Value> {
    Map::new()
}

/// Reusable field-mapping converter
#[derive(Clone)]
pub struct ObjectConverter {
    converters: HashMap<&'static str, ValueConverter>,
    extended_props: ExtendedPropsFn,
    exclude: HashSet<&'static str>,
    renames: HashMap<&'static str, &'static str>,
}

impl ObjectConverter {
    /// Start building a converter around an extended properties function
    pub fn builder(extended_props: ExtendedPropsFn) -> ObjectConverterBuilder {
        ObjectConverterBuilder::new(extended_props)
    }

    /// Convert `source` into a new mapping
    ///
    /// Fields whose value is `null` are treated as absent by the value
    /// converters and renames: they are copied through untouched.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by a value converter.
    pub fn convert(
        &self,
        source: &Map<String, Value>,
        options: &ConversionOptions,
    ) -> Result<Map<String, Value>, ConvertError> {
        let mut result = (self.extended_props)(options);

        let mut converted = Map::with_capacity(source.len());
        for (key, value) in source {
            if self.exclude.contains(key.as_str()) {
                continue;
            }
            let value = match self.converters.get(key.as_str()) {
                Some(convert) if !value.is_null() => convert(key, value, options)?,
                _ => value.clone(),
            };
            converted.insert(key.clone(), value);
        }

        for (key, value) in self.rename_fields(converted) {
            result.insert(key, value);
        }

        Ok(result)
    }

    fn rename_fields(&self, fields: Map<String, Value>) -> Map<String, Value> {
        // A renamed field replaces any existing field under its new name.
        let overwritten: HashSet<&'static str> = self
            .renames
            .iter()
            .filter(|(from, _)| fields.get(**from).is_some_and(|v| !v.is_null()))
            .map(|(_, to)| *to)
            .collect();

        let mut renamed = Map::with_capacity(fields.len());
        for (key, value) in fields {
            match self.renames.get(key.as_str()) {
                Some(to) if !value.is_null() => {
                    renamed.insert((*to).to_string(), value);
                }
                _ if overwritten.contains(key.as_str()) => {}
                _ => {
                    renamed.insert(key, value);
                }
            }
        }
        renamed
    }
}

impl std::fmt::Debug for ObjectConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut converted: Vec<_> = self.converters.keys().collect();
        converted.sort();
        f.debug_struct("ObjectConverter")
            .field("converted", &converted)
            .field("exclude", &self.exclude)
            .field("renames", &self.renames)
            .finish()
    }
}

/// Builder for [`ObjectConverter`]
pub struct ObjectConverterBuilder {
    converters: HashMap<&'static str, ValueConverter>,
    extended_props: ExtendedPropsFn,
    exclude: HashSet<&'static str>,
    renames: HashMap<&'static str, &'static str>,
}

impl ObjectConverterBuilder {
    /// Create a new builder
    pub fn new(extended_props: ExtendedPropsFn) -> Self {
        Self {
            converters: HashMap::new(),
            extended_props,
            exclude: HashSet::new(),
            renames: HashMap::new(),
        }
    }

    /// Convert the value of `field` with `converter`
    pub fn converter(mut self, field: &'static str, converter: ValueConverter) -> Self {
        self.converters.insert(field, converter);
        self
    }

    /// Drop `field` from the output
    pub fn exclude(mut self, field: &'static str) -> Self {
        self.exclude.insert(field);
        self
    }

    /// Move `from` to `to` after value conversion
    pub fn rename(mut self, from: &'static str, to: &'static str) -> Self {
        self.renames.insert(from, to);
        self
    }

    /// Build the converter
    pub fn build(self) -> ObjectConverter {
        ObjectConverter {
            converters: self.converters,
            extended_props: self.extended_props,
            exclude: self.exclude,
            renames: self.renames,
        }
    }
}
