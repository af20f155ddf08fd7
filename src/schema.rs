//! Attribute schemas.
//!
//! A schema is a flat table from dotted attribute paths (`marker.line.color`)
//! to a value type and an optional default. Series types that borrow
//! attributes from a related module copy those entries in once, when their
//! table is first built, so lookups never chase references at coercion time.

use serde_json::Value;
use std::collections::HashMap;

/// The kind of value an attribute accepts, with its bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum ValType {
    /// Any JSON array.
    DataArray,
    Boolean,
    Number { min: Option<f64>, max: Option<f64> },
    /// One of a fixed list of values. Numbers compare numerically.
    Enumerated(Vec<Value>),
    /// A string the color parser accepts.
    Color,
    /// Strings; numbers are stringified. With `array_ok`, arrays of strings too.
    String { array_ok: bool },
    /// `+`-joined subset of `flags`, or exactly one of `extras`.
    Flaglist {
        flags: &'static [&'static str],
        extras: &'static [&'static str],
    },
    /// `{family, size, color}`, each field coerced on its own.
    Font,
    Any,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttrSpec {
    pub val_type: ValType,
    pub dflt: Option<Value>,
}

impl AttrSpec {
    pub fn new(val_type: ValType) -> Self {
        Self { val_type, dflt: None }
    }

    pub fn with_default(mut self, dflt: impl Into<Value>) -> Self {
        self.dflt = Some(dflt.into());
        self
    }

    pub fn data_array() -> Self {
        Self::new(ValType::DataArray)
    }

    pub fn boolean(dflt: bool) -> Self {
        Self::new(ValType::Boolean).with_default(dflt)
    }

    pub fn number(min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(ValType::Number { min, max })
    }

    pub fn color() -> Self {
        Self::new(ValType::Color)
    }

    pub fn enumerated<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::new(ValType::Enumerated(values.into_iter().map(Into::into).collect()))
    }
}

/// Flattened attribute table for one series type.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attrs: HashMap<&'static str, AttrSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an attribute owned by this schema.
    pub fn with(mut self, path: &'static str, spec: AttrSpec) -> Self {
        self.attrs.insert(path, spec);
        self
    }

    /// Copy `paths` from a related module's schema.
    ///
    /// Paths the other schema does not declare are skipped and logged; the
    /// coercer then treats them as untyped.
    pub fn inherit(mut self, from: &Schema, paths: &[&'static str]) -> Self {
        for &path in paths {
            match from.get(path) {
                Some(spec) => {
                    self.attrs.insert(path, spec.clone());
                }
                None => tracing::error!(path, "inherited attribute missing from source schema"),
            }
        }
        self
    }

    pub fn get(&self, path: &str) -> Option<&AttrSpec> {
        self.attrs.get(path)
    }
}
