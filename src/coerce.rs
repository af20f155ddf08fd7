//! Attribute coercion.
//!
//! [`coerce`] is pure: it reads one attribute from a raw input object,
//! validates it against its [`AttrSpec`] and returns the resolved value plus
//! an optional diagnostic. Nothing here fails; bad input degrades to the
//! default. [`Coercer`] wraps it for callers resolving many attributes of
//! the same container.

use crate::color::is_valid_color;
use crate::schema::{AttrSpec, Schema, ValType};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    OutOfRange,
    InvalidValue,
    WrongType,
}

/// A value the coercer rejected and replaced with its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: Option<Value>,
    pub diagnostic: Option<DiagnosticKind>,
}

impl Coerced {
    fn accept(value: Value) -> Self {
        Self { value: Some(value), diagnostic: None }
    }

    fn reject(dflt: Option<Value>, kind: DiagnosticKind) -> Self {
        Self { value: dflt, diagnostic: Some(kind) }
    }
}

/// Follow a dotted path (`marker.line.width`) through nested objects.
pub fn lookup<'a>(input: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(input, |node, key| node.get(key))
}

/// Resolve one attribute.
///
/// `dflt` overrides the schema default when given. Missing and `null` input
/// resolve to the default without a diagnostic.
pub fn coerce(input: &Value, spec: &AttrSpec, path: &str, dflt: Option<&Value>) -> Coerced {
    let dflt = dflt.or(spec.dflt.as_ref()).cloned();
    let raw = match lookup(input, path) {
        Some(v) if !v.is_null() => v,
        _ => {
            return Coerced { value: dflt, diagnostic: None };
        }
    };

    match &spec.val_type {
        ValType::Any => Coerced::accept(raw.clone()),
        ValType::DataArray => match raw {
            Value::Array(_) => Coerced::accept(raw.clone()),
            _ => Coerced::reject(dflt, DiagnosticKind::WrongType),
        },
        ValType::Boolean => match raw {
            Value::Bool(_) => Coerced::accept(raw.clone()),
            _ => Coerced::reject(dflt, DiagnosticKind::WrongType),
        },
        ValType::Number { min, max } => match as_number(raw) {
            Some(n) if in_bounds(n, *min, *max) => Coerced::accept(Value::from(n)),
            Some(_) => Coerced::reject(dflt, DiagnosticKind::OutOfRange),
            None => Coerced::reject(dflt, DiagnosticKind::WrongType),
        },
        ValType::Enumerated(values) => {
            if values.iter().any(|v| enum_eq(v, raw)) {
                Coerced::accept(raw.clone())
            } else {
                Coerced::reject(dflt, DiagnosticKind::InvalidValue)
            }
        }
        ValType::Color => match raw {
            Value::String(s) if is_valid_color(s) => Coerced::accept(raw.clone()),
            Value::String(_) => Coerced::reject(dflt, DiagnosticKind::InvalidValue),
            _ => Coerced::reject(dflt, DiagnosticKind::WrongType),
        },
        ValType::String { array_ok } => match raw {
            Value::String(_) => Coerced::accept(raw.clone()),
            Value::Number(n) => Coerced::accept(Value::String(n.to_string())),
            Value::Array(items) if *array_ok => Coerced::accept(Value::Array(
                items.iter().map(stringify).collect(),
            )),
            _ => Coerced::reject(dflt, DiagnosticKind::WrongType),
        },
        ValType::Flaglist { flags, extras } => match raw {
            Value::String(s) if valid_flaglist(s, flags, extras) => Coerced::accept(raw.clone()),
            Value::String(_) => Coerced::reject(dflt, DiagnosticKind::InvalidValue),
            _ => Coerced::reject(dflt, DiagnosticKind::WrongType),
        },
        ValType::Font => match raw {
            Value::Object(obj) => coerce_font(obj, dflt.as_ref()),
            _ => Coerced::reject(dflt, DiagnosticKind::WrongType),
        },
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn in_bounds(n: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m)
}

fn enum_eq(allowed: &Value, raw: &Value) -> bool {
    match (allowed, raw) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => allowed == raw,
    }
}

fn stringify(v: &Value) -> Value {
    match v {
        Value::String(_) => v.clone(),
        Value::Null => Value::String(String::new()),
        other => Value::String(other.to_string()),
    }
}

fn valid_flaglist(s: &str, flags: &[&str], extras: &[&str]) -> bool {
    if extras.contains(&s) {
        return true;
    }
    !s.is_empty() && s.split('+').all(|part| flags.contains(&part))
}

/// Each font field falls back to the matching field of the default font.
fn coerce_font(raw: &Map<String, Value>, dflt: Option<&Value>) -> Coerced {
    let fallback = |key: &str| dflt.and_then(|d| d.get(key)).cloned();
    let mut out = Map::new();
    let mut diagnostic = None;

    let family = match raw.get("family") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(Value::String(s.clone())),
        None | Some(Value::Null) => fallback("family"),
        Some(_) => {
            diagnostic = Some(DiagnosticKind::InvalidValue);
            fallback("family")
        }
    };
    let size = match raw.get("size") {
        None | Some(Value::Null) => fallback("size"),
        Some(v) => match as_number(v) {
            Some(n) if n >= 1.0 => Some(Value::from(n)),
            Some(_) => {
                diagnostic = Some(DiagnosticKind::OutOfRange);
                fallback("size")
            }
            None => {
                diagnostic = Some(DiagnosticKind::WrongType);
                fallback("size")
            }
        },
    };
    let color = match raw.get("color") {
        Some(Value::String(s)) if is_valid_color(s) => Some(Value::String(s.clone())),
        None | Some(Value::Null) => fallback("color"),
        Some(_) => {
            diagnostic = Some(DiagnosticKind::InvalidValue);
            fallback("color")
        }
    };

    for (key, value) in [("family", family), ("size", size), ("color", color)] {
        if let Some(value) = value {
            out.insert(key.to_string(), value);
        }
    }
    Coerced { value: Some(Value::Object(out)), diagnostic }
}

/// Coerces attributes of one input container against one schema, collecting
/// diagnostics as it goes.
pub struct Coercer<'a> {
    input: &'a Value,
    schema: &'a Schema,
    prefix: &'a str,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> Coercer<'a> {
    /// `prefix` is prepended to diagnostic paths (`error_x.` for a nested
    /// container); pass `""` at the top level.
    pub fn new(
        input: &'a Value,
        schema: &'a Schema,
        prefix: &'a str,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self { input, schema, prefix, diagnostics }
    }

    /// The raw, uncoerced input value at `path`.
    pub fn raw(&self, path: &str) -> Option<&'a Value> {
        lookup(self.input, path).filter(|v| !v.is_null())
    }

    pub fn value(&mut self, path: &str, dflt: Option<Value>) -> Option<Value> {
        let untyped;
        let spec = match self.schema.get(path) {
            Some(spec) => spec,
            None => {
                untyped = AttrSpec::new(ValType::Any);
                &untyped
            }
        };
        let coerced = coerce(self.input, spec, path, dflt.as_ref());
        if let Some(kind) = coerced.diagnostic {
            let path = format!("{}{}", self.prefix, path);
            tracing::debug!(path = %path, ?kind, "attribute replaced by default");
            self.diagnostics.push(Diagnostic { path, kind });
        }
        coerced.value
    }

    pub fn number(&mut self, path: &str, dflt: Option<f64>) -> Option<f64> {
        self.value(path, dflt.map(Value::from)).and_then(|v| v.as_f64())
    }

    pub fn boolean(&mut self, path: &str, dflt: Option<bool>) -> Option<bool> {
        self.value(path, dflt.map(Value::Bool)).and_then(|v| v.as_bool())
    }

    pub fn string(&mut self, path: &str, dflt: Option<&str>) -> Option<String> {
        self.value(path, dflt.map(|s| Value::String(s.to_string())))
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn record(&mut self, path: &str, kind: DiagnosticKind) {
        let path = format!("{}{}", self.prefix, path);
        tracing::debug!(path = %path, ?kind, "attribute replaced by default");
        self.diagnostics.push(Diagnostic { path, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number_spec() -> AttrSpec {
        AttrSpec::number(Some(0.0), Some(1.0)).with_default(1.0)
    }

    #[test]
    fn test_lookup_dotted_path() {
        let input = json!({"marker": {"line": {"width": 3}}});
        assert_eq!(lookup(&input, "marker.line.width"), Some(&json!(3)));
        assert_eq!(lookup(&input, "marker.size"), None);
    }

    #[test]
    fn test_missing_uses_default() {
        let c = coerce(&json!({}), &number_spec(), "opacity", None);
        assert_eq!(c.value, Some(json!(1.0)));
        assert_eq!(c.diagnostic, None);

        let c = coerce(&json!({"opacity": null}), &number_spec(), "opacity", Some(&json!(0.5)));
        assert_eq!(c.value, Some(json!(0.5)));
    }

    #[test]
    fn test_number_bounds() {
        let c = coerce(&json!({"opacity": 0.25}), &number_spec(), "opacity", None);
        assert_eq!(c.value, Some(json!(0.25)));

        let c = coerce(&json!({"opacity": 7}), &number_spec(), "opacity", None);
        assert_eq!(c.value, Some(json!(1.0)));
        assert_eq!(c.diagnostic, Some(DiagnosticKind::OutOfRange));

        let c = coerce(&json!({"opacity": true}), &number_spec(), "opacity", None);
        assert_eq!(c.diagnostic, Some(DiagnosticKind::WrongType));

        let c = coerce(&json!({"opacity": "0.5"}), &number_spec(), "opacity", None);
        assert_eq!(c.value, Some(json!(0.5)));
    }

    #[test]
    fn test_enumerated_compares_numbers() {
        let spec = AttrSpec::enumerated([-1, 0, 1, 2]).with_default(-1);
        let c = coerce(&json!({"a": 2.0}), &spec, "a", None);
        assert_eq!(c.value, Some(json!(2.0)));
        let c = coerce(&json!({"a": 5}), &spec, "a", None);
        assert_eq!(c.value, Some(json!(-1)));
        assert_eq!(c.diagnostic, Some(DiagnosticKind::InvalidValue));
    }

    #[test]
    fn test_color_validation() {
        let spec = AttrSpec::color();
        let c = coerce(&json!({"c": "#abc"}), &spec, "c", Some(&json!("red")));
        assert_eq!(c.value, Some(json!("#abc")));
        let c = coerce(&json!({"c": "notacolor"}), &spec, "c", Some(&json!("red")));
        assert_eq!(c.value, Some(json!("red")));
        assert_eq!(c.diagnostic, Some(DiagnosticKind::InvalidValue));
    }

    #[test]
    fn test_flaglist() {
        let spec = AttrSpec::new(ValType::Flaglist {
            flags: &["lines", "markers", "text"],
            extras: &["none"],
        });
        let dflt = json!("lines");
        assert_eq!(coerce(&json!({"m": "markers+text"}), &spec, "m", Some(&dflt)).value, Some(json!("markers+text")));
        assert_eq!(coerce(&json!({"m": "none"}), &spec, "m", Some(&dflt)).value, Some(json!("none")));
        assert_eq!(coerce(&json!({"m": "lines+none"}), &spec, "m", Some(&dflt)).value, Some(dflt.clone()));
        assert_eq!(coerce(&json!({"m": ""}), &spec, "m", Some(&dflt)).value, Some(dflt));
    }

    #[test]
    fn test_string_array_ok() {
        let spec = AttrSpec::new(ValType::String { array_ok: true });
        let c = coerce(&json!({"t": ["a", 1, null]}), &spec, "t", None);
        assert_eq!(c.value, Some(json!(["a", "1", ""])));
        let c = coerce(&json!({"t": 5}), &spec, "t", None);
        assert_eq!(c.value, Some(json!("5")));
    }

    #[test]
    fn test_font_fields_fall_back_independently() {
        let spec = AttrSpec::new(ValType::Font);
        let dflt = json!({"family": "Arial", "size": 12.0, "color": "#444"});
        let c = coerce(&json!({"f": {"size": 20, "color": "nope"}}), &spec, "f", Some(&dflt));
        assert_eq!(c.value, Some(json!({"family": "Arial", "size": 20.0, "color": "#444"})));
        assert_eq!(c.diagnostic, Some(DiagnosticKind::InvalidValue));
    }

    #[test]
    fn test_coercer_collects_prefixed_diagnostics() {
        let schema = Schema::new().with("width", AttrSpec::number(Some(0.0), None).with_default(4.0));
        let input = json!({"width": -1});
        let mut diagnostics = Vec::new();
        let mut coercer = Coercer::new(&input, &schema, "error_z.", &mut diagnostics);
        assert_eq!(coercer.number("width", None), Some(4.0));
        assert_eq!(
            diagnostics,
            vec![Diagnostic { path: "error_z.width".into(), kind: DiagnosticKind::OutOfRange }]
        );
    }
}
