//! Error bars: per-axis defaults, per-point bounds, and the style
//! parameters handed to the renderer.

use crate::coerce::{Coercer, Diagnostic};
use crate::color::{to_rgba, Rgba, FALLBACK_RGBA};
use crate::ir::{Datum, ErrorBarSpec, ErrorBound, ErrorType, ResolvedSeries};
use crate::schema::{AttrSpec, Schema, ValType};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// Error-bar cap widths are specified in 2D pixels; the 3D renderer wants
/// roughly a hundredth of that.
const CAP_SIZE_SCALE: f64 = 100.0;

static ATTRIBUTES: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .with("visible", AttrSpec::new(ValType::Boolean))
        .with(
            "type",
            AttrSpec::enumerated(["percent", "constant", "sqrt", "data"]).with_default("percent"),
        )
        .with("symmetric", AttrSpec::new(ValType::Boolean))
        .with("array", AttrSpec::data_array())
        .with("arrayminus", AttrSpec::data_array())
        .with("value", AttrSpec::number(Some(0.0), None).with_default(10.0))
        .with("valueminus", AttrSpec::number(Some(0.0), None).with_default(10.0))
        .with("copy_zstyle", AttrSpec::new(ValType::Boolean))
        .with("color", AttrSpec::color())
        .with("thickness", AttrSpec::number(Some(0.0), None).with_default(2.0))
        .with("width", AttrSpec::number(Some(0.0), None).with_default(4.0))
});

pub fn attributes() -> &'static Schema {
    &ATTRIBUTES
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    X,
    Y,
    Z,
}

impl Dim {
    pub fn container(&self) -> &'static str {
        match self {
            Dim::X => "error_x",
            Dim::Y => "error_y",
            Dim::Z => "error_z",
        }
    }
}

/// Resolve the error-bar settings for one axis.
///
/// With `inherit` set to an already-resolved visible spec, the axis copies
/// that spec's style unless it sets its own color, thickness or width.
pub fn supply_defaults(
    series_in: &Value,
    default_color: &str,
    axis: Dim,
    inherit: Option<&ErrorBarSpec>,
    diagnostics: &mut Vec<Diagnostic>,
) -> ErrorBarSpec {
    let empty = Value::Object(Map::new());
    let container = series_in.get(axis.container()).unwrap_or(&empty);
    let prefix = format!("{}.", axis.container());
    let mut c = Coercer::new(container, attributes(), &prefix, diagnostics);

    let has_error_bars = c.raw("array").is_some()
        || c.raw("value").is_some()
        || c.raw("type").and_then(Value::as_str) == Some("sqrt");
    if !c.boolean("visible", Some(has_error_bars)).unwrap_or(false) {
        return ErrorBarSpec::default();
    }

    let mut spec = ErrorBarSpec { visible: true, ..Default::default() };

    let type_dflt = if c.raw("array").is_some() { "data" } else { "percent" };
    let kind = c
        .string("type", Some(type_dflt))
        .and_then(|s| ErrorType::from_name(&s))
        .unwrap_or(ErrorType::Percent);
    spec.kind = Some(kind);

    let mut symmetric = true;
    if kind != ErrorType::Sqrt {
        let minus_attr = if kind == ErrorType::Data { "arrayminus" } else { "valueminus" };
        let has_minus = c.raw(minus_attr).is_some();
        symmetric = c.boolean("symmetric", Some(!has_minus)).unwrap_or(true);
        spec.symmetric = Some(symmetric);
    }

    match kind {
        ErrorType::Data => {
            spec.array = Some(data_array(c.value("array", None)));
            if !symmetric {
                spec.arrayminus = Some(data_array(c.value("arrayminus", None)));
            }
        }
        ErrorType::Percent | ErrorType::Constant => {
            spec.value = c.number("value", None);
            if !symmetric {
                spec.valueminus = c.number("valueminus", None);
            }
        }
        ErrorType::Sqrt => {}
    }

    if inherit.map_or(false, |parent| parent.visible) {
        let has_own_style = c.raw("color").is_some()
            || c.raw("thickness").map_or(false, Value::is_number)
            || c.raw("width").map_or(false, Value::is_number);
        spec.copy_zstyle = c.boolean("copy_zstyle", Some(!has_own_style));
    }

    if inherit.is_none() || spec.copy_zstyle != Some(true) {
        spec.color = c.string("color", Some(default_color));
        spec.thickness = c.number("thickness", None);
        spec.width = c.number("width", None);
    }

    spec
}

fn data_array(value: Option<Value>) -> Vec<Datum> {
    match value {
        Some(Value::Array(items)) => items.iter().map(Datum::from_value).collect(),
        _ => Vec::new(),
    }
}

/// `[minus, plus]` error magnitudes for one datum.
fn compute_error(spec: &ErrorBarSpec, datum: f64, index: usize) -> [f64; 2] {
    let symmetric = spec.symmetric.unwrap_or(true);
    let from_array = |array: &Option<Vec<Datum>>| {
        array
            .as_ref()
            .and_then(|a| a.get(index))
            .and_then(Datum::as_number)
            .unwrap_or(0.0)
    };
    let value = spec.value.unwrap_or(0.0);
    let valueminus = if symmetric { value } else { spec.valueminus.unwrap_or(0.0) };

    match spec.kind {
        Some(ErrorType::Data) => {
            let plus = from_array(&spec.array);
            let minus = if symmetric { plus } else { from_array(&spec.arrayminus) };
            [minus, plus]
        }
        Some(ErrorType::Percent) => [datum.abs() * valueminus / 100.0, datum.abs() * value / 100.0],
        Some(ErrorType::Constant) => [valueminus, value],
        Some(ErrorType::Sqrt) => {
            let e = datum.abs().sqrt();
            [e, e]
        }
        None => [0.0, 0.0],
    }
}

fn axis_errors(data: &[Datum], spec: &ErrorBarSpec) -> Option<Vec<[f64; 2]>> {
    if !spec.visible {
        return None;
    }
    Some(
        data.iter()
            .enumerate()
            .map(|(i, d)| {
                let [minus, plus] = compute_error(spec, d.as_number().unwrap_or(f64::NAN), i);
                [-minus, plus]
            })
            .collect(),
    )
}

/// Per-point error offsets for all three axes, or `None` when no axis has
/// visible error bars.
pub fn compute_error_bounds(series: &ResolvedSeries) -> Option<Vec<ErrorBound>> {
    let coords = series.coordinates();
    let specs = series.error_bars();
    let errors: Vec<Option<Vec<[f64; 2]>>> = (0..3).map(|j| axis_errors(coords[j], specs[j])).collect();

    if errors.iter().all(Option::is_none) {
        return None;
    }
    let n = coords.iter().map(|c| c.len()).min().unwrap_or(0);
    if n == 0 {
        return None;
    }

    let bounds = (0..n)
        .map(|i| {
            let mut bound = [[0.0; 3]; 2];
            for (j, axis) in errors.iter().enumerate() {
                if let Some(per_point) = axis {
                    bound[0][j] = per_point[i][0];
                    bound[1][j] = per_point[i][1];
                }
            }
            bound
        })
        .collect();
    Some(bounds)
}

/// Error-bar styling handed to the renderer, one entry per axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBarParams {
    pub cap_size: [f64; 3],
    pub color: [Rgba; 3],
    pub line_width: [f64; 3],
}

impl Default for ErrorBarParams {
    fn default() -> Self {
        Self {
            cap_size: [0.0; 3],
            color: [FALLBACK_RGBA; 3],
            line_width: [0.0; 3],
        }
    }
}

/// Derive per-axis cap size, color and line width.
///
/// X and Y take the Z style whenever Z error bars are visible, unless they
/// set `copy_zstyle: false`. Axes left without a visible spec keep the zero
/// triple.
pub fn calculate_error_params(errors: [&ErrorBarSpec; 3]) -> ErrorBarParams {
    let mut params = ErrorBarParams::default();
    let z = errors[2];
    for (i, own) in errors.into_iter().enumerate() {
        let spec = if z.visible && own.copy_zstyle != Some(false) { z } else { own };
        if !spec.visible {
            continue;
        }
        params.cap_size[i] = spec.width.unwrap_or(0.0) / CAP_SIZE_SCALE;
        params.color[i] = spec.color.as_deref().map(to_rgba).unwrap_or(FALLBACK_RGBA);
        params.line_width[i] = spec.thickness.unwrap_or(0.0);
    }
    params
}
