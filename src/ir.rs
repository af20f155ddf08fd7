use crate::color::Rgba;
use crate::layout::Font;
use crate::scatter::{LineDash, MarkerSymbol, Mode, TextPosition};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

// =============================================================================
// Phase 1: Resolution
// =============================================================================

/// One coordinate value as the user supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Number(f64),
    Text(String),
    Missing,
}

impl Datum {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(Datum::Number).unwrap_or(Datum::Missing),
            Value::String(s) => Datum::Text(s.clone()),
            Value::Bool(b) => Datum::Number(if *b { 1.0 } else { 0.0 }),
            _ => Datum::Missing,
        }
    }

    /// Numeric reading: numbers as-is, numeric strings parsed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            Datum::Text(s) => s.trim().parse().ok(),
            Datum::Missing => None,
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Number(n) => write!(f, "{}", n),
            Datum::Text(s) => f.write_str(s),
            Datum::Missing => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    LegendOnly,
}

impl Visibility {
    /// Only fully visible series are drawn in a 3D scene.
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Visibility::Visible => serializer.serialize_bool(true),
            Visibility::Hidden => serializer.serialize_bool(false),
            Visibility::LegendOnly => serializer.serialize_str("legendonly"),
        }
    }
}

/// Per-point text: one label for every point, or one per point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TextContent {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub dash: LineDash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLine {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub color: String,
    pub symbol: MarkerSymbol,
    pub size: f64,
    pub opacity: f64,
    pub line: MarkerLine,
}

/// Shadow projection onto one axis plane. `opacity`/`scale` are only
/// resolved when some projection is shown.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AxisProjection {
    pub show: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Projection {
    pub x: AxisProjection,
    pub y: AxisProjection,
    pub z: AxisProjection,
}

impl Projection {
    pub fn axes(&self) -> [&AxisProjection; 3] {
        [&self.x, &self.y, &self.z]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorType {
    Percent,
    Constant,
    Sqrt,
    Data,
}

impl ErrorType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "percent" => Some(ErrorType::Percent),
            "constant" => Some(ErrorType::Constant),
            "sqrt" => Some(ErrorType::Sqrt),
            "data" => Some(ErrorType::Data),
            _ => None,
        }
    }
}

/// Resolved error-bar settings for one axis. Everything except `visible` is
/// `None` when the axis has no error bars.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ErrorBarSpec {
    pub visible: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symmetric: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array: Option<Vec<Datum>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrayminus: Option<Vec<Datum>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valueminus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_zstyle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

/// A fully defaulted 3D scatter series.
///
/// Style blocks gated on `mode` (`line`, `marker`, `textposition`,
/// `textfont`) are `None` when the mode does not include them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSeries {
    pub uid: String,
    #[serde(rename = "type")]
    pub trace_type: String,
    pub visible: Visibility,
    pub x: Vec<Datum>,
    pub y: Vec<Datum>,
    pub z: Vec<Datum>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<TextPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textfont: Option<Font>,
    pub surfaceaxis: i8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surfacecolor: Option<String>,
    pub projection: Projection,
    pub error_x: ErrorBarSpec,
    pub error_y: ErrorBarSpec,
    pub error_z: ErrorBarSpec,
}

impl ResolvedSeries {
    /// Number of points after truncation.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn coordinates(&self) -> [&[Datum]; 3] {
        [&self.x, &self.y, &self.z]
    }

    pub fn error_bars(&self) -> [&ErrorBarSpec; 3] {
        [&self.error_x, &self.error_y, &self.error_z]
    }
}

// =============================================================================
// Phase 2: Render parameters
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineParams {
    pub color: Rgba,
    pub width: f64,
    pub dashes: LineDash,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerParams {
    pub color: Rgba,
    pub size: f64,
    pub glyph: String,
    pub line_width: f64,
    pub line_color: Rgba,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextParams {
    pub content: Option<TextContent>,
    pub offset: [f64; 2],
    pub color: Rgba,
    pub size: f64,
    pub font: String,
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProjectionParams {
    /// Project onto the x, y and z planes.
    pub project: [bool; 3],
    pub opacity: Option<f64>,
    pub scale: Option<f64>,
}

/// Lower and upper error offsets for one point, `[lo, hi]` per axis.
pub type ErrorBound = [[f64; 3]; 2];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorParams {
    pub bounds: Option<Vec<ErrorBound>>,
    pub color: [Rgba; 3],
    pub line_width: [f64; 3],
    pub cap_size: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceParams {
    pub axis: i8,
    pub color: Rgba,
}

/// Everything the renderer needs to create or update one scatter object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderParams {
    pub position: Vec<[f64; 3]>,
    pub mode: Mode,
    pub line: Option<LineParams>,
    pub marker: Option<MarkerParams>,
    pub text: Option<TextParams>,
    pub projection: ProjectionParams,
    pub error: ErrorParams,
    pub surface: SurfaceParams,
    /// Assigned once, when the renderer object is created.
    pub pick_ids: Option<[u8; 4]>,
}
