//! Series defaulting.
//!
//! Turns a sparse, user-authored series object into a [`ResolvedSeries`].
//! Attribute order matters: coordinates first, then text (which picks the
//! default mode), then the mode-gated style blocks, then the surface and
//! projection settings, and error bars last in Z, Y, X order so Y and X can
//! read the resolved Z style.

use crate::coerce::{Coercer, Diagnostic, DiagnosticKind};
use crate::error_bars::{self, Dim};
use crate::ir::{
    AxisProjection, Datum, LineStyle, MarkerLine, MarkerStyle, Projection, ResolvedSeries,
    TextContent, Visibility,
};
use crate::layout::{Font, LayoutContext};
use crate::scatter::{self, LineDash, MarkerSymbol, Mode, TextPosition};
use crate::schema::{AttrSpec, Schema, ValType};
use once_cell::sync::Lazy;
use serde_json::Value;
use uuid::Uuid;

pub const TRACE_TYPE: &str = "scatter3d";

const PROJECTION_PATHS: [[&str; 3]; 3] = [
    ["projection.x.show", "projection.x.opacity", "projection.x.scale"],
    ["projection.y.show", "projection.y.opacity", "projection.y.scale"],
    ["projection.z.show", "projection.z.opacity", "projection.z.scale"],
];

/// Attributes borrowed verbatim from the 2D scatter module.
const FROM_SCATTER: [&str; 13] = [
    "text",
    "mode",
    "line.color",
    "line.width",
    "line.dash",
    "marker.color",
    "marker.symbol",
    "marker.size",
    "marker.opacity",
    "marker.line.color",
    "marker.line.width",
    "textposition",
    "textfont",
];

static ATTRIBUTES: Lazy<Schema> = Lazy::new(|| {
    let schema = Schema::new()
        .with("uid", AttrSpec::new(ValType::String { array_ok: false }))
        .with(
            "visible",
            AttrSpec::new(ValType::Enumerated(vec![
                Value::Bool(true),
                Value::Bool(false),
                Value::from("legendonly"),
            ]))
            .with_default(true),
        )
        .with("x", AttrSpec::data_array())
        .with("y", AttrSpec::data_array())
        .with("z", AttrSpec::data_array())
        .with("surfaceaxis", AttrSpec::enumerated([-1, 0, 1, 2]).with_default(-1))
        .with("surfacecolor", AttrSpec::color());

    PROJECTION_PATHS
        .iter()
        .fold(schema, |schema, &[show, opacity, scale]| {
            schema
                .with(show, AttrSpec::boolean(false))
                .with(opacity, AttrSpec::number(Some(0.0), Some(1.0)).with_default(1.0))
                .with(scale, AttrSpec::number(Some(0.0), Some(10.0)).with_default(2.0 / 3.0))
        })
        .inherit(scatter::attributes(), &FROM_SCATTER)
});

/// The flattened 3D scatter attribute table.
pub fn attributes() -> &'static Schema {
    &ATTRIBUTES
}

/// A resolved series together with every value the coercer had to replace.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub series: ResolvedSeries,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve a raw series object.
///
/// `previous` supplies the uid when the input has none, so a series keeps
/// its identity across edits. `default_color` is the palette color the host
/// assigned to this series. Never fails: malformed values fall back to
/// defaults and are reported in [`Defaults::diagnostics`].
pub fn supply_defaults(
    series_in: &Value,
    previous: Option<&ResolvedSeries>,
    default_color: &str,
    layout: &LayoutContext,
) -> Defaults {
    let mut diagnostics = Vec::new();
    let mut c = Coercer::new(series_in, attributes(), "", &mut diagnostics);

    let uid = c
        .string("uid", None)
        .filter(|s| !s.is_empty())
        .or_else(|| previous.map(|p| p.uid.clone()))
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let visible = match c.value("visible", None) {
        Some(Value::Bool(false)) => Visibility::Hidden,
        Some(Value::String(s)) if s == "legendonly" => Visibility::LegendOnly,
        _ => Visibility::Visible,
    };

    let [x, y, z] = supply_xyz(&mut c);

    let text = text_content(c.value("text", None));
    let mode_dflt = if text.is_some() { Mode::LINES_MARKERS_TEXT } else { Mode::LINES_MARKERS };
    let mode = c
        .string("mode", Some(mode_dflt.to_string().as_str()))
        .map(|s| Mode::parse(&s))
        .unwrap_or(mode_dflt);

    let marker = mode.has_markers().then(|| supply_marker(&mut c, default_color));

    let line = if mode.has_lines() {
        let color_dflt = marker.as_ref().map_or(default_color, |m| m.color.as_str());
        Some(supply_line(&mut c, color_dflt))
    } else {
        None
    };

    let (textposition, textfont) = if mode.has_text() {
        let position = c
            .string("textposition", Some(TextPosition::TopCenter.as_str()))
            .and_then(|s| TextPosition::from_name(&s))
            .unwrap_or(TextPosition::TopCenter);
        let font = c
            .value("textfont", Some(layout.font.to_value()))
            .map(|v| Font::from_value(&v, &layout.font))
            .unwrap_or_else(|| layout.font.clone());
        (Some(position), Some(font))
    } else {
        (None, None)
    };

    let surfaceaxis = c.number("surfaceaxis", None).map_or(-1, |v| v as i8);
    let surfacecolor = if surfaceaxis >= 0 {
        let dflt = line
            .as_ref()
            .map(|l| l.color.as_str())
            .or_else(|| marker.as_ref().map(|m| m.color.as_str()));
        c.string("surfacecolor", dflt)
    } else {
        None
    };

    let projection = supply_projection(&mut c);

    let error_z = error_bars::supply_defaults(series_in, default_color, Dim::Z, None, &mut diagnostics);
    let error_y = error_bars::supply_defaults(series_in, default_color, Dim::Y, Some(&error_z), &mut diagnostics);
    let error_x = error_bars::supply_defaults(series_in, default_color, Dim::X, Some(&error_z), &mut diagnostics);

    let series = ResolvedSeries {
        uid,
        trace_type: TRACE_TYPE.to_string(),
        visible,
        x,
        y,
        z,
        mode,
        text,
        line,
        marker,
        textposition,
        textfont,
        surfaceaxis,
        surfacecolor,
        projection,
        error_x,
        error_y,
        error_z,
    };

    tracing::debug!(
        uid = %series.uid,
        len = series.len(),
        mode = %series.mode,
        diagnostics = diagnostics.len(),
        "resolved series defaults"
    );

    Defaults { series, diagnostics }
}

/// Coerce x, y and z and truncate them to a common length. If any of the
/// three is missing, all three come back empty.
fn supply_xyz(c: &mut Coercer<'_>) -> [Vec<Datum>; 3] {
    let arrays = ["x", "y", "z"].map(|path| match c.value(path, None) {
        Some(Value::Array(items)) => Some(items.iter().map(Datum::from_value).collect::<Vec<_>>()),
        _ => None,
    });

    if arrays.iter().any(Option::is_none) {
        return Default::default();
    }

    let len = arrays.iter().flatten().map(Vec::len).min().unwrap_or(0);
    arrays.map(|a| {
        let mut a = a.unwrap_or_default();
        a.truncate(len);
        a
    })
}

/// Only non-empty text counts; it switches the default mode to include text.
fn text_content(value: Option<Value>) -> Option<TextContent> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(TextContent::Single(s)),
        Value::Array(items) if !items.is_empty() => Some(TextContent::PerPoint(
            items
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        )),
        _ => None,
    }
}

fn supply_marker(c: &mut Coercer<'_>, default_color: &str) -> MarkerStyle {
    let color = c
        .string("marker.color", Some(default_color))
        .unwrap_or_else(|| default_color.to_string());
    let symbol = c
        .string("marker.symbol", None)
        .map(|s| MarkerSymbol::from_name(&s))
        .unwrap_or(MarkerSymbol::Circle);
    let size = c.number("marker.size", Some(8.0)).unwrap_or(8.0);
    let opacity = c.number("marker.opacity", Some(1.0)).unwrap_or(1.0);
    let line_width = c.number("marker.line.width", Some(0.0)).unwrap_or(0.0);
    let line_color = c
        .string("marker.line.color", Some("rgb(0,0,0)"))
        .unwrap_or_else(|| "rgb(0,0,0)".to_string());

    MarkerStyle {
        color,
        symbol,
        size,
        opacity,
        line: MarkerLine { color: line_color, width: line_width },
    }
}

fn supply_line(c: &mut Coercer<'_>, color_dflt: &str) -> LineStyle {
    let color = c
        .string("line.color", Some(color_dflt))
        .unwrap_or_else(|| color_dflt.to_string());
    let width = c.number("line.width", None).unwrap_or(2.0);
    let dash = match c.string("line.dash", None) {
        Some(s) => LineDash::parse(&s).unwrap_or_else(|| {
            c.record("line.dash", DiagnosticKind::InvalidValue);
            LineDash::Solid
        }),
        None => LineDash::Solid,
    };
    LineStyle { color, width, dash }
}

/// Each axis block is resolved only when its `show` is set. The x block's
/// opacity and scale are also filled whenever any axis is shown, since
/// the renderer reads one global opacity/scale from there.
fn supply_projection(c: &mut Coercer<'_>) -> Projection {
    let mut projection = Projection::default();
    let [x_paths, _, _] = PROJECTION_PATHS;

    for (i, &[show, opacity, scale]) in PROJECTION_PATHS.iter().enumerate() {
        if !c.boolean(show, None).unwrap_or(false) {
            continue;
        }
        projection.x.opacity = c.number(x_paths[1], None);
        projection.x.scale = c.number(x_paths[2], None);

        let block = AxisProjection {
            show: true,
            opacity: c.number(opacity, None),
            scale: c.number(scale, None),
        };
        match i {
            0 => projection.x = block,
            1 => projection.y = block,
            _ => projection.z = block,
        }
    }
    projection
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolve(input: Value) -> ResolvedSeries {
        supply_defaults(&input, None, "#1f77b4", &LayoutContext::default()).series
    }

    #[test]
    fn test_schema_is_flattened() {
        let schema = attributes();
        for path in FROM_SCATTER {
            assert!(schema.get(path).is_some(), "missing {}", path);
        }
        assert!(schema.get("projection.z.scale").is_some());
    }

    #[test]
    fn test_truncates_to_shortest() {
        let s = resolve(json!({"x": [1, 2, 3, 4], "y": [5, 6], "z": [7, 8, 9]}));
        assert_eq!(s.x, vec![Datum::Number(1.0), Datum::Number(2.0)]);
        assert_eq!(s.y.len(), 2);
        assert_eq!(s.z, vec![Datum::Number(7.0), Datum::Number(8.0)]);
    }

    #[test]
    fn test_missing_axis_empties_all() {
        let s = resolve(json!({"x": [1, 2], "y": [3, 4]}));
        assert!(s.is_empty());
        assert!(s.y.is_empty() && s.z.is_empty());
    }

    #[test]
    fn test_mode_default_follows_text() {
        assert_eq!(resolve(json!({})).mode.to_string(), "lines+markers");
        assert_eq!(resolve(json!({"text": ["a"]})).mode.to_string(), "lines+markers+text");
        assert_eq!(resolve(json!({"text": "a", "mode": "markers"})).mode.to_string(), "markers");
    }

    #[test]
    fn test_mode_gates_style_blocks() {
        let s = resolve(json!({"mode": "markers", "line": {"color": "red"}}));
        assert!(s.line.is_none());
        assert!(s.marker.is_some());
        assert!(s.textposition.is_none() && s.textfont.is_none());

        let s = resolve(json!({"mode": "lines"}));
        assert!(s.marker.is_none());
        assert!(s.line.is_some());
    }

    #[test]
    fn test_line_color_falls_back_to_marker() {
        let s = resolve(json!({"marker": {"color": "#ff0000"}}));
        assert_eq!(s.line.unwrap().color, "#ff0000");

        let s = resolve(json!({"mode": "lines", "marker": {"color": "#ff0000"}}));
        assert_eq!(s.line.unwrap().color, "#1f77b4");

        let s = resolve(json!({"line": {"color": "blue"}, "marker": {"color": "#ff0000"}}));
        assert_eq!(s.line.unwrap().color, "blue");
    }

    #[test]
    fn test_marker_defaults() {
        let m = resolve(json!({})).marker.unwrap();
        assert_eq!(m.color, "#1f77b4");
        assert_eq!(m.symbol, MarkerSymbol::Circle);
        assert_eq!(m.size, 8.0);
        assert_eq!(m.opacity, 1.0);
        assert_eq!(m.line, MarkerLine { color: "rgb(0,0,0)".into(), width: 0.0 });
    }

    #[test]
    fn test_text_defaults_use_layout_font() {
        let layout = LayoutContext {
            font: Font { family: "Courier".into(), size: 10.0, color: "#000".into() },
        };
        let d = supply_defaults(&json!({"text": "hi", "textfont": {"size": 20}}), None, "red", &layout);
        assert_eq!(d.series.textposition, Some(TextPosition::TopCenter));
        assert_eq!(
            d.series.textfont,
            Some(Font { family: "Courier".into(), size: 20.0, color: "#000".into() })
        );
    }

    #[test]
    fn test_surface_color_only_with_axis() {
        let s = resolve(json!({"line": {"color": "green"}}));
        assert_eq!(s.surfaceaxis, -1);
        assert_eq!(s.surfacecolor, None);

        let s = resolve(json!({"surfaceaxis": 2, "line": {"color": "green"}}));
        assert_eq!(s.surfaceaxis, 2);
        assert_eq!(s.surfacecolor.as_deref(), Some("green"));

        let s = resolve(json!({"surfaceaxis": 7}));
        assert_eq!(s.surfaceaxis, -1);
    }

    #[test]
    fn test_projection_blocks() {
        let s = resolve(json!({"projection": {"y": {"show": true, "opacity": 0.5, "scale": 20}}}));
        assert!(!s.projection.x.show);
        assert_eq!(s.projection.x.opacity, Some(1.0));
        assert_eq!(s.projection.x.scale, Some(2.0 / 3.0));
        assert_eq!(s.projection.y.opacity, Some(0.5));
        assert_eq!(s.projection.y.scale, Some(2.0 / 3.0));
        assert_eq!(s.projection.z, AxisProjection::default());
    }

    #[test]
    fn test_bad_values_become_diagnostics() {
        let d = supply_defaults(
            &json!({"marker": {"opacity": 3, "color": "nope"}, "line": {"dash": "wavy"}}),
            None,
            "red",
            &LayoutContext::default(),
        );
        let marker = d.series.marker.unwrap();
        assert_eq!(marker.opacity, 1.0);
        assert_eq!(marker.color, "red");
        assert_eq!(d.series.line.unwrap().dash, LineDash::Solid);
        let paths: Vec<&str> = d.diagnostics.iter().map(|d| d.path.as_str()).collect();
        assert!(paths.contains(&"marker.opacity"));
        assert!(paths.contains(&"marker.color"));
        assert!(paths.contains(&"line.dash"));
    }

    #[test]
    fn test_css_named_colors_are_kept() {
        let d = supply_defaults(
            &json!({"marker": {"color": "chartreuse"}, "line": {"color": "darkviolet"}}),
            None,
            "#1f77b4",
            &LayoutContext::default(),
        );
        assert_eq!(d.series.marker.unwrap().color, "chartreuse");
        assert_eq!(d.series.line.unwrap().color, "darkviolet");
        assert!(d.diagnostics.is_empty());
    }

    #[test]
    fn test_uid_and_visibility() {
        let first = resolve(json!({"visible": "legendonly"}));
        assert_eq!(first.visible, Visibility::LegendOnly);
        assert!(!first.uid.is_empty());

        let again = supply_defaults(&json!({}), Some(&first), "red", &LayoutContext::default()).series;
        assert_eq!(again.uid, first.uid);

        let named = resolve(json!({"uid": "abc", "visible": false}));
        assert_eq!(named.uid, "abc");
        assert_eq!(named.visible, Visibility::Hidden);
    }

    #[test]
    fn test_error_bars_resolved_in_order() {
        let s = resolve(json!({"error_z": {"value": 2}, "error_x": {"value": 1}}));
        assert!(s.error_z.visible);
        assert_eq!(s.error_x.copy_zstyle, Some(true));
        assert!(!s.error_y.visible);
    }
}
