use crate::axis::{AxisType, CoordinateAxis};
use crate::color::{to_rgba, FALLBACK_RGBA};
use crate::error_bars::{calculate_error_params, compute_error_bounds};
use crate::ir::{
    ErrorParams, LineParams, MarkerParams, ProjectionParams, RenderParams, ResolvedSeries,
    SurfaceParams, TextParams,
};
use crate::layout::SceneLayout;
use crate::scatter::MarkerSymbol;

/// Markers are specified in 2D pixel diameters; the 3D renderer draws them
/// at about half that, so sizes are doubled.
const MARKER_SIZE_SCALE: f64 = 2.0;

// =============================================================================
// Geometry Helpers
// =============================================================================

/// Map every point through its axis: data to coordinate, then to log space
/// on log axes.
pub fn transform_points(series: &ResolvedSeries, axes: [&dyn CoordinateAxis; 3]) -> Vec<[f64; 3]> {
    let [xs, ys, zs] = series.coordinates();
    let len = xs.len().min(ys.len()).min(zs.len());

    (0..len)
        .map(|i| {
            let mut point = [0.0; 3];
            for (dim, data) in [xs, ys, zs].iter().enumerate() {
                let axis = axes[dim];
                let mut c = axis.data_to_coord(&data[i]);
                if axis.axis_type() == AxisType::Log {
                    c = axis.coord_to_log(c);
                }
                point[dim] = c;
            }
            point
        })
        .collect()
}

/// Screen-space text offset for a position keyword such as `"top left"`.
///
/// `bottom` pushes down (+y), `top` up (-y), `left` -x, `right` +x.
pub fn text_offset(position: &str) -> [f64; 2] {
    let mut offset = [0.0, 0.0];
    if position.contains("bottom") {
        offset[1] += 1.0;
    }
    if position.contains("top") {
        offset[1] -= 1.0;
    }
    if position.contains("left") {
        offset[0] -= 1.0;
    }
    if position.contains("right") {
        offset[0] += 1.0;
    }
    offset
}

// =============================================================================
// Parameter Compilation
// =============================================================================

/// Compile a resolved series into renderer parameters.
///
/// Returns `None` when there is nothing to draw. Picking ids are left unset;
/// they are assigned when the renderer object is first created.
pub fn compile_params(series: &ResolvedSeries, layout: &SceneLayout) -> Option<RenderParams> {
    let [xaxis, yaxis, zaxis] = layout.axes();
    let position = transform_points(series, [xaxis, yaxis, zaxis]);
    if position.is_empty() {
        return None;
    }
    tracing::trace!(uid = %series.uid, points = position.len(), "compiling render params");

    let line = series.line.as_ref().map(|line| LineParams {
        color: to_rgba(&line.color),
        width: line.width,
        dashes: line.dash.clone(),
    });

    let marker = series.marker.as_ref().map(|marker| {
        let mut color = to_rgba(&marker.color);
        color[3] *= marker.opacity as f32;
        let mut line_color = to_rgba(&marker.line.color);
        line_color[3] *= marker.opacity as f32;

        MarkerParams {
            color,
            size: MARKER_SIZE_SCALE * marker.size,
            glyph: marker_glyph(marker.symbol).to_string(),
            line_width: marker.line.width,
            line_color,
            angle: 0.0,
        }
    });

    let text = series.textposition.map(|position| {
        let font = series.textfont.clone().unwrap_or_default();
        TextParams {
            content: series.text.clone(),
            offset: text_offset(position.as_str()),
            color: to_rgba(&font.color),
            size: font.size,
            font: font.family,
            angle: 0.0,
        }
    });

    let error_style = calculate_error_params(series.error_bars());
    let error = ErrorParams {
        bounds: compute_error_bounds(series),
        color: error_style.color,
        line_width: error_style.line_width,
        cap_size: error_style.cap_size,
    };

    let surface = SurfaceParams {
        axis: series.surfaceaxis,
        color: series.surfacecolor.as_deref().map(to_rgba).unwrap_or(FALLBACK_RGBA),
    };

    Some(RenderParams {
        position,
        mode: series.mode,
        line,
        marker,
        text,
        projection: projection_params(series),
        error,
        surface,
        pick_ids: None,
    })
}

/// Unknown and glyph-less symbols draw as filled circles.
fn marker_glyph(symbol: MarkerSymbol) -> &'static str {
    symbol.glyph().unwrap_or_else(|| {
        tracing::debug!(symbol = symbol.as_str(), "no 3D glyph for marker symbol, drawing circle");
        MarkerSymbol::Circle.glyph().unwrap_or("●")
    })
}

/// Per-axis projection toggles. The renderer takes a single opacity and
/// scale, read from the x projection block whenever any axis projects.
fn projection_params(series: &ResolvedSeries) -> ProjectionParams {
    let mut params = ProjectionParams::default();
    for (i, axis) in series.projection.axes().into_iter().enumerate() {
        params.project[i] = axis.show;
        if axis.show {
            params.opacity = series.projection.x.opacity;
            params.scale = series.projection.x.scale;
        }
    }
    params
}
