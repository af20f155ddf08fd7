use scatter3d::error_bars::calculate_error_params;
use scatter3d::headless::{HeadlessRenderer, RenderCall};
use scatter3d::ir::{Datum, Visibility};
use scatter3d::{compile_params, plot, supply_defaults, LayoutContext, ResolvedSeries, Scene, SceneLayout};
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

fn resolve(input: Value, default_color: &str) -> ResolvedSeries {
    supply_defaults(&input, None, default_color, &LayoutContext::default()).series
}

/// Helper function to run scatter3d with arguments and stdin input
fn run_scatter3d(args: &[&str], input: &str) -> Result<Value, String> {
    let mut child = Command::new(env!("CARGO_BIN_EXE_scatter3d"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    // Write input to stdin
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| format!("Failed to write to stdin: {}", e))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| format!("Failed to wait for process: {}", e))?;

    if output.status.success() {
        serde_json::from_slice(&output.stdout).map_err(|e| format!("Output is not JSON: {}", e))
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

// =============================================================================
// Library
// =============================================================================

#[test]
fn test_coordinates_truncate_to_shortest() {
    let series = resolve(json!({"x": [1, 2, 3, 4], "y": [5, 6], "z": [7, 8, 9]}), "#1f77b4");
    assert_eq!(series.len(), 2);
    assert_eq!(series.x, vec![Datum::Number(1.0), Datum::Number(2.0)]);
    assert_eq!(series.y, vec![Datum::Number(5.0), Datum::Number(6.0)]);
    assert_eq!(series.z, vec![Datum::Number(7.0), Datum::Number(8.0)]);
}

#[test]
fn test_default_mode_follows_text() {
    let xyz = json!({"x": [1, 2], "y": [1, 2], "z": [1, 2]});
    let mut with_text = xyz.clone();
    with_text["text"] = json!(["a", "b"]);
    let mut explicit = with_text.clone();
    explicit["mode"] = json!("text");

    assert_eq!(resolve(xyz, "#1f77b4").mode.to_string(), "lines+markers");
    assert_eq!(resolve(with_text, "#1f77b4").mode.to_string(), "lines+markers+text");
    assert_eq!(resolve(explicit, "#1f77b4").mode.to_string(), "text");
}

#[test]
fn test_line_color_fallback() {
    let with_markers = resolve(
        json!({"x": [1], "y": [1], "z": [1], "marker": {"color": "#ff0000"}}),
        "#00ff00",
    );
    assert_eq!(with_markers.line.unwrap().color, "#ff0000");

    let lines_only = resolve(
        json!({"x": [1], "y": [1], "z": [1], "mode": "lines", "marker": {"color": "#ff0000"}}),
        "#00ff00",
    );
    assert_eq!(lines_only.line.unwrap().color, "#00ff00");
}

#[test]
fn test_error_style_copied_from_z() {
    let series = resolve(
        json!({
            "x": [1, 2], "y": [1, 2], "z": [1, 2],
            "error_z": {"value": 5, "width": 10, "color": "red"},
            "error_x": {"value": 5},
        }),
        "#1f77b4",
    );
    let params = calculate_error_params(series.error_bars());
    assert_eq!(params.cap_size, [0.1, 0.1, 0.1]);
    assert_eq!(params.color[0], params.color[2]);
    assert_eq!(params.color[1], [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(params.line_width[0], params.line_width[2]);
}

#[test]
fn test_replot_is_idempotent() {
    let series = resolve(json!({"uid": "s", "x": [1, 2], "y": [3, 4], "z": [5, 6]}), "#1f77b4");
    let layout = SceneLayout::default();
    assert_eq!(compile_params(&series, &layout), compile_params(&series, &layout));

    let mut scene = Scene::new(HeadlessRenderer::new());
    plot(&mut scene, &layout, &series).unwrap();
    plot(&mut scene, &layout, &series).unwrap();

    assert_eq!(scene.renderer().count_creates(), 1);
    assert_eq!(scene.renderer().count_updates(), 1);
    assert_eq!(scene.renderer().count_redraws(), 2);
    assert_eq!(scene.registry.len(), 1);
    assert_eq!(scene.registry.get("s").unwrap().handle.revision, 1);
}

#[test]
fn test_visibility_toggle() {
    let layout = SceneLayout::default();
    let mut scene = Scene::new(HeadlessRenderer::new());
    let series = resolve(json!({"uid": "s", "x": [1, 2], "y": [3, 4], "z": [5, 6]}), "#1f77b4");
    plot(&mut scene, &layout, &series).unwrap();

    let hidden = resolve(
        json!({"uid": "s", "visible": false, "x": [10, 20, 30], "y": [1, 1, 1], "z": [0, 0, 0]}),
        "#1f77b4",
    );
    assert_eq!(hidden.visible, Visibility::Hidden);
    plot(&mut scene, &layout, &hidden).unwrap();

    let object = scene.registry.get("s").unwrap();
    assert!(!object.visible);
    assert_eq!(object.handle.params.position, vec![[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]]);
    assert_eq!(object.handle.revision, 0);
}

#[test]
fn test_picking_ids_unique_until_wrap() {
    let layout = SceneLayout::default();
    let mut scene = Scene::new(HeadlessRenderer::new());
    let n = 63;
    for i in 0..n {
        let series = resolve(json!({"uid": format!("s{}", i), "x": [i], "y": [i], "z": [i]}), "#1f77b4");
        plot(&mut scene, &layout, &series).unwrap();
    }

    let created: Vec<[u8; 4]> = scene
        .renderer()
        .calls()
        .iter()
        .filter_map(|call| match call {
            RenderCall::Create { pick_ids, .. } => *pick_ids,
            _ => None,
        })
        .collect();
    assert_eq!(created.len(), n);
    for (i, ids) in created.iter().enumerate() {
        let base = (i * 4) as u8;
        assert_eq!(*ids, [base, base + 1, base + 2, base + 3]);
    }
    for i in 0..n {
        assert_eq!(scene.registry.get(&format!("s{}", i)).unwrap().pick_ids, created[i]);
    }
}

#[test]
fn test_previous_uid_is_kept() {
    let first = resolve(json!({"x": [1], "y": [1], "z": [1]}), "#1f77b4");
    assert!(!first.uid.is_empty());
    let second = supply_defaults(
        &json!({"x": [2], "y": [2], "z": [2]}),
        Some(&first),
        "#1f77b4",
        &LayoutContext::default(),
    )
    .series;
    assert_eq!(second.uid, first.uid);
}

// =============================================================================
// Binary
// =============================================================================

#[test]
fn test_end_to_end_render_params() {
    let csv = fs::read_to_string("test/helix.csv").expect("Failed to read test CSV");
    let result = run_scatter3d(&["--style", r#"{"textposition": "top left"}"#], &csv);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let params = result.unwrap();

    assert_eq!(params["position"].as_array().unwrap().len(), 6);
    assert_eq!(params["position"][1], json!([0.5, 0.87, 0.5]));
    assert_eq!(params["pick_ids"], json!([0, 1, 2, 3]));
    assert_eq!(params["text"]["offset"], json!([-1.0, -1.0]));
    assert_eq!(params["marker"]["size"], json!(16.0));
}

#[test]
fn test_end_to_end_resolved_series() {
    let csv = fs::read_to_string("test/helix.csv").expect("Failed to read test CSV");
    let result = run_scatter3d(
        &["--resolved", "--style", r#"{"uid": "helix", "marker": {"size": -4}}"#],
        &csv,
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let series = result.unwrap();

    assert_eq!(series["uid"], "helix");
    assert_eq!(series["type"], "scatter3d");
    assert_eq!(series["mode"], "lines+markers+text");
    assert_eq!(series["marker"]["size"], json!(8.0));
    assert_eq!(series["text"], json!(["p0", "p1", "p2", "p3", "p4", "p5"]));
}

#[test]
fn test_end_to_end_axis_types() {
    let csv = fs::read_to_string("test/timeline.csv").expect("Failed to read test CSV");
    let result = run_scatter3d(
        &["--x-type", "date", "--y-type", "category", "--z-type", "log"],
        &csv,
    );
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let params = result.unwrap();
    let position = params["position"].as_array().unwrap();

    assert_eq!(position[0][0], json!(1_704_067_200_000.0));
    assert_eq!(position[1][1], json!(1.0));
    assert_eq!(position[2][1], json!(0.0));
    assert!((position[1][2].as_f64().unwrap() - 2.0).abs() < 1e-9);
    assert!((position[2][2].as_f64().unwrap() - 3.0).abs() < 1e-9);
}

#[test]
fn test_end_to_end_missing_cells() {
    let csv = fs::read_to_string("test/ragged.csv").expect("Failed to read test CSV");
    let result = run_scatter3d(&["--style", r#"{"mode": "markers"}"#], &csv);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let params = result.unwrap();

    assert_eq!(params["position"][0], json!([1.0, 2.0, 3.0]));
    assert_eq!(params["position"][2], json!([7.0, null, null]));
    assert!(params["line"].is_null());
}

#[test]
fn test_end_to_end_json_points() {
    let points = r#"[
        {"x": 1, "y": 2, "z": 3, "text": "a"},
        {"x": 4, "y": null, "z": 6},
        {"x": 7, "y": 8, "z": 9, "text": "c"}
    ]"#;
    let result = run_scatter3d(&["--json", "--resolved"], points);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let series = result.unwrap();
    assert_eq!(series["y"], json!([2.0, null, 8.0]));
    assert_eq!(series["text"], json!(["a", "", "c"]));

    let result = run_scatter3d(&["--json", "--style", r#"{"mode": "markers"}"#], points);
    assert!(result.is_ok(), "Failed: {:?}", result.err());
    let params = result.unwrap();
    assert_eq!(params["position"][0], json!([1.0, 2.0, 3.0]));
    assert_eq!(params["position"][1], json!([4.0, null, 6.0]));
}

#[test]
fn test_json_points_must_be_flat_objects() {
    let result = run_scatter3d(&["--json"], r#"[{"x": [1, 2], "y": 1, "z": 1}]"#);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("JSON points"));

    let csv_as_json = run_scatter3d(&["--json"], "x,y,z\n1,2,3\n");
    assert!(csv_as_json.is_err());
}

#[test]
fn test_invalid_style_json() {
    let csv = fs::read_to_string("test/helix.csv").expect("Failed to read test CSV");
    let result = run_scatter3d(&["--style", "{not json"], &csv);
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("--style"));
}

#[test]
fn test_invalid_axis_type() {
    let result = run_scatter3d(&["--z-type", "polar"], "x,y,z\n1,2,3\n");
    assert!(result.is_err());
}

#[test]
fn test_hidden_series_has_nothing_to_draw() {
    let result = run_scatter3d(&["--style", r#"{"visible": false}"#], "x,y,z\n1,2,3\n");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("nothing to draw"));
}
