use anyhow::{anyhow, Context, Result};
use clap::Parser;
use scatter3d::axis::{Axis, AxisType};
use scatter3d::data::SeriesData;
use scatter3d::headless::HeadlessRenderer;
use scatter3d::{plot, supply_defaults, LayoutContext, Scene, SceneLayout};
use serde_json::Value;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "scatter3d")]
#[command(about = "Resolve a 3D scatter series from CSV or JSON points and print its render parameters", long_about = None)]
struct Args {
    /// Series style as JSON (e.g., '{"mode": "markers", "marker": {"color": "red"}}')
    #[arg(long, default_value = "{}")]
    style: String,

    /// Layout as JSON, supplies the fallback text font
    #[arg(long, default_value = "{}")]
    layout: String,

    /// Default series color
    #[arg(long, default_value = "#1f77b4")]
    color: String,

    #[arg(long, default_value = "linear")]
    x_type: AxisType,

    #[arg(long, default_value = "linear")]
    y_type: AxisType,

    #[arg(long, default_value = "linear")]
    z_type: AxisType,

    /// Read stdin as a JSON array of point objects instead of CSV
    #[arg(long)]
    json: bool,

    /// Print the resolved series instead of render parameters
    #[arg(long)]
    resolved: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut series_in: Value =
        serde_json::from_str(&args.style).context("Failed to parse --style as JSON")?;
    let layout: LayoutContext =
        serde_json::from_str(&args.layout).context("Failed to parse --layout as JSON")?;

    // Read points from stdin
    let data = if args.json {
        SeriesData::from_json_reader(io::stdin().lock())
            .context("Failed to read JSON points from stdin")?
    } else {
        SeriesData::from_csv_reader(io::stdin().lock()).context("Failed to read CSV from stdin")?
    };
    data.inject_into(&mut series_in)?;

    let defaults = supply_defaults(&series_in, None, &args.color, &layout);
    for diagnostic in &defaults.diagnostics {
        tracing::warn!(path = %diagnostic.path, kind = ?diagnostic.kind, "attribute replaced by default");
    }
    let series = defaults.series;

    let output = if args.resolved {
        serde_json::to_string_pretty(&series)?
    } else {
        let scene_layout = SceneLayout {
            xaxis: axis_for(args.x_type, &data, "x"),
            yaxis: axis_for(args.y_type, &data, "y"),
            zaxis: axis_for(args.z_type, &data, "z"),
        };
        let mut scene = Scene::new(HeadlessRenderer::new());
        plot(&mut scene, &scene_layout, &series).context("Failed to render series")?;

        let object = scene
            .registry
            .get(&series.uid)
            .ok_or_else(|| anyhow!("Series '{}' has nothing to draw", series.uid))?;
        serde_json::to_string_pretty(&object.handle.params)?
    };

    // Write JSON to stdout
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", output).context("Failed to write to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}

/// Category axes take their categories from the column, in first-seen order.
fn axis_for(axis_type: AxisType, data: &SeriesData, column: &str) -> Axis {
    if axis_type != AxisType::Category {
        return Axis::new(axis_type);
    }
    let mut categories: Vec<String> = Vec::new();
    for datum in data.column(column).unwrap_or_default() {
        let name = datum.to_string();
        if !categories.contains(&name) {
            categories.push(name);
        }
    }
    Axis::with_categories(categories)
}
