//! Layout context handed in by the host: the fallback font for series text
//! and the three axes of a 3D scene.

use crate::axis::Axis;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(default = "default_size")]
    pub size: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_family() -> String { "\"Open Sans\", verdana, arial, sans-serif".to_string() }
fn default_size() -> f64 { 12.0 }
fn default_color() -> String { "#444".to_string() }

impl Default for Font {
    fn default() -> Self {
        Self {
            family: default_family(),
            size: default_size(),
            color: default_color(),
        }
    }
}

impl Font {
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "family": self.family,
            "size": self.size,
            "color": self.color,
        })
    }

    /// Read back a coerced font object, filling gaps from `fallback`.
    pub fn from_value(value: &Value, fallback: &Font) -> Self {
        Self {
            family: value
                .get("family")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| fallback.family.clone()),
            size: value.get("size").and_then(Value::as_f64).unwrap_or(fallback.size),
            color: value
                .get("color")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| fallback.color.clone()),
        }
    }
}

/// Plot-wide settings consulted while defaulting a series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutContext {
    #[serde(default)]
    pub font: Font,
}

/// Per-scene axes used when building render parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneLayout {
    #[serde(default)]
    pub xaxis: Axis,
    #[serde(default)]
    pub yaxis: Axis,
    #[serde(default)]
    pub zaxis: Axis,
}

impl SceneLayout {
    pub fn axes(&self) -> [&Axis; 3] {
        [&self.xaxis, &self.yaxis, &self.zaxis]
    }
}
