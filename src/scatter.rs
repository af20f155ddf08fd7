//! The 2D scatter series module.
//!
//! Owns the attribute declarations the 3D series borrows (`mode`, `text`,
//! `line.*`, `marker.*`, `textposition`, `textfont`) and the typed forms of
//! its enumerated values.

use crate::schema::{AttrSpec, Schema, ValType};
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::fmt;

static ATTRIBUTES: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .with(
            "mode",
            AttrSpec::new(ValType::Flaglist {
                flags: &["lines", "markers", "text"],
                extras: &["none"],
            }),
        )
        .with("text", AttrSpec::new(ValType::String { array_ok: true }).with_default(""))
        .with(
            "textposition",
            AttrSpec::enumerated(TextPosition::ALL.iter().map(|p| p.as_str()))
                .with_default("middle center"),
        )
        .with("textfont", AttrSpec::new(ValType::Font))
        .with("line.color", AttrSpec::color())
        .with("line.width", AttrSpec::number(Some(0.0), None).with_default(2.0))
        .with("line.dash", AttrSpec::new(ValType::String { array_ok: false }).with_default("solid"))
        .with("marker.color", AttrSpec::color())
        .with(
            "marker.symbol",
            AttrSpec::enumerated(MarkerSymbol::ALL.iter().map(|s| s.as_str())).with_default("circle"),
        )
        .with("marker.size", AttrSpec::number(Some(0.0), None).with_default(6.0))
        .with("marker.opacity", AttrSpec::number(Some(0.0), Some(1.0)))
        .with("marker.line.color", AttrSpec::color())
        .with("marker.line.width", AttrSpec::number(Some(0.0), None).with_default(0.0))
});

/// The 2D scatter attribute table.
pub fn attributes() -> &'static Schema {
    &ATTRIBUTES
}

/// Which of lines, markers and text a series draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(into = "String")]
pub struct Mode {
    pub lines: bool,
    pub markers: bool,
    pub text: bool,
}

impl Mode {
    pub const LINES_MARKERS: Mode = Mode { lines: true, markers: true, text: false };
    pub const LINES_MARKERS_TEXT: Mode = Mode { lines: true, markers: true, text: true };

    /// Parse a `+`-joined flag string. `"none"` and unknown flags draw nothing.
    pub fn parse(s: &str) -> Self {
        let mut mode = Mode::default();
        for flag in s.split('+') {
            match flag {
                "lines" => mode.lines = true,
                "markers" => mode.markers = true,
                "text" => mode.text = true,
                _ => {}
            }
        }
        mode
    }

    pub fn has_lines(&self) -> bool {
        self.lines
    }

    pub fn has_markers(&self) -> bool {
        self.markers
    }

    pub fn has_text(&self) -> bool {
        self.text
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: Vec<&str> = [(self.lines, "lines"), (self.markers, "markers"), (self.text, "text")]
            .into_iter()
            .filter_map(|(on, name)| on.then_some(name))
            .collect();
        if flags.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&flags.join("+"))
        }
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.to_string()
    }
}

/// Marker symbols known to the 2D module. Anything else is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerSymbol {
    Circle,
    CircleOpen,
    Square,
    SquareOpen,
    Diamond,
    DiamondOpen,
    Cross,
    CrossOpen,
    X,
    XOpen,
    TriangleUp,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Pentagon,
    Hexagon,
    Star,
    Unknown,
}

impl MarkerSymbol {
    pub const ALL: [MarkerSymbol; 17] = [
        MarkerSymbol::Circle,
        MarkerSymbol::CircleOpen,
        MarkerSymbol::Square,
        MarkerSymbol::SquareOpen,
        MarkerSymbol::Diamond,
        MarkerSymbol::DiamondOpen,
        MarkerSymbol::Cross,
        MarkerSymbol::CrossOpen,
        MarkerSymbol::X,
        MarkerSymbol::XOpen,
        MarkerSymbol::TriangleUp,
        MarkerSymbol::TriangleDown,
        MarkerSymbol::TriangleLeft,
        MarkerSymbol::TriangleRight,
        MarkerSymbol::Pentagon,
        MarkerSymbol::Hexagon,
        MarkerSymbol::Star,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerSymbol::Circle => "circle",
            MarkerSymbol::CircleOpen => "circle-open",
            MarkerSymbol::Square => "square",
            MarkerSymbol::SquareOpen => "square-open",
            MarkerSymbol::Diamond => "diamond",
            MarkerSymbol::DiamondOpen => "diamond-open",
            MarkerSymbol::Cross => "cross",
            MarkerSymbol::CrossOpen => "cross-open",
            MarkerSymbol::X => "x",
            MarkerSymbol::XOpen => "x-open",
            MarkerSymbol::TriangleUp => "triangle-up",
            MarkerSymbol::TriangleDown => "triangle-down",
            MarkerSymbol::TriangleLeft => "triangle-left",
            MarkerSymbol::TriangleRight => "triangle-right",
            MarkerSymbol::Pentagon => "pentagon",
            MarkerSymbol::Hexagon => "hexagon",
            MarkerSymbol::Star => "star",
            MarkerSymbol::Unknown => "unknown",
        }
    }

    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str() == name)
            .unwrap_or(MarkerSymbol::Unknown)
    }

    /// Glyph the 3D renderer draws for this symbol, if it has one.
    pub fn glyph(&self) -> Option<&'static str> {
        match self {
            MarkerSymbol::Circle => Some("●"),
            MarkerSymbol::CircleOpen => Some("○"),
            MarkerSymbol::Square => Some("■"),
            MarkerSymbol::SquareOpen => Some("□"),
            MarkerSymbol::Diamond => Some("◆"),
            MarkerSymbol::DiamondOpen => Some("◇"),
            MarkerSymbol::Cross => Some("+"),
            MarkerSymbol::X => Some("❌"),
            _ => None,
        }
    }
}

impl Serialize for MarkerSymbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Line dash pattern: a named style or explicit dash lengths in pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dot,
    Dash,
    LongDash,
    DashDot,
    LongDashDot,
    Lengths(Vec<f64>),
}

impl LineDash {
    /// Parse a named dash or a length list such as `"5px,10px"`.
    pub fn parse(s: &str) -> Option<Self> {
        let dash = match s.trim() {
            "solid" => LineDash::Solid,
            "dot" => LineDash::Dot,
            "dash" => LineDash::Dash,
            "longdash" => LineDash::LongDash,
            "dashdot" => LineDash::DashDot,
            "longdashdot" => LineDash::LongDashDot,
            other => {
                let lengths = other
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|part| !part.is_empty())
                    .map(|part| {
                        let part = part.trim_end_matches("px").trim_end_matches('%');
                        part.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
                    })
                    .collect::<Option<Vec<f64>>>()?;
                if lengths.is_empty() {
                    return None;
                }
                LineDash::Lengths(lengths)
            }
        };
        Some(dash)
    }
}

/// Where text sits relative to its point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl TextPosition {
    pub const ALL: [TextPosition; 9] = [
        TextPosition::TopLeft,
        TextPosition::TopCenter,
        TextPosition::TopRight,
        TextPosition::MiddleLeft,
        TextPosition::MiddleCenter,
        TextPosition::MiddleRight,
        TextPosition::BottomLeft,
        TextPosition::BottomCenter,
        TextPosition::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextPosition::TopLeft => "top left",
            TextPosition::TopCenter => "top center",
            TextPosition::TopRight => "top right",
            TextPosition::MiddleLeft => "middle left",
            TextPosition::MiddleCenter => "middle center",
            TextPosition::MiddleRight => "middle right",
            TextPosition::BottomLeft => "bottom left",
            TextPosition::BottomCenter => "bottom center",
            TextPosition::BottomRight => "bottom right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == name)
    }
}

impl Serialize for TextPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
