//! Color resolution.
//!
//! Parses CSS-style color strings (named colors, `#rgb`/`#rgba`/`#rrggbb`/
//! `#rrggbbaa`, `rgb()`, `rgba()`, `hsl()`, `hsla()`) and normalizes them to
//! the 4-component float arrays the renderer consumes.

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, multispace0},
    combinator::{map, opt},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};
use plotters::style::{Color, RGBAColor};

/// Normalized color, each component in [0, 1].
pub type Rgba = [f32; 4];

/// Returned for anything the parser does not accept.
pub const FALLBACK_RGBA: Rgba = [0.0, 0.0, 0.0, 1.0];

/// Resolve a color spec to RGBA, falling back to opaque black.
///
/// A bad color never aborts a build; it is logged and replaced.
pub fn to_rgba(spec: &str) -> Rgba {
    match parse_color(spec) {
        Some(color) => normalize(&color),
        None => {
            tracing::warn!(color = spec, "unrecognized color, using fallback");
            FALLBACK_RGBA
        }
    }
}

/// True when `spec` is something [`parse_color`] understands.
pub fn is_valid_color(spec: &str) -> bool {
    parse_color(spec).is_some()
}

/// Convert a parsed color into normalized float components.
pub fn normalize(color: &RGBAColor) -> Rgba {
    let (r, g, b) = color.rgb();
    [
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        color.alpha().clamp(0.0, 1.0) as f32,
    ]
}

/// Parse a color string into an `RGBAColor`.
pub fn parse_color(spec: &str) -> Option<RGBAColor> {
    let spec = spec.trim();
    if spec.is_empty() {
        return None;
    }

    if spec.starts_with('#') {
        return parse_hex_color(spec);
    }

    if let Ok((rest, (func, args))) = color_function(spec) {
        if rest.trim().is_empty() {
            return from_function(func, &args);
        }
        return None;
    }

    named_color(&spec.to_lowercase())
}

/// Parse hex color (#RGB, #RGBA, #RRGGBB or #RRGGBBAA)
fn parse_hex_color(hex: &str) -> Option<RGBAColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(RGBAColor(short(0)?, short(1)?, short(2)?, 1.0)),
        4 => Some(RGBAColor(short(0)?, short(1)?, short(2)?, short(3)? as f64 / 255.0)),
        6 => Some(RGBAColor(long(0)?, long(2)?, long(4)?, 1.0)),
        8 => Some(RGBAColor(long(0)?, long(2)?, long(4)?, long(6)? as f64 / 255.0)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColorFunction {
    Rgb,
    Hsl,
}

/// A numeric argument and whether it carried a `%` suffix.
type Component = (f64, bool);

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn component(input: &str) -> IResult<&str, Component> {
    map(pair(double, opt(char('%'))), |(v, pct)| (v, pct.is_some()))(input)
}

/// Parse rgb(...), rgba(...), hsl(...) or hsla(...)
fn color_function(input: &str) -> IResult<&str, (ColorFunction, Vec<Component>)> {
    let (input, func) = ws(alt((
        map(tag_no_case("rgba"), |_| ColorFunction::Rgb),
        map(tag_no_case("rgb"), |_| ColorFunction::Rgb),
        map(tag_no_case("hsla"), |_| ColorFunction::Hsl),
        map(tag_no_case("hsl"), |_| ColorFunction::Hsl),
    )))(input)?;

    let (input, args) = delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), ws(component)),
        ws(char(')')),
    )(input)?;

    Ok((input, (func, args)))
}

fn from_function(func: ColorFunction, args: &[Component]) -> Option<RGBAColor> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let alpha = args.get(3).map(|&a| alpha(a)).unwrap_or(1.0);

    match func {
        ColorFunction::Rgb => {
            let channel = |(v, pct): Component| {
                let v = if pct { v * 2.55 } else { v };
                v.round().clamp(0.0, 255.0) as u8
            };
            Some(RGBAColor(channel(args[0]), channel(args[1]), channel(args[2]), alpha))
        }
        ColorFunction::Hsl => {
            let (r, g, b) = hsl_to_rgb(args[0].0, unit(args[1]), unit(args[2]));
            Some(RGBAColor(r, g, b, alpha))
        }
    }
}

/// Alpha is a fraction or a percentage, clamped into [0, 1].
fn alpha((v, pct): Component) -> f64 {
    let v = if pct { v / 100.0 } else { v };
    v.clamp(0.0, 1.0)
}

/// Saturation and lightness: percentages, or bare numbers above 1 read as
/// percentages, mapped into [0, 1].
fn unit((v, pct): Component) -> f64 {
    let v = if pct || v > 1.0 { v / 100.0 } else { v };
    v.clamp(0.0, 1.0)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0) / 360.0;
    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round().clamp(0.0, 255.0) as u8
    };
    (hue(h + 1.0 / 3.0), hue(h), hue(h - 1.0 / 3.0))
}

/// CSS named colors, sorted by name for binary search.
const NAMED_COLORS: [(&str, [u8; 3]); 148] = [
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("rebeccapurple", [102, 51, 153]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

fn named_color(name: &str) -> Option<RGBAColor> {
    if name == "transparent" {
        return Some(RGBAColor(0, 0, 0, 0.0));
    }
    NAMED_COLORS
        .binary_search_by(|(candidate, _)| candidate.cmp(&name))
        .ok()
        .map(|i| {
            let [r, g, b] = NAMED_COLORS[i].1;
            RGBAColor(r, g, b, 1.0)
        })
}
