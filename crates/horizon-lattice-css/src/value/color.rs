//! Color values.
//!
//! Numbers are read as `0xRRGGBB`. A negative number is the inverted color,
//! and a fractional part carries alpha:
//!
//! ```
//! use horizon_lattice_css::value::color::color_number_to_string;
//!
//! assert_eq!(color_number_to_string(f64::from(0xff0000)), "#ff0000");
//! assert_eq!(color_number_to_string(-f64::from(0xff0000)), "#00ffff");
//! assert_eq!(color_number_to_string(f64::from(0x112233) + 0.5), "#11223380");
//! ```

use crate::catalog::{Catalog, CatalogBuilder, FunctionDescriptor, WellKnownFunc};
use crate::value::convert::{format_number, v2s, ConvertOptions, FieldSpec};
use crate::value::StyleValue;
use crate::Result;

/// Format a color number as `#rrggbb` or `#rrggbbaa`.
pub fn color_number_to_string(n: f64) -> String {
    let magnitude = n.abs();
    let int = magnitude.trunc() as i64;
    let rgb = if n < 0.0 { !int } else { int } & 0xFF_FFFF;

    let fraction = magnitude.fract();
    if fraction > 0.0 {
        let alpha = (fraction * 255.0).round() as u8;
        format!("#{rgb:06x}{alpha:02x}")
    } else {
        format!("#{rgb:06x}")
    }
}

/// Format one color channel: `0` and magnitudes of at least 1 are plain
/// numbers, fractions are percentages. The sign is ignored.
pub fn separation_to_string(n: f64) -> String {
    let magnitude = n.abs();
    if magnitude == 0.0 || magnitude >= 1.0 {
        format_number(magnitude)
    } else {
        format!("{}%", (magnitude * 100.0).round())
    }
}

/// Normalize an alpha value to a fraction.
///
/// `1` and anything at or above `100` mean fully opaque and return `0`, the
/// no-alpha marker. Values between 1 and 100 are percentages.
pub fn normalize_alpha(a: f64) -> f64 {
    let a = a.abs();
    if a == 1.0 || a >= 100.0 {
        0.0
    } else if a > 1.0 {
        a / 100.0
    } else {
        a
    }
}

/// Attach an alpha channel to a color number.
///
/// The result keeps the color's sign, so an inverted color stays inverted.
pub fn alpha(color: f64, a: f64) -> f64 {
    let a = normalize_alpha(a);
    let magnitude = color.abs().trunc() + a;
    if color < 0.0 { -magnitude } else { magnitude }
}

/// `rgb(r g b)`.
pub fn rgb(r: f64, g: f64, b: f64) -> StyleValue {
    StyleValue::func("rgb", [r, g, b])
}

/// `rgb(r g b/a)`.
pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> StyleValue {
    StyleValue::func("rgb", [r, g, b, a])
}

/// `hsl(h s l)`. The hue is an angle; saturation and lightness are
/// percentages.
pub fn hsl(h: impl Into<StyleValue>, s: f64, l: f64) -> StyleValue {
    StyleValue::func("hsl", vec![h.into(), s.into(), l.into()])
}

/// `hsl(h s l/a)`.
pub fn hsla(h: impl Into<StyleValue>, s: f64, l: f64, a: f64) -> StyleValue {
    StyleValue::func("hsl", vec![h.into(), s.into(), l.into(), a.into()])
}

/// Register the color well-known functions and color functions.
pub(crate) fn register(builder: &mut CatalogBuilder) {
    use WellKnownFunc as W;

    builder
        .wkf(W::Color, color)
        .wkf(W::ColorSeparation, color_separation)
        .wkf(W::Alpha, alpha_channel)
        .function(FunctionDescriptor::params(
            "rgb",
            " ",
            [
                FieldSpec::wkf("r", W::ColorSeparation),
                FieldSpec::wkf("g", W::ColorSeparation),
                FieldSpec::wkf("b", W::ColorSeparation),
                FieldSpec::wkf("a", W::Alpha).infix("/"),
            ],
        ))
        .function(FunctionDescriptor::params(
            "hsl",
            " ",
            [
                FieldSpec::wkf("h", W::Angle),
                FieldSpec::wkf("s", W::Percent),
                FieldSpec::wkf("l", W::Percent),
                FieldSpec::wkf("a", W::Alpha).infix("/"),
            ],
        ));
}

fn color(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    v2s(value, &ConvertOptions::new().number(&color_number_to_string), catalog)
}

fn color_separation(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    v2s(value, &ConvertOptions::new().number(&separation_to_string), catalog)
}

fn alpha_channel(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    let number = |n: f64| match normalize_alpha(n) {
        a if a == 0.0 => String::new(),
        a => format_number(a),
    };
    v2s(value, &ConvertOptions::new().number(&number), catalog)
}
