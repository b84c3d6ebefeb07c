//! Well-known value categories and their shared converters.

use crate::catalog::{Catalog, CatalogBuilder};
use crate::value::convert::{a2s, obj2str, v2s, ConvertOptions, FieldSpec};
use crate::value::StyleValue;
use crate::Result;

/// A value category with one registered converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WellKnownFunc {
    /// Unitless number.
    Number,
    /// Length: integers in pixels, fractions in ems by default.
    Length,
    /// Percentage: fractions are multiplied by 100.
    Percent,
    /// Angle.
    Angle,
    /// Time.
    Time,
    /// Resolution.
    Resolution,
    /// Frequency.
    Frequency,
    /// Color, with numbers read as `0xRRGGBB`.
    Color,
    /// One color channel (`rgb()` component).
    ColorSeparation,
    /// Color alpha channel.
    Alpha,
    /// A position (`center`, `10px 20px`).
    Position,
    /// A position preceded by `at`.
    AtPosition,
    /// Border radius, with an optional `/`-separated vertical part.
    BorderRadius,
    /// One grid track size.
    GridTrack,
    /// A grid track list with optional `[line names]`.
    GridTrackList,
    /// A box shadow record.
    BoxShadow,
    /// A quoted string.
    Quoted,
}

impl WellKnownFunc {
    /// All well-known functions.
    pub const ALL: [WellKnownFunc; 17] = [
        WellKnownFunc::Number,
        WellKnownFunc::Length,
        WellKnownFunc::Percent,
        WellKnownFunc::Angle,
        WellKnownFunc::Time,
        WellKnownFunc::Resolution,
        WellKnownFunc::Frequency,
        WellKnownFunc::Color,
        WellKnownFunc::ColorSeparation,
        WellKnownFunc::Alpha,
        WellKnownFunc::Position,
        WellKnownFunc::AtPosition,
        WellKnownFunc::BorderRadius,
        WellKnownFunc::GridTrack,
        WellKnownFunc::GridTrackList,
        WellKnownFunc::BoxShadow,
        WellKnownFunc::Quoted,
    ];
}

/// Register the layout-related well-known functions.
pub(crate) fn register(builder: &mut CatalogBuilder) {
    builder
        .wkf(WellKnownFunc::Position, position)
        .wkf(WellKnownFunc::AtPosition, at_position)
        .wkf(WellKnownFunc::BorderRadius, border_radius)
        .wkf(WellKnownFunc::GridTrack, grid_track)
        .wkf(WellKnownFunc::GridTrackList, grid_track_list)
        .wkf(WellKnownFunc::BoxShadow, box_shadow)
        .wkf(WellKnownFunc::Quoted, quoted);
}

fn position(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    catalog.convert(WellKnownFunc::Length, value)
}

fn at_position(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    let position = position(value, catalog)?;
    Ok(if position.is_empty() {
        position
    } else {
        format!("at {position}")
    })
}

fn border_radius(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    match value {
        StyleValue::List(items) if matches!(items.first(), Some(StyleValue::List(_))) => {
            let item = |v: &StyleValue| catalog.convert(WellKnownFunc::Length, v);
            a2s(items, &ConvertOptions::new().item(&item).separator(" / "), catalog)
        }
        _ => catalog.convert(WellKnownFunc::Length, value),
    }
}

fn grid_track(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    catalog.convert(WellKnownFunc::Length, value)
}

fn grid_track_list(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    let item = |v: &StyleValue| -> Result<String> {
        match v {
            StyleValue::List(names) => {
                let names = a2s(names, &ConvertOptions::new(), catalog)?;
                Ok(format!("[{names}]"))
            }
            other => grid_track(other, catalog),
        }
    };
    match value {
        StyleValue::List(items) => a2s(items, &ConvertOptions::new().item(&item), catalog),
        other => grid_track(other, catalog),
    }
}

fn box_shadow(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    let fields = [
        FieldSpec::with_fn("inset", inset_flag),
        FieldSpec::wkf("x", WellKnownFunc::Length),
        FieldSpec::wkf("y", WellKnownFunc::Length),
        FieldSpec::wkf("blur", WellKnownFunc::Length),
        FieldSpec::wkf("spread", WellKnownFunc::Length),
        FieldSpec::wkf("color", WellKnownFunc::Color),
    ];
    let record = |r: &crate::value::Record| obj2str(r, &fields, " ", catalog);
    let length = |v: &StyleValue| catalog.convert(WellKnownFunc::Length, v);
    v2s(value, &ConvertOptions::new().record(&record).item(&length), catalog)
}

fn inset_flag(value: &StyleValue, _catalog: &Catalog) -> Result<String> {
    Ok(match value {
        StyleValue::Bool(true) => "inset".to_string(),
        _ => String::new(),
    })
}

fn quoted(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    let quote = |s: &str| format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""));
    v2s(value, &ConvertOptions::new().string(&quote), catalog)
}
