//! Property name to conversion recipe table.
//!
//! Only properties whose values need more than the default conversion are
//! listed. Anything else renders numbers unitless and lists space separated.

use crate::catalog::{Catalog, CatalogBuilder, WellKnownFunc};
use crate::value::convert::{a2s, dash_case, is_compound, mv2s, v2s, ConvertOptions};
use crate::value::StyleValue;
use crate::Result;

/// How a property's value is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Default conversion.
    Plain,
    /// One value of a well-known category.
    Wkf(WellKnownFunc),
    /// Comma-separated multi-value. A list of lists or records is one value
    /// per item; any other value is one value, converted with the optional
    /// well-known function.
    Multi(Option<WellKnownFunc>),
    /// A flat list joined with the given separator.
    Joined(Option<WellKnownFunc>, &'static str),
}

impl PropertyKind {
    /// The well-known function this kind converts with, if any.
    pub fn wkf(&self) -> Option<WellKnownFunc> {
        match *self {
            PropertyKind::Plain => None,
            PropertyKind::Wkf(id) => Some(id),
            PropertyKind::Multi(id) | PropertyKind::Joined(id, _) => id,
        }
    }

    /// Convert a value according to this kind.
    pub fn to_css(&self, value: &StyleValue, catalog: &Catalog) -> Result<String> {
        let convert = |v: &StyleValue| match self.wkf() {
            Some(id) => catalog.convert(id, v),
            None => v2s(v, &ConvertOptions::new(), catalog),
        };

        match *self {
            PropertyKind::Plain => convert(value),
            PropertyKind::Wkf(id) => catalog.convert(id, value),
            PropertyKind::Multi(Some(_)) => match value {
                StyleValue::List(items) if items.iter().any(is_compound) => {
                    let mut parts = Vec::with_capacity(items.len());
                    for item in items {
                        parts.push(convert(item)?);
                    }
                    Ok(parts.join(","))
                }
                other => convert(other),
            },
            PropertyKind::Multi(None) => mv2s(value, &ConvertOptions::new(), catalog, ","),
            PropertyKind::Joined(_, separator) => match value {
                StyleValue::List(items) => {
                    let options = ConvertOptions::new().item(&convert).separator(separator);
                    a2s(items, &options, catalog)
                }
                other => convert(other),
            },
        }
    }
}

impl Catalog {
    /// The conversion kind of a property, by dash-case or camelCase name.
    pub fn property_kind(&self, name: &str) -> PropertyKind {
        self.properties
            .get(&*dash_case(name))
            .copied()
            .unwrap_or(PropertyKind::Plain)
    }

    /// Convert a property's value to CSS text.
    pub fn property_to_css(&self, name: &str, value: &StyleValue) -> Result<String> {
        self.property_kind(name).to_css(value, self)
    }
}

const COLOR: &[&str] = &[
    "color",
    "background-color",
    "border-color",
    "border-top-color",
    "border-right-color",
    "border-bottom-color",
    "border-left-color",
    "outline-color",
    "caret-color",
    "column-rule-color",
    "text-decoration-color",
    "fill",
    "stroke",
    "stop-color",
    "flood-color",
    "lighting-color",
];

const LENGTH: &[&str] = &[
    "width",
    "height",
    "min-width",
    "min-height",
    "max-width",
    "max-height",
    "margin",
    "margin-top",
    "margin-right",
    "margin-bottom",
    "margin-left",
    "padding",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "top",
    "right",
    "bottom",
    "left",
    "inset",
    "gap",
    "row-gap",
    "column-gap",
    "font-size",
    "letter-spacing",
    "word-spacing",
    "text-indent",
    "border-width",
    "border-top-width",
    "border-right-width",
    "border-bottom-width",
    "border-left-width",
    "outline-width",
    "outline-offset",
    "flex-basis",
    "stroke-width",
    "perspective",
];

const NUMBER: &[&str] = &[
    "opacity",
    "z-index",
    "flex-grow",
    "flex-shrink",
    "line-height",
    "font-weight",
    "order",
    "orphans",
    "widows",
    "fill-opacity",
    "stroke-opacity",
];

const TIME: &[&str] = &[
    "transition-duration",
    "transition-delay",
    "animation-duration",
    "animation-delay",
];

const POSITION: &[&str] = &[
    "background-position",
    "object-position",
    "transform-origin",
    "perspective-origin",
];

const GRID_TRACKS: &[&str] = &[
    "grid-template-columns",
    "grid-template-rows",
    "grid-auto-columns",
    "grid-auto-rows",
];

const MULTI: &[&str] = &[
    "transition",
    "animation",
    "background",
    "background-image",
    "mask-image",
    "will-change",
    "transition-property",
    "animation-name",
];

/// Register the standard property table.
pub(crate) fn register(builder: &mut CatalogBuilder) {
    use WellKnownFunc as W;

    let groups: [(&[&str], PropertyKind); 7] = [
        (COLOR, PropertyKind::Wkf(W::Color)),
        (LENGTH, PropertyKind::Wkf(W::Length)),
        (NUMBER, PropertyKind::Wkf(W::Number)),
        (TIME, PropertyKind::Joined(Some(W::Time), ",")),
        (POSITION, PropertyKind::Wkf(W::Position)),
        (GRID_TRACKS, PropertyKind::Wkf(W::GridTrackList)),
        (MULTI, PropertyKind::Multi(None)),
    ];
    for (names, kind) in groups {
        for name in names {
            builder.property(*name, kind);
        }
    }

    builder
        .property("border-radius", PropertyKind::Wkf(W::BorderRadius))
        .property("box-shadow", PropertyKind::Multi(Some(W::BoxShadow)))
        .property("text-shadow", PropertyKind::Multi(Some(W::BoxShadow)))
        .property("font-family", PropertyKind::Joined(None, ","))
        .property("quotes", PropertyKind::Joined(Some(W::Quoted), " "))
        .property("transform", PropertyKind::Joined(None, " "))
        .property("filter", PropertyKind::Joined(None, " "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FuncCall, Record};

    fn css(name: &str, value: impl Into<StyleValue>) -> String {
        Catalog::global().property_to_css(name, &value.into()).unwrap()
    }

    #[test]
    fn camel_case_names_resolve() {
        assert_eq!(
            Catalog::global().property_kind("backgroundColor"),
            PropertyKind::Wkf(WellKnownFunc::Color)
        );
        assert_eq!(Catalog::global().property_kind("display"), PropertyKind::Plain);
    }

    #[test]
    fn typed_properties() {
        assert_eq!(css("color", 0x336699), "#336699");
        assert_eq!(css("width", 100), "100px");
        assert_eq!(css("margin", [4, 8]), "4px 8px");
        assert_eq!(css("opacity", 0.5), "0.5");
        assert_eq!(css("zIndex", 3), "3");
        assert_eq!(css("display", "flex"), "flex");
    }

    #[test]
    fn multi_value_properties() {
        assert_eq!(css("transition-duration", [200, 300]), "200ms,300ms");
        assert_eq!(css("transition", ["opacity", "1s"]), "opacity 1s");
        let two = StyleValue::from(vec![
            StyleValue::from(["opacity", "1s"]),
            StyleValue::from(["color", "2s"]),
        ]);
        assert_eq!(css("transition", two), "opacity 1s,color 2s");
    }

    #[test]
    fn shadows_and_families() {
        let shadow = Record::new().with("x", 1).with("y", 2).with("color", 0xff0000);
        assert_eq!(css("boxShadow", shadow), "1px 2px #ff0000");
        let flat = StyleValue::from(vec![StyleValue::from(2), 2.into(), "black".into()]);
        assert_eq!(css("box-shadow", flat), "2px 2px black");
        let layered = StyleValue::from(vec![
            StyleValue::from(vec![StyleValue::from(2), 2.into(), "black".into()]),
            StyleValue::from(Record::new().with("inset", true).with("x", 1).with("y", 1)),
        ]);
        assert_eq!(css("box-shadow", layered), "2px 2px black,inset 1px 1px");
        assert_eq!(css("font-family", ["Inter", "sans-serif"]), "Inter,sans-serif");
    }

    #[test]
    fn transforms_join_function_calls() {
        let transform = StyleValue::from(vec![
            StyleValue::from(FuncCall::new("translate", [10, 20])),
            StyleValue::from(FuncCall::new("rotate", 90)),
        ]);
        assert_eq!(css("transform", transform), "translate(10px,20px) rotate(90deg)");
    }
}
