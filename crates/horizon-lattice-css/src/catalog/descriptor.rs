//! Declarative recipes for CSS function calls.
//!
//! A [`FunctionDescriptor`] lists a function's parameters in order, each with
//! its converter and optional infix token, plus the separator between them.
//! One generic renderer turns any call into text from its descriptor, so no
//! function needs bespoke rendering code beyond the few irregular ones that
//! register a whole-value converter.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::catalog::{Catalog, CatalogBuilder, WellKnownFunc};
use crate::value::convert::{a2s, obj2str, ConvertOptions, FieldConvert, FieldSpec};
use crate::value::{Record, StyleValue};
use crate::{Error, Result};

/// How a function's argument list is produced.
#[derive(Debug, Clone)]
pub enum DescriptorBody {
    /// Ordered parameters joined with a separator.
    Params {
        /// Parameters in output order.
        params: Vec<FieldSpec>,
        /// Separator between parameters without an infix token.
        separator: &'static str,
    },
    /// One converter for the whole argument value.
    Whole(FieldConvert),
}

/// Serialization recipe for one CSS function.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    name: Cow<'static, str>,
    body: DescriptorBody,
    shape: Option<Vec<Cow<'static, str>>>,
    repeatable: bool,
}

impl FunctionDescriptor {
    /// A function whose arguments are ordered parameters.
    pub fn params(
        name: impl Into<Cow<'static, str>>,
        separator: &'static str,
        params: impl IntoIterator<Item = FieldSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            body: DescriptorBody::Params {
                params: params.into_iter().collect(),
                separator,
            },
            shape: None,
            repeatable: false,
        }
    }

    /// A function whose arguments are rendered by one converter.
    pub fn whole(name: impl Into<Cow<'static, str>>, convert: FieldConvert) -> Self {
        Self {
            name: name.into(),
            body: DescriptorBody::Whole(convert),
            shape: None,
            repeatable: false,
        }
    }

    /// Declare the fields a record argument may carry.
    ///
    /// Without a declared shape, parameter functions accept exactly their
    /// parameter names. A declared shape must contain every parameter.
    pub fn shape<S: Into<Cow<'static, str>>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.shape = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Allow the `repeating-` variant of this function.
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// The function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The argument recipe.
    pub fn body(&self) -> &DescriptorBody {
        &self.body
    }

    /// The declared record shape, if any.
    pub fn record_shape(&self) -> Option<&[Cow<'static, str>]> {
        self.shape.as_deref()
    }

    /// Whether the `repeating-` variant exists.
    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    /// Check the descriptor against the well-known functions registered so far.
    pub(crate) fn validate(&self, registered: &dyn Fn(WellKnownFunc) -> bool) -> Result<()> {
        let check_convert = |convert: &FieldConvert| match convert {
            FieldConvert::Wkf(id) if !registered(*id) => Err(Error::malformed(
                self.name.clone(),
                format!("references unregistered well-known function {id:?}"),
            )),
            _ => Ok(()),
        };

        if let Some(shape) = &self.shape {
            let mut seen = HashSet::new();
            for field in shape {
                if field.is_empty() || !seen.insert(&**field) {
                    return Err(Error::malformed(
                        self.name.clone(),
                        format!("declares record field '{field}' more than once or without a name"),
                    ));
                }
            }
            if let DescriptorBody::Params { params, .. } = &self.body {
                if let Some(missing) = params.iter().find(|p| !shape.contains(&p.name)) {
                    return Err(Error::malformed(
                        self.name.clone(),
                        format!("record shape has no field for parameter '{}'", missing.name),
                    ));
                }
            }
        }

        match &self.body {
            DescriptorBody::Whole(convert) => check_convert(convert),
            DescriptorBody::Params { params, .. } => {
                if params.is_empty() {
                    return Err(Error::malformed(self.name.clone(), "has no parameters"));
                }
                let mut seen = HashSet::new();
                for param in params {
                    if param.name.is_empty() {
                        return Err(Error::malformed(self.name.clone(), "has an unnamed parameter"));
                    }
                    if !seen.insert(&*param.name) {
                        return Err(Error::malformed(
                            self.name.clone(),
                            format!("declares parameter '{}' twice", param.name),
                        ));
                    }
                    check_convert(&param.convert)?;
                }
                Ok(())
            }
        }
    }

    /// Render a call of this function.
    ///
    /// `args` may be a record keyed by parameter name, a list matched to the
    /// parameters by position, or a single value for the first parameter.
    /// A record field outside the shape and a list longer than the
    /// parameters are [`Error::UnsupportedValueKind`].
    pub fn render(&self, args: &StyleValue, repeating: bool, catalog: &Catalog) -> Result<String> {
        if repeating && !self.repeatable {
            return Err(Error::unsupported(
                "repeating",
                format!("function '{}'", self.name),
            ));
        }

        let body = match &self.body {
            DescriptorBody::Whole(convert) => {
                if let (StyleValue::Record(record), Some(shape)) = (args, &self.shape) {
                    self.check_shape(record, shape)?;
                }
                convert.apply(args, catalog)?
            }
            DescriptorBody::Params { params, separator } => match args {
                StyleValue::Record(record) => match &self.shape {
                    Some(shape) => {
                        self.check_shape(record, shape)?;
                        let known = record
                            .iter()
                            .filter(|(name, _)| params.iter().any(|p| p.name == *name))
                            .fold(Record::new(), |r, (name, value)| r.with(name.to_string(), value.clone()));
                        obj2str(&known, params, separator, catalog)?
                    }
                    None => obj2str(record, params, separator, catalog)
                        .map_err(|err| self.in_arguments(err))?,
                },
                StyleValue::List(items) => {
                    if items.len() > params.len() {
                        return Err(Error::unsupported(
                            "list",
                            format!(
                                "{} arguments to '{}', which takes at most {}",
                                items.len(),
                                self.name,
                                params.len()
                            ),
                        ));
                    }
                    let record = positional(params, items);
                    obj2str(&record, params, separator, catalog)?
                }
                single => {
                    let record = positional(params, std::slice::from_ref(single));
                    obj2str(&record, params, separator, catalog)?
                }
            },
        };

        let prefix = if repeating { "repeating-" } else { "" };
        Ok(format!("{prefix}{}({body})", self.name))
    }
}

impl FunctionDescriptor {
    fn check_shape(&self, record: &Record, shape: &[Cow<'static, str>]) -> Result<()> {
        match record.iter().find(|(name, _)| !shape.iter().any(|f| f == name)) {
            Some((name, _)) => Err(Error::unsupported(
                "record field",
                format!("unknown field '{name}' in arguments to '{}'", self.name),
            )),
            None => Ok(()),
        }
    }

    fn in_arguments(&self, err: Error) -> Error {
        match err {
            Error::UnsupportedValueKind { kind: "record field", context } => Error::unsupported(
                "record field",
                format!("{context} in arguments to '{}'", self.name),
            ),
            other => other,
        }
    }
}

fn positional(params: &[FieldSpec], items: &[StyleValue]) -> Record {
    let mut record = Record::new();
    for (param, item) in params.iter().zip(items) {
        record.set(param.name.clone(), item.clone());
    }
    record
}

/// Register the standard function descriptors.
pub(crate) fn register(builder: &mut CatalogBuilder) {
    use WellKnownFunc as W;

    let descriptors = [
        FunctionDescriptor::params(
            "translate",
            ",",
            [FieldSpec::wkf("x", W::Length), FieldSpec::wkf("y", W::Length)],
        ),
        FunctionDescriptor::params(
            "translate3d",
            ",",
            [
                FieldSpec::wkf("x", W::Length),
                FieldSpec::wkf("y", W::Length),
                FieldSpec::wkf("z", W::Length),
            ],
        ),
        FunctionDescriptor::params(
            "scale",
            ",",
            [FieldSpec::wkf("sx", W::Number), FieldSpec::wkf("sy", W::Number)],
        ),
        FunctionDescriptor::params("rotate", ",", [FieldSpec::wkf("angle", W::Angle)]),
        FunctionDescriptor::params(
            "skew",
            ",",
            [FieldSpec::wkf("ax", W::Angle), FieldSpec::wkf("ay", W::Angle)],
        ),
        FunctionDescriptor::whole("matrix", FieldConvert::Fn(comma_numbers)),
        FunctionDescriptor::params(
            "inset",
            " ",
            [
                FieldSpec::wkf("offset", W::Length),
                FieldSpec::wkf("round", W::BorderRadius).infix(" round "),
            ],
        ),
        FunctionDescriptor::params(
            "circle",
            " ",
            [
                FieldSpec::wkf("radius", W::Length),
                FieldSpec::wkf("position", W::Position).infix(" at "),
            ],
        ),
        FunctionDescriptor::params(
            "ellipse",
            " ",
            [
                FieldSpec::wkf("rx", W::Length),
                FieldSpec::wkf("ry", W::Length),
                FieldSpec::wkf("position", W::Position).infix(" at "),
            ],
        ),
        FunctionDescriptor::whole("polygon", FieldConvert::Fn(polygon)).shape(["fill", "points"]),
        FunctionDescriptor::params(
            "linear-gradient",
            ",",
            [
                FieldSpec::wkf("angle", W::Angle),
                FieldSpec::with_fn("stops", gradient_stops),
            ],
        )
        .repeatable(),
        FunctionDescriptor::params(
            "radial-gradient",
            ",",
            [
                FieldSpec::new("shape"),
                FieldSpec::wkf("size", W::Length).infix(" "),
                FieldSpec::wkf("position", W::Position).infix(" at "),
                FieldSpec::with_fn("stops", gradient_stops),
            ],
        )
        .repeatable(),
        FunctionDescriptor::params(
            "cubic-bezier",
            ",",
            [
                FieldSpec::wkf("x1", W::Number),
                FieldSpec::wkf("y1", W::Number),
                FieldSpec::wkf("x2", W::Number),
                FieldSpec::wkf("y2", W::Number),
            ],
        ),
        FunctionDescriptor::params(
            "steps",
            ",",
            [FieldSpec::wkf("count", W::Number), FieldSpec::new("jump")],
        ),
        FunctionDescriptor::params(
            "drop-shadow",
            " ",
            [
                FieldSpec::wkf("x", W::Length),
                FieldSpec::wkf("y", W::Length),
                FieldSpec::wkf("blur", W::Length),
                FieldSpec::wkf("color", W::Color),
            ],
        ),
        FunctionDescriptor::params("blur", ",", [FieldSpec::wkf("radius", W::Length)]),
        FunctionDescriptor::params("hue-rotate", ",", [FieldSpec::wkf("angle", W::Angle)]),
        FunctionDescriptor::params(
            "repeat",
            ",",
            [FieldSpec::new("count"), FieldSpec::wkf("tracks", W::GridTrackList)],
        ),
        FunctionDescriptor::params(
            "minmax",
            ",",
            [FieldSpec::wkf("min", W::GridTrack), FieldSpec::wkf("max", W::GridTrack)],
        ),
        FunctionDescriptor::params("fit-content", ",", [FieldSpec::wkf("size", W::Length)]),
        FunctionDescriptor::whole("url", FieldConvert::Default),
        FunctionDescriptor::params(
            "counter",
            ",",
            [FieldSpec::new("name"), FieldSpec::new("style")],
        ),
        FunctionDescriptor::params(
            "counters",
            ",",
            [
                FieldSpec::new("name"),
                FieldSpec::wkf("separator", W::Quoted),
                FieldSpec::new("style"),
            ],
        ),
        FunctionDescriptor::params(
            "attr",
            ",",
            [FieldSpec::new("name"), FieldSpec::new("fallback")],
        ),
    ];

    for name in ["brightness", "contrast", "grayscale", "invert", "opacity", "saturate", "sepia"] {
        builder.function(FunctionDescriptor::params(
            name,
            ",",
            [FieldSpec::wkf("amount", W::Percent)],
        ));
    }
    for descriptor in descriptors {
        builder.function(descriptor);
    }
}

fn comma_numbers(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    let number = |v: &StyleValue| catalog.convert(WellKnownFunc::Number, v);
    match value {
        StyleValue::List(items) => a2s(items, &ConvertOptions::new().item(&number).separator(","), catalog),
        other => number(other),
    }
}

/// `polygon([[x, y], ...])` or `polygon({fill, points})`.
fn polygon(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    let (fill, points) = match value {
        StyleValue::Record(record) => (
            record.get("fill").and_then(StyleValue::as_str),
            record.get("points").cloned().unwrap_or_default(),
        ),
        other => (None, other.clone()),
    };

    let point = |v: &StyleValue| catalog.convert(WellKnownFunc::Length, v);
    let points = match &points {
        StyleValue::List(items) => a2s(items, &ConvertOptions::new().item(&point).separator(","), catalog)?,
        other => point(other)?,
    };

    Ok(match fill {
        Some(fill) => format!("{fill},{points}"),
        None => points,
    })
}

/// Gradient color stops: each stop is a color or `[color, length...]`.
fn gradient_stops(value: &StyleValue, catalog: &Catalog) -> Result<String> {
    let stop = |v: &StyleValue| -> Result<String> {
        match v {
            StyleValue::List(parts) => {
                let mut out = Vec::with_capacity(parts.len());
                for (i, part) in parts.iter().enumerate() {
                    let id = if i == 0 { WellKnownFunc::Color } else { WellKnownFunc::Length };
                    out.push(catalog.convert(id, part)?);
                }
                Ok(out.join(" "))
            }
            other => catalog.convert(WellKnownFunc::Color, other),
        }
    };
    match value {
        StyleValue::List(items) => a2s(items, &ConvertOptions::new().item(&stop).separator(","), catalog),
        other => stop(other),
    }
}
