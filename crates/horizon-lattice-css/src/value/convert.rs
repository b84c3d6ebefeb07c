//! Generic value-to-text conversion.
//!
//! [`v2s`] dispatches on the shape of a [`StyleValue`] and lets the caller
//! override each case through [`ConvertOptions`]. [`obj2str`] renders a
//! [`Record`] against an ordered field list; it is the one mechanism every
//! multi-parameter CSS function body is produced with.

use std::borrow::Cow;

use crate::catalog::{Catalog, WellKnownFunc};
use crate::value::{Record, StyleValue};
use crate::{Error, Result};

/// Signature of a whole-value converter.
pub type ValueFn = fn(&StyleValue, &Catalog) -> Result<String>;

/// Per-call overrides for [`v2s`].
///
/// Every callback is optional; a missing callback selects the default
/// behaviour for that value shape.
#[derive(Clone, Copy, Default)]
pub struct ConvertOptions<'a> {
    /// Text for null values (default: empty).
    pub from_null: Option<&'a str>,
    /// Converter for booleans (default: `true`/`false`).
    pub from_bool: Option<&'a dyn Fn(bool) -> String>,
    /// Converter for numbers (default: plain number text).
    pub from_number: Option<&'a dyn Fn(f64) -> String>,
    /// Converter for strings (default: unchanged).
    pub from_string: Option<&'a dyn Fn(&str) -> String>,
    /// Converter for a whole list; replaces item conversion when set.
    pub from_array: Option<&'a dyn Fn(&[StyleValue]) -> Result<String>>,
    /// Converter for list items (default: recursive [`v2s`]).
    pub array_item: Option<&'a dyn Fn(&StyleValue) -> Result<String>>,
    /// Separator between list items (default: a single space).
    pub array_separator: Option<&'a str>,
    /// Converter for records.
    pub from_record: Option<&'a dyn Fn(&Record) -> Result<String>>,
    /// Last-resort converter for shapes no other case handles.
    pub from_any: Option<&'a dyn Fn(&StyleValue) -> Result<String>>,
}

impl<'a> ConvertOptions<'a> {
    /// Options with every case at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the null fallback.
    pub fn null(mut self, text: &'a str) -> Self {
        self.from_null = Some(text);
        self
    }

    /// Set the boolean converter.
    pub fn boolean(mut self, f: &'a dyn Fn(bool) -> String) -> Self {
        self.from_bool = Some(f);
        self
    }

    /// Set the number converter.
    pub fn number(mut self, f: &'a dyn Fn(f64) -> String) -> Self {
        self.from_number = Some(f);
        self
    }

    /// Set the string converter.
    pub fn string(mut self, f: &'a dyn Fn(&str) -> String) -> Self {
        self.from_string = Some(f);
        self
    }

    /// Set the whole-list converter.
    pub fn array(mut self, f: &'a dyn Fn(&[StyleValue]) -> Result<String>) -> Self {
        self.from_array = Some(f);
        self
    }

    /// Set the list item converter.
    pub fn item(mut self, f: &'a dyn Fn(&StyleValue) -> Result<String>) -> Self {
        self.array_item = Some(f);
        self
    }

    /// Set the list separator.
    pub fn separator(mut self, separator: &'a str) -> Self {
        self.array_separator = Some(separator);
        self
    }

    /// Set the record converter.
    pub fn record(mut self, f: &'a dyn Fn(&Record) -> Result<String>) -> Self {
        self.from_record = Some(f);
        self
    }

    /// Set the last-resort converter.
    pub fn any(mut self, f: &'a dyn Fn(&StyleValue) -> Result<String>) -> Self {
        self.from_any = Some(f);
        self
    }
}

/// Convert a value to CSS text.
pub fn v2s(value: &StyleValue, options: &ConvertOptions<'_>, catalog: &Catalog) -> Result<String> {
    match value {
        StyleValue::Null => Ok(options.from_null.unwrap_or_default().to_string()),
        StyleValue::Bool(b) => Ok(match options.from_bool {
            Some(f) => f(*b),
            None => b.to_string(),
        }),
        StyleValue::Number(n) => Ok(match options.from_number {
            Some(f) => f(*n),
            None => format_number(*n),
        }),
        StyleValue::String(s) => Ok(match options.from_string {
            Some(f) => f(s),
            None => s.clone(),
        }),
        StyleValue::List(items) => a2s(items, options, catalog),
        StyleValue::Lazy(lazy) => Ok(lazy.evaluate()),
        StyleValue::Record(record) => match options.from_record {
            Some(f) => f(record),
            None => fallback(value, options, "record conversion"),
        },
        StyleValue::Func(call) => catalog.render_function(call),
        StyleValue::Ref(name) => name.render(),
        StyleValue::Custom(custom) => Ok(custom.to_css()),
    }
}

/// Convert a list: the whole-list callback if present, else each item joined
/// with the separator.
pub fn a2s(items: &[StyleValue], options: &ConvertOptions<'_>, catalog: &Catalog) -> Result<String> {
    if let Some(f) = options.from_array {
        return f(items);
    }

    let separator = options.array_separator.unwrap_or(" ");
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let text = match options.array_item {
            Some(f) => f(item)?,
            None => v2s(item, options, catalog)?,
        };
        parts.push(text);
    }
    Ok(parts.join(separator))
}

/// Convert a multi-value: a list of compound values is joined with
/// `separator`, anything else is converted as one value.
///
/// `[[a, b], [c, d]]` renders as `a b,c d`; `[a, b]` renders as `a b`.
pub fn mv2s(
    value: &StyleValue,
    options: &ConvertOptions<'_>,
    catalog: &Catalog,
    separator: &str,
) -> Result<String> {
    match value {
        StyleValue::List(items) if items.iter().any(is_compound) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                parts.push(v2s(item, options, catalog)?);
            }
            Ok(parts.join(separator))
        }
        _ => v2s(value, options, catalog),
    }
}

/// A list or record: one whole value of a comma-separated multi-value.
pub(crate) fn is_compound(value: &StyleValue) -> bool {
    matches!(value, StyleValue::List(_) | StyleValue::Record(_))
}

fn fallback(value: &StyleValue, options: &ConvertOptions<'_>, context: &str) -> Result<String> {
    match options.from_any {
        Some(f) => f(value),
        None => Err(Error::unsupported(value.kind_name(), context)),
    }
}

/// How one record field is converted.
#[derive(Debug, Clone, Copy)]
pub enum FieldConvert {
    /// Plain [`v2s`] conversion.
    Default,
    /// A well-known function from the catalog.
    Wkf(WellKnownFunc),
    /// A bespoke converter.
    Fn(ValueFn),
}

impl FieldConvert {
    /// Convert a value with this converter.
    pub fn apply(&self, value: &StyleValue, catalog: &Catalog) -> Result<String> {
        match self {
            FieldConvert::Default => v2s(value, &ConvertOptions::new(), catalog),
            FieldConvert::Wkf(id) => catalog.convert(*id, value),
            FieldConvert::Fn(f) => f(value, catalog),
        }
    }
}

/// One entry of an ordered field list.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field (parameter) name.
    pub name: Cow<'static, str>,
    /// Converter for the field's value.
    pub convert: FieldConvert,
    /// Token written before the value instead of the separator, such as
    /// `"/"` or `" at "`.
    pub infix: Option<&'static str>,
}

impl FieldSpec {
    /// A field converted with plain [`v2s`].
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            convert: FieldConvert::Default,
            infix: None,
        }
    }

    /// A field converted with a well-known function.
    pub fn wkf(name: impl Into<Cow<'static, str>>, id: WellKnownFunc) -> Self {
        Self {
            convert: FieldConvert::Wkf(id),
            ..Self::new(name)
        }
    }

    /// A field converted with a bespoke function.
    pub fn with_fn(name: impl Into<Cow<'static, str>>, f: ValueFn) -> Self {
        Self {
            convert: FieldConvert::Fn(f),
            ..Self::new(name)
        }
    }

    /// Write `token` before this field instead of the separator.
    pub fn infix(mut self, token: &'static str) -> Self {
        self.infix = Some(token);
        self
    }
}

/// Render a record against an ordered field list.
///
/// Absent and null fields are skipped, as are fields whose conversion is
/// empty. Present fields are joined with `separator`; a field with an infix
/// token is attached with that token instead. A record field with no
/// matching [`FieldSpec`] is an [`Error::UnsupportedValueKind`].
pub fn obj2str(
    record: &Record,
    fields: &[FieldSpec],
    separator: &str,
    catalog: &Catalog,
) -> Result<String> {
    if let Some((name, _)) = record.iter().find(|(name, _)| !fields.iter().any(|f| f.name == *name)) {
        return Err(Error::unsupported("record field", format!("unknown field '{name}'")));
    }

    let mut out = String::new();
    for field in fields {
        let Some(value) = record.get(&field.name) else {
            continue;
        };
        if value.is_null() {
            continue;
        }

        let text = field.convert.apply(value, catalog)?;
        if text.is_empty() {
            continue;
        }

        match field.infix {
            Some(token) if out.is_empty() => out.push_str(token.trim_start()),
            Some(token) => out.push_str(token),
            None if out.is_empty() => {}
            None => out.push_str(separator),
        }
        out.push_str(&text);
    }

    Ok(out)
}

/// Format a number the way CSS expects: no trailing `.0`, no negative zero.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{n}")
}

/// Convert a property name to dash-case.
///
/// `backgroundColor` becomes `background-color`, `webkitTransition` becomes
/// `-webkit-transition`. Dash-case names and custom properties (`--x`) are
/// returned unchanged.
pub fn dash_case(name: &str) -> Cow<'_, str> {
    if name.starts_with("--") || !name.chars().any(|c| c.is_ascii_uppercase()) {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len() + 4);
    if ["webkit", "moz", "ms", "o"]
        .iter()
        .any(|p| name.starts_with(p) && name[p.len()..].starts_with(|c: char| c.is_ascii_uppercase()))
    {
        out.push('-');
    }
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}
