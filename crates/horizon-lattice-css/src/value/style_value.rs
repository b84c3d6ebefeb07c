//! The input value language.
//!
//! Every property value, function argument and custom-property value is a
//! [`StyleValue`]. Values are plain data; they are turned into CSS text by the
//! converter in [`crate::value::convert`] when a rule is serialized.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_css::value::{Record, StyleValue};
//!
//! let margin = StyleValue::from([8, 16]);
//! assert!(margin.is_list());
//!
//! let shadow = Record::new().with("x", 2).with("y", 2).with("color", "black");
//! assert_eq!(shadow.len(), 3);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::{Error, Result};

/// Shared cell holding a rule's generated name.
///
/// The cell is created empty when the rule is declared and filled exactly once
/// when the owning scope is processed. Values and selectors that mention the
/// rule hold a clone of the cell, so they render the final name.
pub type NameCell = Arc<OnceLock<String>>;

/// A value that renders its own CSS text.
pub trait ToCss: Send + Sync {
    /// Produce the CSS text for this value.
    fn to_css(&self) -> String;
}

/// A zero-argument callable standing in for a string computed on demand.
///
/// The callable runs every time the value is rendered; its result is never
/// cached.
#[derive(Clone)]
pub struct LazyValue(Arc<dyn Fn() -> String + Send + Sync>);

impl LazyValue {
    /// Wrap a callable.
    pub fn new(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Run the callable.
    pub fn evaluate(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for LazyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyValue(..)")
    }
}

impl PartialEq for LazyValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// How a rule name is written when it appears inside a value or selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameForm {
    /// The name itself (animation names, counters, class names in values).
    Bare,
    /// `var(--name)`.
    Var,
    /// `--name`, as a custom property declaration key.
    CustomProperty,
    /// `.name`.
    Class,
    /// `#name`.
    Id,
}

/// A reference to a rule's name that is resolved at render time.
#[derive(Debug, Clone)]
pub struct NameRef {
    slot: Arc<str>,
    cell: NameCell,
    form: NameForm,
}

impl NameRef {
    /// Create a reference to a name cell.
    pub fn new(slot: impl Into<Arc<str>>, cell: NameCell, form: NameForm) -> Self {
        Self {
            slot: slot.into(),
            cell,
            form,
        }
    }

    /// Create a reference to a fixed name that needs no processing.
    pub fn fixed(name: impl Into<String>, form: NameForm) -> Self {
        let name = name.into();
        let cell = NameCell::default();
        let _ = cell.set(name.clone());
        Self::new(name, cell, form)
    }

    /// The same reference written in a different form.
    pub fn with_form(&self, form: NameForm) -> Self {
        Self {
            form,
            ..self.clone()
        }
    }

    /// The slot the name was declared under.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// The rendering form.
    pub fn form(&self) -> NameForm {
        self.form
    }

    /// The resolved name, if the owning scope has been processed.
    pub fn name(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    /// Render the reference in its form.
    pub fn render(&self) -> Result<String> {
        let name = self.name().ok_or_else(|| Error::UnassignedName {
            slot: self.slot.to_string(),
        })?;
        Ok(match self.form {
            NameForm::Bare => name.to_string(),
            NameForm::Var => format!("var(--{name})"),
            NameForm::CustomProperty => format!("--{name}"),
            NameForm::Class => format!(".{name}"),
            NameForm::Id => format!("#{name}"),
        })
    }
}

impl PartialEq for NameRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell) && self.form == other.form
    }
}

/// A structured record: ordered named fields consumed by a field list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(Cow<'static, str>, StyleValue)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field, builder style.
    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<StyleValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a field.
    pub fn set(&mut self, name: impl Into<Cow<'static, str>>, value: impl Into<StyleValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Check whether a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.fields.iter().map(|(n, v)| (&**n, v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A CSS function call rendered through the function descriptor catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall {
    /// Function name as registered in the catalog (`"translate"`).
    pub name: Cow<'static, str>,
    /// Arguments: a record keyed by parameter name, a positional list, or a
    /// single value for the first parameter.
    pub args: StyleValue,
    /// Render the `repeating-` variant of the function.
    pub repeating: bool,
}

impl FuncCall {
    /// Create a function call.
    pub fn new(name: impl Into<Cow<'static, str>>, args: impl Into<StyleValue>) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
            repeating: false,
        }
    }

    /// Switch to the `repeating-` variant.
    pub fn repeating(mut self) -> Self {
        self.repeating = true;
        self
    }
}

/// A style value.
#[derive(Clone, Default)]
pub enum StyleValue {
    /// No value. Renders as the caller's fallback, or empty.
    #[default]
    Null,
    /// A boolean flag.
    Bool(bool),
    /// A number; its unit depends on the context it is rendered in.
    Number(f64),
    /// Literal CSS text.
    String(String),
    /// An ordered sequence. Whether it means several values or one compound
    /// value is decided by the context it is rendered in.
    List(Vec<StyleValue>),
    /// A structured record.
    Record(Record),
    /// A CSS function call.
    Func(Box<FuncCall>),
    /// A reference to a rule's generated name.
    Ref(NameRef),
    /// A string computed on demand.
    Lazy(LazyValue),
    /// A value with its own conversion.
    Custom(Arc<dyn ToCss>),
}

impl StyleValue {
    /// Create a lazy value.
    pub fn lazy(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Lazy(LazyValue::new(f))
    }

    /// Create a function call value.
    pub fn func(name: impl Into<Cow<'static, str>>, args: impl Into<StyleValue>) -> Self {
        Self::Func(Box::new(FuncCall::new(name, args)))
    }

    /// Create a value with its own conversion.
    pub fn custom(value: impl ToCss + 'static) -> Self {
        Self::Custom(Arc::new(value))
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, StyleValue::Null)
    }

    /// Check if the value is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, StyleValue::List(_))
    }

    /// Get the number if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the text if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            StyleValue::Null => "null",
            StyleValue::Bool(_) => "boolean",
            StyleValue::Number(_) => "number",
            StyleValue::String(_) => "string",
            StyleValue::List(_) => "list",
            StyleValue::Record(_) => "record",
            StyleValue::Func(_) => "function",
            StyleValue::Ref(_) => "rule reference",
            StyleValue::Lazy(_) => "lazy",
            StyleValue::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Null => f.write_str("Null"),
            StyleValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            StyleValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            StyleValue::String(s) => f.debug_tuple("String").field(s).finish(),
            StyleValue::List(items) => f.debug_tuple("List").field(items).finish(),
            StyleValue::Record(r) => f.debug_tuple("Record").field(r).finish(),
            StyleValue::Func(c) => f.debug_tuple("Func").field(c).finish(),
            StyleValue::Ref(r) => f.debug_tuple("Ref").field(r).finish(),
            StyleValue::Lazy(l) => l.fmt(f),
            StyleValue::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for StyleValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StyleValue::Null, StyleValue::Null) => true,
            (StyleValue::Bool(a), StyleValue::Bool(b)) => a == b,
            (StyleValue::Number(a), StyleValue::Number(b)) => a == b,
            (StyleValue::String(a), StyleValue::String(b)) => a == b,
            (StyleValue::List(a), StyleValue::List(b)) => a == b,
            (StyleValue::Record(a), StyleValue::Record(b)) => a == b,
            (StyleValue::Func(a), StyleValue::Func(b)) => a == b,
            (StyleValue::Ref(a), StyleValue::Ref(b)) => a == b,
            (StyleValue::Lazy(a), StyleValue::Lazy(b)) => a == b,
            (StyleValue::Custom(a), StyleValue::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for StyleValue {
    fn from(value: bool) -> Self {
        StyleValue::Bool(value)
    }
}

macro_rules! from_number {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for StyleValue {
                fn from(value: $ty) -> Self {
                    StyleValue::Number(value as f64)
                }
            }
        )+
    };
}

from_number!(f64, f32, i32, i64, u32, u8, usize);

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::String(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::String(value)
    }
}

impl<T: Into<StyleValue>> From<Vec<T>> for StyleValue {
    fn from(value: Vec<T>) -> Self {
        StyleValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<StyleValue>, const N: usize> From<[T; N]> for StyleValue {
    fn from(value: [T; N]) -> Self {
        StyleValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<StyleValue>> From<Option<T>> for StyleValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(StyleValue::Null, Into::into)
    }
}

impl From<Record> for StyleValue {
    fn from(value: Record) -> Self {
        StyleValue::Record(value)
    }
}

impl From<FuncCall> for StyleValue {
    fn from(value: FuncCall) -> Self {
        StyleValue::Func(Box::new(value))
    }
}

impl From<NameRef> for StyleValue {
    fn from(value: NameRef) -> Self {
        StyleValue::Ref(value)
    }
}

impl From<LazyValue> for StyleValue {
    fn from(value: LazyValue) -> Self {
        StyleValue::Lazy(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_insertion_order_and_replaces() {
        let mut record = Record::new().with("x", 1).with("y", 2);
        record.set("x", 10);

        let names: Vec<_> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(record.get("x"), Some(&StyleValue::Number(10.0)));
        assert!(!record.contains("z"));
    }

    #[test]
    fn conversions_from_rust_values() {
        assert_eq!(StyleValue::from(3), StyleValue::Number(3.0));
        assert_eq!(StyleValue::from("auto"), StyleValue::String("auto".into()));
        assert_eq!(StyleValue::from(None::<i32>), StyleValue::Null);
        assert_eq!(
            StyleValue::from([1, 2]),
            StyleValue::List(vec![StyleValue::Number(1.0), StyleValue::Number(2.0)])
        );
    }

    #[test]
    fn lazy_values_run_on_every_evaluation() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let lazy = LazyValue::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "10px".to_string()
        });

        assert_eq!(lazy.evaluate(), "10px");
        assert_eq!(lazy.evaluate(), "10px");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn name_ref_forms() {
        let name = NameRef::fixed("App_accent", NameForm::Var);
        assert_eq!(name.render().unwrap(), "var(--App_accent)");
        assert_eq!(name.with_form(NameForm::Class).render().unwrap(), ".App_accent");
        assert_eq!(name.with_form(NameForm::CustomProperty).render().unwrap(), "--App_accent");
    }

    #[test]
    fn unassigned_name_is_an_error() {
        let name = NameRef::new("button", NameCell::default(), NameForm::Class);
        assert!(matches!(name.render(), Err(Error::UnassignedName { .. })));
    }
}
