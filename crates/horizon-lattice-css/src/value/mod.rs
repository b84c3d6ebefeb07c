//! Style values and their conversion to CSS text.
//!
//! - [`StyleValue`] is the input value language
//! - [`convert`] holds the generic converters every other module builds on
//! - [`color`] and [`numeric`] hold the numeric rules of their value domains

pub mod color;
pub mod convert;
pub mod numeric;
mod style_value;

pub use style_value::{
    FuncCall, LazyValue, NameCell, NameForm, NameRef, Record, StyleValue, ToCss,
};
