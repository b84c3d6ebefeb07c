//! Numeric unit families.
//!
//! Each family converts numbers with one unit suffix for integers and another
//! for fractional values, and builds `min()`, `max()`, `clamp()` and `calc()`
//! expressions whose operands are converted with the same rule.
//!
//! The active suffixes can be changed at runtime with
//! [`NumericFamily::set_units`]; values built by the helpers read them when
//! rendered.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_css::value::numeric::{LENGTH, PERCENT};
//!
//! assert_eq!(LENGTH.convert_number(10.0), "10px");
//! assert_eq!(LENGTH.convert_number(1.5), "1.5em");
//! assert_eq!(PERCENT.convert_number(0.25), "25%");
//! ```

use parking_lot::{const_rwlock, RwLock};

use crate::catalog::{Catalog, CatalogBuilder, WellKnownFunc};
use crate::logging::targets;
use crate::value::convert::{format_number, v2s, ConvertOptions};
use crate::value::StyleValue;
use crate::Result;

/// Unit suffixes of a numeric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Units {
    /// Suffix for integer values.
    pub int_unit: &'static str,
    /// Suffix for fractional values.
    pub float_unit: &'static str,
}

/// A numeric value category with runtime-adjustable units.
#[derive(Debug)]
pub struct NumericFamily {
    name: &'static str,
    wkf: WellKnownFunc,
    units: RwLock<Units>,
    scale_fractions: bool,
}

/// Unitless numbers.
pub static NUMBER: NumericFamily = NumericFamily::new("number", WellKnownFunc::Number, "", "");
/// Lengths: `px` for integers, `em` for fractions.
pub static LENGTH: NumericFamily = NumericFamily::new("length", WellKnownFunc::Length, "px", "em");
/// Percentages: fractions are multiplied by 100.
pub static PERCENT: NumericFamily =
    NumericFamily::new("percent", WellKnownFunc::Percent, "%", "%").scaling_fractions();
/// Angles: `deg` for integers, `turn` for fractions.
pub static ANGLE: NumericFamily = NumericFamily::new("angle", WellKnownFunc::Angle, "deg", "turn");
/// Times: `ms` for integers, `s` for fractions.
pub static TIME: NumericFamily = NumericFamily::new("time", WellKnownFunc::Time, "ms", "s");
/// Resolutions: `dpi` for integers, `x` for fractions.
pub static RESOLUTION: NumericFamily =
    NumericFamily::new("resolution", WellKnownFunc::Resolution, "dpi", "x");
/// Frequencies: `Hz` for integers, `kHz` for fractions.
pub static FREQUENCY: NumericFamily =
    NumericFamily::new("frequency", WellKnownFunc::Frequency, "Hz", "kHz");

impl NumericFamily {
    /// Create a family with the given default suffixes.
    pub const fn new(
        name: &'static str,
        wkf: WellKnownFunc,
        int_unit: &'static str,
        float_unit: &'static str,
    ) -> Self {
        Self {
            name,
            wkf,
            units: const_rwlock(Units {
                int_unit,
                float_unit,
            }),
            scale_fractions: false,
        }
    }

    /// Multiply fractional values by 100 before adding the suffix.
    pub const fn scaling_fractions(mut self) -> Self {
        self.scale_fractions = true;
        self
    }

    /// The family name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The well-known function this family is registered under.
    pub fn wkf(&self) -> WellKnownFunc {
        self.wkf
    }

    /// The active suffixes.
    pub fn active_units(&self) -> Units {
        *self.units.read()
    }

    /// Change the active suffixes.
    pub fn set_units(&self, int_unit: &'static str, float_unit: &'static str) {
        *self.units.write() = Units {
            int_unit,
            float_unit,
        };
        tracing::debug!(
            target: targets::CONVERT,
            family = self.name,
            int_unit,
            float_unit,
            "numeric units changed"
        );
    }

    /// Convert a number with the active suffixes.
    pub fn convert_number(&self, n: f64) -> String {
        let units = self.active_units();
        if n.fract() == 0.0 {
            format!("{}{}", format_number(n), units.int_unit)
        } else if self.scale_fractions {
            let scaled = (n * 100.0 * 1e6).round() / 1e6;
            format!("{}{}", format_number(scaled), units.float_unit)
        } else {
            format!("{}{}", format_number(n), units.float_unit)
        }
    }

    /// Convert a value: numbers get the family's suffix, strings and
    /// function calls pass through, lists are space separated.
    pub fn to_css(&self, value: &StyleValue, catalog: &Catalog) -> Result<String> {
        let number = |n: f64| self.convert_number(n);
        v2s(value, &ConvertOptions::new().number(&number), catalog)
    }

    /// A number with an explicit unit, such as `units(2.0, "fr")`.
    pub fn units(&self, n: f64, unit: &str) -> StyleValue {
        StyleValue::String(format!("{}{unit}", format_number(n)))
    }

    /// `min(a,b,..)`.
    pub fn min(&'static self, values: impl IntoIterator<Item = StyleValue>) -> StyleValue {
        self.math_function("min", values.into_iter().collect())
    }

    /// `max(a,b,..)`.
    pub fn max(&'static self, values: impl IntoIterator<Item = StyleValue>) -> StyleValue {
        self.math_function("max", values.into_iter().collect())
    }

    /// `clamp(min,preferred,max)`.
    pub fn clamp(
        &'static self,
        min: impl Into<StyleValue>,
        preferred: impl Into<StyleValue>,
        max: impl Into<StyleValue>,
    ) -> StyleValue {
        self.math_function("clamp", vec![min.into(), preferred.into(), max.into()])
    }

    /// `calc(..)` from a template whose `{0}`, `{1}`, .. placeholders are
    /// replaced with the converted operands.
    ///
    /// ```
    /// use horizon_lattice_css::value::numeric::LENGTH;
    /// use horizon_lattice_css::value::StyleValue;
    ///
    /// let value = LENGTH.calc("100% - {0}", [StyleValue::from(20)]);
    /// assert!(matches!(value, StyleValue::Lazy(_)));
    /// ```
    pub fn calc(
        &'static self,
        template: impl Into<String>,
        values: impl IntoIterator<Item = StyleValue>,
    ) -> StyleValue {
        let template = template.into();
        let values: Vec<StyleValue> = values.into_iter().collect();
        StyleValue::lazy(move || {
            let operands: Vec<String> = values.iter().map(|v| self.render_operand(v)).collect();
            format!("calc({})", substitute(&template, &operands))
        })
    }

    fn math_function(&'static self, name: &'static str, values: Vec<StyleValue>) -> StyleValue {
        StyleValue::lazy(move || {
            let operands: Vec<String> = values.iter().map(|v| self.render_operand(v)).collect();
            format!("{name}({})", operands.join(","))
        })
    }

    fn render_operand(&self, value: &StyleValue) -> String {
        self.to_css(value, Catalog::global()).unwrap_or_else(|err| {
            tracing::warn!(target: targets::CONVERT, family = self.name, %err, "math operand dropped");
            String::new()
        })
    }
}

/// Replace each `{i}` in one left-to-right pass. Operand text is never
/// scanned again and out-of-range placeholders stay as written.
fn substitute(template: &str, operands: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let operand = after[digits..]
            .starts_with('}')
            .then(|| after[..digits].parse::<usize>().ok())
            .flatten()
            .and_then(|i| operands.get(i));
        match operand {
            Some(text) => {
                out.push_str(text);
                rest = &after[digits + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Register the numeric well-known functions.
pub(crate) fn register(builder: &mut CatalogBuilder) {
    builder
        .wkf(WellKnownFunc::Number, |v, c| NUMBER.to_css(v, c))
        .wkf(WellKnownFunc::Length, |v, c| LENGTH.to_css(v, c))
        .wkf(WellKnownFunc::Percent, |v, c| PERCENT.to_css(v, c))
        .wkf(WellKnownFunc::Angle, |v, c| ANGLE.to_css(v, c))
        .wkf(WellKnownFunc::Time, |v, c| TIME.to_css(v, c))
        .wkf(WellKnownFunc::Resolution, |v, c| RESOLUTION.to_css(v, c))
        .wkf(WellKnownFunc::Frequency, |v, c| FREQUENCY.to_css(v, c));
}
