//! Property sets and their inheritance merge.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::catalog::Catalog;
use crate::logging::targets;
use crate::rules::{RuleRef, Selector};
use crate::value::convert::{dash_case, v2s, ConvertOptions};
use crate::value::{NameForm, NameRef, StyleValue};

/// A custom property declared inside a styleset (`--name:value`).
#[derive(Debug, Clone, PartialEq)]
pub struct CustomProperty {
    /// The custom property name.
    pub var: NameRef,
    /// Property whose conversion rules the value follows.
    pub template: Option<Arc<str>>,
    /// The value.
    pub value: StyleValue,
}

/// A styleset emitted as its own rule right after the owner's rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependent {
    /// Selector suffix (`":hover"`), or a template where `&` stands for the
    /// owner's selector (`"& > li"`).
    pub selector: Selector,
    /// The dependent's properties.
    pub styleset: Styleset,
}

/// Mapping from property name to value, plus the important flags, custom
/// properties and dependent rules that travel with it.
///
/// Property names are stored in dash-case; camelCase input is converted.
///
/// # Example
///
/// ```
/// use horizon_lattice_css::rules::Styleset;
///
/// let styles = Styleset::new()
///     .set("backgroundColor", 0x336699)
///     .important("padding", [4, 8])
///     .dependent(":hover", Styleset::new().set("opacity", 0.8));
///
/// assert!(styles.is_important("padding"));
/// assert_eq!(styles.dependents().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Styleset {
    properties: IndexMap<String, StyleValue>,
    important: HashSet<String>,
    custom: Vec<CustomProperty>,
    dependents: Vec<Dependent>,
}

impl Styleset {
    /// Create an empty styleset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, builder style.
    pub fn set(mut self, name: &str, value: impl Into<StyleValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a property and flag it `!important`.
    pub fn important(mut self, name: &str, value: impl Into<StyleValue>) -> Self {
        let name = dash_case(name).into_owned();
        self.properties.insert(name.clone(), value.into());
        self.important.insert(name);
        self
    }

    /// Declare a value for a custom property rule.
    pub fn custom(mut self, var: &RuleRef, value: impl Into<StyleValue>) -> Self {
        self.custom.push(CustomProperty {
            var: var.name_ref(NameForm::CustomProperty),
            template: var.template().map(Arc::from),
            value: value.into(),
        });
        self
    }

    /// Declare a value for a custom property with a fixed name.
    pub fn custom_named(mut self, name: &str, value: impl Into<StyleValue>) -> Self {
        self.custom.push(CustomProperty {
            var: NameRef::fixed(name.trim_start_matches("--"), NameForm::CustomProperty),
            template: None,
            value: value.into(),
        });
        self
    }

    /// Add a dependent styleset.
    pub fn dependent(mut self, selector: impl Into<Selector>, styleset: Styleset) -> Self {
        self.dependents.push(Dependent {
            selector: selector.into(),
            styleset,
        });
        self
    }

    /// Set a property in place. The property loses its important flag.
    pub fn insert(&mut self, name: &str, value: impl Into<StyleValue>) {
        let name = dash_case(name).into_owned();
        self.important.remove(&name);
        self.properties.insert(name, value.into());
    }

    /// Get a property by dash-case or camelCase name.
    pub fn get(&self, name: &str) -> Option<&StyleValue> {
        self.properties.get(&*dash_case(name))
    }

    /// Check whether a property is flagged `!important`.
    pub fn is_important(&self, name: &str) -> bool {
        self.important.contains(&*dash_case(name))
    }

    /// Iterate over properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Custom property declarations in order.
    pub fn custom_properties(&self) -> &[CustomProperty] {
        &self.custom
    }

    /// Dependent stylesets in order.
    pub fn dependents(&self) -> &[Dependent] {
        &self.dependents
    }

    /// Number of regular properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the styleset declares nothing at all.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.custom.is_empty() && self.dependents.is_empty()
    }

    /// Merge `source` into this styleset.
    ///
    /// Properties from `source` overwrite same-named ones and carry their
    /// important flag with them. Custom properties and dependents are
    /// appended, never overwritten.
    pub fn merge(&mut self, source: &Styleset) {
        for (name, value) in &source.properties {
            if source.important.contains(name) {
                self.important.insert(name.clone());
            } else {
                self.important.remove(name);
            }
            self.properties.insert(name.clone(), value.clone());
        }
        self.custom.extend(source.custom.iter().cloned());
        self.dependents.extend(source.dependents.iter().cloned());
    }

    /// The effective styleset of a rule: parents merged in order, then the
    /// rule's own properties.
    pub fn merged<'a>(parents: impl IntoIterator<Item = &'a Styleset>, own: &Styleset) -> Styleset {
        let mut result = Styleset::new();
        for parent in parents {
            result.merge(parent);
        }
        result.merge(own);
        result
    }

    /// Render the declarations, custom properties first.
    ///
    /// A declaration whose value cannot be converted is logged and skipped.
    pub fn to_declarations(&self, catalog: &Catalog) -> String {
        let mut out = String::new();

        for custom in &self.custom {
            let name = match custom.var.render() {
                Ok(name) => name,
                Err(err) => {
                    tracing::warn!(target: targets::CONVERT, %err, "skipping custom property");
                    continue;
                }
            };
            let value = match &custom.template {
                Some(template) => catalog.property_to_css(template, &custom.value),
                None => v2s(&custom.value, &ConvertOptions::new(), catalog),
            };
            match value {
                Ok(value) => {
                    out.push_str(&name);
                    out.push(':');
                    out.push_str(&value);
                    out.push(';');
                }
                Err(err) => {
                    tracing::warn!(target: targets::CONVERT, property = %name, %err, "skipping custom property");
                }
            }
        }

        for (name, value) in &self.properties {
            match catalog.property_to_css(name, value) {
                Ok(text) => {
                    out.push_str(name);
                    out.push(':');
                    out.push_str(&text);
                    if self.important.contains(name) {
                        out.push_str(" !important");
                    }
                    out.push(';');
                }
                Err(err) => {
                    tracing::warn!(target: targets::CONVERT, property = %name, %err, "skipping declaration");
                }
            }
        }

        out
    }
}
