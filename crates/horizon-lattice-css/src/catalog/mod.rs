//! The conversion catalog: well-known functions, function descriptors and
//! property kinds, assembled by one registration call.
//!
//! The catalog is built once at start-up. [`Catalog::global`] builds the
//! standard catalog on first use; an application that needs extra functions
//! calls [`install`] with its own builder before anything is serialized.
//!
//! # Example
//!
//! ```
//! use horizon_lattice_css::catalog::{Catalog, WellKnownFunc};
//! use horizon_lattice_css::value::StyleValue;
//!
//! let catalog = Catalog::global();
//! let text = catalog.convert(WellKnownFunc::Color, &StyleValue::from(0xff0000)).unwrap();
//! assert_eq!(text, "#ff0000");
//! ```

mod descriptor;
mod properties;
mod wkf;

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

pub use descriptor::{DescriptorBody, FunctionDescriptor};
pub use properties::PropertyKind;
pub use wkf::WellKnownFunc;

use crate::logging::targets;
use crate::value::convert::ValueFn;
use crate::value::{color, numeric, FuncCall, StyleValue};
use crate::{Error, Result};

static GLOBAL: OnceLock<Catalog> = OnceLock::new();

/// Immutable conversion tables.
#[derive(Debug)]
pub struct Catalog {
    wkf: HashMap<WellKnownFunc, ValueFn>,
    functions: HashMap<Cow<'static, str>, FunctionDescriptor>,
    properties: HashMap<Cow<'static, str>, PropertyKind>,
}

impl Catalog {
    /// Start an empty catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Build the standard catalog.
    pub fn standard() -> Result<Self> {
        let mut builder = Self::builder();
        builder.register_standard();
        builder.build()
    }

    /// The process-wide catalog, building the standard one on first use.
    ///
    /// # Panics
    ///
    /// Panics if the standard tables fail validation, which is a defect in
    /// this crate rather than a runtime condition.
    pub fn global() -> &'static Catalog {
        GLOBAL.get_or_init(|| {
            Self::standard().unwrap_or_else(|err| panic!("standard CSS catalog is invalid: {err}"))
        })
    }

    /// Convert a value with a well-known function.
    pub fn convert(&self, id: WellKnownFunc, value: &StyleValue) -> Result<String> {
        let convert = self.wkf.get(&id).ok_or_else(|| {
            Error::malformed(format!("{id:?}"), "well-known function is not registered")
        })?;
        convert(value, self)
    }

    /// Check whether a well-known function is registered.
    pub fn has_wkf(&self, id: WellKnownFunc) -> bool {
        self.wkf.contains_key(&id)
    }

    /// Look up a function descriptor.
    pub fn descriptor(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name)
    }

    /// Render a function call through its descriptor.
    pub fn render_function(&self, call: &FuncCall) -> Result<String> {
        let descriptor = self.descriptor(&call.name).ok_or_else(|| {
            Error::unsupported("function", format!("unregistered function '{}'", call.name))
        })?;
        descriptor.render(&call.args, call.repeating, self)
    }

    /// Number of registered function descriptors.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

/// Collects catalog entries and validates them in [`CatalogBuilder::build`].
#[derive(Default)]
pub struct CatalogBuilder {
    wkf: HashMap<WellKnownFunc, ValueFn>,
    functions: Vec<FunctionDescriptor>,
    properties: Vec<(Cow<'static, str>, PropertyKind)>,
}

impl CatalogBuilder {
    /// Register every standard entry. Each value domain contributes its own
    /// part in a fixed order, so the result never depends on load order.
    pub fn register_standard(&mut self) -> &mut Self {
        numeric::register(self);
        color::register(self);
        wkf::register(self);
        descriptor::register(self);
        properties::register(self);
        self
    }

    /// Register (or replace) a well-known function's converter.
    pub fn wkf(&mut self, id: WellKnownFunc, convert: ValueFn) -> &mut Self {
        self.wkf.insert(id, convert);
        self
    }

    /// Register a function descriptor.
    pub fn function(&mut self, descriptor: FunctionDescriptor) -> &mut Self {
        self.functions.push(descriptor);
        self
    }

    /// Register the conversion kind of a property.
    pub fn property(&mut self, name: impl Into<Cow<'static, str>>, kind: PropertyKind) -> &mut Self {
        self.properties.push((name.into(), kind));
        self
    }

    /// Validate every entry and freeze the catalog.
    pub fn build(self) -> Result<Catalog> {
        let registered = |id: WellKnownFunc| self.wkf.contains_key(&id);

        let mut functions = HashMap::with_capacity(self.functions.len());
        for descriptor in self.functions {
            descriptor.validate(&registered)?;
            let name = descriptor.name().to_string();
            if functions.contains_key(name.as_str()) {
                return Err(Error::malformed(name, "function registered twice"));
            }
            functions.insert(Cow::Owned(name), descriptor);
        }

        let mut properties = HashMap::with_capacity(self.properties.len());
        for (name, kind) in self.properties {
            if let Some(id) = kind.wkf() {
                if !registered(id) {
                    return Err(Error::malformed(
                        name,
                        format!("property references unregistered well-known function {id:?}"),
                    ));
                }
            }
            properties.insert(name, kind);
        }

        tracing::debug!(
            target: targets::CATALOG,
            wkf = self.wkf.len(),
            functions = functions.len(),
            properties = properties.len(),
            "catalog built"
        );

        Ok(Catalog {
            wkf: self.wkf,
            functions,
            properties,
        })
    }
}

/// Install a custom catalog as the process-wide one.
///
/// Must be called before the first use of [`Catalog::global`].
pub fn install(builder: CatalogBuilder) -> Result<&'static Catalog> {
    let catalog = builder.build()?;
    GLOBAL
        .set(catalog)
        .map_err(|_| Error::CatalogAlreadyInstalled)?;
    GLOBAL.get().ok_or(Error::CatalogAlreadyInstalled)
}
