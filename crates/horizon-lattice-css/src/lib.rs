//! Typed CSS rule definitions and serialization for Horizon Lattice.
//!
//! This crate turns styles declared in Rust into CSS text, featuring:
//!
//! - **Values**: A small value language ([`value::StyleValue`]) with
//!   conversion rules per property and per CSS function
//! - **Catalog**: Well-known converters, function descriptors and property
//!   kinds assembled once at start-up
//! - **Rules**: Class, id, tag, selector, keyframes, custom property, counter,
//!   page and conditional group rules with inheritance
//! - **Scopes**: Definitions processed into named scopes, with readable or
//!   optimized generated names
//! - **Sinks**: Reference-counted activation into a string or a live sheet
//!
//! # Example
//!
//! ```
//! use horizon_lattice_css::prelude::*;
//!
//! #[derive(Default)]
//! struct Layout;
//!
//! impl StyleDefinition for Layout {
//!     fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
//!         let gap = rules.var("gap", LENGTH.units(4.0, "px"));
//!         rules.class(
//!             "row",
//!             Styleset::new().set("display", "flex").set("gap", &gap),
//!         );
//!         Ok(())
//!     }
//! }
//!
//! let mut engine = StyleEngine::new();
//! let mut sink = StringSink::new();
//! engine.activate_definition::<Layout>(&mut sink)?;
//! assert_eq!(
//!     sink.css(),
//!     ":root{--Layout_gap:4px;}.Layout_row{display:flex;gap:var(--Layout_gap);}"
//! );
//! # Ok::<(), horizon_lattice_css::Error>(())
//! ```

pub mod catalog;
pub mod config;
pub mod container;
pub mod logging;
pub mod naming;
pub mod rules;
pub mod sink;
pub mod value;

mod error;

pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::catalog::{Catalog, WellKnownFunc};
    pub use crate::config::EngineConfig;
    pub use crate::container::{RuleBuilder, ScopeId, StyleDefinition, StyleEngine};
    pub use crate::naming::NamingMode;
    pub use crate::rules::{Keyframe, Rule, RuleRef, Selector, Styleset, Waypoint};
    pub use crate::sink::{SheetSink, StringSink, StyleSink};
    pub use crate::value::color::{hsl, hsla, rgb, rgba};
    pub use crate::value::numeric::{ANGLE, LENGTH, NUMBER, PERCENT, TIME};
    pub use crate::value::{FuncCall, Record, StyleValue};
    pub use crate::{Error, Result};
}
