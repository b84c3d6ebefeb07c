//! Scopes, definitions and the engine that processes them.
//!
//! A [`StyleDefinition`] declares rules through a [`RuleBuilder`]. The
//! [`StyleEngine`] runs each definition into a [`Scope`], assigns names,
//! resolves inheritance and hands the resulting text to a
//! [`StyleSink`](crate::sink::StyleSink).

mod builder;
mod definition;
mod engine;
mod scope;

pub use builder::{RuleBuilder, ScopeRefs};
pub use definition::StyleDefinition;
pub use engine::{FeatureSupport, SharedStyleEngine, StyleEngine};
pub use scope::{Scope, ScopeId, ScopeState};
