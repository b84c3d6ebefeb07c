//! Tracing targets used by the CSS engine.
//!
//! The library never installs a subscriber. To see its events, install one in
//! the host application and filter on these targets:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lattice_css::engine=debug")
//!     .init();
//! ```

/// Target names for log filtering.
pub mod targets {
    /// Crate-wide target.
    pub const CSS: &str = "horizon_lattice_css";
    /// Scope processing, activation and insertion.
    pub const ENGINE: &str = "horizon_lattice_css::engine";
    /// Name generation.
    pub const NAMING: &str = "horizon_lattice_css::naming";
    /// Value conversion.
    pub const CONVERT: &str = "horizon_lattice_css::convert";
    /// Catalog registration.
    pub const CATALOG: &str = "horizon_lattice_css::catalog";
}
