//! The trait implemented by style definitions.

use crate::container::RuleBuilder;
use crate::Result;

/// A type that declares a scope's rules.
///
/// A definition is instantiated once per engine unless it is multiplex, in
/// which case every use creates a fresh scope.
///
/// # Example
///
/// ```
/// use horizon_lattice_css::prelude::*;
///
/// #[derive(Default)]
/// struct Buttons;
///
/// impl StyleDefinition for Buttons {
///     fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
///         rules.class("primary", Styleset::new().set("color", 0xffffff));
///         Ok(())
///     }
/// }
///
/// let mut engine = StyleEngine::new();
/// let scope = engine.process::<Buttons>()?;
/// assert_eq!(engine.render(scope)?, ".Buttons_primary{color:#ffffff;}");
/// # Ok::<(), horizon_lattice_css::Error>(())
/// ```
pub trait StyleDefinition: 'static {
    /// Declare the scope's rules in order.
    fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()>;

    /// Name used as the prefix of readable rule names. Defaults to the
    /// type's name without its module path.
    fn scope_name(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    /// Whether every use gets a fresh scope.
    fn is_multiplex(&self) -> bool {
        false
    }
}

pub(crate) fn short_type_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_drop_paths_and_generics() {
        assert_eq!(short_type_name("app::styles::Theme"), "Theme");
        assert_eq!(short_type_name("app::Card<app::Dark>"), "Card");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
