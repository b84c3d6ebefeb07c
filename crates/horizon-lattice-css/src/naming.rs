//! Rule name generation.
//!
//! A [`NamingContext`] hands out names for rules and scopes. It is owned by
//! the [`StyleEngine`](crate::container::StyleEngine) and passed explicitly
//! wherever names are generated, so two engines never share counters.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::NamingConfig;
use crate::logging::targets;

/// Name generation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingMode {
    /// `ScopeName_slot`.
    #[default]
    Readable,
    /// Prefix plus a counter (`n12`).
    Optimized,
}

/// Naming state: policy, counter and the names handed out so far.
#[derive(Debug, Clone)]
pub struct NamingContext {
    mode: NamingMode,
    prefix: String,
    next_id: u64,
    scope_names: HashSet<String>,
    used: HashSet<String>,
}

impl Default for NamingContext {
    fn default() -> Self {
        Self::from_config(&NamingConfig::default())
    }
}

impl NamingContext {
    /// Create a context with readable names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from configuration.
    pub fn from_config(config: &NamingConfig) -> Self {
        Self {
            mode: config.mode,
            prefix: config.prefix.clone(),
            next_id: config.first_id,
            scope_names: HashSet::new(),
            used: HashSet::new(),
        }
    }

    /// The active policy.
    pub fn mode(&self) -> NamingMode {
        self.mode
    }

    /// The prefix of optimized names.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate optimized names from now on. Names already assigned keep
    /// their value.
    pub fn use_optimized(&mut self, prefix: impl Into<String>) {
        self.mode = NamingMode::Optimized;
        self.prefix = prefix.into();
    }

    /// Generate readable names from now on.
    pub fn use_readable(&mut self) {
        self.mode = NamingMode::Readable;
    }

    /// Take the next value of the unique-id counter.
    pub fn next_unique_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Generate a name for a rule slot in a scope.
    ///
    /// Readable names join scope and slot with `_`, so different pairs can
    /// produce the same text (`A` + `b_c` and `A_b` + `c`). A name that was
    /// already handed out gets a unique numeric suffix instead.
    pub fn generate(&mut self, scope_name: &str, slot: &str) -> String {
        let mut name = match self.mode {
            NamingMode::Readable => format!("{scope_name}_{slot}"),
            NamingMode::Optimized => {
                let id = self.next_unique_id();
                format!("{}{id}", self.prefix)
            }
        };

        while self.used.contains(&name) {
            let taken = name;
            name = match self.mode {
                NamingMode::Readable => format!("{scope_name}_{slot}_{}", self.next_unique_id()),
                NamingMode::Optimized => {
                    let id = self.next_unique_id();
                    format!("{}{id}", self.prefix)
                }
            };
            tracing::debug!(target: targets::NAMING, %taken, %name, "name already in use");
        }
        self.used.insert(name.clone());

        tracing::trace!(target: targets::NAMING, scope = scope_name, slot, %name, "generated name");
        name
    }

    /// Reserve a scope name. A name that is already taken, or any name of a
    /// multiplex scope, gets a unique numeric suffix.
    pub fn reserve_scope_name(&mut self, name: &str, multiplex: bool) -> String {
        let mut reserved = name.to_string();
        while multiplex || self.scope_names.contains(&reserved) {
            reserved = format!("{name}_{}", self.next_unique_id());
            if !self.scope_names.contains(&reserved) {
                break;
            }
        }
        self.scope_names.insert(reserved.clone());
        reserved
    }

    /// Check whether a generated name has been handed out.
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_names_join_scope_and_slot() {
        let mut naming = NamingContext::new();
        assert_eq!(naming.generate("App", "button"), "App_button");
        assert!(naming.is_used("App_button"));
    }

    #[test]
    fn optimized_names_use_the_counter() {
        let mut naming = NamingContext::new();
        naming.use_optimized("x");
        assert_eq!(naming.generate("App", "a"), "x1");
        assert_eq!(naming.generate("App", "b"), "x2");

        naming.use_readable();
        assert_eq!(naming.generate("App", "c"), "App_c");
    }

    #[test]
    fn colliding_readable_names_get_a_suffix() {
        let mut naming = NamingContext::new();
        assert_eq!(naming.generate("A", "b_c"), "A_b_c");
        assert_eq!(naming.generate("A_b", "c"), "A_b_c_1");
        assert_eq!(naming.generate("A_b", "c"), "A_b_c_2");
        assert!(naming.is_used("A_b_c_1"));
    }

    #[test]
    fn optimized_names_skip_taken_ones() {
        let mut naming = NamingContext::new();
        naming.use_optimized("n1");
        assert_eq!(naming.generate("App", "a"), "n11");

        naming.use_optimized("n");
        for id in 2..=10 {
            assert_eq!(naming.generate("App", "b"), format!("n{id}"));
        }
        assert_eq!(naming.generate("App", "c"), "n12");
    }

    #[test]
    fn scope_names_stay_unique() {
        let mut naming = NamingContext::new();
        assert_eq!(naming.reserve_scope_name("Card", false), "Card");
        assert_eq!(naming.reserve_scope_name("Card", false), "Card_1");
        assert_eq!(naming.reserve_scope_name("Row", true), "Row_2");
    }

    #[test]
    fn suffixed_scope_names_do_not_collide_with_declared_ones() {
        let mut naming = NamingContext::new();
        assert_eq!(naming.reserve_scope_name("Card", false), "Card");
        assert_eq!(naming.reserve_scope_name("Card", false), "Card_1");
        assert_eq!(naming.reserve_scope_name("Card_1", false), "Card_1_2");

        let mut naming = NamingContext::new();
        assert_eq!(naming.reserve_scope_name("Card_1", false), "Card_1");
        assert_eq!(naming.reserve_scope_name("Card", false), "Card");
        assert_eq!(naming.reserve_scope_name("Card", false), "Card_2");
    }

    #[test]
    fn configured_counter_start() {
        let config = NamingConfig {
            mode: NamingMode::Optimized,
            prefix: "s".into(),
            first_id: 100,
        };
        let mut naming = NamingContext::from_config(&config);
        assert_eq!(naming.generate("App", "a"), "s100");
    }
}
