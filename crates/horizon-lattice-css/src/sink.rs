//! Destinations for generated rule text.
//!
//! The engine hands every finished rule to a [`StyleSink`]. A sink only
//! stores or forwards text; it never inspects it, so every sink receives the
//! same bytes for the same scopes.

use indexmap::IndexMap;

use crate::container::ScopeId;

/// Receives rule text as scopes are activated and deactivated.
pub trait StyleSink {
    /// Append one rule produced by `scope`.
    fn insert_rule(&mut self, scope: ScopeId, css: &str);

    /// Drop every rule produced by `scope`.
    fn remove_scope(&mut self, scope: ScopeId);
}

/// Accumulates rule text in insertion order, for rendering to a string.
#[derive(Debug, Default, Clone)]
pub struct StringSink {
    rules: Vec<(ScopeId, String)>,
}

impl StringSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All rules concatenated.
    pub fn css(&self) -> String {
        self.rules.iter().map(|(_, css)| css.as_str()).collect()
    }

    /// Number of rules held.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the sink holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl StyleSink for StringSink {
    fn insert_rule(&mut self, scope: ScopeId, css: &str) {
        self.rules.push((scope, css.to_string()));
    }

    fn remove_scope(&mut self, scope: ScopeId) {
        self.rules.retain(|(owner, _)| *owner != scope);
    }
}

/// Keeps one rule list per scope, the way a live style sheet holds one
/// element per activated definition.
#[derive(Debug, Default, Clone)]
pub struct SheetSink {
    sheets: IndexMap<ScopeId, Vec<String>>,
}

impl SheetSink {
    /// Create an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The rules a scope contributed.
    pub fn rules(&self, scope: ScopeId) -> &[String] {
        self.sheets.get(&scope).map(Vec::as_slice).unwrap_or_default()
    }

    /// Check whether a scope currently has rules in the sheet.
    pub fn contains(&self, scope: ScopeId) -> bool {
        self.sheets.contains_key(&scope)
    }

    /// Number of scopes with rules in the sheet.
    pub fn scope_count(&self) -> usize {
        self.sheets.len()
    }

    /// The whole sheet as text, in activation order.
    pub fn css(&self) -> String {
        self.sheets.values().flatten().map(String::as_str).collect()
    }
}

impl StyleSink for SheetSink {
    fn insert_rule(&mut self, scope: ScopeId, css: &str) {
        self.sheets.entry(scope).or_default().push(css.to_string());
    }

    fn remove_scope(&mut self, scope: ScopeId) {
        self.sheets.shift_remove(&scope);
    }
}
