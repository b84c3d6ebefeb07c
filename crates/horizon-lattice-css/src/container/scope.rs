//! Rule scopes.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use slotmap::SlotMap;

use crate::rules::{Rule, RuleKey, RuleKindTag};

slotmap::new_key_type! {
    /// Identifier of a scope owned by a [`StyleEngine`](super::StyleEngine).
    pub struct ScopeId;
}

/// Lifecycle of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeState {
    /// Rules are being declared.
    Unprocessed,
    /// Names assigned, parents merged, rules bucketed.
    Processed,
    /// Rule text handed to a sink.
    Inserted,
    /// Rule text removed from the sink; can be inserted again.
    Cleared,
}

/// A namespace for rule names and a unit of activation.
#[derive(Debug)]
pub struct Scope {
    pub(crate) id: ScopeId,
    pub(crate) name: String,
    pub(crate) definition: &'static str,
    pub(crate) state: ScopeState,
    pub(crate) multiplex: bool,
    pub(crate) rules: SlotMap<RuleKey, Rule>,
    pub(crate) order: Vec<RuleKey>,
    pub(crate) named: IndexMap<Arc<str>, RuleKey>,
    pub(crate) unnamed: Vec<RuleKey>,
    pub(crate) by_kind: HashMap<RuleKindTag, Vec<RuleKey>>,
    pub(crate) names: HashMap<Arc<str>, String>,
    pub(crate) base: Option<ScopeId>,
    pub(crate) owner: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    pub(crate) references: Vec<ScopeId>,
    pub(crate) ref_count: usize,
}

impl Scope {
    pub(crate) fn new(id: ScopeId, name: String, definition: &'static str, multiplex: bool) -> Self {
        Self {
            id,
            name,
            definition,
            state: ScopeState::Unprocessed,
            multiplex,
            rules: SlotMap::with_key(),
            order: Vec::new(),
            named: IndexMap::new(),
            unnamed: Vec::new(),
            by_kind: HashMap::new(),
            names: HashMap::new(),
            base: None,
            owner: None,
            children: Vec::new(),
            references: Vec::new(),
            ref_count: 0,
        }
    }

    /// The scope id.
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// The scope name used for readable rule names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type name of the definition that declared the scope.
    pub fn definition(&self) -> &'static str {
        self.definition
    }

    /// The lifecycle state.
    pub fn state(&self) -> ScopeState {
        self.state
    }

    /// Whether the scope was created for a multiplex definition.
    pub fn is_multiplex(&self) -> bool {
        self.multiplex
    }

    /// The scope this one inherits names from.
    pub fn base(&self) -> Option<ScopeId> {
        self.base
    }

    /// The scope a nested group belongs to.
    pub fn owner(&self) -> Option<ScopeId> {
        self.owner
    }

    /// Number of active users.
    pub fn ref_count(&self) -> usize {
        self.ref_count
    }

    /// Number of declared rules.
    pub fn rule_count(&self) -> usize {
        self.order.len()
    }

    /// A named rule by slot.
    pub fn get(&self, slot: &str) -> Option<&Rule> {
        self.named.get(slot).and_then(|key| self.rules.get(*key))
    }

    /// The name assigned to a slot.
    pub fn name_of(&self, slot: &str) -> Option<&str> {
        self.names.get(slot).map(String::as_str)
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.order.iter().filter_map(|key| self.rules.get(*key))
    }

    /// Named rules with their slots, in declaration order.
    pub fn named_rules(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.named
            .iter()
            .filter_map(|(slot, key)| self.rules.get(*key).map(|rule| (&**slot, rule)))
    }

    /// Rules declared without a slot, in declaration order.
    pub fn unnamed_rules(&self) -> impl Iterator<Item = &Rule> {
        self.unnamed.iter().filter_map(|key| self.rules.get(*key))
    }

    /// Rules of one kind, in declaration order. Empty until processed.
    pub fn rules_of_kind(&self, kind: RuleKindTag) -> impl Iterator<Item = &Rule> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(|key| self.rules.get(*key))
    }
}
