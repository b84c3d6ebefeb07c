//! Declaring rules into a scope.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::container::{ScopeId, StyleDefinition, StyleEngine};
use crate::logging::targets;
use crate::rules::{GroupCondition, Keyframe, Rule, RuleKey, RuleRef, Selector, Styleset};
use crate::value::{NameCell, StyleValue};
use crate::{Error, Result};

/// Handles to the named rules of another scope.
#[derive(Debug, Clone)]
pub struct ScopeRefs {
    scope: ScopeId,
    name: String,
    rules: IndexMap<Arc<str>, RuleRef>,
}

impl ScopeRefs {
    pub(crate) fn collect(engine: &StyleEngine, scope: ScopeId) -> Result<Self> {
        let target = engine.scope(scope)?;
        let rules = target
            .named
            .iter()
            .map(|(slot, key)| (slot.clone(), engine.rule_ref_at(scope, *key)))
            .collect();
        Ok(Self {
            scope,
            name: target.name.clone(),
            rules,
        })
    }

    /// The scope the handles point into.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// A rule by slot.
    pub fn get(&self, slot: &str) -> Option<&RuleRef> {
        self.rules.get(slot)
    }

    /// A rule by slot, failing with a construction error when missing.
    pub fn require(&self, slot: &str) -> Result<&RuleRef> {
        self.get(slot).ok_or_else(|| {
            Error::construction(self.name.clone(), format!("no rule declared under '{slot}'"))
        })
    }

    /// Iterate over slots and handles in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleRef)> {
        self.rules.iter().map(|(slot, rule)| (&**slot, rule))
    }
}

/// Declares rules into one scope while its definition runs.
///
/// Rules are kept in declaration order. Declaring a slot a second time
/// replaces the rule but keeps its place, its key and its name, so handles
/// taken earlier point at the new rule.
pub struct RuleBuilder<'e> {
    engine: &'e mut StyleEngine,
    scope: ScopeId,
    depth: usize,
}

impl<'e> RuleBuilder<'e> {
    pub(crate) fn new(engine: &'e mut StyleEngine, scope: ScopeId) -> Self {
        Self {
            engine,
            scope,
            depth: 0,
        }
    }

    /// The scope being declared.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Declare a rule under a slot.
    pub fn add(&mut self, slot: &str, mut rule: Rule) -> RuleRef {
        let scope = &mut self.engine.scopes[self.scope];
        let slot: Arc<str> = Arc::from(slot);
        rule.slot = Some(slot.clone());
        rule.merged = None;

        let key = match scope.named.get(&slot).copied() {
            Some(key) => {
                if let Some(existing) = scope.rules.get_mut(key) {
                    rule.cell = existing.cell.clone();
                    *existing = rule;
                }
                tracing::trace!(target: targets::ENGINE, scope = %scope.name, %slot, "rule redeclared");
                key
            }
            None => {
                rule.cell = NameCell::default();
                let key = scope.rules.insert(rule);
                scope.order.push(key);
                scope.named.insert(slot.clone(), key);
                key
            }
        };

        self.rule_ref(key)
    }

    /// Declare a rule without a slot.
    pub fn add_unnamed(&mut self, mut rule: Rule) -> RuleRef {
        rule.cell = NameCell::default();
        rule.merged = None;
        let scope = &mut self.engine.scopes[self.scope];
        let key = scope.rules.insert(rule);
        scope.order.push(key);
        scope.unnamed.push(key);
        self.rule_ref(key)
    }

    /// Declare a class rule.
    pub fn class(&mut self, slot: &str, styleset: Styleset) -> RuleRef {
        self.add(slot, Rule::class(styleset))
    }

    /// Declare an id rule.
    pub fn id(&mut self, slot: &str, styleset: Styleset) -> RuleRef {
        self.add(slot, Rule::id(styleset))
    }

    /// Declare a rule for an element name.
    pub fn tag(&mut self, tag: &str, styleset: Styleset) -> RuleRef {
        self.add_unnamed(Rule::tag(tag, styleset))
    }

    /// Declare a rule for an arbitrary selector.
    pub fn style(&mut self, selector: impl Into<Selector>, styleset: Styleset) -> RuleRef {
        self.add_unnamed(Rule::selector(selector, styleset))
    }

    /// Declare keyframes.
    pub fn keyframes(&mut self, slot: &str, frames: impl IntoIterator<Item = Keyframe>) -> RuleRef {
        self.add(slot, Rule::animation(frames))
    }

    /// Declare a custom property.
    pub fn var(&mut self, slot: &str, value: impl Into<StyleValue>) -> RuleRef {
        self.add(slot, Rule::var(value))
    }

    /// Declare a custom property converted like `property`.
    pub fn typed_var(&mut self, slot: &str, property: &str, value: impl Into<StyleValue>) -> RuleRef {
        self.add(slot, Rule::typed_var(property, value))
    }

    /// Declare a counter.
    pub fn counter(&mut self, slot: &str) -> RuleRef {
        self.add(slot, Rule::counter())
    }

    /// Declare a page rule.
    pub fn page(&mut self, pseudo: Option<&str>, styleset: Styleset) -> RuleRef {
        self.add_unnamed(Rule::page(pseudo, styleset))
    }

    /// A handle to a rule already declared in this scope.
    pub fn get(&self, slot: &str) -> Option<RuleRef> {
        let scope = self.engine.scope(self.scope).ok()?;
        scope.named.get(slot).map(|key| self.rule_ref(*key))
    }

    /// Inherit every rule of definition `B`.
    ///
    /// `B` is processed as its own scope first. Its rules are then declared
    /// into this scope, and their slots are named by looking the names up in
    /// `B`'s scope, so derived rules keep the base's names.
    pub fn extend<B: StyleDefinition + Default>(&mut self) -> Result<ScopeId> {
        let base = self.engine.process::<B>()?;
        if self.depth == 0 {
            self.engine.scopes[self.scope].base = Some(base);
        }

        self.depth += 1;
        let result = B::default().define(self);
        self.depth -= 1;
        result.map(|()| base)
    }

    /// Use the rules of another definition.
    ///
    /// The definition is processed (or fetched) as a singleton scope and
    /// recorded as a reference, which is activated before this scope.
    pub fn use_definition<D: StyleDefinition + Default>(&mut self) -> Result<ScopeRefs> {
        let used = self.engine.process::<D>()?;
        let references = &mut self.engine.scopes[self.scope].references;
        if !references.contains(&used) {
            references.push(used);
        }
        ScopeRefs::collect(self.engine, used)
    }

    /// Declare a `@media` group.
    pub fn media(
        &mut self,
        query: impl Into<String>,
        define: impl FnOnce(&mut RuleBuilder<'_>) -> Result<()>,
    ) -> Result<RuleRef> {
        self.group(GroupCondition::Media(query.into()), define)
    }

    /// Declare a `@supports` group.
    pub fn supports(
        &mut self,
        query: impl Into<String>,
        define: impl FnOnce(&mut RuleBuilder<'_>) -> Result<()>,
    ) -> Result<RuleRef> {
        self.group(GroupCondition::Supports(query.into()), define)
    }

    fn group(
        &mut self,
        condition: GroupCondition,
        define: impl FnOnce(&mut RuleBuilder<'_>) -> Result<()>,
    ) -> Result<RuleRef> {
        let child = self.engine.create_nested_scope(self.scope);
        {
            let mut nested = RuleBuilder::new(&mut *self.engine, child);
            define(&mut nested)?;
        }
        Ok(self.add_unnamed(Rule::group(condition, child)))
    }

    fn rule_ref(&self, key: RuleKey) -> RuleRef {
        self.engine.rule_ref_at(self.scope, key)
    }
}
