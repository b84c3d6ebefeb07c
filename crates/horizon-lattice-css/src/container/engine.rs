//! Processing, serialization and activation of scopes.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::SlotMap;

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::container::definition::short_type_name;
use crate::container::{RuleBuilder, Scope, ScopeId, ScopeState, StyleDefinition};
use crate::logging::targets;
use crate::naming::NamingContext;
use crate::rules::{GroupCondition, RuleKey, RuleKind, RuleRef, Styleset};
use crate::sink::StyleSink;
use crate::value::convert::{v2s, ConvertOptions};
use crate::{Error, Result};

/// Decides whether a `@supports` condition holds.
pub trait FeatureSupport: Send {
    /// Check a feature query such as `(display: grid)`.
    fn supports(&self, query: &str) -> bool;
}

impl<F> FeatureSupport for F
where
    F: Fn(&str) -> bool + Send,
{
    fn supports(&self, query: &str) -> bool {
        self(query)
    }
}

struct AllSupported;

impl FeatureSupport for AllSupported {
    fn supports(&self, _query: &str) -> bool {
        true
    }
}

/// An engine behind a mutex, for embedders that use it from several threads.
pub type SharedStyleEngine = Arc<Mutex<StyleEngine>>;

/// Owns every scope and the naming state, and turns definitions into CSS.
///
/// # Lifecycle
///
/// [`process`](Self::process) runs a definition once, assigns names, merges
/// parents and buckets the rules. [`activate`](Self::activate) hands the
/// scope's text to a sink on the first activation only, and
/// [`deactivate`](Self::deactivate) removes it when the last user goes away.
/// Processed scopes are kept, so a later activation inserts the same text
/// again without reprocessing.
pub struct StyleEngine {
    pub(crate) scopes: SlotMap<ScopeId, Scope>,
    naming: NamingContext,
    singletons: HashMap<TypeId, ScopeId>,
    constructing: Vec<TypeId>,
    feature_support: Box<dyn FeatureSupport>,
    catalog: &'static Catalog,
}

impl std::fmt::Debug for StyleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleEngine")
            .field("scopes", &self.scopes.len())
            .field("singletons", &self.singletons.len())
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleEngine {
    /// Create an engine with readable names and the global catalog.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create an engine from configuration.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            scopes: SlotMap::with_key(),
            naming: NamingContext::from_config(&config.naming),
            singletons: HashMap::new(),
            constructing: Vec::new(),
            feature_support: Box::new(AllSupported),
            catalog: Catalog::global(),
        }
    }

    /// Use a specific catalog for serialization.
    pub fn with_catalog(mut self, catalog: &'static Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the predicate that decides `@supports` groups.
    pub fn set_feature_support(&mut self, support: impl FeatureSupport + 'static) {
        self.feature_support = Box::new(support);
    }

    /// The naming state.
    pub fn naming(&self) -> &NamingContext {
        &self.naming
    }

    /// The naming state, for switching policies at runtime.
    pub fn naming_mut(&mut self) -> &mut NamingContext {
        &mut self.naming
    }

    /// The catalog used for serialization.
    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    /// Wrap the engine for shared use across threads.
    pub fn into_shared(self) -> SharedStyleEngine {
        Arc::new(Mutex::new(self))
    }

    /// A scope by id.
    pub fn scope(&self, id: ScopeId) -> Result<&Scope> {
        self.scopes.get(id).ok_or(Error::UnknownScope)
    }

    fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope> {
        self.scopes.get_mut(id).ok_or(Error::UnknownScope)
    }

    /// Number of live scopes, nested groups included.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// The singleton scope of a definition, if it has been processed.
    pub fn scope_of<D: StyleDefinition>(&self) -> Option<ScopeId> {
        self.singletons.get(&TypeId::of::<D>()).copied()
    }

    /// The nested scope of a group rule.
    pub fn nested_scope(&self, group: &RuleRef) -> Option<ScopeId> {
        let scope = self.scopes.get(group.scope)?;
        match &scope.rules.get(group.key)?.kind {
            RuleKind::Group { scope, .. } => Some(*scope),
            _ => None,
        }
    }

    /// Process definition `D`, or return its scope if already processed.
    pub fn process<D: StyleDefinition + Default>(&mut self) -> Result<ScopeId> {
        if let Some(id) = self.scope_of::<D>() {
            return self.existing_singleton::<D>(id);
        }
        self.process_instance(D::default())
    }

    /// Process a definition instance.
    ///
    /// A non-multiplex definition is processed once; later calls return the
    /// same scope. A multiplex definition gets a new scope every time.
    ///
    /// A definition that reaches its own type while it is still declaring
    /// rules fails with [`Error::DefinitionCycle`], multiplex or not.
    ///
    /// If the definition fails, its scope and nested groups are discarded,
    /// the failure is logged, and [`Error::DefinitionConstruction`] is
    /// returned. Other scopes are not affected.
    #[tracing::instrument(
        skip_all,
        target = "horizon_lattice_css::engine",
        level = "debug",
        fields(definition = short_type_name(type_name::<D>()))
    )]
    pub fn process_instance<D: StyleDefinition>(&mut self, definition: D) -> Result<ScopeId> {
        let type_id = TypeId::of::<D>();
        if self.constructing.contains(&type_id) {
            return Err(Error::DefinitionCycle {
                definition: short_type_name(type_name::<D>()).to_string(),
            });
        }
        let multiplex = definition.is_multiplex();
        if !multiplex {
            if let Some(&id) = self.singletons.get(&type_id) {
                return self.existing_singleton::<D>(id);
            }
        }

        let definition_name = short_type_name(type_name::<D>());
        let name = self.naming.reserve_scope_name(&definition.scope_name(), multiplex);
        let id = self
            .scopes
            .insert_with_key(|id| Scope::new(id, name, definition_name, multiplex));
        if !multiplex {
            self.singletons.insert(type_id, id);
        }

        self.constructing.push(type_id);
        let defined = definition.define(&mut RuleBuilder::new(self, id));
        self.constructing.pop();
        if let Err(err) = defined {
            self.abandon(id, type_id);
            tracing::error!(
                target: targets::ENGINE,
                definition = definition_name,
                %err,
                "style definition failed; scope discarded"
            );
            return Err(match err {
                Error::DefinitionCycle { .. } => err,
                other => Error::construction(definition_name, other.to_string()),
            });
        }

        if let Err(err) = self.process_scope(id) {
            self.abandon(id, type_id);
            return Err(err);
        }
        Ok(id)
    }

    fn existing_singleton<D: StyleDefinition>(&self, id: ScopeId) -> Result<ScopeId> {
        match self.scope(id)?.state {
            ScopeState::Unprocessed => Err(Error::DefinitionCycle {
                definition: short_type_name(type_name::<D>()).to_string(),
            }),
            _ => Ok(id),
        }
    }

    fn abandon(&mut self, id: ScopeId, type_id: TypeId) {
        if self.singletons.get(&type_id) == Some(&id) {
            self.singletons.remove(&type_id);
        }
        self.discard_scope(id);
    }

    fn discard_scope(&mut self, id: ScopeId) {
        if let Some(scope) = self.scopes.remove(id) {
            for child in scope.children {
                self.discard_scope(child);
            }
        }
    }

    pub(crate) fn create_nested_scope(&mut self, owner: ScopeId) -> ScopeId {
        let (name, definition) = {
            let owner = &self.scopes[owner];
            (owner.name.clone(), owner.definition)
        };
        let child = self.scopes.insert_with_key(|id| {
            let mut scope = Scope::new(id, name, definition, false);
            scope.owner = Some(owner);
            scope
        });
        self.scopes[owner].children.push(child);
        child
    }

    pub(crate) fn rule_ref_at(&self, scope: ScopeId, key: RuleKey) -> RuleRef {
        let rule = &self.scopes[scope].rules[key];
        RuleRef {
            scope,
            key,
            kind: rule.kind.tag(),
            slot: rule.slot.clone().unwrap_or_else(|| Arc::from("")),
            cell: rule.cell.clone(),
            template: match &rule.kind {
                RuleKind::Var { template, .. } => template.clone(),
                _ => None,
            },
        }
    }

    fn process_scope(&mut self, id: ScopeId) -> Result<()> {
        let keys = self.scope(id)?.order.clone();

        for key in &keys {
            let rule = &self.scopes[id].rules[*key];
            let (Some(slot), true) = (rule.slot.clone(), rule.kind.tag().is_named()) else {
                continue;
            };
            let name = match rule.name_override.clone() {
                Some(name) => {
                    self.scopes[id].names.insert(slot.clone(), name.clone());
                    name
                }
                None => self.name_for(id, &slot)?,
            };
            if let Err(name) = self.scopes[id].rules[*key].cell.set(name) {
                return Err(Error::DuplicateName {
                    name,
                    slot: slot.to_string(),
                });
            }
        }

        for key in &keys {
            if self.scopes[id].rules[*key].kind.body().is_some() {
                let merged = self.merge_rule(id, *key, &mut Vec::new());
                self.scopes[id].rules[*key].merged = Some(merged);
            }
        }

        let scope = &mut self.scopes[id];
        scope.by_kind.clear();
        for key in &keys {
            let kind = scope.rules[*key].kind.tag();
            scope.by_kind.entry(kind).or_default().push(*key);
        }

        let children = scope.children.clone();
        for child in children {
            self.process_scope(child)?;
        }

        let scope = &mut self.scopes[id];
        scope.state = ScopeState::Processed;
        tracing::debug!(
            target: targets::ENGINE,
            scope = %scope.name,
            rules = scope.order.len(),
            nested = scope.owner.is_some(),
            "scope processed"
        );
        Ok(())
    }

    fn merge_rule(
        &mut self,
        scope: ScopeId,
        key: RuleKey,
        visiting: &mut Vec<(ScopeId, RuleKey)>,
    ) -> Styleset {
        let Some(rule) = self.scopes.get(scope).and_then(|s| s.rules.get(key)) else {
            tracing::warn!(target: targets::ENGINE, "skipping parent from a discarded scope");
            return Styleset::new();
        };
        if let Some(merged) = &rule.merged {
            return merged.clone();
        }
        let Some(body) = rule.kind.body() else {
            return Styleset::new();
        };
        if visiting.contains(&(scope, key)) {
            tracing::warn!(
                target: targets::ENGINE,
                slot = rule.slot().unwrap_or_default(),
                "skipping cyclic parent reference"
            );
            return body.styleset.clone();
        }

        let own = body.styleset.clone();
        let parents = body.parents.clone();
        visiting.push((scope, key));
        let mut merged = Styleset::new();
        for parent in &parents {
            let inherited = self.merge_rule(parent.scope, parent.key, visiting);
            merged.merge(&inherited);
        }
        merged.merge(&own);
        visiting.pop();

        if let Some(rule) = self.scopes.get_mut(scope).and_then(|s| s.rules.get_mut(key)) {
            rule.merged = Some(merged.clone());
        }
        merged
    }

    /// The name of a slot in a scope, generated on first use.
    ///
    /// Nested groups use their owner's names. A scope that extends another
    /// definition takes the name the base scope assigned to the same slot.
    pub fn name_for(&mut self, id: ScopeId, slot: &str) -> Result<String> {
        let scope = self.scope(id)?;
        if let Some(name) = scope.names.get(slot) {
            return Ok(name.clone());
        }

        let name = match scope.owner {
            Some(owner) => self.name_for(owner, slot)?,
            None => match self.inherited_name(scope.base, slot) {
                Some(name) => name,
                None => {
                    let scope_name = scope.name.clone();
                    self.naming.generate(&scope_name, slot)
                }
            },
        };

        self.scope_mut(id)?.names.insert(Arc::from(slot), name.clone());
        Ok(name)
    }

    fn inherited_name(&self, mut base: Option<ScopeId>, slot: &str) -> Option<String> {
        while let Some(id) = base {
            let scope = self.scopes.get(id)?;
            if let Some(name) = scope.names.get(slot) {
                return Some(name.clone());
            }
            base = scope.base;
        }
        None
    }

    /// The rule texts of a processed scope, in insertion order.
    ///
    /// Custom properties come first as one `:root{..}` block. `@supports`
    /// groups whose condition fails produce nothing; `@media` groups are
    /// always emitted.
    pub fn serialize(&self, id: ScopeId) -> Result<Vec<String>> {
        let scope = self.scope(id)?;
        let mut out = Vec::new();

        let vars = self.custom_properties(scope)?;
        if !vars.is_empty() {
            out.push(format!(":root{{{vars}}}"));
        }

        for rule in scope.rules() {
            match &rule.kind {
                RuleKind::Var { .. } | RuleKind::Counter => {}
                RuleKind::Group { condition, scope: nested } => {
                    if let GroupCondition::Supports(query) = condition {
                        if !self.feature_support.supports(query) {
                            tracing::debug!(target: targets::ENGINE, %query, "feature not supported; group skipped");
                            continue;
                        }
                    }
                    let inner = self.serialize(*nested)?.concat();
                    out.push(format!("{} {}{{{inner}}}", condition.keyword(), condition.query()));
                }
                _ => out.extend(rule.to_css(self.catalog)?),
            }
        }
        Ok(out)
    }

    fn custom_properties(&self, scope: &Scope) -> Result<String> {
        let mut vars = String::new();
        for rule in scope.rules() {
            let RuleKind::Var { template, value } = &rule.kind else {
                continue;
            };
            let name = rule.name().ok_or_else(|| Error::UnassignedName {
                slot: rule.slot().unwrap_or_default().to_string(),
            })?;
            let text = match template {
                Some(template) => self.catalog.property_to_css(template, value),
                None => v2s(value, &ConvertOptions::new(), self.catalog),
            };
            match text {
                Ok(text) => {
                    vars.push_str("--");
                    vars.push_str(name);
                    vars.push(':');
                    vars.push_str(&text);
                    vars.push(';');
                }
                Err(err) => {
                    tracing::warn!(target: targets::CONVERT, var = name, %err, "skipping custom property");
                }
            }
        }
        Ok(vars)
    }

    /// The whole text of a processed scope.
    pub fn render(&self, id: ScopeId) -> Result<String> {
        Ok(self.serialize(id)?.concat())
    }

    /// Add a user of a scope. The first user inserts the scope's text into
    /// the sink, after activating the scopes it references.
    ///
    /// On failure nothing stays activated: references activated by this call
    /// are deactivated again and the sink is left as it was.
    pub fn activate(&mut self, id: ScopeId, sink: &mut dyn StyleSink) -> Result<()> {
        let scope = self.scope_mut(id)?;
        if scope.ref_count > 0 {
            scope.ref_count += 1;
            tracing::debug!(target: targets::ENGINE, scope = %scope.name, ref_count = scope.ref_count, "scope already active");
            return Ok(());
        }

        let references = scope.references.clone();
        let text = self.serialize(id)?;

        let mut activated = Vec::with_capacity(references.len());
        for reference in references {
            if let Err(err) = self.activate(reference, sink) {
                for done in activated.into_iter().rev() {
                    if let Err(undo) = self.deactivate(done, sink) {
                        tracing::warn!(target: targets::ENGINE, %undo, "rollback deactivation failed");
                    }
                }
                return Err(err);
            }
            activated.push(reference);
        }

        for css in text {
            sink.insert_rule(id, &css);
        }

        let scope = self.scope_mut(id)?;
        scope.ref_count = 1;
        scope.state = ScopeState::Inserted;
        tracing::debug!(target: targets::ENGINE, scope = %scope.name, "scope inserted");
        Ok(())
    }

    /// Remove a user of a scope. The last user removes the scope's text from
    /// the sink and releases the scopes it references.
    pub fn deactivate(&mut self, id: ScopeId, sink: &mut dyn StyleSink) -> Result<()> {
        let scope = self.scope_mut(id)?;
        match scope.ref_count {
            0 => {
                tracing::warn!(target: targets::ENGINE, scope = %scope.name, "deactivating an inactive scope");
                return Ok(());
            }
            1 => {}
            _ => {
                scope.ref_count -= 1;
                tracing::debug!(target: targets::ENGINE, scope = %scope.name, ref_count = scope.ref_count, "scope still in use");
                return Ok(());
            }
        }

        scope.ref_count = 0;
        scope.state = ScopeState::Cleared;
        let references = scope.references.clone();
        tracing::debug!(target: targets::ENGINE, scope = %scope.name, "scope cleared");
        sink.remove_scope(id);

        for reference in references.into_iter().rev() {
            self.deactivate(reference, sink)?;
        }
        Ok(())
    }

    /// Process definition `D` if needed and activate its scope.
    pub fn activate_definition<D: StyleDefinition + Default>(
        &mut self,
        sink: &mut dyn StyleSink,
    ) -> Result<ScopeId> {
        let id = self.process::<D>()?;
        self.activate(id, sink)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, Selector};
    use crate::sink::StringSink;
    use crate::value::StyleValue;

    #[derive(Default)]
    struct Card;

    impl StyleDefinition for Card {
        fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
            let frame = rules.class("frame", Styleset::new().set("padding", 8).set("color", "black"));
            rules.add(
                "title",
                Rule::class(Styleset::new().set("color", "navy")).extends([&frame]),
            );
            rules.style(
                Selector::new().class(&frame).text(" p"),
                Styleset::new().set("margin", 0),
            );
            Ok(())
        }
    }

    #[derive(Default)]
    struct SelfUse;

    impl StyleDefinition for SelfUse {
        fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
            rules.use_definition::<SelfUse>()?;
            Ok(())
        }
    }

    #[test]
    fn processing_assigns_names_and_merges_parents() {
        let mut engine = StyleEngine::new();
        let id = engine.process::<Card>().unwrap();
        let scope = engine.scope(id).unwrap();

        assert_eq!(scope.state(), ScopeState::Processed);
        assert_eq!(scope.name_of("frame"), Some("Card_frame"));
        let title = scope.get("title").unwrap().styleset().unwrap();
        assert_eq!(title.get("padding"), Some(&StyleValue::Number(8.0)));
        assert_eq!(title.get("color"), Some(&StyleValue::from("navy")));

        assert_eq!(
            engine.render(id).unwrap(),
            ".Card_frame{padding:8px;color:black;}.Card_title{padding:8px;color:navy;}.Card_frame p{margin:0px;}"
        );
    }

    #[test]
    fn singletons_are_processed_once() {
        let mut engine = StyleEngine::new();
        let first = engine.process::<Card>().unwrap();
        let second = engine.process::<Card>().unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.scope_count(), 1);
    }

    #[test]
    fn buckets_by_kind() {
        let mut engine = StyleEngine::new();
        let id = engine.process::<Card>().unwrap();
        let scope = engine.scope(id).unwrap();
        assert_eq!(scope.rules_of_kind(crate::rules::RuleKindTag::Class).count(), 2);
        assert_eq!(scope.rules_of_kind(crate::rules::RuleKindTag::Selector).count(), 1);
        assert_eq!(scope.unnamed_rules().count(), 1);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut engine = StyleEngine::new();
        let err = engine.process::<SelfUse>().unwrap_err();
        assert!(matches!(err, Error::DefinitionCycle { .. }));
        assert_eq!(engine.scope_count(), 0);
        assert!(engine.scope_of::<SelfUse>().is_none());
    }

    #[derive(Default)]
    struct Recursive;

    impl StyleDefinition for Recursive {
        fn define(&self, rules: &mut RuleBuilder<'_>) -> Result<()> {
            rules.class("inner", Styleset::new().set("color", "red"));
            rules.use_definition::<Recursive>()?;
            Ok(())
        }

        fn is_multiplex(&self) -> bool {
            true
        }
    }

    #[test]
    fn multiplex_self_reference_is_a_cycle() {
        let mut engine = StyleEngine::new();
        let err = engine.process_instance(Recursive).unwrap_err();
        assert!(matches!(err, Error::DefinitionCycle { ref definition } if definition == "Recursive"));
        assert_eq!(engine.scope_count(), 0);
        assert!(engine.constructing.is_empty());

        assert!(engine.process::<Card>().is_ok());
    }

    #[test]
    fn activation_is_reference_counted() {
        let mut engine = StyleEngine::new();
        let mut sink = StringSink::new();
        let id = engine.activate_definition::<Card>(&mut sink).unwrap();
        engine.activate(id, &mut sink).unwrap();
        assert_eq!(sink.len(), 3);
        assert_eq!(engine.scope(id).unwrap().ref_count(), 2);

        engine.deactivate(id, &mut sink).unwrap();
        assert_eq!(sink.len(), 3);
        engine.deactivate(id, &mut sink).unwrap();
        assert!(sink.is_empty());
        assert_eq!(engine.scope(id).unwrap().state(), ScopeState::Cleared);
    }

    #[test]
    fn unknown_scope() {
        let mut engine = StyleEngine::new();
        let id = engine.process::<Card>().unwrap();
        let mut other = StyleEngine::new();
        assert!(matches!(other.render(id), Err(Error::UnknownScope)));
        assert!(matches!(other.name_for(id, "x"), Err(Error::UnknownScope)));
    }
}
