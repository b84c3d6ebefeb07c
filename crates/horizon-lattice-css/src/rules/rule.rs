//! Style rules.
//!
//! Every rule kind is one variant of [`RuleKind`]. Kinds that carry a
//! styleset share [`StyleBody`], which holds the own properties and the
//! parents the rule inherits from.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::container::ScopeId;
use crate::logging::targets;
use crate::rules::{Selector, Styleset};
use crate::value::convert::format_number;
use crate::value::{NameCell, NameForm, NameRef, StyleValue};
use crate::Result;

slotmap::new_key_type! {
    /// Key of a rule inside its scope.
    pub struct RuleKey;
}

/// The kind of a rule, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKindTag {
    /// `.name{..}`
    Class,
    /// `#name{..}`
    Id,
    /// `tag{..}`
    Tag,
    /// Arbitrary selector.
    Selector,
    /// `@keyframes name{..}`
    Animation,
    /// Custom property.
    Var,
    /// Counter name.
    Counter,
    /// `@page{..}`
    Page,
    /// `@media` or `@supports` group.
    Group,
}

impl RuleKindTag {
    /// Whether rules of this kind get a generated name.
    pub fn is_named(self) -> bool {
        matches!(
            self,
            RuleKindTag::Class
                | RuleKindTag::Id
                | RuleKindTag::Animation
                | RuleKindTag::Var
                | RuleKindTag::Counter
        )
    }

    /// The form a reference to a rule of this kind takes inside a value.
    pub fn value_form(self) -> NameForm {
        match self {
            RuleKindTag::Var => NameForm::Var,
            _ => NameForm::Bare,
        }
    }
}

/// Own properties plus the rules they inherit from.
#[derive(Debug, Clone, Default)]
pub struct StyleBody {
    /// Own properties.
    pub styleset: Styleset,
    /// Parents in declaration order.
    pub parents: Vec<RuleRef>,
}

impl From<Styleset> for StyleBody {
    fn from(styleset: Styleset) -> Self {
        Self {
            styleset,
            parents: Vec::new(),
        }
    }
}

/// Position of a keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waypoint {
    /// `from`
    From,
    /// `to`
    To,
    /// A percentage of the animation.
    At(f64),
}

impl Waypoint {
    fn render(self) -> String {
        match self {
            Waypoint::From => "from".to_string(),
            Waypoint::To => "to".to_string(),
            Waypoint::At(percent) => format!("{}%", format_number(percent)),
        }
    }
}

/// One keyframe of an animation.
#[derive(Debug, Clone)]
pub struct Keyframe {
    /// Where the frame sits.
    pub waypoint: Waypoint,
    /// Properties at that point.
    pub styleset: Styleset,
}

impl Keyframe {
    /// Create a keyframe.
    pub fn new(waypoint: Waypoint, styleset: Styleset) -> Self {
        Self { waypoint, styleset }
    }
}

/// Condition of a grouping rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupCondition {
    /// `@media query`; always emitted.
    Media(String),
    /// `@supports query`; emitted only when the feature is supported.
    Supports(String),
}

impl GroupCondition {
    /// The at-rule keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            GroupCondition::Media(_) => "@media",
            GroupCondition::Supports(_) => "@supports",
        }
    }

    /// The condition text.
    pub fn query(&self) -> &str {
        match self {
            GroupCondition::Media(q) | GroupCondition::Supports(q) => q,
        }
    }
}

/// Kind-specific payload of a rule.
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Class rule.
    Class(StyleBody),
    /// Id rule.
    Id(StyleBody),
    /// Tag rule.
    Tag {
        /// Element name.
        tag: String,
        /// Properties.
        body: StyleBody,
    },
    /// Arbitrary selector rule.
    Selector {
        /// The selector.
        selector: Selector,
        /// Properties.
        body: StyleBody,
    },
    /// Keyframes.
    Animation(Vec<Keyframe>),
    /// Custom property.
    Var {
        /// Property whose conversion rules the value follows.
        template: Option<Arc<str>>,
        /// The value.
        value: StyleValue,
    },
    /// Counter; has no text of its own.
    Counter,
    /// Page rule.
    Page {
        /// Page pseudo-class (`:first`), if any.
        pseudo: Option<String>,
        /// Properties.
        body: StyleBody,
    },
    /// Conditional group whose rules live in a nested scope.
    Group {
        /// The condition.
        condition: GroupCondition,
        /// The nested scope.
        scope: ScopeId,
    },
}

impl RuleKind {
    /// The kind tag.
    pub fn tag(&self) -> RuleKindTag {
        match self {
            RuleKind::Class(_) => RuleKindTag::Class,
            RuleKind::Id(_) => RuleKindTag::Id,
            RuleKind::Tag { .. } => RuleKindTag::Tag,
            RuleKind::Selector { .. } => RuleKindTag::Selector,
            RuleKind::Animation(_) => RuleKindTag::Animation,
            RuleKind::Var { .. } => RuleKindTag::Var,
            RuleKind::Counter => RuleKindTag::Counter,
            RuleKind::Page { .. } => RuleKindTag::Page,
            RuleKind::Group { .. } => RuleKindTag::Group,
        }
    }

    /// The style body, for kinds that have one.
    pub fn body(&self) -> Option<&StyleBody> {
        match self {
            RuleKind::Class(body)
            | RuleKind::Id(body)
            | RuleKind::Tag { body, .. }
            | RuleKind::Selector { body, .. }
            | RuleKind::Page { body, .. } => Some(body),
            _ => None,
        }
    }

    fn body_mut(&mut self) -> Option<&mut StyleBody> {
        match self {
            RuleKind::Class(body)
            | RuleKind::Id(body)
            | RuleKind::Tag { body, .. }
            | RuleKind::Selector { body, .. }
            | RuleKind::Page { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// A style rule.
///
/// Rules are plain data until added to a scope through a
/// [`RuleBuilder`](crate::container::RuleBuilder). Once added, the scope owns
/// the rule; adding the same rule again requires a clone. Every added rule
/// gets its own name cell, so clones never share a name.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) kind: RuleKind,
    pub(crate) name_override: Option<String>,
    pub(crate) slot: Option<Arc<str>>,
    pub(crate) cell: NameCell,
    pub(crate) merged: Option<Styleset>,
}

impl Rule {
    fn with_kind(kind: RuleKind) -> Self {
        Self {
            kind,
            name_override: None,
            slot: None,
            cell: NameCell::default(),
            merged: None,
        }
    }

    /// A class rule.
    pub fn class(styleset: Styleset) -> Self {
        Self::with_kind(RuleKind::Class(styleset.into()))
    }

    /// An id rule.
    pub fn id(styleset: Styleset) -> Self {
        Self::with_kind(RuleKind::Id(styleset.into()))
    }

    /// A rule for an element name.
    pub fn tag(tag: impl Into<String>, styleset: Styleset) -> Self {
        Self::with_kind(RuleKind::Tag {
            tag: tag.into(),
            body: styleset.into(),
        })
    }

    /// A rule for an arbitrary selector.
    pub fn selector(selector: impl Into<Selector>, styleset: Styleset) -> Self {
        Self::with_kind(RuleKind::Selector {
            selector: selector.into(),
            body: styleset.into(),
        })
    }

    /// A keyframes rule.
    pub fn animation(frames: impl IntoIterator<Item = Keyframe>) -> Self {
        Self::with_kind(RuleKind::Animation(frames.into_iter().collect()))
    }

    /// A custom property converted with the default rules.
    pub fn var(value: impl Into<StyleValue>) -> Self {
        Self::with_kind(RuleKind::Var {
            template: None,
            value: value.into(),
        })
    }

    /// A custom property whose value is converted like `property`.
    pub fn typed_var(property: &str, value: impl Into<StyleValue>) -> Self {
        Self::with_kind(RuleKind::Var {
            template: Some(Arc::from(property)),
            value: value.into(),
        })
    }

    /// A counter.
    pub fn counter() -> Self {
        Self::with_kind(RuleKind::Counter)
    }

    /// A page rule, optionally for a page pseudo-class.
    pub fn page(pseudo: Option<&str>, styleset: Styleset) -> Self {
        Self::with_kind(RuleKind::Page {
            pseudo: pseudo.map(str::to_string),
            body: styleset.into(),
        })
    }

    pub(crate) fn group(condition: GroupCondition, scope: ScopeId) -> Self {
        Self::with_kind(RuleKind::Group { condition, scope })
    }

    /// Inherit from other rules. Only rules with a style body have parents;
    /// for other kinds this does nothing.
    pub fn extends<'a>(mut self, parents: impl IntoIterator<Item = &'a RuleRef>) -> Self {
        let kind = self.kind.tag();
        match self.kind.body_mut() {
            Some(body) => body.parents.extend(parents.into_iter().cloned()),
            None => tracing::debug!(
                target: targets::ENGINE,
                ?kind,
                "ignoring parents on a rule without a styleset"
            ),
        }
        self
    }

    /// Use an explicit name instead of a generated one.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name_override = Some(name.into());
        self
    }

    /// The kind payload.
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// The slot the rule was declared under, if it is a named rule.
    pub fn slot(&self) -> Option<&str> {
        self.slot.as_deref()
    }

    /// The assigned name, once the scope is processed.
    pub fn name(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    /// The effective styleset: merged if the scope is processed, otherwise
    /// the own properties.
    pub fn styleset(&self) -> Option<&Styleset> {
        self.merged
            .as_ref()
            .or_else(|| self.kind.body().map(|b| &b.styleset))
    }

    /// The selector text the rule's styleset is emitted under.
    pub fn selector_text(&self) -> Result<Option<String>> {
        let name = || {
            self.name().map(str::to_string).ok_or_else(|| crate::Error::UnassignedName {
                slot: self.slot().unwrap_or_default().to_string(),
            })
        };
        Ok(match &self.kind {
            RuleKind::Class(_) => Some(format!(".{}", name()?)),
            RuleKind::Id(_) => Some(format!("#{}", name()?)),
            RuleKind::Tag { tag, .. } => Some(tag.clone()),
            RuleKind::Selector { selector, .. } => Some(selector.render()?),
            RuleKind::Page { pseudo, .. } => Some(match pseudo {
                Some(pseudo) => format!("@page {pseudo}"),
                None => "@page".to_string(),
            }),
            _ => None,
        })
    }

    /// Render the rule's own text: the styleset rule followed by its
    /// dependents, or the keyframes block. Custom properties, counters and
    /// groups render nothing here.
    pub fn to_css(&self, catalog: &Catalog) -> Result<Vec<String>> {
        let mut out = Vec::new();
        if let RuleKind::Animation(frames) = &self.kind {
            let name = self.name().ok_or_else(|| crate::Error::UnassignedName {
                slot: self.slot().unwrap_or_default().to_string(),
            })?;
            let mut text = format!("@keyframes {name}{{");
            for frame in frames {
                text.push_str(&frame.waypoint.render());
                text.push('{');
                text.push_str(&frame.styleset.to_declarations(catalog));
                text.push('}');
            }
            text.push('}');
            out.push(text);
            return Ok(out);
        }

        if let (Some(selector), Some(styleset)) = (self.selector_text()?, self.styleset()) {
            render_styleset(&selector, styleset, catalog, &mut out)?;
        }
        Ok(out)
    }
}

fn render_styleset(
    selector: &str,
    styleset: &Styleset,
    catalog: &Catalog,
    out: &mut Vec<String>,
) -> Result<()> {
    let declarations = styleset.to_declarations(catalog);
    if !declarations.is_empty() {
        out.push(format!("{selector}{{{declarations}}}"));
    }
    for dependent in styleset.dependents() {
        let selector = dependent.selector.render_dependent(selector)?;
        render_styleset(&selector, &dependent.styleset, catalog, out)?;
    }
    Ok(())
}

/// Handle to a rule declared in a scope.
///
/// A handle is valid as soon as the rule is declared. Its name is filled in
/// when the scope is processed, so values and selectors built from it render
/// the final name.
#[derive(Debug, Clone)]
pub struct RuleRef {
    pub(crate) scope: ScopeId,
    pub(crate) key: RuleKey,
    pub(crate) kind: RuleKindTag,
    pub(crate) slot: Arc<str>,
    pub(crate) cell: NameCell,
    pub(crate) template: Option<Arc<str>>,
}

impl RuleRef {
    /// The owning scope.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The rule key inside its scope.
    pub fn key(&self) -> RuleKey {
        self.key
    }

    /// The rule kind.
    pub fn kind(&self) -> RuleKindTag {
        self.kind
    }

    /// The slot the rule was declared under.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// The assigned name, once the scope is processed.
    pub fn name(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    /// Property a custom property's values are converted like.
    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// A reference to the rule's name in the given form.
    pub fn name_ref(&self, form: NameForm) -> NameRef {
        NameRef::new(self.slot.clone(), self.cell.clone(), form)
    }

    /// The rule as a property value: `var(--name)` for custom properties,
    /// the bare name otherwise.
    pub fn value(&self) -> StyleValue {
        StyleValue::Ref(self.name_ref(self.kind.value_form()))
    }
}

impl From<&RuleRef> for StyleValue {
    fn from(rule: &RuleRef) -> Self {
        rule.value()
    }
}

impl PartialEq for RuleRef {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && self.key == other.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Styleset;

    fn named(rule: Rule, name: &str) -> Rule {
        let _ = rule.cell.set(name.to_string());
        rule
    }

    #[test]
    fn class_rule_with_dependents() {
        let styles = Styleset::new()
            .set("color", "red")
            .dependent(":hover", Styleset::new().set("color", "blue"))
            .dependent("& > span", Styleset::new().set("margin", 0));
        let rule = named(Rule::class(styles), "App_button");

        assert_eq!(
            rule.to_css(Catalog::global()).unwrap(),
            [
                ".App_button{color:red;}",
                ".App_button:hover{color:blue;}",
                ".App_button > span{margin:0px;}",
            ]
        );
    }

    #[test]
    fn keyframes() {
        let rule = named(
            Rule::animation([
                Keyframe::new(Waypoint::From, Styleset::new().set("opacity", 0)),
                Keyframe::new(Waypoint::At(50.0), Styleset::new().set("opacity", 0.3)),
                Keyframe::new(Waypoint::To, Styleset::new().set("opacity", 1)),
            ]),
            "App_fade",
        );
        assert_eq!(
            rule.to_css(Catalog::global()).unwrap(),
            ["@keyframes App_fade{from{opacity:0;}50%{opacity:0.3;}to{opacity:1;}}"]
        );
    }

    #[test]
    fn page_and_tag_rules() {
        let first = Rule::page(Some(":first"), Styleset::new().set("margin", 20));
        assert_eq!(first.to_css(Catalog::global()).unwrap(), ["@page :first{margin:20px;}"]);

        let any = Rule::page(None, Styleset::new().set("margin", 10));
        assert_eq!(any.to_css(Catalog::global()).unwrap(), ["@page{margin:10px;}"]);

        let body = Rule::tag("body", Styleset::new().set("margin", 0));
        assert_eq!(body.to_css(Catalog::global()).unwrap(), ["body{margin:0px;}"]);
    }

    #[test]
    fn empty_rules_render_nothing() {
        let rule = named(Rule::class(Styleset::new()), "App_empty");
        assert!(rule.to_css(Catalog::global()).unwrap().is_empty());
        assert!(Rule::counter().to_css(Catalog::global()).unwrap().is_empty());
    }

    #[test]
    fn unnamed_class_cannot_render() {
        let rule = Rule::class(Styleset::new().set("color", "red"));
        assert!(matches!(
            rule.to_css(Catalog::global()),
            Err(crate::Error::UnassignedName { .. })
        ));
    }

    #[test]
    fn kinds_that_get_names() {
        assert!(RuleKindTag::Class.is_named());
        assert!(RuleKindTag::Var.is_named());
        assert!(!RuleKindTag::Tag.is_named());
        assert!(!RuleKindTag::Group.is_named());
    }
}
