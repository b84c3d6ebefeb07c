//! Selector composition from text and rule references.

use crate::rules::RuleRef;
use crate::value::{NameForm, NameRef};
use crate::Result;

/// One piece of a selector.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorToken {
    /// Literal selector text.
    Text(String),
    /// A rule's name, written in the reference's form (`.name`, `#name`).
    Rule(NameRef),
}

/// How two compound selectors are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant (space).
    Descendant,
    /// Direct child (`>`).
    Child,
    /// Adjacent sibling (`+`).
    Adjacent,
    /// General sibling (`~`).
    Sibling,
}

impl Combinator {
    fn as_str(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::Adjacent => "+",
            Combinator::Sibling => "~",
        }
    }
}

/// A selector built from text and rule references whose names are filled in
/// when the rule's scope is processed.
///
/// # Example
///
/// ```ignore
/// let selector = Selector::new()
///     .class(&list)
///     .child()
///     .text("li")
///     .text(":first-child");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    tokens: Vec<SelectorToken>,
}

impl Selector {
    /// An empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// A selector made of literal text.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::new().text(text)
    }

    /// Append literal text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.tokens.push(SelectorToken::Text(text.into()));
        self
    }

    /// Append a class reference (`.name`).
    pub fn class(self, rule: &RuleRef) -> Self {
        self.rule(rule.name_ref(NameForm::Class))
    }

    /// Append an id reference (`#name`).
    pub fn id(self, rule: &RuleRef) -> Self {
        self.rule(rule.name_ref(NameForm::Id))
    }

    /// Append a name reference in its own form.
    pub fn rule(mut self, name: NameRef) -> Self {
        self.tokens.push(SelectorToken::Rule(name));
        self
    }

    /// Append a combinator.
    pub fn combine(self, combinator: Combinator) -> Self {
        self.text(combinator.as_str())
    }

    /// Append a child combinator.
    pub fn child(self) -> Self {
        self.combine(Combinator::Child)
    }

    /// Append a descendant combinator.
    pub fn descendant(self) -> Self {
        self.combine(Combinator::Descendant)
    }

    /// The tokens in order.
    pub fn tokens(&self) -> &[SelectorToken] {
        &self.tokens
    }

    /// Check if the selector has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Render the selector text.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                SelectorToken::Text(text) => out.push_str(text),
                SelectorToken::Rule(name) => out.push_str(&name.render()?),
            }
        }
        Ok(out)
    }

    /// Render this selector relative to an owner selector: every `&` is
    /// replaced with the owner, and a selector without `&` is appended to it.
    pub fn render_dependent(&self, owner: &str) -> Result<String> {
        let text = self.render()?;
        Ok(if text.contains('&') {
            text.replace('&', owner)
        } else {
            format!("{owner}{text}")
        })
    }
}

impl From<&str> for Selector {
    fn from(text: &str) -> Self {
        Selector::raw(text)
    }
}

impl From<String> for Selector {
    fn from(text: String) -> Self {
        Selector::raw(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn tokens_render_in_order() {
        let list = NameRef::fixed("App_list", NameForm::Class);
        let selector = Selector::new().rule(list).child().text("li").text(":hover");
        assert_eq!(selector.render().unwrap(), ".App_list>li:hover");
    }

    #[test]
    fn dependent_selectors() {
        assert_eq!(Selector::raw(":hover").render_dependent(".btn").unwrap(), ".btn:hover");
        assert_eq!(Selector::raw("& > li, &:focus").render_dependent(".btn").unwrap(), ".btn > li, .btn:focus");
        assert_eq!(Selector::raw("nav &").render_dependent("#main").unwrap(), "nav #main");
    }

    #[test]
    fn unprocessed_references_fail() {
        let pending = NameRef::new("item", Default::default(), NameForm::Class);
        let selector = Selector::raw("ul ").rule(pending);
        assert!(matches!(selector.render(), Err(Error::UnassignedName { .. })));
    }
}
