//! Style rules, stylesets and selectors.

mod rule;
mod selector;
mod styleset;

pub use rule::{
    GroupCondition, Keyframe, Rule, RuleKey, RuleKind, RuleKindTag, RuleRef, StyleBody, Waypoint,
};
pub use selector::{Combinator, Selector, SelectorToken};
pub use styleset::{CustomProperty, Dependent, Styleset};
