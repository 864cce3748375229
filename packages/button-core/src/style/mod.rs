//! Style resolution for the button control.
//!
//! Resolution is a pure, table-driven function of a [`StyleVector`]:
//!
//! 1. Base rules
//! 2. Variant axis rules
//! 3. Size axis rules
//! 4. Compound rules whose predicate holds
//! 5. Stable deduplication
//!
//! Resolution only decides inclusion and order. Conflicting properties are
//! arbitrated by the presentation layer, where later tokens win.

mod tables;

pub use tables::{AxisRules, CompoundRule, COMPOUND_RULES};

use crate::types::{RuleSet, StyleVector, Variant};

impl CompoundRule {
    /// Whether the predicate holds for the given vector.
    pub fn matches(&self, vector: &StyleVector) -> bool {
        let flag = |want: Option<bool>, have: bool| want.map_or(true, |w| w == have);

        (self.variants.is_empty() || self.variants.contains(&vector.variant))
            && flag(self.pressed, vector.pressed)
            && flag(self.focus_visible, vector.focus_visible)
    }
}

/// Resolve a style vector into an ordered, deduplicated rule set.
///
/// Axis tokens depend only on variant, size and `disabled`. Disabled
/// overrides come last within each axis so they take precedence at the
/// presentation layer. Live hover, press and focus flags only feed the
/// compound rules.
///
/// # Example
///
/// ```rust
/// use button_core::{resolve, Size, StyleVector, Variant};
///
/// let rules = resolve(&StyleVector::new(Variant::Primary, Size::Small));
///
/// assert!(rules.contains("bg-indigo-500"));
/// assert!(rules.contains("text-sm"));
/// assert!(!rules.contains("ring-2"));
/// ```
pub fn resolve(vector: &StyleVector) -> RuleSet {
    resolve_with_extra(vector, std::iter::empty::<&str>())
}

/// Resolve a style vector and append consumer supplied tokens.
///
/// Extra tokens are applied after compound rules and share the same
/// deduplication pass.
pub fn resolve_with_extra<I, S>(vector: &StyleVector, extra: I) -> RuleSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut rules = RuleSet::new();

    emit_axis(&mut rules, &tables::BASE, vector.disabled);
    emit_axis(&mut rules, tables::variant_rules(vector.variant), vector.disabled);
    emit_axis(&mut rules, tables::size_rules(vector.size), vector.disabled);

    for compound in COMPOUND_RULES.iter().filter(|c| c.matches(vector)) {
        rules.extend(compound.tokens.iter().copied());
    }

    for token in extra {
        rules.extend(token.as_ref().split_whitespace());
    }

    rules
}

fn emit_axis(rules: &mut RuleSet, axis: &AxisRules, disabled: bool) {
    rules.extend(axis.always.iter().copied());
    if disabled {
        rules.extend(axis.disabled.iter().copied());
    }
}

/// Tokens for the loading indicator container.
pub fn indicator_rules(variant: Variant) -> RuleSet {
    let mut rules: RuleSet = tables::INDICATOR_BASE.iter().copied().collect();
    rules.push(tables::indicator_border(variant));
    rules
}

/// Tokens for the spinner inside the loading indicator.
pub fn spinner_rules() -> RuleSet {
    tables::SPINNER.iter().copied().collect()
}

/// Tokens for the label wrapper. While loading the label stays in layout
/// but is fully transparent.
pub fn label_rules(loading: bool) -> RuleSet {
    let opacity = if loading { "opacity-0" } else { "opacity-100" };
    ["transition", opacity].into_iter().collect()
}
