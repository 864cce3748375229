//! Static rule tables for the style resolver.
//!
//! Axis tables never look at interaction state. Hover and press treatments
//! are emitted unconditionally as modifier tokens (`hover:`, `active:`) and
//! left to the presentation layer. The only scoped group is the disabled
//! override set, emitted when the control is disabled.

use crate::types::{Size, Variant};

/// Tokens for one axis value.
#[derive(Debug, Clone, Copy)]
pub struct AxisRules {
    pub always: &'static [&'static str],
    pub disabled: &'static [&'static str],
}

impl AxisRules {
    const fn plain(always: &'static [&'static str]) -> Self {
        Self {
            always,
            disabled: &[],
        }
    }
}

/// Rules shared by every variant and size: layout, cursor and transition timing.
pub const BASE: AxisRules = AxisRules {
    always: &[
        "inline-flex",
        "items-center",
        "justify-center",
        "relative",
        "cursor-pointer",
        "tracking-wide",
        "transition",
        "outline-none",
    ],
    disabled: &["disabled:cursor-not-allowed"],
};

const PRIMARY: AxisRules = AxisRules {
    always: &[
        "font-semibold",
        "bg-indigo-500",
        "text-white",
        "rounded-full",
        "shadow",
        "hover:bg-indigo-600",
        "hover:shadow-md",
        "active:bg-indigo-700",
    ],
    disabled: &["disabled:bg-indigo-500/50", "disabled:shadow"],
};

const SECONDARY: AxisRules = AxisRules {
    always: &[
        "font-normal",
        "bg-gray-50",
        "text-gray-950",
        "rounded-full",
        "shadow",
        "border",
        "border-neutral-200/50",
        "hover:bg-gray-100",
        "active:bg-gray-200",
    ],
    disabled: &["disabled:bg-gray-50"],
};

const DESTRUCTIVE: AxisRules = AxisRules {
    always: &[
        "font-semibold",
        "bg-red-500",
        "text-white",
        "rounded-full",
        "shadow",
        "hover:bg-red-600",
        "hover:shadow-md",
        "active:bg-red-700",
    ],
    disabled: &["disabled:bg-red-500/50", "disabled:shadow"],
};

const GHOST: AxisRules = AxisRules {
    always: &[
        "font-light",
        "text-gray-950",
        "hover:text-gray-600",
        "active:text-gray-700",
    ],
    disabled: &["disabled:text-gray-950"],
};

const LINK: AxisRules = AxisRules {
    always: &[
        "font-light",
        "text-indigo-500",
        "hover:text-indigo-600",
        "hover:underline",
        "active:text-indigo-700",
    ],
    disabled: &["disabled:text-indigo-500/50", "disabled:no-underline"],
};

const SMALL: AxisRules = AxisRules::plain(&["text-sm", "py-1", "px-4"]);
const DEFAULT: AxisRules = AxisRules::plain(&["text-base", "py-2", "px-8"]);
const LARGE: AxisRules = AxisRules::plain(&["text-lg", "py-3", "px-12"]);

/// Rules for the variant axis.
pub fn variant_rules(variant: Variant) -> &'static AxisRules {
    match variant {
        Variant::Primary => &PRIMARY,
        Variant::Secondary => &SECONDARY,
        Variant::Destructive => &DESTRUCTIVE,
        Variant::Ghost => &GHOST,
        Variant::Link => &LINK,
    }
}

/// Rules for the size axis.
pub fn size_rules(size: Size) -> &'static AxisRules {
    match size {
        Size::Small => &SMALL,
        Size::Default => &DEFAULT,
        Size::Large => &LARGE,
    }
}

const FILLED: &[Variant] = &[Variant::Primary, Variant::Secondary, Variant::Destructive];
const TEXT: &[Variant] = &[Variant::Ghost, Variant::Link];

/// A rule keyed on a predicate over the variant and the live interaction flags.
///
/// `None` in a flag field means the flag is not part of the predicate.
/// An empty `variants` slice matches every variant. Predicates never read
/// `disabled`, which already scopes axis tokens.
#[derive(Debug, Clone, Copy)]
pub struct CompoundRule {
    pub name: &'static str,
    pub variants: &'static [Variant],
    pub pressed: Option<bool>,
    pub focus_visible: Option<bool>,
    pub tokens: &'static [&'static str],
}

/// Compound rules in evaluation order.
pub const COMPOUND_RULES: &[CompoundRule] = &[
    CompoundRule {
        name: "focus-ring",
        variants: FILLED,
        pressed: None,
        focus_visible: Some(true),
        tokens: &["ring-2", "ring-indigo-500/70", "ring-offset-2"],
    },
    CompoundRule {
        name: "focus-ring-destructive",
        variants: &[Variant::Destructive],
        pressed: None,
        focus_visible: Some(true),
        tokens: &["ring-red-500/70"],
    },
    CompoundRule {
        name: "focus-underline",
        variants: TEXT,
        pressed: None,
        focus_visible: Some(true),
        tokens: &["underline", "underline-offset-4"],
    },
    CompoundRule {
        name: "pressed-flat",
        variants: FILLED,
        pressed: Some(true),
        focus_visible: None,
        tokens: &["shadow-none"],
    },
];

/// Loading indicator container tokens, coloured to contrast with the variant.
pub const INDICATOR_BASE: &[&str] = &["absolute", "inline-flex", "items-center"];

pub fn indicator_border(variant: Variant) -> &'static str {
    match variant {
        Variant::Primary | Variant::Destructive => "border-white",
        Variant::Secondary | Variant::Ghost => "border-gray-950",
        Variant::Link => "border-indigo-500",
    }
}

/// Spinner tokens; the border colour is inherited from the indicator container.
pub const SPINNER: &[&str] = &[
    "w-4",
    "h-4",
    "rounded-full",
    "border-2",
    "border-b-transparent",
    "animate-spin",
    "border-[inherit]",
];
