//! Core data types for the button control.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named visual treatment of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Primary,
    Secondary,
    Destructive,
    Ghost,
    Link,
}

impl Variant {
    /// All variants in declaration order.
    pub const ALL: [Variant; 5] = [
        Variant::Primary,
        Variant::Secondary,
        Variant::Destructive,
        Variant::Ghost,
        Variant::Link,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Primary => "primary",
            Variant::Secondary => "secondary",
            Variant::Destructive => "destructive",
            Variant::Ghost => "ghost",
            Variant::Link => "link",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "primary" => Ok(Variant::Primary),
            "secondary" => Ok(Variant::Secondary),
            "destructive" => Ok(Variant::Destructive),
            "ghost" => Ok(Variant::Ghost),
            "link" => Ok(Variant::Link),
            _ => Err(Error::UnknownVariant(s.to_string())),
        }
    }
}

/// Button size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    #[default]
    Default,
    Large,
}

impl Size {
    pub const ALL: [Size; 3] = [Size::Small, Size::Default, Size::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Default => "default",
            Size::Large => "large",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "small" | "sm" => Ok(Size::Small),
            "default" | "md" => Ok(Size::Default),
            "large" | "lg" => Ok(Size::Large),
            _ => Err(Error::UnknownSize(s.to_string())),
        }
    }
}

/// Input to the style resolver. Built fresh for every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StyleVector {
    pub variant: Variant,
    pub size: Size,
    pub hovered: bool,
    pub pressed: bool,
    pub focus_visible: bool,
    pub disabled: bool,
    pub loading: bool,
}

impl StyleVector {
    /// Create a vector with no interaction flags set.
    pub fn new(variant: Variant, size: Size) -> Self {
        Self {
            variant,
            size,
            ..Default::default()
        }
    }

    /// Combine declared flags with live interaction state.
    pub fn with_interaction(mut self, state: InteractionState) -> Self {
        self.hovered = state.hovered;
        self.pressed = state.pressed;
        self.focus_visible = state.focus_visible;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }
}

/// Ordered list of style tokens with no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet(Vec<String>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token unless it is already present.
    ///
    /// Returns `true` if the token was added.
    pub fn push(&mut self, token: impl Into<String>) -> bool {
        let token = token.into();
        if token.is_empty() || self.contains(&token) {
            return false;
        }
        self.0.push(token);
        true
    }

    pub fn extend<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for token in tokens {
            self.push(token);
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// Position of a token, used to check precedence.
    pub fn position(&self, token: &str) -> Option<usize> {
        self.0.iter().position(|t| t == token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Space separated form, ready to use as a class attribute.
    pub fn to_class_string(&self) -> String {
        self.0.join(" ")
    }
}

impl<S: Into<String>> FromIterator<S> for RuleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut rules = RuleSet::new();
        rules.extend(iter);
        rules
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_class_string())
    }
}

/// Live interaction state of one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InteractionState {
    pub hovered: bool,
    pub pressed: bool,
    pub focus_visible: bool,
}

/// Input modality that caused focus to be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusModality {
    Keyboard,
    Pointer,
    Programmatic,
}

impl FocusModality {
    /// Whether focus from this modality should show a focus indicator.
    pub fn shows_focus_ring(&self) -> bool {
        !matches!(self, FocusModality::Pointer)
    }
}

/// Pointer button that produced a down/up signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Auxiliary,
}

/// Keys relevant to button activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Enter,
    Space,
    Other,
}

impl Key {
    pub fn activates(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// Response envelope used by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
