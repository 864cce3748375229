//! Button Core - Headless interactive button control.
//!
//! This crate provides everything a host view layer needs to drive a button
//! without owning any rendering itself:
//!
//! - **Style resolution**: variant/size/state vector to an ordered, deduplicated rule set
//! - **Interaction state**: hover, press and focus-visible tracking from raw input signals
//! - **Press feedback**: a single cancellable scale transition per control
//! - **Prop merging**: ordered handler fan-out and shared node ownership
//! - **Control**: the composition of all of the above behind one contract
//!
//! # Example
//!
//! ```rust
//! use button_core::{ButtonProps, Control, EventKind, PointerButton, Variant};
//!
//! let control = Control::new(ButtonProps::new("Save").variant(Variant::Secondary));
//!
//! control.dispatch(EventKind::PointerEnter).unwrap();
//! control.dispatch(EventKind::PointerDown(PointerButton::Primary)).unwrap();
//!
//! let rendered = control.render();
//! assert!(rendered.rules.contains("hover:bg-gray-100"));
//! assert!(!rendered.overlay_visible);
//! ```

pub mod animation;
pub mod config;
pub mod control;
pub mod interaction;
pub mod props;
pub mod style;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, FocusModality, InteractionState, Key, PointerButton, RuleSet, Size, StyleVector,
    Variant,
};

// Re-export main functionality
pub use animation::{AnimationState, Easing, GestureAnimator, TransitionId};
pub use config::{AnimationConfig, ButtonConfig, DefaultsConfig};
pub use control::{ActivateCallback, ButtonProps, Control, LoadingOverlay, NodeHandle, Rendered};
pub use interaction::{
    Activation, InteractionStateTracker, PressSource, StateChange, SubscriptionId, TrackerRef,
};
pub use props::{
    merge, merge_refs, Event, EventKind, Handler, HandlerBag, HandlerError, NodeRef,
    RefCallback, RefTarget,
};
pub use style::{
    indicator_rules, label_rules, resolve, resolve_with_extra, spinner_rules, COMPOUND_RULES,
};

/// Error types for button-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Unknown size: {0}")]
    UnknownSize(String),

    #[error("Handler for '{event}' failed: {message}")]
    Handler { event: String, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<HandlerError> for Error {
    fn from(err: HandlerError) -> Self {
        Error::Handler {
            event: err.event,
            message: err.message,
        }
    }
}

/// Result type for button-core operations.
pub type Result<T> = std::result::Result<T, Error>;
