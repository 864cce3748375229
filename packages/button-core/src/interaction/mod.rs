//! Interaction state tracking.
//!
//! Turns raw pointer, focus and key signals into hover, press and
//! focus-visible state, and signals activation.

mod tracker;

pub use tracker::{
    Activation, InteractionStateTracker, PressSource, StateChange, SubscriptionId, TrackerRef,
};
