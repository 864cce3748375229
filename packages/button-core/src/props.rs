//! Handler and attribute bags, and their merging.
//!
//! Several independent producers (the interaction tracker, focus handling and
//! the consumer) each contribute a [`HandlerBag`]. [`merge`] combines them into
//! one bag that the host attaches verbatim to the rendered node.

use crate::types::{FocusModality, Key, PointerButton};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Raw input signal delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PointerEnter,
    PointerLeave,
    PointerDown(PointerButton),
    PointerUp(PointerButton),
    PointerCancel,
    Focus(FocusModality),
    Blur,
    KeyDown(Key),
    KeyUp(Key),
}

impl EventKind {
    /// Name under which handlers for this event are registered.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::PointerEnter => "pointerenter",
            EventKind::PointerLeave => "pointerleave",
            EventKind::PointerDown(_) => "pointerdown",
            EventKind::PointerUp(_) => "pointerup",
            EventKind::PointerCancel => "pointercancel",
            EventKind::Focus(_) => "focus",
            EventKind::Blur => "blur",
            EventKind::KeyDown(_) => "keydown",
            EventKind::KeyUp(_) => "keyup",
        }
    }
}

/// Event object passed unchanged to every handler registered for its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self { kind }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}

/// Failure reported by a single handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{event}: {message}")]
pub struct HandlerError {
    pub event: String,
    pub message: String,
}

impl HandlerError {
    pub fn new(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            message: message.into(),
        }
    }
}

/// Event handler stored in a bag.
pub type Handler = Rc<dyn Fn(&Event) -> Result<(), HandlerError>>;

/// Mapping from event name to ordered handlers, plus plain attributes.
#[derive(Clone, Default)]
pub struct HandlerBag {
    handlers: BTreeMap<String, Vec<Handler>>,
    attributes: BTreeMap<String, String>,
}

impl fmt::Debug for HandlerBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: BTreeMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("HandlerBag")
            .field("handlers", &handlers)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl HandlerBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, builder style.
    pub fn on<F>(mut self, event: &str, handler: F) -> Self
    where
        F: Fn(&Event) -> Result<(), HandlerError> + 'static,
    {
        self.add_handler(event, Rc::new(handler));
        self
    }

    /// Set an attribute, builder style.
    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Append a handler after any already registered for the event.
    pub fn add_handler(&mut self, event: &str, handler: Handler) {
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Event names with at least one handler, in sorted order.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.attributes.is_empty()
    }

    /// A single handler that fans out to every handler registered for `event`.
    pub fn handler(&self, event: &str) -> Option<Handler> {
        let handlers = self.handlers.get(event)?.clone();
        Some(Rc::new(move |e: &Event| run_all(&handlers, e)))
    }

    /// Deliver an event to its handlers in registration order.
    ///
    /// Every handler runs even when an earlier one fails; the first failure
    /// is returned once all of them have run.
    pub fn dispatch(&self, event: &Event) -> Result<(), HandlerError> {
        match self.handlers.get(event.name()) {
            Some(handlers) => run_all(handlers, event),
            None => Ok(()),
        }
    }
}

fn run_all(handlers: &[Handler], event: &Event) -> Result<(), HandlerError> {
    let mut first_error = None;

    for handler in handlers {
        if let Err(e) = handler(event) {
            tracing::warn!("Handler for '{}' failed: {}", event.name(), e.message);
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Merge bags into one.
///
/// Handlers for the same event keep the order of the bags they came from.
/// For attributes the last bag wins.
pub fn merge<'a, I>(bags: I) -> HandlerBag
where
    I: IntoIterator<Item = &'a HandlerBag>,
{
    let mut merged = HandlerBag::new();

    for bag in bags {
        for (event, handlers) in &bag.handlers {
            for handler in handlers {
                merged.add_handler(event, Rc::clone(handler));
            }
        }
        for (key, value) in &bag.attributes {
            merged.set_attribute(key, value.clone());
        }
    }

    merged
}

// ============================================================================
// Node ownership
// ============================================================================

/// Shared slot holding the rendered node, if mounted.
pub struct NodeRef<T>(Rc<RefCell<Option<T>>>);

impl<T> NodeRef<T> {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    pub fn set(&self, node: Option<T>) {
        *self.0.borrow_mut() = node;
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }
}

impl<T: Clone> NodeRef<T> {
    pub fn get(&self) -> Option<T> {
        self.0.borrow().clone()
    }
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Default for NodeRef<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for NodeRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.0.borrow()).finish()
    }
}

/// One claim on the rendered node.
pub enum RefTarget<T> {
    /// A slot that stores the node.
    Slot(NodeRef<T>),
    /// A setter called with the node on mount and `None` on unmount.
    Callback(Rc<dyn Fn(Option<&T>)>),
}

impl<T> Clone for RefTarget<T> {
    fn clone(&self) -> Self {
        match self {
            RefTarget::Slot(slot) => RefTarget::Slot(slot.clone()),
            RefTarget::Callback(f) => RefTarget::Callback(Rc::clone(f)),
        }
    }
}

impl<T> From<NodeRef<T>> for RefTarget<T> {
    fn from(slot: NodeRef<T>) -> Self {
        RefTarget::Slot(slot)
    }
}

/// Fan-out callback produced by [`merge_refs`].
pub struct RefCallback<T> {
    targets: Vec<RefTarget<T>>,
}

impl<T: Clone> RefCallback<T> {
    /// Forward the live node, or its absence, to every target.
    pub fn set(&self, node: Option<&T>) {
        for target in &self.targets {
            match target {
                RefTarget::Slot(slot) => slot.set(node.cloned()),
                RefTarget::Callback(f) => f(node),
            }
        }
    }

    /// Clear every target and drop them.
    pub fn teardown(&mut self) {
        self.set(None);
        self.targets.clear();
    }
}

impl<T> RefCallback<T> {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Combine several ownership claims into one callback.
pub fn merge_refs<T, I>(targets: I) -> RefCallback<T>
where
    I: IntoIterator<Item = RefTarget<T>>,
{
    RefCallback {
        targets: targets.into_iter().collect(),
    }
}
