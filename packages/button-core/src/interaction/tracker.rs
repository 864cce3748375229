//! Interaction state machine for a single control.
//!
//! Hover, press and focus-visible are three independent sub-machines. Every
//! input method updates state synchronously and then notifies subscribers
//! with the list of changes it produced, in order.
//!
//! State lives in `Cell`s so subscribers may call back into the tracker
//! (for example to flip `loading` from an activation callback).

use crate::props::EventKind;
use crate::types::{FocusModality, InteractionState, Key, PointerButton};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared handle to a tracker.
pub type TrackerRef = Rc<InteractionStateTracker>;

type Subscriber = Rc<dyn Fn(&StateChange)>;

/// Input that started the current press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressSource {
    Pointer,
    Keyboard(Key),
}

/// Semantic "this control was triggered".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub source: PressSource,
}

/// A single transition reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Hover(bool),
    Press(bool),
    FocusVisible(bool),
    Activated(Activation),
}

/// Handle returned by [`InteractionStateTracker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Live interaction state of one control instance.
pub struct InteractionStateTracker {
    state: Cell<InteractionState>,
    press: Cell<Option<PressSource>>,
    disabled: Cell<bool>,
    loading: Cell<bool>,
    detached: Cell<bool>,
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Subscriber)>>,
}

impl Default for InteractionStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InteractionStateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionStateTracker")
            .field("state", &self.state.get())
            .field("press", &self.press.get())
            .field("disabled", &self.disabled.get())
            .field("loading", &self.loading.get())
            .field("detached", &self.detached.get())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl InteractionStateTracker {
    /// Create a tracker with all interaction flags cleared.
    pub fn new() -> Self {
        Self {
            state: Cell::new(InteractionState::default()),
            press: Cell::new(None),
            disabled: Cell::new(false),
            loading: Cell::new(false),
            detached: Cell::new(false),
            next_id: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Create a shared tracker.
    pub fn shared() -> TrackerRef {
        Rc::new(Self::new())
    }

    /// Current interaction state.
    pub fn state(&self) -> InteractionState {
        self.state.get()
    }

    /// Input that started the current press, if any.
    pub fn press_source(&self) -> Option<PressSource> {
        self.press.get()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    /// Whether presses and activation are currently suppressed.
    pub fn is_inert(&self) -> bool {
        self.disabled.get() || self.loading.get()
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Register a callback invoked for every state change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Drop every subscriber and ignore all further input.
    pub fn detach(&self) {
        self.subscribers.borrow_mut().clear();
        self.press.set(None);
        self.state.set(InteractionState::default());
        self.detached.set(true);
        tracing::debug!("Interaction tracker detached");
    }

    fn notify(&self, changes: &[StateChange]) {
        if changes.is_empty() {
            return;
        }

        // Snapshot so callbacks can subscribe, unsubscribe or feed input.
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, s)| Rc::clone(s))
            .collect();

        for change in changes {
            for subscriber in &subscribers {
                subscriber(change);
            }
        }
    }

    // ========================================================================
    // Declared flags
    // ========================================================================

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
        self.cancel_press_if_inert();
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
        self.cancel_press_if_inert();
    }

    fn cancel_press_if_inert(&self) {
        if self.is_inert() && self.press.get().is_some() {
            tracing::debug!("Control became inert, cancelling press");
            let mut changes = Vec::new();
            self.end_press(&mut changes);
            self.notify(&changes);
        }
    }

    // ========================================================================
    // Input signals
    // ========================================================================

    /// Route a raw event to the matching input method.
    pub fn handle(&self, event: EventKind) {
        match event {
            EventKind::PointerEnter => self.on_pointer_enter(),
            EventKind::PointerLeave => self.on_pointer_leave(),
            EventKind::PointerDown(button) => self.on_pointer_down(button),
            EventKind::PointerUp(button) => self.on_pointer_up(button),
            EventKind::PointerCancel => self.on_pointer_cancel(),
            EventKind::Focus(modality) => self.on_focus(modality),
            EventKind::Blur => self.on_blur(),
            EventKind::KeyDown(key) => self.on_key_down(key),
            EventKind::KeyUp(key) => self.on_key_up(key),
        }
    }

    pub fn on_pointer_enter(&self) {
        if self.detached.get() {
            return;
        }
        let mut changes = Vec::new();
        self.set_hovered(true, &mut changes);
        self.notify(&changes);
    }

    /// Leaving the bounds also ends a pointer press without activation.
    pub fn on_pointer_leave(&self) {
        if self.detached.get() {
            return;
        }
        let mut changes = Vec::new();
        self.set_hovered(false, &mut changes);
        if self.press.get() == Some(PressSource::Pointer) {
            tracing::debug!("Pointer left bounds while pressed, press ended");
            self.end_press(&mut changes);
        }
        self.notify(&changes);
    }

    pub fn on_pointer_down(&self, button: PointerButton) {
        if self.detached.get() || button != PointerButton::Primary {
            return;
        }
        if self.is_inert() {
            tracing::trace!("Pointer down ignored, control is inert");
            return;
        }
        if self.press.get().is_some() {
            tracing::warn!("Pointer down while already pressed, ignoring");
            return;
        }

        let mut changes = Vec::new();
        self.start_press(PressSource::Pointer, &mut changes);
        self.notify(&changes);
    }

    /// Releasing inside the bounds ends the press and activates.
    pub fn on_pointer_up(&self, button: PointerButton) {
        if self.detached.get() || button != PointerButton::Primary {
            return;
        }
        if self.press.get() != Some(PressSource::Pointer) {
            tracing::trace!("Pointer up without matching press, ignoring");
            return;
        }

        let mut changes = Vec::new();
        self.end_press(&mut changes);
        self.activate(PressSource::Pointer, &mut changes);
        self.notify(&changes);
    }

    pub fn on_pointer_cancel(&self) {
        if self.detached.get() || self.press.get() != Some(PressSource::Pointer) {
            return;
        }
        tracing::debug!("Pointer press cancelled");
        let mut changes = Vec::new();
        self.end_press(&mut changes);
        self.notify(&changes);
    }

    /// Focus shows a ring only when it came from the keyboard or from code.
    pub fn on_focus(&self, modality: FocusModality) {
        if self.detached.get() {
            return;
        }
        let mut changes = Vec::new();
        self.set_focus_visible(modality.shows_focus_ring(), &mut changes);
        tracing::trace!("Focus acquired via {:?}", modality);
        self.notify(&changes);
    }

    /// Blur clears focus-visible and cancels a keyboard press.
    pub fn on_blur(&self) {
        if self.detached.get() {
            return;
        }
        let mut changes = Vec::new();
        self.set_focus_visible(false, &mut changes);
        if matches!(self.press.get(), Some(PressSource::Keyboard(_))) {
            tracing::debug!("Blur during keyboard press, press cancelled");
            self.end_press(&mut changes);
        }
        self.notify(&changes);
    }

    pub fn on_key_down(&self, key: Key) {
        if self.detached.get() || !key.activates() || self.is_inert() {
            return;
        }
        // Auto-repeat or a second activation key while one is held.
        if self.press.get().is_some() {
            return;
        }

        let mut changes = Vec::new();
        self.start_press(PressSource::Keyboard(key), &mut changes);
        self.notify(&changes);
    }

    pub fn on_key_up(&self, key: Key) {
        if self.detached.get() {
            return;
        }
        let source = PressSource::Keyboard(key);
        if self.press.get() != Some(source) {
            return;
        }

        let mut changes = Vec::new();
        self.end_press(&mut changes);
        self.activate(source, &mut changes);
        self.notify(&changes);
    }

    // ========================================================================
    // Sub-machines
    // ========================================================================

    fn set_hovered(&self, hovered: bool, changes: &mut Vec<StateChange>) {
        let mut state = self.state.get();
        if state.hovered != hovered {
            state.hovered = hovered;
            self.state.set(state);
            tracing::trace!("Hover: {}", hovered);
            changes.push(StateChange::Hover(hovered));
        }
    }

    fn set_focus_visible(&self, visible: bool, changes: &mut Vec<StateChange>) {
        let mut state = self.state.get();
        if state.focus_visible != visible {
            state.focus_visible = visible;
            self.state.set(state);
            changes.push(StateChange::FocusVisible(visible));
        }
    }

    fn start_press(&self, source: PressSource, changes: &mut Vec<StateChange>) {
        self.press.set(Some(source));
        let mut state = self.state.get();
        state.pressed = true;
        self.state.set(state);
        tracing::debug!("Press started ({:?})", source);
        changes.push(StateChange::Press(true));
    }

    fn end_press(&self, changes: &mut Vec<StateChange>) {
        self.press.set(None);
        let mut state = self.state.get();
        if state.pressed {
            state.pressed = false;
            self.state.set(state);
            changes.push(StateChange::Press(false));
        }
    }

    fn activate(&self, source: PressSource, changes: &mut Vec<StateChange>) {
        if self.is_inert() {
            return;
        }
        tracing::debug!("Activated ({:?})", source);
        changes.push(StateChange::Activated(Activation { source }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(tracker: &InteractionStateTracker) -> Rc<RefCell<Vec<StateChange>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        tracker.subscribe(move |change| sink.borrow_mut().push(*change));
        log
    }

    fn activations(log: &Rc<RefCell<Vec<StateChange>>>) -> usize {
        log.borrow()
            .iter()
            .filter(|c| matches!(c, StateChange::Activated(_)))
            .count()
    }

    #[test]
    fn test_initial_state() {
        let tracker = InteractionStateTracker::new();
        assert_eq!(tracker.state(), InteractionState::default());
        assert!(!tracker.is_inert());
    }

    #[test]
    fn test_enter_down_up_activates_once() {
        let tracker = InteractionStateTracker::new();
        let log = recording(&tracker);

        tracker.on_pointer_enter();
        tracker.on_pointer_down(PointerButton::Primary);
        tracker.on_pointer_up(PointerButton::Primary);

        assert_eq!(
            tracker.state(),
            InteractionState {
                hovered: true,
                pressed: false,
                focus_visible: false,
            }
        );
        assert_eq!(activations(&log), 1);
        assert_eq!(
            *log.borrow(),
            vec![
                StateChange::Hover(true),
                StateChange::Press(true),
                StateChange::Press(false),
                StateChange::Activated(Activation {
                    source: PressSource::Pointer
                }),
            ]
        );
    }

    #[test]
    fn test_leaving_bounds_ends_press_without_activation() {
        let tracker = InteractionStateTracker::new();
        let log = recording(&tracker);

        tracker.on_pointer_down(PointerButton::Primary);
        tracker.on_pointer_leave();
        tracker.on_pointer_up(PointerButton::Primary);

        assert!(!tracker.state().pressed);
        assert_eq!(activations(&log), 0);
    }

    #[test]
    fn test_pointer_down_does_not_affect_hover() {
        let tracker = InteractionStateTracker::new();
        tracker.on_pointer_down(PointerButton::Primary);
        assert!(!tracker.state().hovered);
        assert!(tracker.state().pressed);
    }

    #[test]
    fn test_cancel_ends_press_without_activation() {
        let tracker = InteractionStateTracker::new();
        let log = recording(&tracker);

        tracker.on_pointer_enter();
        tracker.on_pointer_down(PointerButton::Primary);
        tracker.on_pointer_cancel();
        tracker.on_pointer_up(PointerButton::Primary);

        assert!(!tracker.state().pressed);
        assert!(tracker.state().hovered);
        assert_eq!(activations(&log), 0);
    }

    #[test]
    fn test_secondary_button_is_ignored() {
        let tracker = InteractionStateTracker::new();
        tracker.on_pointer_down(PointerButton::Secondary);
        assert!(!tracker.state().pressed);
    }

    #[test]
    fn test_up_without_down_is_noop() {
        let tracker = InteractionStateTracker::new();
        let log = recording(&tracker);

        tracker.on_pointer_up(PointerButton::Primary);
        tracker.on_pointer_cancel();
        tracker.on_key_up(Key::Enter);

        assert_eq!(tracker.state(), InteractionState::default());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_duplicate_events_are_normalized() {
        let tracker = InteractionStateTracker::new();
        let log = recording(&tracker);

        tracker.on_pointer_enter();
        tracker.on_pointer_enter();
        tracker.on_pointer_down(PointerButton::Primary);
        tracker.on_pointer_down(PointerButton::Primary);

        assert_eq!(
            *log.borrow(),
            vec![StateChange::Hover(true), StateChange::Press(true)]
        );
    }

    #[test]
    fn test_focus_visible_follows_modality() {
        let tracker = InteractionStateTracker::new();

        tracker.on_focus(FocusModality::Keyboard);
        assert!(tracker.state().focus_visible);

        tracker.on_focus(FocusModality::Pointer);
        assert!(!tracker.state().focus_visible);

        tracker.on_focus(FocusModality::Programmatic);
        assert!(tracker.state().focus_visible);

        tracker.on_blur();
        assert!(!tracker.state().focus_visible);
    }

    #[test]
    fn test_disabled_suppresses_press_but_not_hover_or_focus() {
        let tracker = InteractionStateTracker::new();
        tracker.set_disabled(true);
        let log = recording(&tracker);

        tracker.on_pointer_enter();
        tracker.on_focus(FocusModality::Keyboard);
        tracker.on_pointer_down(PointerButton::Primary);
        tracker.on_pointer_up(PointerButton::Primary);
        tracker.on_key_down(Key::Enter);
        tracker.on_key_up(Key::Enter);

        let state = tracker.state();
        assert!(state.hovered);
        assert!(state.focus_visible);
        assert!(!state.pressed);
        assert_eq!(activations(&log), 0);
    }

    #[test]
    fn test_loading_suppresses_activation() {
        let tracker = InteractionStateTracker::new();
        tracker.set_loading(true);
        let log = recording(&tracker);

        tracker.on_pointer_enter();
        tracker.on_pointer_down(PointerButton::Primary);
        tracker.on_pointer_up(PointerButton::Primary);

        assert!(tracker.is_inert());
        assert!(!tracker.is_disabled());
        assert_eq!(activations(&log), 0);
    }

    #[test]
    fn test_becoming_inert_cancels_press() {
        let tracker = InteractionStateTracker::new();
        let log = recording(&tracker);

        tracker.on_pointer_down(PointerButton::Primary);
        tracker.set_loading(true);
        assert!(!tracker.state().pressed);

        tracker.set_loading(false);
        tracker.on_pointer_up(PointerButton::Primary);
        assert_eq!(activations(&log), 0);
    }

    #[test]
    fn test_keyboard_activation() {
        let tracker = InteractionStateTracker::new();
        let log = recording(&tracker);

        tracker.on_key_down(Key::Space);
        tracker.on_key_down(Key::Space);
        assert!(tracker.state().pressed);
        assert_eq!(tracker.press_source(), Some(PressSource::Keyboard(Key::Space)));

        // Releasing a different key does not end the press.
        tracker.on_key_up(Key::Enter);
        assert!(tracker.state().pressed);

        tracker.on_key_up(Key::Space);
        assert!(!tracker.state().pressed);
        assert_eq!(activations(&log), 1);
    }

    #[test]
    fn test_other_keys_ignored() {
        let tracker = InteractionStateTracker::new();
        tracker.on_key_down(Key::Other);
        assert!(!tracker.state().pressed);
    }

    #[test]
    fn test_blur_cancels_keyboard_press() {
        let tracker = InteractionStateTracker::new();
        let log = recording(&tracker);

        tracker.on_focus(FocusModality::Keyboard);
        tracker.on_key_down(Key::Enter);
        tracker.on_blur();
        tracker.on_key_up(Key::Enter);

        assert!(!tracker.state().pressed);
        assert_eq!(activations(&log), 0);
    }

    #[test]
    fn test_pointer_leave_keeps_keyboard_press() {
        let tracker = InteractionStateTracker::new();
        tracker.on_pointer_enter();
        tracker.on_key_down(Key::Enter);
        tracker.on_pointer_leave();
        assert!(tracker.state().pressed);
    }

    #[test]
    fn test_unsubscribe_and_detach() {
        let tracker = InteractionStateTracker::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let id = tracker.subscribe(move |c| sink.borrow_mut().push(*c));

        assert!(tracker.unsubscribe(id));
        assert!(!tracker.unsubscribe(id));
        tracker.on_pointer_enter();
        assert!(log.borrow().is_empty());

        let _ = recording(&tracker);
        assert!(!tracker.is_detached());
        tracker.detach();
        assert!(tracker.is_detached());
        assert_eq!(tracker.subscriber_count(), 0);
        assert_eq!(tracker.state(), InteractionState::default());

        tracker.on_pointer_down(PointerButton::Primary);
        assert!(!tracker.state().pressed);
    }

    #[test]
    fn test_subscriber_may_reenter_tracker() {
        let tracker = InteractionStateTracker::shared();
        let weak = Rc::downgrade(&tracker);
        tracker.subscribe(move |change| {
            if let (StateChange::Activated(_), Some(t)) = (change, weak.upgrade()) {
                t.set_loading(true);
            }
        });

        tracker.on_pointer_down(PointerButton::Primary);
        tracker.on_pointer_up(PointerButton::Primary);

        assert!(tracker.is_loading());
    }

    #[test]
    fn test_handle_routes_events() {
        let tracker = InteractionStateTracker::new();
        tracker.handle(EventKind::PointerEnter);
        tracker.handle(EventKind::Focus(FocusModality::Keyboard));
        tracker.handle(EventKind::PointerDown(PointerButton::Primary));

        assert_eq!(
            tracker.state(),
            InteractionState {
                hovered: true,
                pressed: true,
                focus_visible: true,
            }
        );
    }
}
