//! The button control.
//!
//! [`Control`] wires the style resolver, the interaction tracker, the press
//! animator and the prop merger behind one contract: feed it declared props
//! and raw input events, read back rules, handlers, overlay state and scale.

use crate::animation::{AnimationState, GestureAnimator};
use crate::config::ButtonConfig;
use crate::interaction::{Activation, InteractionStateTracker, StateChange, TrackerRef};
use crate::props::{
    merge, merge_refs, Event, EventKind, HandlerBag, HandlerError, NodeRef, RefCallback, RefTarget,
};
use crate::style::{indicator_rules, label_rules, resolve_with_extra, spinner_rules};
use crate::types::{InteractionState, RuleSet, Size, StyleVector, Variant};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Opaque identifier of the host's rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle(pub u64);

/// Callback fired on activation.
pub type ActivateCallback = Rc<dyn Fn(&Activation)>;

const TRACKER_EVENTS: &[&str] = &[
    "pointerenter",
    "pointerleave",
    "pointerdown",
    "pointerup",
    "pointercancel",
    "keydown",
    "keyup",
];

const FOCUS_EVENTS: &[&str] = &["focus", "blur"];

/// Declared props of a button.
#[derive(Clone, Default)]
pub struct ButtonProps {
    /// Visual variant; falls back to the configured default
    pub variant: Option<Variant>,
    /// Size; falls back to the configured default
    pub size: Option<Size>,
    pub disabled: bool,
    pub loading: bool,
    /// Label content
    pub children: String,
    /// Extra style tokens appended after resolved rules
    pub class_name: Option<String>,
    pub on_activate: Option<ActivateCallback>,
    /// Consumer handlers and native attributes
    pub handlers: HandlerBag,
    /// Consumer claims on the rendered node
    pub node_refs: Vec<RefTarget<NodeHandle>>,
}

impl std::fmt::Debug for ButtonProps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ButtonProps")
            .field("variant", &self.variant)
            .field("size", &self.size)
            .field("disabled", &self.disabled)
            .field("loading", &self.loading)
            .field("children", &self.children)
            .field("class_name", &self.class_name)
            .field("on_activate", &self.on_activate.is_some())
            .field("handlers", &self.handlers)
            .field("node_refs", &self.node_refs.len())
            .finish()
    }
}

impl ButtonProps {
    pub fn new(children: impl Into<String>) -> Self {
        Self {
            children: children.into(),
            ..Default::default()
        }
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
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

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn on_activate<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Activation) + 'static,
    {
        self.on_activate = Some(Rc::new(callback));
        self
    }

    pub fn handlers(mut self, handlers: HandlerBag) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn node_ref(mut self, target: impl Into<RefTarget<NodeHandle>>) -> Self {
        self.node_refs.push(target.into());
        self
    }
}

/// Loading indicator tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingOverlay {
    pub container: RuleSet,
    pub spinner: RuleSet,
}

/// Everything the host needs to draw the control.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub variant: Variant,
    pub size: Size,
    pub rules: RuleSet,
    /// Label is always present; while loading it is transparent, not removed
    pub label: String,
    pub label_rules: RuleSet,
    pub overlay_visible: bool,
    pub overlay: Option<LoadingOverlay>,
    pub handlers: HandlerBag,
    pub scale: f32,
    pub state: InteractionState,
    pub activatable: bool,
}

/// A mounted button instance.
pub struct Control {
    props: ButtonProps,
    config: ButtonConfig,
    tracker: TrackerRef,
    animator: Rc<RefCell<GestureAnimator>>,
    on_activate: Rc<RefCell<Option<ActivateCallback>>>,
    node: NodeRef<NodeHandle>,
    node_callback: RefCallback<NodeHandle>,
    bag: HandlerBag,
    mounted: bool,
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("props", &self.props)
            .field("tracker", &self.tracker)
            .field("animator", &self.animator.borrow())
            .field("node", &self.node)
            .field("mounted", &self.mounted)
            .finish()
    }
}

impl Control {
    /// Mount a control with the default configuration.
    pub fn new(props: ButtonProps) -> Self {
        Self::with_config(props, ButtonConfig::default())
    }

    /// Mount a control with an explicit configuration.
    pub fn with_config(props: ButtonProps, config: ButtonConfig) -> Self {
        let tracker = InteractionStateTracker::shared();
        tracker.set_disabled(props.disabled);
        tracker.set_loading(props.loading);

        let animator = Rc::new(RefCell::new(GestureAnimator::new(config.animation)));
        let on_activate = Rc::new(RefCell::new(props.on_activate.clone()));

        let press_animator = Rc::clone(&animator);
        tracker.subscribe(move |change| {
            if let StateChange::Press(pressed) = change {
                press_animator.borrow_mut().on_press_changed(*pressed);
            }
        });

        let activate_slot = Rc::clone(&on_activate);
        tracker.subscribe(move |change| {
            if let StateChange::Activated(activation) = change {
                // Release the borrow before calling out.
                let callback = activate_slot.borrow().clone();
                if let Some(callback) = callback {
                    callback(activation);
                }
            }
        });

        let node = NodeRef::new();
        let node_callback = Self::node_fan_out(&node, &props);

        let mut control = Self {
            props,
            config,
            tracker,
            animator,
            on_activate,
            node,
            node_callback,
            bag: HandlerBag::new(),
            mounted: true,
        };
        control.bag = control.build_bag();

        tracing::debug!(
            "Control mounted: variant={} size={}",
            control.variant(),
            control.size()
        );
        control
    }

    fn node_fan_out(own: &NodeRef<NodeHandle>, props: &ButtonProps) -> RefCallback<NodeHandle> {
        let targets = std::iter::once(RefTarget::Slot(own.clone()))
            .chain(props.node_refs.iter().cloned());
        merge_refs(targets)
    }

    /// Merge tracker, focus, native attribute and consumer bags, in that order.
    fn build_bag(&self) -> HandlerBag {
        let mut tracker_bag = HandlerBag::new();
        for name in TRACKER_EVENTS {
            let tracker = Rc::downgrade(&self.tracker);
            tracker_bag.add_handler(
                name,
                Rc::new(move |event: &Event| -> std::result::Result<(), HandlerError> {
                    if let Some(tracker) = tracker.upgrade() {
                        tracker.handle(event.kind);
                    }
                    Ok(())
                }),
            );
        }

        let mut focus_bag = HandlerBag::new();
        for name in FOCUS_EVENTS {
            let tracker = Rc::downgrade(&self.tracker);
            focus_bag.add_handler(
                name,
                Rc::new(move |event: &Event| -> std::result::Result<(), HandlerError> {
                    if let Some(tracker) = tracker.upgrade() {
                        tracker.handle(event.kind);
                    }
                    Ok(())
                }),
            );
        }

        let mut native = HandlerBag::new()
            .attr("type", "button")
            .attr("data-variant", self.variant().as_str())
            .attr("data-size", self.size().as_str());
        if self.props.disabled {
            native.set_attribute("disabled", "");
        }
        if self.props.loading {
            native.set_attribute("aria-disabled", "true");
            native.set_attribute("aria-busy", "true");
        }

        merge([&tracker_bag, &focus_bag, &native, &self.props.handlers])
    }

    // ========================================================================
    // Declared props
    // ========================================================================

    pub fn props(&self) -> &ButtonProps {
        &self.props
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }

    pub fn variant(&self) -> Variant {
        self.props.variant.unwrap_or(self.config.defaults.variant)
    }

    pub fn size(&self) -> Size {
        self.props.size.unwrap_or(self.config.defaults.size)
    }

    /// Replace the declared props.
    pub fn set_props(&mut self, props: ButtonProps) {
        if !self.mounted {
            tracing::warn!("set_props on unmounted control ignored");
            return;
        }

        let node = self.node.get();
        self.node_callback.teardown();
        self.node_callback = Self::node_fan_out(&self.node, &props);
        if node.is_some() {
            self.node_callback.set(node.as_ref());
        }

        *self.on_activate.borrow_mut() = props.on_activate.clone();
        self.props = props;
        self.tracker.set_disabled(self.props.disabled);
        self.tracker.set_loading(self.props.loading);
        self.bag = self.build_bag();
    }

    pub fn set_loading(&mut self, loading: bool) {
        let props = ButtonProps {
            loading,
            ..self.props.clone()
        };
        self.set_props(props);
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        let props = ButtonProps {
            disabled,
            ..self.props.clone()
        };
        self.set_props(props);
    }

    /// Loading always blocks activation, independently of `disabled`.
    pub fn is_activatable(&self) -> bool {
        self.mounted && !self.props.disabled && !self.props.loading
    }

    pub fn overlay_visible(&self) -> bool {
        self.props.loading
    }

    // ========================================================================
    // Input and time
    // ========================================================================

    /// Deliver a raw input event through the merged handler bag.
    ///
    /// Handler failures are returned after every handler for the event ran.
    pub fn dispatch(&self, kind: EventKind) -> Result<()> {
        if !self.mounted {
            return Ok(());
        }
        self.bag.dispatch(&Event::new(kind))?;
        Ok(())
    }

    /// Advance the press feedback transition.
    pub fn tick(&self, dt: Duration) -> f32 {
        self.animator.borrow_mut().tick(dt)
    }

    pub fn scale(&self) -> f32 {
        self.animator.borrow().scale()
    }

    pub fn animation_state(&self) -> AnimationState {
        self.animator.borrow().state()
    }

    pub fn state(&self) -> InteractionState {
        self.tracker.state()
    }

    pub fn tracker(&self) -> &TrackerRef {
        &self.tracker
    }

    /// Current style vector, combining props and live interaction state.
    pub fn style_vector(&self) -> StyleVector {
        StyleVector::new(self.variant(), self.size())
            .disabled(self.props.disabled)
            .loading(self.props.loading)
            .with_interaction(self.tracker.state())
    }

    pub fn render(&self) -> Rendered {
        let vector = self.style_vector();
        let rules = resolve_with_extra(&vector, self.props.class_name.iter());

        let overlay = self.props.loading.then(|| LoadingOverlay {
            container: indicator_rules(vector.variant),
            spinner: spinner_rules(),
        });

        Rendered {
            variant: vector.variant,
            size: vector.size,
            rules,
            label: self.props.children.clone(),
            label_rules: label_rules(self.props.loading),
            overlay_visible: overlay.is_some(),
            overlay,
            handlers: self.bag.clone(),
            scale: self.scale(),
            state: vector_state(&vector),
            activatable: self.is_activatable(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Hand the rendered node to every owner.
    pub fn attach_node(&self, node: NodeHandle) {
        if self.mounted {
            self.node_callback.set(Some(&node));
        }
    }

    pub fn node(&self) -> Option<NodeHandle> {
        self.node.get()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Release the transition, detach from input and clear node owners.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;

        self.animator.borrow_mut().cancel();
        self.tracker.detach();
        self.node_callback.teardown();
        *self.on_activate.borrow_mut() = None;
        self.bag = HandlerBag::new();

        tracing::debug!("Control unmounted");
    }
}

impl Drop for Control {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn vector_state(vector: &StyleVector) -> InteractionState {
    InteractionState {
        hovered: vector.hovered,
        pressed: vector.pressed,
        focus_visible: vector.focus_visible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultsConfig;
    use crate::types::{FocusModality, Key, PointerButton};
    use crate::Error;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn counter() -> (Rc<Cell<u32>>, impl Fn(&Activation) + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move |_: &Activation| inner.set(inner.get() + 1))
    }

    fn click(control: &Control) {
        control.dispatch(EventKind::PointerEnter).unwrap();
        control
            .dispatch(EventKind::PointerDown(PointerButton::Primary))
            .unwrap();
        control
            .dispatch(EventKind::PointerUp(PointerButton::Primary))
            .unwrap();
    }

    #[test]
    fn test_click_activates_once() {
        let (count, on_activate) = counter();
        let control = Control::new(ButtonProps::new("Primary").on_activate(on_activate));

        click(&control);

        assert_eq!(count.get(), 1);
        assert_eq!(
            control.state(),
            InteractionState {
                hovered: true,
                pressed: false,
                focus_visible: false,
            }
        );
    }

    #[test]
    fn test_press_drives_scale() {
        let control = Control::new(ButtonProps::new("Primary"));
        control
            .dispatch(EventKind::PointerDown(PointerButton::Primary))
            .unwrap();

        assert!(control.animation_state().transition.is_some());
        control.tick(Duration::from_millis(100));
        assert_relative_eq!(control.scale(), 0.98);

        control
            .dispatch(EventKind::PointerUp(PointerButton::Primary))
            .unwrap();
        control.tick(Duration::from_millis(150));
        assert_relative_eq!(control.scale(), 1.0);
    }

    #[test]
    fn test_loading_shows_overlay_and_blocks_activation() {
        let (count, on_activate) = counter();
        let control = Control::new(
            ButtonProps::new("Save")
                .loading(true)
                .on_activate(on_activate),
        );

        click(&control);
        let rendered = control.render();

        assert_eq!(count.get(), 0);
        assert!(rendered.overlay_visible);
        assert!(!rendered.activatable);
        assert_eq!(rendered.label, "Save");
        assert!(rendered.label_rules.contains("opacity-0"));
        assert!(rendered.rules.contains("bg-indigo-500"));
        assert!(!rendered.rules.contains("disabled:bg-indigo-500/50"));
        assert_eq!(rendered.handlers.attribute("aria-busy"), Some("true"));
        assert_eq!(rendered.handlers.attribute("disabled"), None);

        let overlay = rendered.overlay.unwrap();
        assert!(overlay.container.contains("border-white"));
        assert!(overlay.spinner.contains("animate-spin"));
    }

    #[test]
    fn test_disabled_is_visually_distinct_from_loading() {
        let control = Control::new(
            ButtonProps::new("Delete")
                .variant(Variant::Destructive)
                .disabled(true),
        );
        let rendered = control.render();

        assert!(!rendered.overlay_visible);
        assert!(rendered.overlay.is_none());
        assert!(!rendered.activatable);
        assert!(rendered.rules.contains("disabled:bg-red-500/50"));
        assert!(rendered.label_rules.contains("opacity-100"));
        assert_eq!(rendered.handlers.attribute("disabled"), Some(""));
    }

    #[test]
    fn test_focus_ring_follows_modality() {
        let control = Control::new(ButtonProps::new("Primary"));

        control
            .dispatch(EventKind::Focus(FocusModality::Keyboard))
            .unwrap();
        assert!(control.render().rules.contains("ring-2"));

        control
            .dispatch(EventKind::Focus(FocusModality::Pointer))
            .unwrap();
        assert!(!control.render().rules.contains("ring-2"));
    }

    #[test]
    fn test_keyboard_activation() {
        let (count, on_activate) = counter();
        let control = Control::new(ButtonProps::new("Go").on_activate(on_activate));

        control
            .dispatch(EventKind::Focus(FocusModality::Keyboard))
            .unwrap();
        control.dispatch(EventKind::KeyDown(Key::Enter)).unwrap();
        assert!(control.render().rules.contains("shadow-none"));
        control.dispatch(EventKind::KeyUp(Key::Enter)).unwrap();

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_consumer_handlers_run_after_tracker() {
        let observed = Rc::new(Cell::new(None));
        let slot = Rc::new(RefCell::new(None::<TrackerRef>));
        let sink = Rc::clone(&observed);
        let tracker_slot = Rc::clone(&slot);

        let handlers = HandlerBag::new().on("pointerdown", move |_| {
            let pressed = tracker_slot
                .borrow()
                .as_ref()
                .map(|t: &TrackerRef| t.state().pressed);
            sink.set(pressed);
            Ok(())
        });
        let button = Control::new(ButtonProps::new("x").handlers(handlers));
        *slot.borrow_mut() = Some(Rc::clone(button.tracker()));

        button
            .dispatch(EventKind::PointerDown(PointerButton::Primary))
            .unwrap();
        assert_eq!(observed.get(), Some(true));
    }

    #[test]
    fn test_consumer_attributes_win() {
        let handlers = HandlerBag::new().attr("type", "submit").attr("id", "save");
        let control = Control::new(ButtonProps::new("Save").handlers(handlers));
        let rendered = control.render();

        assert_eq!(rendered.handlers.attribute("type"), Some("submit"));
        assert_eq!(rendered.handlers.attribute("id"), Some("save"));
        assert_eq!(rendered.handlers.attribute("data-variant"), Some("primary"));
    }

    #[test]
    fn test_handler_error_propagates_after_state_update() {
        let handlers =
            HandlerBag::new().on("pointerenter", |e| Err(HandlerError::new(e.name(), "nope")));
        let control = Control::new(ButtonProps::new("x").handlers(handlers));

        let err = control.dispatch(EventKind::PointerEnter).unwrap_err();
        assert!(matches!(err, Error::Handler { ref message, .. } if message == "nope"));
        assert!(control.state().hovered);
    }

    #[test]
    fn test_class_name_appended() {
        let control = Control::new(ButtonProps::new("x").class_name("justify-self-center"));
        let rules = control.render().rules;
        assert_eq!(rules.position("justify-self-center"), Some(rules.len() - 1));
    }

    #[test]
    fn test_config_defaults_apply() {
        let config = ButtonConfig {
            defaults: DefaultsConfig {
                variant: Variant::Ghost,
                size: Size::Large,
            },
            ..Default::default()
        };
        let control = Control::with_config(ButtonProps::new("x"), config);
        let rendered = control.render();

        assert_eq!(rendered.variant, Variant::Ghost);
        assert!(rendered.rules.contains("text-lg"));

        let explicit = Control::with_config(ButtonProps::new("x").size(Size::Small), config);
        assert_eq!(explicit.size(), Size::Small);
    }

    #[test]
    fn test_set_loading_mid_press_cancels() {
        let (count, on_activate) = counter();
        let mut control = Control::new(ButtonProps::new("x").on_activate(on_activate));

        control
            .dispatch(EventKind::PointerDown(PointerButton::Primary))
            .unwrap();
        control.set_loading(true);
        assert!(!control.state().pressed);
        assert_relative_eq!(control.animation_state().target, 1.0);

        control.set_loading(false);
        control
            .dispatch(EventKind::PointerUp(PointerButton::Primary))
            .unwrap();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_node_refs_fan_out_and_unmount() {
        let consumer: NodeRef<NodeHandle> = NodeRef::new();
        let (count, on_activate) = counter();
        let fired = Rc::new(Cell::new(0));
        let fired_inner = Rc::clone(&fired);
        let handlers = HandlerBag::new().on("pointerenter", move |_| {
            fired_inner.set(fired_inner.get() + 1);
            Ok(())
        });

        let mut control = Control::new(
            ButtonProps::new("x")
                .node_ref(consumer.clone())
                .handlers(handlers)
                .on_activate(on_activate),
        );
        control.attach_node(NodeHandle(42));
        assert_eq!(control.node(), Some(NodeHandle(42)));
        assert_eq!(consumer.get(), Some(NodeHandle(42)));

        control
            .dispatch(EventKind::PointerDown(PointerButton::Primary))
            .unwrap();
        control.unmount();

        assert!(!control.is_mounted());
        assert_eq!(consumer.get(), None);
        assert_eq!(control.tracker().subscriber_count(), 0);
        assert!(control.animation_state().transition.is_none());

        click(&control);
        assert_eq!(fired.get(), 0);
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_set_props_keeps_node() {
        let first: NodeRef<NodeHandle> = NodeRef::new();
        let second: NodeRef<NodeHandle> = NodeRef::new();
        let mut control = Control::new(ButtonProps::new("x").node_ref(first.clone()));
        control.attach_node(NodeHandle(7));

        control.set_props(ButtonProps::new("y").node_ref(second.clone()));

        assert_eq!(first.get(), None);
        assert_eq!(second.get(), Some(NodeHandle(7)));
        assert_eq!(control.node(), Some(NodeHandle(7)));
        assert_eq!(control.render().label, "y");
    }

    #[test]
    fn test_activation_callback_may_read_tracker() {
        let seen = Rc::new(Cell::new(false));
        let slot: Rc<RefCell<Option<TrackerRef>>> = Rc::new(RefCell::new(None));
        let slot_inner = Rc::clone(&slot);
        let seen_inner = Rc::clone(&seen);

        let control = Control::new(ButtonProps::new("x").on_activate(move |_| {
            if let Some(tracker) = slot_inner.borrow().as_ref() {
                seen_inner.set(!tracker.state().pressed);
            }
        }));
        *slot.borrow_mut() = Some(Rc::clone(control.tracker()));

        click(&control);
        assert!(seen.get());
    }
}
