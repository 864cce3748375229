//! Press feedback animation.
//!
//! A [`GestureAnimator`] drives one scalar scale value toward the pressed or
//! neutral scale. Time only advances when the host calls [`GestureAnimator::tick`]
//! from its rendering loop. At most one transition is in flight; starting a
//! new one cancels the previous one where it stands.

use crate::config::AnimationConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scale of a control at rest.
pub const NEUTRAL_SCALE: f32 = 1.0;

/// Easing curve applied to transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    #[default]
    EaseOut,
}

impl Easing {
    /// Map linear progress in `[0, 1]` onto the curve.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            // Cubic ease-out
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Identifier of a transition, unique per animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionId(u64);

#[derive(Debug, Clone)]
struct Transition {
    id: TransitionId,
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
}

/// Snapshot of an animator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    /// Current scale value
    pub scale: f32,
    /// Scale the animator is heading toward
    pub target: f32,
    /// In-flight transition, if any
    pub transition: Option<TransitionId>,
}

/// Drives the pressed-scale transition for one control.
#[derive(Debug, Clone)]
pub struct GestureAnimator {
    config: AnimationConfig,
    scale: f32,
    target: f32,
    transition: Option<Transition>,
    next_id: u64,
    cancelled: u64,
}

impl Default for GestureAnimator {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl GestureAnimator {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            scale: NEUTRAL_SCALE,
            target: NEUTRAL_SCALE,
            transition: None,
            next_id: 0,
            cancelled: 0,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Current scale value for the press feedback transform.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn active_transition(&self) -> Option<TransitionId> {
        self.transition.as_ref().map(|t| t.id)
    }

    /// Number of transitions cancelled before they completed.
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }

    pub fn state(&self) -> AnimationState {
        AnimationState {
            scale: self.scale,
            target: self.target,
            transition: self.active_transition(),
        }
    }

    /// React to a press-state transition.
    ///
    /// Press start heads for the pressed scale over the press duration;
    /// press end returns to neutral over the (longer) release duration.
    pub fn on_press_changed(&mut self, pressed: bool) -> TransitionId {
        let (to, duration_ms) = if pressed {
            (self.config.pressed_scale, self.config.press_duration_ms)
        } else {
            (NEUTRAL_SCALE, self.config.release_duration_ms)
        };
        self.start(to, Duration::from_millis(duration_ms))
    }

    fn start(&mut self, to: f32, duration: Duration) -> TransitionId {
        self.cancel();

        let id = TransitionId(self.next_id);
        self.next_id += 1;
        self.target = to;

        if duration.is_zero() {
            self.scale = to;
            tracing::trace!("Transition {:?} completed immediately at {}", id, to);
            return id;
        }

        self.transition = Some(Transition {
            id,
            from: self.scale,
            to,
            duration,
            elapsed: Duration::ZERO,
        });
        tracing::trace!("Transition {:?} started: {} -> {} over {:?}", id, self.scale, to, duration);
        id
    }

    /// Stop the in-flight transition, leaving the scale where it is.
    pub fn cancel(&mut self) {
        if let Some(transition) = self.transition.take() {
            self.cancelled += 1;
            tracing::trace!("Transition {:?} cancelled at {}", transition.id, self.scale);
        }
    }

    /// Advance the in-flight transition and return the new scale.
    pub fn tick(&mut self, dt: Duration) -> f32 {
        let Some(transition) = self.transition.as_mut() else {
            return self.scale;
        };

        transition.elapsed = transition.elapsed.saturating_add(dt);
        let progress = transition.elapsed.as_secs_f32() / transition.duration.as_secs_f32();

        if progress >= 1.0 {
            self.scale = transition.to;
            self.transition = None;
        } else {
            let eased = self.config.easing.apply(progress);
            self.scale = transition.from + (transition.to - transition.from) * eased;
        }

        self.scale
    }

    /// Drop any transition and snap back to neutral.
    pub fn reset(&mut self) {
        self.cancel();
        self.scale = NEUTRAL_SCALE;
        self.target = NEUTRAL_SCALE;
    }
}
