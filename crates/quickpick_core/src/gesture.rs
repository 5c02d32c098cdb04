//! Drag and tap interpretation for the displayed card.
//!
//! The classifier is pure: callers feed it pointer samples and timestamps and
//! get back one [`Decision`] per completed gesture.

use chrono::{DateTime, Utc};

/// Outcome of one completed gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
    /// Flip the card to show its detail side. Never votes.
    Inspect,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Minimum horizontal release distance in pixels, independent of speed.
    pub swipe_threshold: f32,
    /// Minimum horizontal release speed in pixels per second, independent of distance.
    pub velocity_threshold: f32,
    pub double_tap_window_ms: i64,
    /// Fraction of the card width, from the left edge, that rejects on double tap.
    pub reject_zone: f32,
    /// Fraction of the card width, from the left edge, where the approve zone starts.
    pub approve_zone: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 80.0,
            velocity_threshold: 500.0,
            double_tap_window_ms: 300,
            reject_zone: 0.3,
            approve_zone: 0.7,
        }
    }
}

impl GestureConfig {
    /// Classifies a drag release. Either distance or speed alone is enough.
    pub fn classify_release(&self, dx: f32, velocity: f32) -> Decision {
        if dx > self.swipe_threshold || velocity > self.velocity_threshold {
            Decision::Approve
        } else if dx < -self.swipe_threshold || velocity < -self.velocity_threshold {
            Decision::Reject
        } else {
            Decision::None
        }
    }

    /// Maps a horizontal tap position (0.0 = left edge, 1.0 = right edge) to its zone.
    /// A non-finite position lands in no zone.
    pub fn classify_zone(&self, x: f32) -> Decision {
        if !x.is_finite() {
            return Decision::None;
        }
        let x = x.clamp(0.0, 1.0);
        if x < self.reject_zone {
            Decision::Reject
        } else if x >= self.approve_zone {
            Decision::Approve
        } else {
            Decision::Inspect
        }
    }
}

/// Per-card pointer state. Reset whenever the displayed card changes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GestureState {
    drag_offset: f32,
    dragging: bool,
    last_tap: Option<DateTime<Utc>>,
    flipped: bool,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_offset(&self) -> f32 {
        self.drag_offset
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn drag_started(&mut self) {
        self.dragging = true;
        self.drag_offset = 0.0;
        self.last_tap = None;
    }

    pub fn drag_moved(&mut self, dx: f32) {
        if self.dragging {
            self.drag_offset = dx;
        }
    }

    /// Ends a drag. A release that does not vote springs the card back to neutral.
    pub fn drag_released(&mut self, config: &GestureConfig, dx: f32, velocity: f32) -> Decision {
        self.dragging = false;
        let decision = config.classify_release(dx, velocity);
        if decision == Decision::None {
            self.drag_offset = 0.0;
        } else {
            self.drag_offset = dx;
        }
        decision
    }

    /// Registers a tap. The second tap inside the window resolves by its own zone.
    pub fn tapped(&mut self, config: &GestureConfig, x: f32, at: DateTime<Utc>) -> Decision {
        let is_second = self.last_tap.is_some_and(|first| {
            let elapsed = (at - first).num_milliseconds();
            (0..=config.double_tap_window_ms).contains(&elapsed)
        });

        if !is_second {
            self.last_tap = Some(at);
            return Decision::None;
        }

        self.last_tap = None;
        let decision = config.classify_zone(x);
        if decision == Decision::Inspect {
            self.flipped = !self.flipped;
        }
        decision
    }
}
