//! The engine proper: per-surface gesture state shared by the touch
//! tracker and the click gatekeeper.

use serde::{Deserialize, Serialize};

use crate::dom::DomView;
use crate::platform::PlatformProfile;
use crate::resolve::ScrollParents;

/// Tuning knobs for a listening surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Touch drift beyond which tracking is abandoned, in pixels per axis.
    pub touch_boundary: f64,
    /// Window after an accepted tap in which a second tap is treated as a
    /// double-tap and suppressed, in milliseconds.
    pub tap_delay: f64,
    /// Maximum duration of a tap, in milliseconds; slower touches fall
    /// back to native handling.
    pub tap_timeout: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            touch_boundary: 10.0,
            tap_delay: 200.0,
            tap_timeout: 700.0,
        }
    }
}

/// State of the in-flight gesture. One instance per attached surface; at
/// most one gesture is evaluated at a time.
pub(crate) struct GestureState<N> {
    /// Whether a touch-originated tap is currently being evaluated.
    pub tracking: bool,
    /// Timestamp of the touch-start that opened the current gesture.
    pub track_start: f64,
    /// Resolved candidate element for the in-flight tap. Owned by the
    /// tracker; the gatekeeper only reads it. `tracking` implies `Some`.
    pub target: Option<N>,
    /// Page coordinates at touch-start, for drift measurement.
    pub touch_start_x: f64,
    pub touch_start_y: f64,
    /// Identifier of the most recently processed touch point. iOS replays
    /// stale touches with a repeated identifier after modal dialogs.
    pub last_touch_id: u64,
    /// Timestamp of the last accepted tap.
    pub last_click_time: f64,
    /// Swallow the next native mouse event regardless of target; set when
    /// a double-tap collision is detected.
    pub cancel_next: bool,
}

impl<N> Default for GestureState<N> {
    fn default() -> Self {
        Self {
            tracking: false,
            track_start: 0.0,
            target: None,
            touch_start_x: 0.0,
            touch_start_y: 0.0,
            last_touch_id: 0,
            last_click_time: 0.0,
            cancel_next: false,
        }
    }
}

/// Touch-to-click disambiguation engine for one surface.
///
/// Feed it the raw touch stream and the mouse-family events the platform
/// fires afterwards; each handler returns a [`crate::dom::Disposition`]
/// describing what to do with the event. The engine dispatches synthetic
/// clicks through its [`DomView`] by itself.
pub struct Engine<D: DomView> {
    pub(crate) dom: D,
    pub(crate) profile: PlatformProfile,
    pub(crate) opts: Options,
    pub(crate) state: GestureState<D::Node>,
    pub(crate) scroll_parents: ScrollParents<D::Node>,
}

impl<D: DomView> Engine<D> {
    pub fn new(dom: D, profile: PlatformProfile, opts: Options) -> Self {
        Self {
            dom,
            profile,
            opts,
            state: GestureState::default(),
            scroll_parents: ScrollParents::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }
}
