//! Touch Tracker: the per-gesture state machine. Consumes the raw touch
//! stream, decides whether a gesture qualifies as a tap and, on
//! acceptance, focuses or synthesizes a click at the resolved target.

use log::{debug, trace};

use crate::dom::{Disposition, DomView, SyntheticKind, TouchEvent, TouchPoint};
use crate::engine::Engine;
use crate::resolve::{
    self, ElementKind, classify, effective_target, find_control, needs_focus, needs_native_click,
};

/// Best guess for how long a touch must be held before the platform will
/// deliver focus natively anyway.
const NATIVE_FOCUS_THRESHOLD_MS: f64 = 100.0;

impl<D: DomView> Engine<D> {
    /// Touch-start: begin evaluating a tap, record position and scroll
    /// offsets.
    pub fn on_touch_start(&mut self, event: &TouchEvent<D::Node>) -> Disposition {
        // A second simultaneous touch point means pinch-to-zoom, never a
        // tap; it also voids whatever gesture was in flight.
        if event.touches > 1 {
            self.state.tracking = false;
            self.state.target = None;
            return Disposition::allow();
        }

        let target = effective_target(&self.dom, &event.target);

        if self.profile.ios {
            // Only trusted events deselect text on iOS; while a selection is
            // active the native behavior is preserved.
            if self.dom.has_selection() {
                return Disposition::allow();
            }

            if !self.profile.ios4 {
                // After a dialog opened from a click callback, iOS replays
                // touch events carrying the identifier of the touch that
                // triggered the dialog. Identifier 0 is exempt: emulated
                // touch environments report 0 for every touch.
                if event.touch.id != 0 && event.touch.id == self.state.last_touch_id {
                    debug!("swallowing replayed touch id {}", event.touch.id);
                    return Disposition::prevent();
                }
                self.state.last_touch_id = event.touch.id;

                // Snapshot the scroll ancestor so touch-end can tell a tap
                // from a fling-stop.
                self.scroll_parents.snapshot(&self.dom, &target);
            }
        }

        self.state.tracking = true;
        self.state.track_start = event.timestamp;
        self.state.target = Some(target);
        self.state.touch_start_x = event.touch.page_x;
        self.state.touch_start_y = event.touch.page_y;
        trace!("tracking tap at ({}, {})", event.touch.page_x, event.touch.page_y);

        // A touch-start hot on the heels of an accepted tap is the start of
        // a ghost double-tap; kill its default action but keep tracking.
        if event.timestamp - self.state.last_click_time < self.opts.tap_delay {
            Disposition::prevent()
        } else {
            Disposition::allow()
        }
    }

    /// Touch-move: abandon tracking once the touch drifts off the target or
    /// past the boundary.
    pub fn on_touch_move(&mut self, event: &TouchEvent<D::Node>) -> Disposition {
        if !self.state.tracking {
            return Disposition::allow();
        }

        let same_target = self
            .state
            .target
            .as_ref()
            .is_some_and(|t| *t == effective_target(&self.dom, &event.target));
        if !same_target || self.touch_has_moved(&event.touch) {
            trace!("tap rejected: drift or target change");
            self.state.tracking = false;
            self.state.target = None;
        }

        Disposition::allow()
    }

    /// Touch-end: decide whether the gesture is an accepted tap and, if so,
    /// synthesize the click at once.
    pub fn on_touch_end(&mut self, event: &TouchEvent<D::Node>) -> Disposition {
        if !self.state.tracking {
            return Disposition::allow();
        }

        // Second tap of a fast double-tap: no synthetic click, and the
        // native mouse events that follow are swallowed wholesale.
        if event.timestamp - self.state.last_click_time < self.opts.tap_delay {
            debug!("tap rejected: double-tap window");
            self.state.cancel_next = true;
            return Disposition::allow();
        }

        // Too slow; the platform's own slow-tap behavior takes over.
        if event.timestamp - self.state.track_start > self.opts.tap_timeout {
            debug!("tap rejected: timeout");
            return Disposition::allow();
        }

        // Reset here, not on the click, so a tap on an input straight after
        // a suppressed double-tap is not cancelled by mistake.
        self.state.cancel_next = false;

        self.state.last_click_time = event.timestamp;

        let track_start = self.state.track_start;
        self.state.tracking = false;
        self.state.track_start = 0.0;

        let Some(mut target) = self.state.target.clone() else {
            return Disposition::allow();
        };

        // iOS 6-7 report a stale target while the layer is transitioning or
        // scrolling; re-derive it from the end coordinates and carry the
        // cached scroll parent over.
        if self.profile.ios_with_bad_target {
            if let Some(hit) = self
                .dom
                .element_at_point(event.touch.client_x, event.touch.client_y)
            {
                self.scroll_parents.adopt(&target, &hit);
                target = hit;
            }
        }

        let facts = self.dom.facts(&target);
        match classify(&facts) {
            ElementKind::Label => {
                if let Some(control) = find_control(&self.dom, &target) {
                    self.focus_element(&control);
                    if self.profile.android {
                        // Native label-click semantics already do the right
                        // thing on Android.
                        return Disposition::allow();
                    }
                    target = control;
                }
            }
            _ if needs_focus(&self.profile, &facts) => {
                // If the touch was held long enough the platform will focus
                // the element natively; step aside. Same when embedded in a
                // sub-frame with a text input, where simulated focus leaves
                // typed text invisible.
                let elapsed = event.timestamp - track_start;
                let framed_input = self.profile.ios
                    && self.dom.in_subframe()
                    && matches!(classify(&facts), ElementKind::Input(_));
                if elapsed > NATIVE_FOCUS_THRESHOLD_MS || framed_input {
                    self.state.target = None;
                    return Disposition::allow();
                }

                self.focus_element(&target);
                self.send_click(&target, &event.touch);

                // Selects on iOS need the native event through or the picker
                // menu never opens.
                if !(self.profile.ios && classify(&facts) == ElementKind::Select) {
                    self.state.target = None;
                    return Disposition::prevent();
                }
                return Disposition::allow();
            }
            _ => {}
        }

        if self.profile.ios && !self.profile.ios4 {
            // The tap is being used to arrest a fling scroll, not to
            // activate the element under the finger.
            if self.scroll_parents.moved_since_snapshot(&self.dom, &target) {
                debug!("tap rejected: scroll parent moved (fling-stop)");
                return Disposition::allow();
            }
        }

        let facts = self.dom.facts(&target);
        if !needs_native_click(&self.profile, &facts) {
            self.send_click(&target, &event.touch);
            return Disposition::prevent();
        }

        Disposition::allow()
    }

    /// Touch-cancel: the gesture is void, nothing is synthesized.
    pub fn on_touch_cancel(&mut self) -> Disposition {
        trace!("tap cancelled");
        self.state.tracking = false;
        self.state.track_start = 0.0;
        self.state.target = None;
        Disposition::allow()
    }

    fn touch_has_moved(&self, touch: &TouchPoint) -> bool {
        (touch.page_x - self.state.touch_start_x).abs() > self.opts.touch_boundary
            || (touch.page_y - self.state.touch_start_y).abs() > self.opts.touch_boundary
    }

    /// Build and dispatch the synthetic click replacing the delayed native
    /// one.
    fn send_click(&mut self, target: &D::Node, touch: &TouchPoint) {
        // A stale focus owner swallows synthetic clicks on some Android
        // builds; blur it first.
        self.dom.blur_active_except(target);

        // Android select boxes do not open from a synthetic click.
        let kind = if self.profile.android
            && classify(&self.dom.facts(target)) == ElementKind::Select
        {
            SyntheticKind::MouseDown
        } else {
            SyntheticKind::Click
        };
        debug!("synthesizing {kind:?}");
        self.dom.dispatch_synthetic(target, kind, touch);
    }

    /// Focus simulation. On iOS, elements with a repositionable selection
    /// get the caret moved to the end of their value instead of a plain
    /// focus call; date/time/month inputs throw on selection access and
    /// fall back to the default.
    fn focus_element(&self, target: &D::Node) {
        let facts = self.dom.facts(target);
        let selection_hostile = matches!(
            classify(&facts),
            ElementKind::Input(
                resolve::InputKind::DateLike | resolve::InputKind::Time | resolve::InputKind::Month
            )
        );
        if self.profile.ios && facts.can_set_selection && !selection_hostile {
            self.dom.set_selection_to_end(target);
        } else {
            self.dom.focus(target);
        }
    }
}
