//! Click Gatekeeper: once a synthetic click has been (or is about to be)
//! emitted, the platform's own delayed mouse/click events for the same
//! gesture are ghosts and must not reach application code.

use log::debug;

use crate::dom::{Disposition, DomView, MouseEvent};
use crate::engine::Engine;
use crate::resolve::{is_submit_control, needs_native_click};

impl<D: DomView> Engine<D> {
    /// Decide the fate of a native mouse-family event (`mouseover`,
    /// `mousedown`, `mouseup`).
    pub fn on_mouse(&mut self, event: &MouseEvent<D::Node>) -> Disposition {
        // No candidate target means no gesture ran; nothing to suppress.
        let Some(candidate) = self.state.target.clone() else {
            return Disposition::allow();
        };

        // The engine's own synthesis must not be re-intercepted.
        if event.synthesized {
            return Disposition::allow();
        }

        // Non-cancelable events were dispatched programmatically by
        // unrelated code and are none of our business.
        if !event.cancelable {
            return Disposition::allow();
        }

        let facts = self.dom.facts(&candidate);
        if !needs_native_click(&self.profile, &facts) || self.state.cancel_next {
            debug!("swallowing ghost mouse event");
            return Disposition::swallow();
        }

        Disposition::allow()
    }

    /// Decide the fate of a native `click`: a touch-generated click we must
    /// cancel, a click from another library, or a genuine one to let pass.
    pub fn on_click(&mut self, event: &MouseEvent<D::Node>) -> Disposition {
        // Another fast-click library got its click out first. Stand down:
        // no synthetic click will be produced for this gesture anymore.
        if self.state.tracking {
            debug!("foreign click during tracking; standing down");
            self.state.target = None;
            self.state.tracking = false;
            return Disposition::allow();
        }

        // Keyboard-submit quirk: hitting enter on the on-screen keyboard
        // fires a click at the submit control with a zero detail count.
        if is_submit_control(&self.dom.facts(&event.target)) && event.detail == 0 {
            return Disposition::allow();
        }

        let disposition = self.on_mouse(event);

        // Clear the candidate only when the click was denied, so follow-up
        // mouse events still find no candidate and pass through.
        if !disposition.allowed() {
            self.state.target = None;
        }

        disposition
    }
}
