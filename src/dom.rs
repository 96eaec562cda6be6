//! The generic event-capable surface the engine runs against.
//!
//! The engine never touches a real DOM directly: everything it needs from
//! the host (element facts, geometry, focus, synthetic dispatch) goes
//! through [`DomView`]. Input events arrive as plain data and every handler
//! answers with a [`Disposition`] that the adapter applies to the real
//! event. That keeps the whole state machine runnable (and testable)
//! without a browser.

/// What the engine needs to know about a single element, gathered once per
/// lookup. `tag` and `input_type` are lowercase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementFacts {
    pub tag: String,
    pub input_type: Option<String>,
    pub disabled: bool,
    pub read_only: bool,
    /// Element carries the `needsclick` class token.
    pub needs_click_marker: bool,
    /// Element carries the `needsfocus` class token.
    pub needs_focus_marker: bool,
    /// The element's value selection range can be repositioned.
    pub can_set_selection: bool,
}

/// The kind of event the engine synthesizes in place of the delayed
/// native click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyntheticKind {
    Click,
    /// Android select boxes ignore synthetic clicks; a mousedown opens the
    /// picker instead.
    MouseDown,
}

/// Coordinates of the touch point a synthetic event is built from.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub page_x: f64,
    pub page_y: f64,
    pub screen_x: f64,
    pub screen_y: f64,
    pub client_x: f64,
    pub client_y: f64,
}

/// One touch-family event, already unpacked by the adapter. For start and
/// move events `touch` is the first target touch; for end events it is the
/// terminating (changed) touch.
#[derive(Clone, Debug)]
pub struct TouchEvent<N> {
    pub target: N,
    pub touch: TouchPoint,
    /// Number of simultaneously active touch points.
    pub touches: u32,
    /// Event timestamp in milliseconds.
    pub timestamp: f64,
}

/// One mouse-family event (`mouseover`, `mousedown`, `mouseup`, `click`).
#[derive(Clone, Debug)]
pub struct MouseEvent<N> {
    pub target: N,
    pub timestamp: f64,
    /// Non-cancelable events were dispatched programmatically by unrelated
    /// code and are always let through.
    pub cancelable: bool,
    /// The adapter recognized the engine's own tag on the event.
    pub synthesized: bool,
    /// DOM `detail` field; zero for keyboard-originated submit clicks.
    pub detail: i32,
}

/// What the adapter should do with the event just handled. The engine only
/// states intent; applying it (preventDefault, stopPropagation,
/// stopImmediatePropagation or a legacy side-channel flag) is adapter
/// business.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Disposition {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    /// Stop delivery to remaining listeners on the same element.
    pub stop_immediate: bool,
}

impl Disposition {
    /// Let the event run its natural course.
    pub fn allow() -> Self {
        Self::default()
    }

    /// Cancel the default action but let the event keep bubbling.
    pub fn prevent() -> Self {
        Self {
            prevent_default: true,
            ..Self::default()
        }
    }

    /// Fully discard the event: no default action, no further delivery.
    pub fn swallow() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: true,
            stop_immediate: true,
        }
    }

    pub fn allowed(&self) -> bool {
        !self.prevent_default && !self.stop_propagation
    }
}

/// Read/act surface over a DOM-like tree.
///
/// `Node` is a cheap handle with identity semantics: two handles compare
/// equal exactly when they refer to the same element.
pub trait DomView {
    type Node: Clone + PartialEq;

    fn is_text_node(&self, node: &Self::Node) -> bool;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;
    fn facts(&self, node: &Self::Node) -> ElementFacts;

    // Geometry and scroll metrics, used for scroll-parent discovery and
    // fling-stop detection.
    fn scroll_height(&self, node: &Self::Node) -> f64;
    fn offset_height(&self, node: &Self::Node) -> f64;
    fn scroll_top(&self, node: &Self::Node) -> f64;

    /// Is there a non-collapsed text selection right now?
    fn has_selection(&self) -> bool;
    /// Is the surface embedded as a sub-frame of another document?
    fn in_subframe(&self) -> bool;
    /// Hit test at viewport coordinates.
    fn element_at_point(&self, client_x: f64, client_y: f64) -> Option<Self::Node>;

    // Label-to-control resolution primitives, tried in this order by the
    // resolver: explicit control reference, for-id reference, first
    // labellable descendant.
    fn explicit_control(&self, label: &Self::Node) -> Option<Self::Node>;
    fn for_target(&self, label: &Self::Node) -> Option<Self::Node>;
    fn first_labellable_descendant(&self, label: &Self::Node) -> Option<Self::Node>;

    fn focus(&self, node: &Self::Node);
    /// Move the element's selection to the end of its current value.
    fn set_selection_to_end(&self, node: &Self::Node);
    /// Blur whatever currently holds focus, unless it is `node`.
    fn blur_active_except(&self, node: &Self::Node);

    /// Build and dispatch a synthetic event directly at `node`, tagged so
    /// the adapter can recognize it as engine output when it comes back
    /// around.
    fn dispatch_synthetic(&self, node: &Self::Node, kind: SyntheticKind, touch: &TouchPoint);
}
