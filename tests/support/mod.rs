//! In-memory DOM stand-in for driving the engine without a browser.
//!
//! Nodes are indices into a flat arena; the fixture records focus calls,
//! blurs and synthetic dispatches so tests can assert on exactly what the
//! engine did.

use std::cell::{Cell, RefCell};

use quicktap::dom::{DomView, ElementFacts, SyntheticKind, TouchPoint};
use quicktap::{MouseEvent, TouchEvent};

pub struct MockNode {
    pub facts: ElementFacts,
    pub parent: Option<usize>,
    pub text: bool,
    pub scroll_height: f64,
    pub offset_height: f64,
    pub scroll_top: Cell<f64>,
    /// Explicit label control reference.
    pub control: Option<usize>,
    /// Control referenced by the label's `for` attribute.
    pub for_target: Option<usize>,
    pub labellable_descendant: Option<usize>,
}

impl MockNode {
    fn plain(tag: &str, parent: Option<usize>) -> Self {
        Self {
            facts: ElementFacts {
                tag: tag.into(),
                ..ElementFacts::default()
            },
            parent,
            text: false,
            scroll_height: 0.0,
            offset_height: 0.0,
            scroll_top: Cell::new(0.0),
            control: None,
            for_target: None,
            labellable_descendant: None,
        }
    }
}

#[derive(Default)]
pub struct MockDom {
    nodes: RefCell<Vec<MockNode>>,
    pub clicks: RefCell<Vec<(usize, SyntheticKind, TouchPoint)>>,
    pub focused: RefCell<Vec<usize>>,
    pub selection_moved: RefCell<Vec<usize>>,
    pub blurred: RefCell<Vec<usize>>,
    active: Cell<Option<usize>>,
    pub selection_active: Cell<bool>,
    pub subframe: Cell<bool>,
    pub hit_test_result: Cell<Option<usize>>,
}

impl MockDom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, tag: &str, parent: Option<usize>) -> usize {
        self.push(MockNode::plain(tag, parent))
    }

    pub fn input(&self, input_type: &str, parent: Option<usize>) -> usize {
        let mut node = MockNode::plain("input", parent);
        node.facts.input_type = Some(input_type.into());
        node.facts.can_set_selection = matches!(
            input_type,
            "text" | "search" | "date" | "datetime-local" | "time" | "month"
        );
        self.push(node)
    }

    pub fn text_node(&self, parent: usize) -> usize {
        let mut node = MockNode::plain("#text", Some(parent));
        node.text = true;
        self.push(node)
    }

    pub fn scrollable(&self, parent: Option<usize>) -> usize {
        let mut node = MockNode::plain("div", parent);
        node.scroll_height = 400.0;
        node.offset_height = 200.0;
        self.push(node)
    }

    pub fn push(&self, node: MockNode) -> usize {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(node);
        nodes.len() - 1
    }

    pub fn with_node<R>(&self, id: usize, f: impl FnOnce(&mut MockNode) -> R) -> R {
        f(&mut self.nodes.borrow_mut()[id])
    }

    pub fn set_scroll_top(&self, id: usize, top: f64) {
        self.nodes.borrow()[id].scroll_top.set(top);
    }

    pub fn reparent(&self, id: usize, new_parent: Option<usize>) {
        self.nodes.borrow_mut()[id].parent = new_parent;
    }

    pub fn click_targets(&self) -> Vec<(usize, SyntheticKind)> {
        self.clicks
            .borrow()
            .iter()
            .map(|(n, k, _)| (*n, *k))
            .collect()
    }
}

impl DomView for MockDom {
    type Node = usize;

    fn is_text_node(&self, node: &usize) -> bool {
        self.nodes.borrow()[*node].text
    }

    fn parent(&self, node: &usize) -> Option<usize> {
        self.nodes.borrow()[*node].parent
    }

    fn contains(&self, ancestor: &usize, node: &usize) -> bool {
        let nodes = self.nodes.borrow();
        let mut current = Some(*node);
        while let Some(id) = current {
            if id == *ancestor {
                return true;
            }
            current = nodes[id].parent;
        }
        false
    }

    fn facts(&self, node: &usize) -> ElementFacts {
        self.nodes.borrow()[*node].facts.clone()
    }

    fn scroll_height(&self, node: &usize) -> f64 {
        self.nodes.borrow()[*node].scroll_height
    }

    fn offset_height(&self, node: &usize) -> f64 {
        self.nodes.borrow()[*node].offset_height
    }

    fn scroll_top(&self, node: &usize) -> f64 {
        self.nodes.borrow()[*node].scroll_top.get()
    }

    fn has_selection(&self) -> bool {
        self.selection_active.get()
    }

    fn in_subframe(&self) -> bool {
        self.subframe.get()
    }

    fn element_at_point(&self, _client_x: f64, _client_y: f64) -> Option<usize> {
        self.hit_test_result.get()
    }

    fn explicit_control(&self, label: &usize) -> Option<usize> {
        self.nodes.borrow()[*label].control
    }

    fn for_target(&self, label: &usize) -> Option<usize> {
        self.nodes.borrow()[*label].for_target
    }

    fn first_labellable_descendant(&self, label: &usize) -> Option<usize> {
        self.nodes.borrow()[*label].labellable_descendant
    }

    fn focus(&self, node: &usize) {
        self.focused.borrow_mut().push(*node);
        self.active.set(Some(*node));
    }

    fn set_selection_to_end(&self, node: &usize) {
        self.selection_moved.borrow_mut().push(*node);
        self.active.set(Some(*node));
    }

    fn blur_active_except(&self, node: &usize) {
        if let Some(active) = self.active.get() {
            if active != *node {
                self.blurred.borrow_mut().push(active);
                self.active.set(None);
            }
        }
    }

    fn dispatch_synthetic(&self, node: &usize, kind: SyntheticKind, touch: &TouchPoint) {
        self.clicks.borrow_mut().push((*node, kind, *touch));
    }
}

pub fn touch_at(target: usize, x: f64, y: f64, timestamp: f64) -> TouchEvent<usize> {
    touch_with_id(target, x, y, timestamp, 7)
}

pub fn touch_with_id(target: usize, x: f64, y: f64, timestamp: f64, id: u64) -> TouchEvent<usize> {
    TouchEvent {
        target,
        touch: TouchPoint {
            id,
            page_x: x,
            page_y: y,
            screen_x: x,
            screen_y: y + 20.0,
            client_x: x,
            client_y: y,
        },
        touches: 1,
        timestamp,
    }
}

pub fn native_click(target: usize, timestamp: f64) -> MouseEvent<usize> {
    MouseEvent {
        target,
        timestamp,
        cancelable: true,
        synthesized: false,
        detail: 1,
    }
}
