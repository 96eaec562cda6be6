//! Target Resolver: maps raw event targets to the element a tap actually
//! means, classifies elements into a closed set of interaction categories,
//! and tracks scrollable ancestors for fling-stop detection.

use crate::dom::{DomView, ElementFacts};
use crate::platform::PlatformProfile;

/// Closed classification of an element's interaction category. Computed
/// once per lookup from [`ElementFacts`]; the state machine switches on
/// this instead of re-comparing tag strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Button,
    Select,
    Textarea,
    Input(InputKind),
    Label,
    Iframe,
    Video,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Button,
    Checkbox,
    File,
    Image,
    Radio,
    Submit,
    /// `date`, `datetime`, `datetime-local` and friends.
    DateLike,
    Time,
    Month,
    Text,
    Other,
}

impl InputKind {
    fn from_type(input_type: &str) -> Self {
        if input_type.starts_with("date") {
            return InputKind::DateLike;
        }
        match input_type {
            "button" => InputKind::Button,
            "checkbox" => InputKind::Checkbox,
            "file" => InputKind::File,
            "image" => InputKind::Image,
            "radio" => InputKind::Radio,
            "submit" => InputKind::Submit,
            "time" => InputKind::Time,
            "month" => InputKind::Month,
            "text" => InputKind::Text,
            _ => InputKind::Other,
        }
    }
}

pub fn classify(facts: &ElementFacts) -> ElementKind {
    match facts.tag.as_str() {
        "button" => ElementKind::Button,
        "select" => ElementKind::Select,
        "textarea" => ElementKind::Textarea,
        "input" => ElementKind::Input(InputKind::from_type(
            facts.input_type.as_deref().unwrap_or(""),
        )),
        "label" => ElementKind::Label,
        "iframe" => ElementKind::Iframe,
        "video" => ElementKind::Video,
        _ => ElementKind::Other,
    }
}

/// Unwrap a text-node event target to its parent element. Older WebKit
/// builds deliver the text node itself as the touch target.
pub fn effective_target<D: DomView>(dom: &D, target: &D::Node) -> D::Node {
    if dom.is_text_node(target) {
        if let Some(parent) = dom.parent(target) {
            return parent;
        }
    }
    target.clone()
}

/// Should the platform's own click be left alone for this element?
pub fn needs_native_click(profile: &PlatformProfile, facts: &ElementFacts) -> bool {
    match classify(facts) {
        // Disabled controls must not receive synthetic clicks.
        ElementKind::Button | ElementKind::Select | ElementKind::Textarea => {
            if facts.disabled {
                return true;
            }
        }
        ElementKind::Input(kind) => {
            // File inputs need real clicks on iOS; disabled ones everywhere.
            if (profile.ios && kind == InputKind::File) || facts.disabled {
                return true;
            }
        }
        // Home-screen web apps on iOS 8 can stop events bubbling into
        // frames, and label/video activation needs the real thing.
        ElementKind::Label | ElementKind::Iframe | ElementKind::Video => return true,
        ElementKind::Other => {}
    }
    facts.needs_click_marker
}

/// Does simulating a click on this element mean focusing it?
pub fn needs_focus(profile: &PlatformProfile, facts: &ElementFacts) -> bool {
    match classify(facts) {
        ElementKind::Textarea => true,
        // Android selects open without focus.
        ElementKind::Select => !profile.android,
        ElementKind::Input(kind) => match kind {
            InputKind::Button
            | InputKind::Checkbox
            | InputKind::File
            | InputKind::Image
            | InputKind::Radio
            | InputKind::Submit => false,
            // No point focusing what cannot take input.
            _ => !facts.disabled && !facts.read_only,
        },
        _ => facts.needs_focus_marker,
    }
}

/// Does activating this element submit a form? Covers `input[type=submit]`
/// and buttons, whose type defaults to "submit" when none is declared.
pub fn is_submit_control(facts: &ElementFacts) -> bool {
    match classify(facts) {
        ElementKind::Input(kind) => kind == InputKind::Submit,
        ElementKind::Button => facts.input_type.as_deref().is_none_or(|t| t == "submit"),
        _ => false,
    }
}

/// Find the control a label delegates to: the explicit control reference,
/// then the `for`-id target, then the first labellable descendant.
pub fn find_control<D: DomView>(dom: &D, label: &D::Node) -> Option<D::Node> {
    dom.explicit_control(label)
        .or_else(|| dom.for_target(label))
        .or_else(|| dom.first_labellable_descendant(label))
}

/// Side table of cached scroll ancestors, keyed by element identity.
///
/// An entry records the nearest ancestor whose content overflows its
/// visible height, plus that ancestor's scroll offset as of the last
/// touch-start. A cached ancestor is re-validated by containment before
/// reuse, so reparented elements get a fresh discovery.
pub struct ScrollParents<N> {
    entries: Vec<(N, ScrollEntry<N>)>,
}

struct ScrollEntry<N> {
    parent: N,
    last_scroll_top: f64,
}

impl<N: Clone + PartialEq> ScrollParents<N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Discover (or re-validate) the scroll parent of `node` and record its
    /// current scroll offset. Called at touch-start.
    pub fn snapshot<D: DomView<Node = N>>(&mut self, dom: &D, node: &N) {
        let cached = self
            .entry(node)
            .filter(|e| dom.contains(&e.parent, node))
            .map(|e| e.parent.clone());
        let parent = cached.or_else(|| discover_scroll_parent(dom, node));
        let Some(parent) = parent else {
            self.entries.retain(|(n, _)| n != node);
            return;
        };
        let top = dom.scroll_top(&parent);
        match self.entries.iter_mut().find(|(n, _)| n == node) {
            Some((_, entry)) => {
                entry.parent = parent;
                entry.last_scroll_top = top;
            }
            None => self.entries.push((
                node.clone(),
                ScrollEntry {
                    parent,
                    last_scroll_top: top,
                },
            )),
        }
    }

    /// Has the node's scroll parent moved since the last snapshot? True
    /// means the tap is arresting a fling, not activating the element.
    pub fn moved_since_snapshot<D: DomView<Node = N>>(&self, dom: &D, node: &N) -> bool {
        match self.entry(node) {
            Some(entry) => dom.scroll_top(&entry.parent) != entry.last_scroll_top,
            None => false,
        }
    }

    /// Carry `from`'s cached entry over to `to`. Used when a bad-target
    /// platform re-derives the touch-end target by hit test.
    pub fn adopt(&mut self, from: &N, to: &N) {
        if from == to {
            return;
        }
        let Some(entry) = self.entry(from) else {
            return;
        };
        let (parent, top) = (entry.parent.clone(), entry.last_scroll_top);
        self.entries.retain(|(n, _)| n != to);
        self.entries.push((
            to.clone(),
            ScrollEntry {
                parent,
                last_scroll_top: top,
            },
        ));
    }

    fn entry(&self, node: &N) -> Option<&ScrollEntry<N>> {
        self.entries
            .iter()
            .find(|(n, _)| n == node)
            .map(|(_, e)| e)
    }
}

impl<N: Clone + PartialEq> Default for ScrollParents<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_scroll_parent<D: DomView>(dom: &D, node: &D::Node) -> Option<D::Node> {
    let mut current = Some(node.clone());
    while let Some(el) = current {
        if dom.scroll_height(&el) > dom.offset_height(&el) {
            return Some(el);
        }
        current = dom.parent(&el);
    }
    None
}
