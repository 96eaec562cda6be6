//! Browser adapter: binds an [`Engine`] to a real DOM layer through
//! `web-sys` listeners and applies the engine's dispositions to the live
//! events.
//!
//! Touch listeners go in the bubble phase, mouse and click listeners in
//! the capture phase, so ghost clicks are intercepted before bubbling
//! reaches the application's own bubble-phase handlers.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use log::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{
    Element, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlLabelElement,
    HtmlTextAreaElement, Node,
};

use crate::dom::{
    Disposition, DomView, ElementFacts, MouseEvent, SyntheticKind, TouchEvent, TouchPoint,
};
use crate::engine::{Engine, Options};
use crate::listeners::{ListenerSet, ListenerTarget};
use crate::platform::{PlatformProfile, SurfaceTraits, not_needed};

/// Expando property marking events dispatched by the engine itself.
const SYNTHETIC_TAG: &str = "quicktapSynthetic";

/// [`DomView`] over the live document.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebDom;

impl WebDom {
    fn window() -> Option<web_sys::Window> {
        web_sys::window()
    }

    fn document() -> Option<web_sys::Document> {
        Self::window().and_then(|w| w.document())
    }
}

impl DomView for WebDom {
    type Node = Node;

    fn is_text_node(&self, node: &Node) -> bool {
        node.node_type() == Node::TEXT_NODE
    }

    fn parent(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn contains(&self, ancestor: &Node, node: &Node) -> bool {
        ancestor.contains(Some(node))
    }

    fn facts(&self, node: &Node) -> ElementFacts {
        let Some(el) = node.dyn_ref::<Element>() else {
            return ElementFacts::default();
        };
        let class_list = el.class_list();
        ElementFacts {
            tag: el.tag_name().to_lowercase(),
            input_type: el
                .dyn_ref::<HtmlInputElement>()
                .map(|i| i.type_().to_lowercase())
                .or_else(|| el.dyn_ref::<HtmlButtonElement>().map(|b| b.type_().to_lowercase())),
            disabled: truthy_property(node, "disabled"),
            read_only: truthy_property(node, "readOnly"),
            needs_click_marker: class_list.contains("needsclick"),
            needs_focus_marker: class_list.contains("needsfocus"),
            can_set_selection: Reflect::has(node.as_ref(), &JsValue::from_str("setSelectionRange"))
                .unwrap_or(false),
        }
    }

    fn scroll_height(&self, node: &Node) -> f64 {
        node.dyn_ref::<Element>()
            .map(|el| el.scroll_height() as f64)
            .unwrap_or(0.0)
    }

    fn offset_height(&self, node: &Node) -> f64 {
        node.dyn_ref::<HtmlElement>()
            .map(|el| el.offset_height() as f64)
            .unwrap_or(0.0)
    }

    fn scroll_top(&self, node: &Node) -> f64 {
        node.dyn_ref::<Element>()
            .map(|el| el.scroll_top() as f64)
            .unwrap_or(0.0)
    }

    fn has_selection(&self) -> bool {
        let Some(selection) = Self::window().and_then(|w| w.get_selection().ok().flatten()) else {
            return false;
        };
        selection.range_count() > 0 && !selection.is_collapsed()
    }

    fn in_subframe(&self) -> bool {
        let Some(window) = Self::window() else {
            return false;
        };
        match window.top() {
            Ok(Some(top)) => top != window,
            _ => false,
        }
    }

    fn element_at_point(&self, client_x: f64, client_y: f64) -> Option<Node> {
        Self::document()?
            .element_from_point(client_x as f32, client_y as f32)
            .map(Into::into)
    }

    fn explicit_control(&self, label: &Node) -> Option<Node> {
        label
            .dyn_ref::<HtmlLabelElement>()?
            .control()
            .map(Into::into)
    }

    fn for_target(&self, label: &Node) -> Option<Node> {
        let html_for = label.dyn_ref::<HtmlLabelElement>()?.html_for();
        if html_for.is_empty() {
            return None;
        }
        Self::document()?.get_element_by_id(&html_for).map(Into::into)
    }

    fn first_labellable_descendant(&self, label: &Node) -> Option<Node> {
        label
            .dyn_ref::<Element>()?
            .query_selector(
                "button, input:not([type=hidden]), keygen, meter, output, progress, select, \
                 textarea",
            )
            .ok()
            .flatten()
            .map(Into::into)
    }

    fn focus(&self, node: &Node) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn set_selection_to_end(&self, node: &Node) {
        if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
            let len = input.value().len() as u32;
            let _ = input.set_selection_range(len, len);
        } else if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            let len = area.value().len() as u32;
            let _ = area.set_selection_range(len, len);
        } else {
            self.focus(node);
        }
    }

    fn blur_active_except(&self, node: &Node) {
        let Some(active) = Self::document().and_then(|d| d.active_element()) else {
            return;
        };
        let active_node: &Node = active.as_ref();
        if active_node != node {
            if let Some(el) = active.dyn_ref::<HtmlElement>() {
                let _ = el.blur();
            }
        }
    }

    fn dispatch_synthetic(&self, node: &Node, kind: SyntheticKind, touch: &TouchPoint) {
        let init = web_sys::MouseEventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        init.set_view(Self::window().as_ref());
        init.set_detail(1);
        init.set_screen_x(touch.screen_x as i32);
        init.set_screen_y(touch.screen_y as i32);
        init.set_client_x(touch.client_x as i32);
        init.set_client_y(touch.client_y as i32);
        let name = match kind {
            SyntheticKind::Click => "click",
            SyntheticKind::MouseDown => "mousedown",
        };
        let Ok(event) = web_sys::MouseEvent::new_with_mouse_event_init_dict(name, &init) else {
            return;
        };
        let _ = Reflect::set(
            event.as_ref(),
            &JsValue::from_str(SYNTHETIC_TAG),
            &JsValue::TRUE,
        );
        let _ = node.dispatch_event(&event);
    }
}

fn truthy_property(node: &Node, name: &str) -> bool {
    Reflect::get(node.as_ref(), &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn apply(disposition: Disposition, event: &web_sys::Event) {
    if disposition.stop_immediate {
        event.stop_immediate_propagation();
    }
    if disposition.stop_propagation {
        event.stop_propagation();
    }
    if disposition.prevent_default {
        event.prevent_default();
    }
}

fn touch_event(event: &web_sys::TouchEvent, changed: bool) -> Option<TouchEvent<Node>> {
    let target: Node = event.target()?.dyn_into().ok()?;
    let list = if changed {
        event.changed_touches()
    } else {
        event.target_touches()
    };
    let touch = list.item(0)?;
    Some(TouchEvent {
        target,
        touch: TouchPoint {
            id: touch.identifier() as u64,
            page_x: touch.page_x() as f64,
            page_y: touch.page_y() as f64,
            screen_x: touch.screen_x() as f64,
            screen_y: touch.screen_y() as f64,
            client_x: touch.client_x() as f64,
            client_y: touch.client_y() as f64,
        },
        touches: event.target_touches().length(),
        timestamp: event.time_stamp(),
    })
}

fn mouse_event(event: &web_sys::MouseEvent) -> Option<MouseEvent<Node>> {
    let target: Node = event.target()?.dyn_into().ok()?;
    let synthesized = Reflect::get(event.as_ref(), &JsValue::from_str(SYNTHETIC_TAG))
        .ok()
        .map(|v| v.is_truthy())
        .unwrap_or(false);
    Some(MouseEvent {
        target,
        timestamp: event.time_stamp(),
        cancelable: event.cancelable(),
        synthesized,
        detail: event.detail(),
    })
}

/// Gather what the capability check needs from the live document.
pub fn surface_traits(layer: &Element) -> SurfaceTraits {
    let window = WebDom::window();
    let document = WebDom::document();

    let touch_capable = window
        .as_ref()
        .map(|w| Reflect::has(w.as_ref(), &JsValue::from_str("ontouchstart")).unwrap_or(false))
        .unwrap_or(false);

    let viewport_content = document
        .as_ref()
        .and_then(|d| d.query_selector("meta[name=viewport]").ok().flatten())
        .and_then(|el| el.dyn_into::<web_sys::HtmlMetaElement>().ok())
        .map(|meta| meta.content());

    let document_fits_viewport = match (document.as_ref(), window.as_ref()) {
        (Some(d), Some(w)) => {
            let scroll_width = d
                .document_element()
                .map(|el| el.scroll_width() as f64)
                .unwrap_or(f64::MAX);
            let outer = w
                .outer_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0);
            scroll_width <= outer
        }
        _ => false,
    };

    let touch_action_opt_out = layer
        .dyn_ref::<HtmlElement>()
        .map(|el| {
            let style = el.style();
            let ta = style.get_property_value("touch-action").unwrap_or_default();
            let ms = style
                .get_property_value("-ms-touch-action")
                .unwrap_or_default();
            ta == "none" || ta == "manipulation" || ms == "none" || ms == "manipulation"
        })
        .unwrap_or(false);

    SurfaceTraits {
        touch_capable,
        has_meta_viewport: viewport_content.is_some(),
        viewport_user_scalable_no: viewport_content
            .as_deref()
            .map(|c| c.contains("user-scalable=no"))
            .unwrap_or(false),
        document_fits_viewport,
        touch_action_opt_out,
    }
}

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;

/// [`ListenerTarget`] over a DOM element; callbacks stay alive inside the
/// owning [`ListenerSet`] until removal.
struct Layer(Element);

impl ListenerTarget for Layer {
    type Callback = EventClosure;

    fn add(&self, name: &'static str, callback: &EventClosure, capture: bool) {
        let _ = self.0.add_event_listener_with_callback_and_bool(
            name,
            callback.as_ref().unchecked_ref(),
            capture,
        );
    }

    fn remove(&self, name: &'static str, callback: &EventClosure, capture: bool) {
        let _ = self.0.remove_event_listener_with_callback_and_bool(
            name,
            callback.as_ref().unchecked_ref(),
            capture,
        );
    }
}

/// Listening surface returned by [`attach`]. Dropping it (or calling
/// [`Handle::detach`]) removes every listener, restoring pure pass-through
/// of native events. Detach at most once; the consuming signature makes a
/// second call impossible.
pub struct Handle {
    listeners: ListenerSet<Layer>,
}

impl Handle {
    fn inert(layer: Element) -> Self {
        Self {
            listeners: ListenerSet::new(Layer(layer)),
        }
    }

    pub fn detach(self) {
        drop(self);
    }
}

/// Instantiate the engine on `layer`. If the platform needs no
/// disambiguation at all, an inert handle is returned and native behavior
/// is untouched.
pub fn attach(layer: &Element, options: Options) -> Handle {
    let profile = WebDom::window()
        .map(|w| PlatformProfile::from_user_agent(&w.navigator().user_agent().unwrap_or_default()))
        .unwrap_or_default();

    if not_needed(&profile, &surface_traits(layer)) {
        debug!("tap disambiguation not needed; attaching inert handle");
        return Handle::inert(layer.clone());
    }

    let engine = Rc::new(RefCell::new(Engine::new(WebDom, profile, options)));
    let mut handle = Handle::inert(layer.clone());

    // The engine dispatches its synthetic click synchronously from inside
    // on_touch_end, which re-enters the click listener below while the
    // engine is still borrowed. That click carries the synthetic tag and
    // would be allowed through anyway, so a failed borrow simply leaves
    // the event alone.

    // Ghost mouse events only occur on Android; other platforms get by
    // with the click listener alone.
    if profile.android {
        for name in ["mouseover", "mousedown", "mouseup"] {
            let engine = engine.clone();
            let cb: EventClosure = Closure::wrap(Box::new(move |e: web_sys::Event| {
                let Ok(mut engine) = engine.try_borrow_mut() else {
                    return;
                };
                let e: web_sys::MouseEvent = e.unchecked_into();
                if let Some(ev) = mouse_event(&e) {
                    apply(engine.on_mouse(&ev), e.as_ref());
                }
            }) as Box<dyn FnMut(_)>);
            handle.listeners.register(name, true, cb);
        }
    }

    {
        let engine = engine.clone();
        let cb: EventClosure = Closure::wrap(Box::new(move |e: web_sys::Event| {
            let Ok(mut engine) = engine.try_borrow_mut() else {
                return;
            };
            let e: web_sys::MouseEvent = e.unchecked_into();
            if let Some(ev) = mouse_event(&e) {
                apply(engine.on_click(&ev), e.as_ref());
            }
        }) as Box<dyn FnMut(_)>);
        handle.listeners.register("click", true, cb);
    }

    {
        let engine = engine.clone();
        let cb: EventClosure = Closure::wrap(Box::new(move |e: web_sys::Event| {
            let e: web_sys::TouchEvent = e.unchecked_into();
            if let Some(ev) = touch_event(&e, false) {
                apply(engine.borrow_mut().on_touch_start(&ev), e.as_ref());
            }
        }) as Box<dyn FnMut(_)>);
        handle.listeners.register("touchstart", false, cb);
    }
    {
        let engine = engine.clone();
        let cb: EventClosure = Closure::wrap(Box::new(move |e: web_sys::Event| {
            let e: web_sys::TouchEvent = e.unchecked_into();
            if let Some(ev) = touch_event(&e, true) {
                apply(engine.borrow_mut().on_touch_move(&ev), e.as_ref());
            }
        }) as Box<dyn FnMut(_)>);
        handle.listeners.register("touchmove", false, cb);
    }
    {
        let engine = engine.clone();
        let cb: EventClosure = Closure::wrap(Box::new(move |e: web_sys::Event| {
            let e: web_sys::TouchEvent = e.unchecked_into();
            if let Some(ev) = touch_event(&e, true) {
                apply(engine.borrow_mut().on_touch_end(&ev), e.as_ref());
            }
        }) as Box<dyn FnMut(_)>);
        handle.listeners.register("touchend", false, cb);
    }
    {
        let engine = engine.clone();
        let cb: EventClosure = Closure::wrap(Box::new(move |e: web_sys::Event| {
            apply(engine.borrow_mut().on_touch_cancel(), &e);
        }) as Box<dyn FnMut(_)>);
        handle.listeners.register("touchcancel", false, cb);
    }

    // A handler declared via the element's onclick attribute would run
    // before our capture-phase interception can veto it; pull it out and
    // re-register it as an ordinary bubble-phase listener.
    if let Some(el) = layer.dyn_ref::<HtmlElement>() {
        if let Some(old_onclick) = el.onclick() {
            let _ = layer.add_event_listener_with_callback("click", &old_onclick);
            el.set_onclick(None);
        }
    }

    handle
}
