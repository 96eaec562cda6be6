//! Listener bookkeeping for an attached surface. Whatever gets registered
//! must be removed again when the surface detaches; this module owns that
//! pairing so the browser adapter cannot leak a listener.

use log::trace;

/// Something listeners can be registered on. `Callback` is opaque to the
/// set; the target knows how to wire it up and tear it down.
pub trait ListenerTarget {
    type Callback;

    fn add(&self, name: &'static str, callback: &Self::Callback, capture: bool);
    fn remove(&self, name: &'static str, callback: &Self::Callback, capture: bool);
}

/// Owns every callback registered on one target. Dropping the set removes
/// exactly the listeners it added, restoring pure pass-through of native
/// events; an empty set is inert and touches the target not at all.
pub struct ListenerSet<T: ListenerTarget> {
    target: T,
    entries: Vec<(&'static str, bool, T::Callback)>,
}

impl<T: ListenerTarget> ListenerSet<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            entries: Vec::new(),
        }
    }

    /// Register `callback` for `name` and keep it alive until the set is
    /// dropped.
    pub fn register(&mut self, name: &'static str, capture: bool, callback: T::Callback) {
        self.target.add(name, &callback, capture);
        self.entries.push((name, capture, callback));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ListenerTarget> Drop for ListenerSet<T> {
    fn drop(&mut self) {
        trace!("removing {} listeners", self.entries.len());
        for (name, capture, callback) in &self.entries {
            self.target.remove(name, callback, *capture);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        added: RefCell<Vec<(&'static str, usize, bool)>>,
        removed: RefCell<Vec<(&'static str, usize, bool)>>,
    }

    impl ListenerTarget for Rc<Recorder> {
        type Callback = usize;

        fn add(&self, name: &'static str, callback: &usize, capture: bool) {
            self.added.borrow_mut().push((name, *callback, capture));
        }

        fn remove(&self, name: &'static str, callback: &usize, capture: bool) {
            self.removed.borrow_mut().push((name, *callback, capture));
        }
    }

    #[test]
    fn drop_removes_every_registered_listener() {
        let recorder = Rc::new(Recorder::default());
        let mut set = ListenerSet::new(recorder.clone());
        set.register("click", true, 1);
        set.register("mousedown", true, 2);
        set.register("touchstart", false, 3);
        set.register("touchend", false, 4);

        assert!(recorder.removed.borrow().is_empty());
        drop(set);

        // Same names, same callbacks, same phases.
        assert_eq!(*recorder.removed.borrow(), *recorder.added.borrow());
    }

    #[test]
    fn inert_set_never_touches_the_target() {
        let recorder = Rc::new(Recorder::default());
        let set = ListenerSet::new(recorder.clone());
        assert!(set.is_empty());
        drop(set);

        assert!(recorder.added.borrow().is_empty());
        assert!(recorder.removed.borrow().is_empty());
    }
}
