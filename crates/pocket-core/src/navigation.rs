//! Navigation stack with a back-swipe gate
//!
//! Wraps the host navigation stack, decides whether the interactive
//! back-swipe may begin, and forwards every show event to an optional
//! external listener after applying its own bookkeeping. Editors read
//! [`NavigationStack::is_pop_gesture`] to autosave drafts dismissed by swipe.

use std::sync::{Arc, Weak};

/// Observer of navigation transitions
pub trait NavigationListener<T>: Send + Sync {
    /// `screen` is about to become visible
    fn will_show(&self, _screen: &T, _animated: bool) {}

    /// `screen` finished becoming visible
    fn did_show(&self, _screen: &T, _animated: bool) {}
}

/// Navigation stack decorator
pub struct NavigationStack<T: 'static> {
    screens: Vec<T>,
    is_pop_gesture: bool,
    is_pushing: bool,
    listener: Option<Weak<dyn NavigationListener<T>>>,
}

impl<T: 'static> NavigationStack<T> {
    /// Stack with a root screen
    pub fn new(root: T) -> Self {
        Self {
            screens: vec![root],
            is_pop_gesture: false,
            is_pushing: false,
            listener: None,
        }
    }

    /// Set or clear the external listener; it is held weakly
    pub fn set_listener(&mut self, listener: Option<&Arc<dyn NavigationListener<T>>>) {
        self.listener = listener.map(Arc::downgrade);
    }

    fn listener(&self) -> Option<Arc<dyn NavigationListener<T>>> {
        self.listener.as_ref().and_then(Weak::upgrade)
    }

    /// Screens from root to top
    pub fn screens(&self) -> &[T] {
        &self.screens
    }

    /// Top screen
    pub fn top(&self) -> Option<&T> {
        self.screens.last()
    }

    /// Stack depth
    pub fn depth(&self) -> usize {
        self.screens.len()
    }

    /// Whether the current pop was started by the back-swipe
    pub fn is_pop_gesture(&self) -> bool {
        self.is_pop_gesture
    }

    /// Whether a push animation is in flight
    pub fn is_pushing(&self) -> bool {
        self.is_pushing
    }

    /// Push a screen; the gesture gate stays closed until `did_show`
    pub fn push(&mut self, screen: T) {
        self.is_pushing = true;
        self.screens.push(screen);
    }

    /// Pop the top screen, keeping the root
    pub fn pop(&mut self) -> Option<T> {
        if self.screens.len() > 1 {
            self.screens.pop()
        } else {
            None
        }
    }

    /// The back-swipe wants to begin
    ///
    /// Marks the pop as gesture-driven and allows it only when there is
    /// something to pop and no push is in flight.
    pub fn gesture_should_begin(&mut self) -> bool {
        self.is_pop_gesture = true;
        self.screens.len() > 1 && !self.is_pushing
    }

    /// Host notification before a screen appears
    pub fn will_show(&self, screen: &T, animated: bool) {
        if let Some(listener) = self.listener() {
            listener.will_show(screen, animated);
        }
    }

    /// Host notification after a screen appeared
    pub fn did_show(&mut self, screen: &T, animated: bool) {
        self.is_pop_gesture = false;
        self.is_pushing = false;
        if let Some(listener) = self.listener() {
            listener.did_show(screen, animated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        shown: Mutex<Vec<(&'static str, &'static str)>>,
    }

    impl NavigationListener<&'static str> for Recorder {
        fn will_show(&self, screen: &&'static str, _animated: bool) {
            self.shown.lock().push(("will", *screen));
        }

        fn did_show(&self, screen: &&'static str, _animated: bool) {
            self.shown.lock().push(("did", *screen));
        }
    }

    #[test]
    fn test_gesture_blocked_at_root_and_during_push() {
        let mut nav = NavigationStack::new("main");
        assert!(!nav.gesture_should_begin());
        assert!(nav.is_pop_gesture());

        nav.push("note");
        assert!(!nav.gesture_should_begin());

        nav.did_show(&"note", true);
        assert!(!nav.is_pop_gesture());
        assert!(nav.gesture_should_begin());
    }

    #[test]
    fn test_events_forwarded_after_local_state() {
        let recorder = Arc::new(Recorder::default());
        let listener: Arc<dyn NavigationListener<&'static str>> = recorder.clone();
        let mut nav = NavigationStack::new("main");
        nav.set_listener(Some(&listener));

        nav.push("photo");
        nav.will_show(&"photo", true);
        nav.did_show(&"photo", true);

        assert!(!nav.is_pushing());
        assert_eq!(*recorder.shown.lock(), vec![("will", "photo"), ("did", "photo")]);
    }

    #[test]
    fn test_dropped_listener_is_not_called() {
        let mut nav = NavigationStack::new("main");
        {
            let listener: Arc<dyn NavigationListener<&'static str>> = Arc::new(Recorder::default());
            nav.set_listener(Some(&listener));
        }
        nav.did_show(&"main", false);
        assert_eq!(nav.pop(), None);
    }
}
