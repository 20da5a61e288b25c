//! Client-side navigation.
//!
//! [`NavigationStore`] is the single source of truth for which path the
//! application is showing. It stays consistent with a [`BrowserHistory`] in
//! both directions:
//!
//! - programmatic: [`NavigationStore::navigate`] pushes a history entry,
//!   updates the current path, and notifies listeners
//! - external: back/forward moves the history cursor and
//!   [`NavigationStore::handle_pop_state`] pulls the new location in
//!
//! Construct one store per application and hand out clones; clones share state.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

/// Path shown when the history has no location.
pub const DEFAULT_PATH: &str = "/login";

/// Normalize a path: exactly one leading slash, no repeated slashes.
///
/// Never rejects input; the empty string becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');
    for ch in path.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out
}

/// Boundary to the address bar and session history.
pub trait BrowserHistory {
    /// Raw current location, if any.
    fn location(&self) -> Option<String>;

    /// Push a new entry and make it current. Forward entries are discarded.
    fn push_state(&mut self, path: &str);

    /// Step back. Returns `false` at the start of the history.
    fn back(&mut self) -> bool;

    /// Step forward. Returns `false` at the end of the history.
    fn forward(&mut self) -> bool;
}

/// Session history kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl MemoryHistory {
    /// History with one entry. The path is stored as given, unnormalized.
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
            cursor: 0,
        }
    }

    /// History with no location at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl BrowserHistory for MemoryHistory {
    fn location(&self) -> Option<String> {
        self.entries.get(self.cursor).cloned()
    }

    fn push_state(&mut self, path: &str) {
        if self.entries.is_empty() {
            self.entries.push(path.to_string());
            self.cursor = 0;
            return;
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(path.to_string());
        self.cursor = self.entries.len() - 1;
    }

    fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }
}

type Listener = Rc<dyn Fn(&str)>;

struct Inner {
    current_path: RefCell<String>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
    history: RefCell<Box<dyn BrowserHistory>>,
}

/// Shared navigation state. Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct NavigationStore {
    inner: Rc<Inner>,
}

impl NavigationStore {
    pub fn new(history: impl BrowserHistory + 'static) -> Self {
        let initial = normalize_path(history.location().as_deref().unwrap_or(DEFAULT_PATH));
        Self {
            inner: Rc::new(Inner {
                current_path: RefCell::new(initial),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
                history: RefCell::new(Box::new(history)),
            }),
        }
    }

    /// Store over an in-memory history starting at `initial`.
    pub fn in_memory(initial: &str) -> Self {
        Self::new(MemoryHistory::new(initial))
    }

    pub fn current_path(&self) -> String {
        self.inner.current_path.borrow().clone()
    }

    /// Go to `path`: push a history entry, update the current path, and notify
    /// every listener synchronously.
    pub fn navigate(&self, path: &str) {
        let next = normalize_path(path);
        self.inner.history.borrow_mut().push_state(&next);
        *self.inner.current_path.borrow_mut() = next.clone();
        debug!(path = %next, "navigate");
        self.notify(&next);
    }

    /// Back/forward handler: adopt the history's current location and notify.
    pub fn handle_pop_state(&self) {
        let location = self.inner.history.borrow().location();
        let path = normalize_path(location.as_deref().unwrap_or(DEFAULT_PATH));
        *self.inner.current_path.borrow_mut() = path.clone();
        debug!(path = %path, "pop state");
        self.notify(&path);
    }

    /// Browser back button. Returns `false` if there was nowhere to go.
    pub fn back(&self) -> bool {
        let moved = self.inner.history.borrow_mut().back();
        if moved {
            self.handle_pop_state();
        }
        moved
    }

    /// Browser forward button. Returns `false` if there was nowhere to go.
    pub fn forward(&self) -> bool {
        let moved = self.inner.history.borrow_mut().forward();
        if moved {
            self.handle_pop_state();
        }
        moved
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str) + 'static,
    {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Subscribe a view. The returned [`Location`] tracks the current path.
    ///
    /// On creation the store re-reads the history location, so a view mounted
    /// on a deep link starts from the real address rather than a stale path.
    pub fn use_location(&self) -> Location {
        let pathname = Rc::new(RefCell::new(self.current_path()));
        let sink = Rc::clone(&pathname);
        let subscription = self.subscribe(move |path| {
            *sink.borrow_mut() = path.to_string();
        });
        self.handle_pop_state();
        Location {
            pathname,
            _subscription: subscription,
        }
    }

    fn notify(&self, path: &str) {
        // Snapshot so listeners may subscribe or navigate while being called.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            // A listener that navigated has already notified everyone of the newer path.
            if *self.inner.current_path.borrow() != path {
                break;
            }
            listener(path);
        }
    }
}

/// Registration handle; dropping it removes the listener.
pub struct Subscription {
    store: Weak<Inner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner
                .listeners
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// A view's live view of the current path.
pub struct Location {
    pathname: Rc<RefCell<String>>,
    _subscription: Subscription,
}

impl Location {
    pub fn pathname(&self) -> String {
        self.pathname.borrow().clone()
    }
}

/// Click event passed to [`Link::activate`].
#[derive(Debug, Clone, Default)]
pub struct ClickEvent {
    default_prevented: bool,
}

impl ClickEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// An in-app link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    to: String,
}

impl Link {
    pub fn new(to: impl Into<String>) -> Self {
        Self { to: to.into() }
    }

    /// Normalized href, for open-in-new-tab and copy-link.
    pub fn href(&self) -> String {
        normalize_path(&self.to)
    }

    /// Intercept a click: suppress the full-page load and navigate in place.
    pub fn activate(&self, store: &NavigationStore, event: &mut ClickEvent) {
        self.activate_with(store, event, |_| {});
    }

    /// Like [`Link::activate`], then run `on_click`.
    pub fn activate_with<F>(&self, store: &NavigationStore, event: &mut ClickEvent, on_click: F)
    where
        F: FnOnce(&ClickEvent),
    {
        event.prevent_default();
        store.navigate(&self.to);
        on_click(event);
    }
}
