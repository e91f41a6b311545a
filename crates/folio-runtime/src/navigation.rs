//! Navigation-start event hub.
//!
//! The routing layer is an external collaborator: it calls
//! [`NavigationHub::notify_start`] just before a route change, and the
//! lifecycle controller listens through [`NavigationHub::on_start`]. A
//! [`Subscription`] releases its listener when dropped, so a listener cannot
//! outlive the render cycle that registered it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Listener = Box<dyn Fn(&str) + Send + Sync>;

/// Hub for navigation-start events.
#[derive(Default)]
pub struct NavigationHub {
    listeners: Mutex<HashMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl NavigationHub {
    /// Create a new hub, shared between the router and the controller.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Announce that navigation to `to` is about to start.
    ///
    /// Listeners run synchronously on the caller's thread; invocation order
    /// is unspecified. Listeners must not re-enter the hub.
    pub fn notify_start(&self, to: &str) {
        let listeners = self.listeners.lock().unwrap();
        for listener in listeners.values() {
            listener(to);
        }
    }

    /// Register a navigation-start listener.
    ///
    /// The returned handle removes the listener when dropped; hold it for as
    /// long as the listener should stay active.
    #[must_use = "dropping the subscription immediately unregisters the listener"]
    pub fn on_start(self: &Arc<Self>, listener: impl Fn(&str) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap()
            .insert(id, Box::new(listener));
        Subscription {
            id,
            hub: Arc::downgrade(self),
        }
    }

    /// Number of active listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    fn remove(&self, id: u64) {
        self.listeners.lock().unwrap().remove(&id);
    }
}

/// Handle to an active navigation-start listener.
pub struct Subscription {
    id: u64,
    hub: Weak<NavigationHub>,
}

impl Subscription {
    /// Explicitly release the listener. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn notifies_active_listeners() {
        let hub = NavigationHub::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_clone = Arc::clone(&hits);
        let sub = hub.on_start(move |to| {
            assert_eq!(to, "about");
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify_start("about");
        hub.notify_start("about");

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        drop(sub);
    }

    #[test]
    fn dropping_subscription_removes_listener() {
        let hub = NavigationHub::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let hits_clone = Arc::clone(&hits);
        let sub = hub.on_start(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hub.listener_count(), 1);

        drop(sub);
        assert_eq!(hub.listener_count(), 0);

        hub.notify_start("home");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_is_explicit_release() {
        let hub = NavigationHub::new();
        let sub = hub.on_start(|_| {});

        sub.unsubscribe();

        assert_eq!(hub.listener_count(), 0);
    }
}
