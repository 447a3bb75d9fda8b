use crate::prelude::{Arc, HashSet};
use futures::channel::oneshot;
use parking_lot::Mutex;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Event listener callback type
pub type EventCallback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Identifier returned by [`EventManager::on`] and friends, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener<E> {
    id: ListenerId,
    once: bool,
    callback: EventCallback<E>,
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            once: self.once,
            callback: self.callback.clone(),
        }
    }
}

/// Typed, synchronous event channel.
///
/// Listeners run in registration order on the emitting thread, before `emit`
/// returns. The listener list is snapshotted before dispatch, so callbacks may
/// subscribe or unsubscribe without deadlocking; listeners added during a
/// dispatch only see later events.
pub struct EventManager<E> {
    listeners: Mutex<Vec<Listener<E>>>,
    next_id: AtomicU64,
}

impl<E> Default for EventManager<E> {
    fn default() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<E> EventManager<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(callback), false)
    }

    /// Register a listener that is dropped after its first invocation
    pub fn once<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(callback), true)
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    /// Dispatch an event to every listener
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = {
            let mut listeners = self.listeners.lock();
            let snapshot = listeners.clone();
            listeners.retain(|l| !l.once);
            snapshot
        };

        for listener in snapshot {
            (listener.callback)(event);
        }
    }

    /// Get number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    fn subscribe(&self, callback: EventCallback<E>, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push(Listener { id, once, callback });
        id
    }
}

impl<E: Clone + Send + 'static> EventManager<E> {
    /// Receiver resolved with the next emitted event
    pub fn next_event(&self) -> oneshot::Receiver<E> {
        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        self.once(move |event: &E| {
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(event.clone());
            }
        });
        rx
    }
}

/// Event channel for one-shot status events (`create`, `build-map`).
///
/// Remembers which statuses already fired so late subscribers can resolve
/// immediately instead of waiting forever.
pub struct StatusEvents<S> {
    fired: Mutex<HashSet<S>>,
    channel: EventManager<S>,
}

impl<S> Default for StatusEvents<S> {
    fn default() -> Self {
        Self {
            fired: Mutex::new(HashSet::default()),
            channel: EventManager::default(),
        }
    }
}

impl<S> StatusEvents<S>
where
    S: Copy + Eq + Hash + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the status as fired and notify listeners
    pub fn emit(&self, status: S) {
        self.fired.lock().insert(status);
        self.channel.emit(&status);
    }

    pub fn status(&self, status: S) -> bool {
        self.fired.lock().contains(&status)
    }

    pub fn on<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        self.channel.on(callback)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.channel.off(id)
    }

    /// Resolves once `status` has fired, immediately if it already has
    pub async fn wait_for(&self, status: S) {
        if self.status(status) {
            return;
        }
        let (tx, rx) = oneshot::channel::<()>();
        let tx = Mutex::new(Some(tx));
        let id = self.channel.on(move |fired: &S| {
            if *fired == status {
                if let Some(tx) = tx.lock().take() {
                    let _ = tx.send(());
                }
            }
        });
        // The status may have fired between the check and the subscription
        if !self.status(status) {
            let _ = rx.await;
        }
        self.channel.off(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_listeners_run_in_registration_order() {
        let events = EventManager::<u32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = log.clone();
        events.on(move |e| first.lock().push(("first", *e)));
        let second = log.clone();
        events.on(move |e| second.lock().push(("second", *e)));

        events.emit(&7);
        assert_eq!(*log.lock(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_once_listener_fires_once() {
        let events = EventManager::<()>::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        events.once(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        events.emit(&());
        events.emit(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_off_removes_listener() {
        let events = EventManager::<()>::new();
        let id = events.on(|_| {});
        assert!(events.off(id));
        assert!(!events.off(id));
    }

    #[test]
    fn test_listener_may_subscribe_during_dispatch() {
        let events = Arc::new(EventManager::<u8>::new());
        let inner = events.clone();
        events.once(move |_| {
            inner.on(|_| {});
        });
        events.emit(&1);
        assert_eq!(events.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_status_wait_resolves_after_fire() {
        let status = StatusEvents::<u8>::new();
        assert!(!status.status(1));
        status.emit(1);
        status.wait_for(1).await;
        assert!(status.status(1));
    }
}
