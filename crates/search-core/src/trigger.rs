// search-core/src/trigger.rs
//! 搜索触发器 - 类型化的观察者注册表

use std::collections::HashMap;
use std::sync::{Arc, RwLock, Weak};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Thread-safe list of listeners for events of type `E`.
pub struct Observers<E> {
    inner: Arc<RwLock<ObserversInner<E>>>,
}

struct ObserversInner<E> {
    next_id: u64,
    listeners: HashMap<u64, Listener<E>>,
}

impl<E> Clone for Observers<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ObserversInner {
                next_id: 0,
                listeners: HashMap::new(),
            })),
        }
    }

    /// Registers `listener` until the returned guard is dropped.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
        E: 'static,
    {
        let mut inner = self.inner.write().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Arc::new(listener));

        let weak: Weak<RwLock<ObserversInner<E>>> = Arc::downgrade(&self.inner);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.write().unwrap().listeners.remove(&id);
                }
            })),
        }
    }

    /// Calls every live listener, returns how many were called.
    ///
    /// Listeners run outside the lock and may subscribe or unsubscribe.
    pub fn notify(&self, event: &E) -> usize {
        let listeners: Vec<Listener<E>> = {
            let inner = self.inner.read().unwrap();
            let mut ids: Vec<&u64> = inner.listeners.keys().collect();
            ids.sort();
            ids.into_iter().map(|id| Arc::clone(&inner.listeners[id])).collect()
        };
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Unregisters its listener on drop.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    OpenSearch,
    CloseSearch,
}

/// Lets any part of the app open or close the search box.
pub type SearchTrigger = Observers<TriggerEvent>;
