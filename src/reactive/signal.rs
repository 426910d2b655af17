//! Observable values and the subscription seam.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

/// Callback run when a dependency changes.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Something a machine can watch for changes.
pub trait Dependency: Send + Sync {
    /// Register `listener`; it stays registered until the returned
    /// subscription is dropped.
    fn subscribe(&self, listener: Listener) -> Subscription;
}

/// Handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribe now. Same as dropping.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

struct SignalInner<T> {
    value: RwLock<T>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

/// A shared value that notifies subscribers when it is written.
///
/// Clones share the same value and listener list.
///
/// ```rust
/// use soteria::reactive::{Dependency, Signal};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let temperature = Signal::new(0.0_f64);
/// let writes = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&writes);
/// let subscription = temperature.subscribe(Arc::new(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// temperature.set(50.0);
/// drop(subscription);
/// temperature.set(60.0);
///
/// assert_eq!(writes.load(Ordering::SeqCst), 1);
/// assert_eq!(temperature.get(), 60.0);
/// ```
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                value: RwLock::new(value),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.inner
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read the value without cloning it.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        read(&value)
    }

    /// Replace the value and notify every listener.
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Modify the value in place and notify every listener.
    pub fn update(&self, modify: impl FnOnce(&mut T)) {
        {
            let mut value = self.inner.value.write().unwrap_or_else(PoisonError::into_inner);
            modify(&mut value);
        }
        self.notify();
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // Listeners run with no lock held so they may read or write the signal.
    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener();
        }
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> Dependency for Signal<T> {
    fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));

        let inner: Weak<SignalInner<T>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|(existing, _)| *existing != id);
            }
        })
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.inner.value.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Signal")
            .field("value", &*value)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
