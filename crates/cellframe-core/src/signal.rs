//! Observable state cells.
//!
//! An [`Observable`] holds a value, hands out a synchronous getter and
//! notifies subscribers after every write. Subscribers are called in
//! registration order, once per write; no batching is performed.

use std::fmt;

/// Handle returned by [`Observable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// A value with change notification.
pub struct Observable<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and notify subscribers.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate the value in place and notify subscribers.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.value);
        self.notify();
        result
    }

    /// Register a callback invoked after every change.
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn notify(&mut self) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.value);
        }
    }
}

impl<T: Clone> Observable<T> {
    /// Copy of the current value.
    pub fn snapshot(&self) -> T {
        self.value.clone()
    }
}

impl<T: PartialEq> Observable<T> {
    /// Set the value, notifying only if it differs from the current one.
    pub fn set_if_changed(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
