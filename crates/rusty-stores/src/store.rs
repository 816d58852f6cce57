// File: rusty-stores/src/store.rs
// Purpose: Reactive store primitive (get / set / subscribe / update)

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::StoreError;

/// Subscriber callback shared between the store and its notifier
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

// ============================================================================
// Traits
// ============================================================================

/// A value container that can be read and observed
pub trait Readable<T>: Send + Sync {
    /// Returns the current value
    fn get(&self) -> T;

    /// Registers a callback; it is called right away with the current value
    /// and again after every change
    fn subscribe_with(&self, callback: Callback<T>) -> Subscription;

    /// Closure form of [`Readable::subscribe_with`]
    fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        Self: Sized,
    {
        self.subscribe_with(Arc::new(f))
    }
}

/// A readable store that also accepts new values
pub trait WritableStore<T>: Readable<T> {
    /// Replaces the value and notifies subscribers
    fn set(&self, value: T);

    /// Computes the next value from the current one
    fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
        Self: Sized,
    {
        self.set(f(&self.get()));
    }
}

impl<T, R> Readable<T> for Arc<R>
where
    R: Readable<T> + ?Sized,
{
    fn get(&self) -> T {
        (**self).get()
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        (**self).subscribe_with(callback)
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle for a registered callback
///
/// Dropping the handle unsubscribes. Call [`Subscription::forget`] to keep the
/// callback registered for as long as the store lives.
#[must_use = "dropping a Subscription unsubscribes the callback"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Creates a subscription that runs `cancel` once when unsubscribed
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel (constant stores)
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Removes the callback from the store
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keeps the callback registered without holding the handle
    pub fn forget(mut self) {
        self.cancel = None;
    }
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

// ============================================================================
// Lock helpers
// ============================================================================
//
// A panic inside a subscriber must not brick the store, so poisoned locks
// are recovered instead of propagated.

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Writable
// ============================================================================

struct Subscribers<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// Notification state: at most one thread delivers at a time
#[derive(Default)]
struct Delivery {
    running: bool,
    dirty: bool,
}

struct Shared<T> {
    value: RwLock<T>,
    writer: Mutex<()>,
    delivery: Mutex<Delivery>,
    subscribers: Mutex<Subscribers<T>>,
}

/// Resets the delivery state if a subscriber panics mid-delivery
struct DeliveryGuard<'a>(&'a Mutex<Delivery>);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            *lock(self.0) = Delivery::default();
        }
    }
}

/// Shared, observable value
///
/// Clones share the same value and subscriber list. Callbacks run after the
/// internal locks are released, so they may read or write the store.
///
/// Writes from any number of threads are serialized. Subscribers always
/// receive the value current at delivery time, and the last value every
/// subscriber sees is the value `get` returns once writers are done. A write
/// made while another delivery is running (from a callback or another
/// thread) is folded into that delivery, so intermediate values may be
/// skipped.
///
/// # Examples
///
/// ```
/// use rusty_stores::{Readable, Writable, WritableStore};
/// use std::sync::{Arc, Mutex};
///
/// let count = Writable::new(0);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = seen.clone();
/// let sub = count.subscribe(move |v| sink.lock().unwrap().push(*v));
///
/// count.set(1);
/// count.update(|v| v + 1);
/// sub.unsubscribe();
/// count.set(10);
///
/// assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
/// assert_eq!(count.get(), 10);
/// ```
pub struct Writable<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writable")
            .field("value", &*read(&self.shared.value))
            .field("subscribers", &lock(&self.shared.subscribers).entries.len())
            .finish()
    }
}

impl<T> Writable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a store holding `value`
    pub fn new(value: T) -> Self {
        Self {
            shared: Arc::new(Shared {
                value: RwLock::new(value),
                writer: Mutex::new(()),
                delivery: Mutex::new(Delivery::default()),
                subscribers: Mutex::new(Subscribers {
                    next_id: 0,
                    entries: Vec::new(),
                }),
            }),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        lock(&self.shared.subscribers).entries.len()
    }

    /// Returns true if both handles point at the same store
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Delivers the current value, or hands the work to the running delivery
    fn notify(&self) {
        {
            let mut delivery = lock(&self.shared.delivery);
            if delivery.running {
                delivery.dirty = true;
                return;
            }
            delivery.running = true;
        }
        let _guard = DeliveryGuard(&self.shared.delivery);

        loop {
            let value = self.get();
            let callbacks: Vec<Callback<T>> = lock(&self.shared.subscribers)
                .entries
                .iter()
                .map(|(_, callback)| Arc::clone(callback))
                .collect();

            tracing::trace!("Notifying {} subscribers", callbacks.len());

            for callback in callbacks {
                callback(&value);
            }

            // Clear `running` in the same critical section that sees no
            // pending write, or a concurrent writer's value is lost
            let mut delivery = lock(&self.shared.delivery);
            if delivery.dirty {
                delivery.dirty = false;
            } else {
                delivery.running = false;
                return;
            }
        }
    }
}

impl<T> Readable<T> for Writable<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        read(&self.shared.value).clone()
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        let id = {
            let mut subscribers = lock(&self.shared.subscribers);
            let id = subscribers.next_id;
            subscribers.next_id += 1;
            subscribers.entries.push((id, Arc::clone(&callback)));
            id
        };

        callback(&self.get());

        let shared: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = shared.upgrade() {
                lock(&shared.subscribers).entries.retain(|(i, _)| *i != id);
            }
        })
    }
}

impl<T> WritableStore<T> for Writable<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn set(&self, value: T) {
        {
            let _writer = lock(&self.shared.writer);
            *write(&self.shared.value) = value;
        }
        self.notify();
    }

    /// Computes the next value atomically with respect to other writers
    ///
    /// `f` runs without the value lock, so it may read this store or any
    /// view of it. It must not write to the same store.
    fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        {
            let _writer = lock(&self.shared.writer);
            let next = f(&self.get());
            *write(&self.shared.value) = next;
        }
        self.notify();
    }
}

// ============================================================================
// Constant
// ============================================================================

/// Read-only store around a fixed value
#[derive(Debug, Clone)]
pub struct Constant<T> {
    value: T,
}

/// Creates a read-only store that never changes
pub fn readable<T>(value: T) -> Constant<T> {
    Constant { value }
}

impl<T> Readable<T> for Constant<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self) -> T {
        self.value.clone()
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        callback(&self.value);
        Subscription::noop()
    }
}

// ============================================================================
// Derived
// ============================================================================

/// Read-only store computed from another store
///
/// The mapping runs on every `get` and on every source notification; nothing
/// is cached.
pub struct Derived<S, T> {
    source: Arc<dyn Readable<S>>,
    map: Arc<dyn Fn(&S) -> T + Send + Sync>,
}

impl<S, T> Clone for Derived<S, T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            map: Arc::clone(&self.map),
        }
    }
}

/// Creates a store whose value is `map(source)`
///
/// # Examples
///
/// ```
/// use rusty_stores::{derived, Readable, Writable, WritableStore};
///
/// let name = Writable::new("world".to_string());
/// let greeting = derived(name.clone(), |n: &String| format!("hello {}", n));
///
/// assert_eq!(greeting.get(), "hello world");
/// name.set("rust".to_string());
/// assert_eq!(greeting.get(), "hello rust");
/// ```
pub fn derived<S, T, R, F>(source: R, map: F) -> Derived<S, T>
where
    R: Readable<S> + 'static,
    F: Fn(&S) -> T + Send + Sync + 'static,
{
    Derived {
        source: Arc::new(source),
        map: Arc::new(map),
    }
}

impl<S, T> Readable<T> for Derived<S, T>
where
    S: 'static,
    T: 'static,
{
    fn get(&self) -> T {
        (self.map)(&self.source.get())
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        let map = Arc::clone(&self.map);
        self.source
            .subscribe_with(Arc::new(move |value: &S| callback(&map(value))))
    }
}

// ============================================================================
// Lens
// ============================================================================

/// Two-way view onto part of a writable store
///
/// Reading projects the parent value; writing folds the new part back into
/// the parent. Subscribers are only called when the projected value
/// actually changes.
pub struct Lens<P, T> {
    parent: Writable<P>,
    get: Arc<dyn Fn(&P) -> T + Send + Sync>,
    put: Arc<dyn Fn(&P, T) -> P + Send + Sync>,
}

impl<P, T> Clone for Lens<P, T> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            get: Arc::clone(&self.get),
            put: Arc::clone(&self.put),
        }
    }
}

/// Creates a two-way view onto `parent`
pub fn lens<P, T, G, U>(parent: &Writable<P>, get: G, put: U) -> Lens<P, T>
where
    G: Fn(&P) -> T + Send + Sync + 'static,
    U: Fn(&P, T) -> P + Send + Sync + 'static,
{
    Lens {
        parent: parent.clone(),
        get: Arc::new(get),
        put: Arc::new(put),
    }
}

impl<P, T> Readable<T> for Lens<P, T>
where
    P: Clone + Send + Sync + 'static,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn get(&self) -> T {
        (self.get)(&self.parent.get())
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        let get = Arc::clone(&self.get);
        let last: Mutex<Option<T>> = Mutex::new(None);

        self.parent.subscribe_with(Arc::new(move |parent: &P| {
            let next = get(parent);
            {
                let mut last = lock(&last);
                if last.as_ref() == Some(&next) {
                    return;
                }
                *last = Some(next.clone());
            }
            callback(&next);
        }))
    }
}

impl<P, T> WritableStore<T> for Lens<P, T>
where
    P: Clone + Send + Sync + 'static,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    fn set(&self, value: T) {
        let put = Arc::clone(&self.put);
        self.parent.update(move |parent| put(parent, value));
    }
}

// ============================================================================
// StoreSource
// ============================================================================

/// Either a plain value or a store, decided by the caller
///
/// Helpers that accept "a value or a store" take a `StoreSource` instead of
/// probing their argument for store capabilities.
pub enum StoreSource<T> {
    /// A plain value; the helper creates its own store
    Value(T),
    /// A read-only store
    Readable(Arc<dyn Readable<T>>),
    /// A writable store shared with the caller
    Writable(Writable<T>),
}

impl<T> StoreSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps a plain value
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    /// Wraps any readable store
    pub fn readable(store: impl Readable<T> + 'static) -> Self {
        Self::Readable(Arc::new(store))
    }

    /// Wraps a writable store
    pub fn writable(store: Writable<T>) -> Self {
        Self::Writable(store)
    }

    /// Returns true for the writable-capable variants
    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::Readable(_))
    }

    /// Views the source as a readable store
    pub fn into_readable(self) -> Arc<dyn Readable<T>> {
        match self {
            Self::Value(value) => Arc::new(readable(value)),
            Self::Readable(store) => store,
            Self::Writable(store) => Arc::new(store),
        }
    }

    /// Views the source as a writable store
    ///
    /// A plain value gets a fresh store; a read-only store is rejected.
    pub fn into_writable(self) -> Result<Writable<T>, StoreError> {
        match self {
            Self::Value(value) => Ok(Writable::new(value)),
            Self::Readable(_) => Err(StoreError::ReadOnly),
            Self::Writable(store) => Ok(store),
        }
    }
}

impl<T> From<Writable<T>> for StoreSource<T> {
    fn from(store: Writable<T>) -> Self {
        Self::Writable(store)
    }
}

impl<T> From<Arc<dyn Readable<T>>> for StoreSource<T> {
    fn from(store: Arc<dyn Readable<T>>) -> Self {
        Self::Readable(store)
    }
}
