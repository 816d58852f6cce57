// File: rusty-stores/src/immutable.rs
// Purpose: Read-only views that hand out independent copies

use std::sync::Arc;

use crate::store::{Callback, Readable, StoreSource, Subscription};

/// Read-only store over any source
///
/// Every read and every notification works on a fresh clone, so nothing
/// handed out can alias the source's value, and there is no `set`.
pub struct Immutable<T> {
    source: Arc<dyn Readable<T>>,
}

impl<T> Clone for Immutable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

/// Creates a read-only view of a value or store
///
/// # Examples
///
/// ```
/// use rusty_stores::immutable::immutable;
/// use rusty_stores::{Readable, Writable, WritableStore};
///
/// let items = Writable::new(vec![1, 2]);
/// let view = immutable(items.clone());
///
/// let mut copy = view.get();
/// copy.push(3);
///
/// assert_eq!(items.get(), vec![1, 2]);
/// items.set(vec![4]);
/// assert_eq!(view.get(), vec![4]);
/// ```
pub fn immutable<T>(source: impl Into<StoreSource<T>>) -> Immutable<T>
where
    T: Clone + Send + Sync + 'static,
{
    Immutable {
        source: source.into().into_readable(),
    }
}

impl<T> Readable<T> for Immutable<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        self.source.get()
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        self.source
            .subscribe_with(Arc::new(move |value: &T| callback(&value.clone())))
    }
}
