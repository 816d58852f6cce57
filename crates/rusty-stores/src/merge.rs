// File: rusty-stores/src/merge.rs
// Purpose: Stores that accept partial updates merged into an object

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::store::{Callback, Readable, StoreSource, Subscription, Writable, WritableStore};
use crate::StoreError;

/// Shallow-merges the keys of `partial` into `base`
///
/// Keys present in `partial` replace those in `base`; nested objects are
/// replaced whole, not merged. Both sides must be JSON objects.
///
/// # Examples
///
/// ```
/// use rusty_stores::merge::shallow_merge;
/// use serde_json::json;
///
/// let merged = shallow_merge(json!({"a": 1, "b": {"x": 1}}), json!({"b": {"y": 2}})).unwrap();
/// assert_eq!(merged, json!({"a": 1, "b": {"y": 2}}));
/// ```
pub fn shallow_merge(base: Value, partial: Value) -> Result<Value, StoreError> {
    match (base, partial) {
        (Value::Object(mut base), Value::Object(partial)) => {
            base.extend(partial);
            Ok(Value::Object(base))
        }
        (Value::Object(_), other) | (other, _) => Err(StoreError::NotAnObject(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Writable store that also accepts partial objects
pub struct Merge<T> {
    store: Writable<T>,
}

/// Wraps a value or writable store so it can take partial updates
pub fn merge<T>(source: impl Into<StoreSource<T>>) -> Result<Merge<T>, StoreError>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    Ok(Merge {
        store: source.into().into_writable()?,
    })
}

impl<T> Merge<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Merges a partial JSON object into the current value
    ///
    /// The store is left untouched if the partial is not an object or the
    /// merged object no longer fits `T`.
    pub fn merge(&self, partial: Value) -> Result<(), StoreError> {
        let base = serde_json::to_value(self.store.get())?;
        let merged = shallow_merge(base, partial)?;
        let next: T = serde_json::from_value(merged)?;
        self.store.set(next);
        Ok(())
    }

    /// Merges any serializable partial (a struct of optional fields, a map, ...)
    pub fn merge_from<P: Serialize>(&self, partial: &P) -> Result<(), StoreError> {
        self.merge(serde_json::to_value(partial)?)
    }

    /// The wrapped store
    pub fn store(&self) -> &Writable<T> {
        &self.store
    }
}

impl<T> Readable<T> for Merge<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        self.store.get()
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        self.store.subscribe_with(callback)
    }
}

impl<T> WritableStore<T> for Merge<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn set(&self, value: T) {
        self.store.set(value);
    }
}
