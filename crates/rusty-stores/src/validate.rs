// File: rusty-stores/src/validate.rs
// Purpose: Stores that re-validate their value on every change

use std::sync::Arc;

use serde::Serialize;

use crate::immutable::{immutable, Immutable};
use crate::store::{Callback, Readable, StoreSource, Subscription, Writable, WritableStore};
use crate::StoreError;

/// Checks a value against a schema
///
/// The schema engine itself lives outside this crate; anything that can
/// report a list of messages fits. Closures implement this trait.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, value: &T) -> Result<(), Vec<String>>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Result<(), Vec<String>> + Send + Sync,
{
    fn validate(&self, value: &T) -> Result<(), Vec<String>> {
        self(value)
    }
}

/// Outcome of the latest validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationState {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Default for ValidationState {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }
}

impl From<Result<(), Vec<String>>> for ValidationState {
    fn from(result: Result<(), Vec<String>>) -> Self {
        match result {
            Ok(()) => Self::default(),
            Err(errors) => Self {
                valid: false,
                errors,
            },
        }
    }
}

/// Writable store paired with the validation state of its value
///
/// Invalid values are still stored; validity is reported alongside them.
/// Writes through any other handle to the same store are validated too.
pub struct Validated<T> {
    store: Writable<T>,
    state: Writable<ValidationState>,
    _watch: Subscription,
}

/// Wraps a value or writable store with a validator
///
/// # Examples
///
/// ```
/// use rusty_stores::validate::validated;
/// use rusty_stores::{StoreSource, WritableStore};
///
/// let age = validated(StoreSource::value(30), |v: &i32| {
///     if *v >= 0 { Ok(()) } else { Err(vec!["age must not be negative".to_string()]) }
/// })
/// .unwrap();
///
/// assert!(age.is_valid());
/// age.set(-1);
/// assert_eq!(age.errors(), vec!["age must not be negative"]);
/// ```
pub fn validated<T, V>(source: StoreSource<T>, validator: V) -> Result<Validated<T>, StoreError>
where
    T: Clone + Send + Sync + 'static,
    V: Validator<T> + 'static,
{
    let store = source.into_writable()?;
    let state = Writable::new(ValidationState::default());

    let validator: Arc<dyn Validator<T>> = Arc::new(validator);
    let sink = state.clone();
    let watch = store.subscribe(move |value: &T| {
        let next = ValidationState::from(validator.validate(value));
        if !next.valid {
            tracing::debug!("Validation failed: {:?}", next.errors);
        }
        sink.set(next);
    });

    Ok(Validated {
        store,
        state,
        _watch: watch,
    })
}

impl<T> Validated<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Read-only view of the validation state
    pub fn validation(&self) -> Immutable<ValidationState> {
        immutable(self.state.clone())
    }

    pub fn is_valid(&self) -> bool {
        self.state.get().valid
    }

    pub fn errors(&self) -> Vec<String> {
        self.state.get().errors
    }
}

impl<T> Readable<T> for Validated<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self) -> T {
        self.store.get()
    }

    fn subscribe_with(&self, callback: Callback<T>) -> Subscription {
        self.store.subscribe_with(callback)
    }
}

impl<T> WritableStore<T> for Validated<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn set(&self, value: T) {
        self.store.set(value);
    }
}
