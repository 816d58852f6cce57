// File: rusty-stores/src/array.rs
// Purpose: Filtered and mapped views of stores holding a Vec

use crate::store::{derived, Derived, Readable};

/// Store of the items that satisfy `predicate`
///
/// # Examples
///
/// ```
/// use rusty_stores::array::filtered;
/// use rusty_stores::{Readable, Writable, WritableStore};
///
/// let numbers = Writable::new(vec![1, 2, 3, 4]);
/// let even = filtered(numbers.clone(), |n: &i32| n % 2 == 0);
///
/// assert_eq!(even.get(), vec![2, 4]);
/// numbers.update(|v| v.iter().map(|n| n * 3).collect());
/// assert_eq!(even.get(), vec![6, 12]);
/// ```
pub fn filtered<T, R, F>(source: R, predicate: F) -> Derived<Vec<T>, Vec<T>>
where
    T: Clone + 'static,
    R: Readable<Vec<T>> + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    derived(source, move |items: &Vec<T>| {
        items.iter().filter(|item| predicate(item)).cloned().collect()
    })
}

/// Store of `f` applied to every item
pub fn mapped<T, U, R, F>(source: R, f: F) -> Derived<Vec<T>, Vec<U>>
where
    T: 'static,
    U: 'static,
    R: Readable<Vec<T>> + 'static,
    F: Fn(&T) -> U + Send + Sync + 'static,
{
    derived(source, move |items: &Vec<T>| items.iter().map(&f).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Writable, WritableStore};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_mapped_follows_source() {
        let names = Writable::new(vec!["ada".to_string(), "grace".to_string()]);
        let lengths = mapped(names.clone(), |s: &String| s.len());

        assert_eq!(lengths.get(), vec![3, 5]);
        names.set(vec![]);
        assert!(lengths.get().is_empty());
    }

    #[test]
    fn test_filtered_notifies() {
        let numbers = Writable::new(vec![1, 2, 3]);
        let odd = filtered(numbers.clone(), |n: &i32| n % 2 == 1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = odd.subscribe(move |v| sink.lock().unwrap().push(v.clone()));

        numbers.set(vec![5, 6, 7]);
        assert_eq!(*seen.lock().unwrap(), vec![vec![1, 3], vec![5, 7]]);
    }

    #[test]
    fn test_chained_views() {
        let numbers = Writable::new((1..=6).collect::<Vec<i32>>());
        let squares_of_even = mapped(filtered(numbers, |n: &i32| n % 2 == 0), |n: &i32| n * n);
        assert_eq!(squares_of_even.get(), vec![4, 16, 36]);
    }
}
