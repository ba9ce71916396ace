//! Named, type-erased values shared between a scenario and its factories.
//!
//! # Usage
//!
//! ```rust
//! use vt_sim::UserObjects;
//!
//! let mut objects = UserObjects::new();
//! objects.insert("population", 250usize);
//! assert_eq!(objects.get::<usize>("population"), Some(&250));
//! assert_eq!(objects.get::<u32>("population"), None);
//! ```

use std::any::Any;
use std::fmt;

use rustc_hash::FxHashMap;

/// A name → value map.  Values are stored as `Box<dyn Any>` and read back
/// with their concrete type; a lookup with the wrong type returns `None`.
#[derive(Default)]
pub struct UserObjects {
    map: FxHashMap<String, Box<dyn Any>>,
}

impl UserObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn insert<T: 'static>(&mut self, name: impl Into<String>, value: T) {
        self.map.insert(name.into(), Box::new(value));
    }

    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.map.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn get_mut<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.map.get_mut(name).and_then(|v| v.downcast_mut::<T>())
    }

    /// Remove the value under `name`.  The value is dropped if it is not a `T`.
    pub fn remove<T: 'static>(&mut self, name: &str) -> Option<T> {
        self.map
            .remove(name)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for UserObjects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("UserObjects").field("names", &names).finish()
    }
}
