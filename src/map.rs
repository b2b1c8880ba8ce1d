use crate::raw;
use crate::raw::EncodingError;

use std::fmt;

use serde::Serialize;

/// A Robin Hood hash map.
///
/// Keys are hashed with a per-map random SipHash key pair over their
/// canonical `serde` encoding, so any `Eq + Serialize` type can be a key.
/// Operations that hash a key return a [`Result`] whose error case is
/// [`EncodingError`]; for key types that cannot fail to serialize this is
/// safe to `unwrap`. See the [crate-level documentation](crate) for the
/// design.
pub struct HashMap<K, V> {
    raw: raw::RawTable<K, V>,
}

impl<K, V> Default for HashMap<K, V> {
    fn default() -> Self {
        HashMap::new()
    }
}

impl<K, V> HashMap<K, V> {
    /// Creates an empty `HashMap` with the default capacity of 8 slots.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhmap::HashMap;
    /// let map: HashMap<&str, i32> = HashMap::new();
    /// ```
    pub fn new() -> HashMap<K, V> {
        HashMap {
            raw: raw::RawTable::new(),
        }
    }

    /// Creates an empty `HashMap` with space for `capacity` slots.
    ///
    /// A capacity of 0 falls back to the default of 8. Note that this is a
    /// slot count, not an element count: the map grows once it is 90% full.
    pub fn with_capacity(capacity: usize) -> HashMap<K, V> {
        HashMap {
            raw: raw::RawTable::with_capacity(capacity),
        }
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the number of slots the map currently holds.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// An iterator visiting all key-value pairs in slot order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            raw: self.raw.iter(),
        }
    }

    /// An iterator visiting all keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { iter: self.iter() }
    }

    /// An iterator visiting all values in slot order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { iter: self.iter() }
    }
}

impl<K, V> HashMap<K, V>
where
    K: Eq + Serialize,
{
    /// Returns a reference to the value corresponding to the key, or `None`
    /// if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhmap::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "apple").unwrap();
    /// assert_eq!(map.get(&1).unwrap(), Some(&"apple"));
    /// assert_eq!(map.get(&2).unwrap(), None);
    /// ```
    pub fn get(&self, key: &K) -> Result<Option<&V>, EncodingError> {
        self.raw.get(key)
    }

    /// Returns `true` if the map contains a value for the key.
    pub fn contains_key(&self, key: &K) -> Result<bool, EncodingError> {
        Ok(self.raw.get(key)?.is_some())
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the key was already present its value is overwritten in place and
    /// the old value is returned; the length is unchanged. Inserting a new
    /// key may grow the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhmap::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.insert(1, "apple").unwrap(), None);
    /// assert_eq!(map.insert(1, "banana").unwrap(), Some("apple"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, EncodingError> {
        self.raw.insert(key, value)
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// Removing an absent key is a no-op, so removal is idempotent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhmap::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(1, "apple").unwrap();
    /// assert_eq!(map.remove(&1).unwrap(), Some("apple"));
    /// assert_eq!(map.remove(&1).unwrap(), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, EncodingError> {
        self.raw.remove(key)
    }
}

impl<K, V> fmt::Debug for HashMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a HashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// An iterator over a map's entries.
pub struct Iter<'a, K, V> {
    raw: raw::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.raw.next()
    }
}

/// An iterator over a map's keys.
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(key, _)| key)
    }
}

/// An iterator over a map's values.
pub struct Values<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, value)| value)
    }
}
