use std::collections::hash_map::Entry;
use std::{
    collections::HashMap,
    hash::{BuildHasher, Hash},
};

/// Trait for inserting a new key-value pair into a map.
pub trait HashMapInsertNew<K, V> {
    /// Inserts a new key-value pair into the map.
    ///
    /// # Errors
    /// If the key is already present, the map is left untouched and the value
    /// already stored under it is returned.
    fn insert_new(&mut self, key: K, value: V) -> Result<(), &V>;
}

impl<K, V, H> HashMapInsertNew<K, V> for HashMap<K, V, H>
where
    K: Eq + Hash,
    H: BuildHasher,
{
    #[inline]
    fn insert_new(&mut self, key: K, value: V) -> Result<(), &V> {
        match self.entry(key) {
            Entry::Occupied(occupied) => Err(&*occupied.into_mut()),
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                Ok(())
            }
        }
    }
}
