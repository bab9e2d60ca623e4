use std::collections::HashMap as StdHashMap;
use std::iter::FromIterator;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};
use super::hash::Hasher;


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashMap<K: Hash + Eq, V>(StdHashMap<K, V, Hasher>);

impl<K, V> HashMap<K, V>
where
    K: Hash + Eq,
{
    pub fn new() -> HashMap<K, V> {
        HashMap(StdHashMap::with_hasher(Hasher::default()))
    }

    pub fn with_capacity(capacity: usize) -> HashMap<K, V> {
        HashMap(StdHashMap::with_capacity_and_hasher(
            capacity,
            Hasher::default(),
        ))
    }
}

impl<K, V> Default for HashMap<K, V>
where
    K: Hash + Eq,
{
    fn default() -> HashMap<K, V> {
        HashMap::new()
    }
}

impl<K, V> Deref for HashMap<K, V>
where
    K: Hash + Eq,
{
    type Target = StdHashMap<K, V, Hasher>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> DerefMut for HashMap<K, V>
where
    K: Hash + Eq,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K, V> FromIterator<(K, V)> for HashMap<K, V>
where
    K: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> HashMap<K, V> {
        HashMap(StdHashMap::from_iter(iter))
    }
}

impl<K, V> IntoIterator for HashMap<K, V>
where
    K: Hash + Eq,
{
    type Item = <StdHashMap<K, V, Hasher> as IntoIterator>::Item;
    type IntoIter = <StdHashMap<K, V, Hasher> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a HashMap<K, V>
where
    K: Hash + Eq,
{
    type Item = <&'a StdHashMap<K, V, Hasher> as IntoIterator>::Item;
    type IntoIter = <&'a StdHashMap<K, V, Hasher> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        (&self.0).into_iter()
    }
}
