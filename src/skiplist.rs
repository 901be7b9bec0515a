//! The skiplist proper: a head sentinel plus a tower of forward references per
//! node, with a single writer and any number of lock-free readers.
//!
//! The writer is the [`SkipList`] value itself. Its mutating operations take
//! `&mut self`, so at most one insert or erase can ever be in flight. Readers
//! obtained through [`SkipList::reader`] share the same nodes and may run on
//! other threads concurrently with that writer.
//!
//! Nodes are never freed individually. Erasing a key unlinks its node from
//! every level, but the memory stays owned by the list until the last handle
//! is dropped, so a reader that was standing on the node can keep walking.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

use crate::config::Config;
use crate::height_generator::{Geometric, GeometricError, HeightGenerator};
use crate::node::{Node, NodeStore, Tower};

// ////////////////////////////////////////////////////////////////////////////
// Shared
// ////////////////////////////////////////////////////////////////////////////

/// State shared by the writer and every reader.
pub(crate) struct Shared<K, V> {
    /// Head sentinel; its height is the maximum height.
    head: Tower<K, V>,
    /// Number of levels currently in use, in `[1, max_height]`.
    height: AtomicUsize,
    len: AtomicUsize,
    store: NodeStore<K, V>,
}

// SAFETY: the node store and the node links are only mutated by the unique
// writer handle; readers only perform acquire loads and hand out shared
// references to keys and values.
unsafe impl<K: Send + Sync, V: Send + Sync> Send for Shared<K, V> {}
// SAFETY: see above.
unsafe impl<K: Send + Sync, V: Send + Sync> Sync for Shared<K, V> {}

impl<K, V> Shared<K, V> {
    fn new(max_height: usize) -> Self {
        Shared {
            head: Tower::empty(max_height),
            height: AtomicUsize::new(1),
            len: AtomicUsize::new(0),
            store: NodeStore::new(),
        }
    }

    #[inline]
    fn max_height(&self) -> usize {
        self.head.height()
    }

    #[inline]
    fn height(&self) -> usize {
        self.height.load(Ordering::Acquire)
    }

    #[inline]
    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Walk the level-0 chain from the first real node.
    fn nodes(&self) -> Nodes<'_, K, V> {
        Nodes {
            next: self.head.next(0),
        }
    }

    /// Find the first node whose key is `>= key`.
    ///
    /// Starting from the head on the current top level, advance while the
    /// next key is strictly smaller than `key`, then drop a level. If `trace`
    /// is supplied, the node (or head) at which each level was left is
    /// recorded as that level's predecessor.
    fn search<'a, Q>(
        &'a self,
        key: &Q,
        mut trace: Option<&mut [&'a Tower<K, V>]>,
    ) -> Option<&'a Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = &self.head;
        let mut level = self.height() - 1;
        loop {
            let next = current.next(level);
            match next {
                Some(node) if node.key().borrow() < key => current = node.tower(),
                _ => {
                    if let Some(trace) = trace.as_deref_mut() {
                        trace[level] = current;
                    }
                    if level == 0 {
                        return next;
                    }
                    level -= 1;
                }
            }
        }
    }

    /// Find the node holding exactly `key`.
    fn find<Q>(&self, key: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key, None)
            .filter(|node| node.key().borrow() == key)
    }
}

// ////////////////////////////////////////////////////////////////////////////
// SkipList
// ////////////////////////////////////////////////////////////////////////////

/// A sorted map with expected `O(log n)` insert, lookup and erase, supporting
/// lock-free reads concurrently with a single writer.
///
/// This value is the writer. Any number of [`Reader`]s can be created with
/// [`SkipList::reader`] and moved to other threads.
///
/// # Examples
///
/// ```
/// use memskip::SkipList;
///
/// let mut list = SkipList::new();
/// list.insert(1, "Hello");
/// list.insert(2, "World");
/// assert_eq!(list.read(&1), Some("Hello"));
///
/// list.insert(1, "Howdy");
/// assert_eq!(list.read(&1), Some("Howdy"));
///
/// assert!(list.erase(&2));
/// assert!(!list.erase(&2));
/// assert_eq!(list.len(), 1);
/// ```
pub struct SkipList<K, V, G = Geometric> {
    shared: Arc<Shared<K, V>>,
    generator: G,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K: Ord, V> SkipList<K, V> {
    /// Create a new skiplist with a maximum height of 32 and a probability
    /// denominator of 4.
    ///
    /// # Examples
    ///
    /// ```
    /// use memskip::SkipList;
    ///
    /// let list: SkipList<i64, String> = SkipList::new();
    /// assert_eq!(list.max_height(), 32);
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_generator(Geometric::default())
    }

    /// Create a new skiplist from construction options.
    ///
    /// # Errors
    ///
    /// Fails if the options describe an invalid height distribution.
    #[inline]
    pub fn with_config(config: Config) -> Result<Self, GeometricError> {
        Ok(Self::with_generator(config.generator()?))
    }
}

impl<K: Ord, V, G: HeightGenerator> SkipList<K, V, G> {
    /// Create a new skiplist drawing node heights from `generator`.
    #[inline]
    pub fn with_generator(generator: G) -> Self {
        SkipList {
            shared: Arc::new(Shared::new(generator.max_height())),
            generator,
        }
    }

    /// Insert `value` under `key`, replacing the value in place if the key is
    /// already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use memskip::SkipList;
    ///
    /// let mut list = SkipList::new();
    /// list.insert("k", "a");
    /// list.insert("k", "b");
    /// assert_eq!(list.read("k"), Some("b"));
    /// assert_eq!(list.len(), 1);
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.link(key, value, None);
    }

    /// Insert with an explicit height instead of a generated one.
    ///
    /// The height is only used if `key` is new.
    pub(crate) fn insert_with_height(&mut self, key: K, value: V, height: usize) {
        debug_assert!((1..=self.max_height()).contains(&height));
        self.link(key, value, Some(height));
    }

    fn link(&mut self, key: K, value: V, height: Option<usize>) {
        let shared = &*self.shared;
        let mut trace = vec![&shared.head; shared.max_height()];

        if let Some(node) = shared.search(&key, Some(trace.as_mut_slice())) {
            if *node.key() == key {
                let old = node.replace_value(value);
                // SAFETY: `&mut self` makes this the only writer.
                unsafe { shared.store.retire(old) };
                return;
            }
        }

        let height = height.unwrap_or_else(|| self.generator.next_height());
        let current = shared.height();
        if height > current {
            // The trace above the old height already points at the head.
            shared.height.store(height, Ordering::Release);
            trace!(from = current, to = height, "skiplist height grew");
        }

        // The new node's own links are fully written before any predecessor
        // points at it.
        let tower = Tower::from_links((0..height).map(|level| trace[level].next_ptr(level)));
        // SAFETY: `&mut self` makes this the only writer.
        let node = unsafe { shared.store.alloc(Node::new(key, value, tower)) };
        for (level, predecessor) in trace.iter().enumerate().take(height) {
            predecessor.set_next(level, node.as_ptr());
        }
        shared.len.fetch_add(1, Ordering::Release);
    }

    /// Remove `key` from the list, returning whether it was present.
    ///
    /// The node is unlinked from every level but its memory is retained until
    /// the list is dropped, so concurrent readers never observe freed memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use memskip::SkipList;
    ///
    /// let mut list = SkipList::new();
    /// list.insert("k", "v");
    /// assert!(!list.erase("other"));
    /// assert!(list.erase("k"));
    /// assert_eq!(list.read("k"), None);
    /// ```
    pub fn erase<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let shared = &*self.shared;
        let mut trace = vec![&shared.head; shared.max_height()];

        let Some(node) = shared
            .search(key, Some(trace.as_mut_slice()))
            .filter(|node| node.key().borrow() == key)
        else {
            return false;
        };

        for (level, predecessor) in trace.iter().enumerate().take(node.height()) {
            predecessor.set_next(level, node.tower().next_ptr(level));
        }
        shared.len.fetch_sub(1, Ordering::Release);

        // A level is in use exactly when the head still links into it.
        let previous = shared.height();
        let mut height = previous;
        while height > 1 && shared.head.next_ptr(height - 1).is_null() {
            height -= 1;
        }
        if height != previous {
            shared.height.store(height, Ordering::Release);
            trace!(from = previous, to = height, "skiplist height shrank");
        }
        true
    }
}

impl<K, V, G> SkipList<K, V, G> {
    /// Create a read-only handle that can be sent to other threads and used
    /// concurrently with this writer.
    ///
    /// # Examples
    ///
    /// ```
    /// use memskip::SkipList;
    ///
    /// let mut list = SkipList::new();
    /// let reader = list.reader();
    /// list.insert(1, 1996);
    ///
    /// let seen = std::thread::spawn(move || reader.read(&1)).join().unwrap();
    /// assert_eq!(seen, Some(1996));
    /// ```
    #[inline]
    #[must_use]
    pub fn reader(&self) -> Reader<K, V> {
        Reader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Look up `key`, returning a clone of its value.
    #[inline]
    pub fn read<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.get(key).cloned()
    }

    /// Look up `key`, returning a reference to its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use memskip::SkipList;
    ///
    /// let mut list = SkipList::new();
    /// assert!(list.get(&0).is_none());
    /// list.insert(0, String::from("zero"));
    /// assert_eq!(list.get(&0).map(String::as_str), Some("zero"));
    /// ```
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.shared.find(key).map(Node::value)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.shared.find(key).is_some()
    }

    /// Returns the number of keys in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if the list holds no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of levels currently in use.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.shared.height()
    }

    /// The upper bound on node height.
    #[inline]
    #[must_use]
    pub fn max_height(&self) -> usize {
        self.shared.max_height()
    }

    /// Iterate over the entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use memskip::SkipList;
    ///
    /// let mut list = SkipList::new();
    /// for x in [3, 1, 2] {
    ///     list.insert(x, x * 10);
    /// }
    /// let entries: Vec<_> = list.iter().collect();
    /// assert_eq!(entries, vec![(&1, &10), (&2, &20), (&3, &30)]);
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter(self.shared.nodes())
    }

    pub(crate) fn nodes(&self) -> Nodes<'_, K, V> {
        self.shared.nodes()
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V, G: HeightGenerator> Extend<(K, V)> for SkipList<K, V, G> {
    #[inline]
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        for (key, value) in iterable {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SkipList<K, V> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<K: fmt::Debug, V: fmt::Debug, G> fmt::Debug for SkipList<K, V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, G> IntoIterator for &'a SkipList<K, V, G> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Reader
// ////////////////////////////////////////////////////////////////////////////

/// A read-only handle to a [`SkipList`].
///
/// Readers never lock and may run concurrently with the writer. A lookup
/// racing with an insert or erase of the same key may observe the list either
/// before or after that operation, and an overwritten value is seen either
/// whole-old or whole-new.
///
/// The nodes stay alive for as long as any handle does, so a reader may
/// outlive the writer.
pub struct Reader<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Reader<K, V> {
    /// Look up `key`, returning a clone of its value.
    #[inline]
    pub fn read<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.get(key).cloned()
    }

    /// Look up `key`, returning a reference to its value.
    ///
    /// The reference may outlive a later overwrite or erase by the writer;
    /// it then refers to the superseded value.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.shared.find(key).map(Node::value)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.shared.find(key).is_some()
    }

    /// Returns the number of keys in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// Returns `true` if the list holds no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of levels currently in use.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.shared.height()
    }

    /// Iterate over the entries in ascending key order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter(self.shared.nodes())
    }

    pub(crate) fn nodes(&self) -> Nodes<'_, K, V> {
        self.shared.nodes()
    }
}

impl<K, V> Clone for Reader<K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Reader {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Reader<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a Reader<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Iterators
// ////////////////////////////////////////////////////////////////////////////

/// Level-0 walk over the nodes themselves.
pub(crate) struct Nodes<'a, K, V> {
    next: Option<&'a Node<K, V>>,
}

impl<'a, K, V> Iterator for Nodes<'a, K, V> {
    type Item = &'a Node<K, V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next(0);
        Some(node)
    }
}

/// An iterator over the entries of a skiplist, in ascending key order.
pub struct Iter<'a, K, V>(Nodes<'a, K, V>);

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|node| (node.key(), node.value()))
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
impl<K: Ord, V> Shared<K, V> {
    /// Checks every structural invariant of the list.
    fn check(&self) {
        let nodes: Vec<_> = self.nodes().collect();
        assert!(
            nodes.windows(2).all(|pair| pair[0].key() < pair[1].key()),
            "level 0 is not strictly increasing"
        );
        assert_eq!(self.len(), nodes.len());

        let mut below: Vec<*const Node<K, V>> = nodes.iter().map(|&node| node as *const _).collect();
        for level in 1..self.max_height() {
            let chain: Vec<*const Node<K, V>> =
                std::iter::successors(self.head.next(level), |node| node.next(level))
                    .map(|node| node as *const _)
                    .collect();
            let mut cursor = below.iter();
            for node in &chain {
                assert!(
                    cursor.any(|candidate| candidate == node),
                    "level {level} is not a subsequence of level {}",
                    level - 1
                );
            }
            let expected = nodes.iter().filter(|node| node.height() > level).count();
            assert_eq!(chain.len(), expected, "level {level} is missing nodes");
            below = chain;
        }

        let tallest = nodes.iter().map(|node| node.height()).max().unwrap_or(1);
        assert_eq!(self.height(), tallest);
        assert!((1..=self.max_height()).contains(&self.height()));
    }
}

#[cfg(test)]
impl<K: Ord, V, G> SkipList<K, V, G> {
    pub(crate) fn check(&self) {
        self.shared.check();
    }

    /// The height of the node holding `key`.
    pub(crate) fn height_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.shared.find(key).map(Node::height)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rand::prelude::*;
    use rstest::rstest;

    use super::SkipList;
    use crate::config::Config;
    use crate::height_generator::GeometricError;
    use crate::height_generator::tests::Replay;

    #[test]
    fn basic_small() {
        let mut sl: SkipList<i64, i64> = SkipList::new();
        sl.check();
        assert!(!sl.erase(&1));
        sl.check();
        sl.insert(1, 0);
        sl.check();
        sl.insert(1, 5);
        assert_eq!(sl.read(&1), Some(5));
        sl.check();
        assert!(sl.erase(&1));
        sl.check();
        sl.insert(1, 10);
        sl.check();
        sl.insert(2, 20);
        sl.check();
        assert!(sl.erase(&1));
        sl.check();
        assert!(sl.erase(&2));
        sl.check();
        assert!(!sl.erase(&1));
        sl.check();
        assert!(sl.is_empty());
    }

    #[test]
    fn basic_large() -> Result<()> {
        let size = 10_000;
        let mut sl = SkipList::with_config(Config::default().with_seed(0x1234_abcd))?;
        assert!(sl.is_empty());

        for i in 0..size {
            sl.insert(i, i * 10);
            assert_eq!(sl.len(), i + 1);
        }
        sl.check();

        for i in 0..size {
            assert_eq!(sl.read(&i), Some(i * 10));
        }

        for i in 0..size {
            assert!(sl.erase(&i));
            assert_eq!(sl.len(), size - i - 1);
        }
        sl.check();
        assert_eq!(sl.height(), 1);
        Ok(())
    }

    #[test]
    fn oversized_max_height_is_rejected() {
        let list =
            SkipList::<i32, i32>::with_config(Config::default().with_max_height(usize::MAX));
        assert_eq!(list.err(), Some(GeometricError::MaxTooLarge));
    }

    #[test]
    fn read_int() {
        let mut sl = SkipList::new();
        sl.insert(1, 1996);
        assert_eq!(sl.read(&1), Some(1996));
    }

    #[rstest]
    #[case("testKey", 1996)]
    #[case("", 0)]
    fn read_str_key(#[case] key: &str, #[case] value: i32) {
        let mut sl: SkipList<String, i32> = SkipList::new();
        sl.insert(key.to_owned(), value);
        assert_eq!(sl.read(key), Some(value));
        assert_eq!(sl.read("absent"), None);
    }

    #[test]
    fn last_write_wins() {
        let mut sl: SkipList<String, String> = SkipList::new();
        sl.insert("k".to_owned(), "a".to_owned());
        sl.insert("k".to_owned(), "b".to_owned());
        assert_eq!(sl.read("k").as_deref(), Some("b"));
        assert_eq!(sl.len(), 1);
        sl.check();
    }

    #[test]
    fn erase_absent_leaves_list_unchanged() {
        let mut sl: SkipList<String, String> = SkipList::new();
        sl.insert("k".to_owned(), "v".to_owned());
        let height = sl.height();
        assert!(!sl.erase("other"));
        assert_eq!(sl.read("k").as_deref(), Some("v"));
        assert_eq!(sl.len(), 1);
        assert_eq!(sl.height(), height);
        sl.check();
    }

    #[test]
    fn erase_then_read() {
        let mut sl: SkipList<String, String> = SkipList::new();
        sl.insert("k".to_owned(), "v".to_owned());
        assert!(sl.erase("k"));
        assert_eq!(sl.read("k"), None);
        assert!(!sl.contains_key("k"));
        sl.check();
    }

    #[test]
    fn several_keys() {
        let mut sl = SkipList::new();
        for i in 1..=7 {
            sl.insert(i, format!("testValue{i}"));
        }
        for i in 1..=7 {
            assert_eq!(sl.read(&i), Some(format!("testValue{i}")));
        }
        sl.check();
    }

    #[test]
    fn insert_existing_keeps_height() {
        let mut sl = SkipList::with_generator(Replay::new(4, vec![3, 1, 4]));
        sl.insert(5, "a");
        assert_eq!(sl.height_of(&5), Some(3));
        // Overwriting must not draw a new height.
        sl.insert(5, "b");
        assert_eq!(sl.height_of(&5), Some(3));
        sl.insert(6, "c");
        assert_eq!(sl.height_of(&6), Some(1));
        assert_eq!(sl.height(), 3);
        sl.check();
    }

    #[test]
    fn height_tracks_tallest_node() {
        let mut sl = SkipList::with_generator(Replay::new(8, vec![2, 7, 1, 4]));
        for key in 0..4 {
            sl.insert(key, key);
        }
        assert_eq!(sl.height(), 7);
        assert!(sl.erase(&1));
        assert_eq!(sl.height(), 4);
        assert!(sl.erase(&3));
        assert_eq!(sl.height(), 2);
        assert!(sl.erase(&0));
        assert_eq!(sl.height(), 1);
        assert!(sl.erase(&2));
        assert_eq!(sl.height(), 1);
        sl.check();
    }

    #[test]
    fn matches_btreemap() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let mut sl = SkipList::with_config(Config::default().with_seed(7))?;
        let mut model = BTreeMap::new();

        for round in 0..5_000 {
            let key = rng.random_range(0..500_u32);
            if rng.random_ratio(1, 3) {
                assert_eq!(sl.erase(&key), model.remove(&key).is_some());
            } else {
                let value = rng.random::<u64>();
                sl.insert(key, value);
                model.insert(key, value);
            }
            if round % 500 == 0 {
                sl.check();
            }
        }
        sl.check();

        assert_eq!(sl.len(), model.len());
        let entries: Vec<_> = sl.iter().map(|(&k, &v)| (k, v)).collect();
        let expected: Vec<_> = model.into_iter().collect();
        assert_eq!(entries, expected);
        Ok(())
    }

    #[test]
    fn iter() {
        let size = 1000;
        let sl: SkipList<_, _> = (0..size).rev().map(|x| (x, 2 * x)).collect();
        let mut iter = sl.iter();
        for i in 0..size {
            assert_eq!(iter.next(), Some((&i, &(2 * i))));
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn contains() {
        let (min, max) = (25, 75);
        let sl: SkipList<_, _> = (min..max).map(|x| (x, x)).collect();

        for i in 0..100 {
            assert_eq!(sl.contains_key(&i), (min..max).contains(&i));
        }
    }

    #[test]
    fn debug_display() {
        let sl: SkipList<_, _> = (0..3).map(|x| (x, x * 2)).collect();
        assert_eq!(format!("{sl:?}"), "{0: 0, 1: 2, 2: 4}");
        assert_eq!(format!("{:?}", sl.reader()), "{0: 0, 1: 2, 2: 4}");
    }

    #[test]
    fn reader_sees_writes() {
        let mut sl = SkipList::new();
        let reader = sl.reader();
        assert!(reader.is_empty());
        sl.insert("a", 1);
        assert_eq!(reader.read("a"), Some(1));
        assert_eq!(reader.len(), 1);
        assert!(sl.erase("a"));
        assert!(!reader.contains_key("a"));
        assert_eq!(reader.height(), 1);
    }

    #[test]
    fn reader_outlives_writer() {
        let mut sl = SkipList::new();
        sl.insert(1, String::from("one"));
        let reader = sl.reader();
        drop(sl);
        assert_eq!(reader.get(&1).map(String::as_str), Some("one"));
    }

    #[test]
    fn stale_reference_after_overwrite_and_erase() {
        let mut sl = SkipList::new();
        let reader = sl.reader();
        sl.insert(1, String::from("old"));
        let held = reader.get(&1);
        sl.insert(1, String::from("new"));
        assert!(sl.erase(&1));
        assert_eq!(held.map(String::as_str), Some("old"));
    }

    #[test]
    fn concurrent_readers_with_one_writer() -> Result<()> {
        const KEYS: u32 = 64;
        const READERS: u64 = 4;

        let mut sl: SkipList<u32, String> =
            SkipList::with_config(Config::default().with_seed(11))?;
        let reader = sl.reader();
        let done = AtomicBool::new(false);

        thread::scope(|s| {
            for id in 0..READERS {
                let reader = reader.clone();
                let done = &done;
                s.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(id);
                    while !done.load(Ordering::Acquire) {
                        let key = rng.random_range(0..KEYS);
                        if let Some(value) = reader.read(&key) {
                            let prefix = format!("{key}:");
                            assert!(value.starts_with(&prefix), "{key} -> {value}");
                        }
                        let keys: Vec<u32> = reader.iter().map(|(&k, _)| k).collect();
                        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
                        assert!(keys.iter().all(|&k| k < KEYS));
                    }
                });
            }

            let mut rng = StdRng::seed_from_u64(0xdead_beef);
            for n in 0..20_000_u32 {
                let key = rng.random_range(0..KEYS);
                if rng.random_ratio(1, 3) {
                    sl.erase(&key);
                } else {
                    sl.insert(key, format!("{key}:{n}"));
                }
            }
            done.store(true, Ordering::Release);
        });

        sl.check();
        Ok(())
    }
}
