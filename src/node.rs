use std::cell::UnsafeCell;
use std::fmt;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicPtr, Ordering};

// ////////////////////////////////////////////////////////////////////////////
// Tower
// ////////////////////////////////////////////////////////////////////////////

/// The forward references of a node (or of the head sentinel), one per level
/// the owner participates in.
///
/// The length of a tower is fixed at construction and is the owner's height.
/// Slot `l` points at the next node on level `l`, or is null at the end of
/// that level.
///
/// Every slot load is `Acquire` and every slot store is `Release`, so a
/// reader that observes a node through a slot also observes everything the
/// writer did to that node before linking it.
pub(crate) struct Tower<K, V> {
    links: Box<[AtomicPtr<Node<K, V>>]>,
}

impl<K, V> Tower<K, V> {
    /// A tower of `height` empty links.
    pub fn empty(height: usize) -> Self {
        Self::from_links((0..height).map(|_| ptr::null_mut()))
    }

    /// A tower whose slots are initialised, in order, from `links`.
    pub fn from_links(links: impl Iterator<Item = *mut Node<K, V>>) -> Self {
        Tower {
            links: links.map(AtomicPtr::new).collect(),
        }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.links.len()
    }

    /// The raw forward reference at `level`.
    #[inline]
    pub fn next_ptr(&self, level: usize) -> *mut Node<K, V> {
        self.links[level].load(Ordering::Acquire)
    }

    /// The next node at `level`, if any.
    #[inline]
    pub fn next(&self, level: usize) -> Option<&Node<K, V>> {
        // SAFETY: every non-null link points into the node store, which keeps
        // nodes alive for as long as the structure owning this tower.
        unsafe { self.next_ptr(level).as_ref() }
    }

    /// Publish `node` as the next node at `level`.
    #[inline]
    pub fn set_next(&self, level: usize, node: *mut Node<K, V>) {
        self.links[level].store(node, Ordering::Release);
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Node
// ////////////////////////////////////////////////////////////////////////////

/// A key-value entry of the skiplist.
///
/// The key and height are fixed for the node's lifetime. The value sits
/// behind an atomic pointer so that the writer can replace it as a whole while
/// readers are looking at it; readers see either the old or the new value,
/// never a mix.
pub(crate) struct Node<K, V> {
    key: K,
    value: AtomicPtr<V>,
    tower: Tower<K, V>,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, tower: Tower<K, V>) -> Self {
        Node {
            key,
            value: AtomicPtr::new(Box::into_raw(Box::new(value))),
            tower,
        }
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &V {
        // SAFETY: the pointer always comes from `Box::into_raw`. Replaced
        // values are retired to the node store rather than freed, so the
        // reference stays valid for as long as the node does.
        unsafe { &*self.value.load(Ordering::Acquire) }
    }

    /// Swap in `value`, returning the superseded allocation.
    ///
    /// The caller is responsible for retiring the returned pointer.
    #[inline]
    #[must_use = "the superseded value must be retired"]
    pub fn replace_value(&self, value: V) -> NonNull<V> {
        let old = self
            .value
            .swap(Box::into_raw(Box::new(value)), Ordering::AcqRel);
        // SAFETY: the slot is never null.
        unsafe { NonNull::new_unchecked(old) }
    }

    #[inline]
    pub fn tower(&self) -> &Tower<K, V> {
        &self.tower
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.tower.height()
    }

    #[inline]
    pub fn next(&self, level: usize) -> Option<&Self> {
        self.tower.next(level)
    }
}

impl<K, V> Drop for Node<K, V> {
    fn drop(&mut self) {
        // SAFETY: the current value is owned exclusively by the node.
        drop(unsafe { Box::from_raw(*self.value.get_mut()) });
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("value", self.value())
            .field("height", &self.height())
            .finish()
    }
}

// ////////////////////////////////////////////////////////////////////////////
// NodeStore
// ////////////////////////////////////////////////////////////////////////////

/// Append-only owner of every node ever allocated for a skiplist, along with
/// every value that has been overwritten.
///
/// Nothing is released until the store itself is dropped. Erased nodes and
/// replaced values may still be in the hands of a concurrent reader, and
/// keeping them alive until teardown is what makes those reads sound without
/// any reclamation scheme.
pub(crate) struct NodeStore<K, V> {
    nodes: UnsafeCell<Vec<NonNull<Node<K, V>>>>,
    retired: UnsafeCell<Vec<NonNull<V>>>,
}

impl<K, V> NodeStore<K, V> {
    pub fn new() -> Self {
        NodeStore {
            nodes: UnsafeCell::new(Vec::new()),
            retired: UnsafeCell::new(Vec::new()),
        }
    }

    /// Take ownership of `node`, returning its stable address.
    ///
    /// # Safety
    ///
    /// Must only be called by the single writer, and never concurrently with
    /// [`NodeStore::retire`].
    pub unsafe fn alloc(&self, node: Node<K, V>) -> NonNull<Node<K, V>> {
        let node = NonNull::from(Box::leak(Box::new(node)));
        // SAFETY: the caller guarantees exclusive access to the registry.
        unsafe { (*self.nodes.get()).push(node) };
        node
    }

    /// Take ownership of a superseded value.
    ///
    /// # Safety
    ///
    /// Same contract as [`NodeStore::alloc`]; `value` must come from
    /// [`Node::replace_value`].
    pub unsafe fn retire(&self, value: NonNull<V>) {
        // SAFETY: the caller guarantees exclusive access to the registry.
        unsafe { (*self.retired.get()).push(value) };
    }
}

impl<K, V> Drop for NodeStore<K, V> {
    fn drop(&mut self) {
        for node in self.nodes.get_mut().drain(..) {
            // SAFETY: allocated through `Box` in `alloc`, and dropped exactly
            // once here.
            drop(unsafe { Box::from_raw(node.as_ptr()) });
        }
        for value in self.retired.get_mut().drain(..) {
            // SAFETY: allocated through `Box` in `Node::replace_value`.
            drop(unsafe { Box::from_raw(value.as_ptr()) });
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
