//! A skiplist is a way of storing elements in such a way that elements can be
//! efficiently accessed, inserted and removed, all in `O(log(n))` on average.
//!
//! Conceptually, a skiplist resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` has references to nodes further down the list,
//! allowing the algorithm to effectively skip ahead.
//!
//! This crate provides a [`SkipList`] suited to use as a memtable: exactly one
//! writer inserts and erases, while any number of [`Reader`]s look keys up
//! concurrently without taking a lock. Every forward reference is published
//! with release ordering and read with acquire ordering, and erased nodes are
//! kept alive until the whole list is dropped, so readers never touch freed
//! memory.
//!
//! The contents can be dumped to a JSON snapshot and reloaded with identical
//! per-key heights; see [`SkipList::dump`] and [`SkipList::load`].
//!
//! ```
//! use memskip::{BasicCodec, SkipList};
//!
//! let mut list = SkipList::new();
//! list.insert(2, String::from("b"));
//! list.insert(1, String::from("a"));
//!
//! let mut snapshot = Vec::new();
//! list.dump(&BasicCodec::new(), &mut snapshot).unwrap();
//!
//! let mut restored = SkipList::new();
//! restored.load(&BasicCodec::new(), snapshot.as_slice()).unwrap();
//! assert_eq!(restored.read(&1), Some(String::from("a")));
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod height_generator;
mod node;
pub mod skiplist;
pub mod snapshot;

pub use codec::{BasicCodec, Codec, TextCodec};
pub use config::Config;
pub use error::{CodecError, Error, Field, Result};
pub use height_generator::{Geometric, GeometricError, HeightGenerator};
pub use skiplist::{Iter, Reader, SkipList};
pub use snapshot::Record;
