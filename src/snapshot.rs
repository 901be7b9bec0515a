//! Dumping a skiplist to, and reloading it from, a JSON snapshot.
//!
//! A snapshot is a JSON array with one object per key, in ascending key
//! order:
//!
//! ```json
//! [{"NODE_KEY":"1","NODE_VALUE":"a","NODE_HEIGHT":2}]
//! ```
//!
//! Keys and values are stored as text produced by a [`Codec`]. The height is
//! stored alongside so that reloading reproduces the exact level structure
//! rather than drawing fresh random heights.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::height_generator::HeightGenerator;
use crate::skiplist::{Nodes, Reader, SkipList};

/// One entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// The encoded key.
    #[serde(rename = "NODE_KEY")]
    pub key: String,
    /// The encoded value.
    #[serde(rename = "NODE_VALUE")]
    pub value: String,
    /// The number of levels the node participated in.
    #[serde(rename = "NODE_HEIGHT")]
    pub height: usize,
}

impl Record {
    /// Validate the height and decode the key and value.
    fn decode<K, V, C>(self, codec: &C, index: usize, max_height: usize) -> Result<(K, V, usize)>
    where
        C: Codec<K, V> + ?Sized,
    {
        if !(1..=max_height).contains(&self.height) {
            return Err(Error::MalformedRecord {
                index,
                reason: format!("height {} is outside [1, {max_height}]", self.height),
            });
        }
        let key = codec
            .deserialize_to_key(&self.key)
            .map_err(|source| Error::Codec { index, source })?;
        let value = codec
            .deserialize_to_value(&self.value)
            .map_err(|source| Error::Codec { index, source })?;
        Ok((key, value, self.height))
    }
}

// ///////////////////////////////////////////////
// Dump
// ///////////////////////////////////////////////

fn dump_nodes<K, V, C, W>(nodes: Nodes<'_, K, V>, codec: &C, writer: W) -> Result<usize>
where
    C: Codec<K, V> + ?Sized,
    W: Write,
{
    let records: Vec<Record> = nodes
        .map(|node| Record {
            key: codec.serialize_key(node.key()),
            value: codec.serialize_value(node.value()),
            height: node.height(),
        })
        .collect();

    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, &records).map_err(|err| Error::Io(err.into()))?;
    writer.flush()?;

    debug!(records = records.len(), "dumped snapshot");
    Ok(records.len())
}

impl<K, V, G> SkipList<K, V, G> {
    /// Write every entry, in ascending key order, to `writer`.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use memskip::{BasicCodec, SkipList};
    ///
    /// let mut list = SkipList::new();
    /// list.insert(1, String::from("a"));
    ///
    /// let mut out = Vec::new();
    /// assert_eq!(list.dump(&BasicCodec::new(), &mut out).unwrap(), 1);
    /// assert!(String::from_utf8(out).unwrap().starts_with(r#"[{"NODE_KEY":"1","NODE_VALUE":"a""#));
    /// ```
    pub fn dump<C, W>(&self, codec: &C, writer: W) -> Result<usize>
    where
        C: Codec<K, V> + ?Sized,
        W: Write,
    {
        dump_nodes(self.nodes(), codec, writer)
    }

    /// Write a snapshot to the file at `path`, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created or written.
    pub fn dump_to<C, P>(&self, codec: &C, path: P) -> Result<usize>
    where
        C: Codec<K, V> + ?Sized,
        P: AsRef<Path>,
    {
        self.dump(codec, File::create(path)?)
    }
}

impl<K, V> Reader<K, V> {
    /// Write every entry, in ascending key order, to `writer`.
    ///
    /// Running concurrently with the writer, the snapshot is not a single
    /// point in time: each record holds a key that was present during the
    /// dump together with one of the values it held, and the records stay in
    /// strictly ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if writing fails.
    pub fn dump<C, W>(&self, codec: &C, writer: W) -> Result<usize>
    where
        C: Codec<K, V> + ?Sized,
        W: Write,
    {
        dump_nodes(self.nodes(), codec, writer)
    }

    /// Write a snapshot to the file at `path`, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be created or written.
    pub fn dump_to<C, P>(&self, codec: &C, path: P) -> Result<usize>
    where
        C: Codec<K, V> + ?Sized,
        P: AsRef<Path>,
    {
        self.dump(codec, File::create(path)?)
    }
}

// ///////////////////////////////////////////////
// Load
// ///////////////////////////////////////////////

/// Parse and decode every record, failing on the first bad one.
fn decode_all<K, V, C, R>(codec: &C, reader: R, max_height: usize) -> Result<Vec<(K, V, usize)>>
where
    C: Codec<K, V> + ?Sized,
    R: Read,
{
    let documents: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(reader))
        .map_err(|err| {
            if err.is_io() {
                Error::Io(err.into())
            } else {
                Error::MalformedSnapshot(err)
            }
        })?;

    documents
        .into_iter()
        .enumerate()
        .map(|(index, document)| {
            let record: Record =
                serde_json::from_value(document).map_err(|err| Error::MalformedRecord {
                    index,
                    reason: err.to_string(),
                })?;
            record.decode(codec, index, max_height)
        })
        .collect()
}

impl<K: Ord, V, G: HeightGenerator> SkipList<K, V, G> {
    /// Insert every record read from `reader`, in order, using each record's
    /// stored height.
    ///
    /// All records are validated before any is inserted, so on error the
    /// list is left untouched. Existing keys are overwritten.
    ///
    /// Returns the number of records loaded.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if reading fails.
    /// - [`Error::MalformedSnapshot`] if the input is not a JSON array.
    /// - [`Error::MalformedRecord`] if a record lacks a field or its height is
    ///   outside `[1, max_height]`.
    /// - [`Error::Codec`] if a key or value cannot be decoded.
    pub fn load<C, R>(&mut self, codec: &C, reader: R) -> Result<usize>
    where
        C: Codec<K, V> + ?Sized,
        R: Read,
    {
        let entries = decode_all(codec, reader, self.max_height())
            .inspect_err(|err| warn!(%err, "rejected snapshot"))?;
        let count = entries.len();
        for (key, value, height) in entries {
            self.insert_with_height(key, value, height);
        }
        debug!(records = count, height = self.height(), "loaded snapshot");
        Ok(count)
    }

    /// Load a snapshot from the file at `path`.
    ///
    /// # Errors
    ///
    /// See [`SkipList::load`]; additionally [`Error::Io`] if the file cannot
    /// be opened.
    pub fn load_from<C, P>(&mut self, codec: &C, path: P) -> Result<usize>
    where
        C: Codec<K, V> + ?Sized,
        P: AsRef<Path>,
    {
        self.load(codec, File::open(path)?)
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
