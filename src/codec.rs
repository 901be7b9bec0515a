//! Text encoding of keys and values for snapshots.
//!
//! A snapshot stores keys and values as strings. The conversion is supplied
//! by the caller through a [`Codec`], which must round-trip exactly every key
//! and value the caller intends to store.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;

use crate::error::{CodecError, Field};

/// Converts keys and values of one type pair to and from text.
pub trait Codec<K, V> {
    /// Encode a key.
    fn serialize_key(&self, key: &K) -> String;

    /// Encode a value.
    fn serialize_value(&self, value: &V) -> String;

    /// Decode a key previously produced by
    /// [`serialize_key`][Codec::serialize_key].
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if `text` is not a valid encoding.
    fn deserialize_to_key(&self, text: &str) -> Result<K, CodecError>;

    /// Decode a value previously produced by
    /// [`serialize_value`][Codec::serialize_value].
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if `text` is not a valid encoding.
    fn deserialize_to_value(&self, text: &str) -> Result<V, CodecError>;
}

impl<K, V, C: Codec<K, V> + ?Sized> Codec<K, V> for &C {
    #[inline]
    fn serialize_key(&self, key: &K) -> String {
        (**self).serialize_key(key)
    }

    #[inline]
    fn serialize_value(&self, value: &V) -> String {
        (**self).serialize_value(value)
    }

    #[inline]
    fn deserialize_to_key(&self, text: &str) -> Result<K, CodecError> {
        (**self).deserialize_to_key(text)
    }

    #[inline]
    fn deserialize_to_value(&self, text: &str) -> Result<V, CodecError> {
        (**self).deserialize_to_value(text)
    }
}

/// A [`Codec`] for any key and value types that print with [`Display`] and
/// parse with [`FromStr`].
///
/// # Examples
///
/// ```
/// use memskip::{Codec, TextCodec};
///
/// let codec: TextCodec<u32, f64> = TextCodec::new();
/// assert_eq!(codec.serialize_key(&7), "7");
/// assert_eq!(codec.deserialize_to_value("2.5"), Ok(2.5));
/// assert!(codec.deserialize_to_key("seven").is_err());
/// ```
pub struct TextCodec<K, V> {
    _types: PhantomData<fn() -> (K, V)>,
}

/// The integer-key, string-value codec.
pub type BasicCodec = TextCodec<i32, String>;

impl<K, V> TextCodec<K, V> {
    /// Create a new text codec.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        TextCodec {
            _types: PhantomData,
        }
    }
}

impl<K, V> Default for TextCodec<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for TextCodec<K, V> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for TextCodec<K, V> {}

impl<K, V> std::fmt::Debug for TextCodec<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TextCodec")
    }
}

impl<K, V> Codec<K, V> for TextCodec<K, V>
where
    K: Display + FromStr,
    K::Err: Display,
    V: Display + FromStr,
    V::Err: Display,
{
    #[inline]
    fn serialize_key(&self, key: &K) -> String {
        key.to_string()
    }

    #[inline]
    fn serialize_value(&self, value: &V) -> String {
        value.to_string()
    }

    #[inline]
    fn deserialize_to_key(&self, text: &str) -> Result<K, CodecError> {
        text.parse()
            .map_err(|err| CodecError::new(Field::Key, text, err))
    }

    #[inline]
    fn deserialize_to_value(&self, text: &str) -> Result<V, CodecError> {
        text.parse()
            .map_err(|err| CodecError::new(Field::Value, text, err))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{BasicCodec, Codec, TextCodec};
    use crate::error::Field;

    #[rstest]
    #[case(0)]
    #[case(-17)]
    #[case(i32::MAX)]
    #[case(i32::MIN)]
    fn basic_keys(#[case] key: i32) {
        let codec = BasicCodec::new();
        let text = codec.serialize_key(&key);
        assert_eq!(text, key.to_string());
        assert_eq!(codec.deserialize_to_key(&text), Ok(key));
    }

    #[rstest]
    #[case("")]
    #[case("plain")]
    #[case("with spaces and \"quotes\"")]
    #[case("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ")]
    fn basic_values(#[case] value: &str) {
        let codec = BasicCodec::new();
        assert_eq!(codec.serialize_value(&value.to_owned()), value);
        assert_eq!(codec.deserialize_to_value(value), Ok(value.to_owned()));
    }

    #[test]
    fn unparsable_key() {
        let codec = BasicCodec::new();
        let err = codec.deserialize_to_key("12a").unwrap_err();
        assert_eq!(err.field, Field::Key);
        assert_eq!(err.text, "12a");
    }

    #[test]
    fn unparsable_value() {
        let codec: TextCodec<String, u8> = TextCodec::new();
        let err = codec.deserialize_to_value("256").unwrap_err();
        assert_eq!(err.field, Field::Value);
        assert_eq!(err.reason, "number too large to fit in target type");
    }

    #[test]
    fn by_reference() {
        fn encode<C: Codec<i32, String>>(codec: C) -> String {
            codec.serialize_key(&5)
        }
        let codec = BasicCodec::new();
        assert_eq!(encode(&codec), "5");
    }
}
