//! String-keyed request and response metadata.
//!
//! grpc-web carries metadata as HTTP headers on the way out and as an
//! HTTP/1-style header block inside the trailer frame on the way back.
//! [`Metadata`] is a plain table keyed by header name. Header names are
//! case-insensitive, so keys are stored lowercase and lookups fold case;
//! inserting an existing key in any casing replaces the earlier value.

use std::collections::BTreeMap;

/// A string-keyed, string-valued mapping of headers or trailers.
///
/// Keys are ASCII-lowercased on insert.
///
/// ```
/// use grpcweb::metadata::Metadata;
///
/// let mut headers = Metadata::new();
/// headers.insert("Content-Type", "application/grpc-web");
/// headers.insert("content-type", "application/grpc-web-text");
/// assert_eq!(headers.len(), 1);
/// assert_eq!(headers.get("CONTENT-TYPE"), Some("application/grpc-web-text"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Insert `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let mut key = key.into();
        key.make_ascii_lowercase();
        self.entries.insert(key, value.into())
    }

    /// Look up the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&fold(key)).map(String::as_str)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> { self.entries.remove(&fold(key)) }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool { self.entries.contains_key(&fold(key)) }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Iterate over entries in key order. Keys are lowercase.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy every entry of `other` into this table, overwriting duplicates.
    pub fn merge(&mut self, other: &Metadata) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }
}

fn fold(key: &str) -> String { key.to_ascii_lowercase() }

impl<K, V> FromIterator<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Self::new();
        metadata.extend(iter);
        metadata
    }
}

impl<K, V> Extend<(K, V)> for Metadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Metadata {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter { self.entries.into_iter() }
}

/// Parse an HTTP/1-style header block such as a trailer frame payload.
///
/// Lines are separated by `\r\n`. Each non-empty line is split on its first
/// `:` and both halves are trimmed. Lines without a `:` are skipped. A
/// repeated key keeps its last value. Invalid UTF-8 is replaced rather than
/// rejected.
///
/// # Examples
///
/// ```
/// use grpcweb::metadata::parse_header_block;
///
/// let trailers = parse_header_block(b"grpc-status: 0\r\ngrpc-message: ok\r\n");
/// assert_eq!(trailers.get("grpc-status"), Some("0"));
/// assert_eq!(trailers.get("grpc-message"), Some("ok"));
/// ```
#[must_use]
pub fn parse_header_block(block: &[u8]) -> Metadata {
    let text = String::from_utf8_lossy(block);
    text.split("\r\n")
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Metadata, parse_header_block};

    #[test]
    fn splits_on_first_colon_only() {
        let parsed = parse_header_block(b"x-url: http://example.com:8080\r\n");
        assert_eq!(parsed.get("x-url"), Some("http://example.com:8080"));
    }

    #[test]
    fn last_duplicate_wins() {
        let parsed = parse_header_block(b"k: first\r\nk: second\r\n");
        assert_eq!(parsed.get("k"), Some("second"));
        assert_eq!(parsed.len(), 1);
    }

    #[rstest]
    #[case::empty(b"", 0)]
    #[case::blank_lines(b"\r\n\r\n", 0)]
    #[case::no_colon(b"garbage\r\nk:v\r\n", 1)]
    #[case::no_trailing_crlf(b"a:1\r\nb:2", 2)]
    fn counts_entries(#[case] block: &[u8], #[case] expected: usize) {
        assert_eq!(parse_header_block(block).len(), expected);
    }

    #[test]
    fn trims_whitespace_around_key_and_value() {
        let parsed = parse_header_block(b"  grpc-status :  10  \r\n");
        assert_eq!(parsed.get("grpc-status"), Some("10"));
    }

    #[test]
    fn merge_overwrites_existing_keys() {
        let mut base: Metadata = [("a", "1"), ("b", "2")].into_iter().collect();
        let overrides: Metadata = [("b", "3")].into_iter().collect();
        base.merge(&overrides);
        assert_eq!(base.get("a"), Some("1"));
        assert_eq!(base.get("b"), Some("3"));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let mut headers = Metadata::new();
        assert_eq!(headers.insert("Content-Type", "a"), None);
        assert_eq!(headers.insert("content-type", "b"), Some("a".to_owned()));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("b"));
        assert!(headers.contains_key("Content-type"));
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("content-type", "b")]);
        assert_eq!(headers.remove("Content-Type"), Some("b".to_owned()));
        assert!(headers.is_empty());
    }

    #[test]
    fn header_block_names_are_folded() {
        let parsed = parse_header_block(b"Grpc-Status: 3
grpc-status: 4
");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("grpc-status"), Some("4"));
    }

    #[test]
    fn merge_overrides_across_casing() {
        let mut base: Metadata = [("X-Grpc-Web", "1")].into_iter().collect();
        let overrides: Metadata = [("x-grpc-web", "0")].into_iter().collect();
        base.merge(&overrides);
        assert_eq!(base.len(), 1);
        assert_eq!(base.get("X-Grpc-Web"), Some("0"));
    }
}
