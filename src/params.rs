//! Request parameters and their wire encoding.
//!
//! A [`ParameterSet`] keeps parameters in insertion order, which is the order
//! they are written on the wire. Canonical (sorted) order is only produced on
//! demand through [`ParameterSet::sorted`] for signing.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

use crate::error::{InfogramError, Result};

/// Form-encoding set: everything except ASCII alphanumerics and `-_.*` is
/// escaped. Space becomes `%20`, never `+`.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*');

/// A single request parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    key: String,
    value: String,
}

impl Parameter {
    /// Create a new parameter
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Parameter {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parameter name
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parameter value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Encode as `key=value`
    pub fn encode(&self) -> String {
        format!("{}={}", percent_encode(&self.key), percent_encode(&self.value))
    }
}

/// Ordered collection of request parameters.
///
/// Duplicate keys are kept and encoded in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        ParameterSet::default()
    }

    /// Append a parameter
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.push(Parameter::new(key, value));
    }

    /// Append a parameter, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Whether any parameter uses `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.iter().any(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Copy of this set sorted ascending by key.
    ///
    /// The sort is stable: parameters sharing a key keep their relative order.
    pub fn sorted(&self) -> ParameterSet {
        let mut params = self.params.clone();
        params.sort_by(|a, b| a.key.cmp(&b.key));
        ParameterSet { params }
    }

    /// Encode as `k1=v1&k2=v2...` in the current order
    pub fn encode(&self) -> String {
        encode(self)
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ParameterSet {
            params: iter
                .into_iter()
                .map(|(k, v)| Parameter::new(k, v))
                .collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.params
            .extend(iter.into_iter().map(|(k, v)| Parameter::new(k, v)));
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

/// Percent-encode a single component (`%20` for space)
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, FORM).to_string()
}

/// Encode a parameter set as `k1=v1&k2=v2...`, keeping the input order
pub fn encode(params: &ParameterSet) -> String {
    params
        .iter()
        .map(Parameter::encode)
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode a `k1=v1&k2=v2...` string back into a parameter set.
///
/// `+` is accepted as a space even though [`encode`] never produces it.
pub fn decode(input: &str) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();
    for pair in input.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.push(decode_component(key)?, decode_component(value)?);
    }
    Ok(params)
}

fn decode_component(input: &str) -> Result<String> {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| InfogramError::Encoding(format!("invalid UTF-8 in {:?}: {}", input, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_is_percent_20() {
        let params = ParameterSet::new().with("title", "a b");
        assert_eq!(encode(&params), "title=a%20b");
    }

    #[test]
    fn test_reserved_characters() {
        let params = ParameterSet::new().with("content", "{}");
        assert_eq!(encode(&params), "content=%7B%7D");

        assert_eq!(percent_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(percent_encode("safe-_.*"), "safe-_.*");
        assert_eq!(percent_encode("~"), "%7E");
        assert_eq!(percent_encode("https://x.io/a"), "https%3A%2F%2Fx.io%2Fa");
    }

    #[test]
    fn test_non_ascii_is_utf8_escaped() {
        assert_eq!(percent_encode("é"), "%C3%A9");
    }

    #[test]
    fn test_encode_keeps_input_order() {
        let params: ParameterSet = vec![("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(params.encode(), "b=2&a=1");
        assert_eq!(params.encode(), params.encode());
    }

    #[test]
    fn test_empty_set_encodes_to_empty_string() {
        assert_eq!(encode(&ParameterSet::new()), "");
    }

    #[test]
    fn test_sorted_is_stable() {
        let params: ParameterSet = vec![("b", "1"), ("a", "x"), ("b", "0"), ("a", "y")]
            .into_iter()
            .collect();
        let sorted = params.sorted();
        let pairs: Vec<(&str, &str)> = sorted.iter().map(|p| (p.key(), p.value())).collect();
        assert_eq!(pairs, vec![("a", "x"), ("a", "y"), ("b", "1"), ("b", "0")]);

        // the original set is untouched
        assert_eq!(params.encode(), "b=1&a=x&b=0&a=y");
    }

    #[test]
    fn test_duplicate_keys_survive() {
        let params = ParameterSet::new().with("tag", "one").with("tag", "two");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("tag"), Some("one"));
        assert_eq!(params.encode(), "tag=one&tag=two");
    }

    #[test]
    fn test_decode_recovers_pairs() {
        let params = ParameterSet::new()
            .with("title", "a b & c")
            .with("content", "{\"x\":1}")
            .with("name", "été");
        let decoded = decode(&params.encode()).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_decode_accepts_plus_and_bare_keys() {
        let decoded = decode("title=a+b&flag").unwrap();
        assert_eq!(decoded.get("title"), Some("a b"));
        assert_eq!(decoded.get("flag"), Some(""));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode("k=%FF").unwrap_err();
        assert!(matches!(err, InfogramError::Encoding(_)));
    }
}
