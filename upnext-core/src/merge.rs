//! Configuration tree and deep-merge engine.
//!
//! Display configuration is an untyped tree of mappings, sequences and
//! scalars with no fixed schema; user config is layered over the built-in
//! defaults by [`merge`]. Mergeability is decided by the variant tag:
//! only mappings and sequences merge, everything else (including
//! [`Scalar::Pattern`] and [`Scalar::Timestamp`], despite their inner
//! structure) is atomic and replaced wholesale.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A node in a configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Mapping(BTreeMap<String, Value>),
    Sequence(Vec<Value>),
    Scalar(Scalar),
}

/// Leaf values. `Pattern` and `Timestamp` exist as distinct tags so the
/// merge engine can treat them as atomic rather than walking into them.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A verbatim match pattern (e.g. a calendar-name filter).
    Pattern(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Build a mapping from key/value pairs.
    pub fn mapping<I, K>(entries: I) -> Value
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }

    /// Build a sequence from values.
    pub fn sequence<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Sequence(items.into_iter().collect())
    }

    /// Whether a merge may recurse into this value.
    pub fn is_mergeable(&self) -> bool {
        matches!(self, Value::Mapping(_) | Value::Sequence(_))
    }

    /// Look up a direct child of a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Look up a nested value by dotted path, e.g. `"display.labels.today"`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(self, |node, segment| node.get(segment))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Scalar(Scalar::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::String(s))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(Scalar::Integer(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Scalar(Scalar::Float(f))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

/// Strategy applied when both sides of a merge are sequences.
pub type ArrayMergeFn = fn(&[Value], &[Value], &MergeOptions) -> Vec<Value>;

#[derive(Debug, Clone, Copy)]
pub struct MergeOptions {
    pub array_merge: ArrayMergeFn,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            array_merge: default_array_merge,
        }
    }
}

/// Merge `source` over `target` with the default options.
///
/// The result is always an independent owned tree; nothing in it aliases
/// either input, so shared default trees can be merged from any number of
/// call sites.
pub fn merge(target: &Value, source: &Value) -> Value {
    merge_with(target, source, &MergeOptions::default())
}

/// Merge `source` over `target`.
///
/// - sequence over sequence: combined by `options.array_merge`
/// - sequence over anything else: source replaces target
/// - mapping source: every target key, overlaid by every source key;
///   a key merges recursively only when the source value is mergeable
///   and the target already has that key — otherwise source wins outright
/// - scalar source: replaces target
pub fn merge_with(target: &Value, source: &Value, options: &MergeOptions) -> Value {
    match source {
        Value::Sequence(items) => match target {
            Value::Sequence(existing) => {
                Value::Sequence((options.array_merge)(existing, items, options))
            }
            _ => source.clone(),
        },
        Value::Mapping(entries) => merge_mapping(target, entries, options),
        Value::Scalar(_) => source.clone(),
    }
}

fn merge_mapping(
    target: &Value,
    source: &BTreeMap<String, Value>,
    options: &MergeOptions,
) -> Value {
    let mut merged = BTreeMap::new();

    if let Value::Mapping(entries) = target {
        for (key, value) in entries {
            merged.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in source {
        let existing = target.get(key);
        let combined = match existing {
            Some(base) if value.is_mergeable() => merge_with(base, value, options),
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }

    Value::Mapping(merged)
}

/// Default sequence combination.
///
/// Starts from a copy of the target. A source element merges into the
/// element at its index when it is itself mergeable; a non-mergeable
/// source element is treated as a set member instead — appended when the
/// target does not contain it anywhere, never overwriting by position.
pub fn default_array_merge(
    target: &[Value],
    source: &[Value],
    options: &MergeOptions,
) -> Vec<Value> {
    let mut merged: Vec<Value> = target.to_vec();

    for (index, element) in source.iter().enumerate() {
        if index >= merged.len() {
            merged.push(element.clone());
        } else if element.is_mergeable() {
            merged[index] = merge_with(&target[index], element, options);
        } else if !target.contains(element) {
            merged.push(element.clone());
        }
    }

    merged
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Integer(n) => serializer.serialize_i64(*n),
            Scalar::Float(f) => serializer.serialize_f64(*f),
            Scalar::String(s) | Scalar::Pattern(s) => serializer.serialize_str(s),
            Scalar::Timestamp(t) => serializer.collect_str(&t.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::Scalar(Scalar::String(s)),
            toml::Value::Integer(n) => Value::Scalar(Scalar::Integer(n)),
            toml::Value::Float(f) => Value::Scalar(Scalar::Float(f)),
            toml::Value::Boolean(b) => Value::Scalar(Scalar::Bool(b)),
            toml::Value::Datetime(datetime) => Value::Scalar(scalar_from_datetime(datetime)),
            toml::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            toml::Value::Table(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

/// TOML datetimes come in offset, local and date-only flavors; anything
/// chrono cannot make sense of stays a plain string scalar.
fn scalar_from_datetime(datetime: toml::value::Datetime) -> Scalar {
    let text = datetime.to_string();
    let parsed = DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        });

    match parsed {
        Some(timestamp) => Scalar::Timestamp(timestamp),
        None => Scalar::String(text),
    }
}
