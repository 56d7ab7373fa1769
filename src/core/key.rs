// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Hashable, totally ordered keys
//!
//! [`Value`] only has a partial, type-checked order. Anything that needs a
//! map key (grouping, join partitions, index entries) converts the value to a
//! [`Key`] first. Key conversion rejects non-finite reals, and every keyed
//! container in this module is declared with a single [`DataType`] and
//! refuses keys of any other type, so the variant order that `derive(Ord)`
//! gives `Key` is never observed.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHasher};

use super::error::{Error, Result};
use super::types::DataType;
use super::value::Value;

/// A finite f32 with `-0.0` folded into `0.0`.
///
/// Equality, hashing, and ordering all go through the bit pattern or
/// `total_cmp`, which agree with numeric order once NaN, infinities and
/// negative zero are excluded.
#[derive(Debug, Clone, Copy)]
pub struct RealKey(f32);

impl RealKey {
    /// Create a key from a finite real
    pub fn new(value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::NonFiniteReal);
        }
        Ok(RealKey(if value == 0.0 { 0.0 } else { value }))
    }

    /// The wrapped real
    pub fn get(self) -> f32 {
        self.0
    }
}

impl PartialEq for RealKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for RealKey {}

impl Hash for RealKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for RealKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RealKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Map-key form of a [`Value`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Integer(i32),
    Real(RealKey),
    Text(Arc<[u8]>),
}

impl Key {
    /// Convert a value into a key, rejecting non-finite reals
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Integer(v) => Ok(Key::Integer(*v)),
            Value::Real(v) => Ok(Key::Real(RealKey::new(*v)?)),
            Value::Text(b) => Ok(Key::Text(Arc::clone(b))),
        }
    }

    /// Convert a value into a key of the expected type
    pub fn typed(value: &Value, expected: DataType) -> Result<Self> {
        value.expect_type(expected)?;
        Self::from_value(value)
    }

    /// Returns the data type of this key
    pub fn data_type(&self) -> DataType {
        match self {
            Key::Integer(_) => DataType::Integer,
            Key::Real(_) => DataType::Real,
            Key::Text(_) => DataType::Text,
        }
    }

    /// Convert back into a value
    pub fn to_value(&self) -> Value {
        match self {
            Key::Integer(v) => Value::Integer(*v),
            Key::Real(v) => Value::Real(v.get()),
            Key::Text(b) => Value::Text(Arc::clone(b)),
        }
    }

    /// Assign this key to one of `partitions` hash partitions
    pub fn partition(&self, partitions: usize) -> usize {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        (hasher.finish() % partitions.max(1) as u64) as usize
    }
}

/// Ordered map from a typed key to a per-group state
///
/// Iteration is in ascending key order.
#[derive(Debug)]
pub struct GroupMap<V> {
    key_type: DataType,
    groups: BTreeMap<Key, V>,
}

impl<V> GroupMap<V> {
    /// Create an empty map accepting keys of `key_type`
    pub fn new(key_type: DataType) -> Self {
        Self {
            key_type,
            groups: BTreeMap::new(),
        }
    }

    /// The declared key type
    pub fn key_type(&self) -> DataType {
        self.key_type
    }

    /// Get the state for `value`, inserting `init()` for a new group
    pub fn get_or_insert_with(&mut self, value: &Value, init: impl FnOnce() -> V) -> Result<&mut V> {
        let key = Key::typed(value, self.key_type)?;
        Ok(self.groups.entry(key).or_insert_with(init))
    }

    /// Number of distinct groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no group was inserted
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<V> IntoIterator for GroupMap<V> {
    type Item = (Key, V);
    type IntoIter = std::collections::btree_map::IntoIter<Key, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Hash index from a typed key to every item sharing that exact key
///
/// Items under one key keep their insertion order.
#[derive(Debug)]
pub struct KeyIndex<V> {
    key_type: DataType,
    buckets: FxHashMap<Key, Vec<V>>,
    len: usize,
}

impl<V> KeyIndex<V> {
    /// Create an empty index accepting keys of `key_type`
    pub fn new(key_type: DataType) -> Self {
        Self {
            key_type,
            buckets: FxHashMap::default(),
            len: 0,
        }
    }

    /// Add `item` under `value`
    pub fn insert(&mut self, value: &Value, item: V) -> Result<()> {
        let key = Key::typed(value, self.key_type)?;
        self.buckets.entry(key).or_default().push(item);
        self.len += 1;
        Ok(())
    }

    /// All items stored under `value`, in insertion order
    pub fn get(&self, value: &Value) -> Result<&[V]> {
        let key = Key::typed(value, self.key_type)?;
        Ok(self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Total number of items
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the index holds no items
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }
}
