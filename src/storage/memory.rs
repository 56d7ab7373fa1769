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

//! In-memory record manager
//!
//! [`MemoryStore`] keeps every relation as a vector of encoded tuples and
//! every index as a B-tree from typed [`Key`] to row ids. Row ids are handed
//! out sequentially from 1 and never reused.
//!
//! Scans hold a reference-counted snapshot of the row vector, so an open scan
//! never observes rows inserted after it was opened and never blocks writers.
//! Index scans do the same with the index tree and walk it one key at a
//! time, so a full-range probe buffers nothing beyond its cursor.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::{
    position_of, Attribute, DataType, Error, Key, Result, Tuple, TupleLayout, Value,
    DEFAULT_MAX_TUPLE_SIZE,
};

use super::traits::{IndexScanner, KeyRange, RecordManager, RecordScanner, RowId};

/// Rows shared between a table and its open scans
type RowVec = Arc<Vec<(RowId, Tuple)>>;

/// Index tree shared between an index and its open range scans
type IndexTree = Arc<BTreeMap<Key, Vec<RowId>>>;

struct IndexData {
    column: usize,
    key_type: DataType,
    entries: IndexTree,
}

impl IndexData {
    fn add(&mut self, key: Key, rid: RowId) {
        Arc::make_mut(&mut self.entries)
            .entry(key)
            .or_default()
            .push(rid);
    }
}

struct TableData {
    attrs: Vec<Attribute>,
    layout: TupleLayout,
    rows: RowVec,
    indexes: FxHashMap<String, IndexData>,
}

/// Reference in-memory implementation of [`RecordManager`]
pub struct MemoryStore {
    tables: RwLock<FxHashMap<String, TableData>>,
    max_tuple_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(FxHashMap::default()),
            max_tuple_size: DEFAULT_MAX_TUPLE_SIZE,
        }
    }

    /// Builder method to set the largest tuple `insert` accepts
    pub fn with_max_tuple_size(mut self, max: usize) -> Self {
        self.max_tuple_size = max;
        self
    }

    /// Register a relation
    pub fn create_table(&self, name: &str, attrs: Vec<Attribute>) -> Result<()> {
        for (i, attr) in attrs.iter().enumerate() {
            if attrs[..i].iter().any(|a| a.name == attr.name) {
                return Err(Error::invalid_argument(format!(
                    "duplicate attribute '{}' in table '{}'",
                    attr.name, name
                )));
            }
        }

        let mut tables = self.tables.write();
        if tables.contains_key(name) {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }
        let layout = TupleLayout::new(&attrs).with_max_tuple_size(self.max_tuple_size);
        tables.insert(
            name.to_string(),
            TableData {
                attrs,
                layout,
                rows: Arc::new(Vec::new()),
                indexes: FxHashMap::default(),
            },
        );
        Ok(())
    }

    /// Encode and append a row, returning its row id
    pub fn insert(&self, table: &str, values: &[Value]) -> Result<RowId> {
        let mut tables = self.tables.write();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;

        let tuple = data.layout.encode(values)?;

        // Build every index key before touching the table so a rejected key
        // leaves no partial row behind.
        let mut keys = Vec::with_capacity(data.indexes.len());
        for (name, index) in &data.indexes {
            keys.push((name.clone(), Key::typed(&values[index.column], index.key_type)?));
        }

        let rid = data.rows.len() as RowId + 1;
        Arc::make_mut(&mut data.rows).push((rid, tuple));
        for (name, key) in keys {
            if let Some(index) = data.indexes.get_mut(&name) {
                index.add(key, rid);
            }
        }
        Ok(rid)
    }

    /// Build a B-tree index on `table.attribute` over the existing rows
    pub fn create_index(&self, table: &str, attribute: &str) -> Result<()> {
        let mut tables = self.tables.write();
        let data = tables
            .get_mut(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        if data.indexes.contains_key(attribute) {
            return Err(Error::invalid_argument(format!(
                "index on '{}.{}' already exists",
                table, attribute
            )));
        }

        let column = position_of(&data.attrs, attribute)?;
        let key_type = data.attrs[column].data_type;
        let mut index = IndexData {
            column,
            key_type,
            entries: Arc::new(BTreeMap::new()),
        };
        for (rid, tuple) in data.rows.iter() {
            let value = data.layout.field(tuple, column)?;
            index.add(Key::typed(&value, key_type)?, *rid);
        }
        data.indexes.insert(attribute.to_string(), index);
        Ok(())
    }

    /// Number of rows stored in `table`
    pub fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.tables.read();
        tables
            .get(table)
            .map(|t| t.rows.len())
            .ok_or_else(|| Error::TableNotFound(table.to_string()))
    }

    /// Names of every registered relation, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl RecordManager for MemoryStore {
    fn attributes(&self, table: &str) -> Result<Vec<Attribute>> {
        let tables = self.tables.read();
        tables
            .get(table)
            .map(|t| t.attrs.clone())
            .ok_or_else(|| Error::TableNotFound(table.to_string()))
    }

    fn scan(&self, table: &str) -> Result<Box<dyn RecordScanner>> {
        let tables = self.tables.read();
        let data = tables
            .get(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        Ok(Box::new(MemoryScanner {
            rows: Arc::clone(&data.rows),
            pos: 0,
            closed: false,
        }))
    }

    fn read_tuple(&self, table: &str, rid: RowId) -> Result<Tuple> {
        let tables = self.tables.read();
        let data = tables
            .get(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        usize::try_from(rid - 1)
            .ok()
            .and_then(|i| data.rows.get(i))
            .filter(|(id, _)| *id == rid)
            .map(|(_, tuple)| tuple.clone())
            .ok_or_else(|| Error::storage(format!("row {} not found in '{}'", rid, table)))
    }

    fn index_scan(
        &self,
        table: &str,
        attribute: &str,
        range: KeyRange,
    ) -> Result<Box<dyn IndexScanner>> {
        let tables = self.tables.read();
        let data = tables
            .get(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        let index = data
            .indexes
            .get(attribute)
            .ok_or_else(|| Error::IndexNotFound {
                table: table.to_string(),
                column: attribute.to_string(),
            })?;

        let scanner = match key_bounds(&range, index.key_type)? {
            Some((low, high)) => MemoryIndexScanner {
                entries: Arc::clone(&index.entries),
                low,
                high,
                current: None,
                done: false,
            },
            None => MemoryIndexScanner {
                entries: Arc::clone(&index.entries),
                low: Bound::Unbounded,
                high: Bound::Unbounded,
                current: None,
                done: true,
            },
        };
        Ok(Box::new(scanner))
    }
}

/// Convert a value range to B-tree bounds, or `None` for an empty range
fn key_bounds(range: &KeyRange, key_type: DataType) -> Result<Option<(Bound<Key>, Bound<Key>)>> {
    let low = match &range.low {
        Some(v) if range.low_inclusive => Bound::Included(Key::typed(v, key_type)?),
        Some(v) => Bound::Excluded(Key::typed(v, key_type)?),
        None => Bound::Unbounded,
    };
    let high = match &range.high {
        Some(v) if range.high_inclusive => Bound::Included(Key::typed(v, key_type)?),
        Some(v) => Bound::Excluded(Key::typed(v, key_type)?),
        None => Bound::Unbounded,
    };

    // BTreeMap::range panics on inverted bounds
    let both_inclusive = range.low_inclusive && range.high_inclusive;
    if let (Bound::Included(l) | Bound::Excluded(l), Bound::Included(h) | Bound::Excluded(h)) =
        (&low, &high)
    {
        match l.cmp(h) {
            Ordering::Greater => return Ok(None),
            Ordering::Equal if !both_inclusive => return Ok(None),
            _ => {}
        }
    }
    Ok(Some((low, high)))
}

struct MemoryScanner {
    rows: RowVec,
    pos: usize,
    closed: bool,
}

impl RecordScanner for MemoryScanner {
    fn next(&mut self) -> Result<Option<(RowId, Tuple)>> {
        if self.closed {
            return Ok(None);
        }
        match self.rows.get(self.pos) {
            Some(row) => {
                self.pos += 1;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.pos = 0;
        self.closed = false;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Cursor over a snapshot of one index tree
///
/// Holds the key being read and the offset into its row ids; the next key is
/// looked up in the tree only once the current one is used up.
struct MemoryIndexScanner {
    entries: IndexTree,
    low: Bound<Key>,
    high: Bound<Key>,
    current: Option<(Key, usize)>,
    done: bool,
}

impl IndexScanner for MemoryIndexScanner {
    fn next_entry(&mut self) -> Result<Option<(RowId, Value)>> {
        loop {
            if self.done {
                return Ok(None);
            }
            if let Some((key, pos)) = self.current.as_mut() {
                if let Some(rid) = self.entries.get(key).and_then(|rids| rids.get(*pos)) {
                    *pos += 1;
                    return Ok(Some((*rid, key.to_value())));
                }
            }
            if let Some((key, _)) = self.current.take() {
                self.low = Bound::Excluded(key);
            }
            match self
                .entries
                .range((self.low.clone(), self.high.clone()))
                .next()
            {
                Some((key, _)) => self.current = Some((key.clone(), 0)),
                None => self.done = true,
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.done = true;
        Ok(())
    }
}
