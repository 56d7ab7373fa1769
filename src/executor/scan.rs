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

//! Leaf operators reading relations through a [`RecordManager`]
//!
//! Both adapters rename every attribute to `alias.attribute`, where the alias
//! defaults to the table name, so that join outputs have unambiguous names.

use std::sync::Arc;

use crate::core::{position_of, Attribute, DataType, Error, Result, Tuple, Value};
use crate::storage::{IndexScanner, KeyRange, RecordManager, RecordScanner, RowId};

use super::operator::Operator;

fn qualified_schema(attrs: &[Attribute], prefix: &str) -> Vec<Attribute> {
    attrs.iter().map(|a| a.qualified(prefix)).collect()
}

/// Full, restartable scan of one relation
pub struct TableScan {
    store: Arc<dyn RecordManager>,
    table: String,
    schema: Vec<Attribute>,
    scanner: Option<Box<dyn RecordScanner>>,
    done: bool,
}

impl TableScan {
    pub fn new(store: Arc<dyn RecordManager>, table: &str, alias: Option<&str>) -> Result<Self> {
        let attrs = store.attributes(table)?;
        let schema = qualified_schema(&attrs, alias.unwrap_or(table));
        Ok(Self {
            store,
            table: table.to_string(),
            schema,
            scanner: None,
            done: false,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Restart at the first record.
    pub fn rewind(&mut self) -> Result<()> {
        let scanner = self
            .scanner
            .as_mut()
            .ok_or_else(|| Error::not_open("TableScan"))?;
        scanner.rewind()?;
        self.done = false;
        Ok(())
    }
}

impl Operator for TableScan {
    fn open(&mut self) -> Result<()> {
        match self.scanner.as_mut() {
            Some(scanner) => scanner.rewind()?,
            None => self.scanner = Some(self.store.scan(&self.table)?),
        }
        self.done = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        let scanner = self
            .scanner
            .as_mut()
            .ok_or_else(|| Error::not_open("TableScan"))?;
        if self.done {
            return Ok(None);
        }
        match scanner.next()? {
            Some((_, tuple)) => Ok(Some(tuple)),
            None => {
                self.done = true;
                Ok(None)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut scanner) = self.scanner.take() {
            scanner.close()?;
        }
        Ok(())
    }

    fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    fn name(&self) -> &str {
        "TableScan"
    }
}

impl Drop for TableScan {
    fn drop(&mut self) {
        if let Some(mut scanner) = self.scanner.take() {
            let _ = scanner.close();
        }
    }
}

/// Range scan of one relation through the index on one attribute
///
/// The scan starts over the full key range. [`IndexScan::set_range`] moves
/// it to a new range at any time; each index entry is resolved to its tuple
/// with [`RecordManager::read_tuple`].
pub struct IndexScan {
    store: Arc<dyn RecordManager>,
    table: String,
    attribute: String,
    key_idx: usize,
    key_type: DataType,
    schema: Vec<Attribute>,
    range: KeyRange,
    scanner: Option<Box<dyn IndexScanner>>,
    opened: bool,
    done: bool,
}

impl IndexScan {
    pub fn new(
        store: Arc<dyn RecordManager>,
        table: &str,
        attribute: &str,
        alias: Option<&str>,
    ) -> Result<Self> {
        let attrs = store.attributes(table)?;
        let key_idx = position_of(&attrs, attribute)?;
        let key_type = attrs[key_idx].data_type;
        let schema = qualified_schema(&attrs, alias.unwrap_or(table));
        Ok(Self {
            store,
            table: table.to_string(),
            attribute: attribute.to_string(),
            key_idx,
            key_type,
            schema,
            range: KeyRange::all(),
            scanner: None,
            opened: false,
            done: false,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Unqualified name of the indexed attribute
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The indexed attribute as it appears in the output schema
    pub fn indexed_attribute(&self) -> &Attribute {
        &self.schema[self.key_idx]
    }

    /// Type of the indexed attribute
    pub fn key_type(&self) -> DataType {
        self.key_type
    }

    /// The range the next entries come from
    pub fn range(&self) -> &KeyRange {
        &self.range
    }

    /// Re-target the scan to `range`.
    ///
    /// The current index handle is closed; once the scan is open a new
    /// handle over `range` replaces it immediately.
    pub fn set_range(&mut self, range: KeyRange) -> Result<()> {
        tracing::trace!(
            table = %self.table,
            attribute = %self.attribute,
            range = %range,
            "index scan re-targeted"
        );
        self.range = range;
        if self.opened {
            self.reopen()?;
        }
        Ok(())
    }

    /// Next index entry without fetching its tuple
    pub fn next_entry(&mut self) -> Result<Option<(RowId, Value)>> {
        let scanner = self
            .scanner
            .as_mut()
            .ok_or_else(|| Error::not_open("IndexScan"))?;
        if self.done {
            return Ok(None);
        }
        let entry = scanner.next_entry()?;
        if entry.is_none() {
            self.done = true;
        }
        Ok(entry)
    }

    fn reopen(&mut self) -> Result<()> {
        if let Some(mut old) = self.scanner.take() {
            old.close()?;
        }
        self.scanner = Some(
            self.store
                .index_scan(&self.table, &self.attribute, self.range.clone())?,
        );
        self.done = false;
        Ok(())
    }
}

impl Operator for IndexScan {
    fn open(&mut self) -> Result<()> {
        self.opened = true;
        self.reopen()
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        match self.next_entry()? {
            Some((rid, _)) => Ok(Some(self.store.read_tuple(&self.table, rid)?)),
            None => Ok(None),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.opened = false;
        if let Some(mut scanner) = self.scanner.take() {
            scanner.close()?;
        }
        Ok(())
    }

    fn schema(&self) -> &[Attribute] {
        &self.schema
    }

    fn name(&self) -> &str {
        "IndexScan"
    }
}

impl Drop for IndexScan {
    fn drop(&mut self) {
        if let Some(mut scanner) = self.scanner.take() {
            let _ = scanner.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TupleLayout;
    use crate::executor::operator::collect_values;
    use crate::storage::MemoryStore;

    fn store() -> Arc<dyn RecordManager> {
        let store = MemoryStore::new();
        store
            .create_table("emp", vec![Attribute::integer("id"), Attribute::text("dept", 4)])
            .unwrap();
        for (id, dept) in [(3, "B"), (1, "A"), (2, "A")] {
            store
                .insert("emp", &[Value::integer(id), Value::text(dept)])
                .unwrap();
        }
        store.create_index("emp", "id").unwrap();
        Arc::new(store)
    }

    fn ids(rows: &[Vec<Value>]) -> Vec<i32> {
        rows.iter().filter_map(|r| r[0].as_i32()).collect()
    }

    #[test]
    fn test_table_scan_qualifies_names() {
        let scan = TableScan::new(store(), "emp", None).unwrap();
        let names: Vec<&str> = scan.schema().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["emp.id", "emp.dept"]);

        let scan = TableScan::new(store(), "emp", Some("e")).unwrap();
        assert_eq!(scan.schema()[1].name, "e.dept");
    }

    #[test]
    fn test_table_scan_and_rewind() {
        let mut scan = TableScan::new(store(), "emp", None).unwrap();
        assert!(matches!(scan.next(), Err(Error::NotOpen(_))));
        assert!(scan.rewind().is_err());

        scan.open().unwrap();
        let layout = TupleLayout::new(scan.schema());
        let mut first_pass = Vec::new();
        while let Some(t) = scan.next().unwrap() {
            first_pass.push(layout.field(&t, 0).unwrap());
        }
        assert!(scan.next().unwrap().is_none());

        scan.rewind().unwrap();
        let t = scan.next().unwrap().unwrap();
        assert_eq!(layout.field(&t, 0).unwrap(), first_pass[0]);
        scan.close().unwrap();
    }

    #[test]
    fn test_table_scan_unknown_table() {
        assert!(matches!(
            TableScan::new(store(), "dept", None),
            Err(Error::TableNotFound(_))
        ));
    }

    #[test]
    fn test_index_scan_full_range_in_key_order() {
        let mut scan = IndexScan::new(store(), "emp", "id", None).unwrap();
        assert_eq!(scan.key_type(), DataType::Integer);
        assert_eq!(scan.indexed_attribute().name, "emp.id");
        let rows = collect_values(&mut scan).unwrap();
        assert_eq!(ids(&rows), vec![1, 2, 3]);
    }

    #[test]
    fn test_index_scan_set_range() {
        let mut scan = IndexScan::new(store(), "emp", "id", Some("e")).unwrap();
        scan.open().unwrap();
        scan.set_range(KeyRange::above(Value::integer(1), false)).unwrap();
        let layout = TupleLayout::new(scan.schema());
        let mut seen = Vec::new();
        while let Some(t) = scan.next().unwrap() {
            seen.push(layout.field(&t, 0).unwrap().as_i32().unwrap());
        }
        assert_eq!(seen, vec![2, 3]);

        // re-target after exhaustion
        scan.set_range(KeyRange::point(Value::integer(1))).unwrap();
        let t = scan.next().unwrap().unwrap();
        assert_eq!(layout.field(&t, 1).unwrap(), Value::text("A"));
        assert!(scan.next().unwrap().is_none());
        scan.close().unwrap();
    }

    #[test]
    fn test_index_scan_errors() {
        assert!(matches!(
            IndexScan::new(store(), "emp", "salary", None),
            Err(Error::ColumnNotFound(_))
        ));
        let mut scan = IndexScan::new(store(), "emp", "dept", None).unwrap();
        assert!(matches!(scan.open(), Err(Error::IndexNotFound { .. })));
    }
}
