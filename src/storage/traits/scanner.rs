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

//! Scanner traits for iterating over stored records and index entries
//!

use crate::core::{Result, Tuple, Value};

/// Opaque record identifier handed out by the storage layer
pub type RowId = i64;

/// A full scan over the records of one relation
///
/// # Example
///
/// ```ignore
/// let mut scanner = store.scan("emp")?;
/// while let Some((rid, tuple)) = scanner.next()? {
///     // Process tuple...
/// }
/// scanner.close()?;
/// ```
pub trait RecordScanner: Send {
    /// Advances to the next record
    ///
    /// Returns `Ok(None)` once every record has been produced.
    fn next(&mut self) -> Result<Option<(RowId, Tuple)>>;

    /// Restarts the scan at the first record
    ///
    /// Rewinding is cheap and may be repeated any number of times.
    fn rewind(&mut self) -> Result<()>;

    /// Closes the scanner and releases any resources
    fn close(&mut self) -> Result<()>;
}

/// A range scan over the entries of one index, in key order
pub trait IndexScanner: Send {
    /// Advances to the next entry inside the range the scanner was opened with
    fn next_entry(&mut self) -> Result<Option<(RowId, Value)>>;

    /// Closes the scanner and releases any resources
    fn close(&mut self) -> Result<()>;
}

/// A record scanner over a vector of tuples (useful for testing)
pub struct VecScanner {
    rows: Vec<(RowId, Tuple)>,
    pos: usize,
    closed: bool,
}

impl VecScanner {
    /// Creates a new scanner over the given records
    pub fn new(rows: Vec<(RowId, Tuple)>) -> Self {
        Self {
            rows,
            pos: 0,
            closed: false,
        }
    }

    /// Creates a scanner numbering `tuples` from row id 1
    pub fn from_tuples(tuples: Vec<Tuple>) -> Self {
        Self::new(
            tuples
                .into_iter()
                .enumerate()
                .map(|(i, t)| (i as RowId + 1, t))
                .collect(),
        )
    }
}

impl RecordScanner for VecScanner {
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
