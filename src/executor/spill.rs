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

//! Append-only tuple partitions for the hash join
//!
//! A partition is written once during the partition phase and read back once
//! during the join phase. Disk partitions use an anonymous temporary file,
//! created on the first append and removed by the OS when dropped.
//!
//! # File format
//!
//! ```text
//! [len: u32 LE][len bytes of encoded tuple] ...
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};

use crate::core::{Error, Result, Tuple};

use super::config::SpillMode;

enum Storage {
    Memory(Vec<Tuple>),
    Disk(Option<BufWriter<File>>),
}

/// Write side of one partition
///
/// A disk partition owns one open file descriptor from its first append
/// until the reader built by [`SpillPartition::into_reader`] is dropped.
/// Empty partitions never open a file.
pub struct SpillPartition {
    storage: Storage,
    count: usize,
    bytes: usize,
}

impl SpillPartition {
    pub fn new(mode: SpillMode) -> Self {
        let storage = match mode {
            SpillMode::Memory => Storage::Memory(Vec::new()),
            SpillMode::Disk => Storage::Disk(None),
        };
        Self {
            storage,
            count: 0,
            bytes: 0,
        }
    }

    /// Append one tuple
    pub fn push(&mut self, tuple: Tuple) -> Result<()> {
        let size = tuple.len();
        match &mut self.storage {
            Storage::Memory(tuples) => tuples.push(tuple),
            Storage::Disk(writer) => {
                let len = u32::try_from(tuple.len()).map_err(|_| Error::TupleTooLarge {
                    size: tuple.len(),
                    max: u32::MAX as usize,
                })?;
                if writer.is_none() {
                    *writer = Some(BufWriter::new(tempfile::tempfile()?));
                }
                if let Some(w) = writer {
                    w.write_all(&len.to_le_bytes())?;
                    w.write_all(tuple.as_bytes())?;
                }
            }
        }
        self.bytes += size;
        self.count += 1;
        Ok(())
    }

    /// Number of tuples appended
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total encoded bytes appended
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    /// Finish writing and read the tuples back in append order
    pub fn into_reader(self) -> Result<PartitionReader> {
        let source = match self.storage {
            Storage::Memory(tuples) => Source::Memory(tuples.into_iter()),
            Storage::Disk(None) => Source::Memory(Vec::new().into_iter()),
            Storage::Disk(Some(writer)) => {
                let mut file = writer.into_inner().map_err(|e| Error::from(e.into_error()))?;
                file.seek(SeekFrom::Start(0))?;
                Source::Disk(BufReader::new(file))
            }
        };
        Ok(PartitionReader {
            source,
            remaining: self.count,
        })
    }
}

enum Source {
    Memory(std::vec::IntoIter<Tuple>),
    Disk(BufReader<File>),
}

/// Read side of one partition
pub struct PartitionReader {
    source: Source,
    remaining: usize,
}

impl PartitionReader {
    /// Tuples not yet read
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Next tuple, or `None` once every appended tuple was read
    pub fn next_tuple(&mut self) -> Result<Option<Tuple>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let tuple = match &mut self.source {
            Source::Memory(iter) => iter
                .next()
                .ok_or_else(|| Error::internal("partition shorter than its count"))?,
            Source::Disk(reader) => {
                let mut len = [0u8; 4];
                reader.read_exact(&mut len)?;
                let mut data = vec![0u8; u32::from_le_bytes(len) as usize];
                reader.read_exact(&mut data)?;
                Tuple::from_bytes(data)
            }
        };
        self.remaining -= 1;
        Ok(Some(tuple))
    }
}
