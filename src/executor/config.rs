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

//! Executor configuration
//!

use crate::core::{Error, Result, DEFAULT_MAX_TUPLE_SIZE};

/// Where hash join partitions live between the partition and join phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpillMode {
    /// Anonymous temporary files, removed when the join is dropped
    #[default]
    Disk,
    /// In-memory vectors, for small inputs and tests
    Memory,
}

/// Configuration options for operator execution
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Bytes per page of block buffer in the block nested-loop join
    /// Default: 4096
    pub page_size: usize,

    /// Largest tuple an operator will produce or buffer
    /// Default: 4096
    pub max_tuple_size: usize,

    /// Hash join partition storage
    /// Default: Disk
    pub spill_mode: SpillMode,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            page_size: 4096,
            max_tuple_size: DEFAULT_MAX_TUPLE_SIZE,
            spill_mode: SpillMode::Disk,
        }
    }
}

impl ExecConfig {
    /// Creates a new ExecConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an ExecConfig that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            spill_mode: SpillMode::Memory,
            ..Self::default()
        }
    }

    /// Builder method to set the page size
    pub fn with_page_size(mut self, bytes: usize) -> Self {
        self.page_size = bytes;
        self
    }

    /// Builder method to set the maximum tuple size
    pub fn with_max_tuple_size(mut self, bytes: usize) -> Self {
        self.max_tuple_size = bytes;
        self
    }

    /// Builder method to set the spill mode
    pub fn with_spill_mode(mut self, mode: SpillMode) -> Self {
        self.spill_mode = mode;
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_argument("page_size must be positive"));
        }
        if self.max_tuple_size == 0 {
            return Err(Error::invalid_argument("max_tuple_size must be positive"));
        }
        Ok(())
    }
}
