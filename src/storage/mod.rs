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

//! Storage module for relexec
//!
//! This module contains the storage-side collaborators of the operators:
//! - Storage traits (RecordManager, RecordScanner, IndexScanner, KeyRange)
//! - The in-memory reference record manager

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;

// Re-export trait types
pub use traits::{IndexScanner, KeyRange, RecordManager, RecordScanner, RowId, VecScanner};
