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

//! Storage traits for relexec
//!
//! This module defines the interfaces operators read relations through:
//!
//! - [`RecordManager`] - schema lookup, table scans, row fetch, index scans
//! - [`RecordScanner`] - restartable full scan of one relation
//! - [`IndexScanner`] - range scan over one index
//! - [`KeyRange`] - bounds of an index range scan
//!

pub mod record_manager;
pub mod scanner;

// Re-export main traits
pub use record_manager::{KeyRange, RecordManager};
pub use scanner::{IndexScanner, RecordScanner, RowId, VecScanner};
