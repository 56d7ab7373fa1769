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

//! # relexec - pull-based relational operators
//!
//! relexec is the execution layer of a small relational engine. Operators
//! pull encoded tuples from their children one at a time and read base
//! relations through a pluggable [`RecordManager`](storage::RecordManager).
//!
//! ## Key Features
//!
//! - **Three join algorithms** - Block nested-loop, index nested-loop and
//!   partitioned hash join with disk spill
//! - **Aggregation** - MIN, MAX, COUNT, SUM, AVG, whole-input or grouped
//! - **Selection and projection** - single-condition filter, byte-level field projection
//! - **Typed values** - INTEGER, REAL and bounded TEXT with a compact tuple encoding
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use relexec::core::{AggregateOp, Attribute, Value};
//! use relexec::executor::{collect_values, Aggregate, TableScan};
//! use relexec::storage::{MemoryStore, RecordManager};
//!
//! let store = MemoryStore::new();
//! store
//!     .create_table("emp", vec![Attribute::text("dept", 8), Attribute::integer("sal")])
//!     .unwrap();
//! store.insert("emp", &[Value::text("A"), Value::integer(10)]).unwrap();
//! store.insert("emp", &[Value::text("A"), Value::integer(20)]).unwrap();
//! store.insert("emp", &[Value::text("B"), Value::integer(5)]).unwrap();
//!
//! let store: Arc<dyn RecordManager> = Arc::new(store);
//! let scan = TableScan::new(store, "emp", None).unwrap();
//! let mut sums =
//!     Aggregate::grouped(Box::new(scan), "emp.sal", "emp.dept", AggregateOp::Sum).unwrap();
//!
//! let rows = collect_values(&mut sums).unwrap();
//! assert_eq!(rows[0], vec![Value::text("A"), Value::real(30.0)]);
//! assert_eq!(rows[1], vec![Value::text("B"), Value::real(5.0)]);
//! ```
//!
//! ## Modules
//!
//! - [`core`] - Core types ([`DataType`], [`Value`], [`Tuple`], [`Condition`], [`Error`])
//! - [`storage`] - Record manager traits and the in-memory [`MemoryStore`]
//! - [`executor`] - Operators, scans and [`ExecConfig`]

pub mod core;
pub mod executor;
pub mod storage;

// Re-export main types for convenience
pub use core::{
    AggregateOp, Attribute, CompOp, Condition, DataType, Error, Operand, Result, Tuple,
    TupleLayout, Value,
};

// Re-export executor types
pub use executor::{
    Aggregate, BlockNestedLoopJoin, ExecConfig, Filter, HashJoin, IndexNestedLoopJoin, IndexScan,
    Operator, Project, SpillMode, TableScan,
};

// Re-export storage types
pub use storage::{KeyRange, MemoryStore, RecordManager, RowId};
