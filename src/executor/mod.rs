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

//! Operator executor
//!
//! # Architecture
//!
//! Operators form a tree. Each one owns its children and pulls tuples from
//! them on demand:
//!
//! ```text
//! TableScan / IndexScan
//!   ↓
//! Filter (single condition)
//!   ↓
//! BlockNestedLoopJoin / IndexNestedLoopJoin / HashJoin
//!   ↓
//! Project / Aggregate
//!   ↓
//! Caller
//! ```
//!
//! # Components
//!
//! - [`Operator`] - open / next / close contract shared by every operator
//! - [`ExecConfig`] - page size, tuple size bound and spill mode
//! - [`TableScan`], [`IndexScan`] - leaves over a [`RecordManager`](crate::storage::RecordManager)
//! - [`Filter`], [`Project`], [`Aggregate`] - unary operators
//! - [`operators`] - join operators

pub mod aggregate;
pub mod config;
pub mod filter;
pub mod operator;
pub mod operators;
pub mod project;
pub mod scan;
pub mod spill;

pub use aggregate::{Aggregate, AggregateResult};
pub use config::{ExecConfig, SpillMode};
pub use filter::Filter;
pub use operator::{collect_tuples, collect_values, EmptyOperator, MaterializedOperator, Operator};
pub use operators::{BlockNestedLoopJoin, HashJoin, IndexNestedLoopJoin, JoinSide};
pub use project::Project;
pub use scan::{IndexScan, TableScan};
pub use spill::{PartitionReader, SpillPartition};
