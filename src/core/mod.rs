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

//! Core types and definitions for relexec
//!
//! This module contains the fundamental types every operator builds on:
//!
//! - [`DataType`] - scalar types (INTEGER, REAL, TEXT)
//! - [`CompOp`] - comparison operators (=, !=, >, <, etc.)
//! - [`AggregateOp`] - MIN, MAX, COUNT, SUM, AVG
//! - [`Value`] - runtime values with type information
//! - [`Key`] - hashable, totally ordered form of a value
//! - [`Attribute`] - column descriptor
//! - [`Tuple`] / [`TupleLayout`] - encoded records and their codec
//! - [`Condition`] - binary predicate over attributes
//! - [`Error`] - error types for every operation

pub mod attribute;
pub mod condition;
pub mod error;
pub mod key;
pub mod tuple;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use attribute::{find_attribute, position_of, Attribute};
pub use condition::{Condition, JoinPredicate, Operand, Predicate};
pub use error::{Error, Result};
pub use key::{GroupMap, Key, KeyIndex, RealKey};
pub use tuple::{Tuple, TupleLayout, DEFAULT_MAX_TUPLE_SIZE};
pub use types::{AggregateOp, CompOp, DataType};
pub use value::Value;
