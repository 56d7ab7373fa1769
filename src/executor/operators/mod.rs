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

//! Join operators.
//!
//! Every join emits the left tuple's fields followed by the right tuple's,
//! and its output schema is the left schema followed by the right schema.
//!
//! # Available Operators
//!
//! - `BlockNestedLoopJoin` - Buffers left tuples in page-bounded blocks and
//!   rescans the right relation once per block, O(N*M) comparisons
//! - `IndexNestedLoopJoin` - Re-targets an index range scan per left tuple,
//!   O(N*log M)
//! - `HashJoin` - Partitioned (grace) hash join with optional disk spill,
//!   O(N+M)
//!
//! # Algorithm Selection
//!
//! | Condition | Recommended Operator |
//! |-----------|---------------------|
//! | Equality, large inputs | `HashJoin` |
//! | Right relation indexed on the join attribute | `IndexNestedLoopJoin` |
//! | Any comparator, no index | `BlockNestedLoopJoin` |

pub mod block_nested_loop;
pub mod hash_join;
pub mod index_nested_loop;

pub use block_nested_loop::BlockNestedLoopJoin;
pub use hash_join::{HashJoin, JoinSide};
pub use index_nested_loop::{lookup_ranges, IndexNestedLoopJoin, LookupRanges};
