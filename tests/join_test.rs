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

//! Join Tests
//!
//! Tests for the three join operators over a shared record manager:
//! - Equality joins with every algorithm
//! - Inequality joins (block and index nested loop)
//! - Self joins through scan aliases
//! - Disk spill and partition counts for the hash join
//! - Output size limits

use std::sync::Arc;

use relexec::core::{Attribute, CompOp, Condition, Error, Operand, Value};
use relexec::executor::{
    collect_values, BlockNestedLoopJoin, ExecConfig, HashJoin, IndexNestedLoopJoin, IndexScan,
    Operator, Project, TableScan,
};
use relexec::storage::{MemoryStore, RecordManager};

/// R(id, dept, sal) and S(dept, loc), indexed on S.dept and R.sal
fn create_test_store() -> Arc<dyn RecordManager> {
    let store = MemoryStore::new();
    store
        .create_table(
            "r",
            vec![
                Attribute::integer("id"),
                Attribute::text("dept", 4),
                Attribute::integer("sal"),
            ],
        )
        .unwrap();
    store
        .create_table("s", vec![Attribute::text("dept", 4), Attribute::text("loc", 8)])
        .unwrap();

    for (id, dept, sal) in [(1, "A", 10), (2, "A", 20), (3, "B", 5)] {
        store
            .insert("r", &[Value::integer(id), Value::text(dept), Value::integer(sal)])
            .unwrap();
    }
    for (dept, loc) in [("A", "X"), ("B", "Y")] {
        store.insert("s", &[Value::text(dept), Value::text(loc)]).unwrap();
    }
    store.create_index("s", "dept").unwrap();
    store.create_index("r", "sal").unwrap();
    Arc::new(store)
}

fn scan(store: &Arc<dyn RecordManager>, table: &str, alias: Option<&str>) -> TableScan {
    TableScan::new(Arc::clone(store), table, alias).unwrap()
}

/// (r.id, s.loc) pairs, sorted
fn id_loc_pairs(join: Box<dyn Operator>) -> Vec<(i32, String)> {
    let mut project = Project::new(join, &["r.id", "s.loc"]).unwrap();
    let mut pairs: Vec<(i32, String)> = collect_values(&mut project)
        .unwrap()
        .into_iter()
        .map(|row| (row[0].as_i32().unwrap(), row[1].to_string()))
        .collect();
    pairs.sort();
    pairs
}

fn expected_dept_join() -> Vec<(i32, String)> {
    vec![(1, "X".into()), (2, "X".into()), (3, "Y".into())]
}

// ============================================================================
// Equality Joins
// ============================================================================

#[test]
fn test_block_nested_loop_equality() {
    let store = create_test_store();
    let cond = Condition::attributes("r.dept", CompOp::Eq, "s.dept");
    let join = BlockNestedLoopJoin::new(
        Box::new(scan(&store, "r", None)),
        scan(&store, "s", None),
        cond,
        1,
        &ExecConfig::default(),
    )
    .unwrap();
    assert_eq!(id_loc_pairs(Box::new(join)), expected_dept_join());
}

#[test]
fn test_index_nested_loop_equality() {
    let store = create_test_store();
    let cond = Condition::attributes("r.dept", CompOp::Eq, "s.dept");
    let right = IndexScan::new(Arc::clone(&store), "s", "dept", None).unwrap();
    let join = IndexNestedLoopJoin::new(
        Box::new(scan(&store, "r", None)),
        right,
        cond,
        &ExecConfig::default(),
    )
    .unwrap();
    assert_eq!(id_loc_pairs(Box::new(join)), expected_dept_join());
}

#[test]
fn test_hash_join_equality() {
    let store = create_test_store();
    for config in [ExecConfig::default(), ExecConfig::in_memory()] {
        for partitions in [1, 2, 7] {
            let cond = Condition::attributes("r.dept", CompOp::Eq, "s.dept");
            let join = HashJoin::new(
                Box::new(scan(&store, "r", None)),
                Box::new(scan(&store, "s", None)),
                cond,
                partitions,
                &config,
            )
            .unwrap();
            assert_eq!(id_loc_pairs(Box::new(join)), expected_dept_join());
        }
    }
}

#[test]
fn test_join_schema_is_left_then_right() {
    let store = create_test_store();
    let cond = Condition::attributes("r.dept", CompOp::Eq, "s.dept");
    let join = HashJoin::new(
        Box::new(scan(&store, "r", None)),
        Box::new(scan(&store, "s", None)),
        cond,
        2,
        &ExecConfig::in_memory(),
    )
    .unwrap();
    let names: Vec<&str> = join.schema().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["r.id", "r.dept", "r.sal", "s.dept", "s.loc"]);
}

// ============================================================================
// Inequality and Self Joins
// ============================================================================

fn salary_pairs(mut join: Box<dyn Operator>) -> Vec<(i32, i32)> {
    let mut pairs: Vec<(i32, i32)> = collect_values(join.as_mut())
        .unwrap()
        .into_iter()
        .map(|row| (row[2].as_i32().unwrap(), row[5].as_i32().unwrap()))
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn test_self_join_less_than() {
    let store = create_test_store();
    let expected = vec![(5, 10), (5, 20), (10, 20)];

    let cond = Condition::attributes("a.sal", CompOp::Lt, "b.sal");
    let bnl = BlockNestedLoopJoin::new(
        Box::new(scan(&store, "r", Some("a"))),
        scan(&store, "r", Some("b")),
        cond.clone(),
        1,
        &ExecConfig::default().with_page_size(16),
    )
    .unwrap();
    assert_eq!(salary_pairs(Box::new(bnl)), expected);

    let right = IndexScan::new(Arc::clone(&store), "r", "sal", Some("b")).unwrap();
    let inl = IndexNestedLoopJoin::new(
        Box::new(scan(&store, "r", Some("a"))),
        right,
        cond,
        &ExecConfig::default(),
    )
    .unwrap();
    assert_eq!(salary_pairs(Box::new(inl)), expected);
}

#[test]
fn test_not_equal_join() {
    let store = create_test_store();
    let cond = Condition::attributes("a.sal", CompOp::Ne, "b.sal");
    let right = IndexScan::new(Arc::clone(&store), "r", "sal", Some("b")).unwrap();
    let inl = IndexNestedLoopJoin::new(
        Box::new(scan(&store, "r", Some("a"))),
        right,
        cond,
        &ExecConfig::default(),
    )
    .unwrap();
    assert_eq!(salary_pairs(Box::new(inl)).len(), 6);
}

#[test]
fn test_cross_product() {
    let store = create_test_store();
    let cond = Condition::new("r.id", CompOp::NoOp, Operand::Attribute("s.dept".into()));
    let mut bnl = BlockNestedLoopJoin::new(
        Box::new(scan(&store, "r", None)),
        scan(&store, "s", None),
        cond,
        1,
        &ExecConfig::default(),
    )
    .unwrap();
    assert_eq!(collect_values(&mut bnl).unwrap().len(), 6);
}

// ============================================================================
// Hash Join Spill
// ============================================================================

#[test]
fn test_hash_join_many_partitions_on_disk() {
    let store = MemoryStore::new();
    store
        .create_table("big", vec![Attribute::integer("k"), Attribute::integer("v")])
        .unwrap();
    store
        .create_table("dim", vec![Attribute::integer("k"), Attribute::text("name", 8)])
        .unwrap();
    for i in 0..500 {
        store
            .insert("big", &[Value::integer(i % 37), Value::integer(i)])
            .unwrap();
    }
    for k in 0..40 {
        store
            .insert("dim", &[Value::integer(k), Value::text(format!("d{}", k))])
            .unwrap();
    }
    let store: Arc<dyn RecordManager> = Arc::new(store);

    let cond = Condition::attributes("big.k", CompOp::Eq, "dim.k");
    let mut join = HashJoin::new(
        Box::new(scan(&store, "big", None)),
        Box::new(scan(&store, "dim", None)),
        cond,
        16,
        &ExecConfig::default(),
    )
    .unwrap();
    let rows = collect_values(&mut join).unwrap();
    assert_eq!(rows.len(), 500);
    assert!(rows
        .iter()
        .all(|r| r[3].to_string() == format!("d{}", r[0].as_i32().unwrap())));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_output_larger_than_max_tuple_size() {
    let store = create_test_store();
    let cond = Condition::attributes("r.dept", CompOp::Eq, "s.dept");
    let mut join = HashJoin::new(
        Box::new(scan(&store, "r", None)),
        Box::new(scan(&store, "s", None)),
        cond,
        2,
        &ExecConfig::in_memory().with_max_tuple_size(16),
    )
    .unwrap();
    join.open().unwrap();
    assert!(matches!(join.next(), Err(Error::TupleTooLarge { .. })));
}

#[test]
fn test_join_condition_type_mismatch() {
    let store = create_test_store();
    let cond = Condition::attributes("r.id", CompOp::Eq, "s.dept");
    let result = HashJoin::new(
        Box::new(scan(&store, "r", None)),
        Box::new(scan(&store, "s", None)),
        cond,
        2,
        &ExecConfig::in_memory(),
    );
    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
}

#[test]
fn test_join_condition_unknown_attribute() {
    let store = create_test_store();
    let cond = Condition::attributes("r.dept", CompOp::Eq, "s.region");
    let result = BlockNestedLoopJoin::new(
        Box::new(scan(&store, "r", None)),
        scan(&store, "s", None),
        cond,
        1,
        &ExecConfig::default(),
    );
    assert!(matches!(result, Err(Error::ColumnNotFound(_))));
}
