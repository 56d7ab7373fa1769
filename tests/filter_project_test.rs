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

//! Selection and Projection Tests
//!
//! Tests for Filter and Project, plus the end-to-end employee scenario:
//! - Literal and same-tuple attribute comparisons
//! - Child order and end-of-stream preservation
//! - Field order, repetition and variable-length fields in projections

use std::sync::Arc;

use relexec::core::{AggregateOp, Attribute, CompOp, Condition, Error, Operand, Value};
use relexec::executor::{
    collect_tuples, collect_values, Aggregate, ExecConfig, Filter, HashJoin, MaterializedOperator,
    Operator, Project, TableScan,
};
use relexec::storage::{MemoryStore, RecordManager};

fn create_test_store() -> Arc<dyn RecordManager> {
    let store = MemoryStore::new();
    store
        .create_table(
            "r",
            vec![
                Attribute::integer("id"),
                Attribute::text("dept", 8),
                Attribute::integer("sal"),
            ],
        )
        .unwrap();
    for (id, dept, sal) in [(1, "A", 10), (2, "A", 20), (3, "B", 5)] {
        store
            .insert("r", &[Value::integer(id), Value::text(dept), Value::integer(sal)])
            .unwrap();
    }
    store
        .create_table("s", vec![Attribute::text("dept", 8), Attribute::text("loc", 8)])
        .unwrap();
    for (dept, loc) in [("A", "X"), ("B", "Y")] {
        store.insert("s", &[Value::text(dept), Value::text(loc)]).unwrap();
    }
    Arc::new(store)
}

fn scan(store: &Arc<dyn RecordManager>, table: &str) -> Box<dyn Operator> {
    Box::new(TableScan::new(Arc::clone(store), table, None).unwrap())
}

fn row(id: i32, dept: &str, sal: i32) -> Vec<Value> {
    vec![Value::integer(id), Value::text(dept), Value::integer(sal)]
}

// ============================================================================
// Employee Scenario
// ============================================================================

#[test]
fn test_scenario_grouped_sum() {
    let store = create_test_store();
    let mut agg = Aggregate::grouped(scan(&store, "r"), "r.sal", "r.dept", AggregateOp::Sum).unwrap();
    assert_eq!(
        collect_values(&mut agg).unwrap(),
        vec![
            vec![Value::text("A"), Value::real(30.0)],
            vec![Value::text("B"), Value::real(5.0)],
        ]
    );
}

#[test]
fn test_scenario_max() {
    let store = create_test_store();
    let mut agg = Aggregate::new(scan(&store, "r"), "r.sal", AggregateOp::Max).unwrap();
    assert_eq!(collect_values(&mut agg).unwrap(), vec![vec![Value::integer(20)]]);
}

#[test]
fn test_scenario_selection() {
    let store = create_test_store();
    let mut filter =
        Filter::new(scan(&store, "r"), Condition::literal("r.dept", CompOp::Eq, "B")).unwrap();
    assert_eq!(collect_values(&mut filter).unwrap(), vec![row(3, "B", 5)]);
}

#[test]
fn test_scenario_join() {
    let store = create_test_store();
    let mut join = HashJoin::new(
        scan(&store, "r"),
        scan(&store, "s"),
        Condition::attributes("r.dept", CompOp::Eq, "s.dept"),
        4,
        &ExecConfig::default(),
    )
    .unwrap();
    assert_eq!(collect_values(&mut join).unwrap().len(), 3);
}

// ============================================================================
// Filter
// ============================================================================

#[test]
fn test_filter_preserves_child_order() {
    let store = create_test_store();
    let mut filter =
        Filter::new(scan(&store, "r"), Condition::literal("r.sal", CompOp::Ge, 10)).unwrap();
    assert_eq!(
        collect_values(&mut filter).unwrap(),
        vec![row(1, "A", 10), row(2, "A", 20)]
    );
}

#[test]
fn test_filter_same_tuple_attributes() {
    let store = create_test_store();
    let cond = Condition::attributes("r.id", CompOp::Lt, "r.sal");
    let mut filter = Filter::new(scan(&store, "r"), cond).unwrap();
    assert_eq!(collect_values(&mut filter).unwrap().len(), 3);

    let cond = Condition::attributes("r.id", CompOp::Eq, "r.dept");
    assert!(matches!(
        Filter::new(scan(&store, "r"), cond),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_filter_always_true_and_sticky_end() {
    let store = create_test_store();
    let cond = Condition::new("r.id", CompOp::NoOp, Operand::Literal(Value::integer(0)));
    let mut filter = Filter::new(scan(&store, "r"), cond).unwrap();
    filter.open().unwrap();
    for _ in 0..3 {
        assert!(filter.next().unwrap().is_some());
    }
    assert!(filter.next().unwrap().is_none());
    assert!(filter.next().unwrap().is_none());
    filter.close().unwrap();
}

#[test]
fn test_filter_literal_type_mismatch() {
    let store = create_test_store();
    assert!(matches!(
        Filter::new(scan(&store, "r"), Condition::literal("r.sal", CompOp::Eq, "ten")),
        Err(Error::TypeMismatch { .. })
    ));
}

// ============================================================================
// Project
// ============================================================================

#[test]
fn test_project_reorders_fields() {
    let store = create_test_store();
    let mut project = Project::new(scan(&store, "r"), &["r.sal", "r.dept"]).unwrap();
    let names: Vec<&str> = project.schema().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["r.sal", "r.dept"]);
    assert_eq!(
        collect_values(&mut project).unwrap(),
        vec![
            vec![Value::integer(10), Value::text("A")],
            vec![Value::integer(20), Value::text("A")],
            vec![Value::integer(5), Value::text("B")],
        ]
    );
}

#[test]
fn test_project_variable_length_bytes() {
    let schema = vec![Attribute::text("t.a", 16), Attribute::text("t.b", 16)];
    let child = MaterializedOperator::from_values(
        schema,
        vec![vec![Value::text("hello"), Value::text("")]],
    )
    .unwrap();
    let mut project = Project::new(Box::new(child), &["t.b", "t.a"]).unwrap();
    let tuples = collect_tuples(&mut project).unwrap();
    assert_eq!(tuples.len(), 1);
    // [0u32][5u32]"hello"
    assert_eq!(
        tuples[0].as_bytes(),
        &[0, 0, 0, 0, 5, 0, 0, 0, b'h', b'e', b'l', b'l', b'o']
    );
}

#[test]
fn test_project_errors() {
    let store = create_test_store();
    assert!(matches!(
        Project::new(scan(&store, "r"), &[]),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        Project::new(scan(&store, "r"), &["r.salary"]),
        Err(Error::ColumnNotFound(_))
    ));
}

#[test]
fn test_filter_then_project_pipeline() {
    let store = create_test_store();
    let filter =
        Filter::new(scan(&store, "r"), Condition::literal("r.dept", CompOp::Eq, "A")).unwrap();
    let mut project = Project::new(Box::new(filter), &["r.id"]).unwrap();
    assert_eq!(
        collect_values(&mut project).unwrap(),
        vec![vec![Value::integer(1)], vec![Value::integer(2)]]
    );
}
