//! Relation planner subsystem for snatch
//!
//! Turns a schema and a depth budget into a [`RelationPlan`]: which
//! relations are JOINed with their owner, which need a SEPARATE fetch, and
//! how far each may still be expanded.
//!
//! # Design Principles
//!
//! - Deterministic: same schema graph and depth yield the same plan
//! - Bounded: depth is checked against the ceiling before planning, and the
//!   ceiling also caps the relation nesting of every path
//! - Read-only: plans are never mutated by the renderer or the store

mod errors;
mod relations;

pub use errors::{PlannerError, PlannerResult};
pub use relations::{FetchMode, RelationMap, RelationNode, RelationPlan, RelationPlanner};

use crate::observability::Logger;
use crate::schema::SchemaGraph;

/// Plans the relations of the named schema
pub fn plan_relations(
    schema: &str,
    graph: &SchemaGraph,
    max_depth: i64,
    ceiling: u32,
) -> PlannerResult<RelationPlan> {
    let root = graph
        .get(schema)
        .ok_or_else(|| PlannerError::UnknownSchema(schema.to_string()))?;
    let plan = RelationPlanner::new(graph, ceiling).plan(root.id(), max_depth)?;

    let depth = plan.max_depth.to_string();
    let nodes = plan.node_count().to_string();
    Logger::trace(
        "RELATION_PLAN_BUILT",
        &[("schema", schema), ("max_depth", depth.as_str()), ("nodes", nodes.as_str())],
    );
    Ok(plan)
}
