//! Relation-depth planner
//!
//! Decides for every relation reachable from a root schema whether it is
//! joined eagerly or fetched separately, and how much depth budget remains
//! below it.
//!
//! - to-one relations are JOINed and consume one unit of depth; they are
//!   expanded further only while budget remains
//! - to-many relations are fetched SEPARATEly (paginated on their own) and
//!   do not consume depth
//! - the hop ceiling bounds every path, so cyclic graphs terminate
//!
//! Same inputs always yield the same plan. Plans are immutable.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::schema::{Cardinality, SchemaGraph, SchemaId};

use super::errors::{PlannerError, PlannerResult};

/// How a relation is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FetchMode {
    /// Loaded eagerly in the same fetch as its owner
    Join,
    /// Loaded by an independent follow-up fetch
    Separate,
}

impl FetchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMode::Join => "JOIN",
            FetchMode::Separate => "SEPARATE",
        }
    }
}

/// Relation nodes by attribute name
pub type RelationMap = BTreeMap<String, RelationNode>;

/// Plan for one relation attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationNode {
    pub fetch_mode: FetchMode,
    pub remaining_depth: u32,
    /// Target schema name
    pub target: String,
    #[serde(skip)]
    pub target_id: SchemaId,
    pub cardinality: Cardinality,
    /// `None`: not expandable below this node.
    /// `Some(empty)`: expandable, but the target has no relations.
    pub children: Option<RelationMap>,
}

impl RelationNode {
    pub fn is_expandable(&self) -> bool {
        self.children.is_some()
    }
}

/// Relation plan for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationPlan {
    pub root: String,
    #[serde(skip)]
    pub root_id: SchemaId,
    pub max_depth: u32,
    pub ceiling: u32,
    pub relations: RelationMap,
}

impl RelationPlan {
    /// Plan node of a root-level relation
    pub fn get(&self, name: &str) -> Option<&RelationNode> {
        self.relations.get(name)
    }

    /// Plan node at a relation path, e.g. `["owner", "pets"]`
    pub fn node(&self, path: &[&str]) -> Option<&RelationNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.relations.get(*first)?;
        for segment in rest {
            node = node.children.as_ref()?.get(*segment)?;
        }
        Some(node)
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        fn count(map: &RelationMap) -> usize {
            map.values()
                .map(|node| 1 + node.children.as_ref().map_or(0, count))
                .sum()
        }
        count(&self.relations)
    }

    /// Maximal dot-joined chains of JOIN nodes starting at the root
    pub fn join_paths(&self) -> Vec<String> {
        self.flatten().0
    }

    /// Paths that need a follow-up fetch: every SEPARATE node, plus the
    /// maximal JOIN chains hanging below a SEPARATE ancestor
    pub fn separate_paths(&self) -> Vec<String> {
        self.flatten().1
    }

    fn flatten(&self) -> (Vec<String>, Vec<String>) {
        let mut joins = Vec::new();
        let mut separates = Vec::new();
        walk(&self.relations, "", false, &mut joins, &mut separates);
        (joins, separates)
    }
}

fn walk(
    map: &RelationMap,
    prefix: &str,
    under_separate: bool,
    joins: &mut Vec<String>,
    separates: &mut Vec<String>,
) {
    for (name, node) in map {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        match node.fetch_mode {
            FetchMode::Separate => {
                separates.push(path.clone());
                if let Some(children) = &node.children {
                    walk(children, &path, true, joins, separates);
                }
            }
            FetchMode::Join => {
                let extends = node.children.as_ref().map_or(false, |children| {
                    children.values().any(|child| child.fetch_mode == FetchMode::Join)
                });
                if !extends {
                    if under_separate {
                        separates.push(path.clone());
                    } else {
                        joins.push(path.clone());
                    }
                }
                if let Some(children) = &node.children {
                    walk(children, &path, under_separate, joins, separates);
                }
            }
        }
    }
}

/// Builds relation plans over one schema graph
pub struct RelationPlanner<'a> {
    graph: &'a SchemaGraph,
    ceiling: u32,
}

impl<'a> RelationPlanner<'a> {
    pub fn new(graph: &'a SchemaGraph, ceiling: u32) -> Self {
        Self { graph, ceiling }
    }

    /// Plans every relation of `root` for `max_depth` levels.
    ///
    /// Fails with `DepthOutOfRange` unless `1 <= max_depth <= ceiling`.
    pub fn plan(&self, root: SchemaId, max_depth: i64) -> PlannerResult<RelationPlan> {
        if max_depth <= 0 || max_depth > i64::from(self.ceiling) {
            return Err(PlannerError::DepthOutOfRange {
                requested: max_depth,
                ceiling: self.ceiling,
            });
        }
        let depth = max_depth as u32;
        let schema = self.graph.schema(root);

        Ok(RelationPlan {
            root: schema.name().to_string(),
            root_id: root,
            max_depth: depth,
            ceiling: self.ceiling,
            relations: self.plan_level(root, depth, 0),
        })
    }

    /// Plans the relations of `schema`, whose own hop count is `hops`
    fn plan_level(&self, schema: SchemaId, depth: u32, hops: u32) -> RelationMap {
        let descriptor = self.graph.schema(schema);
        let within_ceiling = hops + 1 < self.ceiling;

        descriptor
            .relations()
            .map(|(attribute, relation)| {
                let target = self.graph.target(relation);
                let node = match relation.cardinality {
                    Cardinality::ToOne => {
                        let remaining = depth.saturating_sub(1);
                        RelationNode {
                            fetch_mode: FetchMode::Join,
                            remaining_depth: remaining,
                            target: target.name().to_string(),
                            target_id: target.id(),
                            cardinality: Cardinality::ToOne,
                            children: (remaining > 0 && within_ceiling)
                                .then(|| self.plan_level(target.id(), remaining, hops + 1)),
                        }
                    }
                    Cardinality::ToMany => RelationNode {
                        fetch_mode: FetchMode::Separate,
                        remaining_depth: depth,
                        target: target.name().to_string(),
                        target_id: target.id(),
                        cardinality: Cardinality::ToMany,
                        children: within_ceiling.then(|| self.plan_level(target.id(), depth, hops + 1)),
                    },
                };
                (attribute.name.clone(), node)
            })
            .collect()
    }
}
