//! In-memory record store
//!
//! Rows are JSON objects grouped per schema. A to-one relation is stored as
//! the target's key; a to-many relation is never stored and is derived from
//! the target rows whose `remote` attribute holds the owner's key.
//!
//! Reads never mutate the store, so a populated store can be shared across
//! threads behind an `Arc`.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::observability::Logger;
use crate::planner::RelationMap;
use crate::schema::{AttributeKind, Cardinality, Relation, SchemaGraph, SchemaId};

use super::errors::{StoreError, StoreResult};
use super::evaluate::{evaluate, loose_eq};
use super::sorter::RowSorter;
use super::{FetchRequest, RecordStore};

#[derive(Debug, Clone)]
pub struct MemoryStore {
    graph: Arc<SchemaGraph>,
    /// Rows indexed by schema position in the graph
    rows: Vec<Vec<Value>>,
}

impl MemoryStore {
    pub fn new(graph: Arc<SchemaGraph>) -> Self {
        let rows = vec![Vec::new(); graph.len()];
        Self { graph, rows }
    }

    /// Builds a store from `{"Schema": [rows...], ...}`
    pub fn from_fixture(graph: Arc<SchemaGraph>, fixture: &Value) -> StoreResult<Self> {
        let mut store = Self::new(graph);
        let tables = fixture
            .as_object()
            .ok_or_else(|| StoreError::invalid("*", "fixture must be an object of schema names"))?;

        for (schema, rows) in tables {
            let rows = rows
                .as_array()
                .ok_or_else(|| StoreError::invalid(schema, "fixture rows must be an array"))?;
            for row in rows {
                store.insert(schema, row.clone())?;
            }
        }
        Ok(store)
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Adds a row. The primary key must be present, non-null and unique.
    pub fn insert(&mut self, schema: &str, row: Value) -> StoreResult<()> {
        let descriptor = self
            .graph
            .get(schema)
            .ok_or_else(|| StoreError::UnknownSchema(schema.to_string()))?;
        let id = descriptor.id();
        let pk = descriptor.primary_key();

        let key = match row.as_object().and_then(|fields| fields.get(pk)) {
            Some(key) if !key.is_null() => key,
            Some(_) => return Err(StoreError::invalid(schema, format!("'{}' is null", pk))),
            None => return Err(StoreError::invalid(schema, format!("missing '{}'", pk))),
        };
        if self.find_by_key(id, key).is_some() {
            return Err(StoreError::invalid(schema, format!("duplicate {} {}", pk, key)));
        }

        self.rows[id.index()].push(row);
        Ok(())
    }

    /// Stored rows of a schema, in insertion order
    pub fn rows(&self, schema: &str) -> StoreResult<&[Value]> {
        let id = self.schema_id(schema)?;
        Ok(&self.rows[id.index()])
    }

    fn schema_id(&self, schema: &str) -> StoreResult<SchemaId> {
        self.graph
            .get(schema)
            .map(|descriptor| descriptor.id())
            .ok_or_else(|| StoreError::UnknownSchema(schema.to_string()))
    }

    fn find_by_key(&self, schema: SchemaId, key: &Value) -> Option<&Value> {
        let pk = self.graph.schema(schema).primary_key();
        self.rows[schema.index()]
            .iter()
            .find(|row| row.get(pk).map_or(false, |value| loose_eq(value, key)))
    }

    /// Target rows of a to-many relation owned by the row with key `owner_key`
    fn related<'s>(&'s self, relation: &'s Relation, owner_key: &'s Value) -> impl Iterator<Item = &'s Value> + 's {
        let remote = relation.remote.as_deref().unwrap_or_default();
        self.rows[relation.target.index()]
            .iter()
            .filter(move |row| row.get(remote).map_or(false, |value| loose_eq(value, owner_key)))
    }

    /// Every value reached from `row` by following `path`
    fn path_values(&self, row: &Value, schema: SchemaId, path: &[String]) -> Vec<Value> {
        let mut current: Vec<(SchemaId, &Value)> = vec![(schema, row)];
        let mut values = Vec::new();

        for (index, segment) in path.iter().enumerate() {
            let is_last = index + 1 == path.len();
            let mut next = Vec::new();

            for (schema, row) in current {
                let descriptor = self.graph.schema(schema);
                let attribute = match descriptor.attribute(segment) {
                    Some(attribute) => attribute,
                    None => continue,
                };
                let raw = row.get(segment).unwrap_or(&Value::Null);

                match &attribute.kind {
                    AttributeKind::Scalar(_) => {
                        if is_last {
                            values.push(raw.clone());
                        }
                    }
                    AttributeKind::Relation(relation) => match relation.cardinality {
                        Cardinality::ToOne => {
                            if is_last {
                                values.push(raw.clone());
                            } else if let Some(target) = self.find_by_key(relation.target, raw) {
                                next.push((relation.target, target));
                            }
                        }
                        Cardinality::ToMany => {
                            let owner_key = match row.get(descriptor.primary_key()) {
                                Some(key) => key,
                                None => continue,
                            };
                            let target_pk = self.graph.target(relation).primary_key();
                            for target in self.related(relation, owner_key) {
                                if is_last {
                                    values.push(target.get(target_pk).cloned().unwrap_or(Value::Null));
                                } else {
                                    next.push((relation.target, target));
                                }
                            }
                        }
                    },
                }
            }
            current = next;
        }
        values
    }

    /// Copies `row`, replacing relation fields according to the plan level
    fn hydrate(&self, row: &Value, schema: SchemaId, nodes: &RelationMap) -> Value {
        let fields = match row.as_object() {
            Some(fields) => fields,
            None => return row.clone(),
        };
        let descriptor = self.graph.schema(schema);
        let owner_key = fields.get(descriptor.primary_key());
        let mut out: Map<String, Value> = fields.clone();

        for (attribute, relation) in descriptor.relations() {
            let node = match nodes.get(&attribute.name) {
                Some(node) => node,
                None => continue,
            };
            match relation.cardinality {
                Cardinality::ToOne => {
                    let target = fields
                        .get(&attribute.name)
                        .filter(|key| !key.is_null())
                        .and_then(|key| self.find_by_key(relation.target, key));
                    if let Some(target) = target {
                        let hydrated = match &node.children {
                            Some(children) => self.hydrate(target, relation.target, children),
                            None => target.clone(),
                        };
                        out.insert(attribute.name.clone(), hydrated);
                    }
                }
                Cardinality::ToMany => {
                    let (children, owner_key) = match (&node.children, owner_key) {
                        (Some(children), Some(owner_key)) => (children, owner_key),
                        _ => continue,
                    };
                    let items = self
                        .related(relation, owner_key)
                        .map(|item| self.hydrate(item, relation.target, children))
                        .collect();
                    out.insert(attribute.name.clone(), Value::Array(items));
                }
            }
        }
        Value::Object(out)
    }

    /// Rows are unique by primary key and filtering never repeats one, so
    /// `distinct` needs no work here.
    fn matching(&self, request: &FetchRequest<'_>) -> StoreResult<(SchemaId, Vec<Value>)> {
        let id = self.schema_id(request.schema)?;
        let rows: Vec<Value> = self.rows[id.index()]
            .iter()
            .filter(|row| match request.predicate {
                Some(predicate) => evaluate(predicate, &|path: &[String]| self.path_values(row, id, path)),
                None => true,
            })
            .cloned()
            .collect();
        Ok((id, rows))
    }
}

impl RecordStore for MemoryStore {
    fn fetch(&self, request: &FetchRequest<'_>) -> StoreResult<Vec<Value>> {
        let (id, rows) = self.matching(request)?;

        let rows = RowSorter::sort(rows, request.order, |row, path| {
            self.path_values(row, id, path).into_iter().next()
        });

        let page = rows
            .into_iter()
            .skip(request.offset)
            .take(request.limit.unwrap_or(usize::MAX));
        let rows: Vec<Value> = match request.plan {
            Some(plan) => page.map(|row| self.hydrate(&row, id, &plan.relations)).collect(),
            None => page.collect(),
        };

        let count = rows.len().to_string();
        Logger::trace("STORE_FETCH", &[("schema", request.schema), ("rows", count.as_str())]);
        Ok(rows)
    }

    fn count(&self, request: &FetchRequest<'_>) -> StoreResult<usize> {
        self.matching(request).map(|(_, rows)| rows.len())
    }
}
