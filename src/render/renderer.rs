//! Depth-limited envelope renderer
//!
//! Copies declared scalar fields and wraps every relation field in an
//! [`Envelope`]. Only to-one descent consumes depth budget; to-many
//! collections are expanded as far as the plan allows.
//!
//! Rendering is total: malformed or partial entities degrade to link-only
//! or empty envelopes, never to an error.

use serde_json::{Map, Value};

use crate::planner::{RelationMap, RelationNode, RelationPlan};
use crate::schema::{Attribute, AttributeKind, Cardinality, Relation, SchemaDescriptor, SchemaGraph, SchemaId};

use super::envelope::Envelope;
use super::links::LinkBuilder;

pub struct Renderer<'a> {
    graph: &'a SchemaGraph,
    links: &'a LinkBuilder,
}

impl<'a> Renderer<'a> {
    pub fn new(graph: &'a SchemaGraph, links: &'a LinkBuilder) -> Self {
        Self { graph, links }
    }

    /// Renders `entity` of `schema`. The root itself is never wrapped.
    pub fn render(&self, entity: &Value, schema: SchemaId, plan: &RelationPlan, depth_budget: u32) -> Value {
        self.render_entity(entity, schema, Some(&plan.relations), depth_budget)
    }

    /// Renders a list of root entities
    pub fn render_all(&self, entities: &[Value], schema: SchemaId, plan: &RelationPlan, depth_budget: u32) -> Vec<Value> {
        entities
            .iter()
            .map(|entity| self.render(entity, schema, plan, depth_budget))
            .collect()
    }

    fn render_entity(
        &self,
        entity: &Value,
        schema: SchemaId,
        nodes: Option<&RelationMap>,
        budget: u32,
    ) -> Value {
        let fields = match entity {
            Value::Object(fields) => fields,
            other => return other.clone(),
        };
        let descriptor = self.graph.schema(schema);
        let owner_key = fields.get(descriptor.primary_key());

        let mut out = Map::new();
        for attribute in descriptor.attributes() {
            let raw = fields.get(&attribute.name);
            match &attribute.kind {
                AttributeKind::Scalar(_) => {
                    if let Some(value) = raw {
                        out.insert(attribute.name.clone(), value.clone());
                    }
                }
                AttributeKind::Relation(relation) => {
                    let node = nodes.and_then(|nodes| nodes.get(&attribute.name));
                    let envelope = match relation.cardinality {
                        Cardinality::ToOne => match raw {
                            Some(raw) => self.to_one(raw, relation, node, budget),
                            None => continue,
                        },
                        Cardinality::ToMany => {
                            self.to_many(raw, attribute, relation, owner_key, node, budget)
                        }
                    };
                    out.insert(attribute.name.clone(), envelope.into_value());
                }
            }
        }
        Value::Object(out)
    }

    fn to_one(&self, raw: &Value, relation: &Relation, node: Option<&RelationNode>, budget: u32) -> Envelope {
        if raw.is_null() {
            return Envelope::empty();
        }

        let target = self.graph.target(relation);
        let (key, hydrated) = match raw {
            Value::Object(fields) => (fields.get(target.primary_key()), true),
            bare => (Some(bare), false),
        };
        let link = key.and_then(|key| self.links.detail(target, key));

        if budget == 0 || !hydrated {
            return Envelope::link_only(link);
        }

        let children = node.and_then(|node| node.children.as_ref());
        let rendered = self.render_entity(raw, target.id(), children, budget - 1);
        Envelope::expanded(rendered, link)
    }

    fn to_many(
        &self,
        raw: Option<&Value>,
        attribute: &Attribute,
        relation: &Relation,
        owner_key: Option<&Value>,
        node: Option<&RelationNode>,
        budget: u32,
    ) -> Envelope {
        if let Some(Value::Null) = raw {
            return Envelope::empty();
        }
        if let Some(Value::Array(items)) = raw {
            if items.is_empty() {
                return Envelope::empty();
            }
        }

        let target = self.graph.target(relation);
        let link = self.list_link(target, attribute, relation, owner_key);

        let children = match node.and_then(|node| node.children.as_ref()) {
            Some(children) => children,
            None => return Envelope::link_only(link),
        };
        let items = match raw {
            Some(Value::Array(items)) => items,
            _ => return Envelope::link_only(link),
        };

        let rendered = items
            .iter()
            .map(|item| self.render_entity(item, target.id(), Some(children), budget))
            .collect();
        Envelope::expanded(Value::Array(rendered), link)
    }

    fn list_link(
        &self,
        target: &SchemaDescriptor,
        attribute: &Attribute,
        relation: &Relation,
        owner_key: Option<&Value>,
    ) -> Option<String> {
        let remote = relation.remote.as_deref().unwrap_or(attribute.name.as_str());
        owner_key.and_then(|key| self.links.list(target, remote, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::RelationPlanner;
    use crate::schema::{ScalarType, SchemaDef};
    use serde_json::json;

    fn graph() -> SchemaGraph {
        SchemaGraph::builder()
            .schema(
                SchemaDef::new("Person")
                    .scalar("id", ScalarType::Int)
                    .scalar("name", ScalarType::String)
                    .to_one("employer", "Company", true)
                    .to_many("pets", "Pet", "owner"),
            )
            .schema(
                SchemaDef::new("Pet")
                    .scalar("id", ScalarType::Int)
                    .scalar("name", ScalarType::String)
                    .to_one("owner", "Person", true),
            )
            .schema(
                SchemaDef::new("Company")
                    .scalar("id", ScalarType::Int)
                    .scalar("title", ScalarType::String),
            )
            .build()
            .unwrap()
    }

    fn render(entity: &Value, depth: i64, budget: u32) -> Value {
        let graph = graph();
        let person = graph.get("Person").unwrap().id();
        let plan = RelationPlanner::new(&graph, 3).plan(person, depth).unwrap();
        let links = LinkBuilder::default();
        Renderer::new(&graph, &links).render(entity, person, &plan, budget)
    }

    fn alice() -> Value {
        json!({
            "id": 1,
            "name": "Alice",
            "secret": "dropped",
            "employer": {"id": 9, "title": "Acme"},
            "pets": [{"id": 3, "name": "Rex", "owner": 1}]
        })
    }

    #[test]
    fn test_budget_zero_is_link_only() {
        let out = render(&alice(), 1, 0);
        assert_eq!(
            out["employer"],
            json!({"self": null, "link": "/api/Company/detail?query=id.eq.9"})
        );
    }

    #[test]
    fn test_expands_to_one_and_to_many() {
        let out = render(&alice(), 1, 1);
        assert_eq!(out["name"], "Alice");
        assert!(out.get("secret").is_none());
        assert_eq!(out["employer"]["self"], json!({"id": 9, "title": "Acme"}));

        let pets = &out["pets"];
        assert_eq!(pets["link"], "/api/Pet/list?query=owner.eq.1");
        assert_eq!(pets["self"][0]["name"], "Rex");
        // the pet's owner is a bare key at this level
        assert_eq!(
            pets["self"][0]["owner"],
            json!({"self": null, "link": "/api/Person/detail?query=id.eq.1"})
        );
    }

    #[test]
    fn test_null_and_empty_relations() {
        let entity = json!({"id": 2, "name": "Bob", "employer": null, "pets": []});
        let out = render(&entity, 1, 1);
        assert_eq!(out["employer"], json!({"self": null, "link": null}));
        assert_eq!(out["pets"], json!({"self": null, "link": null}));
    }

    #[test]
    fn test_unfetched_to_many_and_absent_to_one() {
        let entity = json!({"id": 2, "name": "Bob"});
        let out = render(&entity, 1, 1);
        assert!(out.get("employer").is_none());
        assert_eq!(
            out["pets"],
            json!({"self": null, "link": "/api/Pet/list?query=owner.eq.2"})
        );
    }

    #[test]
    fn test_idempotent() {
        let a = serde_json::to_string(&render(&alice(), 2, 2)).unwrap();
        let b = serde_json::to_string(&render(&alice(), 2, 2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_object_root_passes_through() {
        assert_eq!(render(&json!(42), 1, 1), json!(42));
    }
}
