//! Envelope serialization
//!
//! Renders entities whose relation fields are wrapped as
//! `{"self": <expanded or null>, "link": <locator or null>}`.
//!
//! | relation | value | result |
//! |---|---|---|
//! | to-one | null | `{null, null}` |
//! | to-one | bare key, or budget 0 | `{null, link}` |
//! | to-one | hydrated | `{render(child, budget - 1), link}` |
//! | to-many | null or empty | `{null, null}` |
//! | to-many | not fetched, or plan stops here | `{null, link}` |
//! | to-many | fetched | `{[render(item, budget)], link}` |

mod envelope;
mod links;
mod renderer;

pub use envelope::Envelope;
pub use links::LinkBuilder;
pub use renderer::Renderer;

use serde_json::Value;

use crate::planner::RelationPlan;
use crate::schema::SchemaGraph;

/// Renders `entity` as an instance of the plan's root schema
pub fn render_with_envelopes(
    entity: &Value,
    graph: &SchemaGraph,
    plan: &RelationPlan,
    links: &LinkBuilder,
    depth_budget: u32,
) -> Value {
    Renderer::new(graph, links).render(entity, plan.root_id, plan, depth_budget)
}
