//! Request facade for snatch
//!
//! Every call follows the same flow:
//! 1. Plan relations (rejects an out-of-range `max_level` before any
//!    query text is looked at)
//! 2. Compile filter and order through the query cache
//! 3. Fetch from the record store
//! 4. Render with envelopes
//!
//! Each call is wrapped in an [`ObservationScope`].

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::SnatchConfig;
use crate::observability::ObservationScope;
use crate::planner::{plan_relations, RelationPlan};
use crate::query::{OrderKey, Predicate, QueryCache};
use crate::render::{LinkBuilder, Renderer};
use crate::schema::SchemaGraph;
use crate::store::{resolve_one, FetchRequest, RecordStore};

use super::errors::SnatchResult;
use super::params::QueryParams;

/// One page of rendered entities
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage {
    /// Matching entities before pagination
    pub count: usize,
    pub offset: usize,
    pub limit: usize,
    pub results: Vec<Value>,
}

impl From<ListPage> for Value {
    fn from(page: ListPage) -> Self {
        serde_json::json!({
            "count": page.count,
            "offset": page.offset,
            "limit": page.limit,
            "results": page.results,
        })
    }
}

/// Compiled form of one request
struct Prepared {
    plan: RelationPlan,
    predicate: Option<Arc<Predicate>>,
    order: Arc<Vec<OrderKey>>,
}

impl Prepared {
    fn request<'a>(&'a self, entity: &'a str, params: &QueryParams) -> FetchRequest<'a> {
        let mut request = FetchRequest::new(entity)
            .with_order(self.order.as_slice())
            .with_distinct(params.distinct)
            .with_plan(&self.plan);
        if let Some(predicate) = self.predicate.as_deref() {
            request = request.with_predicate(predicate);
        }
        request
    }
}

/// Query facade over a schema graph and a record store
pub struct Snatch<S> {
    graph: Arc<SchemaGraph>,
    store: S,
    config: SnatchConfig,
    cache: QueryCache,
    links: LinkBuilder,
}

impl<S: RecordStore> Snatch<S> {
    pub fn new(graph: Arc<SchemaGraph>, store: S, config: SnatchConfig) -> Self {
        let cache = QueryCache::new(config.query_cache_capacity);
        let links = LinkBuilder::new(config.link_prefix.clone());
        Self {
            graph,
            store,
            config,
            cache,
            links,
        }
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SnatchConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Lists one page of `entity` records
    pub fn list(&self, entity: &str, params: &QueryParams) -> SnatchResult<ListPage> {
        let scope = ObservationScope::with_fields("SNATCH_LIST", &[("entity", entity)]);
        let result = self.run_list(entity, params);
        match &result {
            Ok(page) => {
                let rows = page.results.len().to_string();
                let count = page.count.to_string();
                scope.complete_with_fields(&[("rows", rows.as_str()), ("count", count.as_str())]);
            }
            Err(e) => scope.reject(e.code(), &e.to_string()),
        }
        result
    }

    /// Retrieves the single `entity` record matching the filter
    pub fn retrieve(&self, entity: &str, params: &QueryParams) -> SnatchResult<Value> {
        let scope = ObservationScope::with_fields("SNATCH_RETRIEVE", &[("entity", entity)]);
        let result = self.run_retrieve(entity, params);
        match &result {
            Ok(_) => scope.complete(),
            Err(e) => scope.reject(e.code(), &e.to_string()),
        }
        result
    }

    /// Number of `entity` records matching the filter, ignoring pagination
    pub fn size(&self, entity: &str, params: &QueryParams) -> SnatchResult<usize> {
        let scope = ObservationScope::with_fields("SNATCH_SIZE", &[("entity", entity)]);
        let result = self.run_size(entity, params);
        match &result {
            Ok(count) => {
                let count = count.to_string();
                scope.complete_with_fields(&[("count", count.as_str())]);
            }
            Err(e) => scope.reject(e.code(), &e.to_string()),
        }
        result
    }

    fn run_list(&self, entity: &str, params: &QueryParams) -> SnatchResult<ListPage> {
        let prepared = self.prepare(entity, params)?;
        let request = prepared.request(entity, params);

        let count = self.store.count(&request)?;
        let rows = self
            .store
            .fetch(&request.with_page(params.offset, Some(params.limit)))?;

        let plan = &prepared.plan;
        let results = self.renderer().render_all(&rows, plan.root_id, plan, plan.max_depth);
        Ok(ListPage {
            count,
            offset: params.offset,
            limit: params.limit,
            results,
        })
    }

    fn run_retrieve(&self, entity: &str, params: &QueryParams) -> SnatchResult<Value> {
        let prepared = self.prepare(entity, params)?;
        let request = prepared.request(entity, params);

        let row = resolve_one(&self.store, &request)?;
        let plan = &prepared.plan;
        Ok(self.renderer().render(&row, plan.root_id, plan, plan.max_depth))
    }

    fn run_size(&self, entity: &str, params: &QueryParams) -> SnatchResult<usize> {
        let prepared = self.prepare(entity, params)?;
        Ok(self.store.count(&prepared.request(entity, params))?)
    }

    fn prepare(&self, entity: &str, params: &QueryParams) -> SnatchResult<Prepared> {
        let plan = plan_relations(entity, &self.graph, params.max_level, self.config.max_level_ceiling)?;

        let predicate = match params.query.as_deref() {
            Some(filter) => Some(self.cache.filter(filter, entity, &self.graph)?),
            None => None,
        };
        let order = match params.order.as_deref() {
            Some(order) => self.cache.order(order, entity, &self.graph)?,
            None => Arc::new(Vec::new()),
        };

        Ok(Prepared {
            plan,
            predicate,
            order,
        })
    }

    fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.graph, &self.links)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SnatchError;
    use crate::planner::PlannerError;
    use crate::query::QueryError;
    use crate::schema::{ScalarType, SchemaDef};
    use crate::store::{MemoryStore, StoreError};
    use serde_json::json;

    fn snatch() -> Snatch<MemoryStore> {
        let graph = Arc::new(
            SchemaGraph::builder()
                .schema(
                    SchemaDef::new("Person")
                        .scalar("id", ScalarType::Int)
                        .scalar("name", ScalarType::String)
                        .to_many("pets", "Pet", "owner"),
                )
                .schema(
                    SchemaDef::new("Pet")
                        .scalar("id", ScalarType::Int)
                        .scalar("name", ScalarType::String)
                        .to_one("owner", "Person", true),
                )
                .build()
                .unwrap(),
        );
        let store = MemoryStore::from_fixture(
            graph.clone(),
            &json!({
                "Person": [{"id": 1, "name": "Alice"}, {"id": 2, "name": "Bob"}],
                "Pet": [
                    {"id": 10, "name": "Rex", "owner": 1},
                    {"id": 11, "name": "Tom", "owner": 1},
                    {"id": 12, "name": "Kit", "owner": null}
                ]
            }),
        )
        .unwrap();
        Snatch::new(graph, store, SnatchConfig::default())
    }

    fn params() -> QueryParams {
        QueryParams::defaults(&SnatchConfig::default())
    }

    #[test]
    fn test_list_renders_envelopes() {
        let snatch = snatch();
        let page = snatch
            .list("Pet", &params().with_query("name.eq.Rex"))
            .unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(
            page.results,
            vec![json!({
                "id": 10,
                "name": "Rex",
                "owner": {
                    "self": {
                        "id": 1,
                        "name": "Alice",
                        "pets": {"self": null, "link": "/api/Pet/list?query=owner.eq.1"}
                    },
                    "link": "/api/Person/detail?query=id.eq.1"
                }
            })]
        );
    }

    #[test]
    fn test_list_paginates_after_counting() {
        let snatch = snatch();
        let page = snatch
            .list("Pet", &params().with_order("id.desc").with_page(1, 1))
            .unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0]["id"], json!(11));
    }

    #[test]
    fn test_retrieve_policy() {
        let snatch = snatch();
        let alice = snatch
            .retrieve("Person", &params().with_query("name.eq.Alice"))
            .unwrap();
        assert_eq!(alice["name"], json!("Alice"));

        assert!(matches!(
            snatch.retrieve("Person", &params()),
            Err(SnatchError::Store(StoreError::NoFilterProvided { .. }))
        ));
        assert!(matches!(
            snatch.retrieve("Person", &params().with_query("name.eq.Zed")),
            Err(SnatchError::Store(StoreError::RecordNotFound { .. }))
        ));
        assert!(matches!(
            snatch.retrieve("Person", &params().with_query("id.gt.0")),
            Err(SnatchError::Store(StoreError::MultipleRecordsFound { count: 2, .. }))
        ));
    }

    #[test]
    fn test_size_ignores_pagination() {
        let snatch = snatch();
        let count = snatch
            .size("Pet", &params().with_query("owner.eq.1").with_page(0, 1))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_depth_is_checked_before_compiling() {
        let snatch = snatch();
        let err = snatch
            .list("Pet", &params().with_query("((broken").with_max_level(9))
            .unwrap_err();
        assert_eq!(
            err,
            SnatchError::Planner(PlannerError::DepthOutOfRange {
                requested: 9,
                ceiling: 3
            })
        );
    }

    #[test]
    fn test_compile_errors_surface_and_cache_is_used() {
        let snatch = snatch();
        assert!(matches!(
            snatch.list("Pet", &params().with_query("color.eq.red")),
            Err(SnatchError::Query(QueryError::UnknownAttribute { .. }))
        ));

        snatch.size("Pet", &params().with_query("name.eq.Rex")).unwrap();
        snatch.size("Pet", &params().with_query("name.eq.Rex")).unwrap();
        assert_eq!(snatch.cache().stats().hits, 1);
    }
}
