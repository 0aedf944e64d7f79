//! Record store seam
//!
//! snatch never persists anything. A [`RecordStore`] executes compiled
//! predicates and order keys and hands back JSON entities, hydrated along
//! a [`RelationPlan`] so they can be rendered with envelopes.
//!
//! [`MemoryStore`] is the in-process implementation used by the CLI and
//! the test suites.

mod errors;
mod evaluate;
mod memory;
mod sorter;

pub use errors::{StoreError, StoreResult};
pub use evaluate::{compare, evaluate, loose_eq};
pub use memory::MemoryStore;
pub use sorter::RowSorter;

use serde_json::Value;

use crate::planner::RelationPlan;
use crate::query::{OrderKey, Predicate};

/// One read against a record store
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub schema: &'a str,
    /// `None` selects every record
    pub predicate: Option<&'a Predicate>,
    pub order: &'a [OrderKey],
    pub offset: usize,
    /// `None` means unbounded
    pub limit: Option<usize>,
    /// Collapse repeated entities. Only stores that join related rows can
    /// produce repeats; [`MemoryStore`] returns each entity at most once.
    pub distinct: bool,
    /// Relations to hydrate on the returned entities
    pub plan: Option<&'a RelationPlan>,
}

impl<'a> FetchRequest<'a> {
    pub fn new(schema: &'a str) -> Self {
        Self {
            schema,
            predicate: None,
            order: &[],
            offset: 0,
            limit: None,
            distinct: false,
            plan: None,
        }
    }

    pub fn with_predicate(mut self, predicate: &'a Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_order(mut self, order: &'a [OrderKey]) -> Self {
        self.order = order;
        self
    }

    pub fn with_page(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn with_plan(mut self, plan: &'a RelationPlan) -> Self {
        self.plan = Some(plan);
        self
    }
}

/// Executes compiled queries
pub trait RecordStore {
    /// Returns matching entities, ordered, paginated and hydrated
    fn fetch(&self, request: &FetchRequest<'_>) -> StoreResult<Vec<Value>>;

    /// Number of matching entities, ignoring pagination
    fn count(&self, request: &FetchRequest<'_>) -> StoreResult<usize>;
}

/// Resolves exactly one entity.
///
/// - no filter (or a match-everything filter): `NoFilterProvided`
/// - no match: `RecordNotFound`
/// - several matches: `MultipleRecordsFound`
pub fn resolve_one<S: RecordStore + ?Sized>(store: &S, request: &FetchRequest<'_>) -> StoreResult<Value> {
    match request.predicate {
        Some(predicate) if !predicate.is_all() => {}
        _ => {
            return Err(StoreError::NoFilterProvided {
                schema: request.schema.to_string(),
            })
        }
    }

    // Unpaginated so the exact count can be reported
    let unpaged = request.with_page(0, None);
    let mut rows = store.fetch(&unpaged)?;
    match rows.len() {
        0 => Err(StoreError::RecordNotFound {
            schema: request.schema.to_string(),
        }),
        1 => Ok(rows.remove(0)),
        count => Err(StoreError::MultipleRecordsFound {
            schema: request.schema.to_string(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Comparison, SemanticOp};
    use serde_json::json;

    struct FixedStore(Vec<Value>);

    impl RecordStore for FixedStore {
        fn fetch(&self, _request: &FetchRequest<'_>) -> StoreResult<Vec<Value>> {
            Ok(self.0.clone())
        }

        fn count(&self, _request: &FetchRequest<'_>) -> StoreResult<usize> {
            Ok(self.0.len())
        }
    }

    fn filter() -> Predicate {
        Predicate::Compare(Comparison::new(&["id"], SemanticOp::Exact, json!(1)))
    }

    #[test]
    fn test_resolve_one_policy() {
        let predicate = filter();
        let request = FetchRequest::new("Person").with_predicate(&predicate);

        assert_eq!(
            resolve_one(&FixedStore(vec![]), &request).unwrap_err(),
            StoreError::RecordNotFound {
                schema: "Person".into()
            }
        );
        assert_eq!(
            resolve_one(&FixedStore(vec![json!({"id": 1})]), &request).unwrap(),
            json!({"id": 1})
        );
        assert_eq!(
            resolve_one(&FixedStore(vec![json!({}), json!({})]), &request).unwrap_err(),
            StoreError::MultipleRecordsFound {
                schema: "Person".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_resolve_one_requires_filter() {
        let store = FixedStore(vec![json!({"id": 1})]);
        let all = Predicate::all();
        for request in [
            FetchRequest::new("Person"),
            FetchRequest::new("Person").with_predicate(&all),
        ] {
            assert!(matches!(
                resolve_one(&store, &request),
                Err(StoreError::NoFilterProvided { .. })
            ));
        }
    }
}
