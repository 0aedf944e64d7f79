//! Query Language Tests
//!
//! Filter and order strings against a schema graph:
//! - Parsing then compiling is deterministic
//! - Boolean groups, value lists and wildcard operators compile as documented
//! - Unbalanced brackets and bad paths are rejected with the offending part
//! - The query cache returns the same predicates as direct compilation

use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};
use snatch::query::{
    compile, compile_order, parse, parse_and_compile, validate, Comparison, OrderKey, Predicate,
    QueryCache, QueryError, SemanticOp,
};
use snatch::schema::{ScalarType, SchemaDef, SchemaGraph};

// =============================================================================
// Helper Functions
// =============================================================================

fn graph() -> SchemaGraph {
    SchemaGraph::builder()
        .schema(
            SchemaDef::new("Person")
                .scalar("id", ScalarType::Int)
                .scalar("name", ScalarType::String)
                .scalar("age", ScalarType::Int)
                .scalar("status", ScalarType::String)
                .scalar("email", ScalarType::String)
                .scalar("born", ScalarType::Date)
                .scalar("active", ScalarType::Bool)
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
                .scalar("name", ScalarType::String),
        )
        .build()
        .unwrap()
}

fn cmp(path: &[&str], op: SemanticOp, value: Value) -> Predicate {
    Predicate::Compare(Comparison::new(path, op, value))
}

fn path(dotted: &str) -> Vec<String> {
    dotted.split('.').map(str::to_string).collect()
}

// =============================================================================
// Compilation Tests
// =============================================================================

/// The same string always compiles to a structurally equal predicate.
#[test]
fn test_compilation_is_deterministic() {
    let graph = graph();
    let filter = "or(name.like.J*,and(age.gte.18,not(status.eq.banned))),pets.name.in.(Rex,Tom)";

    let first = parse_and_compile(filter, "Person", &graph).unwrap();
    for _ in 0..100 {
        assert_eq!(parse_and_compile(filter, "Person", &graph).unwrap(), first);
    }
}

#[test]
fn test_and_group() {
    let graph = graph();
    let predicate = parse_and_compile("and(name.eq.John,age.gt.18)", "Person", &graph).unwrap();

    assert_eq!(
        predicate,
        Predicate::and(vec![
            cmp(&["name"], SemanticOp::Exact, json!("John")),
            cmp(&["age"], SemanticOp::Gt, json!(18)),
        ])
    );
    assert_eq!(predicate.to_string(), "AND(name exact \"John\", age gt 18)");
}

#[test]
fn test_crate_doc_example_compiles() {
    let graph = graph();
    let predicate = parse_and_compile(
        "name.eq.John,or(age.gt.18,pets.name.like.R*)",
        "Person",
        &graph,
    )
    .unwrap();

    assert_eq!(
        predicate,
        Predicate::and(vec![
            cmp(&["name"], SemanticOp::Exact, json!("John")),
            Predicate::Or(vec![
                cmp(&["age"], SemanticOp::Gt, json!(18)),
                cmp(&["pets", "name"], SemanticOp::StartsWith, json!("R")),
            ]),
        ])
    );
}

#[test]
fn test_or_group() {
    let graph = graph();
    let predicate =
        parse_and_compile("or(status.eq.active,status.eq.pending)", "Person", &graph).unwrap();

    assert_eq!(
        predicate,
        Predicate::Or(vec![
            cmp(&["status"], SemanticOp::Exact, json!("active")),
            cmp(&["status"], SemanticOp::Exact, json!("pending")),
        ])
    );
}

#[test]
fn test_like_wildcards() {
    let graph = graph();
    let cases = [
        ("name.like.*oh*", SemanticOp::Contains),
        ("name.like.oh*", SemanticOp::StartsWith),
        ("name.like.*oh", SemanticOp::EndsWith),
        ("name.like.oh", SemanticOp::Exact),
    ];

    for (filter, op) in cases {
        assert_eq!(
            parse_and_compile(filter, "Person", &graph).unwrap(),
            cmp(&["name"], op, json!("oh")),
            "filter {}",
            filter
        );
    }
}

#[test]
fn test_null_checks() {
    let graph = graph();
    assert_eq!(
        parse_and_compile("id.eq.null", "Person", &graph).unwrap(),
        cmp(&["id"], SemanticOp::IsNull, Value::Null)
    );
    assert_eq!(
        parse_and_compile("id.neq.null", "Person", &graph).unwrap(),
        cmp(&["id"], SemanticOp::IsNotNull, Value::Null)
    );
    assert_eq!(
        parse_and_compile("email.is.null", "Person", &graph).unwrap(),
        cmp(&["email"], SemanticOp::IsNull, Value::Null)
    );
}

#[test]
fn test_neq_sets_the_leaf_negation() {
    let graph = graph();
    assert_eq!(
        parse_and_compile("status.neq.closed", "Person", &graph).unwrap(),
        Predicate::Compare(
            Comparison::new(&["status"], SemanticOp::Exact, json!("closed")).negated()
        )
    );
}

#[test]
fn test_membership_and_range() {
    let graph = graph();
    assert_eq!(
        parse_and_compile("id.in.(1,2,3)", "Person", &graph).unwrap(),
        cmp(&["id"], SemanticOp::In, json!([1, 2, 3]))
    );
    assert_eq!(
        parse_and_compile("age.between.(18,65)", "Person", &graph).unwrap(),
        cmp(&["age"], SemanticOp::Range, json!([18, 65]))
    );
}

#[test]
fn test_not_negates_its_whole_group() {
    let graph = graph();
    let predicate =
        parse_and_compile("not(name.eq.John,active.is.true)", "Person", &graph).unwrap();

    assert_eq!(
        predicate,
        Predicate::negate(Predicate::and(vec![
            cmp(&["name"], SemanticOp::Exact, json!("John")),
            cmp(&["active"], SemanticOp::Exact, json!(true)),
        ]))
    );
}

#[test]
fn test_date_parts_and_relation_paths() {
    let graph = graph();
    let predicate = parse_and_compile(
        "born.year.1990,employer.name.like.*Corp,pets.owner.pk.eq.7",
        "Person",
        &graph,
    )
    .unwrap();

    assert_eq!(
        predicate,
        Predicate::and(vec![
            cmp(&["born"], SemanticOp::Year, json!(1990)),
            cmp(&["employer", "name"], SemanticOp::EndsWith, json!("Corp")),
            cmp(&["pets", "owner", "id"], SemanticOp::Exact, json!(7)),
        ])
    );
    assert_eq!(
        predicate.paths(),
        vec!["born", "employer.name", "pets.owner.id"]
    );
}

#[test]
fn test_parse_then_compile_matches_facade() {
    let graph = graph();
    let root = graph.get("Pet").unwrap().id();
    let tokens = parse("owner.age.lt.30").unwrap();

    assert_eq!(
        compile(&tokens, root, &graph).unwrap(),
        parse_and_compile("owner.age.lt.30", "Pet", &graph).unwrap()
    );
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_unbalanced_brackets() {
    let graph = graph();
    for filter in ["and(a.eq.1", "a.eq.1)", ")(", ""] {
        assert!(
            matches!(
                parse_and_compile(filter, "Person", &graph),
                Err(QueryError::BracketImbalance(_))
            ),
            "filter {:?}",
            filter
        );
    }
}

#[test]
fn test_path_validation() {
    let graph = graph();
    let pet = graph.get("Pet").unwrap().id();

    let resolved = validate(&path("owner.name"), pet, &graph).unwrap();
    assert_eq!(resolved.dotted(), "owner.name");
    assert_eq!(resolved.value_type, ScalarType::String);

    assert_eq!(
        validate(&path("name.owner"), pet, &graph).unwrap_err(),
        QueryError::NonTerminalLeafAttribute {
            attribute: "name".to_string(),
            schema: "Pet".to_string(),
        }
    );
    assert_eq!(
        validate(&path("owner.color"), pet, &graph).unwrap_err(),
        QueryError::UnknownAttribute {
            attribute: "color".to_string(),
            schema: "Person".to_string(),
        }
    );
}

#[test]
fn test_operator_and_value_errors() {
    let graph = graph();
    assert!(matches!(
        parse_and_compile("age.near.18", "Person", &graph),
        Err(QueryError::UnknownOperator { .. })
    ));
    assert!(matches!(
        parse_and_compile("age.gt.old", "Person", &graph),
        Err(QueryError::InvalidValue { .. })
    ));
    assert!(matches!(
        parse_and_compile("age.between.(1,2,3)", "Person", &graph),
        Err(QueryError::InvalidOperand { .. })
    ));
    assert_eq!(
        parse_and_compile("id.eq.1", "Robot", &graph).unwrap_err(),
        QueryError::UnknownSchema("Robot".to_string())
    );
}

// =============================================================================
// Order Tests
// =============================================================================

#[test]
fn test_order_keys() {
    let graph = graph();
    let keys = compile_order("age.desc,employer.name,pk.asc", "Person", &graph).unwrap();

    assert_eq!(
        keys,
        vec![
            OrderKey {
                path: path("age"),
                descending: true
            },
            OrderKey {
                path: path("employer.name"),
                descending: false
            },
            OrderKey {
                path: path("id"),
                descending: false
            },
        ]
    );
}

// =============================================================================
// Cache and Concurrency Tests
// =============================================================================

#[test]
fn test_cache_hit_equals_direct_compilation() {
    let graph = graph();
    let cache = QueryCache::new(8);
    let filter = "or(name.eq.John,age.gt.18)";

    let miss = cache.filter(filter, "Person", &graph).unwrap();
    let hit = cache.filter(filter, "Person", &graph).unwrap();

    assert_eq!(*miss, parse_and_compile(filter, "Person", &graph).unwrap());
    assert!(Arc::ptr_eq(&miss, &hit));
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn test_concurrent_compilation_is_equal() {
    let graph = Arc::new(graph());
    let cache = Arc::new(QueryCache::new(4));
    let filter = "and(name.like.*oh*,or(age.lt.18,pets.name.in.(Rex,Tom)))";
    let expected = parse_and_compile(filter, "Person", &graph).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let graph = Arc::clone(&graph);
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let direct = parse_and_compile(filter, "Person", &graph).unwrap();
                let cached = cache.filter(filter, "Person", &graph).unwrap();
                (direct, (*cached).clone())
            })
        })
        .collect();

    for handle in handles {
        let (direct, cached) = handle.join().unwrap();
        assert_eq!(direct, expected);
        assert_eq!(cached, expected);
    }
}
