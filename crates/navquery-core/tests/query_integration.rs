//! End-to-end tests: filter text through the grammar, the compiler and
//! query assembly.

use navquery_core::catalog::SchemaBundle;
use navquery_core::{
    CompilerConfig, CriteriaBuilder, Error, Predicate, Projection, QueryAssembler,
};
use navquery_proto::{QueryOptions, Value};
use pretty_assertions::assert_eq;

const SCHEMA: &str = r#"{
    "version": 3,
    "entities": [
        {"name": "Customer", "key": "id", "fields": [
            {"name": "id", "type": "Int64"},
            {"name": "name", "type": "String"},
            {"name": "status", "type": "String"},
            {"name": "active", "type": "Boolean"},
            {"name": "token", "type": "Guid", "nullable": true}
        ]},
        {"name": "Order", "key": "id", "fields": [
            {"name": "id", "type": "Int64"},
            {"name": "total", "type": "Decimal"},
            {"name": "placed", "type": "DateTime"},
            {"name": "customer_id", "type": "Int64"},
            {"name": "courier_id", "type": "Int64", "nullable": true}
        ]},
        {"name": "Courier", "key": "id", "fields": [
            {"name": "id", "type": "Int64"},
            {"name": "name", "type": "String"}
        ]}
    ],
    "relations": [
        {"name": "orders", "from_entity": "Customer", "to_entity": "Order",
         "cardinality": "one_to_many", "from_field": "id", "to_field": "customer_id"},
        {"name": "customer", "from_entity": "Order", "to_entity": "Customer",
         "cardinality": "many_to_one", "from_field": "customer_id", "to_field": "id"},
        {"name": "courier", "from_entity": "Order", "to_entity": "Courier",
         "cardinality": "many_to_one", "from_field": "courier_id", "to_field": "id"}
    ]
}"#;

fn schema() -> SchemaBundle {
    SchemaBundle::from_json(SCHEMA).unwrap()
}

fn options(filter: &str) -> QueryOptions {
    let schema = schema();
    let expr = navquery_lang::parse_and_compile_filter(filter, &schema, "Customer").unwrap();
    QueryOptions::new().with_filter(expr)
}

fn plan(filter: &str) -> Result<navquery_core::QueryPlan, Error> {
    let schema = schema();
    let config = CompilerConfig::default();
    QueryAssembler::new(&schema, &config).assemble("Customer", &options(filter))
}

fn predicate(filter: &str) -> String {
    plan(filter)
        .unwrap()
        .predicate
        .map(|p| p.to_string())
        .unwrap_or_default()
}

#[test]
fn navigation_filter_end_to_end() {
    let plan = plan("orders/total gt 100 and status eq 'open'").unwrap();

    assert_eq!(
        plan.predicate.as_ref().map(Predicate::to_string).as_deref(),
        Some("and(gt(orders_alias.total, :p0), eq(status, :p1))")
    );
    assert_eq!(plan.joins.len(), 1);
    assert_eq!(plan.joins.alias_for(&["orders"]), Some("orders_alias"));
    assert_eq!(
        serde_json::to_value(&plan.parameters).unwrap(),
        serde_json::json!({
            "p0": {"type": "Int32", "value": 100},
            "p1": {"type": "String", "value": "open"}
        })
    );
}

#[test]
fn repeated_prefix_is_joined_once() {
    let plan = plan(
        "orders/courier/name eq 'x' or orders/courier/name eq 'y' or orders/total lt 5",
    )
    .unwrap();
    let aliases: Vec<_> = plan.joins.steps().iter().map(|s| s.alias.as_str()).collect();
    assert_eq!(aliases, vec!["orders_alias", "orders_courier_alias"]);

    let parents: Vec<_> = plan
        .joins
        .steps()
        .iter()
        .map(|s| s.parent_alias.as_deref())
        .collect();
    assert_eq!(parents, vec![None, Some("orders_alias")]);
}

#[test]
fn null_safe_equality() {
    assert_eq!(predicate("token eq null"), "isNull(token)");
    assert_eq!(predicate("null ne token"), "isNotNull(token)");
    assert!(matches!(
        plan("token ge null"),
        Err(Error::NullNotComparable { .. })
    ));
}

#[test]
fn navigation_compared_through_foreign_key() {
    let schema = schema();
    let config = CompilerConfig::default();
    let expr =
        navquery_lang::parse_and_compile_filter("courier eq null", &schema, "Order").unwrap();
    let plan = QueryAssembler::new(&schema, &config)
        .assemble("Order", &QueryOptions::new().with_filter(expr))
        .unwrap();
    assert_eq!(
        plan.predicate.map(|p| p.to_string()).as_deref(),
        Some("isNull(courier_id)")
    );
    assert!(plan.joins.is_empty());
}

#[test]
fn short_circuit_law() {
    assert_eq!(predicate("startswith(name, 'Al') eq true"), "like(name, :p0)");
    assert_eq!(
        predicate("startswith(name, 'Al') eq false"),
        "not(like(name, :p0))"
    );
    assert_eq!(predicate("endswith(name, 'son') ne false"), "like(name, :p0)");
}

#[test]
fn pattern_wildcards() {
    for (filter, pattern) in [
        ("startswith(name, 'Al')", "Al%"),
        ("endswith(name, 'son')", "%son"),
        ("substringof('li', name)", "%li%"),
    ] {
        let plan = plan(filter).unwrap();
        assert_eq!(
            plan.predicate.map(|p| p.to_string()).as_deref(),
            Some("like(name, :p0)")
        );
        assert_eq!(
            plan.parameters.get("p0"),
            Some(&Value::String(pattern.to_string()))
        );
    }

    let plan = plan("startswith(name, status)").unwrap();
    assert!(plan.parameters.is_empty());
}

#[test]
fn deferred_comparisons() {
    assert_eq!(
        predicate("indexof(name, 'x') eq 2"),
        "eq(substring(name, 0, add(:p1, 1)), :p0)"
    );
    assert!(matches!(
        plan("indexof(name, 'x') gt 2"),
        Err(Error::UnsupportedOperator { .. })
    ));

    assert_eq!(predicate("compare(name, status) eq 0"), "eq(name, status)");
    assert_eq!(predicate("compare(name, status) ne 0"), "not(eq(name, status))");
    assert!(matches!(
        plan("compare(name, status) lt 0"),
        Err(Error::UnsupportedOperator { .. })
    ));
    assert_eq!(
        predicate("datetimecompare(orders/placed, datetime'2024-01-01T00:00') le 0"),
        "le(orders_alias.placed, :p0)"
    );
}

#[test]
fn deferred_comparisons_only_on_the_left() {
    for filter in [
        "indexof(name, 'x') add 1 eq 3",
        "0 eq compare(name, 'x')",
        "length(indexof(name, 'x')) eq 3",
    ] {
        assert!(
            matches!(plan(filter), Err(Error::UnsupportedOperator { .. })),
            "{} should be rejected",
            filter
        );
    }

    let schema = schema();
    let config = CompilerConfig::default();
    let mut options = QueryOptions::new();
    options.order_by =
        navquery_lang::parse_and_compile_orderby("indexof(name, 'x') desc", &schema, "Customer")
            .unwrap();
    let err = QueryAssembler::new(&schema, &config)
        .assemble("Customer", &options)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperator { .. }));
}

#[test]
fn datetimecompare_normalizes_plain_text() {
    let plan = plan("datetimecompare(orders/placed, '2024-01-01T10:00:00+02:00') gt 0").unwrap();
    assert_eq!(
        serde_json::to_value(&plan.parameters).unwrap(),
        serde_json::json!({
            "p0": {"type": "DateTime", "value": "2024-01-01T08:00:00Z"}
        })
    );
}

#[test]
fn select_and_expand_are_exclusive() {
    let schema = schema();
    let config = CompilerConfig::default();
    let options = QueryOptions::new().with_select("name").with_expand("orders");
    let err = QueryAssembler::new(&schema, &config)
        .assemble("Customer", &options)
        .unwrap_err();
    assert!(matches!(err, Error::ConflictingProjection));
    assert!(err.is_client_error());
}

#[test]
fn every_parameter_is_referenced() {
    let plan = plan(
        "(substringof('a', name) and orders/total ge 10.5M) or not (active) \
         or token eq guid'01234567-89ab-cdef-0123-456789abcdef'",
    )
    .unwrap();

    let predicate = plan.predicate.unwrap();
    let mut referenced = Vec::new();
    predicate.parameters(&mut referenced);
    let bound: Vec<_> = plan.parameters.names().collect();
    assert_eq!(referenced, bound);
    assert_eq!(bound.len(), 4);
}

#[test]
fn full_option_set_drives_builder() {
    let schema = schema();
    let config = CompilerConfig::default().with_max_page_size(25);
    let order_by =
        navquery_lang::parse_and_compile_orderby("orders/total desc, name", &schema, "Customer")
            .unwrap();
    let mut options = options("status eq 'open'").with_top("100").with_skip("50");
    options.order_by = order_by;
    options.expand = Some("orders/courier".to_string());

    let plan = QueryAssembler::new(&schema, &config)
        .assemble("Customer", &options)
        .unwrap();
    assert_eq!(plan.max_results, Some(25));
    assert!(matches!(plan.projection, Projection::Expand(ref items) if items.len() == 1));

    let mut builder = CriteriaBuilder::new(&plan.root_entity, plan.root_alias.clone());
    plan.apply(&mut builder);
    assert_eq!(
        builder.statement().to_string(),
        "select Customer fetch orders_courier_alias \
         join orders orders_alias join orders_alias.courier orders_courier_alias \
         where eq(status, :p0) order by orders_alias.total desc, name asc offset 50 limit 25"
    );
}

#[test]
fn plan_serializes_for_diagnostics() {
    let plan = plan("orders/total gt 100").unwrap();
    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["root_entity"], "Customer");
    assert_eq!(json["joins"]["steps"][0]["alias"], "orders_alias");
    assert_eq!(json["predicate"]["kind"], "compare");
    assert_eq!(json["projection"]["kind"], "all");
}
