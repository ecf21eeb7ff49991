//! Filter text through the lexer, parser and typer.

use std::collections::HashMap;

use navquery_lang::{parse_and_compile_filter, parse_and_compile_orderby, CompileErrorKind, LangError};
use navquery_proto::{EdmType, Expr, MetadataResolver, SortDirection, Value};
use pretty_assertions::assert_eq;

/// A resolver backed by two lookup tables.
struct Model {
    fields: HashMap<(&'static str, &'static str), EdmType>,
    navigations: HashMap<(&'static str, &'static str), &'static str>,
}

impl Model {
    fn shop() -> Self {
        let fields = HashMap::from([
            (("Customer", "name"), EdmType::String),
            (("Customer", "status"), EdmType::String),
            (("Customer", "active"), EdmType::Boolean),
            (("Order", "total"), EdmType::Decimal),
            (("Order", "placed"), EdmType::DateTime),
            (("Order", "customer_id"), EdmType::Int64),
        ]);
        let navigations = HashMap::from([
            (("Customer", "orders"), "Order"),
            (("Order", "customer"), "Customer"),
        ]);
        Self {
            fields,
            navigations,
        }
    }
}

impl MetadataResolver for Model {
    fn is_navigation_property(&self, entity: &str, property: &str) -> bool {
        self.target_entity_type(entity, property).is_some()
    }

    fn target_entity_type(&self, entity: &str, navigation: &str) -> Option<String> {
        self.navigations
            .iter()
            .find(|((e, n), _)| *e == entity && *n == navigation)
            .map(|(_, target)| target.to_string())
    }

    fn is_scalar_property(&self, entity: &str, property: &str) -> bool {
        self.property_type(entity, property).is_some()
    }

    fn property_type(&self, entity: &str, property: &str) -> Option<EdmType> {
        self.fields
            .iter()
            .find(|((e, p), _)| *e == entity && *p == property)
            .map(|(_, ty)| *ty)
    }

    fn foreign_key_column(&self, entity: &str, navigation: &str) -> Option<String> {
        (entity == "Order" && navigation == "customer").then(|| "customer_id".to_string())
    }

    fn has_entity_type(&self, entity: &str) -> bool {
        matches!(entity, "Customer" | "Order")
    }
}

fn typed(source: &str) -> Result<Expr, LangError> {
    parse_and_compile_filter(source, &Model::shop(), "Customer")
}

#[test]
fn precedence_is_preserved() {
    let expr = typed("status eq 'a' or name eq 'b' and active eq true").unwrap();
    assert_eq!(
        expr.to_string(),
        "(status eq 'a' or (name eq 'b' and active eq true))"
    );

    let expr = typed("(status eq 'a' or name eq 'b') and active").unwrap();
    assert_eq!(
        expr.to_string(),
        "((status eq 'a' or name eq 'b') and active)"
    );
}

#[test]
fn paths_are_typed_by_their_last_segment() {
    let expr = typed("orders/total gt -5").unwrap();
    assert_eq!(
        expr,
        Expr::property("orders/total", EdmType::Decimal).gt(Expr::constant(-5i32))
    );

    let expr = parse_and_compile_filter("customer eq null", &Model::shop(), "Order").unwrap();
    assert_eq!(
        expr,
        Expr::property("customer", EdmType::Int64).eq(Expr::null())
    );
}

#[test]
fn typed_literals_keep_their_text() {
    let expr = typed("orders/placed lt datetime'2024-01-01T00:00'").unwrap();
    assert_eq!(
        expr,
        Expr::property("orders/placed", EdmType::DateTime).lt(Expr::typed_constant(
            Value::String("2024-01-01T00:00".into()),
            EdmType::DateTime
        ))
    );
}

#[test]
fn compile_errors_carry_kind_and_source() {
    let source = "soundex(name) eq 'x'";
    let err = typed(source).unwrap_err();
    match &err {
        LangError::Compile(e) => assert_eq!(e.kind, CompileErrorKind::UnknownFunction),
        other => panic!("unexpected error {:?}", other),
    }
    let rendered = err.format_with_source(source);
    assert!(rendered.starts_with("error[UnknownFunction]"));
    assert!(rendered.contains(source));

    let err = typed("orders/weight gt 1").unwrap_err();
    assert!(matches!(
        err,
        LangError::Compile(ref e) if e.kind == CompileErrorKind::UnknownProperty
    ));
}

#[test]
fn parse_errors_point_at_the_input() {
    let err = typed("status eq 'open' and").unwrap_err();
    assert!(matches!(err, LangError::Parse(_)));
    assert!(err.span().start >= 17);
}

#[test]
fn orderby_keys() {
    let keys =
        parse_and_compile_orderby("orders/total desc, name", &Model::shop(), "Customer").unwrap();
    let directions: Vec<_> = keys.iter().map(|k| k.direction).collect();
    assert_eq!(directions, vec![SortDirection::Desc, SortDirection::Asc]);
    assert_eq!(keys[1].expr, Expr::property("name", EdmType::String));
}
