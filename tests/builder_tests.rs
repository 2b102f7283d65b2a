use rql_builder::{
    compile, BuildError, Builder, CountStyle, Dialect, LikeStyle, OutputShape, StatementKind, Tree,
};
use serde_json::{json, Value};

fn tree(value: Value) -> Tree {
    Tree::from_value(value).unwrap()
}

fn criteria(tree: &Tree) -> Value {
    Builder::with_dialect(Dialect::new().with_shape(OutputShape::Criteria))
        .build(tree)
        .unwrap()
}

fn id(name: &str) -> Value {
    json!({"type": "IDENTIFIER", "value": name})
}

fn key(name: &str) -> Value {
    json!({"type": "KEY", "value": name})
}

fn op(symbol: &str) -> Value {
    json!({"type": "OPERATOR", "value": symbol})
}

fn val(value: Value) -> Value {
    json!({"type": "VALUE", "value": value})
}

fn cond(marker: &str) -> Value {
    json!({"type": "CONDITION", "value": marker})
}

fn select_all_from(collection: &str) -> Vec<Value> {
    vec![
        json!([id("SELECT"), val(json!("*"))]),
        json!([id("FROM"), val(json!(collection))]),
    ]
}

fn with_where(mut groups: Vec<Value>, clause: Vec<Value>) -> Tree {
    let mut group = vec![id("WHERE")];
    group.extend(clause);
    groups.push(Value::Array(group));
    tree(Value::Array(groups))
}

#[test]
fn test_select_star() {
    let query = compile(&tree(Value::Array(select_all_from("books")))).unwrap();

    assert_eq!(
        query,
        json!({"find": "books", "filter": {}, "sort": {}, "projection": {}, "skip": 0, "limit": 0})
    );
}

#[test]
fn test_select_fields_from_schema_object() {
    let tree = tree(json!([
        [id("SELECT"), val(json!(["title", "author", "year"]))],
        [id("FROM"), val(json!({"table": "books", "schema": "foo"}))]
    ]));

    assert_eq!(
        criteria(&tree),
        json!({
            "collection": "books",
            "fn": "find",
            "fields": {"title": 1, "author": 1, "year": 1},
            "options": {},
            "criteria": {}
        })
    );
}

#[test]
fn test_where_simple() {
    let tree = with_where(
        vec![json!([id("SELECT"), val(json!(["id"]))]), json!([id("FROM"), val(json!("users"))])],
        vec![key("firstName"), val(json!("Test")), key("lastName"), val(json!("User"))],
    );

    assert_eq!(
        criteria(&tree),
        json!({
            "collection": "users",
            "fn": "find",
            "criteria": {"firstName": "Test", "lastName": "User"},
            "fields": {"id": 1},
            "options": {}
        })
    );
}

#[test]
fn test_where_multiple_operators() {
    let tree = with_where(
        select_all_from("users"),
        vec![key("votes"), op(">"), val(json!(100)), op("<"), val(json!(200))],
    );

    let query = compile(&tree).unwrap();
    assert_eq!(query["filter"], json!({"votes": {"$gt": 100, "$lt": 200}}));
}

#[test]
fn test_where_null_and_not_null() {
    let null = with_where(select_all_from("users"), vec![key("updatedAt"), val(Value::Null)]);
    assert_eq!(compile(&null).unwrap()["filter"], json!({"updatedAt": null}));

    let not_null = with_where(
        select_all_from("users"),
        vec![cond("NOT"), key("updatedAt"), val(Value::Null)],
    );
    assert_eq!(compile(&not_null).unwrap()["filter"], json!({"updatedAt": {"$ne": null}}));
}

#[test]
fn test_where_not() {
    let keys = with_where(
        select_all_from("users"),
        vec![
            cond("NOT"),
            key("firstName"),
            val(json!("Test")),
            cond("NOT"),
            key("lastName"),
            val(json!("User")),
        ],
    );
    assert_eq!(
        compile(&keys).unwrap()["filter"],
        json!({"firstName": {"$ne": "Test"}, "lastName": {"$ne": "User"}})
    );

    let operator = with_where(
        select_all_from("users"),
        vec![cond("NOT"), key("votes"), op(">"), val(json!(100))],
    );
    assert_eq!(compile(&operator).unwrap()["filter"], json!({"votes": {"$not": {"$gt": 100}}}));
}

#[test]
fn test_where_in_and_not_in() {
    let is_in = with_where(
        select_all_from("users"),
        vec![key("id"), cond("IN"), val(json!([1, 2, 3]))],
    );
    assert_eq!(compile(&is_in).unwrap()["filter"], json!({"id": {"$in": [1, 2, 3]}}));

    let not_in = with_where(
        select_all_from("users"),
        vec![cond("NOT"), key("id"), cond("IN"), val(json!([1, 2, 3]))],
    );
    assert_eq!(compile(&not_in).unwrap()["filter"], json!({"id": {"$nin": [1, 2, 3]}}));
}

#[test]
fn test_in_inside_or() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("OR"),
            json!([key("id"), cond("IN"), val(json!([1, 2, 3]))]),
            json!([key("id"), cond("IN"), val(json!([4, 5, 6]))]),
        ],
    );

    assert_eq!(
        compile(&tree).unwrap()["filter"],
        json!({"$or": [{"id": {"$in": [1, 2, 3]}}, {"id": {"$in": [4, 5, 6]}}]})
    );
}

#[test]
fn test_not_in_inside_or_with_sibling_criteria() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("OR"),
            json!([
                cond("NOT"),
                key("id"),
                cond("IN"),
                val(json!([1, 2, 3])),
                key("age"),
                val(json!(21))
            ]),
            json!([cond("NOT"), key("id"), cond("IN"), val(json!([4, 5, 6]))]),
        ],
    );

    assert_eq!(
        compile(&tree).unwrap()["filter"],
        json!({"$or": [
            {"id": {"$nin": [1, 2, 3]}, "age": 21},
            {"id": {"$nin": [4, 5, 6]}}
        ]})
    );
}

#[test]
fn test_not_before_group() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("NOT"),
            json!([key("a"), val(json!(1))]),
            key("b"),
            val(json!(2)),
        ],
    );

    assert_eq!(
        compile(&tree).unwrap()["filter"],
        json!({"$or": [{"a": {"$ne": 1}}], "b": 2})
    );
}

#[test]
fn test_not_in_before_group_under_and() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("AND"),
            cond("NOT"),
            cond("IN"),
            json!([key("id"), val(json!([1, 2]))]),
            json!([key("age"), op(">"), val(json!(21))]),
        ],
    );

    assert_eq!(
        compile(&tree).unwrap()["filter"],
        json!({"$and": [{"id": {"$nin": [1, 2]}}, {"age": {"$gt": 21}}]})
    );
}

#[test]
fn test_double_not_before_group_cancels() {
    let tree = with_where(
        select_all_from("users"),
        vec![cond("NOT"), json!([cond("NOT"), key("a"), val(json!(1))])],
    );

    assert_eq!(compile(&tree).unwrap()["filter"], json!({"$or": [{"a": 1}]}));
}

#[test]
fn test_not_before_boolean_group_is_unsupported() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("NOT"),
            json!([cond("OR"), [key("a"), val(json!(1))], [key("b"), val(json!(2))]]),
        ],
    );

    assert!(matches!(compile(&tree), Err(BuildError::UnsupportedConstruct(_))));
}

#[test]
fn test_and_group_with_repeated_key_inside_or() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("OR"),
            json!([cond("AND"), [key("a"), val(json!(5))], [key("a"), cond("IN"), val(json!([1, 2]))]]),
            json!([key("b"), val(json!(3))]),
        ],
    );

    assert_eq!(
        compile(&tree).unwrap()["filter"],
        json!({"$or": [{"a": 5, "$and": [{"a": {"$in": [1, 2]}}]}, {"b": 3}]})
    );
}

#[test]
fn test_or() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("OR"),
            json!([key("id"), op(">"), val(json!(10))]),
            json!([key("name"), val(json!("Tester"))]),
        ],
    );

    assert_eq!(
        compile(&tree).unwrap(),
        json!({
            "find": "users",
            "filter": {"$or": [{"id": {"$gt": 10}}, {"name": "Tester"}]},
            "sort": {},
            "projection": {},
            "skip": 0,
            "limit": 0
        })
    );
}

#[test]
fn test_nested_or() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("OR"),
            json!([
                cond("OR"),
                [key("id"), val(json!(1))],
                [key("id"), op(">"), val(json!(10))]
            ]),
            json!([key("name"), val(json!("Tester"))]),
        ],
    );

    assert_eq!(
        criteria(&tree)["criteria"],
        json!({"$or": [
            {"$or": [{"id": 1}, {"id": {"$gt": 10}}]},
            {"name": "Tester"}
        ]})
    );
}

#[test]
fn test_and_array() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("AND"),
            json!([key("firstName"), val(json!("foo"))]),
            json!([key("lastName"), val(json!("bar"))]),
        ],
    );

    assert_eq!(
        compile(&tree).unwrap()["filter"],
        json!({"$and": [{"firstName": "foo"}, {"lastName": "bar"}]})
    );
}

#[test]
fn test_and_of_ors() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("AND"),
            json!([
                cond("OR"),
                [key("firstName"), val(json!("John"))],
                [key("lastName"), val(json!("Smith"))]
            ]),
            json!([
                cond("OR"),
                [key("qty"), op(">"), val(json!(100))],
                [key("price"), op("<"), val(json!(10.0))]
            ]),
        ],
    );

    assert_eq!(
        compile(&tree).unwrap()["filter"],
        json!({"$and": [
            {"$or": [{"firstName": "John"}, {"lastName": "Smith"}]},
            {"$or": [{"qty": {"$gt": 100}}, {"price": {"$lt": 10.0}}]}
        ]})
    );
}

#[test]
fn test_like_forms() {
    let cases = [("%Test%", "Test"), ("Test%", "^Test"), ("%Test", "Test$"), ("Test", "^Test$")];

    for (pattern, expected) in cases {
        let tree = with_where(
            select_all_from("users"),
            vec![
                cond("OR"),
                json!([key("name"), op("like"), val(json!(pattern))]),
                json!([cond("NOT"), key("id"), cond("IN"), val(json!([1, 2, 3]))]),
            ],
        );

        assert_eq!(
            compile(&tree).unwrap()["filter"],
            json!({"$or": [
                {"name": {"$regex": expected}},
                {"id": {"$nin": [1, 2, 3]}}
            ]})
        );
    }
}

#[test]
fn test_like_literal_style() {
    let tree = with_where(
        select_all_from("users"),
        vec![key("name"), op("LIKE"), val(json!("%Test%"))],
    );
    let builder = Builder::with_dialect(Dialect::new().with_like(LikeStyle::Literal));

    assert_eq!(
        builder.build(&tree).unwrap()["filter"],
        json!({"name": {"$regularExpression": {"pattern": "Test", "options": ""}}})
    );
}

#[test]
fn test_count() {
    let single = tree(json!([
        [id("COUNT"), val(json!(["active"]))],
        [id("FROM"), val(json!("users"))]
    ]));
    assert_eq!(
        compile(&single).unwrap(),
        json!({
            "aggregate": "users",
            "pipeline": [{"$group": {"_id": "$active", "count": {"$sum": 1}}}]
        })
    );

    let multiple = tree(json!([
        [id("COUNT"), val(json!(["active", "inactive"]))],
        [id("FROM"), val(json!("users"))]
    ]));
    assert_eq!(
        compile(&multiple).unwrap(),
        json!({
            "aggregate": "users",
            "pipeline": [{
                "$group": {
                    "_id": {"active": "$active", "inactive": "$inactive"},
                    "count": {"$sum": 1}
                }
            }]
        })
    );
}

#[test]
fn test_count_exists_style() {
    let tree = tree(json!([
        [id("COUNT"), val(json!(["active", "inactive"]))],
        [id("FROM"), val(json!("users"))]
    ]));
    let builder = Builder::with_dialect(Dialect::new().with_count(CountStyle::Exists));

    assert_eq!(
        builder.build(&tree).unwrap(),
        json!({
            "count": "users",
            "query": {"active": {"$exists": true}, "inactive": {"$exists": true}}
        })
    );
}

#[test]
fn test_distinct() {
    let single = tree(json!([
        [id("DISTINCT"), val(json!(["firstName"]))],
        [id("FROM"), val(json!("customers"))]
    ]));
    assert_eq!(
        criteria(&single),
        json!({
            "collection": "customers",
            "fn": "distinct",
            "fields": {},
            "options": {"val": "firstName"},
            "criteria": {}
        })
    );

    let multiple = tree(json!([
        [id("DISTINCT"), val(json!(["firstName", "lastName"]))],
        [id("FROM"), val(json!("customers"))]
    ]));
    assert_eq!(
        criteria(&multiple),
        json!({
            "collection": "customers",
            "fn": "aggregate",
            "fields": {},
            "options": {"val": [{"$group": {"_id": {"firstName": "$firstName", "lastName": "$lastName"}}}]},
            "criteria": {}
        })
    );
    assert_eq!(
        compile(&single).unwrap(),
        json!({"distinct": "customers", "key": "firstName", "query": {}})
    );
}

#[test]
fn test_group_by_with_filter() {
    let tree = tree(json!([
        [id("GROUPBY"), val(json!("status"))],
        [id("FROM"), val(json!("orders"))],
        [id("WHERE"), key("total"), op(">="), val(json!(50))]
    ]));

    assert_eq!(
        compile(&tree).unwrap(),
        json!({
            "aggregate": "orders",
            "pipeline": [
                {"$match": {"total": {"$gte": 50}}},
                {"$group": {"_id": "$status"}}
            ]
        })
    );
}

#[test]
fn test_insert() {
    let tree = tree(json!([
        [id("INSERT"), key("title"), val(json!("Slaughterhouse Five")), key("author"), val(json!("Kurt Vonnegut"))],
        [id("INTO"), val(json!("books"))]
    ]));

    assert_eq!(
        criteria(&tree),
        json!({
            "collection": "books",
            "fn": "insert",
            "fields": {},
            "options": {"title": "Slaughterhouse Five", "author": "Kurt Vonnegut"},
            "criteria": {}
        })
    );
    assert_eq!(
        compile(&tree).unwrap(),
        json!({
            "insert": "books",
            "documents": [{"title": "Slaughterhouse Five", "author": "Kurt Vonnegut"}]
        })
    );
}

#[test]
fn test_update() {
    let tree = tree(json!([
        [id("UPDATE"), key("status"), val(json!("archived")), key("active"), val(json!(false))],
        [id("WHERE"), key("publishedDate"), op(">"), val(json!(2000))],
        [id("USING"), val(json!("books"))]
    ]));

    assert_eq!(
        criteria(&tree),
        json!({
            "collection": "books",
            "fn": "update",
            "update": {"$set": {"status": "archived", "active": false}},
            "options": {"multi": true},
            "criteria": {"publishedDate": {"$gt": 2000}}
        })
    );
    assert_eq!(
        compile(&tree).unwrap(),
        json!({
            "update": "books",
            "updates": [{
                "q": {"publishedDate": {"$gt": 2000}},
                "u": {"$set": {"status": "archived", "active": false}},
                "multi": true
            }]
        })
    );
}

#[test]
fn test_update_null() {
    let tree = tree(json!([
        [id("UPDATE"), key("status"), val(Value::Null)],
        [id("USING"), val(json!("books"))]
    ]));

    assert_eq!(
        criteria(&tree),
        json!({
            "collection": "books",
            "fn": "update",
            "update": {"$set": {"status": null}},
            "options": {"multi": true},
            "criteria": {}
        })
    );
}

#[test]
fn test_delete() {
    let tree = tree(json!([
        [id("DELETE")],
        [id("FROM"), val(json!("accounts"))],
        [id("WHERE"), key("activated"), val(json!(false))]
    ]));

    assert_eq!(
        criteria(&tree),
        json!({
            "collection": "accounts",
            "fn": "remove",
            "options": {},
            "criteria": {"activated": false}
        })
    );
    assert_eq!(
        compile(&tree).unwrap(),
        json!({"delete": "accounts", "deletes": [{"q": {"activated": false}, "limit": 0}]})
    );
}

#[test]
fn test_order_by() {
    let mut groups = select_all_from("users");
    groups.push(json!([id("ORDERBY"), key("name"), val(json!("desc")), key("age"), val(json!("asc"))]));

    assert_eq!(
        criteria(&tree(Value::Array(groups))),
        json!({
            "collection": "users",
            "fn": "find",
            "fields": {},
            "options": {"sort": {"name": -1, "age": 1}},
            "criteria": {}
        })
    );
}

#[test]
fn test_order_by_invalid_direction() {
    let mut groups = select_all_from("users");
    groups.push(json!([id("ORDERBY"), key("name"), val(json!("upwards"))]));

    let result = compile(&tree(Value::Array(groups)));
    match result {
        Err(BuildError::InvalidSortDirection { field, .. }) => assert_eq!(field, "name"),
        other => panic!("expected an invalid sort direction, got {:?}", other),
    }
}

#[test]
fn test_limit_skip_offset() {
    let mut limit = select_all_from("users");
    limit.push(json!([id("LIMIT"), val(json!(10))]));
    assert_eq!(criteria(&tree(Value::Array(limit)))["options"], json!({"limit": 10}));

    for identifier in ["SKIP", "OFFSET"] {
        let mut groups = select_all_from("users");
        groups.push(json!([id(identifier), val(json!(10))]));

        assert_eq!(
            compile(&tree(Value::Array(groups))).unwrap(),
            json!({"find": "users", "filter": {}, "sort": {}, "projection": {}, "skip": 10, "limit": 0})
        );
    }
}

#[test]
fn test_join_is_ignored() {
    let mut groups = select_all_from("users");
    groups.push(json!([id("INNERJOIN"), val(json!({"from": "posts", "on": {"users": "id", "posts": "author"}}))]));

    let query = compile(&tree(Value::Array(groups))).unwrap();
    assert_eq!(query["find"], json!("users"));
    assert_eq!(query["filter"], json!({}));
}

#[test]
fn test_kind_is_not_reset_by_select() {
    let tree = tree(json!([
        [id("COUNT"), val(json!(true))],
        [id("SELECT"), val(json!(["name"]))],
        [id("FROM"), val(json!("users"))]
    ]));

    let model = Builder::new().compile_model(&tree).unwrap();
    assert_eq!(model.kind(), StatementKind::Count);
    assert_eq!(
        compile(&tree).unwrap(),
        json!({
            "aggregate": "users",
            "pipeline": [{"$group": {"_id": null, "count": {"$sum": 1}}}]
        })
    );
}

#[test]
fn test_output_is_deterministic() {
    let tree = with_where(
        select_all_from("users"),
        vec![
            cond("OR"),
            json!([key("b"), val(json!(2)), key("a"), val(json!(1))]),
            json!([key("c"), op("<>"), val(json!(3))]),
        ],
    );

    let first = serde_json::to_string(&compile(&tree).unwrap()).unwrap();
    let second = serde_json::to_string(&compile(&tree).unwrap()).unwrap();
    assert_eq!(first, second);
    assert!(first.find("\"b\"").unwrap() < first.find("\"a\"").unwrap());
}

#[test]
fn test_build_json_input() {
    let input = r#"[
        [{"type": "IDENTIFIER", "value": "SELECT"}, {"type": "VALUE", "value": "*"}],
        [{"type": "IDENTIFIER", "value": "FROM"}, {"type": "VALUE", "value": "users"}],
        [{"type": "IDENTIFIER", "value": "WHERE"}, {"type": "KEY", "value": "age"},
         {"type": "OPERATOR", "value": ">="}, {"type": "VALUE", "value": 18}]
    ]"#;

    let query = Builder::new().build_json(input).unwrap();
    assert_eq!(query["filter"], json!({"age": {"$gte": 18}}));
}
