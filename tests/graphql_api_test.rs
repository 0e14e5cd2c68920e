use anyhow::Result;
use async_graphql::{Request, Variables};
use cat_api::app::CatResolver;
use cat_api::auth::{Role, Session, SessionUser};
use cat_api::graphql::{create_schema, GraphQLSchema};
use cat_api::storage::InMemoryCatStore;
use serde_json::{json, Value};
use std::sync::Arc;

const CREATE: &str = r#"
    mutation Create($input: CatInput!) {
        createCat(input: $input) { id name owner location { lat lng } }
    }
"#;

const UPDATE: &str = r#"
    mutation Update($id: ID!, $input: CatModifyInput!) {
        updateCat(id: $id, input: $input) { id name owner }
    }
"#;

const DELETE: &str = r#"
    mutation Delete($id: ID!) {
        deleteCat(id: $id) { id name }
    }
"#;

fn schema() -> GraphQLSchema {
    create_schema(CatResolver::new(Arc::new(InMemoryCatStore::new())))
}

fn as_user(id: &str, role: Role) -> Session {
    Session::authenticated(SessionUser::new(id, role))
}

async fn run(schema: &GraphQLSchema, session: Session, query: &str, vars: Value) -> Value {
    let request = Request::new(query)
        .variables(Variables::from_json(vars))
        .data(session);
    let response = schema.execute(request).await;
    serde_json::to_value(&response).expect("response serializes")
}

fn error_code(body: &Value) -> &Value {
    &body["errors"][0]["extensions"]["code"]
}

async fn create(schema: &GraphQLSchema, owner: &str, name: &str, lat: f64, lng: f64) -> String {
    let body = run(
        schema,
        as_user(owner, Role::User),
        CREATE,
        json!({ "input": { "name": name, "location": { "lat": lat, "lng": lng } } }),
    )
    .await;
    body["data"]["createCat"]["id"]
        .as_str()
        .expect("created cat has an id")
        .to_string()
}

#[tokio::test]
async fn tom_scenario_end_to_end() -> Result<()> {
    let schema = schema();

    let body = run(
        &schema,
        as_user("u1", Role::User),
        CREATE,
        json!({ "input": { "name": "Tom", "owner": "u2", "location": { "lat": 60.1, "lng": 24.9 } } }),
    )
    .await;
    assert_eq!(body["data"]["createCat"]["owner"], "u1");
    let id = body["data"]["createCat"]["id"].as_str().unwrap().to_string();

    let body = run(
        &schema,
        as_user("u2", Role::User),
        UPDATE,
        json!({ "id": id, "input": { "name": "Hijacked" } }),
    )
    .await;
    assert_eq!(error_code(&body), "NOT_FOUND");
    assert_eq!(body["errors"][0]["message"], "Cat not found");

    let body = run(
        &schema,
        as_user("admin-1", Role::Admin),
        UPDATE,
        json!({ "id": id, "input": { "name": "Thomas" } }),
    )
    .await;
    assert!(body["errors"].is_null());
    assert_eq!(body["data"]["updateCat"]["name"], "Thomas");
    assert_eq!(body["data"]["updateCat"]["owner"], "u1");
    Ok(())
}

#[tokio::test]
async fn mutations_without_session_are_unauthenticated() -> Result<()> {
    let schema = schema();

    for (query, vars) in [
        (
            CREATE,
            json!({ "input": { "name": "Tom", "location": { "lat": 0.0, "lng": 0.0 } } }),
        ),
        (UPDATE, json!({ "id": "x", "input": { "name": "Y" } })),
        (DELETE, json!({ "id": "x" })),
    ] {
        let body = run(&schema, Session::anonymous(), query, vars).await;
        assert_eq!(error_code(&body), "UNAUTHENTICATED");
    }
    Ok(())
}

#[tokio::test]
async fn request_without_session_data_is_treated_as_anonymous() -> Result<()> {
    let schema = schema();
    let request = Request::new(DELETE).variables(Variables::from_json(json!({ "id": "x" })));

    let body = serde_json::to_value(schema.execute(request).await)?;
    assert_eq!(error_code(&body), "UNAUTHENTICATED");
    Ok(())
}

#[tokio::test]
async fn queries_report_not_found_with_code() -> Result<()> {
    let schema = schema();

    let body = run(
        &schema,
        Session::anonymous(),
        r#"{ catById(id: "missing") { id } }"#,
        json!({}),
    )
    .await;
    assert_eq!(error_code(&body), "NOT_FOUND");

    let body = run(
        &schema,
        Session::anonymous(),
        r#"{ catsByOwner(ownerId: "nobody") { id } }"#,
        json!({}),
    )
    .await;
    assert_eq!(error_code(&body), "NOT_FOUND");

    let body = run(&schema, Session::anonymous(), "{ cats { id } }", json!({})).await;
    assert!(body["errors"].is_null());
    assert_eq!(body["data"]["cats"], json!([]));
    Ok(())
}

#[tokio::test]
async fn cats_by_area_filters_on_location() -> Result<()> {
    let schema = schema();
    create(&schema, "u1", "Inside", 5.0, 5.0).await;
    create(&schema, "u2", "Outside", 20.0, 5.0).await;

    let body = run(
        &schema,
        Session::anonymous(),
        r#"{ catsByArea(topRight: { lat: 10, lng: 10 }, bottomLeft: { lat: 0, lng: 0 }) { name owner } }"#,
        json!({}),
    )
    .await;

    assert_eq!(
        body["data"]["catsByArea"],
        json!([{ "name": "Inside", "owner": "u1" }])
    );
    Ok(())
}

#[tokio::test]
async fn delete_twice_reports_not_found() -> Result<()> {
    let schema = schema();
    let id = create(&schema, "u1", "Tom", 1.0, 1.0).await;

    let body = run(&schema, as_user("u1", Role::User), DELETE, json!({ "id": id })).await;
    assert_eq!(body["data"]["deleteCat"]["name"], "Tom");

    let body = run(&schema, as_user("u1", Role::User), DELETE, json!({ "id": id })).await;
    assert_eq!(error_code(&body), "NOT_FOUND");

    let body = run(
        &schema,
        Session::anonymous(),
        r#"{ catsByOwner(ownerId: "u1") { id } }"#,
        json!({}),
    )
    .await;
    assert_eq!(error_code(&body), "NOT_FOUND");
    Ok(())
}
