use crate::auth::JwtAuth;
use crate::graphql::GraphQLSchema;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cat_api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus text exposition
async fn metrics() -> impl IntoResponse {
    match crate::metrics::render() {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed",
        )
            .into_response(),
    }
}

/// GraphiQL IDE endpoint
async fn graphiql() -> impl IntoResponse {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// GraphQL handler (supports GET and POST). The bearer token, if any,
/// becomes the session the resolvers see.
async fn graphql_handler(
    Extension(schema): Extension<GraphQLSchema>,
    Extension(auth): Extension<Arc<JwtAuth>>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let session = auth.session_from_header(header);
    schema.execute(req.into_inner().data(session)).await.into()
}

/// Create the HTTP router with all routes
pub fn create_server(schema: GraphQLSchema, auth: Arc<JwtAuth>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/graphql", get(graphql_handler).post(graphql_handler))
        .route("/graphiql", get(graphiql))
        .layer(Extension(schema))
        .layer(Extension(auth))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Serve `app` until Ctrl-C
pub async fn start_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    info!("HTTP server running on http://{}", addr);
    info!("GraphQL:      http://{}/graphql", addr);
    info!("GraphiQL UI:  http://{}/graphiql", addr);
    info!("Health check: http://{}/health", addr);

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
