//! HTTP handlers: GraphQL over POST, subscriptions over WebSocket, SDL, health

use actix_web::{web, HttpRequest, HttpResponse};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse, GraphQLSubscription};

use crate::middleware::RequestContext;
use crate::schema::AppSchema;

pub async fn graphql_handler(
    schema: web::Data<AppSchema>,
    http_req: HttpRequest,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let ctx = RequestContext::from_http(&http_req);
    schema.execute(req.into_inner().data(ctx)).await.into()
}

pub async fn graphql_subscription_handler(
    schema: web::Data<AppSchema>,
    req: HttpRequest,
    payload: web::Payload,
) -> actix_web::Result<HttpResponse> {
    GraphQLSubscription::new(schema.as_ref().clone()).start(&req, payload)
}

/// SDL (Schema Definition Language) endpoint
pub async fn schema_handler(schema: web::Data<AppSchema>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(schema.sdl())
}

pub async fn health_handler() -> &'static str {
    "ok"
}

/// Register every route on an actix `App`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/graphql", web::post().to(graphql_handler))
        .route("/graphql", web::get().to(graphql_subscription_handler))
        .route("/ws", web::get().to(graphql_subscription_handler))
        .route("/graphql/schema", web::get().to(schema_handler))
        .route("/health", web::get().to(health_handler));
}
