use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::prelude::*;

use post_service::config::{Config, StoreBackend};
use post_service::db::{InMemoryPostStore, PgPostStore, PostStore};
use post_service::handlers;
use post_service::middleware::JwtAuthGate;
use post_service::schema::build_schema;
use post_service::services::{NotificationBus, PostService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Structured JSON logging with span context for log aggregation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,post_service=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    info!("Starting Post Service...");

    let config = Config::from_env().context("Failed to load configuration")?;

    let store: Arc<dyn PostStore> = match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory post store");
            Arc::new(InMemoryPostStore::new())
        }
        StoreBackend::Postgres => {
            let url = config
                .store
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when POST_STORE=postgres")?;
            let store = PgPostStore::connect(url, config.store.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            store
                .migrate()
                .await
                .context("Failed to run post store migrations")?;
            Arc::new(store)
        }
    };

    let auth = Arc::new(JwtAuthGate::new(&config.jwt));
    info!(
        issuer = ?config.jwt.issuer,
        "JWT authentication enabled with HS256 algorithm"
    );

    let service = Arc::new(PostService::with_policy(
        store,
        auth,
        NotificationBus::new(),
        config.posts.clone(),
    ));
    let schema = build_schema(service, &config.graphql);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        workers = config.server.workers,
        "Post Service starting on http://{}", bind_addr
    );

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(schema.clone()))
            .configure(handlers::configure)
    })
    .workers(config.server.workers)
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
