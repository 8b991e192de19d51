// src/bin/api_server.rs

use anyhow::Context;
use std::sync::Arc;
use table_view_sql::infra::config::{DatabaseConfig, ServiceConfig};
use table_view_sql::infra::telemetry::init_tracing;
use table_view_sql::transport;
use table_view_sql::{storage, DataTableService, ServiceOptions, ViewRegistry};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    // --- Configuration ---
    let db_config = DatabaseConfig::from_env()?;
    let service_config = ServiceConfig::from_env()?;
    println!(
        "> Dialect: {} (schema cache: {}, timeout: {:?}, max page size: {})",
        db_config.dialect.dialect().name(),
        service_config.schema_cache,
        service_config.query_timeout,
        service_config.max_page_size
    );

    // --- View Registry ---
    println!("> Loading views from {}...", service_config.views_file);
    let views = ViewRegistry::load(&service_config.views_file)?;
    if views.is_empty() {
        println!("> No views configured; POST /api/views/{{view}} will answer 404.");
    } else {
        println!("> Views: {}", views.names().join(", "));
    }

    // --- Service Initialization ---
    println!("> Connecting to database...");
    let adapter = storage::connect(&db_config)
        .await
        .context("failed to open database pool")?;
    let service = DataTableService::new(
        adapter,
        ServiceOptions {
            schema_cache: service_config.schema_cache,
            timeout: service_config.query_timeout,
        },
    );
    println!("> DataTableService initialized successfully.");

    let app_state = transport::http::AppState {
        service: Arc::new(service),
        views: Arc::new(views),
        max_page_size: service_config.max_page_size,
    };

    // --- API Server Initialization ---
    println!("> Starting API server...");
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&service_config.bind_addr).await?;
    println!("> API server listening on http://{}", listener.local_addr()?);
    println!("> Swagger UI available at http://{}/swagger-ui", listener.local_addr()?);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n> Shutdown signal received (Ctrl+C)...");
            println!("> Graceful shutdown complete.");
        }
    }

    Ok(())
}
