// File: services/bookline_backend/src/main.rs
use axum::{routing::get, Router};
use bookline_booking::handlers::health_handler;
use bookline_booking::routes as booking_routes;
use bookline_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod service_factory;

#[tokio::main]
async fn main() {
    let config = Arc::new(load_config().expect("Failed to load config"));
    bookline_common::logging::init();

    // Startup sanity check: a misconfigured credential should be visible
    // in the logs long before the first booking fails.
    match config.gcal.as_ref() {
        Some(gcal)
            if gcal.access_token.is_some()
                || (gcal.client_id.is_some()
                    && gcal.client_secret.is_some()
                    && gcal.refresh_token.is_some()) =>
        {
            info!("✅ Google credential configuration present.")
        }
        _ => warn!("⚠️ No Google credential configured (BOOKLINE__GCAL__*)."),
    }

    let api_router = match service_factory::build_booking_state(config.clone()) {
        Some(state) => booking_routes(state),
        // Keep the health probe alive even when booking cannot run.
        None => Router::new().route("/", get(health_handler)),
    };

    #[allow(unused_mut)]
    let mut app = Router::new()
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http());

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use bookline_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("📖 Adding Swagger UI at /api/docs");
        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", BookingApiDoc::openapi());
        app = app.merge(swagger_ui);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("🚀 Bookline listening at http://{addr}/api");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
