//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FcmPush, PgAuthProvider, PgStore, SesMailer},
    config::Config,
    error::ApiError,
    web::{
        auth::{
            login_handler, logout_handler, me_handler, resend_verification_handler,
            reset_password_handler, signup_handler, verify_email_handler,
        },
        entries::{
            create_entry_handler, export_handler, import_handler, list_entries_handler,
            mood_series_handler, mood_stats_handler, word_cloud_handler,
        },
        health_handler,
        middleware::require_auth,
        notifications::{
            daily_reminder_handler, preferences_handler, register_token_handler, schedule_handler,
        },
        rest::ApiDoc,
        state::AppState,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(db_pool.clone()));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let from_email = config
        .ses_from_email
        .clone()
        .ok_or_else(|| ApiError::Internal("SES_FROM_EMAIL is required".to_string()))?;
    let mailer = Arc::new(SesMailer::from_env(from_email).await);

    let auth_provider = Arc::new(PgAuthProvider::new(
        db_pool,
        mailer,
        config.app_base_url.clone(),
    ));

    let fcm_server_key = config
        .fcm_server_key
        .clone()
        .ok_or_else(|| ApiError::Internal("FCM_SERVER_KEY is required".to_string()))?;
    let push = Arc::new(FcmPush::new(config.fcm_endpoint.clone(), fcm_server_key));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        auth: auth_provider,
        profiles: store.clone(),
        entries: store,
        push,
        config: config.clone(),
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("invalid CORS_ORIGIN: {e}")))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no cookie auth; the batch endpoints check the bearer
    // secret themselves).
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/reset-password", post(reset_password_handler))
        .route("/auth/verify-email", post(verify_email_handler))
        .route("/health", get(health_handler))
        .route("/notifications/schedule", post(schedule_handler))
        .route("/notifications/daily-reminder", get(daily_reminder_handler));

    // Protected routes (session cookie required).
    let protected_routes = Router::new()
        .route("/me", get(me_handler))
        .route("/auth/resend-verification", post(resend_verification_handler))
        .route("/entries", post(create_entry_handler).get(list_entries_handler))
        .route("/entries/stats", get(mood_stats_handler))
        .route("/entries/mood-series", get(mood_series_handler))
        .route("/entries/word-cloud", get(word_cloud_handler))
        .route("/entries/export", get(export_handler))
        .route("/entries/import", post(import_handler))
        .route("/notifications/preferences", put(preferences_handler))
        .route("/notifications/register", post(register_token_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
