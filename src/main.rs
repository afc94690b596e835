use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use acadrec_api::handlers::{advisor, auth, coordinator, courses, messages, parent, student};
use acadrec_api::store::postgres::PgStore;
use acadrec_api::{config, middleware::jwt_auth_middleware, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = config::config();
    tracing::info!("starting acadrec-api in {:?} mode", cfg.environment);

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let store = Arc::new(PgStore::connect(&database_url).await?);
    let state = AppState {
        store: store.clone(),
    };

    let app = app(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install shutdown handler");
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register/:role", post(auth::register))
        .route("/login/:role", post(auth::login))
        .route("/advisors", get(auth::list_advisors))
        .route("/courses/:level/:semester", get(courses::list))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Student surface
        .route("/student/profile", get(student::profile))
        .route("/student/results", get(student::results))
        .route("/student/latest-result", get(student::latest_result))
        .route("/course/register", post(student::register_courses))
        // Reference data maintenance
        .route("/courses/load", post(courses::load))
        .route("/semesters", post(courses::create_semester))
        // Advisor surface
        .route("/advisor/profile", get(advisor::profile))
        .route("/advisor/password", put(advisor::update_password))
        .route("/advisor/upload-results", post(advisor::upload_results))
        .route("/advisor/results", get(advisor::results))
        // Parent surface
        .route(
            "/parent/profile",
            get(parent::profile).put(parent::update_profile),
        )
        .route("/parent/children", post(parent::add_child))
        .route("/parent/child-results", post(parent::child_results))
        .route(
            "/parent/child-latest-result",
            post(parent::child_latest_result),
        )
        // Coordinator surface
        .route(
            "/coordinator/profile",
            get(coordinator::profile).put(coordinator::update_profile),
        )
        .route("/coordinator/password", put(coordinator::update_password))
        .route(
            "/coordinator/courses",
            get(coordinator::courses).put(coordinator::replace_courses),
        )
        .route("/coordinator/courses/add", post(coordinator::add_courses))
        .route(
            "/coordinator/courses/remove",
            post(coordinator::remove_courses),
        )
        // Messaging
        .route("/api/messages", get(messages::inbox))
        .route("/api/messages/student", post(messages::send_to_student))
        .route("/api/messages/parent", post(messages::send_to_parent))
        .route("/api/messages/advisor", post(messages::send_to_advisor))
        .route(
            "/api/messages/my-advisor",
            post(messages::send_to_own_advisor),
        )
        .layer(from_fn_with_state(state, jwt_auth_middleware))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "acadrec-api",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Academic records backend",
        "endpoints": {
            "auth": "/register/:role, /login/:role (public)",
            "reference": "/advisors, /courses/:level/:semester (public)",
            "student": "/student/*, /course/register",
            "parent": "/parent/*",
            "advisor": "/advisor/*",
            "coordinator": "/coordinator/*",
            "messages": "/api/messages/*",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now })),
        ),
        Err(e) => {
            tracing::error!("health probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "timestamp": now })),
            )
        }
    }
}
