pub mod config;
pub mod error;
pub mod export;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MoodChat API",
        version = "0.1.0",
        description = "Persona chat backed by a hosted text-generation model"
    ),
    paths(
        routes::health_check,
        routes::chat,
        routes::upload_file,
        routes::list_sessions,
        routes::create_session,
        routes::get_active_session,
        routes::get_session,
        routes::delete_session,
        routes::activate_session,
        routes::send_message,
        routes::cancel_message,
        routes::pin_message,
        routes::delete_message,
        routes::get_message_segments,
        routes::list_moods,
        routes::create_mood,
        routes::delete_mood,
        routes::export_mood,
    ),
    components(schemas(
        error::ErrorResponse,
        routes::HealthResponse,
        routes::ChatRequest,
        routes::ChatSuccess,
        routes::ChatFailure,
        routes::UploadResponse,
        routes::UploadFailure,
        routes::CreateSessionRequest,
        routes::SendMessageRequest,
        routes::SendMessageResponse,
        routes::PinResponse,
        routes::CancelResponse,
        routes::CreateMoodRequest,
        moodchat_core::ChatSession,
        moodchat_core::Message,
        moodchat_core::Role,
        moodchat_core::Mood,
        moodchat_core::Segment,
        moodchat_core::MediaAttachment,
        moodchat_core::WeatherData,
        moodchat_core::WeatherCondition,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "chat", description = "Stateless chat exchange"),
        (name = "upload", description = "File uploads"),
        (name = "sessions", description = "Chat session management endpoints"),
        (name = "moods", description = "Persona management endpoints"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let uploads_dir = state.config.uploads_dir.clone();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        .route("/health", get(routes::health_check))
        .route("/api/chat", post(routes::chat))
        .route(
            "/api/upload",
            post(routes::upload_file).layer(DefaultBodyLimit::max(routes::MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/sessions",
            get(routes::list_sessions).post(routes::create_session),
        )
        .route("/api/sessions/active", get(routes::get_active_session))
        .route(
            "/api/sessions/{id}",
            get(routes::get_session).delete(routes::delete_session),
        )
        .route(
            "/api/sessions/{id}/activate",
            post(routes::activate_session),
        )
        .route("/api/sessions/{id}/messages", post(routes::send_message))
        .route("/api/sessions/{id}/cancel", post(routes::cancel_message))
        .route(
            "/api/sessions/{id}/messages/{message_id}",
            delete(routes::delete_message),
        )
        .route(
            "/api/sessions/{id}/messages/{message_id}/pin",
            post(routes::pin_message),
        )
        .route(
            "/api/sessions/{id}/messages/{message_id}/segments",
            get(routes::get_message_segments),
        )
        .route(
            "/api/moods",
            get(routes::list_moods).post(routes::create_mood),
        )
        .route("/api/moods/{id}", delete(routes::delete_mood))
        .route("/api/moods/{id}/export", get(routes::export_mood))
        .nest_service(routes::UPLOADS_ROUTE, ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
