//! HTTP route table.

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::{auth, config, handlers, handlers::admin, paths, state::AppState};

/// Flashcard forms may carry two audio files plus text fields
const FLASHCARD_BODY_LIMIT: usize = 2 * config::MAX_AUDIO_UPLOAD_BYTES + 1024 * 1024;

/// Build the full application router
pub fn router(state: AppState) -> Router {
  let media_dir = state.config.media_dir.clone();

  let admin_routes = Router::new()
    .route("/admin/", get(admin::index))
    .route("/admin/login", get(auth::login_page).post(auth::login_submit))
    .route("/admin/logout", get(auth::logout).post(auth::logout))
    .route("/admin/chapters/", get(admin::chapter_list))
    .route("/admin/chapters/new", get(admin::chapter_new).post(admin::chapter_create))
    .route("/admin/chapters/{id}/edit", get(admin::chapter_edit).post(admin::chapter_update))
    .route("/admin/chapters/{id}/delete", post(admin::chapter_delete))
    .route("/admin/flashcards/", get(admin::flashcard_list))
    .route(
      "/admin/flashcards/new",
      get(admin::flashcard_new)
        .post(admin::flashcard_create)
        .layer(DefaultBodyLimit::max(FLASHCARD_BODY_LIMIT)),
    )
    .route(
      "/admin/flashcards/{id}/edit",
      get(admin::flashcard_edit)
        .post(admin::flashcard_update)
        .layer(DefaultBodyLimit::max(FLASHCARD_BODY_LIMIT)),
    )
    .route("/admin/flashcards/{id}/status", post(admin::flashcard_status))
    .route("/admin/flashcards/{id}/delete", post(admin::flashcard_delete))
    .route("/admin/tests/", get(admin::test_list))
    .route("/admin/tests/new", get(admin::test_new).post(admin::test_create))
    .route("/admin/tests/{id}/edit", get(admin::test_edit).post(admin::test_update))
    .route("/admin/tests/{id}/delete", post(admin::test_delete));

  Router::new()
    .route("/", get(handlers::home))
    .route("/capitulos/", get(handlers::chapter_list))
    .route(
      "/capitulos/{slug}/",
      get(handlers::chapter_detail).post(handlers::chapter_submit),
    )
    .route("/capitulos/{slug}/finished/", get(handlers::chapter_finished))
    .route(
      "/capitulos/{slug}/restart/",
      get(handlers::chapter_restart).post(handlers::chapter_restart),
    )
    .route("/capitulos/{slug}/quiz/", post(handlers::quiz_submit))
    .merge(admin_routes)
    .nest_service(paths::MEDIA_URL, ServeDir::new(media_dir))
    .nest_service("/static", ServeDir::new(paths::STATIC_DIR))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
