use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vocab_notebook::auth::db as auth_db;
use vocab_notebook::config::AppConfig;
use vocab_notebook::state::AppState;
use vocab_notebook::{db, routes};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vocab_notebook=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load();
  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  if let Err(e) = std::fs::create_dir_all(&config.media_dir) {
    tracing::warn!("Could not create media directory {}: {}", config.media_dir.display(), e);
  }

  {
    let conn = pool.lock().expect("Database lock failed during startup");
    match &config.bootstrap_admin {
      Some(admin) => {
        auth_db::ensure_bootstrap_admin(&conn, admin).expect("Failed to create admin account");
      }
      None => {
        if auth_db::count_admins(&conn).unwrap_or(0) == 0 {
          tracing::warn!("No admin account exists; set ADMIN_USERNAME and ADMIN_PASSWORD to create one");
        }
      }
    }
  }

  let bind_addr = config.bind_addr();
  let port = config.port;
  let app = routes::router(AppState::new(pool, config));

  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
