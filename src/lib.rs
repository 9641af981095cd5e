pub mod api;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod client;
pub mod jwt;
pub mod pages;
pub mod registry;
pub mod session;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use tokio::net::TcpListener;

use auth::{HasSessionState, guard_pages, propagate_rotated_cookies};
use jwt::JwtConfig;
use registry::RevocationRegistry;
use session::SessionService;

pub struct ServerConfig {
    /// Revocation registry (in-memory default or SQLite-backed)
    pub registry: Arc<dyn RevocationRegistry>,
    /// Secret for signing tokens (length validated at startup)
    pub jwt_secret: Vec<u8>,
    /// Whether to set the Secure flag on cookies (true in production with HTTPS)
    pub secure_cookies: bool,
}

/// Shared state for API handlers and page guards.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionService,
    pub secure_cookies: bool,
}

impl HasSessionState for AppState {
    fn sessions(&self) -> &SessionService {
        &self.sessions
    }

    fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));
    let state = AppState {
        sessions: SessionService::new(jwt, config.registry.clone()),
        secure_cookies: config.secure_cookies,
    };

    // API routes; a transparent rotation performed by an extractor gets
    // its replacement cookies attached by the propagation layer.
    let api_router = api::create_api_router(state.clone())
        .layer(middleware::from_fn(propagate_rotated_cookies));

    // Page routes behind the route guard.
    let page_routes = Router::new()
        .route("/", get(pages::index))
        .route("/login", get(pages::login))
        .route("/dashboard", get(pages::dashboard))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state,
            guard_pages::<AppState>,
        ))
        .layer(middleware::from_fn(propagate_rotated_cookies));

    Router::new().nest("/api", api_router).merge(page_routes)
}

/// Run cleanup once and spawn the background scheduler.
/// Call this before starting the server.
pub async fn init_cleanup(registry: &Arc<dyn RevocationRegistry>) {
    cleanup::run_cleanup(registry).await;
    cleanup::spawn_cleanup_scheduler(registry.clone());
}

/// Run the server on the given listener. This function blocks until the server exits.
/// Call `init_cleanup` before this to run cleanup on startup.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> (tokio::task::JoinHandle<()>, SocketAddr) {
    init_cleanup(&config.registry).await;

    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    let local_addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    (handle, local_addr)
}
