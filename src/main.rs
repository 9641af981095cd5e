use clap::Parser;
use gatehouse::cli::{Args, init_logging, load_session_secret, open_registry, validate_base_url};
use gatehouse::{ServerConfig, create_app, init_cleanup};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(secret) = load_session_secret(args.secret_file.as_deref()) else {
        std::process::exit(1);
    };

    if validate_base_url(&args.base_url).is_none() {
        std::process::exit(1);
    }

    let Some(registry) = open_registry(args.database.as_deref()).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().expect("Failed to get local address");

    let config = ServerConfig {
        registry: registry.clone(),
        jwt_secret: secret.into_bytes(),
        secure_cookies: args.secure_cookies,
    };

    init_cleanup(&registry).await;

    let app = create_app(&config);

    info!(address = %local_addr, "Listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
