use gallery_auth::{
    build_router,
    config::GalleryAuthConfig,
    services::{AuthService, JwtService, MemoryPrincipalStore, OtpStore, SmtpEmailService},
    AppState,
};
use gallery_core::middleware::rate_limit::create_ip_rate_limiter;
use gallery_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), gallery_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = GalleryAuthConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting authentication service"
    );

    // Initialize email service
    let email = SmtpEmailService::new(&config.smtp)?;
    let email = Arc::new(email);
    tracing::info!("Email service initialized");

    // Initialize OTP store
    let otp = Arc::new(OtpStore::new(&config.otp, email.clone()));
    tracing::info!("OTP store initialized");

    // Initialize JWT service
    let jwt = JwtService::new(&config.jwt);
    tracing::info!("JWT service initialized");

    // Principal storage. The platform's durable repository plugs in here; the
    // in-memory store serves development deployments.
    let users: Arc<dyn gallery_auth::services::PrincipalRepository> =
        Arc::new(MemoryPrincipalStore::new());

    // Initialize rate limiters
    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let register_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.register_attempts,
        config.rate_limit.register_window_seconds,
    );
    let otp_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.otp_attempts,
        config.rate_limit.otp_window_seconds,
    );
    let password_reset_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.password_reset_attempts,
        config.rate_limit.password_reset_window_seconds,
    );
    let ip_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );
    tracing::info!("Rate limiters initialized: Login, Register, OTP, Password Reset, Global IP");

    let auth_service = AuthService::new(users.clone(), otp.clone(), jwt.clone());

    // Create application state
    let state = AppState {
        config: config.clone(),
        users,
        otp,
        jwt,
        auth_service,
        login_rate_limiter,
        register_rate_limiter,
        otp_rate_limiter,
        password_reset_rate_limiter,
        ip_rate_limiter,
    };

    // Build application router
    let app = build_router(state).await?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    gallery_core::axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
