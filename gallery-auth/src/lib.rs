pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use gallery_core::axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use gallery_core::error::AppError;
use gallery_core::middleware::{
    rate_limit::ip_rate_limit_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::SecurityScheme,
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GalleryAuthConfig;
use crate::services::{AuthService, JwtService, OtpStore, PrincipalRepository};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::registration::register,
        handlers::auth::session::login,
        handlers::auth::session::refresh,
        handlers::auth::session::logout,
        handlers::auth::otp::send_otp,
        handlers::auth::otp::verify_otp,
        handlers::auth::password::request_password_reset,
        handlers::auth::password::confirm_password_reset,
        handlers::user::get_me,
        handlers::user::get_user,
        handlers::admin::get_user,
        handlers::admin::update_account_state,
    ),
    components(
        schemas(
            dtos::auth::RegisterRequest,
            dtos::auth::RegisterResponse,
            dtos::auth::LoginRequest,
            dtos::auth::RefreshRequest,
            dtos::auth::SendOtpRequest,
            dtos::auth::OtpSentResponse,
            dtos::auth::VerifyOtpRequest,
            dtos::auth::VerifyOtpResponse,
            dtos::auth::PasswordResetRequest,
            dtos::auth::ResetPasswordRequest,
            dtos::auth::AuthResponse,
            dtos::auth::UpdateAccountStateRequest,
            dtos::ErrorResponse,
            services::TokenResponse,
            models::principal::PrincipalResponse,
            models::principal::Role,
            models::otp::OtpPurpose,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, sessions, passcodes and tokens"),
        (name = "User", description = "User profile access"),
        (name = "Admin", description = "Administrative operations"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: GalleryAuthConfig,
    pub users: Arc<dyn PrincipalRepository>,
    pub otp: Arc<OtpStore>,
    pub jwt: JwtService,
    pub auth_service: AuthService,
    pub login_rate_limiter: gallery_core::middleware::rate_limit::IpRateLimiter,
    pub register_rate_limiter: gallery_core::middleware::rate_limit::IpRateLimiter,
    pub otp_rate_limiter: gallery_core::middleware::rate_limit::IpRateLimiter,
    pub password_reset_rate_limiter: gallery_core::middleware::rate_limit::IpRateLimiter,
    pub ip_rate_limiter: gallery_core::middleware::rate_limit::IpRateLimiter,
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    // Login route with its own rate limiter
    let login_limiter = state.login_rate_limiter.clone();
    let login_route = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    // Register route with its own rate limiter
    let register_limiter = state.register_rate_limiter.clone();
    let register_route = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .layer(from_fn_with_state(
            register_limiter,
            ip_rate_limit_middleware,
        ));

    // Passcode send route with its own rate limiter
    let otp_limiter = state.otp_rate_limiter.clone();
    let otp_send_route = Router::new()
        .route("/auth/otp/send", post(handlers::auth::send_otp))
        .layer(from_fn_with_state(otp_limiter, ip_rate_limit_middleware));

    // Password reset request route with its own rate limiter
    let reset_request_limiter = state.password_reset_rate_limiter.clone();
    let reset_request_route = Router::new()
        .route(
            "/auth/password-reset/request",
            post(handlers::auth::request_password_reset),
        )
        .layer(from_fn_with_state(
            reset_request_limiter,
            ip_rate_limit_middleware,
        ));

    // Global IP rate limiter
    let ip_limiter = state.ip_rate_limiter.clone();

    let mut app = Router::new().route("/health", get(health_check));

    // Swagger UI is a dev convenience; production can switch it off
    let swagger_enabled = match state.config.environment {
        crate::config::Environment::Dev => true,
        crate::config::Environment::Prod => {
            state.config.swagger.enabled == crate::config::SwaggerMode::Public
        }
    };

    if swagger_enabled {
        app =
            app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { gallery_core::axum::Json(ApiDoc::openapi()) }),
        );
    }

    let app = app
        // Authentication routes
        .route("/auth/otp/verify", post(handlers::auth::verify_otp))
        .route(
            "/auth/password-reset/confirm",
            post(handlers::auth::confirm_password_reset),
        )
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/google", get(handlers::auth::google_login))
        .route(
            "/auth/google/callback",
            get(handlers::auth::google_callback),
        )
        .merge(login_route)
        .merge(register_route)
        .merge(otp_send_route)
        .merge(reset_request_route)
        // Routes behind the bearer-token guard
        .merge(
            Router::new()
                .route("/auth/logout", post(handlers::auth::logout))
                .route("/users/me", get(handlers::user::get_me))
                .route("/users/:user_id", get(handlers::user::get_user))
                .route(
                    "/auth/admin/users/:user_id",
                    get(handlers::admin::get_user),
                )
                .route(
                    "/auth/admin/users/:user_id/state",
                    patch(handlers::admin::update_account_state),
                )
                .layer(from_fn_with_state(
                    state.clone(),
                    middleware::auth_middleware,
                )),
        )
        .with_state(state.clone())
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        // Tracing layer
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &gallery_core::axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        // Request-id propagation
        .layer(from_fn(request_id_middleware))
        // Security headers
        .layer(from_fn(security_headers_middleware))
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .map(|o| {
                            o.parse::<gallery_core::axum::http::HeaderValue>()
                                .unwrap_or_else(|e| {
                                    tracing::error!(
                                        "Invalid CORS origin '{}': {}. Using fallback.",
                                        o,
                                        e
                                    );
                                    gallery_core::axum::http::HeaderValue::from_static("*")
                                })
                        })
                        .collect::<Vec<gallery_core::axum::http::HeaderValue>>(),
                )
                .allow_methods([
                    gallery_core::axum::http::Method::GET,
                    gallery_core::axum::http::Method::POST,
                    gallery_core::axum::http::Method::PATCH,
                    gallery_core::axum::http::Method::DELETE,
                    gallery_core::axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    gallery_core::axum::http::header::AUTHORIZATION,
                    gallery_core::axum::http::header::CONTENT_TYPE,
                    gallery_core::axum::http::header::HeaderName::from_static("x-request-id"),
                ]),
        );

    Ok(app)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    gallery_core::axum::extract::State(state): gallery_core::axum::extract::State<AppState>,
) -> gallery_core::axum::Json<serde_json::Value> {
    gallery_core::axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
    }))
}
