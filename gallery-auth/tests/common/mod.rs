use gallery_auth::{
    build_router,
    config::{
        Environment, GalleryAuthConfig, GoogleOAuthConfig, JwtConfig, OtpConfig, RateLimitConfig,
        SecurityConfig, SmtpConfig, SwaggerConfig, SwaggerMode,
    },
    services::{AuthService, JwtService, MemoryPrincipalStore, MockEmailService, OtpStore},
    AppState,
};
use axum::{body::Body, http::Request, Router};
use gallery_core::middleware::rate_limit::create_ip_rate_limiter;
use http_body_util::BodyExt;
use std::sync::Arc;

pub fn test_config() -> GalleryAuthConfig {
    GalleryAuthConfig {
        common: gallery_core::config::Config {
            port: 8080,
            otlp_endpoint: None,
        },
        environment: Environment::Dev,
        service_name: "gallery-auth".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry_minutes: 60,
            refresh_token_expiry_days: 7,
        },
        otp: OtpConfig {
            code_length: 6,
            ttl_minutes: 10,
            max_attempts: 5,
        },
        google: GoogleOAuthConfig {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080/auth/google/callback".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            user: String::new(),
            password: String::new(),
            from_address: "no-reply@localhost".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Disabled,
        },
        rate_limit: RateLimitConfig {
            login_attempts: 1000,
            login_window_seconds: 60,
            register_attempts: 1000,
            register_window_seconds: 60,
            otp_attempts: 1000,
            otp_window_seconds: 60,
            password_reset_attempts: 1000,
            password_reset_window_seconds: 60,
            global_ip_limit: 10_000,
            global_ip_window_seconds: 60,
        },
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub email: Arc<MockEmailService>,
    pub users: Arc<MemoryPrincipalStore>,
}

pub async fn spawn_app() -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .try_init();

    let config = test_config();

    let email = Arc::new(MockEmailService::new());
    let users = Arc::new(MemoryPrincipalStore::new());
    let otp = Arc::new(OtpStore::new(&config.otp, email.clone()));
    let jwt = JwtService::new(&config.jwt);
    let auth_service = AuthService::new(users.clone(), otp.clone(), jwt.clone());

    let state = AppState {
        config,
        users: users.clone(),
        otp,
        jwt,
        auth_service,
        login_rate_limiter: create_ip_rate_limiter(1000, 60),
        register_rate_limiter: create_ip_rate_limiter(1000, 60),
        otp_rate_limiter: create_ip_rate_limiter(1000, 60),
        password_reset_rate_limiter: create_ip_rate_limiter(1000, 60),
        ip_rate_limiter: create_ip_rate_limiter(10_000, 60),
    };

    let app = build_router(state.clone()).await.expect("build router");

    TestApp {
        app,
        state,
        email,
        users,
    }
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn bearer_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token))
        .header("Content-Type", "application/json");

    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };

    builder.body(body).expect("build request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse json body")
}
