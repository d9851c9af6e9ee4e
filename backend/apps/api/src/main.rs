//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use account::{
    AccountConfig, AccountMiddlewareState, PgAccountRepository, account_admin_router,
    account_router, require_admin, require_user,
};
use axum::{
    Router, http,
    http::{Method, header},
    middleware,
};
use item::application::sweep::ExpireHighlightsUseCase;
use item::{ItemConfig, PgItemRepository, item_admin_router, item_public_router, item_router};
use notification::{NotificationConfig, PgNotificationRepository, notification_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet::{
    MidtransEnvironment, MidtransGateway, PgWalletRepository, WalletConfig, topup_public_router,
    topup_router, wallet_admin_router, withdrawal_router,
};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,account=info,item=info,wallet=info,notification=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set in environment"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Session configuration
    let account_config = if cfg!(debug_assertions) && env::var("SESSION_SECRET").is_err() {
        tracing::warn!("SESSION_SECRET not set, using a random secret");
        AccountConfig::development()
    } else {
        let secret_b64 = env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET must be set in production"))?;
        let secret_bytes = platform::crypto::from_base64(&secret_b64)?;
        let session_secret: [u8; 32] = secret_bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes"))?;
        AccountConfig {
            session_secret,
            ..AccountConfig::default()
        }
    };
    let account_config = Arc::new(account_config);

    // Payment gateway configuration
    let wallet_config = WalletConfig {
        server_key: env::var("MIDTRANS_SERVER_KEY").unwrap_or_default(),
        client_key: env::var("MIDTRANS_CLIENT_KEY").unwrap_or_default(),
        environment: MidtransEnvironment::from_env_value(
            &env::var("MIDTRANS_ENV").unwrap_or_default(),
        ),
        ..WalletConfig::default()
    };
    if wallet_config.server_key.is_empty() {
        tracing::warn!("MIDTRANS_SERVER_KEY not set, top-ups will fail");
    }
    tracing::info!(config = ?wallet_config, "Wallet configured");
    let gateway = MidtransGateway::new(wallet_config.server_key.clone(), wallet_config.environment)?;
    let wallet_config = Arc::new(wallet_config);

    let mut item_config = if cfg!(debug_assertions) {
        ItemConfig::development()
    } else {
        ItemConfig::default()
    };
    if let Some(secs) = env::var("HIGHLIGHT_SWEEP_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
    {
        item_config.highlight_sweep_interval = Duration::from_secs(secs);
    }
    let item_config = Arc::new(item_config);

    let account_repo = PgAccountRepository::new(pool.clone());
    let item_repo = PgItemRepository::new(pool.clone());
    let wallet_repo = PgWalletRepository::new(pool.clone());
    let notifications = PgNotificationRepository::new(pool.clone());

    // Startup sweep: clear expired highlights
    // Errors here should not prevent server startup
    let sweep = ExpireHighlightsUseCase::new(Arc::new(item_repo.clone()));
    if let Err(e) = sweep.execute(chrono::Utc::now()).await {
        tracing::warn!(error = %e, "Highlight sweep failed, continuing anyway");
    }

    let sweep_interval = item_config.highlight_sweep_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = sweep.execute(chrono::Utc::now()).await {
                tracing::warn!(error = %e, "Highlight sweep failed");
            }
        }
    });

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Session middleware shared by every authenticated router
    let session = AccountMiddlewareState {
        repo: Arc::new(account_repo.clone()),
        config: account_config.clone(),
    };
    let authed = middleware::from_fn_with_state(session, require_user::<PgAccountRepository>);

    let admin = Router::new()
        .merge(account_admin_router(account_repo.clone(), account_config.clone()))
        .merge(item_admin_router(
            item_repo.clone(),
            notifications.clone(),
            item_config.clone(),
        ))
        .merge(wallet_admin_router(
            wallet_repo.clone(),
            gateway.clone(),
            notifications.clone(),
            wallet_config.clone(),
        ))
        .layer(middleware::from_fn(require_admin))
        .layer(authed.clone());

    let items = item_public_router(item_repo.clone(), notifications.clone(), item_config.clone())
        .merge(
            item_router(item_repo, notifications.clone(), item_config)
                .layer(authed.clone()),
        );

    let topup = topup_public_router(
        wallet_repo.clone(),
        gateway.clone(),
        notifications.clone(),
        wallet_config.clone(),
    )
    .merge(
        topup_router(
            wallet_repo.clone(),
            gateway.clone(),
            notifications.clone(),
            wallet_config.clone(),
        )
        .layer(authed.clone()),
    );

    // Build router
    let app = Router::new()
        .nest(
            "/api/account",
            account_router(account_repo, account_config).layer(authed.clone()),
        )
        .nest("/api/admin", admin)
        .nest("/api/items", items)
        .nest(
            "/api/notifications",
            notification_router(notifications.clone(), NotificationConfig::default())
                .layer(authed.clone()),
        )
        .nest("/api/topup", topup)
        .nest(
            "/api/withdrawals",
            withdrawal_router(wallet_repo, gateway, notifications, wallet_config).layer(authed),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env::var("WEBSITES_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
