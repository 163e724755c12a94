use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use portfolio_api::config::Config;
use portfolio_api::contact::mailer::{EmailSender, ResendClient};
use portfolio_api::contact::rate_limit::{InMemoryRateLimiter, RateLimitStore, RedisRateLimiter};
use portfolio_api::content::ContentStore;
use portfolio_api::routes::build_router;
use portfolio_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portfolio API v{}", env!("CARGO_PKG_VERSION"));

    let content = ContentStore::new(&config.content_dir);
    info!("Serving content from {}", content.root().display());

    let rate_limiter: Arc<dyn RateLimitStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Contact rate limit backed by Redis");
            Arc::new(RedisRateLimiter::new(client, config.rate_limit))
        }
        None => {
            info!("Contact rate limit kept in process memory");
            Arc::new(InMemoryRateLimiter::new(config.rate_limit))
        }
    };

    let mailer: Option<Arc<dyn EmailSender>> = match &config.resend_api_key {
        Some(key) => Some(Arc::new(ResendClient::new(key.clone())?)),
        None => {
            warn!("RESEND_API_KEY is not set; contact submissions will be rejected");
            None
        }
    };
    if config.contact_email.is_none() {
        warn!("CONTACT_EMAIL is not set; contact submissions will be rejected");
    }

    let state = AppState {
        config: config.clone(),
        content,
        rate_limiter,
        mailer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
