use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tuition_billing::config::Config;
use tuition_billing::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config.cors_origin);

    let addr = config.bind_address();
    info!("Starting tuition billing server on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
