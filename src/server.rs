//! Listener setup and the serve loop.

use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

use crate::app::App;
use crate::config::Config;
use crate::error::{Result, ServerError};

/// Bind the configured `host:port`.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = config.bind_address();
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: App, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr()?;
    info!(
        "{} v{} listening on http://{}",
        app.info().title,
        app.info().version,
        local
    );

    axum::serve(listener, app.into_router())
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}
