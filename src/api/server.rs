use super::routes::create_router;
use super::state::AppState;
use crate::utils::error::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const CANDIDATE_PORTS: [u16; 3] = [8888, 8080, 8889];

/// Binds the first free port among `preferred` followed by [`CANDIDATE_PORTS`],
/// falling back to an OS-assigned port.
pub async fn bind_available(host: &str, preferred: Option<u16>) -> Result<TcpListener> {
    let mut ports: Vec<u16> = preferred.into_iter().collect();
    for port in CANDIDATE_PORTS {
        if !ports.contains(&port) {
            ports.push(port);
        }
    }

    for port in ports {
        match TcpListener::bind((host, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => tracing::warn!("⚠️ Port {} unavailable: {}", port, e),
        }
    }

    let listener = TcpListener::bind((host, 0)).await?;
    tracing::info!("🔌 Using OS-assigned port {}", listener.local_addr()?.port());
    Ok(listener)
}

pub async fn serve<F>(state: Arc<AppState>, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("🚀 Web server listening on http://{}", addr);
    tracing::info!("   GET /api/health");
    tracing::info!("   GET /api/stock_summary");
    tracing::info!("   GET /api/tc_list");
    tracing::info!("   GET /api/portfolio_detail/:id");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("🛑 Web server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_busy_preferred_port_is_skipped() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let listener = bind_available("127.0.0.1", Some(taken_port)).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), taken_port);
    }
}
