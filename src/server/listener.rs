use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::routing::RouteTable;

/// Binds the configured address and serves the route table until the
/// listener fails.
pub async fn run(cfg: &Config, table: Arc<RouteTable>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, table, cfg.max_body_bytes).await
}

/// Accept loop over an already bound listener. Each connection runs on its
/// own task; the route table is shared read-only.
pub async fn serve(
    listener: TcpListener,
    table: Arc<RouteTable>,
    max_body_bytes: usize,
) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Accepted connection from {}", peer);

        let table = table.clone();
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, table).with_max_body_bytes(max_body_bytes);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}
