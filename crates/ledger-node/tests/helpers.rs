use axum::Router;
use ledger_node::{api, config::NodeConfig, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct TestNode {
    pub url: String,
    pub state: AppState,
}

/// Starts a node on an ephemeral local port and returns its base URL and state.
pub async fn spawn_node() -> anyhow::Result<TestNode> {
    spawn_node_with(NodeConfig::default()).await
}

pub async fn spawn_node_with(config: NodeConfig) -> anyhow::Result<TestNode> {
    let state = AppState::new(&config)?;
    let url = serve(api::router(state.clone())).await?;
    Ok(TestNode { url, state })
}

/// Serves an arbitrary router, e.g. a peer that misbehaves on `/chain`.
pub async fn serve(app: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });
    Ok(format!("http://{addr}"))
}

/// A base URL nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_url() -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

#[allow(dead_code)]
pub async fn mine_times(client: &reqwest::Client, url: &str, times: usize) -> anyhow::Result<()> {
    for _ in 0..times {
        let res = client.get(format!("{url}/mine")).send().await?;
        assert!(res.status().is_success(), "mine failed: {}", res.status());
    }
    Ok(())
}
