//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpListener;
use vcsstore::config::ServiceConfig;
use vcsstore::storage::PathLayout;
use vcsstore::{HttpServer, Shutdown};

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    /// Storage root; removed when the server is dropped.
    pub storage: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with informative errors and the given layout.
pub async fn start_server(layout: PathLayout) -> TestServer {
    let storage = tempfile::tempdir().unwrap();

    let mut config = ServiceConfig::default();
    config.storage.dir = storage.path().to_path_buf();
    config.storage.layout = layout;
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.debug = true;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let stop = shutdown.wait();
    tokio::spawn(async move {
        let _ = server.run(listener, stop).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, shutdown, storage }
}

/// A client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
