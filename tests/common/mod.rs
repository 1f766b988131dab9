//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bank_gateway::config::GatewayConfig;
use bank_gateway::directory::InMemoryUserDirectory;
use bank_gateway::security::{PayloadCipher, TokenManager};
use bank_gateway::{HttpServer, Shutdown};
use tokio::net::TcpListener;

pub const JWT_SECRET: &str = "integration-test-signing-secret-000";
pub const PASSWORD: &str = "correct horse battery staple";

/// A valid configuration with fresh secrets and short token lifetimes.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.security.encryption_key = PayloadCipher::generate_key();
    config.security.jwt_secret = JWT_SECRET.to_string();
    config.security.access_ttl_secs = 300;
    config.security.refresh_ttl_secs = 3600;
    config
}

/// A directory holding `alice`.
pub fn test_directory() -> Arc<InMemoryUserDirectory> {
    let directory = InMemoryUserDirectory::new();
    directory.register("alice", "Alice Liddell", "alice@example.com", PASSWORD);
    Arc::new(directory)
}

/// Token manager sharing the gateway's secret, for minting test tokens.
pub fn token_manager(config: &GatewayConfig) -> TokenManager {
    TokenManager::from_config(&config.security).unwrap()
}

pub fn cipher(config: &GatewayConfig) -> PayloadCipher {
    PayloadCipher::from_base64(&config.security.encryption_key).unwrap()
}

/// A running gateway on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway and wait until it accepts connections.
pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let server = HttpServer::new(config, test_directory()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    TestGateway { addr, shutdown }
}

/// Client that never pools connections, so every test request is independent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
