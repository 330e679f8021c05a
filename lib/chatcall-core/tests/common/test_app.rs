#![allow(dead_code, clippy::expect_used)]

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use http::uri::Scheme;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

use chatcall_core::{ChatClient, ChatClientBuilder, Credentials};

use super::server::router;

pub const API_KEY: &str = "test-key";
pub const USER_TOKEN: &str = "test-token";

/// A running chat API double, with a client configured for it.
#[derive(Debug, derive_more::Deref)]
pub struct TestApp {
    #[deref]
    client: ChatClient,
    addr: SocketAddr,
    server: JoinHandle<()>,
}

impl TestApp {
    pub async fn start() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind test server")?;
        let addr = listener.local_addr().context("local address")?;
        info!(%addr, "launching server");

        let server = tokio::spawn(async move {
            axum::serve(listener, router())
                .await
                .expect("server launched");
        });

        let client = client_builder(addr)
            .with_credentials(Credentials::new(API_KEY).with_user_token(USER_TOKEN))
            .build()
            .context("build client")?;

        Ok(Self {
            client,
            addr,
            server,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Client of the same server, with a per-request timeout.
    pub fn client_with_timeout(&self, timeout: Duration) -> ChatClient {
        client_builder(self.addr)
            .with_timeout(timeout)
            .build()
            .expect("should build client")
    }

    /// Client of the same server, without credentials.
    pub fn anonymous_client(&self) -> ChatClient {
        client_builder(self.addr)
            .build()
            .expect("should build client")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

pub fn client_builder(addr: SocketAddr) -> ChatClientBuilder {
    ChatClient::builder()
        .with_scheme(Scheme::HTTP)
        .with_host(addr.ip().to_string())
        .with_port(addr.port())
}

/// Starts a listener that accepts connections and drops them before answering.
pub async fn start_dropping_server() -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind dropping server")?;
    let addr = listener.local_addr().context("local address")?;

    let handle = tokio::spawn(async move {
        loop {
            if let Ok((stream, peer)) = listener.accept().await {
                info!(%peer, "dropping connection");
                drop(stream);
            }
        }
    });

    Ok((addr, handle))
}
