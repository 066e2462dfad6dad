#![allow(dead_code)]

use std::net::SocketAddr;

pub struct RelayServer {
    pub addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl RelayServer {
    pub async fn start(app: axum::Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("relay listener should bind");
        let addr = listener
            .local_addr()
            .expect("relay listener local address should exist");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("relay server should run");
        });

        Self { addr, handle }
    }

    pub fn ws_url(&self, path: &str) -> String {
        format!("ws://{}{path}", self.addr)
    }
}

impl Drop for RelayServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
