//! Fake backend helpers for async tests.

use std::sync::Arc;

use axum::Router;

use crate::config::ClientConfig;
use crate::cookie_store::CookieStore;
use crate::pipeline::ApiClient;

/// Serve `routes` under `/api` on an ephemeral local port and return the
/// API base URL.
pub(crate) async fn spawn_backend(routes: Router) -> String {
    let app = Router::new().nest("/api", routes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Base URL of a local port with nothing listening on it.
pub(crate) async fn dead_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub(crate) fn client(base_url: &str, store: Arc<dyn CookieStore>) -> ApiClient {
    let config = ClientConfig::new(base_url).unwrap();
    ApiClient::new(&config, store).unwrap()
}
