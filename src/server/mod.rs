// Server module entry
// Listener creation, the accept loop and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::create_listener;
pub use signal::shutdown_signal;

/// Accept connections until `shutdown` resolves.
///
/// Connections already being served keep running on their own tasks.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => break,
        }
    }

    logger::log_shutdown();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ingest::multipart::tests::{build_body, content_type};
    use tokio::sync::oneshot;

    async fn start() -> (String, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(&cfg));
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, state, async move {
            let _ = rx.await;
        }));
        (format!("http://{addr}"), tx, handle)
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[tokio::test]
    async fn test_serves_health_and_ingest_over_tcp() {
        let (base, shutdown, handle) = start().await;
        let client = client();

        let resp = client.get(format!("{base}/healthz")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.text().await.unwrap(), "ok");

        let resp = client
            .post(format!("{base}/api/file_to_text"))
            .header("Content-Type", "application/json")
            .body(r#"{"x":1,"y":[2]}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let value: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(value, serde_json::json!({"type": "json-body", "keys": ["x", "y"]}));

        let resp = client
            .post(format!("{base}/api/file_to_text"))
            .header("Content-Type", content_type())
            .body(build_body(&[("file", Some("note.txt"), b"uploaded over the wire")]))
            .send()
            .await
            .unwrap();
        let value: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(value, serde_json::json!({"text": "uploaded over the wire"}));

        shutdown.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_max_connections_rejects_extra_connection() {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.performance.max_connections = Some(0);
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(&cfg));
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, state, async move {
            let _ = rx.await;
        }));

        let result = client().get(format!("http://{addr}/healthz")).send().await;
        assert!(result.is_err());

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
