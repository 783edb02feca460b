//! Rate-limit retry semantics of the shared transport, driven against a
//! local scripted HTTP stub.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tidemark_adapters::AdapterError;
use tidemark_adapters::transport::Transport;
use tidemark_core::Platform;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const RATE_LIMITED: &str =
    "HTTP/1.1 429 Too Many Requests\r\nretry-after: 0\r\nconnection: close\r\ncontent-length: 0\r\n\r\n";
const RATE_LIMITED_NO_HEADER: &str =
    "HTTP/1.1 429 Too Many Requests\r\nconnection: close\r\ncontent-length: 0\r\n\r\n";
const OK: &str = "HTTP/1.1 200 OK\r\nconnection: close\r\ncontent-length: 2\r\n\r\nok";
const NOT_FOUND: &str =
    "HTTP/1.1 404 Not Found\r\nconnection: close\r\ncontent-length: 9\r\n\r\nno order.";
const UNAUTHORIZED: &str =
    "HTTP/1.1 401 Unauthorized\r\nconnection: close\r\ncontent-length: 0\r\n\r\n";

/// Serve one scripted response per connection; repeats the last one.
async fn stub_server(responses: Vec<&'static str>) -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let hits = Arc::new(AtomicU32::new(0));
    let hits_inner = Arc::clone(&hits);

    tokio::spawn(async move {
        let mut remaining = responses.into_iter();
        let mut last = OK;
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            // Drain the request head; the stub never reads bodies
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;

            let response = remaining.next().unwrap_or(last);
            last = response;
            hits_inner.fetch_add(1, Ordering::SeqCst);

            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (addr, hits)
}

fn transport() -> Transport {
    // Short fallback delay keeps the no-header test fast
    Transport::new(Platform::Woocommerce, Duration::from_millis(50))
}

#[tokio::test]
async fn test_429_then_200_succeeds_after_one_retry() {
    let (addr, hits) = stub_server(vec![RATE_LIMITED, OK]).await;
    let transport = transport();

    let response = transport
        .execute(transport.client().get(format!("http://{addr}/")))
        .await
        .expect("retry should succeed");

    assert_eq!(response.status(), 200);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_429_twice_propagates_without_third_attempt() {
    let (addr, hits) = stub_server(vec![RATE_LIMITED, RATE_LIMITED]).await;
    let transport = transport();

    let err = transport
        .execute(transport.client().get(format!("http://{addr}/")))
        .await
        .expect_err("second 429 must propagate");

    assert!(matches!(err, AdapterError::RateLimited { .. }));
    assert!(err.is_retryable());
    // Exactly two attempts: the original and the single retry
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_429_without_retry_after_uses_platform_minimum() {
    let (addr, hits) = stub_server(vec![RATE_LIMITED_NO_HEADER, OK]).await;
    let transport = transport();

    let started = std::time::Instant::now();
    let response = transport
        .execute(transport.client().get(format!("http://{addr}/")))
        .await
        .expect("retry should succeed");

    assert_eq!(response.status(), 200);
    assert!(started.elapsed() >= Duration::from_millis(50));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_other_4xx_is_not_retried() {
    let (addr, hits) = stub_server(vec![NOT_FOUND]).await;
    let transport = transport();

    let err = transport
        .execute(transport.client().get(format!("http://{addr}/")))
        .await
        .expect_err("404 is a client error");

    match err {
        AdapterError::PlatformApi { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "no order.");
        }
        other => panic!("expected PlatformApi, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_401_maps_to_authentication() {
    let (addr, _hits) = stub_server(vec![UNAUTHORIZED]).await;
    let transport = transport();

    let err = transport
        .execute(transport.client().get(format!("http://{addr}/")))
        .await
        .expect_err("401 is an auth error");

    assert!(matches!(err, AdapterError::Authentication(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_connection_failure_is_retryable_network_error() {
    // Bind-then-drop guarantees nothing is listening on the port
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let transport = transport();
    let err = transport
        .execute(transport.client().get(format!("http://{addr}/")))
        .await
        .expect_err("nothing is listening");

    assert!(matches!(err, AdapterError::Network(_)));
    assert!(err.is_retryable());
}
