//! WebhookSender against a minimal local HTTP responder.

use chrono::Utc;
use order_outbox::{ClientContext, Envelope, OrderTransport, OutboxError, WebhookSender};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

fn envelope() -> Envelope {
    Envelope::new(
        json!({"type": "supermarket", "items": [{"id": "SM1", "qty": 2}]}),
        ClientContext::new("mieza-test", "cli://mieza"),
        Utc::now(),
    )
    .unwrap()
}

/// Read one HTTP request and return its body.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .map(|v| v.trim().parse::<usize>().unwrap())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before body");
        buf.extend_from_slice(&chunk[..n]);
    }

    String::from_utf8(buf[header_end..header_end + content_length].to_vec()).unwrap()
}

/// Serve a single request with `status`, reporting the body it received.
async fn respond_once(status: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/exec", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let body = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
            status
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        let _ = tx.send(body);
    });

    (url, rx)
}

#[tokio::test]
async fn posts_wire_body() {
    let (url, body_rx) = respond_once("200 OK").await;
    let sender = WebhookSender::new(url).unwrap();
    let env = envelope();

    sender.send(&env, Duration::from_secs(5)).await.unwrap();

    let body: Value = serde_json::from_str(&body_rx.await.unwrap()).unwrap();
    assert_eq!(body["client"]["ua"], "mieza-test");
    assert_eq!(body["client"]["url"], "cli://mieza");
    assert_eq!(body["order"]["type"], "supermarket");
    assert_eq!(body["order"]["items"][0]["qty"], 2);
    assert!(body["ts"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn error_status_still_counts_as_delivered() {
    let (url, body_rx) = respond_once("500 Internal Server Error").await;
    let sender = WebhookSender::new(url).unwrap();

    sender.send(&envelope(), Duration::from_secs(5)).await.unwrap();
    body_rx.await.unwrap();
}

#[tokio::test]
async fn unresponsive_endpoint_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/exec", listener.local_addr().unwrap());

    // Accept and hold the connection without answering.
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let sender = WebhookSender::new(url).unwrap();
    let err = sender
        .send(&envelope(), Duration::from_millis(200))
        .await
        .unwrap_err();

    assert!(matches!(err, OutboxError::Timeout(d) if d == Duration::from_millis(200)));
    assert!(err.is_transmission());
}

#[tokio::test]
async fn refused_connection_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/exec", listener.local_addr().unwrap());
    drop(listener);

    let sender = WebhookSender::new(url).unwrap();
    let err = sender
        .send(&envelope(), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert!(matches!(err, OutboxError::Http(_)));
    assert!(err.is_transmission());
}
