//! Integration tests for instagram-client.
//!
//! The Graph API is replaced by a throwaway TCP listener that answers every
//! request with a canned HTTP response, so no network access is needed.

use std::sync::Arc;
use std::time::Duration;

use instagram_client::{Delivery, GraphClient, GraphConfig, GraphError, RetryPolicy, Transport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Serve `responses` in order, one per connection, forwarding each raw
/// request to the returned channel.
async fn canned_server(responses: Vec<(u16, &'static str)>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if let Some(header_end) = find_header_end(&request) {
                    let content_length = content_length(&request[..header_end]);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            let _ = tx.send(String::from_utf8_lossy(&request).to_string());

            let response = format!(
                "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (format!("http://{}", addr), rx)
}

fn find_header_end(request: &[u8]) -> Option<usize> {
    request.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(headers: &[u8]) -> usize {
    String::from_utf8_lossy(headers)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

fn client(base_url: &str) -> GraphClient {
    GraphClient::new(
        GraphConfig::new("test-token")
            .with_base_url(base_url)
            .with_send_timeout(Duration::from_secs(5)),
    )
    .unwrap()
}

mod config_tests {
    use super::*;

    #[test]
    fn test_graph_config_defaults() {
        let config = GraphConfig::new("token");
        assert_eq!(config.base_url, "https://graph.instagram.com");
        assert_eq!(config.api_version, "v23.0");
        assert_eq!(config.send_timeout, Duration::from_secs(10));
        assert_eq!(config.validate_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_graph_config_urls() {
        let config = GraphConfig::new("token")
            .with_base_url("http://localhost:9000/")
            .with_api_version("v21.0");
        assert_eq!(config.messages_url(), "http://localhost:9000/v21.0/me/messages");
        assert_eq!(config.me_url(), "http://localhost:9000/v21.0/me");
    }

    #[test]
    fn test_graph_config_debug_redacts_token() {
        let config = GraphConfig::new("super-secret-token");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("[redacted]"));
    }
}

mod client_tests {
    use super::*;

    #[tokio::test]
    async fn test_send_posts_payload_with_bearer_token() {
        let (base, mut requests) =
            canned_server(vec![(200, r#"{"recipient_id":"1789","message_id":"mid.1"}"#)]).await;

        let sent = client(&base).send("1789", "Bora!").await.unwrap();
        assert_eq!(sent.message_id, "mid.1");

        let request = requests.recv().await.unwrap();
        assert!(request.starts_with("POST /v23.0/me/messages"));
        assert!(request.to_lowercase().contains("authorization: bearer test-token"));
        assert!(request.contains(r#"{"recipient":{"id":"1789"},"message":{"text":"Bora!"}}"#));
    }

    #[tokio::test]
    async fn test_send_classifies_rate_limit() {
        let (base, _requests) =
            canned_server(vec![(429, r#"{"error":{"message":"Too many calls"}}"#)]).await;

        let err = client(&base).send("1789", "x").await.unwrap_err();
        assert!(matches!(err, GraphError::RateLimited { status: 429, .. }));
        assert_eq!(err.body(), Some(r#"{"error":{"message":"Too many calls"}}"#));
    }

    #[tokio::test]
    async fn test_send_classifies_bad_request_message() {
        let (base, _requests) =
            canned_server(vec![(400, r#"{"error":{"message":"Invalid recipient"}}"#)]).await;

        let err = client(&base).send("1789", "x").await.unwrap_err();
        assert_eq!(err.to_string(), "bad request: Invalid recipient");
    }

    #[tokio::test]
    async fn test_validate_token() {
        let (base, mut requests) =
            canned_server(vec![(200, r#"{"id":"1784"}"#), (401, r#"{"error":{"message":"bad"}}"#)]).await;
        let client = client(&base);

        assert!(client.validate_token().await.unwrap());
        assert!(requests.recv().await.unwrap().starts_with("GET /v23.0/me "));
        assert!(!client.validate_token().await.unwrap());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{}", addr)).send("1789", "x").await.unwrap_err();
        assert!(matches!(err, GraphError::Http(_)));
        assert_eq!(err.body(), None);
    }
}

mod delivery_tests {
    use super::*;

    #[tokio::test]
    async fn test_delivery_retries_through_real_client() {
        let (base, _requests) = canned_server(vec![
            (503, "{}"),
            (200, r#"{"recipient_id":"1789","message_id":"mid.2"}"#),
        ])
        .await;

        let policy = RetryPolicy {
            base_delay: Duration::from_millis(5),
            ..RetryPolicy::default()
        };
        let delivery = Delivery::new(Arc::new(client(&base)), policy);

        let sent = delivery.send_with_retry("1789", "Bora!").await.unwrap();
        assert_eq!(sent.message_id, "mid.2");
    }

    #[tokio::test]
    async fn test_accepted_send_without_ids_is_not_resent() {
        let (base, mut requests) = canned_server(vec![
            (200, r#"{"recipient_id":"1789"}"#),
            (200, r#"{"recipient_id":"1789"}"#),
            (200, r#"{"recipient_id":"1789"}"#),
        ])
        .await;

        let policy = RetryPolicy {
            base_delay: Duration::from_millis(5),
            ..RetryPolicy::default()
        };
        let delivery = Delivery::new(Arc::new(client(&base)), policy);

        let sent = delivery.send_with_retry("1789", "Bora!").await.unwrap();
        assert_eq!(sent.recipient_id, "1789");
        assert_eq!(sent.message_id, "");

        assert!(requests.recv().await.is_some());
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_accepted_send_with_unreadable_body() {
        let (base, mut requests) = canned_server(vec![(200, "ok"), (200, "ok")]).await;

        let delivery = Delivery::new(Arc::new(client(&base)), RetryPolicy::default());

        let sent = delivery.send_with_retry("1789", "Bora!").await.unwrap();
        assert_eq!(sent.recipient_id, "1789");
        assert!(requests.recv().await.is_some());
        assert!(requests.try_recv().is_err());
    }
}
