//! Integration tests for azure-brain.
//!
//! Azure OpenAI is replaced by a local TCP listener that answers each
//! request with the next canned response.

use std::sync::Mutex;
use std::time::Duration;

use azure_brain::{AzureBrain, AzureBrainConfig, Brain, BrainError, BrainRequest};
use brain_core::{
    async_trait, ToolDefinition, ToolExecutor, ToolRequest, ToolResult,
    ITERATION_LIMIT_MARKER,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

async fn canned_server(responses: Vec<(u16, String)>) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let _ = tx.send(request);

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

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = vec![0u8; 16 * 1024];
    let mut request = Vec::new();
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
        if let Some(header_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&request).to_string()
}

fn answer(content: &str, finish_reason: &str) -> (u16, String) {
    let body = serde_json::json!({
        "choices": [{
            "index": 0,
            "finish_reason": finish_reason,
            "message": {"role": "assistant", "content": content}
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    });
    (200, body.to_string())
}

fn tool_call(name: &str, arguments: &str) -> (u16, String) {
    let body = serde_json::json!({
        "choices": [{
            "index": 0,
            "finish_reason": "tool_calls",
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments}
                }]
            }
        }]
    });
    (200, body.to_string())
}

fn brain(endpoint: &str) -> AzureBrain {
    AzureBrain::new(
        AzureBrainConfig::builder()
            .endpoint(endpoint)
            .api_key("azure-key")
            .timeout(Duration::from_secs(5))
            .build(),
    )
    .unwrap()
}

fn request(max_iterations: usize) -> BrainRequest {
    BrainRequest {
        system: vec!["Você é o Saulo.".to_string()],
        history: Vec::new(),
        input: "Quero saber sobre concurso da Polícia Federal".to_string(),
        max_iterations,
    }
}

/// Records every query it receives and answers with a fixed text.
#[derive(Default)]
struct RecordingTools {
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl ToolExecutor for RecordingTools {
    async fn execute(&self, request: ToolRequest) -> ToolResult {
        self.queries.lock().unwrap().push(request.input.query.clone());
        ToolResult::success(request.id, "Edital PF 2025 autorizado")
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition::query_tool("search_web", "Busca", "A query de busca")]
    }
}

struct NoTools;

#[async_trait]
impl ToolExecutor for NoTools {
    async fn execute(&self, request: ToolRequest) -> ToolResult {
        ToolResult::error(request.id, "no tools")
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }
}

#[tokio::test]
async fn test_plain_answer() {
    let (endpoint, mut requests) = canned_server(vec![answer("{\"response_message\":\"Fala!\"}", "stop")]).await;

    let response = brain(&endpoint).complete(request(10), &NoTools).await.unwrap();
    assert_eq!(response.text, "{\"response_message\":\"Fala!\"}");
    assert_eq!(response.iterations, 1);
    assert!(response.tool_calls.is_empty());

    let raw = requests.recv().await.unwrap();
    assert!(raw.starts_with("POST /openai/deployments/gpt-4o/chat/completions?api-version=2024-02-15-preview"));
    assert!(raw.to_lowercase().contains("api-key: azure-key"));
    assert!(!raw.contains("\"tools\""));
}

#[tokio::test]
async fn test_tool_call_round_trip() {
    let (endpoint, mut requests) = canned_server(vec![
        tool_call("search_web", "{\"query\":\"concurso PF edital\"}"),
        answer("Saiu edital da PF!", "stop"),
    ])
    .await;
    let tools = RecordingTools::default();

    let response = brain(&endpoint).complete(request(10), &tools).await.unwrap();
    assert_eq!(response.text, "Saiu edital da PF!");
    assert_eq!(response.iterations, 2);
    assert_eq!(response.tool_calls, vec!["search_web".to_string()]);
    assert_eq!(*tools.queries.lock().unwrap(), vec!["concurso PF edital".to_string()]);

    let first = requests.recv().await.unwrap();
    assert!(first.contains("\"tool_choice\":\"auto\""));
    let second = requests.recv().await.unwrap();
    assert!(second.contains("\"role\":\"tool\""));
    assert!(second.contains("Edital PF 2025 autorizado"));
}

#[tokio::test]
async fn test_bare_string_arguments_accepted() {
    let (endpoint, _requests) = canned_server(vec![
        tool_call("search_web", "concurso PF"),
        answer("ok", "stop"),
    ])
    .await;
    let tools = RecordingTools::default();

    brain(&endpoint).complete(request(10), &tools).await.unwrap();
    assert_eq!(*tools.queries.lock().unwrap(), vec!["concurso PF".to_string()]);
}

#[tokio::test]
async fn test_iteration_limit_marker() {
    let (endpoint, _requests) = canned_server(vec![
        tool_call("search_web", "{\"query\":\"a\"}"),
        tool_call("search_web", "{\"query\":\"b\"}"),
    ])
    .await;
    let tools = RecordingTools::default();

    let response = brain(&endpoint).complete(request(2), &tools).await.unwrap();
    assert_eq!(response.text, ITERATION_LIMIT_MARKER);
    assert!(response.hit_iteration_limit());
    assert_eq!(response.iterations, 2);
}

#[tokio::test]
async fn test_truncated_answer_keeps_partial_text() {
    let (endpoint, _requests) = canned_server(vec![answer("{\"response_message\": \"Fa", "length")]).await;

    match brain(&endpoint).complete(request(10), &NoTools).await {
        Err(BrainError::OutputParsing { partial, .. }) => {
            assert_eq!(partial, "{\"response_message\": \"Fa")
        }
        other => panic!("Expected OutputParsing, got {:?}", other),
    }
}

#[tokio::test]
async fn test_api_error_message_surfaced() {
    let (endpoint, _requests) = canned_server(vec![(
        400,
        "{\"error\":{\"code\":\"BadRequest\",\"message\":\"content filter\"}}".to_string(),
    )])
    .await;

    match brain(&endpoint).complete(request(10), &NoTools).await {
        Err(BrainError::ProcessingFailed(msg)) => {
            assert!(msg.contains("400"));
            assert!(msg.contains("content filter"));
        }
        other => panic!("Expected ProcessingFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_network() {
    let (endpoint, _requests) = canned_server(vec![(503, "unavailable".to_string())]).await;

    let result = brain(&endpoint).complete(request(10), &NoTools).await;
    assert!(matches!(result, Err(BrainError::Network(_))));
}

#[tokio::test]
async fn test_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(socket);
    });

    let brain = AzureBrain::new(
        AzureBrainConfig::builder()
            .endpoint(endpoint)
            .api_key("k")
            .timeout(Duration::from_millis(200))
            .build(),
    )
    .unwrap();

    let result = brain.complete(request(10), &NoTools).await;
    assert!(matches!(result, Err(BrainError::Timeout)));
}
