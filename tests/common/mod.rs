//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
struct NodeState {
    finish_responses: VecDeque<(u16, String)>,
    posts: Vec<(String, Value)>,
    next_index: u64,
}

/// Minimal rollup node speaking just enough HTTP/1.1 for the runner.
///
/// `finish` hands out queued responses, then 202 once the queue is empty.
/// Every POST is recorded with its path and JSON body.
#[derive(Clone)]
pub struct MockNode {
    pub url: String,
    state: Arc<Mutex<NodeState>>,
}

impl MockNode {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(NodeState::default()));

        let shared = state.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let state = shared.clone();
                        tokio::spawn(async move {
                            let _ = serve(socket, state).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { url, state }
    }

    pub fn push_advance(&self, sender: &str, payload: &str) {
        let body = json!({
            "request_type": "advance_state",
            "data": {
                "metadata": {
                    "chain_id": 31337,
                    "app_contract": "0xab7528bb862fb57e8a2bcd567a2e929a0be56a5e",
                    "msg_sender": sender,
                    "input_index": 0,
                    "block_number": 11,
                    "block_timestamp": 1700000000,
                    "prev_randao": "0x00"
                },
                "payload": payload
            }
        });
        self.push_finish(200, &body.to_string());
    }

    pub fn push_inspect(&self, payload: &str) {
        let body = json!({"request_type": "inspect_state", "data": {"payload": payload}});
        self.push_finish(200, &body.to_string());
    }

    pub fn push_finish(&self, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .finish_responses
            .push_back((status, body.to_string()));
    }

    /// Bodies of every POST to `path`, in arrival order.
    pub fn posts_to(&self, path: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .posts
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Paths of every POST, in arrival order.
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().unwrap().posts.iter().map(|(p, _)| p.clone()).collect()
    }

    /// Statuses sent with `finish`, in arrival order.
    pub fn finish_statuses(&self) -> Vec<String> {
        self.posts_to("/finish")
            .iter()
            .filter_map(|body| body["status"].as_str().map(str::to_string))
            .collect()
    }

    /// Wait until at least `count` finish calls arrived.
    pub async fn wait_for_finishes(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(10), async {
            while self.posts_to("/finish").len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("node never saw the expected finish calls");
    }
}

async fn serve(mut socket: TcpStream, state: Arc<Mutex<NodeState>>) -> std::io::Result<()> {
    let (path, body) = read_request(&mut socket).await?;
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let (status, response) = {
        let mut state = state.lock().unwrap();
        state.posts.push((path.clone(), value));
        match path.as_str() {
            "/finish" => state
                .finish_responses
                .pop_front()
                .unwrap_or((202, String::new())),
            "/notice" | "/voucher" => {
                let index = state.next_index;
                state.next_index += 1;
                (200, json!({ "index": index }).to_string())
            }
            "/report" | "/exception" => (200, String::new()),
            _ => (404, String::new()),
        }
    };

    if status == 202 {
        // long-poll pause so an idle runner does not spin
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let status_text = match status {
        200 => "200 OK",
        202 => "202 Accepted",
        400 => "400 Bad Request",
        404 => "404 Not Found",
        _ => "500 Internal Server Error",
    };
    let response_str = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        response.len(),
        response
    );
    socket.write_all(response_str.as_bytes()).await?;
    socket.shutdown().await
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<(String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let end = (header_end + content_length).min(buf.len());
    Ok((path, buf[header_end..end].to_vec()))
}
