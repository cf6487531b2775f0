//! Scripted stand-in for the Discord REST API
//!
//! Routes are keyed by `"METHOD /path"` (query string excluded). Each route
//! answers from a queue of canned responses; the last one repeats forever.
//! Unknown routes answer 404.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const TOKEN: &str = "test-bot-token";
pub const CHANNEL: &str = "424242";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn query(&self) -> &str {
        self.target.split_once('?').map(|(_, q)| q).unwrap_or("")
    }
}

type Routes = HashMap<String, VecDeque<(u16, String)>>;

#[derive(Clone)]
pub struct MockDiscord {
    base: String,
    routes: Arc<Mutex<Routes>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockDiscord {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mock = Self {
            base: format!("http://{}/api/v10", addr),
            routes: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let server = mock.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let server = server.clone();
                tokio::spawn(async move { server.handle(socket).await });
            }
        });

        mock
    }

    /// Base URL to hand to `DiscordClient::with_api_base`
    pub fn api_base(&self) -> &str {
        &self.base
    }

    /// Queue a response for `route` (e.g. `"GET /channels/1"`)
    pub fn respond(&self, route: &str, status: u16, body: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back((status, body.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        let full = format!("/api/v10{}", path);
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path() == full)
            .collect()
    }

    fn next_response(&self, route: &str) -> (u16, String) {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(route) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if queue.len() == 1 => queue[0].clone(),
            _ => (404, r#"{"message": "Unknown", "code": 0}"#.to_string()),
        }
    }

    async fn handle(&self, mut socket: TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = head.lines();
        let mut request_line = lines.next().unwrap_or_default().split_whitespace();
        let method = request_line.next().unwrap_or_default().to_string();
        let target = request_line.next().unwrap_or_default().to_string();

        let mut content_length = 0usize;
        let mut authorization = None;
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                let value = value.trim();
                match name.trim().to_ascii_lowercase().as_str() {
                    "content-length" => content_length = value.parse().unwrap_or(0),
                    "authorization" => authorization = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        while buf.len() < header_end + content_length {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        let body_end = buf.len().min(header_end + content_length);
        let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

        let request = RecordedRequest {
            method: method.clone(),
            target,
            authorization,
            body,
        };
        let route = format!(
            "{} {}",
            method,
            request.path().trim_start_matches("/api/v10")
        );
        self.requests.lock().unwrap().push(request);

        let (status, body) = self.next_response(&route);
        let response = format!(
            "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.ok();
        socket.shutdown().await.ok();
    }
}

pub fn text_channel_json() -> String {
    format!(r#"{{"id": "{}", "type": 0, "name": "general"}}"#, CHANNEL)
}

pub fn message_json(id: &str, author: &str, bot: bool, content: &str) -> String {
    format!(
        r#"{{"id": "{}", "content": "{}", "author": {{"id": "9", "username": "{}", "bot": {}}}}}"#,
        id, content, author, bot
    )
}
