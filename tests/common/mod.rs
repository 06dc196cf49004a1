//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use hub_gate::config::ConfigStore;
use hub_gate::lifecycle::{self, Running};
use hub_gate::security::AccessPolicy;
use hub_gate::ProxyConfig;

/// A request as seen by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub type Log = Arc<Mutex<Vec<Recorded>>>;

/// Format a raw HTTP/1.1 response that closes the connection.
pub fn http_response(status_line: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {}\r\n", status_line);
    for (name, value) in headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    ));
    response
}

/// Start a programmable upstream on an ephemeral port.
///
/// `respond` receives each parsed request and returns the raw bytes to write
/// back. Every request is appended to the returned log.
pub async fn start_upstream<F>(respond: F) -> (SocketAddr, Log)
where
    F: Fn(&Recorded) -> String + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let task_log = log.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let respond = respond.clone();
            let log = task_log.clone();
            tokio::spawn(async move {
                if let Some((mut socket, recorded)) = read_request(socket).await {
                    let response = respond(&recorded);
                    log.lock().unwrap().push(recorded);
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });
        }
    });

    (addr, log)
}

async fn read_request(mut socket: TcpStream) -> Option<(TcpStream, Recorded)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let mut body = buf[head_end + 4..].to_vec();
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some((
        socket,
        Recorded {
            method,
            path,
            headers,
            body,
        },
    ))
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Write an access-list document to a fresh temp file.
pub fn write_access_list(policy: &AccessPolicy) -> PathBuf {
    let path = std::env::temp_dir().join(format!("hub-gate-it-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, serde_json::to_string(policy).unwrap()).unwrap();
    path
}

/// Config pinning each upstream host name to a local address.
pub fn config_with_upstreams(resolve: &[(&str, SocketAddr)]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.resolve = resolve
        .iter()
        .map(|(host, addr)| (host.to_string(), *addr))
        .collect::<HashMap<_, _>>();
    config.upstream.connect_timeout_secs = 2;
    config.upstream.response_header_timeout_secs = 5;
    config
}

/// Start the proxy on an ephemeral port with `policy` as its access list.
pub async fn start_proxy(mut config: ProxyConfig, policy: AccessPolicy) -> Running {
    let path = write_access_list(&policy);
    config.access.path = path.to_string_lossy().into_owned();
    let store = Arc::new(ConfigStore::load(&path).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    lifecycle::start_with_store(config, listener, store).await.unwrap()
}

/// Client that never follows redirects and ignores proxy env vars.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

pub fn list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
