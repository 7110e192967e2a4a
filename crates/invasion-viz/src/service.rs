//! Map Service
//!
//! Minimal HTTP/1.1 responder: `/` is a self-refreshing page, `/map` a fresh
//! render of the live world. One connection per request.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use invasion_events::WorldSnapshot;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::render::Renderer;

/// Produces a point-in-time copy of the world on demand
pub type SnapshotSource = Arc<dyn Fn() -> WorldSnapshot + Send + Sync>;

const INDEX_PAGE: &str = r#"
<html>
<head>
<meta http-equiv="refresh" content="1" />
</head>
<body>
<img src="/map" />
</body>
</html>
"#;

const READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("binding {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("accepting connection: {0}")]
    Accept(#[source] io::Error),
}

/// A complete HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    fn status_text(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    /// Status line, headers and body
    pub fn to_bytes(&self, head_only: bool) -> Vec<u8> {
        let mut bytes = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            self.status_text(),
            self.content_type,
            self.body.len()
        )
        .into_bytes();
        if !head_only {
            bytes.extend_from_slice(&self.body);
        }
        bytes
    }
}

/// Serves the index page and rendered snapshots
#[derive(Clone)]
pub struct MapService {
    source: SnapshotSource,
    renderer: Arc<dyn Renderer>,
}

impl MapService {
    pub fn new(source: SnapshotSource, renderer: impl Renderer + 'static) -> Self {
        Self {
            source,
            renderer: Arc::new(renderer),
        }
    }

    /// Routes one request. Only the path matters; any query is ignored.
    pub fn handle(&self, method: &str, target: &str) -> Response {
        let head_only = method.eq_ignore_ascii_case("HEAD");
        if !method.eq_ignore_ascii_case("GET") && !head_only {
            return Response::new(405, "text/plain; charset=utf-8", "method not allowed");
        }

        match target.split('?').next().unwrap_or(target) {
            "/" => Response::new(200, "text/html; charset=utf-8", INDEX_PAGE),
            "/map" => {
                let snapshot = (self.source)();
                match self.renderer.render(&snapshot) {
                    Ok(body) => Response::new(200, self.renderer.content_type(), body),
                    Err(e) => {
                        warn!(tick = snapshot.tick, error = %e, "rendering map");
                        Response::new(500, "text/plain; charset=utf-8", e.to_string())
                    }
                }
            }
            _ => Response::new(404, "text/plain; charset=utf-8", "not found"),
        }
    }

    /// Binds `address` and serves until the task is dropped.
    pub async fn run(self, address: &str) -> Result<(), ServeError> {
        let address = bind_address(address);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServeError::Bind {
                address: address.clone(),
                source,
            })?;
        info!(%address, "starting http server");
        self.serve(listener).await
    }

    /// Accepts connections on `listener`, one task per connection.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServeError> {
        loop {
            let (stream, peer) = listener.accept().await.map_err(ServeError::Accept)?;
            let service = self.clone();
            tokio::spawn(async move {
                if let Err(e) = service.handle_connection(stream).await {
                    debug!(%peer, error = %e, "connection failed");
                }
            });
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream) -> io::Result<()> {
        let mut buffer = [0_u8; 8192];
        let bytes = match timeout(READ_TIMEOUT, stream.read(&mut buffer)).await {
            Ok(read) => read?,
            Err(_) => return Ok(()),
        };
        if bytes == 0 {
            return Ok(());
        }

        let request = String::from_utf8_lossy(&buffer[..bytes]);
        let response = match request.lines().next() {
            Some(line) => {
                let mut parts = line.split_whitespace();
                let method = parts.next().unwrap_or_default();
                let target = parts.next().unwrap_or_default();
                let response = self.handle(method, target);
                debug!(method, target, status = response.status, "request");
                response.to_bytes(method.eq_ignore_ascii_case("HEAD"))
            }
            None => Response::new(400, "text/plain; charset=utf-8", "bad request").to_bytes(false),
        };

        stream.write_all(&response).await?;
        stream.flush().await?;
        stream.shutdown().await
    }
}

/// `:8080` style addresses listen on every interface.
pub fn bind_address(address: &str) -> String {
    let address = address.trim();
    if address.starts_with(':') {
        format!("0.0.0.0{address}")
    } else {
        address.to_string()
    }
}
