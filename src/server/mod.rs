// Server module entry point
// Listener setup, the accept loop, connection handling and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::Config;
use crate::fs::DirFs;
use crate::handler::{App, Handler};
use crate::logger::{self, LogSink, LogWriter};

// Re-export commonly used items
pub use connection::{respond, spawn_connection};
pub use listener::create_reusable_listener;

/// Everything a connection needs to answer requests
pub struct ServerState {
    pub app: App,
    pub handler: Handler,
    pub log: Arc<LogWriter>,
    pub keep_alive: bool,
    pub request_timeout: Duration,
}

impl ServerState {
    pub fn from_config(config: &Config, log: Arc<LogWriter>) -> Self {
        let mut app = App::new(Arc::new(DirFs::new(&config.serve.root)))
            .with_options(config.serve.response_options());
        if let Some(index) = config.serve.index_file() {
            app = app.with_index_file(index);
        }

        let sink: Arc<dyn LogSink> = Arc::clone(&log) as Arc<dyn LogSink>;
        let handler = Handler::new(sink)
            .with_format(config.logging.access_log_format.clone())
            .with_access_log(config.logging.access_log);

        Self {
            app,
            handler,
            log,
            keep_alive: config.performance.keep_alive,
            request_timeout: config.performance.request_timeout(),
        }
    }
}

/// Accept connections until `shutdown` is notified
///
/// Connections already accepted keep running on their own tasks.
pub async fn run(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: Arc<Notify>,
) -> io::Result<()> {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        spawn_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&state.log, &format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => {
                logger::log_shutdown(&state.log);
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn start(root: &std::path::Path) -> (std::net::SocketAddr, Arc<Notify>) {
        let cfg = Config::from_toml(&format!(
            "[serve]\nroot = {:?}\n[logging]\naccess_log = false",
            root.display().to_string()
        ))
        .unwrap();
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ServerState::from_config(&cfg, Arc::new(LogWriter::stdio())));
        let shutdown = Arc::new(Notify::new());
        tokio::spawn(run(listener, state, Arc::clone(&shutdown)));
        (addr, shutdown)
    }

    async fn send(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_serves_files_and_ranges() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), b"<p>home</p>").unwrap();
        std::fs::write(dir.path().join("data.txt"), b"0123456789").unwrap();
        let (addr, shutdown) = start(dir.path()).await;

        let response = send(
            addr,
            "GET /data.txt HTTP/1.1\r\nHost: test\r\nRange: bytes=2-5\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 206"), "{response}");
        assert!(response.to_ascii_lowercase().contains("content-range: bytes 2-5/10"));
        assert!(response.ends_with("\r\n\r\n2345"), "{response}");

        let response = send(
            addr,
            "GET /missing/route HTTP/1.1\r\nHost: test\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.ends_with("<p>home</p>"), "{response}");

        shutdown.notify_one();
    }

    #[tokio::test]
    async fn test_rejects_non_get() {
        let dir = tempfile::tempdir().unwrap();
        let (addr, shutdown) = start(dir.path()).await;

        let response = send(
            addr,
            "DELETE /x HTTP/1.1\r\nHost: test\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 405"), "{response}");
        assert!(response.ends_with("method not allowed\n"), "{response}");

        shutdown.notify_one();
    }
}
