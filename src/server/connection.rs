// Connection handling module
// Serves one TCP connection with hyper and runs each response off the async threads

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use super::ServerState;
use crate::http::{RequestContext, ResponseSink};
use crate::logger;

/// Handle a single connection in a spawned task.
///
/// The whole connection, keep-alive included, is bounded by the configured
/// request timeout.
pub fn spawn_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, state: Arc<ServerState>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| respond(req, peer_addr, Arc::clone(&service_state))),
        );

        match tokio::time::timeout(state.request_timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&state.log, &err),
            Err(_) => logger::log_warning(
                &state.log,
                &format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    state.request_timeout.as_secs()
                ),
            ),
        }
    });
}

/// Produce the response for one request
///
/// File reads are blocking, so resolution and writing run on the blocking pool.
pub async fn respond<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<ServerState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let ctx = RequestContext::from_request(&req).with_remote_addr(peer_addr);
    drop(req);

    let task_state = Arc::clone(&state);
    let joined = tokio::task::spawn_blocking(move || {
        let mut sink = ResponseSink::new();
        task_state
            .handler
            .handle(&mut sink, &ctx, |sink| task_state.app.resolve(sink, &ctx));
        sink.into_response()
    })
    .await;

    Ok(joined.unwrap_or_else(|e| {
        logger::log_error(&state.log, &format!("Response task failed: {e}"));
        let mut sink = ResponseSink::new();
        sink.write_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error");
        sink.into_response()
    }))
}
