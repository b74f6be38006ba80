// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::sync::watch;

use super::idle::{IdleClock, TrackedIo};
use crate::config;
use crate::handler;
use crate::logger;

/// How often an open connection compares its idle time against the limit
const IDLE_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `shutdown` - Flips to `true` when the server starts shutting down
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: &Arc<config::AppState>,
    conn_counter: &Arc<AtomicUsize>,
    shutdown: &watch::Receiver<bool>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            // Exceeded limit: rollback counter and reject
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(stream);
            return;
        }
    }

    if state.config.logging.access_log {
        logger::log_connection_accepted(&peer_addr);
    }

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        Arc::clone(conn_counter),
        shutdown.clone(),
    );
}

/// Handle a single connection in a spawned task.
///
/// The connection is asked to close gracefully when the server shuts down or
/// when it has been quiet for longer than its idle limit
/// (`keep_alive_timeout`, or the read/write timeout with keep-alive off).
/// Once closing, it gets the read/write timeout to finish the request in
/// flight before it is dropped.
#[allow(clippy::ignored_unit_patterns)]
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<config::AppState>,
    conn_counter: Arc<AtomicUsize>,
    mut shutdown: watch::Receiver<bool>,
) {
    tokio::spawn(async move {
        let clock = IdleClock::new();
        let io = TrackedIo::new(TokioIo::new(stream), clock.clone());

        let performance = &state.config.performance;
        let keep_alive = performance.keep_alive_timeout > 0;
        let io_timeout = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));
        let idle_limit = if keep_alive {
            Duration::from_secs(performance.keep_alive_timeout)
        } else {
            io_timeout
        };

        let mut builder = http1::Builder::new();
        builder.keep_alive(keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );
        tokio::pin!(conn);

        let mut idle_check = tokio::time::interval(IDLE_CHECK_INTERVAL);
        let mut closing = *shutdown.borrow();
        let mut close_deadline = tokio::time::Instant::now() + io_timeout;
        if closing {
            conn.as_mut().graceful_shutdown();
        }

        loop {
            tokio::select! {
                result = conn.as_mut() => {
                    if let Err(err) = result {
                        logger::log_connection_error(&err);
                    }
                    break;
                }

                _ = shutdown.changed(), if !closing => {
                    closing = true;
                    close_deadline = tokio::time::Instant::now() + io_timeout;
                    conn.as_mut().graceful_shutdown();
                }

                _ = idle_check.tick(), if !closing => {
                    if clock.idle_for() >= idle_limit {
                        closing = true;
                        close_deadline = tokio::time::Instant::now() + io_timeout;
                        conn.as_mut().graceful_shutdown();
                    }
                }

                _ = tokio::time::sleep_until(close_deadline), if closing => {
                    logger::log_warning(&format!(
                        "Connection from {peer_addr} did not close within {} seconds",
                        io_timeout.as_secs()
                    ));
                    break;
                }
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
