//! Logger module
//!
//! Provides logging utilities for the signup server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Registry change and error logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, LogLevel};
use crate::registry::ActivityRegistry;
use std::net::SocketAddr;
use std::sync::OnceLock;

/// Threshold from `logging.level`; `Info` until `init` runs
static LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )?;
    let _ = LEVEL.set(config.logging.level);
    Ok(())
}

fn enabled(level: LogLevel) -> bool {
    LEVEL.get().copied().unwrap_or(LogLevel::Info).allows(level)
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, registry: &ActivityRegistry) {
    if !enabled(LogLevel::Info) {
        return;
    }
    write_info("======================================");
    write_info("Activity signup server started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level.as_str()));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!("Activities loaded: {}", registry.len()));
    if registry.enforces_capacity() {
        write_info("Capacity enforcement: on");
    }
    write_info(&format!(
        "Static files: {} -> {}",
        config.routes.static_prefix, config.routes.static_dir
    ));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[Connection] Accepted from: {peer_addr}"));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_headers_count(count: usize, show: bool) {
    if show && enabled(LogLevel::Debug) {
        write_info(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

/// One line per successful roster mutation
pub fn log_registry_change(message: &str) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[Registry] {message}"));
    }
}

pub fn log_signal(name: &str) {
    if enabled(LogLevel::Info) {
        write_info(&format!("[Signal] {name} received, initiating graceful shutdown"));
    }
}

pub fn log_shutdown(active_connections: usize) {
    if enabled(LogLevel::Info) {
        write_info(&format!(
            "[Shutdown] Listener closed, {active_connections} connection(s) still finishing"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_is_info() {
        // tests never call `init`, so the built-in threshold applies
        assert!(enabled(LogLevel::Error));
        assert!(enabled(LogLevel::Info));
        assert!(!enabled(LogLevel::Debug));
    }
}
