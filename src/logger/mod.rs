//! Logger module
//!
//! Provides logging utilities for the service:
//! - Server lifecycle logging
//! - Per-request access lines
//! - Contact storage outcomes
//! - Error and warning logging

pub mod writer;

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::Config;
use crate::store::Persistence;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
pub fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
pub fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, persistence: &Persistence) {
    write_info("======================================");
    write_info("Energy Management Backend started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    match config.server.workers {
        Some(workers) => write_info(&format!("Worker threads: {workers}")),
        None => write_info("Worker threads: default (CPU cores)"),
    }
    write_info(&format!("Database: {}", persistence.describe()));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_request(method: &str, path: &str, status: u16, elapsed: Duration) {
    write_info(&format!(
        "[Request] {method} {path} - {status} ({}us)",
        elapsed.as_micros()
    ));
}

pub fn log_contact_stored(database: &str) {
    write_info(&format!("[Contact] Stored in database '{database}'"));
}

pub fn log_contact_kept_in_memory(held: usize) {
    write_info(&format!("[Contact] Kept in memory ({held} held)"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_shutdown(unsaved: usize) {
    write_info("\n[Shutdown] Stopping accept loop");
    if unsaved > 0 {
        log_warning(&format!(
            "{unsaved} contact submission(s) held only in memory will be lost"
        ));
    }
}
