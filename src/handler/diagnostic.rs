//! Database diagnostic handler (`GET /test`)
//!
//! Every failure is folded into the report; the endpoint always answers 200.

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::{AppState, DatabaseConfig};
use crate::http::json_response;
use crate::logger;
use crate::store::Persistence;

/// At most this many collection names are reported
const MAX_COLLECTIONS: usize = 10;
/// Error text is cut to this many characters
const MAX_ERROR_CHARS: usize = 50;

const BACKEND_RUNNING: &str = "✅ Running";
const DB_MODULE_MISSING: &str = "❌ Database module not found (run enable-database first)";
const DB_NOT_INITIALIZED: &str = "⚠️  Available but not initialized";
const DB_WORKING: &str = "✅ Connected & Working";
const SET: &str = "✅ Set";
const NOT_SET: &str = "❌ Not Set";

#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

pub fn build_report(persistence: &Persistence, db: &DatabaseConfig) -> DiagnosticReport {
    let mut report = DiagnosticReport {
        backend: BACKEND_RUNNING.to_string(),
        database: DB_MODULE_MISSING.to_string(),
        database_url: presence(db.url_is_set()),
        database_name: presence(db.name_is_set()),
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    match persistence {
        Persistence::Missing => {}
        Persistence::Uninitialized => report.database = DB_NOT_INITIALIZED.to_string(),
        Persistence::Ready(store) => {
            report.connection_status = "Connected".to_string();
            match store.list_collection_names() {
                Ok(mut names) => {
                    names.truncate(MAX_COLLECTIONS);
                    report.collections = names;
                    report.database = DB_WORKING.to_string();
                }
                Err(e) => report.database = connection_error(&e.to_string()),
            }
        }
    }

    report
}

/// GET /test
pub async fn handle_diagnostic(state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let worker_state = Arc::clone(state);
    let listed = tokio::task::spawn_blocking(move || {
        build_report(&worker_state.persistence, &worker_state.config.database)
    })
    .await;

    let report = listed.unwrap_or_else(|e| {
        logger::log_error(&format!("[Diagnostic] Report task failed: {e}"));
        let mut report = build_report(&Persistence::Missing, &state.config.database);
        report.connection_status = "Connected".to_string();
        report.database = connection_error(&e.to_string());
        report
    });
    json_response(StatusCode::OK, &report)
}

fn connection_error(message: &str) -> String {
    format!("⚠️  Connected but Error: {}", truncate(message))
}

fn presence(set: bool) -> String {
    let label = if set { SET } else { NOT_SET };
    label.to_string()
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_CHARS).collect()
}
