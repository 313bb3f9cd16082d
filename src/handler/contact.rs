//! Contact form submission handler

use std::sync::Arc;

use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::config::AppState;
use crate::contact::{parse_form, ContactForm, ContactSubmission, FieldError, CONTACT_COLLECTION};
use crate::http::json_response;
use crate::logger;
use crate::store::{Persistence, StoreError};

#[derive(Serialize)]
struct ValidationFailure {
    detail: Vec<FieldError>,
}

/// Where an accepted submission ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOutcome {
    Stored,
    KeptInMemory,
}

/// POST /api/contact
pub async fn handle_contact(body: &[u8], state: &Arc<AppState>) -> Response<Full<Bytes>> {
    let form: ContactForm = match parse_form(body) {
        Ok(form) => form,
        Err(detail) => {
            return json_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                &ValidationFailure { detail },
            )
        }
    };

    // Store I/O is blocking; keep it off the async worker threads
    let submission = ContactSubmission::new(form, Utc::now());
    let worker_state = Arc::clone(state);
    let stored =
        tokio::task::spawn_blocking(move || store_submission(submission, &worker_state)).await;
    if let Err(e) = stored {
        logger::log_error(&format!("[Contact] Storage task failed: {e}"));
    }

    json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
}

/// Write a submission to exactly one place: the document store when it takes
/// the insert, the in-memory fallback otherwise. Failures are logged, not returned.
pub fn store_submission(submission: ContactSubmission, state: &AppState) -> StorageOutcome {
    if let Persistence::Ready(store) = &state.persistence {
        let inserted = submission
            .to_document()
            .map_err(StoreError::from)
            .and_then(|doc| store.insert_one(CONTACT_COLLECTION, &doc));
        match inserted {
            Ok(()) => {
                logger::log_contact_stored(store.name());
                return StorageOutcome::Stored;
            }
            Err(e) => logger::log_warning(&format!("[Contact] Database insert failed: {e}")),
        }
    }

    let held = state.fallback.append(submission);
    logger::log_contact_kept_in_memory(held);
    StorageOutcome::KeptInMemory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{DocumentStore, JsonLinesStore};
    use http_body_util::BodyExt;
    use std::sync::{mpsc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    const VALID: &[u8] = br#"{"name":"Jo","email":"jo@example.com","message":"Hello there"}"#;

    fn config() -> Config {
        Config::load_with("no-such-config", |_| None).unwrap()
    }

    fn submission() -> ContactSubmission {
        ContactSubmission::new(
            ContactForm {
                name: "Jo".to_string(),
                email: "jo@example.com".to_string(),
                company: Some("Acme".to_string()),
                message: "Hello there".to_string(),
            },
            Utc::now(),
        )
    }

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_submission_kept_in_memory_without_database() {
        let state = Arc::new(AppState::with_persistence(&config(), Persistence::Missing));
        let resp = handle_contact(VALID, &state).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!({"status": "ok"}));

        let held = state.fallback.snapshot();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].name, "Jo");
        assert!(held[0].created_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_invalid_submission_has_no_side_effect() {
        let state = Arc::new(AppState::with_persistence(&config(), Persistence::Missing));
        let resp = handle_contact(
            br#"{"name":"J","email":"jo@example.com","message":"Hello there"}"#,
            &state,
        )
        .await;

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        assert_eq!(body["detail"][0]["loc"], serde_json::json!(["body", "name"]));
        assert!(state.fallback.is_empty());
    }

    #[test]
    fn test_ready_store_takes_the_insert() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(JsonLinesStore::open(tmp.path().to_str().unwrap(), "energy"));
        let handle: Arc<dyn DocumentStore> = store.clone();
        let state = AppState::with_persistence(&config(), Persistence::Ready(handle));

        assert_eq!(store_submission(submission(), &state), StorageOutcome::Stored);
        assert!(state.fallback.is_empty());

        let docs = store.documents(CONTACT_COLLECTION).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["company"], "Acme");
        assert!(docs[0]["created_at"].as_str().is_some());
    }

    #[test]
    fn test_failed_insert_falls_back_to_memory() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = Arc::new(JsonLinesStore::open(blocker.to_str().unwrap(), "energy"));
        let state = AppState::with_persistence(&config(), Persistence::Ready(store));

        assert_eq!(store_submission(submission(), &state), StorageOutcome::KeptInMemory);
        assert_eq!(state.fallback.len(), 1);
    }

    #[test]
    fn test_uninitialized_database_falls_back_to_memory() {
        let state = AppState::with_persistence(&config(), Persistence::Uninitialized);
        assert_eq!(store_submission(submission(), &state), StorageOutcome::KeptInMemory);
        assert_eq!(state.fallback.len(), 1);
    }

    /// Store whose insert blocks until the test releases it
    struct GatedStore {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl DocumentStore for GatedStore {
        fn name(&self) -> &str {
            "gated"
        }

        fn insert_one(&self, _: &str, _: &serde_json::Value) -> Result<(), StoreError> {
            let _ = self.entered.lock().unwrap().send(());
            self.release
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(2))
                .map_err(|_| StoreError::InvalidCollection("insert was never released".to_string()))
        }

        fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_slow_store_does_not_block_the_runtime() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = GatedStore {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let state = Arc::new(AppState::with_persistence(
            &config(),
            Persistence::Ready(Arc::new(store)),
        ));

        let pending = tokio::spawn({
            let state = Arc::clone(&state);
            async move { handle_contact(VALID, &state).await.status() }
        });

        // The single-threaded test runtime keeps running while the insert waits
        let mut entered = false;
        for _ in 0..100 {
            if entered_rx.try_recv().is_ok() {
                entered = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(entered, "insert never started");
        release_tx.send(()).unwrap();

        assert_eq!(pending.await.unwrap(), StatusCode::OK);
        assert!(state.fallback.is_empty());
    }
}
