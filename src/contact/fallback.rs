// In-memory fallback log
// Keeps submissions for the lifetime of the process when no store accepted them.
// Contents are lost on restart.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ContactSubmission;

/// Append-only list of submissions
#[derive(Debug, Default)]
pub struct FallbackLog {
    entries: Mutex<Vec<ContactSubmission>>,
}

impl FallbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submission, returning the new length
    pub fn append(&self, submission: ContactSubmission) -> usize {
        let mut entries = self.lock();
        entries.push(submission);
        entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current contents
    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<ContactSubmission> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ContactSubmission>> {
        // A panic mid-push cannot leave the Vec inconsistent
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactForm;
    use chrono::Utc;
    use std::sync::Arc;

    fn submission(name: &str) -> ContactSubmission {
        ContactSubmission::new(
            ContactForm {
                name: name.to_string(),
                email: "jo@example.com".to_string(),
                company: None,
                message: "Hello there".to_string(),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_append_preserves_order() {
        let log = FallbackLog::new();
        assert!(log.is_empty());
        assert_eq!(log.append(submission("Jo")), 1);
        assert_eq!(log.append(submission("Al")), 2);

        let names: Vec<String> = log.snapshot().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Jo", "Al"]);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let log = Arc::new(FallbackLog::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for j in 0..50 {
                        log.append(submission(&format!("w{i}-{j}")));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.len(), 400);
    }
}
