//! Contact submissions
//!
//! Form parsing/validation, the stamped submission record, and the
//! in-memory fallback log used when no document store takes the write.

mod fallback;
mod form;

pub use fallback::FallbackLog;
pub use form::{parse_form, ContactForm, ContactSubmission, FieldError};

/// Collection that contact submissions are written to
pub const CONTACT_COLLECTION: &str = "contact";
