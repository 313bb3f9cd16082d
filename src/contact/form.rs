// Contact form model and validation

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub const NAME_MIN: u64 = 2;
pub const NAME_MAX: u64 = 120;
pub const MESSAGE_MIN: u64 = 5;
pub const MESSAGE_MAX: u64 = 2000;

/// Contact form as posted by the client
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactForm {
    #[validate(length(min = NAME_MIN, max = NAME_MAX))]
    pub name: String,
    #[validate(email, custom(function = "validate_email_domain"))]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[validate(length(min = MESSAGE_MIN, max = MESSAGE_MAX))]
    pub message: String,
}

/// Require a dotted domain name after the `@`.
///
/// Single-label hosts (`jo@localhost`) and address literals (`jo@[127.0.0.1]`)
/// are refused. Addresses without a domain part are left to the email check.
fn validate_email_domain(email: &str) -> Result<(), ValidationError> {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return Ok(());
    };
    if domain.is_empty() {
        return Ok(());
    }
    let dotted = domain
        .split('.')
        .all(|label| !label.is_empty())
        && domain.contains('.');
    if domain.starts_with('[') || !dotted {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}

/// An accepted contact form, stamped by the server
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn new(form: ContactForm, created_at: DateTime<Utc>) -> Self {
        Self {
            name: form.name,
            email: form.email,
            company: form.company,
            message: form.message,
            created_at,
        }
    }

    /// Document written to the `contact` collection
    pub fn to_document(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

fn serialize_timestamp<S: serde::Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
}

/// One entry of a 422 response's `detail` list
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    fn new(loc: &[&str], msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: loc.iter().map(ToString::to_string).collect(),
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

/// Parse and validate a request body.
///
/// Returns the accepted form, or every problem found as `detail` entries.
pub fn parse_form(body: &[u8]) -> Result<ContactForm, Vec<FieldError>> {
    let form: ContactForm = serde_json::from_slice(body).map_err(|e| vec![decode_error(&e)])?;
    form.validate().map_err(|e| field_errors(&e))?;
    Ok(form)
}

fn decode_error(err: &serde_json::Error) -> FieldError {
    use serde_json::error::Category;

    let text = err.to_string();
    match err.classify() {
        Category::Data => match missing_field(&text) {
            Some(field) => FieldError::new(&["body", field], "Field required", "missing"),
            None => FieldError::new(&["body"], text, "value_error"),
        },
        Category::Syntax | Category::Eof | Category::Io => {
            FieldError::new(&["body"], format!("JSON decode error: {text}"), "json_invalid")
        }
    }
}

/// Extract `name` from serde's "missing field `name` at line .." message
fn missing_field(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("missing field `")?;
    rest.split('`').next()
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| describe(&field, e))
        })
        .collect();
    // HashMap order is unstable; keep responses deterministic
    out.sort_by(|a, b| a.loc.cmp(&b.loc));
    out
}

fn describe(field: &str, err: &ValidationError) -> FieldError {
    let bounds = match field {
        "name" => Some((NAME_MIN, NAME_MAX)),
        "message" => Some((MESSAGE_MIN, MESSAGE_MAX)),
        _ => None,
    };
    match (&*err.code, bounds) {
        ("length", Some((min, max))) => {
            let len = err
                .params
                .get("value")
                .and_then(serde_json::Value::as_str)
                .map_or(0, |v| u64::try_from(v.chars().count()).unwrap_or(u64::MAX));
            if len < min {
                FieldError::new(
                    &["body", field],
                    format!("String should have at least {min} characters"),
                    "string_too_short",
                )
            } else {
                FieldError::new(
                    &["body", field],
                    format!("String should have at most {max} characters"),
                    "string_too_long",
                )
            }
        }
        ("email", _) => FieldError::new(
            &["body", field],
            "value is not a valid email address",
            "value_error",
        ),
        (code, _) => FieldError::new(&["body", field], format!("invalid value ({code})"), "value_error"),
    }
}
