use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MIN_MESSAGE_CHARS: usize = 10;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// A contact form submission. Missing fields deserialize as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Per-field reasons a submission was rejected.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

/// Checks every field and reports all failures together.
pub fn validate_submission(submission: &ContactSubmission) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if submission.name.trim().is_empty() {
        errors.entry("name").or_default().push("Name is required".to_string());
    }

    let email = submission.email.trim();
    if email.is_empty() {
        errors.entry("email").or_default().push("Email is required".to_string());
    } else if !EMAIL_SHAPE.is_match(email) {
        errors
            .entry("email")
            .or_default()
            .push("Please enter a valid email address".to_string());
    }

    if submission.message.trim().chars().count() < MIN_MESSAGE_CHARS {
        errors.entry("message").or_default().push(format!(
            "Message must be at least {MIN_MESSAGE_CHARS} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
