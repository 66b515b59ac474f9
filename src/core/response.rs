//! Admission response record.

use serde::{Deserialize, Serialize};

/// Status attached to a rejected response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Human-readable rejection reason.
    #[serde(default)]
    pub message: String,
}

/// Verdict returned to the submitter.
///
/// A fresh response is accepted. It is flipped to rejected at most once per
/// validation call, by [`AdmissionResponse::reject`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// Uid of the request this answers.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    /// Whether the object is admitted.
    pub allowed: bool,
    /// Set only on rejection.
    #[serde(default, rename = "status", skip_serializing_if = "Option::is_none")]
    pub result: Option<Status>,
}

impl AdmissionResponse {
    /// Accepted response with no uid.
    pub fn new() -> Self {
        Self {
            uid: String::new(),
            allowed: true,
            result: None,
        }
    }

    /// Accepted response answering the given request uid.
    pub fn for_uid(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Self::new()
        }
    }

    /// Mark the response rejected with the given reason.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.allowed = false;
        self.result = Some(Status {
            message: message.into(),
        });
    }

    /// Rejected response built from an error.
    pub fn from_error(uid: impl Into<String>, error: &dyn std::error::Error) -> Self {
        let mut response = Self::for_uid(uid);
        response.reject(error.to_string().trim());
        response
    }

    /// Rejection reason, empty when accepted.
    pub fn result_message(&self) -> &str {
        self.result.as_ref().map(|s| s.message.as_str()).unwrap_or("")
    }
}

impl Default for AdmissionResponse {
    fn default() -> Self {
        Self::new()
    }
}
