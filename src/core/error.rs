//! Error types for job admission.
//!
//! Uses thiserror for structured errors. Two families exist:
//! - [`ValidationError`]: a job violated an admission rule. Its `Display`
//!   output is the diagnostic handed back to the submitter.
//! - [`AdmissionError`]: the request itself could not be processed
//!   (decoding, wrong resource, unsupported operation, bad config).

use crate::core::types::Event;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Policy list a duplicate event was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    /// The job's own policy list.
    Job,
    /// The policy list of the named task.
    Task(String),
}

impl fmt::Display for PolicyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyScope::Job => write!(f, "job"),
            PolicyScope::Task(name) => write!(f, "task {}", name),
        }
    }
}

/// A rule the submitted job violates.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("duplicated task name {name}")]
    DuplicateTaskName { name: String },

    #[error("duplicated event policies in {scope}: {event}")]
    DuplicatePolicyEvent { scope: PolicyScope, event: Event },

    #[error("'minAvailable' should not be greater than total replicas in tasks")]
    MinAvailableExceedsReplicas { min_available: u32, total_replicas: u64 },

    #[error("unable to find job plugin: {name}")]
    PluginNotFound { name: String },

    #[error("'ttlSecondsAfterFinished' cannot be less than zero")]
    NegativeTtl { ttl: i32 },

    #[error("job.spec is not allowed to modify when update jobs")]
    SpecModified,
}

impl ValidationError {
    /// Get suggestion for fixing this error.
    pub fn suggested_fix(&self) -> Option<String> {
        match self {
            ValidationError::DuplicateTaskName { name } => {
                Some(format!("Rename one of the tasks called '{}'", name))
            }
            ValidationError::DuplicatePolicyEvent { scope, event } => Some(format!(
                "Keep a single policy for event '{}' in the {} policies",
                event, scope
            )),
            ValidationError::MinAvailableExceedsReplicas {
                min_available,
                total_replicas,
            } => Some(format!(
                "Lower minAvailable ({}) to at most {} or add replicas",
                min_available, total_replicas
            )),
            ValidationError::PluginNotFound { name } => {
                Some(format!("Remove plugin '{}' or register it", name))
            }
            ValidationError::NegativeTtl { .. } => {
                Some("Set ttlSecondsAfterFinished to zero or more".to_string())
            }
            ValidationError::SpecModified => None,
        }
    }
}

/// Errors raised while handling an admission request.
#[derive(Error, Debug)]
pub enum AdmissionError {
    #[error("admission review carries no request")]
    MissingRequest,

    #[error("expect resource to be {expected}")]
    UnexpectedResource { expected: String, got: String },

    #[error("expect operation to be 'CREATE' or 'UPDATE'")]
    UnsupportedOperation { operation: String },

    #[error("failed to decode job: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type alias for admission handling.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// Result type alias for validation checks.
pub type ValidationResult<T> = Result<T, ValidationError>;
