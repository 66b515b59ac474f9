//! Core types for job admission.
//!
//! This module contains the foundational types the validator works on:
//! - Job, task and lifecycle policy descriptions
//! - The admission response record
//! - Error types
//! - The validation context handed to each stage

pub mod types;
pub mod response;
pub mod error;
pub mod context;

// Re-export commonly used types
pub use types::{Action, Event, Job, JobSpec, LifecyclePolicy, ObjectMeta, TaskSpec};
pub use response::{AdmissionResponse, Status};
pub use error::{AdmissionError, PolicyScope, ValidationError};
pub use context::ValidationContext;
