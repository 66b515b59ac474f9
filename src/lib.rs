//! # Job Admission - Validation gate for batch job submissions
//!
//! Before a batch job is persisted and handed to the scheduler it passes
//! through this gate. Malformed jobs are rejected with a diagnostic rather
//! than accepted and left to fail at schedule or run time.
//!
//! ## Features
//!
//! - **Fail-fast validation**: Checks run in a fixed order and stop at the first violation
//! - **Injected plugin registry**: Plugin lookups go through the [`PluginRegistry`] trait
//! - **Admission reviews**: CREATE and UPDATE requests are turned into admission responses
//! - **Concurrent use**: A [`Validator`] is stateless and can be shared across threads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use job_admission::prelude::*;
//! use std::sync::Arc;
//!
//! let validator = Validator::new(Arc::new(InMemoryPluginRegistry::with_builtins()));
//!
//! let job = Job::new("training", "default")
//!     .with_min_available(2)
//!     .with_task(TaskSpec::new("worker", 2))
//!     .with_plugin("ssh", vec![]);
//!
//! let mut response = AdmissionResponse::default();
//! let message = validator.validate(&job, &mut response);
//! assert!(message.is_empty() && response.allowed);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Job description types, the admission response and error types
//! - [`validation`]: The validator and its individual stages
//! - [`plugins`]: Plugin registry
//! - [`admission`]: Admission review handling
//! - [`config`]: Startup configuration
//!
//! ## Checks
//!
//! In order:
//!
//! 1. Task names are unique
//! 2. No policy scope lists the same event twice
//! 3. `minAvailable` does not exceed the total replica count
//! 4. Every requested plugin is registered
//! 5. `ttlSecondsAfterFinished` is not negative
//!
//! [`PluginRegistry`]: crate::plugins::PluginRegistry
//! [`Validator`]: crate::validation::Validator

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod admission;
pub mod config;
pub mod core;
pub mod plugins;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use job_admission::prelude::*;
/// ```
pub mod prelude {
    // Job description
    pub use crate::core::types::{Action, Event, Job, JobSpec, LifecyclePolicy, ObjectMeta, TaskSpec};

    // Response
    pub use crate::core::response::{AdmissionResponse, Status};

    // Errors
    pub use crate::core::error::{
        AdmissionError, AdmissionResult, PolicyScope, ValidationError, ValidationResult,
    };

    // Validation
    pub use crate::core::context::ValidationContext;
    pub use crate::validation::pipeline::Validator;
    pub use crate::validation::stages::{
        MinAvailableValidation, PluginValidation, PolicyValidation, TaskNameValidation,
        TtlValidation, ValidationStage,
    };

    // Plugins
    pub use crate::plugins::registry::{
        InMemoryPluginRegistry, PluginEntry, PluginRegistry, RegistryBuilder,
    };

    // Admission
    pub use crate::admission::review::{
        admit_jobs, respond, AdmissionRequest, AdmissionReview, GroupVersionResource, Operation,
    };

    // Config
    pub use crate::config::{AdmissionConfig, PluginConfig};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
