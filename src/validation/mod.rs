//! Validation module for admission checks.
//!
//! The validator runs before a job is persisted to catch malformed
//! submissions early.

pub mod pipeline;
pub mod stages;

pub use pipeline::Validator;
pub use stages::{
    MinAvailableValidation, PluginValidation, PolicyValidation, TaskNameValidation,
    TtlValidation, ValidationStage,
};
