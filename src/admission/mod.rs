//! Admission module.
//!
//! Bridges admission review envelopes and the job validator.

pub mod review;

pub use review::{
    admit_jobs, decode_job, respond, AdmissionRequest, AdmissionReview, GroupVersionResource,
    Operation,
};
