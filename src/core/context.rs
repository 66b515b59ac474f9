//! Validation context.
//!
//! The context hands each validation stage the job under review together
//! with the capabilities it may consult.

use crate::core::types::Job;
use crate::plugins::registry::PluginRegistry;

/// Context provided to every validation stage.
///
/// Both the job and the registry are borrowed read-only; stages never
/// mutate either.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Job being validated.
    pub job: &'a Job,
    /// Registry of known job plugins.
    pub plugins: &'a dyn PluginRegistry,
}

impl<'a> ValidationContext<'a> {
    /// Create a new validation context.
    pub fn new(job: &'a Job, plugins: &'a dyn PluginRegistry) -> Self {
        Self { job, plugins }
    }

    /// Check whether a plugin is registered.
    pub fn plugin_exists(&self, name: &str) -> bool {
        self.plugins.exists(name)
    }
}

impl std::fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("job", &self.job.key())
            .finish_non_exhaustive()
    }
}
