//! Individual validation stages.
//!
//! Each stage checks one admission rule and reports the first violation
//! it finds.

use crate::core::context::ValidationContext;
use crate::core::error::{PolicyScope, ValidationError, ValidationResult};
use crate::core::types::{Event, LifecyclePolicy};
use std::collections::HashSet;

/// Trait for validation stages.
pub trait ValidationStage: Send + Sync {
    /// Name of this validation stage.
    fn name(&self) -> &str;

    /// Check the job in `ctx`, returning the first violation found.
    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult<()>;
}

/// Task names must be unique within a job.
pub struct TaskNameValidation;

impl ValidationStage for TaskNameValidation {
    fn name(&self) -> &str {
        "Task Name Validation"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult<()> {
        let mut seen = HashSet::new();

        for task in &ctx.job.spec.tasks {
            if !seen.insert(task.name.as_str()) {
                return Err(ValidationError::DuplicateTaskName {
                    name: task.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// No two policies in one scope may react to the same event.
///
/// The job's list is checked first, then each task's list in task order.
/// Scopes are independent of one another.
pub struct PolicyValidation;

impl ValidationStage for PolicyValidation {
    fn name(&self) -> &str {
        "Policy Validation"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult<()> {
        let spec = &ctx.job.spec;

        if let Some(event) = find_duplicate_event(&spec.policies) {
            return Err(ValidationError::DuplicatePolicyEvent {
                scope: PolicyScope::Job,
                event,
            });
        }

        for task in &spec.tasks {
            if let Some(event) = find_duplicate_event(&task.policies) {
                return Err(ValidationError::DuplicatePolicyEvent {
                    scope: PolicyScope::Task(task.name.clone()),
                    event,
                });
            }
        }

        Ok(())
    }
}

/// First event that appears twice in `policies`.
fn find_duplicate_event(policies: &[LifecyclePolicy]) -> Option<Event> {
    let mut seen = HashSet::new();
    policies
        .iter()
        .map(|policy| policy.event)
        .find(|event| !seen.insert(*event))
}

/// `minAvailable` may not exceed the total replica count.
pub struct MinAvailableValidation;

impl ValidationStage for MinAvailableValidation {
    fn name(&self) -> &str {
        "MinAvailable Validation"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult<()> {
        let spec = &ctx.job.spec;
        let total_replicas = spec.total_replicas();

        if u64::from(spec.min_available) > total_replicas {
            return Err(ValidationError::MinAvailableExceedsReplicas {
                min_available: spec.min_available,
                total_replicas,
            });
        }

        Ok(())
    }
}

/// Every requested plugin must be registered.
pub struct PluginValidation;

impl ValidationStage for PluginValidation {
    fn name(&self) -> &str {
        "Plugin Validation"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult<()> {
        match ctx
            .job
            .spec
            .plugins
            .keys()
            .find(|name| !ctx.plugin_exists(name))
        {
            Some(name) => Err(ValidationError::PluginNotFound { name: name.clone() }),
            None => Ok(()),
        }
    }
}

/// `ttlSecondsAfterFinished`, when set, must not be negative.
pub struct TtlValidation;

impl ValidationStage for TtlValidation {
    fn name(&self) -> &str {
        "TTL Validation"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult<()> {
        match ctx.job.spec.ttl_seconds_after_finished {
            Some(ttl) if ttl < 0 => Err(ValidationError::NegativeTtl { ttl }),
            _ => Ok(()),
        }
    }
}
