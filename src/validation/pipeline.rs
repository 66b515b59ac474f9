//! Validation pipeline implementation.

use crate::core::context::ValidationContext;
use crate::core::error::ValidationResult;
use crate::core::response::AdmissionResponse;
use crate::core::types::Job;
use crate::plugins::registry::{InMemoryPluginRegistry, PluginRegistry};
use crate::validation::stages::{
    MinAvailableValidation, PluginValidation, PolicyValidation, TaskNameValidation,
    TtlValidation, ValidationStage,
};
use std::sync::Arc;

/// Fail-fast job validator.
///
/// Runs a fixed sequence of stages over a job and stops at the first
/// violation. The validator holds no mutable state, so one instance can
/// serve any number of concurrent admission requests.
#[derive(Clone)]
pub struct Validator {
    stages: Arc<[Box<dyn ValidationStage>]>,
    plugins: Arc<dyn PluginRegistry>,
}

impl Validator {
    /// Create the standard validator backed by the given plugin registry.
    ///
    /// Stages run in this order: task names, policies, minAvailable,
    /// plugins, TTL.
    pub fn new(plugins: Arc<dyn PluginRegistry>) -> Self {
        Self::with_stages(
            plugins,
            vec![
                Box::new(TaskNameValidation),
                Box::new(PolicyValidation),
                Box::new(MinAvailableValidation),
                Box::new(PluginValidation),
                Box::new(TtlValidation),
            ],
        )
    }

    /// Create a validator running exactly the given stages, in order.
    pub fn with_stages(
        plugins: Arc<dyn PluginRegistry>,
        stages: Vec<Box<dyn ValidationStage>>,
    ) -> Self {
        Self {
            stages: stages.into(),
            plugins,
        }
    }

    /// Names of the configured stages, in run order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage and return the first violation.
    pub fn check(&self, job: &Job) -> ValidationResult<()> {
        let ctx = ValidationContext::new(job, self.plugins.as_ref());

        for stage in self.stages.iter() {
            log::trace!("{}: running {}", job.key(), stage.name());
            if let Err(error) = stage.validate(&ctx) {
                log::debug!("{}: rejected by {}: {}", job.key(), stage.name(), error);
                return Err(error);
            }
        }

        log::debug!("{}: accepted", job.key());
        Ok(())
    }

    /// Validate a job, recording a rejection in `response`.
    ///
    /// Returns an empty string when the job is accepted, leaving `response`
    /// untouched. Otherwise returns the diagnostic and sets
    /// `response.allowed = false` with the same message.
    pub fn validate(&self, job: &Job, response: &mut AdmissionResponse) -> String {
        match self.check(job) {
            Ok(()) => String::new(),
            Err(error) => {
                let message = error.to_string();
                response.reject(message.clone());
                message
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryPluginRegistry::with_builtins()))
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Action, Event, TaskSpec};
    use serde_json::json;

    fn template() -> serde_json::Value {
        json!({
            "metadata": {"labels": {"name": "test"}},
            "spec": {"containers": [{"name": "fake-name", "image": "busybox:1.24"}]}
        })
    }

    fn task(name: &str) -> TaskSpec {
        TaskSpec::new(name, 1).with_template(template())
    }

    fn valid_job(name: &str) -> Job {
        Job::new(name, "test").with_min_available(1).with_task(task("task-1"))
    }

    fn empty_registry_validator() -> Validator {
        Validator::new(Arc::new(InMemoryPluginRegistry::new()))
    }

    struct Case {
        name: &'static str,
        job: Job,
        expect_err: bool,
        ret: &'static str,
    }

    #[test]
    fn test_validate_execution() {
        let cases = vec![
            Case {
                name: "validate valid-job",
                job: valid_job("valid-Job"),
                expect_err: false,
                ret: "",
            },
            Case {
                name: "duplicate-task-job",
                job: Job::new("duplicate-task-job", "test")
                    .with_min_available(1)
                    .with_task(task("duplicated-task-1"))
                    .with_task(task("duplicated-task-1")),
                expect_err: true,
                ret: "duplicated task name duplicated-task-1",
            },
            Case {
                name: "job-policy-duplicated",
                job: valid_job("job-policy-duplicated")
                    .with_policy(Event::PodFailed, Action::AbortJob)
                    .with_policy(Event::PodFailed, Action::RestartJob),
                expect_err: true,
                ret: "duplicate",
            },
            Case {
                name: "Min Available illegal",
                job: valid_job("job-min-illegal").with_min_available(2),
                expect_err: true,
                ret: "'minAvailable' should not be greater than total replicas in tasks",
            },
            Case {
                name: "Job Plugin illegal",
                job: valid_job("job-plugin-illegal").with_plugin("big_plugin", vec![]),
                expect_err: true,
                ret: "unable to find job plugin: big_plugin",
            },
            Case {
                name: "job-ttl-illegal",
                job: valid_job("job-ttl-illegal").with_ttl_seconds_after_finished(-1),
                expect_err: true,
                ret: "'ttlSecondsAfterFinished' cannot be less than zero",
            },
        ];

        let validator = empty_registry_validator();

        for case in cases {
            let mut response = AdmissionResponse::default();
            let ret = validator.validate(&case.job, &mut response);

            if case.expect_err {
                assert!(!ret.is_empty(), "{}: expected error {}", case.name, case.ret);
                assert!(!response.allowed, "{}: expected allowed == false", case.name);
                assert!(ret.contains(case.ret), "{}: got {}", case.name, ret);
                assert_eq!(response.result_message(), ret, "{}", case.name);
            } else {
                assert_eq!(ret, "", "{}", case.name);
                assert!(response.allowed, "{}: {:?}", case.name, response);
                assert!(response.result.is_none(), "{}", case.name);
            }
        }
    }

    #[test]
    fn test_exact_messages() {
        let validator = empty_registry_validator();

        let mut response = AdmissionResponse::default();
        assert_eq!(
            validator.validate(&valid_job("j").with_min_available(2), &mut response),
            "'minAvailable' should not be greater than total replicas in tasks"
        );

        let mut response = AdmissionResponse::default();
        assert_eq!(
            validator.validate(&valid_job("j").with_plugin("big_plugin", vec![]), &mut response),
            "unable to find job plugin: big_plugin"
        );

        let mut response = AdmissionResponse::default();
        assert_eq!(
            validator.validate(&valid_job("j").with_ttl_seconds_after_finished(-1), &mut response),
            "'ttlSecondsAfterFinished' cannot be less than zero"
        );
    }

    #[test]
    fn test_first_violation_wins() {
        // Violates every rule at once; only the task-name check reports.
        let job = Job::new("everything", "test")
            .with_min_available(10)
            .with_task(task("a"))
            .with_task(task("a"))
            .with_policy(Event::PodFailed, Action::AbortJob)
            .with_policy(Event::PodFailed, Action::AbortJob)
            .with_plugin("big_plugin", vec![])
            .with_ttl_seconds_after_finished(-5);

        let validator = empty_registry_validator();
        let mut response = AdmissionResponse::default();
        assert_eq!(validator.validate(&job, &mut response), "duplicated task name a");

        let mut job = job;
        job.spec.tasks.pop();
        let mut response = AdmissionResponse::default();
        assert!(validator.validate(&job, &mut response).contains("duplicate"));

        job.spec.policies.clear();
        let mut response = AdmissionResponse::default();
        assert_eq!(
            validator.validate(&job, &mut response),
            "'minAvailable' should not be greater than total replicas in tasks"
        );

        job.spec.min_available = 1;
        let mut response = AdmissionResponse::default();
        assert_eq!(
            validator.validate(&job, &mut response),
            "unable to find job plugin: big_plugin"
        );

        job.spec.plugins.clear();
        let mut response = AdmissionResponse::default();
        assert_eq!(
            validator.validate(&job, &mut response),
            "'ttlSecondsAfterFinished' cannot be less than zero"
        );
    }

    #[test]
    fn test_empty_message_iff_allowed() {
        let validator = Validator::default();
        let jobs = vec![
            Job::default(),
            valid_job("ok").with_plugin("svc", vec![]),
            valid_job("bad").with_min_available(7),
        ];

        for job in &jobs {
            let mut response = AdmissionResponse::default();
            let message = validator.validate(job, &mut response);
            assert_eq!(message.is_empty(), response.allowed, "{}", job.key());
        }
    }

    #[test]
    fn test_idempotent() {
        let validator = empty_registry_validator();
        let job = valid_job("j").with_plugin("big_plugin", vec![]);

        let mut first = AdmissionResponse::default();
        let mut second = AdmissionResponse::default();
        let a = validator.validate(&job, &mut first);
        let b = validator.validate(&job, &mut second);

        assert_eq!(a, b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_registry_accepts_builtin_plugins() {
        let validator = Validator::default();
        let job = valid_job("j")
            .with_plugin("env", vec![])
            .with_plugin("ssh", vec![])
            .with_plugin("svc", vec![]);
        assert!(validator.check(&job).is_ok());
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(
            Validator::default().stage_names(),
            vec![
                "Task Name Validation",
                "Policy Validation",
                "MinAvailable Validation",
                "Plugin Validation",
                "TTL Validation",
            ]
        );
    }

    #[test]
    fn test_concurrent_validation() {
        let validator = Validator::default();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let validator = validator.clone();
                std::thread::spawn(move || {
                    let job = valid_job(&format!("job-{}", i)).with_min_available(i);
                    let mut response = AdmissionResponse::default();
                    validator.validate(&job, &mut response);
                    (i, response.allowed)
                })
            })
            .collect();

        for handle in handles {
            let (i, allowed) = handle.join().unwrap();
            assert_eq!(allowed, i <= 1);
        }
    }
}
