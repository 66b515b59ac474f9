//! Job description types.
//!
//! These mirror the batch job resource as it arrives inside an admission
//! request. Field names follow the cluster API's camelCase JSON so a job
//! object can be deserialized straight out of a request body.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a submitted object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Namespace the object lives in.
    #[serde(default)]
    pub namespace: String,
}

/// A batch job submitted for admission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Name and namespace.
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Desired behavior of the job.
    #[serde(default)]
    pub spec: JobSpec,
}

impl Job {
    /// Create a job with the given identity and an empty spec.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
            },
            spec: JobSpec::default(),
        }
    }

    /// Set the minimum number of available pods.
    pub fn with_min_available(mut self, min_available: u32) -> Self {
        self.spec.min_available = min_available;
        self
    }

    /// Append a task.
    pub fn with_task(mut self, task: TaskSpec) -> Self {
        self.spec.tasks.push(task);
        self
    }

    /// Append a job-level lifecycle policy.
    pub fn with_policy(mut self, event: Event, action: Action) -> Self {
        self.spec.policies.push(LifecyclePolicy::new(event, action));
        self
    }

    /// Request a plugin with its arguments.
    pub fn with_plugin(mut self, name: impl Into<String>, args: Vec<String>) -> Self {
        self.spec.plugins.insert(name.into(), args);
        self
    }

    /// Set the time-to-live after the job finishes.
    pub fn with_ttl_seconds_after_finished(mut self, ttl: i32) -> Self {
        self.spec.ttl_seconds_after_finished = Some(ttl);
        self
    }

    /// `namespace/name`, for log lines.
    pub fn key(&self) -> String {
        format!("{}/{}", self.metadata.namespace, self.metadata.name)
    }
}

/// Specification of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Scheduler that should place the job's pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_name: Option<String>,
    /// Minimum number of pods that must run together.
    #[serde(default)]
    pub min_available: u32,
    /// Tasks making up the job, in submission order.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
    /// Job-scoped lifecycle policies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<LifecyclePolicy>,
    /// Requested plugins and their arguments.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub plugins: IndexMap<String, Vec<String>>,
    /// Seconds to keep the job around after it finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds_after_finished: Option<i32>,
    /// Queue the job is submitted to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
}

impl JobSpec {
    /// Sum of replicas across all tasks.
    pub fn total_replicas(&self) -> u64 {
        self.tasks.iter().map(|t| u64::from(t.replicas)).sum()
    }
}

/// Pod template of a task. Carried as raw JSON and never inspected here.
pub type PodTemplate = serde_json::Value;

/// A replicated group of pods within a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    /// Name, unique within the job.
    #[serde(default)]
    pub name: String,
    /// Number of pods to run.
    #[serde(default)]
    pub replicas: u32,
    /// Pod template.
    #[serde(default)]
    pub template: PodTemplate,
    /// Task-scoped lifecycle policies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<LifecyclePolicy>,
}

impl TaskSpec {
    /// Create a task with the given name and replica count.
    pub fn new(name: impl Into<String>, replicas: u32) -> Self {
        Self {
            name: name.into(),
            replicas,
            template: PodTemplate::Null,
            policies: Vec::new(),
        }
    }

    /// Set the pod template.
    pub fn with_template(mut self, template: PodTemplate) -> Self {
        self.template = template;
        self
    }

    /// Append a task-level lifecycle policy.
    pub fn with_policy(mut self, event: Event, action: Action) -> Self {
        self.policies.push(LifecyclePolicy::new(event, action));
        self
    }
}

/// Maps a lifecycle event to the action the controller takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LifecyclePolicy {
    /// Triggering event.
    pub event: Event,
    /// Action to take.
    pub action: Action,
}

impl LifecyclePolicy {
    /// Create a policy.
    pub fn new(event: Event, action: Action) -> Self {
        Self { event, action }
    }
}

/// Lifecycle events a policy can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Matches every event.
    #[serde(rename = "*")]
    AnyEvent,
    /// A pod failed.
    PodFailed,
    /// A pod was evicted.
    PodEvicted,
    /// Job state could not be determined.
    #[serde(rename = "Unknown")]
    JobUnknown,
    /// Job status is out of sync with its pods.
    OutOfSync,
    /// A command was issued against the job.
    CommandIssued,
    /// All pods of a task completed.
    TaskCompleted,
}

impl Event {
    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::AnyEvent => "*",
            Event::PodFailed => "PodFailed",
            Event::PodEvicted => "PodEvicted",
            Event::JobUnknown => "Unknown",
            Event::OutOfSync => "OutOfSync",
            Event::CommandIssued => "CommandIssued",
            Event::TaskCompleted => "TaskCompleted",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions a policy can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Abort the job; pods are evicted and not restarted.
    AbortJob,
    /// Restart the whole job.
    RestartJob,
    /// Restart only the affected task.
    RestartTask,
    /// Terminate the job; it cannot be resumed.
    TerminateJob,
    /// Mark the job completed.
    CompleteJob,
    /// Resume an aborted job.
    ResumeJob,
    /// Resync job status.
    SyncJob,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
