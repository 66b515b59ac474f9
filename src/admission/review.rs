//! Admission review handling for job resources.
//!
//! Takes a decoded admission review envelope, pulls the job out of it and
//! turns the validator's verdict into an admission response.

use crate::core::error::{AdmissionError, AdmissionResult, ValidationError};
use crate::core::response::AdmissionResponse;
use crate::core::types::Job;
use crate::validation::pipeline::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group/version/resource of an object in an admission request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersionResource {
    /// API group.
    #[serde(default)]
    pub group: String,
    /// API version.
    #[serde(default)]
    pub version: String,
    /// Resource name (plural).
    #[serde(default)]
    pub resource: String,
}

impl GroupVersionResource {
    /// The batch job resource this gate admits.
    pub fn jobs() -> Self {
        Self {
            group: "batch.volcano.sh".to_string(),
            version: "v1alpha1".to_string(),
            resource: "jobs".to_string(),
        }
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Resource={}", self.group, self.version, self.resource)
    }
}

/// Operation being admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    /// Object creation.
    Create,
    /// Object update.
    Update,
    /// Object deletion.
    Delete,
    /// Connect to a subresource.
    Connect,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Connect => "CONNECT",
        };
        f.write_str(s)
    }
}

/// Request half of an admission review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    /// Request uid, echoed in the response.
    #[serde(default)]
    pub uid: String,
    /// Resource being admitted.
    pub resource: GroupVersionResource,
    /// Operation being admitted.
    pub operation: Operation,
    /// The submitted object.
    #[serde(default)]
    pub object: serde_json::Value,
    /// Previous object, present on updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_object: Option<serde_json::Value>,
}

/// Admission review envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    /// Envelope API version.
    #[serde(default)]
    pub api_version: String,
    /// Envelope kind.
    #[serde(default)]
    pub kind: String,
    /// Incoming request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<AdmissionRequest>,
    /// Outgoing response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<AdmissionResponse>,
}

impl AdmissionReview {
    /// Parse a review from JSON.
    pub fn from_json(json: &str) -> AdmissionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Decode a job from a request object, checking the resource first.
pub fn decode_job(
    object: &serde_json::Value,
    resource: &GroupVersionResource,
) -> AdmissionResult<Job> {
    let expected = GroupVersionResource::jobs();
    if *resource != expected {
        return Err(AdmissionError::UnexpectedResource {
            expected: expected.to_string(),
            got: resource.to_string(),
        });
    }

    Ok(Job::deserialize(object)?)
}

/// Admit a job review.
///
/// CREATE runs the validator, UPDATE only checks that the spec is
/// unchanged, anything else is rejected.
pub fn admit_jobs(review: &AdmissionReview, validator: &Validator) -> AdmissionResponse {
    let request = match review.request.as_ref() {
        Some(request) => request,
        None => return AdmissionResponse::from_error("", &AdmissionError::MissingRequest),
    };

    log::debug!("admitting jobs -- {}", request.operation);

    match admit_request(request, validator) {
        Ok(response) => response,
        Err(error) => {
            log::warn!("admission request {} failed: {}", request.uid, error);
            AdmissionResponse::from_error(request.uid.clone(), &error)
        }
    }
}

fn admit_request(
    request: &AdmissionRequest,
    validator: &Validator,
) -> AdmissionResult<AdmissionResponse> {
    let job = decode_job(&request.object, &request.resource)?;
    let mut response = AdmissionResponse::for_uid(request.uid.clone());

    match request.operation {
        Operation::Create => {
            validator.validate(&job, &mut response);
        }
        Operation::Update => {
            let old_object = request.old_object.as_ref().unwrap_or(&serde_json::Value::Null);
            let old_job = decode_job(old_object, &request.resource)?;
            if job.spec != old_job.spec {
                response.reject(ValidationError::SpecModified.to_string());
            }
        }
        operation => {
            return Err(AdmissionError::UnsupportedOperation {
                operation: operation.to_string(),
            });
        }
    }

    Ok(response)
}

/// Answer a review with a review envelope carrying the response.
pub fn respond(review: &AdmissionReview, validator: &Validator) -> AdmissionReview {
    AdmissionReview {
        api_version: review.api_version.clone(),
        kind: review.kind.clone(),
        request: None,
        response: Some(admit_jobs(review, validator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job_object(min_available: u32) -> serde_json::Value {
        json!({
            "metadata": {"name": "job", "namespace": "test"},
            "spec": {
                "minAvailable": min_available,
                "tasks": [{"name": "task-1", "replicas": 1, "template": {}}]
            }
        })
    }

    fn review(operation: Operation, object: serde_json::Value) -> AdmissionReview {
        AdmissionReview {
            api_version: "admission.k8s.io/v1beta1".to_string(),
            kind: "AdmissionReview".to_string(),
            request: Some(AdmissionRequest {
                uid: "705ab4f5-6393-11e8-b7cc-42010a800002".to_string(),
                resource: GroupVersionResource::jobs(),
                operation,
                object,
                old_object: None,
            }),
            response: None,
        }
    }

    #[test]
    fn test_create_valid() {
        let response = admit_jobs(&review(Operation::Create, job_object(1)), &Validator::default());
        assert!(response.allowed);
        assert_eq!(response.uid, "705ab4f5-6393-11e8-b7cc-42010a800002");
        assert!(response.result.is_none());
    }

    #[test]
    fn test_create_invalid() {
        let response = admit_jobs(&review(Operation::Create, job_object(2)), &Validator::default());
        assert!(!response.allowed);
        assert_eq!(
            response.result_message(),
            "'minAvailable' should not be greater than total replicas in tasks"
        );
    }

    #[test]
    fn test_update_with_same_spec() {
        let mut review = review(Operation::Update, job_object(1));
        let mut old = job_object(1);
        old["metadata"]["name"] = json!("renamed");
        review.request.as_mut().unwrap().old_object = Some(old);

        assert!(admit_jobs(&review, &Validator::default()).allowed);
    }

    #[test]
    fn test_update_spec_modified() {
        let mut review = review(Operation::Update, job_object(1));
        review.request.as_mut().unwrap().old_object = Some(job_object(0));

        let response = admit_jobs(&review, &Validator::default());
        assert!(!response.allowed);
        assert_eq!(
            response.result_message(),
            "job.spec is not allowed to modify when update jobs"
        );
    }

    #[test]
    fn test_update_does_not_run_validator() {
        // An invalid but unchanged spec passes on update.
        let mut review = review(Operation::Update, job_object(5));
        review.request.as_mut().unwrap().old_object = Some(job_object(5));
        assert!(admit_jobs(&review, &Validator::default()).allowed);
    }

    #[test]
    fn test_unsupported_operation() {
        let response = admit_jobs(&review(Operation::Delete, job_object(1)), &Validator::default());
        assert!(!response.allowed);
        assert_eq!(
            response.result_message(),
            "expect operation to be 'CREATE' or 'UPDATE'"
        );
    }

    #[test]
    fn test_wrong_resource() {
        let mut review = review(Operation::Create, job_object(1));
        review.request.as_mut().unwrap().resource.resource = "pods".to_string();

        let response = admit_jobs(&review, &Validator::default());
        assert!(!response.allowed);
        assert_eq!(
            response.result_message(),
            "expect resource to be batch.volcano.sh/v1alpha1, Resource=jobs"
        );
    }

    #[test]
    fn test_undecodable_job() {
        let object = json!({"spec": {"minAvailable": -1}});
        let response = admit_jobs(&review(Operation::Create, object), &Validator::default());
        assert!(!response.allowed);
        assert!(response.result_message().starts_with("failed to decode job"));
    }

    #[test]
    fn test_missing_request() {
        let review = AdmissionReview {
            api_version: String::new(),
            kind: String::new(),
            request: None,
            response: None,
        };
        let response = admit_jobs(&review, &Validator::default());
        assert!(!response.allowed);
        assert_eq!(response.result_message(), "admission review carries no request");
    }

    #[test]
    fn test_respond_from_json() {
        let json = json!({
            "apiVersion": "admission.k8s.io/v1beta1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "abc",
                "resource": {"group": "batch.volcano.sh", "version": "v1alpha1", "resource": "jobs"},
                "operation": "CREATE",
                "object": {
                    "metadata": {"name": "job", "namespace": "test"},
                    "spec": {
                        "minAvailable": 1,
                        "tasks": [{"name": "task-1", "replicas": 1}],
                        "plugins": {"big_plugin": []}
                    }
                }
            }
        })
        .to_string();

        let review = AdmissionReview::from_json(&json).unwrap();
        let answer = respond(&review, &Validator::default());
        assert_eq!(answer.kind, "AdmissionReview");
        assert!(answer.request.is_none());

        let response = answer.response.unwrap();
        assert_eq!(response.uid, "abc");
        assert_eq!(response.result_message(), "unable to find job plugin: big_plugin");
    }
}
