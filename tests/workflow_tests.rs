//! Integration tests for the provisioning workflow
//!
//! These tests drive `Provisioner::run` against a recording resource
//! manager and check:
//! - Project id derivation from the name and timestamp
//! - Configuration validation before any remote call
//! - Organization handling on the project request
//! - The enabled API set and its scoping
//! - Step ordering
//! - Failure propagation at every step

mod common;

use common::*;
use pretty_assertions::assert_eq;
use regex::Regex;

use camux_provision::config::ConfigValues;
use camux_provision::error::Error;
use camux_provision::outputs::NEXT_STEPS;
use camux_provision::workflow::{
    FixedClock, Provisioner, Step, REQUIRED_APIS, SERVICE_ACCOUNT_DISPLAY_NAME,
    SERVICE_ACCOUNT_ID,
};

fn provisioner(manager: RecordingResourceManager) -> Provisioner<RecordingResourceManager> {
    Provisioner::new(manager).with_clock(FixedClock(1700000000))
}

// ============================================================================
// Project Identifier
// ============================================================================

#[tokio::test]
async fn test_project_id_is_name_dash_timestamp() {
    let values = default_values().with("projectName", "garage-cams");
    let p = provisioner(RecordingResourceManager::new());

    let outputs = p.run(&values).await.unwrap();

    assert_eq!(outputs.project_id, "garage-cams-1700000000");
    match &p.manager().calls()[0] {
        Call::CreateProject(req) => {
            assert_eq!(req.project_id, "garage-cams-1700000000");
            assert_eq!(req.name, "garage-cams");
            assert_eq!(req.billing_account, "ACME-123");
        }
        other => panic!("expected project creation first, got {:?}", other),
    }
}

#[tokio::test]
async fn test_project_id_differs_only_in_timestamp() {
    let first = Provisioner::new(RecordingResourceManager::new()).with_clock(FixedClock(100));
    let second = Provisioner::new(RecordingResourceManager::new()).with_clock(FixedClock(101));

    let a = first.run(&default_values()).await.unwrap();
    let b = second.run(&default_values()).await.unwrap();

    assert_eq!(a.project_id, "camux-100");
    assert_eq!(b.project_id, "camux-101");
}

#[tokio::test]
async fn test_missing_project_name_defaults_to_camux() {
    let values = ConfigValues::new().with("billingAccount", "ACME-123");
    let p = provisioner(RecordingResourceManager::new());

    let outputs = p.run(&values).await.unwrap();
    assert_eq!(outputs.project_id, "camux-1700000000");
}

// ============================================================================
// Configuration Validation
// ============================================================================

#[tokio::test]
async fn test_empty_billing_account_fails_before_any_call() {
    let values = default_values().with("billingAccount", "");
    let p = provisioner(RecordingResourceManager::new());

    let err = p.run(&values).await.unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert!(err
        .to_string()
        .contains("camux-provision config set billingAccount <YOUR_BILLING_ACCOUNT_ID>"));
    assert!(p.manager().calls().is_empty());
}

#[tokio::test]
async fn test_absent_billing_account_fails_before_any_call() {
    let values = ConfigValues::new().with("projectName", "camux");
    let p = provisioner(RecordingResourceManager::new());

    assert!(p.run(&values).await.is_err());
    assert!(p.manager().calls().is_empty());
}

// ============================================================================
// Organization Handling
// ============================================================================

#[tokio::test]
async fn test_empty_organization_is_omitted_from_request() {
    let p = provisioner(RecordingResourceManager::new());
    p.run(&default_values()).await.unwrap();

    let calls = p.manager().calls();
    let Call::CreateProject(req) = &calls[0] else {
        panic!("first call must create the project");
    };
    assert_eq!(req.org_id, None);

    let json = serde_json::to_value(req).unwrap();
    assert!(json.get("orgId").is_none());
}

#[tokio::test]
async fn test_organization_is_passed_verbatim() {
    let values = default_values().with("organizationId", "123456789012");
    let p = provisioner(RecordingResourceManager::new());
    p.run(&values).await.unwrap();

    let calls = p.manager().calls();
    let Call::CreateProject(req) = &calls[0] else {
        panic!("first call must create the project");
    };
    assert_eq!(req.org_id.as_deref(), Some("123456789012"));
}

// ============================================================================
// Service Enablement
// ============================================================================

#[tokio::test]
async fn test_enables_exactly_the_required_apis_on_the_project() {
    let p = provisioner(RecordingResourceManager::new());
    p.run(&default_values()).await.unwrap();

    let requests = p.manager().enable_requests();
    assert_eq!(requests.len(), 5);

    let services: Vec<&str> = requests.iter().map(|r| r.service.as_str()).collect();
    assert_eq!(services, REQUIRED_APIS.to_vec());

    for req in &requests {
        assert_eq!(req.project_id, "camux-1700000000");
        assert_eq!(req.resource_name, format!("{}-api", req.service));
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_end_to_end_call_order_and_outputs() {
    let p = provisioner(RecordingResourceManager::new());
    let outputs = p.run(&default_values()).await.unwrap();

    let re = Regex::new(r"^camux-\d+$").unwrap();
    assert!(re.is_match(&outputs.project_id));

    assert_eq!(
        p.manager().call_kinds(),
        vec![
            "create_project",
            "enable_service",
            "enable_service",
            "enable_service",
            "enable_service",
            "enable_service",
            "create_service_account",
            "create_service_account_key",
        ]
    );

    let calls = p.manager().calls();
    let Call::CreateServiceAccount(sa) = &calls[6] else {
        panic!("expected service account creation");
    };
    assert_eq!(sa.account_id, SERVICE_ACCOUNT_ID);
    assert_eq!(sa.display_name, SERVICE_ACCOUNT_DISPLAY_NAME);
    assert_eq!(sa.project_id, outputs.project_id);

    let Call::CreateServiceAccountKey(key) = &calls[7] else {
        panic!("expected key creation");
    };
    assert_eq!(
        key.service_account_name,
        "projects/camux-1700000000/serviceAccounts/camera-viewer-sa@camux-1700000000.iam.gserviceaccount.com"
    );

    assert_eq!(outputs.project_number, TEST_PROJECT_NUMBER);
    assert_eq!(
        outputs.service_account_email,
        "camera-viewer-sa@camux-1700000000.iam.gserviceaccount.com"
    );
    assert_eq!(outputs.service_account_key, TEST_PRIVATE_KEY);
    assert_eq!(outputs.next_steps, NEXT_STEPS);
}

#[tokio::test]
async fn test_step_hook_sees_every_step_in_order() {
    use std::sync::{Arc, Mutex};

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let p = provisioner(RecordingResourceManager::new()).on_step(move |step| {
        let label = match step {
            Step::ProjectCreated(_) => "project".to_string(),
            Step::ServiceEnabled(api) => api.to_string(),
            Step::ServiceAccountCreated(_) => "account".to_string(),
            Step::KeyCreated => "key".to_string(),
        };
        sink.lock().unwrap().push(label);
    });

    p.run(&default_values()).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 8);
    assert_eq!(seen[0], "project");
    assert_eq!(seen[1], "smartdevicemanagement.googleapis.com");
    assert_eq!(seen[6], "account");
    assert_eq!(seen[7], "key");
}

// ============================================================================
// Failure Propagation
// ============================================================================

async fn run_failing(fail_at: FailAt) -> (Error, Vec<&'static str>) {
    let p = provisioner(RecordingResourceManager::failing_at(fail_at));
    let err = p.run(&default_values()).await.unwrap_err();
    (err, p.manager().call_kinds())
}

#[tokio::test]
async fn test_project_failure_stops_the_run() {
    let (err, kinds) = run_failing(FailAt::CreateProject).await;

    assert!(err.is_resource_operation());
    assert_eq!(err.to_string(), injected_error_message(&FailAt::CreateProject));
    assert_eq!(kinds, vec!["create_project"]);
}

#[tokio::test]
async fn test_enablement_failure_stops_remaining_enablements() {
    let step = FailAt::EnableService("iam.googleapis.com".to_string());
    let (err, kinds) = run_failing(step.clone()).await;

    assert_eq!(err.to_string(), injected_error_message(&step));
    // project + smartdevicemanagement + cloudresourcemanager + iam
    assert_eq!(
        kinds,
        vec!["create_project", "enable_service", "enable_service", "enable_service"]
    );
}

#[tokio::test]
async fn test_every_enablement_failure_is_fatal() {
    for api in REQUIRED_APIS {
        let step = FailAt::EnableService(api.to_string());
        let (err, kinds) = run_failing(step.clone()).await;

        assert_eq!(err.to_string(), injected_error_message(&step));
        assert!(!kinds.contains(&"create_service_account"));
        assert!(!kinds.contains(&"create_service_account_key"));
    }
}

#[tokio::test]
async fn test_service_account_failure_skips_key() {
    let (err, kinds) = run_failing(FailAt::CreateServiceAccount).await;

    assert_eq!(
        err.to_string(),
        injected_error_message(&FailAt::CreateServiceAccount)
    );
    assert_eq!(kinds.last(), Some(&"create_service_account"));
    assert!(!kinds.contains(&"create_service_account_key"));
}

#[tokio::test]
async fn test_key_failure_returns_key_error() {
    let (err, kinds) = run_failing(FailAt::CreateServiceAccountKey).await;

    assert_eq!(
        err.to_string(),
        injected_error_message(&FailAt::CreateServiceAccountKey)
    );
    assert_eq!(kinds.len(), 8);
}
