mod support;

use std::time::Duration;

use agms_client::infrastructure::Method;
use agms_client::models::{Role, Status};
use agms_client::services::{Availability, FileService, SubmissionLoader};
use agms_client::workflow::{ReviewCtx, ReviewFlow};
use agms_client::{AgmsClient, AppError};
use serde_json::json;
use support::{submission_json, FakeBackend};
use tokio_test::assert_err;

#[tokio::test]
async fn missing_list_endpoint_means_empty_and_unavailable() {
    let client = AgmsClient::new(FakeBackend::new());
    let loader = SubmissionLoader::with_limits(2, Duration::from_millis(200));
    let ctx = ReviewCtx::new(Role::DeansOffice, Some("4".to_string()));

    let load = loader.load(&client, &ctx).await.unwrap();

    assert_eq!(load.availability, Availability::Unavailable);
    assert!(load.submissions.is_empty());
    assert_eq!(client.backend().calls_to(Method::Get, "/api/submissions/dean/4").len(), 1);
}

#[tokio::test]
async fn server_errors_on_the_list_are_not_swallowed() {
    let backend = FakeBackend::new().status(Method::Get, "/api/submissions/advisor/12", 503);
    let client = AgmsClient::new(backend);
    let loader = SubmissionLoader::with_limits(2, Duration::from_millis(200));

    let result = loader
        .load(&client, &ReviewCtx::new(Role::Advisor, Some("12".to_string())))
        .await;

    assert_err!(result);
}

#[tokio::test]
async fn missing_scope_id_skips_the_request() {
    let client = AgmsClient::new(FakeBackend::new());
    let loader = SubmissionLoader::with_limits(2, Duration::from_millis(200));
    let mut flow = ReviewFlow::new(ReviewCtx::new(Role::Advisor, None));

    let load = flow.load(&client, &loader).await.unwrap();

    assert_eq!(load.availability, Availability::Unavailable);
    assert!(client.backend().calls().is_empty());
}

#[tokio::test]
async fn enrichment_respects_the_concurrency_bound() {
    let mut backend = FakeBackend::new();
    let mut items = Vec::new();
    for id in 1..=10 {
        let number = format!("2902010{id:02}");
        items.push(submission_json(id, &number, "APPROVED_BY_DEAN"));
        backend = backend.slow_json(
            Method::Get,
            &format!("/api/students/{number}"),
            Duration::from_millis(20),
            json!({ "gpa": 3.1 }),
        );
    }
    let backend = backend.json(Method::Get, "/api/submissions/my-submissions", 200, json!(items));
    let client = AgmsClient::new(backend);
    let loader = SubmissionLoader::with_limits(3, Duration::from_secs(2));

    let load = loader
        .load(&client, &ReviewCtx::new(Role::StudentAffairs, None))
        .await
        .unwrap();

    assert_eq!(load.enrichment.attempted, 10);
    assert_eq!(load.enrichment.filled, 10);
    assert!(load.submissions.iter().all(|s| s.gpa == Some(3.1)));
    assert!(client.backend().max_in_flight() <= 3);
    assert_eq!(client.backend().count_prefix(Method::Get, "/api/students/"), 10);
}

#[tokio::test]
async fn failed_or_slow_lookups_leave_gpa_unset() {
    let backend = FakeBackend::new()
        .json(
            Method::Get,
            "/api/submissions/advisor/12",
            200,
            json!([
                submission_json(1, "290201001", "PENDING"),
                submission_json(2, "290201002", "PENDING"),
                submission_json(3, "290201003", "PENDING"),
                { "id": 4, "studentNumber": "290201004", "status": "PENDING", "gpa": 3.45 },
            ]),
        )
        .json(Method::Get, "/api/students/290201001", 200, json!({ "data": { "cgpa": "2.80" } }))
        .status(Method::Get, "/api/students/290201002", 500)
        .slow_json(
            Method::Get,
            "/api/students/290201003",
            Duration::from_millis(500),
            json!({ "gpa": 3.9 }),
        );
    let client = AgmsClient::new(backend);
    let loader = SubmissionLoader::with_limits(4, Duration::from_millis(50));

    let load = loader
        .load(&client, &ReviewCtx::new(Role::Advisor, Some("12".to_string())))
        .await
        .unwrap();

    let gpa = |id: i64| load.submissions.iter().find(|s| s.id == id).unwrap().gpa;
    assert_eq!(gpa(1), Some(2.8));
    assert_eq!(gpa(2), None);
    assert_eq!(gpa(3), None);
    assert_eq!(gpa(4), Some(3.45));
    assert_eq!(load.enrichment.attempted, 3);
    assert_eq!(load.enrichment.failed, 2);
    // a valid GPA is never looked up again
    assert!(client.backend().calls_to(Method::Get, "/api/students/290201004").is_empty());
}

#[tokio::test]
async fn unknown_statuses_are_skipped() {
    let backend = FakeBackend::new().json(
        Method::Get,
        "/api/submissions/advisor/12",
        200,
        json!([
            submission_json(1, "290201001", "PENDING"),
            submission_json(2, "290201002", "ON_HOLD"),
            submission_json(3, "290201003", "APPROVED_BY_DEPARTMENT"),
        ]),
    );
    let client = AgmsClient::new(backend);
    let loader = SubmissionLoader::with_limits(2, Duration::from_millis(100));

    let load = loader
        .load(&client, &ReviewCtx::new(Role::Advisor, Some("12".to_string())))
        .await
        .unwrap();

    let statuses: Vec<_> = load.submissions.iter().map(|s| (s.id, s.status)).collect();
    assert_eq!(statuses, vec![(1, Status::Pending), (3, Status::ApprovedByDept)]);
}

#[tokio::test]
async fn student_sees_their_latest_submission() {
    let backend = FakeBackend::new().json(
        Method::Get,
        "/api/submissions/student/290201001/latest",
        200,
        json!({ "id": 7, "studentNumber": 290201001, "status": "APPROVED_BY_ADVISOR", "gpa": 3.2 }),
    );
    let client = AgmsClient::new(backend);
    let loader = SubmissionLoader::with_limits(2, Duration::from_millis(100));
    let mut flow = ReviewFlow::new(ReviewCtx::new(Role::Student, Some("290201001".to_string())));

    flow.load(&client, &loader).await.unwrap();

    let only = flow.submissions().next().unwrap();
    assert_eq!(only.id, 7);
    assert_eq!(only.student_number, "290201001");
    assert_eq!(flow.awaiting_decision().count(), 0);
    assert!(client
        .backend()
        .calls_to(Method::Get, "/api/submissions/subordinate-status")
        .is_empty());
}

#[tokio::test]
async fn oversized_upload_is_refused_before_sending() {
    let client = AgmsClient::new(FakeBackend::new());
    let files = FileService::with_limit(4);

    let err = files
        .upload(&client, 7, "transcript.pdf", "application/pdf", vec![0u8; 5])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(ref fields) if fields[0].field == "file"));
    assert!(client.backend().calls().is_empty());
}

#[tokio::test]
async fn upload_download_delete_round_trip_through_the_backend() {
    let backend = FakeBackend::new()
        .json(
            Method::Post,
            "/api/files/upload/7",
            200,
            json!({ "id": 55, "fileName": "transcript.pdf", "fileType": "application/pdf" }),
        )
        .bytes(Method::Get, "/api/files/download/55", b"%PDF-1.7")
        .status(Method::Delete, "/api/files/55", 204);
    let client = AgmsClient::new(backend);
    let files = FileService::with_limit(1024);

    let stored = files
        .upload(&client, 7, "transcript.pdf", "", b"%PDF-1.7".to_vec())
        .await
        .unwrap();
    assert_eq!(stored.id, "55");

    let sent = &client.backend().calls_to(Method::Post, "/api/files/upload/7")[0];
    let part = sent.file.as_ref().unwrap();
    assert_eq!(part.field, "file");
    assert_eq!(part.content_type, "application/octet-stream");

    assert_eq!(files.download(&client, "55").await.unwrap(), b"%PDF-1.7".to_vec());
    files.delete(&client, "55").await.unwrap();
}

#[tokio::test]
async fn attachments_are_listed_per_submission() {
    let backend = FakeBackend::new()
        .json(
            Method::Get,
            "/api/files/submission/7",
            200,
            json!([
                { "id": 55, "fileName": "transcript.pdf", "fileType": "application/pdf", "uploadDate": "2025-05-20T09:30:00" },
                { "id": 56, "fileName": null, "fileType": null },
            ]),
        )
        .bytes(Method::Get, "/api/files/submission/8", b"");
    let client = AgmsClient::new(backend);
    let files = FileService::with_limit(1024);

    let listed = files.list(&client, 7).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].file_name, "transcript.pdf");
    assert_eq!(listed[0].uploaded_at.as_deref(), Some("2025-05-20T09:30:00"));
    assert_eq!(listed[1].id, "56");
    assert_eq!(listed[1].file_name, "");

    // no attachments yet: the endpoint answers with an empty body
    assert!(files.list(&client, 8).await.unwrap().is_empty());
}
