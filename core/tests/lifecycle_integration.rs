//! End-to-end lifecycle tests against in-memory providers.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use rma_desk_core::providers::{RmaRepository, RmaSearch, SnapshotKey};
use rma_desk_core::{NotificationKind, RmaError, RmaStatus, RmaUpdate};
use rma_desk_testing::fixtures::{ADMIN_EMAIL, SITE_NAME, submission};
use rma_desk_testing::{TestHarness, init_test_tracing};

// ═══════════════════════════════════════════════════════════════════════════
// Creation
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_submission_persists_pending_request_and_sends_two_emails() {
    init_test_tracing();
    let harness = TestHarness::new();

    let submitted = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    let reports = submitted.notification.wait().await;

    let request = submitted.request;
    assert_eq!(request.rma_number.to_string(), "RMA-00001");
    assert_eq!(request.status, RmaStatus::Pending);
    assert_eq!(harness.repository.len().await, 1);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, NotificationKind::Creation);
    assert_eq!(reports[0].outcome, Ok(2));

    // Both notices go out in one batch.
    let batches = harness.mail.batches();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].to, vec![ADMIN_EMAIL.to_string()]);
    assert_eq!(
        batch[0].subject,
        format!("[{SITE_NAME}] New RMA Submitted for Product SKU #ED-SKU-42")
    );
    assert_eq!(batch[1].to, vec!["ada@example.com".to_string()]);
    assert_eq!(
        batch[1].subject,
        format!("[{SITE_NAME}] We Have Received Your RMA for Product SKU #ED-SKU-42")
    );
    assert!(batch.iter().all(|m| m.body.contains("RMA-00001")));
    assert!(batch.iter().all(|m| m.from == "ED Systems RMA <rma@edsystems.test>"));
}

#[tokio::test]
async fn test_identifiers_increment_from_latest() {
    let harness = TestHarness::new();
    let mut seeded = rma_desk_testing::fixtures::pending_request(1, submission().build());
    seeded.rma_number = rma_desk_core::RmaNumber::from_sequence(41);
    harness.repository.seed(seeded).await;

    let submitted = harness
        .controller
        .submit(submission().order_ref("ORD-2002").build())
        .await
        .unwrap();
    drop(submitted.notification);

    assert_eq!(submitted.request.rma_number.to_string(), "RMA-00042");
}

#[tokio::test]
async fn test_malformed_latest_identifier_aborts_creation() {
    let harness = TestHarness::new();
    harness.repository.seed_raw_number("LEGACY-7").await;

    let err = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap_err();

    assert!(err.is_integrity_error());
    assert!(harness.repository.is_empty().await);
    assert!(harness.mail.sent().is_empty());
}

#[tokio::test]
async fn test_duplicate_submission_is_rejected_before_persistence() {
    let harness = TestHarness::new();
    let first = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    first.notification.wait().await;

    let err = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap_err();

    assert_eq!(err, RmaError::DuplicateRequest);
    assert!(err.is_user_error());
    assert_eq!(harness.repository.len().await, 1);
    assert_eq!(harness.mail.batches().len(), 1);
}

#[tokio::test]
async fn test_any_single_field_different_is_accepted() {
    let harness = TestHarness::new();
    harness
        .controller
        .submit(submission().build())
        .await
        .unwrap()
        .notification
        .wait()
        .await;

    for variant in [
        submission().email("grace@example.com").build(),
        submission().order_ref("ORD-9999").build(),
        submission().product_sku("ED-SKU-43").build(),
    ] {
        let submitted = harness.controller.submit(variant).await.unwrap();
        submitted.notification.wait().await;
    }

    let numbers: Vec<String> = harness
        .repository
        .all()
        .await
        .iter()
        .map(|r| r.rma_number.to_string())
        .collect();
    assert_eq!(numbers, ["RMA-00001", "RMA-00002", "RMA-00003", "RMA-00004"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_get_unique_identifiers() {
    let harness = TestHarness::new();

    let tasks: Vec<_> = (0..25)
        .map(|i| {
            let controller = harness.controller.clone();
            tokio::spawn(async move {
                let submitted = controller
                    .submit(submission().order_ref(&format!("ORD-{i}")).build())
                    .await
                    .unwrap();
                submitted.notification.wait().await;
                submitted.request.rma_number
            })
        })
        .collect();

    let mut numbers = Vec::new();
    for task in tasks {
        numbers.push(task.await.unwrap().sequence());
    }
    numbers.sort_unstable();

    assert_eq!(numbers, (1..=25).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_no_admin_recipients_sends_customer_notice_only() {
    let harness = TestHarness::with_admins(Vec::new());

    let reports = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap()
        .notification
        .wait()
        .await;

    assert_eq!(reports[0].outcome, Ok(1));
    assert_eq!(reports[0].recipients, vec!["ada@example.com".to_string()]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Snapshot lifecycle
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_snapshot_is_evicted_after_successful_delivery() {
    let harness = TestHarness::new();

    let submitted = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    let key = SnapshotKey::for_request(submitted.request.id);
    submitted.notification.wait().await;

    assert_eq!(harness.snapshots.writes(), vec![key.to_string()]);
    assert!(!harness.snapshots.contains(&key));
}

#[tokio::test]
async fn test_snapshot_is_evicted_after_failed_delivery() {
    let harness = TestHarness::new();
    harness.mail.set_failing(true);

    let submitted = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    let key = SnapshotKey::for_request(submitted.request.id);
    let reports = submitted.notification.wait().await;

    assert!(matches!(reports[0].outcome, Err(RmaError::EmailError(_))));
    assert!(!harness.snapshots.contains(&key));
    // Delivery failure never rolls back the record.
    assert_eq!(harness.repository.len().await, 1);
}

#[tokio::test]
async fn test_cache_outage_still_persists_and_reports_missing_snapshot() {
    let harness = TestHarness::new();
    harness.snapshots.fail_writes(true);

    let submitted = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    let reports = submitted.notification.wait().await;

    assert_eq!(harness.repository.len().await, 1);
    assert_eq!(
        reports[0].outcome,
        Err(RmaError::SnapshotMissing {
            key: format!("rma:{}", submitted.request.id)
        })
    );
    assert!(reports[0].rma_number.is_none());
    assert!(harness.mail.sent().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Approval
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_change_to_rma_sent_sends_exactly_one_instruction_email() {
    let harness = TestHarness::new();
    let created = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    created.notification.wait().await;
    let id = created.request.id;

    let updated = harness
        .controller
        .update(id, RmaUpdate::status(RmaStatus::RmaSent))
        .await
        .unwrap();
    let reports = updated.notification.wait().await;

    assert!(updated.persisted);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, NotificationKind::StatusSent);

    let batches = harness.mail.batches();
    assert_eq!(batches.len(), 2);
    let instructions = &batches[1];
    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].to, vec!["ada@example.com".to_string()]);
    assert!(instructions[0].subject.contains("RMA-00001"));
    assert!(instructions[0].subject.contains("ED-SKU-42"));
    assert!(instructions[0].body.contains("'RMA-00001'"));
    assert!(!instructions[0].body.contains("$rma_number"));
    assert!(!harness.snapshots.contains(&SnapshotKey::for_request(id)));

    let stored = harness.repository.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, RmaStatus::RmaSent);
}

#[tokio::test]
async fn test_resaving_rma_sent_sends_nothing_more() {
    let harness = TestHarness::new();
    let created = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    created.notification.wait().await;
    let id = created.request.id;

    harness
        .controller
        .update(id, RmaUpdate::status(RmaStatus::RmaSent))
        .await
        .unwrap()
        .notification
        .wait()
        .await;

    let again = harness
        .controller
        .update(id, RmaUpdate::status(RmaStatus::RmaSent))
        .await
        .unwrap();

    assert!(!again.persisted);
    assert!(again.notification.is_empty());
    assert_eq!(harness.mail.batches().len(), 2);
}

#[tokio::test]
async fn test_product_received_sends_nothing() {
    let harness = TestHarness::new();
    let created = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    created.notification.wait().await;

    let updated = harness
        .controller
        .update(
            created.request.id,
            RmaUpdate::status(RmaStatus::ProductReceived),
        )
        .await
        .unwrap();

    assert!(updated.persisted);
    assert!(updated.notification.is_empty());
    assert_eq!(harness.mail.batches().len(), 1);
}

#[tokio::test]
async fn test_edited_instructions_are_used_in_the_email() {
    let harness = TestHarness::new();
    let created = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    created.notification.wait().await;

    harness
        .controller
        .update(
            created.request.id,
            RmaUpdate::status(RmaStatus::RmaSent)
                .with_instructions("Write $rma_number on the box and use the prepaid label."),
        )
        .await
        .unwrap()
        .notification
        .wait()
        .await;

    let sent = harness.mail.sent();
    let body = &sent.last().unwrap().body;
    assert!(body.contains("Write RMA-00001 on the box and use the prepaid label."));
}

#[tokio::test]
async fn test_failed_save_evicts_snapshot_and_sends_nothing() {
    let harness = TestHarness::new();
    let created = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    created.notification.wait().await;
    let id = created.request.id;

    harness.repository.fail_saves(true);
    let err = harness
        .controller
        .update(id, RmaUpdate::status(RmaStatus::RmaSent))
        .await
        .unwrap_err();

    assert!(matches!(err, RmaError::DatabaseError(_)));
    assert!(!harness.snapshots.contains(&SnapshotKey::for_request(id)));
    assert_eq!(harness.mail.batches().len(), 1);

    let stored = harness.repository.get(id).await.unwrap().unwrap();
    assert_eq!(stored.status, RmaStatus::Pending);
}

#[tokio::test]
async fn test_expired_snapshot_is_reported_and_nothing_is_sent() {
    let harness = TestHarness::new();
    let created = harness
        .controller
        .submit(submission().build())
        .await
        .unwrap();
    created.notification.wait().await;

    // Notification service invoked after the snapshot is gone.
    harness.snapshots.fail_writes(true);
    let updated = harness
        .controller
        .update(created.request.id, RmaUpdate::status(RmaStatus::RmaSent))
        .await
        .unwrap();
    let reports = updated.notification.wait().await;

    assert!(matches!(
        reports[0].outcome,
        Err(RmaError::SnapshotMissing { .. })
    ));
    assert_eq!(harness.mail.batches().len(), 1);
}

#[tokio::test]
async fn test_update_of_unknown_request_is_not_found() {
    let harness = TestHarness::new();
    let err = harness
        .controller
        .update(
            rma_desk_core::RmaId::new(404),
            RmaUpdate::status(RmaStatus::RmaSent),
        )
        .await
        .unwrap_err();
    assert_eq!(err, RmaError::NotFound(404));
}

// ═══════════════════════════════════════════════════════════════════════════
// Admin search
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_search_filters_by_term_and_status() {
    let harness = TestHarness::new();
    for sku in ["ED-SKU-1", "ED-SKU-2", "OTHER-3"] {
        harness
            .controller
            .submit(submission().product_sku(sku).build())
            .await
            .unwrap()
            .notification
            .wait()
            .await;
    }
    harness
        .controller
        .update(
            rma_desk_core::RmaId::new(2),
            RmaUpdate::status(RmaStatus::ProductReceived),
        )
        .await
        .unwrap();

    let by_term = harness
        .controller
        .search(&RmaSearch {
            q: Some("ed-sku".to_string()),
            ..RmaSearch::default()
        })
        .await
        .unwrap();
    assert_eq!(by_term.total, 2);

    let by_status = harness
        .controller
        .search(&RmaSearch {
            status: Some(RmaStatus::ProductReceived),
            ..RmaSearch::default()
        })
        .await
        .unwrap();
    assert_eq!(by_status.total, 1);
    assert_eq!(by_status.items[0].product_sku, "ED-SKU-2");

    let by_number = harness
        .controller
        .search(&RmaSearch {
            q: Some("rma-00003".to_string()),
            ..RmaSearch::default()
        })
        .await
        .unwrap();
    assert_eq!(by_number.items.len(), 1);
    assert_eq!(by_number.items[0].product_sku, "OTHER-3");
}
