mod common;

use balls_backend::entities::{point_transaction_entity, UploadStatus};
use balls_backend::error::AppError;
use balls_backend::models::{VerifyDecision, VerifyUploadRequest};
use common::{admin, customer, proof, setup, upload_request};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

fn approve(points_per_hour: Option<i64>) -> VerifyUploadRequest {
    VerifyUploadRequest {
        decision: VerifyDecision::Approve,
        points_per_hour,
        admin_notes: None,
    }
}

fn reject(notes: &str) -> VerifyUploadRequest {
    VerifyUploadRequest {
        decision: VerifyDecision::Reject,
        points_per_hour: None,
        admin_notes: Some(notes.to_string()),
    }
}

async fn ledger_sum(env: &common::TestEnv, customer_id: i64) -> i64 {
    point_transaction_entity::Entity::find()
        .filter(point_transaction_entity::Column::CustomerId.eq(customer_id))
        .all(&env.db)
        .await
        .unwrap()
        .iter()
        .map(|tx| tx.points)
        .sum()
}

#[tokio::test]
async fn approval_splits_points_evenly_across_matched_participants() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    let bob = customer(2, "Bob");
    let cara = customer(3, "Cara");
    for ctx in [&alice, &bob, &cara] {
        env.ledger.find_or_create(&env.db, ctx).await.unwrap();
    }

    // 3 hours at 10 points/hour over 3 matched participants.
    let upload = env
        .uploads
        .submit(
            &alice,
            &upload_request("10:00", "13:00", &["Alice", "Bob", "Cara"]),
            proof(),
        )
        .await
        .unwrap();
    assert_eq!(upload.duration_hours, 3);
    assert_eq!(upload.status, UploadStatus::Pending);
    assert!(upload.participants.iter().all(|p| p.customer_id.is_some()));

    let settled = env
        .uploads
        .verify(&admin(100), upload.id, &approve(Some(10)))
        .await
        .unwrap();
    assert_eq!(settled.status, UploadStatus::Approved);
    assert_eq!(settled.approved_by, Some(100));
    assert!(settled.participants.iter().all(|p| p.points_allocated == 10));

    for ctx in [&alice, &bob, &cara] {
        let summary = env.ledger.loyalty_summary(ctx).await.unwrap();
        assert_eq!(summary.available_points, 10);
        assert_eq!(summary.total_points, 10);
        assert_eq!(summary.total_earned, 10);
    }
}

#[tokio::test]
async fn partial_hours_count_as_a_full_hour() {
    let env = setup().await;
    let alice = customer(1, "Alice");

    let upload = env
        .uploads
        .submit(&alice, &upload_request("10:00", "11:30", &["Alice"]), proof())
        .await
        .unwrap();
    assert_eq!(upload.duration_hours, 2);
}

#[tokio::test]
async fn remainder_from_uneven_split_is_not_distributed() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    let bob = customer(2, "Bob");
    let cara = customer(3, "Cara");
    for ctx in [&alice, &bob, &cara] {
        env.ledger.find_or_create(&env.db, ctx).await.unwrap();
    }

    // 1 hour at 10 points over 3 participants: floor(10/3) = 3 each.
    let upload = env
        .uploads
        .submit(
            &alice,
            &upload_request("10:00", "11:00", &["Alice", "Bob", "Cara"]),
            proof(),
        )
        .await
        .unwrap();
    env.uploads
        .verify(&admin(100), upload.id, &approve(Some(10)))
        .await
        .unwrap();

    for ctx in [&alice, &bob, &cara] {
        let summary = env.ledger.loyalty_summary(ctx).await.unwrap();
        assert_eq!(summary.available_points, 3);
    }
}

#[tokio::test]
async fn zero_point_shares_still_write_ledger_rows() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    let bob = customer(2, "Bob");
    for ctx in [&alice, &bob] {
        env.ledger.find_or_create(&env.db, ctx).await.unwrap();
    }

    // 1 hour at 1 point over 2 participants: floor(1/2) = 0 each, but every
    // registered participant still gets an earned transaction.
    let upload = env
        .uploads
        .submit(
            &alice,
            &upload_request("10:00", "11:00", &["Alice", "Bob"]),
            proof(),
        )
        .await
        .unwrap();
    env.uploads
        .verify(&admin(100), upload.id, &approve(Some(1)))
        .await
        .unwrap();

    for customer_id in [1_i64, 2] {
        let transactions = point_transaction_entity::Entity::find()
            .filter(point_transaction_entity::Column::CustomerId.eq(customer_id))
            .all(&env.db)
            .await
            .unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].points, 0);
        assert_eq!(transactions[0].payment_upload_id, Some(upload.id));
    }
    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 0);
}

#[tokio::test]
async fn unmatched_participants_do_not_dilute_the_split() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    env.ledger.find_or_create(&env.db, &alice).await.unwrap();

    let upload = env
        .uploads
        .submit(
            &alice,
            &upload_request("10:00", "12:00", &["Alice", "Walk-in guest"]),
            proof(),
        )
        .await
        .unwrap();
    let matched: Vec<_> = upload
        .participants
        .iter()
        .filter(|p| p.customer_id.is_some())
        .collect();
    assert_eq!(matched.len(), 1);

    env.uploads
        .verify(&admin(100), upload.id, &approve(Some(10)))
        .await
        .unwrap();

    // The only registered participant receives the whole pot.
    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 20);
}

#[tokio::test]
async fn default_points_per_hour_comes_from_settings() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    env.ledger.find_or_create(&env.db, &alice).await.unwrap();

    let upload = env
        .uploads
        .submit(&alice, &upload_request("10:00", "12:00", &["Alice"]), proof())
        .await
        .unwrap();
    // Seeded default is 10 points per hour.
    env.uploads
        .verify(&admin(100), upload.id, &approve(None))
        .await
        .unwrap();

    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 20);
}

#[tokio::test]
async fn an_upload_is_settled_at_most_once() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    env.ledger.find_or_create(&env.db, &alice).await.unwrap();

    let upload = env
        .uploads
        .submit(&alice, &upload_request("10:00", "11:00", &["Alice"]), proof())
        .await
        .unwrap();
    env.uploads
        .verify(&admin(100), upload.id, &approve(Some(10)))
        .await
        .unwrap();

    let second = env
        .uploads
        .verify(&admin(101), upload.id, &approve(Some(10)))
        .await;
    assert!(matches!(second, Err(AppError::StateError(_))));

    // No double credit.
    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 10);
}

#[tokio::test]
async fn rejection_allocates_no_points() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    env.ledger.find_or_create(&env.db, &alice).await.unwrap();

    let upload = env
        .uploads
        .submit(&alice, &upload_request("10:00", "11:00", &["Alice"]), proof())
        .await
        .unwrap();
    let settled = env
        .uploads
        .verify(&admin(100), upload.id, &reject("blurry photo"))
        .await
        .unwrap();

    assert_eq!(settled.status, UploadStatus::Rejected);
    assert_eq!(settled.admin_notes.as_deref(), Some("blurry photo"));
    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 0);
    assert_eq!(ledger_sum(&env, 1).await, 0);
}

#[tokio::test]
async fn submission_validation_rejects_bad_input() {
    let env = setup().await;
    let alice = customer(1, "Alice");

    // End before start.
    let result = env
        .uploads
        .submit(&alice, &upload_request("13:00", "10:00", &["Alice"]), proof())
        .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    // Unparsable time.
    let result = env
        .uploads
        .submit(&alice, &upload_request("sometime", "11:00", &["Alice"]), proof())
        .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    // No usable participants.
    let result = env
        .uploads
        .submit(&alice, &upload_request("10:00", "11:00", &["  ", ""]), proof())
        .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    // Not an image.
    let mut bad = proof();
    bad.content_type = "application/pdf".to_string();
    let result = env
        .uploads
        .submit(&alice, &upload_request("10:00", "11:00", &["Alice"]), bad)
        .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    // Over the 5 MiB limit.
    let mut huge = proof();
    huge.bytes = vec![0; 5 * 1024 * 1024 + 1];
    let result = env
        .uploads
        .submit(&alice, &upload_request("10:00", "11:00", &["Alice"]), huge)
        .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn only_admins_can_verify_and_only_customers_can_submit() {
    let env = setup().await;
    let alice = customer(1, "Alice");

    let result = env
        .uploads
        .submit(&admin(100), &upload_request("10:00", "11:00", &["Alice"]), proof())
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let upload = env
        .uploads
        .submit(&alice, &upload_request("10:00", "11:00", &["Alice"]), proof())
        .await
        .unwrap();
    let result = env.uploads.verify(&alice, upload.id, &approve(None)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn ledger_reconciles_with_available_balance() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    env.ledger.find_or_create(&env.db, &alice).await.unwrap();

    for _ in 0..3 {
        let upload = env
            .uploads
            .submit(&alice, &upload_request("10:00", "12:00", &["Alice"]), proof())
            .await
            .unwrap();
        env.uploads
            .verify(&admin(100), upload.id, &approve(Some(7)))
            .await
            .unwrap();
    }

    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 42);
    assert_eq!(ledger_sum(&env, 1).await, summary.available_points);
}
