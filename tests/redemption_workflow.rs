mod common;

use balls_backend::entities::{redemption_entity, RedemptionStatus};
use balls_backend::error::AppError;
use balls_backend::models::{
    CreateProgramRequest, VerifyDecision, VerifyRedemptionRequest,
};
use chrono::{Duration, Utc};
use common::{admin, customer, setup, TestEnv};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};

async fn seed_customer(env: &TestEnv, ctx: &balls_backend::models::AuthContext, points: i64) -> i64 {
    let row = env.ledger.find_or_create(&env.db, ctx).await.unwrap();
    if points > 0 {
        env.ledger
            .credit(&env.db, row.id, points, "seed".to_string(), None)
            .await
            .unwrap();
    }
    row.id
}

async fn seed_program(env: &TestEnv, required_points: i64, max_redemptions: Option<i64>) -> i64 {
    env.programs
        .create(
            &admin(100),
            &CreateProgramRequest {
                name: "Free hour".to_string(),
                description: "One free booking hour".to_string(),
                required_points,
                max_redemptions,
            },
        )
        .await
        .unwrap()
        .id
}

fn approve() -> VerifyRedemptionRequest {
    VerifyRedemptionRequest {
        decision: VerifyDecision::Approve,
        admin_notes: None,
    }
}

fn reject(notes: &str) -> VerifyRedemptionRequest {
    VerifyRedemptionRequest {
        decision: VerifyDecision::Reject,
        admin_notes: Some(notes.to_string()),
    }
}

#[tokio::test]
async fn redeeming_deducts_points_and_issues_a_pending_qr() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 100).await;
    let program_id = seed_program(&env, 60, None).await;

    let redemption = env.redemptions.redeem(&alice, program_id).await.unwrap();
    assert_eq!(redemption.status, RedemptionStatus::Pending);
    assert_eq!(redemption.points_used, 60);
    assert!(redemption.qr_code.starts_with("BALLS-"));
    assert!(redemption.qr_code_expiry.unwrap() > Utc::now());

    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 40);
    // Lifetime total is untouched by spending.
    assert_eq!(summary.total_points, 100);
    assert_eq!(summary.total_redeemed, 60);
}

#[tokio::test]
async fn redeeming_without_enough_points_fails_cleanly() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 30).await;
    let program_id = seed_program(&env, 60, None).await;

    let result = env.redemptions.redeem(&alice, program_id).await;
    assert!(matches!(result, Err(AppError::InsufficientPoints(_))));

    // The failed attempt leaves no trace.
    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 30);
    let rows = redemption_entity::Entity::find().all(&env.db).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn inactive_or_unknown_programs_cannot_be_redeemed() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 100).await;
    let program_id = seed_program(&env, 60, None).await;
    env.programs.toggle(&admin(100), program_id).await.unwrap();

    let result = env.redemptions.redeem(&alice, program_id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = env.redemptions.redeem(&alice, 9999).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn rejection_refunds_the_exact_points_paid() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 100).await;
    let program_id = seed_program(&env, 60, None).await;

    let redemption = env.redemptions.redeem(&alice, program_id).await.unwrap();

    // A price change after the request must not change the refund.
    env.programs
        .update(
            &admin(100),
            program_id,
            &balls_backend::models::UpdateProgramRequest {
                name: "Free hour".to_string(),
                description: "One free booking hour".to_string(),
                required_points: 90,
                max_redemptions: None,
            },
        )
        .await
        .unwrap();

    let settled = env
        .redemptions
        .verify(&admin(100), redemption.id, &reject("out of stock"))
        .await
        .unwrap();
    assert_eq!(settled.status, RedemptionStatus::Rejected);

    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 100);
    assert_eq!(summary.total_points, 100);
}

#[tokio::test]
async fn approve_then_mark_used_completes_the_lifecycle() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 100).await;
    let program_id = seed_program(&env, 60, Some(5)).await;

    let redemption = env.redemptions.redeem(&alice, program_id).await.unwrap();
    let approved = env
        .redemptions
        .verify(&admin(100), redemption.id, &approve())
        .await
        .unwrap();
    assert_eq!(approved.status, RedemptionStatus::Approved);
    assert_eq!(approved.approved_by, Some(100));

    let used = env
        .redemptions
        .mark_used(&admin(100), redemption.id)
        .await
        .unwrap();
    assert_eq!(used.status, RedemptionStatus::Used);
    assert!(used.used_at.is_some());

    // Approval counted against the program cap.
    let programs = env
        .programs
        .list(&admin(100), &Default::default())
        .await
        .unwrap();
    assert_eq!(programs.data[0].current_redemptions, 1);
}

#[tokio::test]
async fn a_redemption_is_settled_at_most_once() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 100).await;
    let program_id = seed_program(&env, 60, None).await;

    let redemption = env.redemptions.redeem(&alice, program_id).await.unwrap();
    env.redemptions
        .verify(&admin(100), redemption.id, &reject("no"))
        .await
        .unwrap();

    let second = env
        .redemptions
        .verify(&admin(101), redemption.id, &reject("no"))
        .await;
    assert!(matches!(second, Err(AppError::StateError(_))));

    // Only one refund happened.
    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 100);
}

#[tokio::test]
async fn only_approved_redemptions_can_be_marked_used() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 100).await;
    let program_id = seed_program(&env, 60, None).await;

    let redemption = env.redemptions.redeem(&alice, program_id).await.unwrap();
    let result = env.redemptions.mark_used(&admin(100), redemption.id).await;
    assert!(matches!(result, Err(AppError::StateError(_))));
}

#[tokio::test]
async fn an_expired_qr_code_is_refused_but_stays_approved() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 100).await;
    let program_id = seed_program(&env, 60, None).await;

    let redemption = env.redemptions.redeem(&alice, program_id).await.unwrap();
    env.redemptions
        .verify(&admin(100), redemption.id, &approve())
        .await
        .unwrap();

    // Backdate the expiry.
    let row = redemption_entity::Entity::find_by_id(redemption.id)
        .one(&env.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: redemption_entity::ActiveModel = row.into();
    active.qr_code_expiry = Set(Some(Utc::now() - Duration::hours(1)));
    active.update(&env.db).await.unwrap();

    let result = env.redemptions.mark_used(&admin(100), redemption.id).await;
    assert!(matches!(result, Err(AppError::Expired(_))));

    let scanned = env
        .redemptions
        .scan(&admin(100), &redemption.qr_code)
        .await
        .unwrap();
    assert_eq!(scanned.status, RedemptionStatus::Approved);
}

#[tokio::test]
async fn exhausted_programs_refuse_new_redemptions() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    let bob = customer(2, "Bob");
    seed_customer(&env, &alice, 100).await;
    seed_customer(&env, &bob, 100).await;
    let program_id = seed_program(&env, 60, Some(1)).await;

    let first = env.redemptions.redeem(&alice, program_id).await.unwrap();
    env.redemptions
        .verify(&admin(100), first.id, &approve())
        .await
        .unwrap();

    let result = env.redemptions.redeem(&bob, program_id).await;
    assert!(matches!(result, Err(AppError::Exhausted(_))));

    // Bob paid nothing for the failed attempt.
    let summary = env.ledger.loyalty_summary(&bob).await.unwrap();
    assert_eq!(summary.available_points, 100);
}

#[tokio::test]
async fn concurrent_redeems_cannot_overspend() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 60).await;
    let program_id = seed_program(&env, 60, None).await;

    let (a, b) = tokio::join!(
        env.redemptions.redeem(&alice, program_id),
        env.redemptions.redeem(&alice, program_id),
    );
    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);

    let summary = env.ledger.loyalty_summary(&alice).await.unwrap();
    assert_eq!(summary.available_points, 0);
}

#[tokio::test]
async fn scanning_resolves_names_for_the_admin() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    seed_customer(&env, &alice, 100).await;
    let program_id = seed_program(&env, 60, None).await;

    let redemption = env.redemptions.redeem(&alice, program_id).await.unwrap();
    let scanned = env
        .redemptions
        .scan(&admin(100), &redemption.qr_code)
        .await
        .unwrap();
    assert_eq!(scanned.customer_name.as_deref(), Some("Alice"));
    assert_eq!(scanned.program_name.as_deref(), Some("Free hour"));

    let result = env.redemptions.scan(&admin(100), "BALLS-bogus").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}
