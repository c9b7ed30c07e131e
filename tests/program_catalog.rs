mod common;

use balls_backend::error::AppError;
use balls_backend::models::{
    CreateProgramRequest, PaginationParams, UpdateSettingsRequest, VerifyDecision,
    VerifyRedemptionRequest,
};
use common::{admin, customer, setup, super_admin, TestEnv};

async fn seed_program(env: &TestEnv, name: &str, required_points: i64) -> i64 {
    env.programs
        .create(
            &admin(100),
            &CreateProgramRequest {
                name: name.to_string(),
                description: String::new(),
                required_points,
                max_redemptions: None,
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn program_management_is_admin_only() {
    let env = setup().await;
    let alice = customer(1, "Alice");

    let result = env
        .programs
        .create(
            &alice,
            &CreateProgramRequest {
                name: "Sneaky".to_string(),
                description: String::new(),
                required_points: 1,
                max_redemptions: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let result = env.programs.list(&alice, &PaginationParams::default()).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn program_fields_are_validated() {
    let env = setup().await;

    for (name, points, max) in [("", 10, None), ("Ok", 0, None), ("Ok", 10, Some(0))] {
        let result = env
            .programs
            .create(
                &admin(100),
                &CreateProgramRequest {
                    name: name.to_string(),
                    description: String::new(),
                    required_points: points,
                    max_redemptions: max,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}

#[tokio::test]
async fn rewards_are_priced_ascending_with_per_caller_affordability() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    let row = env.ledger.find_or_create(&env.db, &alice).await.unwrap();
    env.ledger
        .credit(&env.db, row.id, 100, "seed".to_string(), None)
        .await
        .unwrap();

    seed_program(&env, "Gold", 200).await;
    seed_program(&env, "Bronze", 50).await;

    let rewards = env.programs.available_rewards(&alice).await.unwrap();
    assert_eq!(rewards.len(), 2);
    assert_eq!(rewards[0].program.name, "Bronze");
    assert!(rewards[0].can_redeem);
    assert_eq!(rewards[1].program.name, "Gold");
    assert!(!rewards[1].can_redeem);
    assert!(rewards.iter().all(|r| r.available_points == 100));
}

#[tokio::test]
async fn toggled_off_programs_disappear_from_the_catalogue() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    let id = seed_program(&env, "Bronze", 50).await;

    env.programs.toggle(&admin(100), id).await.unwrap();
    let rewards = env.programs.available_rewards(&alice).await.unwrap();
    assert!(rewards.is_empty());

    // Admins still see it in the management listing.
    let listed = env
        .programs
        .list(&admin(100), &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
    assert!(!listed.data[0].is_active);
}

#[tokio::test]
async fn programs_with_redemption_history_cannot_be_deleted() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    let row = env.ledger.find_or_create(&env.db, &alice).await.unwrap();
    env.ledger
        .credit(&env.db, row.id, 100, "seed".to_string(), None)
        .await
        .unwrap();
    let id = seed_program(&env, "Bronze", 50).await;

    env.redemptions.redeem(&alice, id).await.unwrap();
    let result = env.programs.delete(&admin(100), id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    // A pristine program deletes fine.
    let other = seed_program(&env, "Silver", 80).await;
    env.programs.delete(&admin(100), other).await.unwrap();
    let listed = env
        .programs
        .list(&admin(100), &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
}

#[tokio::test]
async fn settings_round_trip_and_are_validated() {
    let env = setup().await;

    let seeded = env.settings.get_settings(&admin(100)).await.unwrap();
    assert_eq!(seeded.default_points_per_hour, 10);
    assert_eq!(seeded.max_qr_expiry_hours, 24);

    let updated = env
        .settings
        .update_settings(
            &admin(100),
            &UpdateSettingsRequest {
                default_points_per_hour: 15,
                max_qr_expiry_hours: 48,
                min_redemption_points: 20,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.default_points_per_hour, 15);
    assert_eq!(updated.max_qr_expiry_hours, 48);
    assert_eq!(updated.min_redemption_points, 20);

    let result = env
        .settings
        .update_settings(
            &admin(100),
            &UpdateSettingsRequest {
                default_points_per_hour: 0,
                max_qr_expiry_hours: 48,
                min_redemption_points: 0,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));
}

#[tokio::test]
async fn audit_trail_records_admin_actions_newest_first() {
    let env = setup().await;
    let id = seed_program(&env, "Bronze", 50).await;
    env.programs.toggle(&admin(100), id).await.unwrap();

    let logs = env
        .audit
        .list(&super_admin(999), &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(logs.total, 2);
    assert_eq!(logs.data[0].resource, "loyalty_program");
    assert_eq!(logs.data[0].user_id, 100);
    // The toggle is the newest entry and carries both value snapshots.
    assert!(logs.data[0].old_values.is_some());
    assert!(logs.data[0].new_values.is_some());

    // Plain admins cannot read the trail.
    let result = env.audit.list(&admin(100), &PaginationParams::default()).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn system_stats_reflect_activity() {
    let env = setup().await;
    let alice = customer(1, "Alice");
    let row = env.ledger.find_or_create(&env.db, &alice).await.unwrap();
    env.ledger
        .credit(&env.db, row.id, 100, "seed".to_string(), None)
        .await
        .unwrap();
    let id = seed_program(&env, "Bronze", 50).await;
    let redemption = env.redemptions.redeem(&alice, id).await.unwrap();
    env.redemptions
        .verify(
            &admin(100),
            redemption.id,
            &VerifyRedemptionRequest {
                decision: VerifyDecision::Approve,
                admin_notes: None,
            },
        )
        .await
        .unwrap();

    let stats = env.stats.system_stats(&super_admin(999)).await.unwrap();
    assert_eq!(stats.total_customers, 1);
    assert_eq!(stats.total_redemptions, 1);
    assert_eq!(stats.pending_redemptions, 0);
    assert_eq!(stats.active_programs, 1);
    assert_eq!(stats.total_points_distributed, 100);
    assert_eq!(stats.total_points_redeemed, 50);

    let result = env.stats.system_stats(&admin(100)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}
