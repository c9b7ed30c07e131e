use balls_backend::config::StorageConfig;
use balls_backend::database::run_migrations;
use balls_backend::external::StorageService;
use balls_backend::models::{AuthContext, ProofFile, Role, SubmitUploadRequest, ProofUpload};
use balls_backend::services::{
    AuditService, LedgerService, ProgramService, RedemptionService, SettingsService, StatsService,
    UploadService,
};
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

pub struct TestEnv {
    pub db: DatabaseConnection,
    pub audit: AuditService,
    pub ledger: LedgerService,
    pub settings: SettingsService,
    pub programs: ProgramService,
    pub uploads: UploadService,
    pub redemptions: RedemptionService,
    pub stats: StatsService,
}

pub async fn setup() -> TestEnv {
    // A pooled in-memory SQLite database only stays shared while every
    // handle uses the same connection.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    run_migrations(&db).await.expect("run migrations");

    let storage = StorageService::new(StorageConfig {
        upload_dir: std::env::temp_dir()
            .join(format!("balls-test-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        public_base_url: "/uploads/payments".to_string(),
    });

    let audit = AuditService::new(db.clone());
    let ledger = LedgerService::new(db.clone());
    let settings = SettingsService::new(db.clone(), audit.clone());
    let programs = ProgramService::new(db.clone(), audit.clone(), ledger.clone());
    let uploads = UploadService::new(
        db.clone(),
        storage,
        audit.clone(),
        ledger.clone(),
        settings.clone(),
    );
    let redemptions = RedemptionService::new(
        db.clone(),
        audit.clone(),
        ledger.clone(),
        settings.clone(),
    );
    let stats = StatsService::new(db.clone());

    TestEnv {
        db,
        audit,
        ledger,
        settings,
        programs,
        uploads,
        redemptions,
        stats,
    }
}

pub fn ctx(user_id: i64, name: &str, role: Role) -> AuthContext {
    AuthContext {
        user_id,
        display_name: name.to_string(),
        role,
        ip_address: Some("127.0.0.1".to_string()),
        user_agent: Some("tests".to_string()),
    }
}

pub fn customer(user_id: i64, name: &str) -> AuthContext {
    ctx(user_id, name, Role::Customer)
}

pub fn admin(user_id: i64) -> AuthContext {
    ctx(user_id, "Admin", Role::Admin)
}

pub fn super_admin(user_id: i64) -> AuthContext {
    ctx(user_id, "Root", Role::SuperAdmin)
}

pub fn proof() -> ProofFile {
    ProofFile {
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        content_type: "image/jpeg".to_string(),
    }
}

pub fn upload_request(
    start_time: &str,
    end_time: &str,
    participants: &[&str],
) -> SubmitUploadRequest {
    SubmitUploadRequest {
        booking_date: NaiveDate::from_ymd_opt(2025, 9, 6).unwrap(),
        start_time: start_time.to_string(),
        end_time: end_time.to_string(),
        total_amount: Some(120.0),
        participants: participants.iter().map(|p| p.to_string()).collect(),
        payment_proof: ProofUpload {
            content_type: "image/jpeg".to_string(),
            data: String::new(),
        },
    }
}
