pub mod audit_service;
pub mod ledger_service;
pub mod program_service;
pub mod redemption_service;
pub mod settings_service;
pub mod stats_service;
pub mod upload_service;

pub use audit_service::AuditService;
pub use ledger_service::LedgerService;
pub use program_service::ProgramService;
pub use redemption_service::RedemptionService;
pub use settings_service::SettingsService;
pub use stats_service::StatsService;
pub use upload_service::UploadService;
