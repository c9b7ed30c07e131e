pub mod audit_logs;
pub mod booking_participants;
pub mod customers;
pub mod loyalty_programs;
pub mod payment_uploads;
pub mod point_transactions;
pub mod redemptions;
pub mod system_settings;

pub use audit_logs as audit_log_entity;
pub use booking_participants as booking_participant_entity;
pub use customers as customer_entity;
pub use loyalty_programs as loyalty_program_entity;
pub use payment_uploads as payment_upload_entity;
pub use point_transactions as point_transaction_entity;
pub use redemptions as redemption_entity;
pub use system_settings as system_setting_entity;

pub use audit_logs::AuditAction;
pub use payment_uploads::UploadStatus;
pub use point_transactions::PointTransactionType;
pub use redemptions::RedemptionStatus;
