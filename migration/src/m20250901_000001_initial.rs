use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    UserId,
    DisplayName,
    TotalPoints,
    AvailablePoints,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PointTransactions {
    Table,
    Id,
    CustomerId,
    TransactionType,
    Points,
    Description,
    PaymentUploadId,
    RedemptionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LoyaltyPrograms {
    Table,
    Id,
    Name,
    Description,
    RequiredPoints,
    IsActive,
    MaxRedemptions,
    CurrentRedemptions,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PaymentUploads {
    Table,
    Id,
    CustomerId,
    BookingDate,
    StartTime,
    EndTime,
    DurationHours,
    PaymentProof,
    TotalAmount,
    Status,
    AdminNotes,
    ApprovedBy,
    ApprovedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BookingParticipants {
    Table,
    Id,
    PaymentUploadId,
    CustomerName,
    CustomerId,
    PointsAllocated,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Redemptions {
    Table,
    Id,
    CustomerId,
    ProgramId,
    Status,
    PointsUsed,
    QrCode,
    QrCodeExpiry,
    ApprovedBy,
    ApprovedAt,
    UsedAt,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    UserId,
    Action,
    Resource,
    ResourceId,
    OldValues,
    NewValues,
    IpAddress,
    UserAgent,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SystemSettings {
    Table,
    Id,
    Key,
    Value,
    Description,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Status and type columns are stored as plain strings so the same migration
/// runs on Postgres and the sqlite test harness.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Customers::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Customers::TotalPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::AvailablePoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Customers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customers_user_id")
                    .table(Customers::Table)
                    .col(Customers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::CustomerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::Points)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::PaymentUploadId).big_integer())
                    .col(ColumnDef::new(PointTransactions::RedemptionId).big_integer())
                    .col(
                        ColumnDef::new(PointTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_point_transactions_customer_id")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LoyaltyPrograms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyPrograms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LoyaltyPrograms::Name).string().not_null())
                    .col(
                        ColumnDef::new(LoyaltyPrograms::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPrograms::RequiredPoints)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPrograms::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(LoyaltyPrograms::MaxRedemptions).big_integer())
                    .col(
                        ColumnDef::new(LoyaltyPrograms::CurrentRedemptions)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPrograms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyPrograms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentUploads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentUploads::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentUploads::CustomerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentUploads::BookingDate).date().not_null())
                    .col(
                        ColumnDef::new(PaymentUploads::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentUploads::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentUploads::DurationHours)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentUploads::PaymentProof)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentUploads::TotalAmount).double())
                    .col(
                        ColumnDef::new(PaymentUploads::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PaymentUploads::AdminNotes).string())
                    .col(ColumnDef::new(PaymentUploads::ApprovedBy).big_integer())
                    .col(
                        ColumnDef::new(PaymentUploads::ApprovedAt).timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(PaymentUploads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentUploads::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payment_uploads_status")
                    .table(PaymentUploads::Table)
                    .col(PaymentUploads::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookingParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookingParticipants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BookingParticipants::PaymentUploadId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BookingParticipants::CustomerName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BookingParticipants::CustomerId).big_integer())
                    .col(
                        ColumnDef::new(BookingParticipants::PointsAllocated)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BookingParticipants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_booking_participants_upload_id")
                    .table(BookingParticipants::Table)
                    .col(BookingParticipants::PaymentUploadId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Redemptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Redemptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Redemptions::CustomerId).big_integer().not_null())
                    .col(ColumnDef::new(Redemptions::ProgramId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Redemptions::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Redemptions::PointsUsed).big_integer().not_null())
                    .col(ColumnDef::new(Redemptions::QrCode).string().not_null())
                    .col(ColumnDef::new(Redemptions::QrCodeExpiry).timestamp_with_time_zone())
                    .col(ColumnDef::new(Redemptions::ApprovedBy).big_integer())
                    .col(ColumnDef::new(Redemptions::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Redemptions::UsedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Redemptions::AdminNotes).string())
                    .col(
                        ColumnDef::new(Redemptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Redemptions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_redemptions_qr_code")
                    .table(Redemptions::Table)
                    .col(Redemptions::QrCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_redemptions_program_id")
                    .table(Redemptions::Table)
                    .col(Redemptions::ProgramId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditLogs::UserId).big_integer().not_null())
                    .col(ColumnDef::new(AuditLogs::Action).string().not_null())
                    .col(ColumnDef::new(AuditLogs::Resource).string().not_null())
                    .col(ColumnDef::new(AuditLogs::ResourceId).string().not_null())
                    .col(ColumnDef::new(AuditLogs::OldValues).json())
                    .col(ColumnDef::new(AuditLogs::NewValues).json())
                    .col(ColumnDef::new(AuditLogs::IpAddress).string())
                    .col(ColumnDef::new(AuditLogs::UserAgent).string())
                    .col(
                        ColumnDef::new(AuditLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SystemSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemSettings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SystemSettings::Key).string().not_null())
                    .col(ColumnDef::new(SystemSettings::Value).string().not_null())
                    .col(ColumnDef::new(SystemSettings::Description).string())
                    .col(ColumnDef::new(SystemSettings::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_system_settings_key")
                    .table(SystemSettings::Table)
                    .col(SystemSettings::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Default settings consumed by the upload and redemption workflows.
        let seed = Query::insert()
            .into_table(SystemSettings::Table)
            .columns([
                SystemSettings::Key,
                SystemSettings::Value,
                SystemSettings::Description,
            ])
            .values_panic([
                "default_points_per_hour".into(),
                "10".into(),
                "Default points earned per hour of booking".into(),
            ])
            .values_panic([
                "max_qr_expiry_hours".into(),
                "24".into(),
                "Hours before a redemption QR code expires".into(),
            ])
            .values_panic([
                "min_redemption_points".into(),
                "0".into(),
                "Minimum points required for redemption".into(),
            ])
            .to_owned();
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SystemSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Redemptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BookingParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentUploads::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoyaltyPrograms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        Ok(())
    }
}
