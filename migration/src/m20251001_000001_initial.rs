use sea_orm_migration::prelude::*;

/// Registrations (参赛者)
#[derive(DeriveIden)]
enum Registrations {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    DateOfBirth,
    Region,
    MobileMoneyProvider,
    CvFile,
    Language,
    RegistrationDate,
    IsActive,
    TermsAccepted,
}

/// Job listings (奖品目录)
#[derive(DeriveIden)]
enum JobListings {
    Table,
    Id,
    Title,
    Description,
    JobType,
    SalaryRange,
    Requirements,
    IsActive,
    CreatedDate,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Registrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Registrations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Registrations::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(Registrations::FirstName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Registrations::LastName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Registrations::Email)
                            .string_len(254)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Registrations::PhoneNumber)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Registrations::DateOfBirth).date().not_null())
                    .col(
                        ColumnDef::new(Registrations::Region)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Registrations::MobileMoneyProvider)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Registrations::CvFile)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Registrations::Language)
                            .string_len(2)
                            .not_null()
                            .default("en"),
                    )
                    .col(
                        ColumnDef::new(Registrations::RegistrationDate)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Registrations::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Registrations::TermsAccepted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // email 唯一
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_registrations_email_unique")
                    .table(Registrations::Table)
                    .col(Registrations::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 一个账号最多对应一条报名
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_registrations_user_unique")
                    .table(Registrations::Table)
                    .col(Registrations::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobListings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobListings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobListings::Title).string_len(200).not_null())
                    .col(ColumnDef::new(JobListings::Description).text().not_null())
                    .col(
                        ColumnDef::new(JobListings::JobType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobListings::SalaryRange)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(JobListings::Requirements).text().not_null())
                    .col(
                        ColumnDef::new(JobListings::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(JobListings::CreatedDate)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_listings_active")
                    .table(JobListings::Table)
                    .col(JobListings::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(JobListings::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Registrations::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
