use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Registrations {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    RegistrationId,
    UserId,
    Amount,
    PaymentType,
    Status,
    Reference,
    PaystackReference,
    AuthorizationUrl,
    AccessCode,
    Email,
    PhoneNumber,
    PaymentMethod,
    PaidAt,
    MonthPaidFor,
    CreatedDate,
    UpdatedDate,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 每次支付尝试一条记录；amount 以 pesewas（最小货币单位）存储
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Payments::RegistrationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::UserId).big_integer().null())
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::PaymentType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Payments::Reference).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Payments::PaystackReference)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Payments::AuthorizationUrl)
                            .string_len(500)
                            .null(),
                    )
                    .col(ColumnDef::new(Payments::AccessCode).string_len(100).null())
                    .col(ColumnDef::new(Payments::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Payments::PhoneNumber).string_len(20).null())
                    .col(
                        ColumnDef::new(Payments::PaymentMethod)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Payments::PaidAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Payments::MonthPaidFor).date().not_null())
                    .col(
                        ColumnDef::new(Payments::CreatedDate)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Payments::UpdatedDate)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_registration")
                            .from(Payments::Table, Payments::RegistrationId)
                            .to(Registrations::Table, Registrations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // reference 全局唯一（客户端生成，写入时由唯一约束兜底）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_reference_unique")
                    .table(Payments::Table)
                    .col(Payments::Reference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_status")
                    .table(Payments::Table)
                    .col(Payments::Status)
                    .to_owned(),
            )
            .await?;

        // 资格查询: registration + month
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_registration_month")
                    .table(Payments::Table)
                    .col(Payments::RegistrationId)
                    .col(Payments::MonthPaidFor)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Payments::Table).to_owned())
            .await?;

        Ok(())
    }
}
