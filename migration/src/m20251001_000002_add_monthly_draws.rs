use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Registrations {
    Table,
    Id,
}

/// Monthly Draws (每月抽奖)
#[derive(DeriveIden)]
enum MonthlyDraws {
    Table,
    Id,
    DrawMonth,
    MinimumParticipants,
    CurrentParticipants,
    Status,
    WinnersSelected,
    CreatedDate,
}

/// Winners (中奖记录)
#[derive(DeriveIden)]
enum Winners {
    Table,
    Id,
    RegistrationId,
    MonthlyDrawId,
    PrizeType,
    PrizeDetails,
    IsClaimed,
    ClaimDate,
    CreatedDate,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// draw_month 永远是当月 1 号，唯一索引保证每月只有一条记录；
/// 懒创建走 INSERT ... ON CONFLICT DO NOTHING。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MonthlyDraws::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonthlyDraws::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonthlyDraws::DrawMonth).date().not_null())
                    .col(
                        ColumnDef::new(MonthlyDraws::MinimumParticipants)
                            .integer()
                            .not_null()
                            .default(5000),
                    )
                    .col(
                        ColumnDef::new(MonthlyDraws::CurrentParticipants)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MonthlyDraws::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(MonthlyDraws::WinnersSelected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(MonthlyDraws::CreatedDate)
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
                    .name("idx_monthly_draws_draw_month_unique")
                    .table(MonthlyDraws::Table)
                    .col(MonthlyDraws::DrawMonth)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 中奖记录表（历史记录不随报名删除而级联）
        manager
            .create_table(
                Table::create()
                    .table(Winners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Winners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Winners::RegistrationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Winners::MonthlyDrawId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Winners::PrizeType).string_len(20).not_null())
                    .col(ColumnDef::new(Winners::PrizeDetails).text().not_null())
                    .col(
                        ColumnDef::new(Winners::IsClaimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Winners::ClaimDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Winners::CreatedDate)
                            .timestamp_with_time_zone()
                            .default(Expr::current_timestamp())
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winners_registration")
                            .from(Winners::Table, Winners::RegistrationId)
                            .to(Registrations::Table, Registrations::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winners_monthly_draw")
                            .from(Winners::Table, Winners::MonthlyDrawId)
                            .to(MonthlyDraws::Table, MonthlyDraws::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一期抽奖每人最多中奖一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_registration_draw_unique")
                    .table(Winners::Table)
                    .col(Winners::RegistrationId)
                    .col(Winners::MonthlyDrawId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_monthly_draw")
                    .table(Winners::Table)
                    .col(Winners::MonthlyDrawId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Winners::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(MonthlyDraws::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
