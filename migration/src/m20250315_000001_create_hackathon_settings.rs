use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 赛事配置表（单行） ====================
        manager
            .create_table(
                Table::create()
                    .table(HackathonSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HackathonSettings::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HackathonSettings::Name).string().not_null())
                    .col(ColumnDef::new(HackathonSettings::Tagline).string().null())
                    .col(ColumnDef::new(HackathonSettings::Theme).string().null())
                    .col(ColumnDef::new(HackathonSettings::Description).text().null())
                    .col(
                        ColumnDef::new(HackathonSettings::StartDate)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(HackathonSettings::EndDate).big_integer().null())
                    .col(
                        ColumnDef::new(HackathonSettings::SubmissionDeadline)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::JudgingStartDate)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::JudgingEndDate)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::MaxTeamSize)
                            .big_integer()
                            .not_null()
                            .default(4),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::InnovationWeight)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::TechnicalWeight)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::ImplementationWeight)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::ImpactWeight)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::AllowLateSubmissions)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::EnableLeaderboard)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HackathonSettings::UpdatedBy)
                            .big_integer()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(HackathonSettings::Table, HackathonSettings::UpdatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 插入默认配置 ====================
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        let insert = Query::insert()
            .into_table(HackathonSettings::Table)
            .columns([
                HackathonSettings::Id,
                HackathonSettings::Name,
                HackathonSettings::MaxTeamSize,
                HackathonSettings::InnovationWeight,
                HackathonSettings::TechnicalWeight,
                HackathonSettings::ImplementationWeight,
                HackathonSettings::ImpactWeight,
                HackathonSettings::AllowLateSubmissions,
                HackathonSettings::EnableLeaderboard,
                HackathonSettings::UpdatedAt,
            ])
            .values_panic([
                1i64.into(),
                "HackFlow".into(),
                4i64.into(),
                25.0f64.into(),
                25.0f64.into(),
                25.0f64.into(),
                25.0f64.into(),
                false.into(),
                true.into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HackathonSettings::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum HackathonSettings {
    #[sea_orm(iden = "hackathon_settings")]
    Table,
    Id,
    Name,
    Tagline,
    Theme,
    Description,
    StartDate,
    EndDate,
    SubmissionDeadline,
    JudgingStartDate,
    JudgingEndDate,
    MaxTeamSize,
    InnovationWeight,
    TechnicalWeight,
    ImplementationWeight,
    ImpactWeight,
    AllowLateSubmissions,
    EnableLeaderboard,
    UpdatedAt,
    UpdatedBy,
}
