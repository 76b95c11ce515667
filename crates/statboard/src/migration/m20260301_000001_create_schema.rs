//! Initial migration to create the statboard database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_members(manager).await?;
        self.create_contribution_snapshots(manager).await?;
        self.create_sync_states(manager).await?;
        self.create_bootcamps(manager).await?;
        self.create_bootcamp_participants(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BootcampParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bootcamps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SyncStates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContributionSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_members(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Members::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Members::Handle).string().not_null())
                    .col(ColumnDef::new(Members::GithubUsername).string().null())
                    .col(ColumnDef::new(Members::LeetcodeUsername).string().null())
                    .col(
                        ColumnDef::new(Members::Experience)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Members::Streak)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Members::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_handle")
                    .table(Members::Table)
                    .col(Members::Handle)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_contribution_snapshots(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ContributionSnapshots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContributionSnapshots::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::MemberId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::Provider)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::CapturedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::Commits)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::PullRequests)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::Issues)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::Repositories)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::Followers)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::Contributions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::LanguageHistogram)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::HistogramKind)
                            .string()
                            .not_null()
                            .default("count"),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::DailyContributions)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::SolvedEasy)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::SolvedMedium)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::SolvedHard)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::Ranking)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ContributionSnapshots::Reputation)
                            .big_integer()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_snapshots_member")
                            .from(
                                ContributionSnapshots::Table,
                                ContributionSnapshots::MemberId,
                            )
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The "find current snapshot" query: newest captured_at per pair
        manager
            .create_index(
                Index::create()
                    .name("idx_snapshots_member_provider_captured")
                    .table(ContributionSnapshots::Table)
                    .col(ContributionSnapshots::MemberId)
                    .col(ContributionSnapshots::Provider)
                    .col(ContributionSnapshots::CapturedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_sync_states(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncStates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncStates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncStates::MemberId).uuid().not_null())
                    .col(ColumnDef::new(SyncStates::Provider).string().not_null())
                    .col(
                        ColumnDef::new(SyncStates::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SyncStates::LastSyncOk)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SyncStates::NextEligibleAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sync_states_member")
                            .from(SyncStates::Table, SyncStates::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One state row per (member, provider); the claim path relies on it
        manager
            .create_index(
                Index::create()
                    .name("idx_sync_states_member_provider")
                    .table(SyncStates::Table)
                    .col(SyncStates::MemberId)
                    .col(SyncStates::Provider)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_bootcamps(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bootcamps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bootcamps::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bootcamps::Title).string().not_null())
                    .col(ColumnDef::new(Bootcamps::Provider).string().not_null())
                    .col(
                        ColumnDef::new(Bootcamps::Status)
                            .string()
                            .not_null()
                            .default("upcoming"),
                    )
                    .col(
                        ColumnDef::new(Bootcamps::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bootcamps::EndsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bootcamps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bootcamps_status")
                    .table(Bootcamps::Table)
                    .col(Bootcamps::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_bootcamp_participants(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BootcampParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BootcampParticipants::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BootcampParticipants::BootcampId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BootcampParticipants::MemberId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BootcampParticipants::BaselineStats)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(BootcampParticipants::CurrentStats)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(BootcampParticipants::ProgressStats)
                            .json()
                            .not_null()
                            .default(Expr::cust("'{}'")),
                    )
                    .col(
                        ColumnDef::new(BootcampParticipants::FinalPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BootcampParticipants::FinalRank)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BootcampParticipants::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_bootcamp")
                            .from(
                                BootcampParticipants::Table,
                                BootcampParticipants::BootcampId,
                            )
                            .to(Bootcamps::Table, Bootcamps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_participants_member")
                            .from(BootcampParticipants::Table, BootcampParticipants::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participants_bootcamp_member")
                    .table(BootcampParticipants::Table)
                    .col(BootcampParticipants::BootcampId)
                    .col(BootcampParticipants::MemberId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    Handle,
    GithubUsername,
    LeetcodeUsername,
    Experience,
    Streak,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ContributionSnapshots {
    Table,
    Id,
    MemberId,
    Provider,
    CapturedAt,
    Commits,
    PullRequests,
    Issues,
    Repositories,
    Followers,
    Contributions,
    LanguageHistogram,
    HistogramKind,
    DailyContributions,
    SolvedEasy,
    SolvedMedium,
    SolvedHard,
    Ranking,
    Reputation,
}

#[derive(DeriveIden)]
enum SyncStates {
    Table,
    Id,
    MemberId,
    Provider,
    LastSyncedAt,
    LastSyncOk,
    NextEligibleAt,
}

#[derive(DeriveIden)]
enum Bootcamps {
    Table,
    Id,
    Title,
    Provider,
    Status,
    StartsAt,
    EndsAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BootcampParticipants {
    Table,
    Id,
    BootcampId,
    MemberId,
    BaselineStats,
    CurrentStats,
    ProgressStats,
    FinalPoints,
    FinalRank,
    RegisteredAt,
}
