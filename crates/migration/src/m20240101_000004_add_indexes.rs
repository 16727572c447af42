use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Work: index on category for the landing page
        manager
            .create_index(
                Index::create()
                    .name("idx_work_category")
                    .table(Work::Table)
                    .col(Work::Category)
                    .to_owned(),
            )
            .await?;

        // Vote: index on work_id for tallies (user_id is covered by the PK prefix)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_work")
                    .table(Vote::Table)
                    .col(Vote::WorkId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_work_category").table(Work::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_vote_work").table(Vote::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Work { Table, Category }

#[derive(DeriveIden)]
enum Vote { Table, WorkId }
