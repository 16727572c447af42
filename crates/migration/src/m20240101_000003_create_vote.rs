//! Create `vote` table with FKs to `user` and `work`.
//!
//! The composite primary key `(user_id, work_id)` is what keeps a user from
//! voting twice for the same work, including under concurrent requests.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(integer(Vote::UserId).not_null())
                    .col(integer(Vote::WorkId).not_null())
                    .col(timestamp_with_time_zone(Vote::CreatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_vote_user_work")
                            .col(Vote::UserId)
                            .col(Vote::WorkId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_user")
                            .from(Vote::Table, Vote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_work")
                            .from(Vote::Table, Vote::WorkId)
                            .to(Work::Table, Work::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vote::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Vote { Table, UserId, WorkId, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }

#[derive(DeriveIden)]
enum Work { Table, Id }
