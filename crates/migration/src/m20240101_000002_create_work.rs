//! Create `work` table.
//! Catalogued media; `category` holds one of `album`, `book`, `movie`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Work::Table)
                    .if_not_exists()
                    .col(pk_auto(Work::Id))
                    .col(string_len(Work::Title, 256).not_null())
                    .col(text_null(Work::Creator))
                    .col(text_null(Work::Description))
                    .col(integer_null(Work::PublicationYear))
                    .col(string_len(Work::Category, 16).not_null())
                    .col(timestamp_with_time_zone(Work::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Work::UpdatedAt).not_null())
                    .check(Expr::col(Work::Category).is_in(["album", "book", "movie"]))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Work::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Work {
    Table,
    Id,
    Title,
    Creator,
    Description,
    PublicationYear,
    Category,
    CreatedAt,
    UpdatedAt,
}
