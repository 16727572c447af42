use std::collections::HashMap;

use sea_orm::{entity::prelude::*, sea_query::{Expr, OnConflict}, Set, DatabaseConnection, FromQueryResult, SqlErr, QueryOrder, QuerySelect, PaginatorTrait};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, user, work};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub work_id: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Work,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
            Relation::Work => Entity::belongs_to(work::Entity)
                .from(Column::WorkId)
                .to(work::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<work::Entity> for Entity {
    fn to() -> RelationDef { Relation::Work.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert the vote unless the pair already exists. Returns `true` when a row
/// was written. `NotFound` when the user or the work row is gone. The conflict target is the primary key, so two racing calls
/// for the same pair still leave exactly one row.
pub async fn create_once(db: &DatabaseConnection, user_id: i32, work_id: i32) -> Result<bool, errors::ModelError> {
    let am = ActiveModel {
        user_id: Set(user_id),
        work_id: Set(work_id),
        created_at: Set(Utc::now().into()),
    };
    let rows = Entity::insert(am)
        .on_conflict(OnConflict::columns([Column::UserId, Column::WorkId]).do_nothing().to_owned())
        .exec_without_returning(db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(m)) => errors::ModelError::NotFound(m),
            _ => errors::ModelError::Db(e.to_string()),
        })?;
    Ok(rows > 0)
}

pub async fn find(db: &DatabaseConnection, user_id: i32, work_id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id((user_id, work_id)).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn count(db: &DatabaseConnection) -> Result<u64, errors::ModelError> {
    Entity::find().count(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_for_work(db: &DatabaseConnection, work_id: i32) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::WorkId.eq(work_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_for_user(db: &DatabaseConnection, user_id: i32) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[derive(Debug, FromQueryResult)]
struct TallyRow {
    work_id: i32,
    votes: i64,
}

/// Vote count per work id; works without votes are absent.
pub async fn tally(db: &DatabaseConnection) -> Result<HashMap<i32, u64>, errors::ModelError> {
    let rows = Entity::find()
        .select_only()
        .column(Column::WorkId)
        .column_as(Expr::col(Column::UserId).count(), "votes")
        .group_by(Column::WorkId)
        .into_model::<TallyRow>()
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(|r| (r.work_id, r.votes.max(0) as u64)).collect())
}
