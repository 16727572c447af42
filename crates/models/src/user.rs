use sea_orm::{entity::prelude::*, sea_query::OnConflict, Set, DatabaseConnection, QueryOrder};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, vote};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Vote,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Vote => Entity::has_many(vote::Entity).into() }
    }
}

impl Related<vote::Entity> for Entity {
    fn to() -> RelationDef { Relation::Vote.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), errors::ModelError> {
    if username.trim().is_empty() {
        return Err(errors::ModelError::Validation("username required".into()));
    }
    if username.len() > 128 {
        return Err(errors::ModelError::Validation("username too long (<=128)".into()));
    }
    Ok(())
}

/// Look the user up by username, inserting it first when absent.
/// The boolean is `true` when this call created the row.
pub async fn find_or_create(db: &DatabaseConnection, username: &str) -> Result<(Model, bool), errors::ModelError> {
    validate_username(username)?;
    let am = ActiveModel {
        username: Set(username.to_string()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    let inserted = Entity::insert(am)
        .on_conflict(OnConflict::column(Column::Username).do_nothing().to_owned())
        .exec_without_returning(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let user = Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::Db(format!("user {username:?} missing after upsert")))?;
    Ok((user, inserted > 0))
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find().order_by_asc(Column::Id).all(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
